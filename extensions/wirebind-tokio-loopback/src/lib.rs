//! An in-process transport for `wirebind`.
//!
//! [`connect`] joins a [`LoopbackClient`] (a [`wirebind::GenericClient`]) to a
//! [`LoopbackServer`] that serves a shared [`wirebind::Dispatcher`]. Frames
//! travel as values over bounded Tokio channels, so the whole typed call
//! path can run inside one process without a byte-level wire format.

pub mod constants;
mod config;
mod frame;
mod loopback_client;
mod loopback_server;

pub use config::LoopbackConfig;
pub use frame::{Frame, FrameKind, FrameStats};
pub use loopback_client::LoopbackClient;
pub use loopback_server::LoopbackServer;

use std::sync::Arc;
use tokio::sync::mpsc;
use wirebind::Dispatcher;

/// Opens a loopback connection served by `dispatcher`.
///
/// Must be called from within a Tokio runtime; the server loop and the
/// client's response reader are spawned onto it.
pub fn connect(
    dispatcher: Arc<Dispatcher>,
    config: LoopbackConfig,
) -> (LoopbackClient, LoopbackServer) {
    let capacity = config.channel_capacity.max(1);

    let (to_server_tx, to_server_rx) = mpsc::channel(capacity);
    let (to_client_tx, to_client_rx) = mpsc::channel(capacity);
    let stats = Arc::new(FrameStats::default());

    let server = LoopbackServer::spawn(dispatcher, to_server_rx, to_client_tx, stats.clone());
    let client = LoopbackClient::new(
        to_server_tx,
        to_client_rx,
        stats,
        config.default_call_timeout,
    );

    tracing::debug!(capacity, "loopback connection opened");

    (client, server)
}
