use crate::frame::{Frame, FrameKind, FrameStats};
use crate::loopback_client::lock;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use wirebind::{CallContext, Dispatcher, MethodType, RpcError};

type InFlight = Arc<Mutex<HashMap<u32, CallContext>>>;

/// Server side of a loopback connection: drives a shared [`Dispatcher`]
/// with the frames the client sends.
///
/// Dropping the handle stops the loop and cancels every call still in
/// flight.
#[derive(Debug)]
pub struct LoopbackServer {
    root: CallContext,
    in_flight: InFlight,
    task: JoinHandle<()>,
}

impl LoopbackServer {
    pub(crate) fn spawn(
        dispatcher: Arc<Dispatcher>,
        rx: mpsc::Receiver<Frame>,
        tx: mpsc::Sender<Frame>,
        stats: Arc<FrameStats>,
    ) -> Self {
        let root = CallContext::new();
        let in_flight = InFlight::default();

        let task = tokio::spawn(serve(
            dispatcher,
            rx,
            ServerLink {
                tx,
                stats,
                root: root.clone(),
                in_flight: in_flight.clone(),
            },
        ));

        Self {
            root,
            in_flight,
            task,
        }
    }

    /// Calls currently being handled.
    pub fn in_flight_calls(&self) -> usize {
        lock(&self.in_flight).len()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stops accepting frames and cancels the context of every in-flight
    /// call.
    pub fn shutdown(&self) {
        self.root.cancel();
    }
}

impl Drop for LoopbackServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[derive(Clone)]
struct ServerLink {
    tx: mpsc::Sender<Frame>,
    stats: Arc<FrameStats>,
    root: CallContext,
    in_flight: InFlight,
}

async fn serve(dispatcher: Arc<Dispatcher>, mut rx: mpsc::Receiver<Frame>, link: ServerLink) {
    tracing::info!(methods = dispatcher.len(), "loopback server started");

    loop {
        let frame = tokio::select! {
            biased;
            _ = link.root.cancellation_token().cancelled() => break,
            frame = rx.recv() => match frame {
                Some(frame) => frame,
                None => break,
            },
        };

        match frame {
            Frame::Call { seq, method, args } => {
                let ctx = link.root.child();
                lock(&link.in_flight).insert(seq, ctx.clone());

                tokio::spawn(handle_call(
                    dispatcher.clone(),
                    link.clone(),
                    ctx,
                    seq,
                    method,
                    args,
                ));
            }
            Frame::Notify { method, args } => {
                tokio::spawn(handle_notify(
                    dispatcher.clone(),
                    link.root.child(),
                    method,
                    args,
                ));
            }
            Frame::Cancel { seq } => {
                if let Some(ctx) = lock(&link.in_flight).remove(&seq) {
                    tracing::debug!(seq, "client cancelled call");
                    ctx.cancel();
                }
            }
            Frame::Response { seq, .. } => {
                tracing::warn!(seq, "unexpected response frame from client");
            }
        }
    }

    tracing::info!("loopback server stopped");
}

async fn handle_call(
    dispatcher: Arc<Dispatcher>,
    link: ServerLink,
    ctx: CallContext,
    seq: u32,
    method: String,
    args: Vec<u8>,
) {
    let result = if dispatcher.method_type(&method) == Some(MethodType::Notify) {
        tracing::warn!(seq, method = %method, "call frame addressed to a notify method");
        Err(RpcError::NotCallable {
            method: method.clone(),
        })
    } else {
        match ctx.run(dispatcher.dispatch(ctx.clone(), &method, &args)).await {
            Ok(Ok(Some(bytes))) => Ok(bytes),
            Ok(Ok(None)) => Err(RpcError::NotCallable {
                method: method.clone(),
            }),
            Ok(Err(err)) | Err(err) => Err(err),
        }
    };

    lock(&link.in_flight).remove(&seq);

    if let Err(err) = &result {
        tracing::debug!(seq, method = %method, %err, "call failed");
    }

    match link.tx.send(Frame::Response { seq, result }).await {
        Ok(()) => link.stats.record(FrameKind::Response),
        Err(_) => tracing::debug!(seq, method = %method, "client went away before the response"),
    }
}

async fn handle_notify(
    dispatcher: Arc<Dispatcher>,
    ctx: CallContext,
    method: String,
    args: Vec<u8>,
) {
    match ctx.run(dispatcher.dispatch(ctx.clone(), &method, &args)).await {
        Ok(Ok(_)) => {}
        Ok(Err(err)) | Err(err) => tracing::warn!(method = %method, %err, "notification failed"),
    }
}
