use crate::frame::{Frame, FrameKind, FrameStats};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use wirebind::{CallContext, GenericClient, RpcError};

type ResponseSender = oneshot::Sender<Result<Vec<u8>, RpcError>>;

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Outstanding calls waiting for a response, keyed by sequence number.
#[derive(Debug, Default)]
pub(crate) struct PendingTable {
    entries: HashMap<u32, ResponseSender>,
    closed: bool,
}

impl PendingTable {
    /// Fails every waiting call and refuses new ones.
    fn close(&mut self) {
        self.closed = true;
        self.entries.clear();
    }
}

/// Removes its entry from the pending table when dropped, whichever way the
/// call ends.
struct PendingSlot {
    pending: Arc<Mutex<PendingTable>>,
    seq: u32,
}

impl PendingSlot {
    fn register(
        pending: &Arc<Mutex<PendingTable>>,
        seq: u32,
        sender: ResponseSender,
    ) -> Result<Self, RpcError> {
        let mut table = lock(pending);
        if table.closed {
            return Err(RpcError::transport("connection closed"));
        }
        table.entries.insert(seq, sender);

        Ok(Self {
            pending: pending.clone(),
            seq,
        })
    }
}

impl Drop for PendingSlot {
    fn drop(&mut self) {
        lock(&self.pending).entries.remove(&self.seq);
    }
}

/// Client side of a loopback connection.
///
/// Cheap to clone; clones share the connection and its correlation table.
#[derive(Debug, Clone)]
pub struct LoopbackClient {
    tx: mpsc::Sender<Frame>,
    pending: Arc<Mutex<PendingTable>>,
    next_seq: Arc<AtomicU32>,
    stats: Arc<FrameStats>,
    default_call_timeout: Option<Duration>,
}

impl LoopbackClient {
    pub(crate) fn new(
        tx: mpsc::Sender<Frame>,
        rx: mpsc::Receiver<Frame>,
        stats: Arc<FrameStats>,
        default_call_timeout: Option<Duration>,
    ) -> Self {
        let pending = Arc::new(Mutex::new(PendingTable::default()));

        tokio::spawn(read_responses(rx, pending.clone()));

        Self {
            tx,
            pending,
            next_seq: Arc::new(AtomicU32::new(1)),
            stats,
            default_call_timeout,
        }
    }

    /// Calls still waiting for a response.
    pub fn pending_calls(&self) -> usize {
        lock(&self.pending).entries.len()
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed() || lock(&self.pending).closed
    }

    async fn send(&self, ctx: &CallContext, frame: Frame) -> Result<(), RpcError> {
        let kind = frame.kind();

        ctx.run(self.tx.send(frame))
            .await?
            .map_err(|_| RpcError::transport("connection closed"))?;

        self.stats.record(kind);
        Ok(())
    }

    /// Queues a `Cancel` frame for `seq` without making the abandoning
    /// caller wait for channel capacity.
    fn send_cancel(&self, seq: u32) {
        let tx = self.tx.clone();
        let stats = self.stats.clone();

        tokio::spawn(async move {
            match tx.send(Frame::Cancel { seq }).await {
                Ok(()) => stats.record(FrameKind::Cancel),
                Err(_) => tracing::debug!(seq, "connection closed before the cancel frame"),
            }
        });
    }
}

#[async_trait::async_trait]
impl GenericClient for LoopbackClient {
    async fn call(
        &self,
        ctx: &CallContext,
        method: &str,
        args: Vec<u8>,
    ) -> Result<Vec<u8>, RpcError> {
        let ctx = match self.default_call_timeout {
            Some(timeout) => ctx.clone().with_timeout(timeout),
            None => ctx.clone(),
        };
        ctx.check()?;

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        let (response_tx, response_rx) = oneshot::channel();
        let _slot = PendingSlot::register(&self.pending, seq, response_tx)?;

        let frame = Frame::Call {
            seq,
            method: method.to_string(),
            args,
        };
        self.send(&ctx, frame).await?;

        tracing::trace!(seq, method, "call sent");

        match ctx.run(response_rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(RpcError::transport(
                "connection closed before the response arrived",
            )),
            Err(err) => {
                tracing::debug!(seq, method, %err, "abandoning call");
                self.send_cancel(seq);
                Err(err)
            }
        }
    }

    async fn notify(
        &self,
        ctx: &CallContext,
        method: &str,
        args: Vec<u8>,
    ) -> Result<(), RpcError> {
        ctx.check()?;

        let frame = Frame::Notify {
            method: method.to_string(),
            args,
        };
        self.send(ctx, frame).await
    }
}

async fn read_responses(mut rx: mpsc::Receiver<Frame>, pending: Arc<Mutex<PendingTable>>) {
    while let Some(frame) = rx.recv().await {
        match frame {
            Frame::Response { seq, result } => {
                let sender = lock(&pending).entries.remove(&seq);
                match sender {
                    Some(sender) => {
                        let _ = sender.send(result);
                    }
                    None => tracing::trace!(seq, "dropping response to an abandoned call"),
                }
            }
            other => tracing::warn!(kind = ?other.kind(), "unexpected frame from server"),
        }
    }

    lock(&pending).close();

    tracing::debug!("loopback client reader stopped");
}
