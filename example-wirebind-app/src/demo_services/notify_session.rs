use example_wirebind_service_definition::NotifySessionInterface;
use std::sync::atomic::{AtomicUsize, Ordering};
use wirebind::{CallContext, HandlerError};

/// Logs session notifications and counts them.
#[derive(Debug, Default)]
pub struct DemoNotifySession {
    received: AtomicUsize,
}

impl DemoNotifySession {
    pub fn received(&self) -> usize {
        self.received.load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl NotifySessionInterface for DemoNotifySession {
    async fn logged_out(&self, _ctx: CallContext) -> Result<(), HandlerError> {
        self.received.fetch_add(1, Ordering::Relaxed);
        tracing::info!("session logged out");
        Ok(())
    }

    async fn logged_in(&self, _ctx: CallContext, username: String) -> Result<(), HandlerError> {
        self.received.fetch_add(1, Ordering::Relaxed);
        tracing::info!(%username, "session logged in");
        Ok(())
    }
}
