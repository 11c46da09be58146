use crate::error::RpcError;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Per-call context: the sole cancellation channel of an operation.
///
/// A context carries a cancellation token and an optional deadline. Cloning
/// shares both; [`CallContext::child`] derives a context that is cancelled
/// with its parent but can also be cancelled on its own.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancel_token: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a context around an existing token, e.g. one owned by a server
    /// loop that cancels every call on shutdown.
    pub fn from_token(cancel_token: CancellationToken) -> Self {
        Self {
            cancel_token,
            deadline: None,
        }
    }

    /// Tightens the deadline to `timeout` from now. An earlier existing
    /// deadline is kept.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn child(&self) -> Self {
        Self {
            cancel_token: self.cancel_token.child_token(),
            deadline: self.deadline,
        }
    }

    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel_token
    }

    /// Returns the reason this context is done, if it is.
    ///
    /// Cancellation takes precedence over an expired deadline.
    pub fn err(&self) -> Option<RpcError> {
        if self.cancel_token.is_cancelled() {
            return Some(RpcError::Cancelled);
        }

        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(RpcError::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn check(&self) -> Result<(), RpcError> {
        match self.err() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    pub async fn done(&self) -> RpcError {
        match self.deadline {
            Some(deadline) => tokio::select! {
                _ = self.cancel_token.cancelled() => RpcError::Cancelled,
                _ = tokio::time::sleep_until(deadline) => RpcError::DeadlineExceeded,
            },
            None => {
                self.cancel_token.cancelled().await;
                RpcError::Cancelled
            }
        }
    }

    /// Drives `future` to completion unless the context finishes first.
    ///
    /// When the context wins, `future` is dropped before this returns.
    pub async fn run<F>(&self, future: F) -> Result<F::Output, RpcError>
    where
        F: Future,
    {
        self.check()?;

        tokio::select! {
            biased;
            output = future => Ok(output),
            err = self.done() => Err(err),
        }
    }
}
