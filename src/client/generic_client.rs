use crate::context::CallContext;
use crate::error::RpcError;
use std::sync::Arc;

/// The dynamically typed capability a transport offers to typed stubs.
///
/// `args` is an already wrapped argument container and a successful `call`
/// yields the raw encoded result. Implementations own request correlation;
/// they must honor `ctx` and release whatever they hold for a call that is
/// abandoned through it.
#[async_trait::async_trait]
pub trait GenericClient: Send + Sync {
    async fn call(
        &self,
        ctx: &CallContext,
        method: &str,
        args: Vec<u8>,
    ) -> Result<Vec<u8>, RpcError>;

    /// Queues a fire-and-forget call. Returns once the outbound frame is
    /// queued, without waiting for the remote side.
    async fn notify(&self, ctx: &CallContext, method: &str, args: Vec<u8>) -> Result<(), RpcError>;
}

#[async_trait::async_trait]
impl<C> GenericClient for Arc<C>
where
    C: GenericClient + ?Sized,
{
    async fn call(
        &self,
        ctx: &CallContext,
        method: &str,
        args: Vec<u8>,
    ) -> Result<Vec<u8>, RpcError> {
        (**self).call(ctx, method, args).await
    }

    async fn notify(&self, ctx: &CallContext, method: &str, args: Vec<u8>) -> Result<(), RpcError> {
        (**self).notify(ctx, method, args).await
    }
}
