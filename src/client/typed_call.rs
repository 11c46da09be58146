use super::generic_client::GenericClient;
use crate::context::CallContext;
use crate::error::RpcError;
use crate::protocol::{decode_result, encode_arg_container};
use serde::{Serialize, de::DeserializeOwned};

fn encode_args<A>(method: &str, arg: &A) -> Result<Vec<u8>, RpcError>
where
    A: Serialize,
{
    encode_arg_container(arg).map_err(|err| RpcError::Encode {
        method: method.to_string(),
        reason: err.to_string(),
    })
}

/// Issues one request/response call and decodes its typed result.
///
/// `method` is the fully-qualified name. No retries are attempted.
pub async fn call_method<A, R, C>(
    client: &C,
    ctx: &CallContext,
    method: &str,
    arg: &A,
) -> Result<R, RpcError>
where
    A: Serialize + Sync,
    R: DeserializeOwned,
    C: GenericClient + ?Sized,
{
    let args = encode_args(method, arg)?;
    let bytes = client.call(ctx, method, args).await?;

    decode_result(&bytes).map_err(|err| {
        tracing::warn!(method, %err, "failed to decode call result");
        RpcError::ResultDecode {
            method: method.to_string(),
            reason: err.to_string(),
        }
    })
}

/// Issues one fire-and-forget call.
pub async fn notify_method<A, C>(
    client: &C,
    ctx: &CallContext,
    method: &str,
    arg: &A,
) -> Result<(), RpcError>
where
    A: Serialize + Sync,
    C: GenericClient + ?Sized,
{
    let args = encode_args(method, arg)?;
    client.notify(ctx, method, args).await
}
