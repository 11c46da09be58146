use super::arg_container::{ContainerError, decode_arg_container, encode_result};
use super::method_type::MethodType;
use crate::context::CallContext;
use crate::error::{HandlerError, RegistrationError, RpcError};
use futures::future::{BoxFuture, FutureExt};
use serde::{Serialize, de::DeserializeOwned};
use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Future returned by an erased handler: the encoded result or the error to
/// report for this one call.
pub type HandlerFuture = BoxFuture<'static, Result<Vec<u8>, RpcError>>;

type InvokeFn =
    dyn Fn(CallContext, DecodedArgs) -> Result<HandlerFuture, DecodedArgs> + Send + Sync;

/// A decoded argument record with its concrete type erased.
pub struct DecodedArgs {
    type_name: &'static str,
    value: Box<dyn Any + Send>,
}

impl DecodedArgs {
    pub fn new<A>(value: A) -> Self
    where
        A: Any + Send,
    {
        Self {
            type_name: type_name::<A>(),
            value: Box::new(value),
        }
    }

    /// Name of the concrete type actually held.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Recovers the concrete value, or hands `self` back if it holds a
    /// different type.
    pub fn downcast<A>(self) -> Result<A, Self>
    where
        A: Any,
    {
        let type_name = self.type_name;
        match self.value.downcast::<A>() {
            Ok(value) => Ok(*value),
            Err(value) => Err(Self { type_name, value }),
        }
    }
}

impl fmt::Debug for DecodedArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedArgs")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Produces a fresh, type-erased argument value from a wire payload.
#[derive(Clone, Copy)]
pub struct ArgDecoder {
    type_id: TypeId,
    type_name: &'static str,
    decode: fn(&[u8]) -> Result<DecodedArgs, ContainerError>,
}

impl ArgDecoder {
    /// Decoder for the positional argument container of `A`.
    pub fn of<A>() -> Self
    where
        A: DeserializeOwned + Send + 'static,
    {
        Self {
            type_id: TypeId::of::<A>(),
            type_name: type_name::<A>(),
            decode: decode_erased::<A>,
        }
    }

    /// Decoder built from a hand-written function that claims to produce `A`.
    ///
    /// The claim is what registration checks against the handler; the
    /// dispatcher still verifies the value it actually gets on every call.
    pub fn from_fn<A>(decode: fn(&[u8]) -> Result<DecodedArgs, ContainerError>) -> Self
    where
        A: 'static,
    {
        Self {
            type_id: TypeId::of::<A>(),
            type_name: type_name::<A>(),
            decode,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn decode(&self, bytes: &[u8]) -> Result<DecodedArgs, ContainerError> {
        (self.decode)(bytes)
    }
}

impl fmt::Debug for ArgDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgDecoder")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

fn decode_erased<A>(bytes: &[u8]) -> Result<DecodedArgs, ContainerError>
where
    A: DeserializeOwned + Send + 'static,
{
    decode_arg_container::<A>(bytes).map(DecodedArgs::new)
}

/// A handler bound to one argument type, callable with erased arguments.
#[derive(Clone)]
pub struct ErasedHandler {
    type_id: TypeId,
    type_name: &'static str,
    invoke: Arc<InvokeFn>,
}

impl ErasedHandler {
    pub fn new<A, R, F, Fut>(handler: F) -> Self
    where
        A: Send + 'static,
        R: Serialize + Send + 'static,
        F: Fn(CallContext, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, HandlerError>> + Send + 'static,
    {
        let invoke = move |ctx: CallContext,
                           args: DecodedArgs|
              -> Result<HandlerFuture, DecodedArgs> {
            let args = args.downcast::<A>()?;
            let future = handler(ctx, args);

            Ok(async move {
                match future.await {
                    Ok(result) => encode_result(&result).map_err(|err| {
                        tracing::error!(
                            result_type = type_name::<R>(),
                            %err,
                            "failed to encode handler result"
                        );
                        RpcError::Handler(HandlerError::internal())
                    }),
                    Err(err) => Err(RpcError::Handler(err)),
                }
            }
            .boxed())
        };

        Self {
            type_id: TypeId::of::<A>(),
            type_name: type_name::<A>(),
            invoke: Arc::new(invoke),
        }
    }

    /// Name of the argument type the handler was bound to.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Starts the handler, or hands the arguments back if they are not the
    /// type the handler was bound to.
    pub fn invoke(
        &self,
        ctx: CallContext,
        args: DecodedArgs,
    ) -> Result<HandlerFuture, DecodedArgs> {
        (self.invoke)(ctx, args)
    }
}

impl fmt::Debug for ErasedHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedHandler")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Everything the dispatcher needs to serve one method.
#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    method_type: MethodType,
    decoder: ArgDecoder,
    handler: ErasedHandler,
}

impl MethodDescriptor {
    /// Request/response method taking `A` and answering with `R`.
    pub fn call<A, R, F, Fut>(handler: F) -> Self
    where
        A: DeserializeOwned + Send + 'static,
        R: Serialize + Send + 'static,
        F: Fn(CallContext, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, HandlerError>> + Send + 'static,
    {
        Self::from_parts(
            MethodType::Call,
            ArgDecoder::of::<A>(),
            ErasedHandler::new(handler),
        )
    }

    /// Fire-and-forget method taking `A`.
    pub fn notify<A, F, Fut>(handler: F) -> Self
    where
        A: DeserializeOwned + Send + 'static,
        F: Fn(CallContext, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        Self::from_parts(
            MethodType::Notify,
            ArgDecoder::of::<A>(),
            ErasedHandler::new(handler),
        )
    }

    /// Assembles a descriptor from independently built parts.
    ///
    /// Nothing is checked here; [`MethodDescriptor::check_signature`] runs
    /// when the descriptor is built into a protocol or added to a
    /// dispatcher.
    pub fn from_parts(
        method_type: MethodType,
        decoder: ArgDecoder,
        handler: ErasedHandler,
    ) -> Self {
        Self {
            method_type,
            decoder,
            handler,
        }
    }

    pub fn method_type(&self) -> MethodType {
        self.method_type
    }

    pub fn arg_type_name(&self) -> &'static str {
        self.decoder.type_name()
    }

    pub fn decoder(&self) -> &ArgDecoder {
        &self.decoder
    }

    pub fn handler(&self) -> &ErasedHandler {
        &self.handler
    }

    /// Capability check: the decoder must produce the type the handler
    /// consumes.
    pub fn check_signature(&self, method: &str) -> Result<(), RegistrationError> {
        if self.decoder.type_id == self.handler.type_id {
            return Ok(());
        }

        Err(RegistrationError::SignatureMismatch {
            method: method.to_string(),
            decoder: self.decoder.type_name,
            handler: self.handler.type_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downcast_hands_back_mismatched_values() {
        let args = DecodedArgs::new(42u32);

        let args = args.downcast::<String>().unwrap_err();
        assert_eq!(args.type_name(), "u32");
        assert_eq!(args.downcast::<u32>().unwrap(), 42);
    }

    #[test]
    fn signature_check_compares_argument_types() {
        let matching = MethodDescriptor::call(|_, n: u32| async move { Ok(n) });
        assert!(matching.check_signature("t.m").is_ok());

        let mismatched = MethodDescriptor::from_parts(
            MethodType::Call,
            ArgDecoder::of::<String>(),
            ErasedHandler::new(|_, n: u32| async move { Ok(n) }),
        );
        assert!(matches!(
            mismatched.check_signature("t.m"),
            Err(RegistrationError::SignatureMismatch { .. })
        ));
    }
}
