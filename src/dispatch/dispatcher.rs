use super::method_registrar::{MethodRegistrar, MethodTable};
use crate::context::CallContext;
use crate::error::{HandlerError, RegistrationError, RpcError};
use crate::protocol::{MethodDescriptor, MethodType, Protocol};
use futures::FutureExt;
use std::any::Any;
use std::collections::{BTreeSet, HashMap};
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Routes inbound calls by fully-qualified method name.
///
/// Protocols are merged in during startup (`&mut self`); afterwards the
/// dispatcher is read-only and is usually shared behind an `Arc` by every
/// connection of a server.
#[derive(Debug, Default)]
pub struct Dispatcher {
    methods: HashMap<String, MethodDescriptor>,
    protocols: BTreeSet<String>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges every method of `protocol` into this dispatcher.
    ///
    /// Fails without changing anything if the protocol, or any of its
    /// qualified method names, is already registered.
    pub fn register_protocol(&mut self, protocol: Protocol) -> Result<(), RegistrationError> {
        let (name, methods) = protocol.into_qualified_methods();

        if self.protocols.contains(&name) {
            return Err(RegistrationError::DuplicateProtocol { protocol: name });
        }

        self.add_methods(methods)?;
        self.protocols.insert(name.clone());

        tracing::debug!(protocol = %name, "registered protocol");

        Ok(())
    }

    /// Builder-style variant of [`Dispatcher::register_protocol`].
    pub fn with_protocol(mut self, protocol: Protocol) -> Result<Self, RegistrationError> {
        self.register_protocol(protocol)?;
        Ok(self)
    }

    pub fn method_type(&self, method: &str) -> Option<MethodType> {
        self.methods.get(method).map(MethodDescriptor::method_type)
    }

    pub fn contains_method(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }

    /// Registered fully-qualified method names, sorted.
    pub fn method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn protocol_names(&self) -> impl Iterator<Item = &str> {
        self.protocols.iter().map(String::as_str)
    }

    /// Number of registered methods.
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Serves one inbound call.
    ///
    /// Returns the encoded result for a call method and `None` for a notify
    /// method. Every failure is confined to this call; the dispatcher itself
    /// is never left in a different state.
    pub async fn dispatch(
        &self,
        ctx: CallContext,
        method: &str,
        raw_args: &[u8],
    ) -> Result<Option<Vec<u8>>, RpcError> {
        tracing::trace!(method, args_len = raw_args.len(), "dispatching");

        let Some(descriptor) = self.methods.get(method) else {
            tracing::warn!(method, "call to unknown method");
            return Err(RpcError::UnknownMethod {
                method: method.to_string(),
            });
        };

        let args = descriptor.decoder().decode(raw_args).map_err(|err| {
            tracing::warn!(method, %err, "failed to decode arguments");
            RpcError::ArgumentDecode {
                method: method.to_string(),
                reason: err.to_string(),
            }
        })?;

        ctx.check()?;

        let handler = descriptor.handler();
        let started = catch_unwind(AssertUnwindSafe(|| handler.invoke(ctx, args)));

        let future = match started {
            Ok(Ok(future)) => future,
            Ok(Err(args)) => {
                tracing::error!(
                    method,
                    expected = handler.type_name(),
                    actual = args.type_name(),
                    "decoded arguments do not match handler"
                );
                return Err(RpcError::TypeAssertion {
                    method: method.to_string(),
                    expected: handler.type_name().to_string(),
                    actual: args.type_name().to_string(),
                });
            }
            Err(panic) => return Err(handler_panicked(method, panic)),
        };

        let encoded = match AssertUnwindSafe(future).catch_unwind().await {
            Ok(result) => result?,
            Err(panic) => return Err(handler_panicked(method, panic)),
        };

        match descriptor.method_type() {
            MethodType::Call => Ok(Some(encoded)),
            MethodType::Notify => Ok(None),
        }
    }
}

impl MethodRegistrar for Dispatcher {
    fn add_methods(&mut self, methods: MethodTable) -> Result<(), RegistrationError> {
        for (method, descriptor) in &methods {
            if self.methods.contains_key(method) {
                return Err(RegistrationError::DuplicateQualifiedMethod {
                    method: method.clone(),
                });
            }
            descriptor.check_signature(method)?;
        }

        self.methods.extend(methods);

        Ok(())
    }
}

fn handler_panicked(method: &str, panic: Box<dyn Any + Send>) -> RpcError {
    let message = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());

    tracing::error!(method, panic = %message, "handler panicked");

    RpcError::Handler(HandlerError::internal())
}
