use super::method_descriptor::MethodDescriptor;
use crate::constants::METHOD_NAME_SEPARATOR;
use crate::context::CallContext;
use crate::error::{HandlerError, RegistrationError};
use serde::{Serialize, de::DeserializeOwned};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::future::Future;

/// Joins a protocol name and a method name into the fully-qualified name
/// used on the wire.
pub fn qualify(protocol: &str, method: &str) -> String {
    let mut name = String::with_capacity(protocol.len() + method.len() + 1);
    name.push_str(protocol);
    name.push(METHOD_NAME_SEPARATOR);
    name.push_str(method);
    name
}

/// A named bundle of method descriptors, immutable once built.
///
/// Protocols are constructed once at service-registration time, usually by a
/// per-protocol constructor that binds every method of an interface trait,
/// and are then merged into a [`crate::Dispatcher`].
#[derive(Debug, Clone)]
pub struct Protocol {
    name: String,
    methods: BTreeMap<String, MethodDescriptor>,
}

impl Protocol {
    pub fn builder(name: impl Into<String>) -> ProtocolBuilder {
        ProtocolBuilder {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn method(&self, method: &str) -> Option<&MethodDescriptor> {
        self.methods.get(method)
    }

    /// Unqualified method names, in sorted order.
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    /// Fully-qualified method names, in sorted order.
    pub fn qualified_names(&self) -> impl Iterator<Item = String> + '_ {
        self.methods.keys().map(|method| qualify(&self.name, method))
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    pub(crate) fn into_qualified_methods(self) -> (String, BTreeMap<String, MethodDescriptor>) {
        let methods = self
            .methods
            .into_iter()
            .map(|(method, descriptor)| (qualify(&self.name, &method), descriptor))
            .collect();

        (self.name, methods)
    }
}

/// Collects the methods of a [`Protocol`]. Nothing is validated until
/// [`ProtocolBuilder::build`].
#[must_use]
pub struct ProtocolBuilder {
    name: String,
    methods: Vec<(String, MethodDescriptor)>,
}

impl ProtocolBuilder {
    /// Adds a request/response method.
    pub fn call<A, R, F, Fut>(self, method: impl Into<String>, handler: F) -> Self
    where
        A: DeserializeOwned + Send + 'static,
        R: Serialize + Send + 'static,
        F: Fn(CallContext, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, HandlerError>> + Send + 'static,
    {
        self.method(method, MethodDescriptor::call(handler))
    }

    /// Adds a fire-and-forget method.
    pub fn notify<A, F, Fut>(self, method: impl Into<String>, handler: F) -> Self
    where
        A: DeserializeOwned + Send + 'static,
        F: Fn(CallContext, A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        self.method(method, MethodDescriptor::notify(handler))
    }

    pub fn method(mut self, method: impl Into<String>, descriptor: MethodDescriptor) -> Self {
        self.methods.push((method.into(), descriptor));
        self
    }

    /// Validates names and handler signatures and freezes the protocol.
    pub fn build(self) -> Result<Protocol, RegistrationError> {
        validate_protocol_name(&self.name)?;

        let mut methods = BTreeMap::new();
        for (method, descriptor) in self.methods {
            validate_method_name(&self.name, &method)?;
            descriptor.check_signature(&qualify(&self.name, &method))?;

            match methods.entry(method) {
                Entry::Occupied(entry) => {
                    return Err(RegistrationError::DuplicateMethod {
                        protocol: self.name,
                        method: entry.key().clone(),
                    });
                }
                Entry::Vacant(entry) => {
                    entry.insert(descriptor);
                }
            }
        }

        Ok(Protocol {
            name: self.name,
            methods,
        })
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn validate_protocol_name(name: &str) -> Result<(), RegistrationError> {
    let invalid = |reason| RegistrationError::InvalidProtocolName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("name is empty"));
    }

    for segment in name.split(METHOD_NAME_SEPARATOR) {
        if segment.is_empty() {
            return Err(invalid("name has an empty segment"));
        }
        if !segment.chars().all(is_name_char) {
            return Err(invalid("segments may only hold ASCII letters, digits, '_' and '-'"));
        }
    }

    Ok(())
}

fn validate_method_name(protocol: &str, method: &str) -> Result<(), RegistrationError> {
    let invalid = |reason| RegistrationError::InvalidMethodName {
        protocol: protocol.to_string(),
        method: method.to_string(),
        reason,
    };

    if method.is_empty() {
        return Err(invalid("name is empty"));
    }
    if method.contains(METHOD_NAME_SEPARATOR) {
        return Err(invalid("name may not contain the separator"));
    }
    if !method.chars().all(is_name_char) {
        return Err(invalid("name may only hold ASCII letters, digits, '_' and '-'"));
    }

    Ok(())
}
