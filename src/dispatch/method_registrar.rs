use crate::error::RegistrationError;
use crate::protocol::MethodDescriptor;
use std::collections::BTreeMap;

/// Fully-qualified method name to descriptor.
pub type MethodTable = BTreeMap<String, MethodDescriptor>;

/// Anything that can accept a batch of fully-qualified methods.
///
/// Implementations add every method of the table or none of them.
pub trait MethodRegistrar {
    fn add_methods(&mut self, methods: MethodTable) -> Result<(), RegistrationError>;
}
