mod dispatcher;
mod method_registrar;

pub use dispatcher::Dispatcher;
pub use method_registrar::{MethodRegistrar, MethodTable};
