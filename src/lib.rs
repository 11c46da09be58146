pub mod client;
pub mod constants;
mod context;
pub mod dispatch;
mod error;
mod macros;
pub mod protocol;
mod session;

pub use client::{GenericClient, call_method, notify_method};
pub use context::CallContext;
pub use dispatch::{Dispatcher, MethodRegistrar, MethodTable};
pub use error::{ErrorCode, HandlerError, RegistrationError, RpcError};
pub use protocol::{MethodDescriptor, MethodType, Protocol, ProtocolBuilder, qualify};
pub use session::SessionId;
