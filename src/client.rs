mod generic_client;
mod typed_call;

pub use generic_client::GenericClient;
pub use typed_call::{call_method, notify_method};
