mod arg_container;
mod method_descriptor;
mod method_type;
mod protocol_def;

pub use arg_container::{
    ContainerError, decode_arg_container, decode_result, encode_arg_container, encode_result,
};
pub use method_descriptor::{
    ArgDecoder, DecodedArgs, ErasedHandler, HandlerFuture, MethodDescriptor,
};
pub use method_type::MethodType;
pub use protocol_def::{Protocol, ProtocolBuilder, qualify};
