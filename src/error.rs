use crate::constants::{
    GENERIC_HANDLER_ERROR_CODE, INTERNAL_ERROR_CODE, INTERNAL_ERROR_MESSAGE,
};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An error returned by a method handler's business logic.
///
/// The dispatch layer treats it as opaque and carries it to the caller
/// verbatim, code and message included.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message} (code {code})")]
pub struct HandlerError {
    pub code: i32,
    pub message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_code(GENERIC_HANDLER_ERROR_CODE, message)
    }

    /// Builds an error with a handler-chosen code.
    ///
    /// `INTERNAL_ERROR_CODE` is reserved for caught panics; passing it here
    /// yields `GENERIC_HANDLER_ERROR_CODE` instead.
    pub fn with_code(code: i32, message: impl Into<String>) -> Self {
        let code = if code == INTERNAL_ERROR_CODE {
            GENERIC_HANDLER_ERROR_CODE
        } else {
            code
        };

        Self {
            code,
            message: message.into(),
        }
    }

    /// The generic error a peer sees when a handler fails unexpectedly.
    pub fn internal() -> Self {
        Self {
            code: INTERNAL_ERROR_CODE,
            message: INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }

    pub fn is_internal(&self) -> bool {
        self.code == INTERNAL_ERROR_CODE
    }
}

/// Numeric classification of an [`RpcError`], stable across the wire.
#[repr(u16)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum ErrorCode {
    UnknownMethod = 1,
    ArgumentDecode = 2,
    TypeAssertion = 3,
    Handler = 4,
    Cancelled = 5,
    DeadlineExceeded = 6,
    Encode = 7,
    ResultDecode = 8,
    Transport = 9,
    NotCallable = 10,
}

/// Errors surfaced by a single dispatched or issued call.
///
/// A failed call never affects any other call in flight on the same
/// connection.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum RpcError {
    /// The inbound method name is not registered on the dispatcher.
    #[error("unknown method: {method}")]
    UnknownMethod { method: String },

    /// The wire payload did not match the declared argument shape.
    #[error("failed to decode arguments for {method}: {reason}")]
    ArgumentDecode { method: String, reason: String },

    /// The decoded argument value is not the type the handler was bound to.
    ///
    /// This is a registration bug, not a malformed peer.
    #[error(
        "type assertion failed for {method}: handler expects {expected}, decoded {actual}"
    )]
    TypeAssertion {
        method: String,
        expected: String,
        actual: String,
    },

    #[error("handler error: {0}")]
    Handler(HandlerError),

    #[error("call cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    /// The client could not encode the argument record.
    #[error("failed to encode arguments for {method}: {reason}")]
    Encode { method: String, reason: String },

    /// The client could not decode the result into the declared result type.
    #[error("failed to decode result of {method}: {reason}")]
    ResultDecode { method: String, reason: String },

    /// A request/response call was addressed to a notify-only method. The
    /// handler is not run.
    #[error("{method} is a notification and cannot be called")]
    NotCallable { method: String },

    /// The underlying transport failed (e.g. the connection closed).
    #[error("transport error: {reason}")]
    Transport { reason: String },
}

impl RpcError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RpcError::UnknownMethod { .. } => ErrorCode::UnknownMethod,
            RpcError::ArgumentDecode { .. } => ErrorCode::ArgumentDecode,
            RpcError::TypeAssertion { .. } => ErrorCode::TypeAssertion,
            RpcError::Handler(_) => ErrorCode::Handler,
            RpcError::Cancelled => ErrorCode::Cancelled,
            RpcError::DeadlineExceeded => ErrorCode::DeadlineExceeded,
            RpcError::Encode { .. } => ErrorCode::Encode,
            RpcError::ResultDecode { .. } => ErrorCode::ResultDecode,
            RpcError::Transport { .. } => ErrorCode::Transport,
            RpcError::NotCallable { .. } => ErrorCode::NotCallable,
        }
    }

    pub fn transport(reason: impl Into<String>) -> Self {
        RpcError::Transport {
            reason: reason.into(),
        }
    }

    /// Whether the error came from the caller's own context rather than
    /// from the remote side.
    pub fn is_context_error(&self) -> bool {
        matches!(self, RpcError::Cancelled | RpcError::DeadlineExceeded)
    }
}

impl From<HandlerError> for RpcError {
    fn from(err: HandlerError) -> Self {
        RpcError::Handler(err)
    }
}

/// Configuration errors raised while building a protocol or merging it into
/// a dispatcher. These are detected before any call is served.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    #[error("invalid protocol name {name:?}: {reason}")]
    InvalidProtocolName { name: String, reason: &'static str },

    #[error("invalid method name {method:?} in protocol {protocol}: {reason}")]
    InvalidMethodName {
        protocol: String,
        method: String,
        reason: &'static str,
    },

    #[error("method {method} is declared more than once in protocol {protocol}")]
    DuplicateMethod { protocol: String, method: String },

    /// The argument decoder and the handler were built for different types.
    #[error(
        "signature mismatch for {method}: decoder produces {decoder}, handler expects {handler}"
    )]
    SignatureMismatch {
        method: String,
        decoder: &'static str,
        handler: &'static str,
    },

    #[error("protocol {protocol} is already registered")]
    DuplicateProtocol { protocol: String },

    #[error("method {method} is already registered")]
    DuplicateQualifiedMethod { method: String },
}
