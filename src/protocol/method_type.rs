use num_enum::{IntoPrimitive, TryFromPrimitive};
use std::fmt;

/// Whether a method answers its caller.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, TryFromPrimitive, IntoPrimitive)]
pub enum MethodType {
    /// Request/response: the caller waits for a (possibly empty) result.
    Call = 0,
    /// Fire-and-forget: no result value and no reply frame.
    Notify = 1,
}

impl MethodType {
    #[inline]
    pub fn expects_reply(self) -> bool {
        matches!(self, MethodType::Call)
    }
}

impl fmt::Display for MethodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MethodType::Call => f.write_str("call"),
            MethodType::Notify => f.write_str("notify"),
        }
    }
}
