use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque integer correlating a sequence of related calls on one logical
/// operation (e.g. a multi-step passphrase change).
///
/// Owned by the caller and passed through unchanged; the dispatch layer
/// never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub i32);

impl From<i32> for SessionId {
    fn from(id: i32) -> Self {
        SessionId(id)
    }
}

impl From<SessionId> for i32 {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
