use crate::constants::ARG_CONTAINER_LEN;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::io::Cursor;
use thiserror::Error;

// Argument and result values travel as MessagePack. Records are always
// written as maps keyed by their wire field names (`to_vec_named`), never as
// positional arrays.

/// Why an argument container failed to decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContainerError {
    /// The payload is not a sequence, or an element does not match the
    /// argument record (missing, extra or mistyped fields).
    #[error("malformed argument container: {0}")]
    Malformed(String),

    /// The payload is a sequence of the wrong length.
    #[error("argument container must hold exactly one element, got {0}")]
    Arity(usize),
}

/// Wraps `arg` into the one-element positional argument sequence.
pub fn encode_arg_container<A>(arg: &A) -> Result<Vec<u8>, rmp_serde::encode::Error>
where
    A: Serialize,
{
    rmp_serde::to_vec_named(std::slice::from_ref(arg))
}

/// Decodes a one-element positional argument sequence into a fresh `A`.
///
/// Every call decodes into a newly allocated container; nothing is reused
/// between invocations.
pub fn decode_arg_container<A>(bytes: &[u8]) -> Result<A, ContainerError>
where
    A: DeserializeOwned,
{
    let mut cursor = Cursor::new(bytes);
    let mut container = Vec::<A>::deserialize(&mut rmp_serde::Deserializer::new(&mut cursor))
        .map_err(|err| ContainerError::Malformed(err.to_string()))?;

    let consumed = cursor.position() as usize;
    if consumed != bytes.len() {
        return Err(ContainerError::Malformed(format!(
            "{} trailing bytes after the container",
            bytes.len() - consumed
        )));
    }

    if container.len() != ARG_CONTAINER_LEN {
        return Err(ContainerError::Arity(container.len()));
    }

    container.pop().ok_or(ContainerError::Arity(0))
}

pub fn encode_result<R>(result: &R) -> Result<Vec<u8>, rmp_serde::encode::Error>
where
    R: Serialize,
{
    rmp_serde::to_vec_named(result)
}

pub fn decode_result<R>(bytes: &[u8]) -> Result<R, rmp_serde::decode::Error>
where
    R: DeserializeOwned,
{
    rmp_serde::from_slice(bytes)
}
