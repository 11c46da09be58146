/// Separator between a protocol name and a method name, and between the
/// segments of a protocol name (e.g. `keybase.1.account.hasServerKeys`).
pub const METHOD_NAME_SEPARATOR: char = '.';

/// Handler error code used when a handler does not pick one.
pub const GENERIC_HANDLER_ERROR_CODE: i32 = 1;

/// Handler error code reported to the peer when a handler panics.
///
/// Reserved: `HandlerError::with_code` never produces it. The panic payload
/// itself is only logged server-side.
pub const INTERNAL_ERROR_CODE: i32 = 2;

/// Message reported to the peer when a handler panics.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal error";

/// Number of elements in a positional argument container.
///
/// Arguments always travel as a one-element sequence wrapping the argument
/// record, even when the record has several named fields.
pub const ARG_CONTAINER_LEN: usize = 1;
