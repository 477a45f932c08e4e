//! Security limits applied while decoding untrusted input.

/// Maximum encoded length of a field name (single-byte length prefix).
pub const MAX_NAME_LEN: usize = 255;

/// Maximum sub-message nesting depth the decoder will recurse into.
///
/// The wire format itself has no depth limit; this bounds stack use when
/// decoding hostile input.
pub const MAX_MESSAGE_DEPTH: usize = 100;
