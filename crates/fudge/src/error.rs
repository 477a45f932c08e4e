//! Error type for Fudge encoding/decoding, message construction and coercion.

use thiserror::Error;

/// Everything that can go wrong inside the library.
///
/// The taxonomy is deliberately flat: every fallible operation returns
/// `Result<_, FudgeError>` and decoding aborts on the first error. Internal
/// invariant violations (impossible payload kinds, corrupt field state) are
/// bugs and use `debug_assert!`/`unreachable!` rather than error variants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FudgeError {
    /// The input buffer was exhausted before a required read completed.
    /// Decode treats its input as untrusted; this is the normal failure for
    /// truncated or length-corrupted data.
    #[error("ran out of bytes while reading {context}")]
    OutOfBytes { context: &'static str },

    /// A field was flagged fixed-width but its type has no fixed width
    /// registered.
    #[error("no width available for field of type {type_id}")]
    UnknownFieldWidth { type_id: u8 },

    /// A 2- or 4-byte width prefix decoded to a negative value.
    #[error("field claims a negative width ({width})")]
    NegativeFieldWidth { width: i32 },

    /// Sub-messages nested deeper than the decoder is willing to recurse.
    #[error("sub-message nesting exceeds {max} levels")]
    NestingTooDeep { max: usize },

    /// Index-based field lookup out of range.
    #[error("field index {index} out of bounds (message has {num_fields} fields)")]
    InvalidIndex { index: usize, num_fields: usize },

    /// Name-based field lookup found no match.
    #[error("no field named {name:?}")]
    InvalidName { name: String },

    /// Ordinal-based field lookup found no match.
    #[error("no field with ordinal {ordinal}")]
    InvalidOrdinal { ordinal: i16 },

    /// Field names are length-prefixed with a single byte on the wire.
    #[error("field name is {len} bytes; the maximum is 255")]
    NameTooLong { len: usize },

    /// A payload or total message size exceeds what the 32-bit signed
    /// lengths of the wire format can carry.
    #[error("{context} length {len} exceeds the representable size")]
    PayloadTooLarge { context: &'static str, len: usize },

    /// The requested conversion is not in the coercion lattice.
    #[error("cannot coerce type {from} to type {to}")]
    InvalidCoercion { from: u8, to: u8 },

    /// User types may only use the bytes or sub-message payload kinds.
    #[error("type {type_id} cannot be registered: user types must use the bytes or sub-message payload")]
    InvalidUserType { type_id: u8 },

    /// A string payload or field name held invalid UTF-8.
    #[error("invalid UTF-8 in {context}")]
    InvalidString { context: &'static str },

    /// A field's value does not match the payload kind its type id demands.
    #[error("payload does not match the {expected} payload kind of type {type_id}")]
    PayloadMismatch { type_id: u8, expected: &'static str },

    /// A fixed-width type was handed data of the wrong size.
    #[error("fixed-width type {type_id} requires {expected} bytes, got {len}")]
    FixedWidthMismatch {
        type_id: u8,
        len: usize,
        expected: usize,
    },

    /// There is no built-in fixed byte array type of this length.
    #[error("no fixed byte array type of length {len}")]
    InvalidFixedArrayLength { len: usize },

    /// The bytes produced by encoding disagree with the computed total
    /// length, usually a user handler writing a different number of bytes
    /// than its field's length accounts for.
    #[error("encoded {written} bytes where the header declared {declared}")]
    EncodedLengthMismatch { declared: usize, written: usize },

    /// A date or time component is outside its valid range.
    #[error("date/time {component} {value} out of range")]
    DateTimeOutOfRange { component: &'static str, value: i64 },
}
