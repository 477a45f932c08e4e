//! Built-in Fudge type identifiers.
//!
//! The identifier space is a single byte. Ids below 32 are reserved for the
//! built-in types listed here; ids 32 and above are available for user
//! registration via [`TypeRegistry::register`](crate::TypeRegistry::register).
//! The ids and their widths are a wire contract and must match other Fudge
//! implementations byte for byte.

/// Zero-width presence marker.
pub const INDICATOR: u8 = 0;
/// Stored as a single byte, non-zero meaning true.
pub const BOOLEAN: u8 = 1;
/// Signed 8-bit integer.
pub const BYTE: u8 = 2;
/// Signed 16-bit integer.
pub const SHORT: u8 = 3;
/// Signed 32-bit integer.
pub const INT: u8 = 4;
/// Signed 64-bit integer.
pub const LONG: u8 = 5;
/// Variable-length byte array.
pub const BYTE_ARRAY: u8 = 6;
/// Variable-length array of 16-bit integers.
pub const SHORT_ARRAY: u8 = 7;
/// Variable-length array of 32-bit integers.
pub const INT_ARRAY: u8 = 8;
/// Variable-length array of 64-bit integers.
pub const LONG_ARRAY: u8 = 9;
/// 32-bit IEEE 754 float.
pub const FLOAT: u8 = 10;
/// 64-bit IEEE 754 float.
pub const DOUBLE: u8 = 11;
/// Variable-length array of 32-bit floats.
pub const FLOAT_ARRAY: u8 = 12;
/// Variable-length array of 64-bit floats.
pub const DOUBLE_ARRAY: u8 = 13;
/// UTF-8 encoded string.
pub const STRING: u8 = 14;
/// Nested sub-message.
pub const SUB_MESSAGE: u8 = 15;

/// Byte array with exactly 4 elements (no width prefix on the wire).
pub const BYTE_ARRAY_4: u8 = 17;
/// Byte array with exactly 8 elements.
pub const BYTE_ARRAY_8: u8 = 18;
/// Byte array with exactly 16 elements.
pub const BYTE_ARRAY_16: u8 = 19;
/// Byte array with exactly 20 elements.
pub const BYTE_ARRAY_20: u8 = 20;
/// Byte array with exactly 32 elements.
pub const BYTE_ARRAY_32: u8 = 21;
/// Byte array with exactly 64 elements.
pub const BYTE_ARRAY_64: u8 = 22;
/// Byte array with exactly 128 elements.
pub const BYTE_ARRAY_128: u8 = 23;
/// Byte array with exactly 256 elements.
pub const BYTE_ARRAY_256: u8 = 24;
/// Byte array with exactly 512 elements.
pub const BYTE_ARRAY_512: u8 = 25;

/// Calendar date value, 4 bytes.
pub const DATE: u8 = 26;
/// Time-of-day value, 8 bytes.
pub const TIME: u8 = 27;
/// Combined date and time value, 12 bytes.
pub const DATETIME: u8 = 28;

/// First type id available for user registration.
pub const FIRST_USER_TYPE: u8 = 32;

/// The nine built-in fixed byte array sizes, paired with their type ids.
pub const FIXED_BYTE_ARRAY_SIZES: [(u8, usize); 9] = [
    (BYTE_ARRAY_4, 4),
    (BYTE_ARRAY_8, 8),
    (BYTE_ARRAY_16, 16),
    (BYTE_ARRAY_20, 20),
    (BYTE_ARRAY_32, 32),
    (BYTE_ARRAY_64, 64),
    (BYTE_ARRAY_128, 128),
    (BYTE_ARRAY_256, 256),
    (BYTE_ARRAY_512, 512),
];

/// Returns the fixed byte array type id for `len`, if one exists.
pub fn fixed_byte_array_type(len: usize) -> Option<u8> {
    FIXED_BYTE_ARRAY_SIZES
        .iter()
        .find(|(_, size)| *size == len)
        .map(|(id, _)| *id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_byte_array_lookup() {
        assert_eq!(fixed_byte_array_type(4), Some(BYTE_ARRAY_4));
        assert_eq!(fixed_byte_array_type(512), Some(BYTE_ARRAY_512));
        assert_eq!(fixed_byte_array_type(5), None);
        assert_eq!(fixed_byte_array_type(0), None);
    }
}
