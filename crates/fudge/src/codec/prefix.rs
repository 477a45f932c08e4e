//! The field prefix byte.
//!
//! Every encoded field starts with one byte describing its shape:
//!
//! ```text
//! bit 7      fixed-width flag
//! bits 6..5  variable width size code (0, 1, 2 bytes; code 3 means 4)
//! bit 4      ordinal present
//! bit 3      name present
//! bits 2..0  reserved, written as zero
//! ```

use crate::codec::primitives::bytes_to_hold_width;

/// Decoded form of a field's prefix byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPrefix {
    /// Payload width comes from the type registry, not the wire.
    pub fixed_width: bool,
    /// Number of bytes holding the payload width (0 for fixed-width fields).
    pub variable_width: u8,
    /// A 2-byte ordinal follows the type byte.
    pub has_ordinal: bool,
    /// A length-prefixed name follows the ordinal.
    pub has_name: bool,
}

impl FieldPrefix {
    /// Decodes a prefix byte.
    pub fn decode(byte: u8) -> Self {
        let code = (byte & 0x60) >> 5;
        Self {
            fixed_width: byte & 0x80 != 0,
            // two bits cannot hold 4, so code 3 stands in for it
            variable_width: if code == 3 { 4 } else { code },
            has_ordinal: byte & 0x10 != 0,
            has_name: byte & 0x08 != 0,
        }
    }

    /// Computes the prefix byte for a field being encoded.
    ///
    /// `width` is the payload width in bytes; it is ignored for fixed-width
    /// fields, whose width never appears on the wire.
    pub fn encode_byte(fixed_width: bool, width: i32, has_ordinal: bool, has_name: bool) -> u8 {
        let var_code = if fixed_width {
            0
        } else {
            let bytes = bytes_to_hold_width(width);
            if bytes < 4 { bytes } else { 3 }
        };
        (u8::from(fixed_width) << 7)
            | (var_code << 5)
            | (u8::from(has_ordinal) << 4)
            | (u8::from(has_name) << 3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_fixed_with_name_and_ordinal() {
        let prefix = FieldPrefix::decode(0x98);
        assert!(prefix.fixed_width);
        assert_eq!(prefix.variable_width, 0);
        assert!(prefix.has_ordinal);
        assert!(prefix.has_name);
    }

    #[test]
    fn test_code_three_means_four_bytes() {
        let byte = FieldPrefix::encode_byte(false, 100_000, false, false);
        assert_eq!((byte & 0x60) >> 5, 3);
        assert_eq!(FieldPrefix::decode(byte).variable_width, 4);
    }

    #[test]
    fn test_encode_decode_agree() {
        for &(fixed, width) in &[(true, 0), (false, 10), (false, 300), (false, 40_000)] {
            for &ordinal in &[false, true] {
                for &name in &[false, true] {
                    let byte = FieldPrefix::encode_byte(fixed, width, ordinal, name);
                    let prefix = FieldPrefix::decode(byte);
                    assert_eq!(prefix.fixed_width, fixed);
                    assert_eq!(prefix.has_ordinal, ordinal);
                    assert_eq!(prefix.has_name, name);
                    if !fixed {
                        let expected = bytes_to_hold_width(width);
                        assert_eq!(prefix.variable_width, expected);
                    }
                }
            }
        }
    }

    #[test]
    fn test_reserved_bits_ignored() {
        let prefix = FieldPrefix::decode(0x07);
        assert!(!prefix.fixed_width);
        assert_eq!(prefix.variable_width, 0);
        assert!(!prefix.has_ordinal);
        assert!(!prefix.has_name);
    }
}
