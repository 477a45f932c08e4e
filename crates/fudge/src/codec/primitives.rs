//! Primitive reading/writing for the Fudge binary format.
//!
//! All multi-byte values are network byte order (big-endian) on the wire.

use crate::error::FudgeError;
use crate::message::field::FieldValue;

// =============================================================================
// DECODING
// =============================================================================

/// Reader for decoding binary data.
///
/// Wraps a byte slice and provides methods for reading primitives with
/// bounds checking; every read past the end fails with
/// [`FudgeError::OutOfBytes`] rather than panicking.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a new reader over a byte slice.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the current position in the data.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of unread bytes.
    pub fn remaining_len(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns true if all data has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Reads a single byte.
    #[inline]
    pub fn read_u8(&mut self, context: &'static str) -> Result<u8, FudgeError> {
        if self.pos >= self.data.len() {
            return Err(FudgeError::OutOfBytes { context });
        }
        let byte = self.data[self.pos];
        self.pos += 1;
        Ok(byte)
    }

    /// Reads exactly `n` bytes.
    #[inline]
    pub fn read_bytes(&mut self, n: usize, context: &'static str) -> Result<&'a [u8], FudgeError> {
        if n > self.data.len() - self.pos {
            return Err(FudgeError::OutOfBytes { context });
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    /// Reads a big-endian signed 16-bit integer.
    #[inline]
    pub fn read_i16(&mut self, context: &'static str) -> Result<i16, FudgeError> {
        let bytes = self.read_bytes(2, context)?;
        // read_bytes guarantees exactly 2 bytes, try_into always succeeds
        Ok(i16::from_be_bytes(bytes.try_into().unwrap()))
    }

    /// Reads a big-endian signed 32-bit integer.
    #[inline]
    pub fn read_i32(&mut self, context: &'static str) -> Result<i32, FudgeError> {
        let bytes = self.read_bytes(4, context)?;
        // read_bytes guarantees exactly 4 bytes, try_into always succeeds
        Ok(i32::from_be_bytes(bytes.try_into().unwrap()))
    }
}

// =============================================================================
// ENCODING
// =============================================================================

/// Writer for encoding binary data.
///
/// The write cursor is linear and never rewound; encode computes every
/// length before the corresponding bytes are emitted.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Creates a new writer.
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Creates a new writer with capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Returns the written bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Returns a reference to the written bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Returns the number of bytes written.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if no bytes have been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Writes a single byte.
    #[inline]
    pub fn write_u8(&mut self, byte: u8) {
        self.buf.push(byte);
    }

    /// Writes raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Writes a big-endian signed 16-bit integer.
    #[inline]
    pub fn write_i16(&mut self, value: i16) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes a big-endian signed 32-bit integer.
    #[inline]
    pub fn write_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes a field width using the smallest of the three prefix sizes.
    ///
    /// Must agree with [`bytes_to_hold_width`]: 1 byte (unsigned) below 256,
    /// 2 bytes (signed) below 32768, 4 bytes otherwise.
    pub fn write_variable_width(&mut self, width: i32) {
        match bytes_to_hold_width(width) {
            1 => self.write_u8(width as u8),
            2 => self.write_i16(width as i16),
            _ => self.write_i32(width),
        }
    }
}

/// Returns the number of bytes needed to carry a variable field width.
///
/// The single-byte form is treated as unsigned, so the cutover is at 256;
/// the two-byte form is signed, cutting over at 32768.
pub fn bytes_to_hold_width(width: i32) -> u8 {
    if width < 256 {
        1
    } else if width < 32768 {
        2
    } else {
        4
    }
}

// =============================================================================
// SCALAR WIRE REPRESENTATION
// =============================================================================

/// A primitive that knows its big-endian wire form and its place in the
/// [`FieldValue`] union.
///
/// One generic implementation of the per-type encode/decode machinery hangs
/// off this trait; the native-order chunk methods exist because numeric
/// array payloads are held in host byte order inside a field's byte block.
pub(crate) trait Scalar: Copy + PartialEq + Send + Sync + 'static {
    /// Encoded width in bytes.
    const WIDTH: usize;

    /// Reads a value from a big-endian chunk of exactly `WIDTH` bytes.
    fn from_be_chunk(chunk: &[u8]) -> Self;

    /// Reads a value from a native-order chunk of exactly `WIDTH` bytes.
    fn from_ne_chunk(chunk: &[u8]) -> Self;

    /// Appends the big-endian wire form.
    fn put_be(self, out: &mut Writer);

    /// Appends the native-order in-memory form.
    fn put_ne(self, out: &mut Vec<u8>);

    /// Wraps the value in the matching [`FieldValue`] variant.
    fn into_value(self) -> FieldValue;

    /// Extracts the value from the matching [`FieldValue`] variant.
    fn from_value(value: &FieldValue) -> Option<Self>;
}

macro_rules! impl_scalar_int {
    ($ty:ty, $variant:ident) => {
        impl Scalar for $ty {
            const WIDTH: usize = std::mem::size_of::<$ty>();

            fn from_be_chunk(chunk: &[u8]) -> Self {
                // callers hand over exactly WIDTH bytes
                <$ty>::from_be_bytes(chunk.try_into().unwrap())
            }

            fn from_ne_chunk(chunk: &[u8]) -> Self {
                <$ty>::from_ne_bytes(chunk.try_into().unwrap())
            }

            fn put_be(self, out: &mut Writer) {
                out.write_bytes(&self.to_be_bytes());
            }

            fn put_ne(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_ne_bytes());
            }

            fn into_value(self) -> FieldValue {
                FieldValue::$variant(self)
            }

            fn from_value(value: &FieldValue) -> Option<Self> {
                match value {
                    FieldValue::$variant(v) => Some(*v),
                    _ => None,
                }
            }
        }
    };
}

impl_scalar_int!(i8, Byte);
impl_scalar_int!(i16, I16);
impl_scalar_int!(i32, I32);
impl_scalar_int!(i64, I64);
impl_scalar_int!(f32, F32);
impl_scalar_int!(f64, F64);

impl Scalar for bool {
    const WIDTH: usize = 1;

    fn from_be_chunk(chunk: &[u8]) -> Self {
        chunk[0] != 0
    }

    fn from_ne_chunk(chunk: &[u8]) -> Self {
        chunk[0] != 0
    }

    fn put_be(self, out: &mut Writer) {
        out.write_u8(if self { 1 } else { 0 });
    }

    fn put_ne(self, out: &mut Vec<u8>) {
        out.push(if self { 1 } else { 0 });
    }

    fn into_value(self) -> FieldValue {
        FieldValue::Bool(self)
    }

    fn from_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_big_endian() {
        let data = [0x12, 0x34, 0x56, 0x78, 0x9A, 0xBC];
        let mut reader = Reader::new(&data);
        assert_eq!(reader.read_i16("test").unwrap(), 0x1234);
        assert_eq!(reader.read_i32("test").unwrap(), 0x5678_9ABC_u32 as i32);
        assert!(reader.is_empty());
    }

    #[test]
    fn test_reader_out_of_bytes() {
        let data = [0u8; 3];
        let mut reader = Reader::new(&data);
        assert!(matches!(
            reader.read_i32("test"),
            Err(FudgeError::OutOfBytes { .. })
        ));
        // A failed read consumes nothing
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.read_bytes(3, "test").unwrap(), &[0, 0, 0]);
        assert!(matches!(
            reader.read_u8("test"),
            Err(FudgeError::OutOfBytes { .. })
        ));
    }

    #[test]
    fn test_writer_roundtrip() {
        let mut writer = Writer::new();
        writer.write_u8(0xFF);
        writer.write_i16(-2);
        writer.write_i32(70000);

        let mut reader = Reader::new(writer.as_bytes());
        assert_eq!(reader.read_u8("test").unwrap(), 0xFF);
        assert_eq!(reader.read_i16("test").unwrap(), -2);
        assert_eq!(reader.read_i32("test").unwrap(), 70000);
    }

    #[test]
    fn test_bytes_to_hold_width_cutovers() {
        assert_eq!(bytes_to_hold_width(0), 1);
        assert_eq!(bytes_to_hold_width(255), 1);
        assert_eq!(bytes_to_hold_width(256), 2);
        assert_eq!(bytes_to_hold_width(32767), 2);
        assert_eq!(bytes_to_hold_width(32768), 4);
        assert_eq!(bytes_to_hold_width(i32::MAX), 4);
    }

    #[test]
    fn test_variable_width_encoding() {
        for (width, expected_len) in [(200, 1), (300, 2), (32767, 2), (32768, 4)] {
            let mut writer = Writer::new();
            writer.write_variable_width(width);
            assert_eq!(writer.len(), expected_len, "width {}", width);
        }
    }

    #[test]
    fn test_scalar_be_roundtrip() {
        let mut writer = Writer::new();
        0x0102_0304_i32.put_be(&mut writer);
        assert_eq!(writer.as_bytes(), &[1, 2, 3, 4]);
        assert_eq!(i32::from_be_chunk(writer.as_bytes()), 0x0102_0304);
    }
}
