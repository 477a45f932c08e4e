//! Fields: a type id, an optional name and ordinal, and a value.

use std::sync::Arc;

use crate::codec::primitives::Scalar;
use crate::message::Message;

/// The value carried by a field.
///
/// Numeric array types share the [`Bytes`](FieldValue::Bytes) variant: the
/// elements live as one host-order byte block and the typed accessors on
/// [`Field`] chunk them back out. Unregistered and user types also land
/// here as raw payload bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Zero-width presence marker.
    Indicator,
    Bool(bool),
    Byte(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    /// Raw bytes: byte arrays, numeric array blocks, opaque user payloads.
    Bytes(Vec<u8>),
    Str(Arc<str>),
    Message(Arc<Message>),
}

/// A single field of a [`Message`].
///
/// Fields are immutable once appended; the only way to construct one is
/// through the `add_*` methods on [`Message`].
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    type_id: u8,
    byte_length: i32,
    name: Option<Arc<str>>,
    ordinal: Option<i16>,
    value: FieldValue,
}

impl Field {
    pub(crate) fn new(
        type_id: u8,
        byte_length: i32,
        name: Option<Arc<str>>,
        ordinal: Option<i16>,
        value: FieldValue,
    ) -> Self {
        Self {
            type_id,
            byte_length,
            name,
            ordinal,
            value,
        }
    }

    /// The field's Fudge type id.
    pub fn type_id(&self) -> u8 {
        self.type_id
    }

    /// Payload size in bytes for variable-width data payloads, zero for
    /// everything whose width is implied by the type.
    pub fn byte_length(&self) -> i32 {
        self.byte_length
    }

    /// The field's name, if it has one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The field's ordinal, if it has one.
    pub fn ordinal(&self) -> Option<i16> {
        self.ordinal
    }

    /// The field's value.
    pub fn value(&self) -> &FieldValue {
        &self.value
    }

    /// The raw byte payload, for fields that carry one.
    pub fn bytes(&self) -> Option<&[u8]> {
        match &self.value {
            FieldValue::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// The string payload, for string fields.
    pub fn string(&self) -> Option<&str> {
        match &self.value {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The nested message, for sub-message fields.
    pub fn message(&self) -> Option<&Arc<Message>> {
        match &self.value {
            FieldValue::Message(msg) => Some(msg),
            _ => None,
        }
    }

    fn array_of<T: Scalar>(&self) -> Option<Vec<T>> {
        let bytes = self.bytes()?;
        if bytes.len() % T::WIDTH != 0 {
            return None;
        }
        Some(bytes.chunks_exact(T::WIDTH).map(T::from_ne_chunk).collect())
    }

    /// The elements of a 16-bit integer array field.
    pub fn i16_array(&self) -> Option<Vec<i16>> {
        self.array_of()
    }

    /// The elements of a 32-bit integer array field.
    pub fn i32_array(&self) -> Option<Vec<i32>> {
        self.array_of()
    }

    /// The elements of a 64-bit integer array field.
    pub fn i64_array(&self) -> Option<Vec<i64>> {
        self.array_of()
    }

    /// The elements of a 32-bit float array field.
    pub fn f32_array(&self) -> Option<Vec<f32>> {
        self.array_of()
    }

    /// The elements of a 64-bit float array field.
    pub fn f64_array(&self) -> Option<Vec<f64>> {
        self.array_of()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_array_accessors() {
        let mut block = Vec::new();
        for v in [1i32, -2, 300_000] {
            block.extend_from_slice(&v.to_ne_bytes());
        }
        let field = Field::new(
            crate::types::INT_ARRAY,
            block.len() as i32,
            None,
            None,
            FieldValue::Bytes(block),
        );
        assert_eq!(field.i32_array(), Some(vec![1, -2, 300_000]));
        // wrong element width for the block
        assert_eq!(field.i64_array(), None);
        assert_eq!(field.string(), None);
    }
}
