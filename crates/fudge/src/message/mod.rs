//! Messages: ordered collections of typed, optionally named fields.

pub mod envelope;
pub mod field;

use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use crate::codec::primitives::Scalar;
use crate::datetime::{Date, DateTime, Time};
use crate::error::FudgeError;
use crate::limits::MAX_NAME_LEN;
use crate::types;

pub use field::{Field, FieldValue};

/// Sentinel meaning the encoded width has not been computed yet.
const WIDTH_UNKNOWN: i32 = -1;

/// The narrowing floor for integer fields.
///
/// Integers are stored in the smallest built-in type that holds the value,
/// but never narrower than the floor passed to
/// [`Message::add_integer_at_least`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IntegerType {
    Byte,
    Short,
    Int,
    Long,
}

impl IntegerType {
    /// The wire type id for this width.
    pub fn type_id(self) -> u8 {
        match self {
            IntegerType::Byte => types::BYTE,
            IntegerType::Short => types::SHORT,
            IntegerType::Int => types::INT,
            IntegerType::Long => types::LONG,
        }
    }

    /// The smallest width that holds `value`.
    fn fitting(value: i64) -> Self {
        if i8::try_from(value).is_ok() {
            IntegerType::Byte
        } else if i16::try_from(value).is_ok() {
            IntegerType::Short
        } else if i32::try_from(value).is_ok() {
            IntegerType::Int
        } else {
            IntegerType::Long
        }
    }
}

/// An ordered collection of fields.
///
/// Messages are built mutably through the `add_*` methods, then typically
/// frozen behind an [`Arc`] when nested into another message or wrapped in
/// an [`Envelope`](envelope::Envelope). Fields keep their insertion order
/// and duplicate names and ordinals are allowed; the by-name and by-ordinal
/// lookups return the first match.
#[derive(Debug, Default)]
pub struct Message {
    fields: Vec<Field>,
    // Encoded width memo. WIDTH_UNKNOWN until computed, reset on append.
    cached_width: AtomicI32,
}

impl Clone for Message {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
            cached_width: AtomicI32::new(self.cached_width.load(Ordering::Relaxed)),
        }
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        // the width memo is derived state and not part of message identity
        self.fields == other.fields
    }
}

impl Message {
    /// Creates an empty message.
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            cached_width: AtomicI32::new(WIDTH_UNKNOWN),
        }
    }

    /// Number of fields in the message.
    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    /// Iterates over the fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    /// Returns the field at `index`.
    pub fn field_at(&self, index: usize) -> Result<&Field, FudgeError> {
        self.fields.get(index).ok_or(FudgeError::InvalidIndex {
            index,
            num_fields: self.fields.len(),
        })
    }

    /// Returns the first field named `name`.
    pub fn field_by_name(&self, name: &str) -> Result<&Field, FudgeError> {
        self.fields
            .iter()
            .find(|f| f.name() == Some(name))
            .ok_or_else(|| FudgeError::InvalidName {
                name: name.to_owned(),
            })
    }

    /// Returns the first field with ordinal `ordinal`.
    pub fn field_by_ordinal(&self, ordinal: i16) -> Result<&Field, FudgeError> {
        self.fields
            .iter()
            .find(|f| f.ordinal() == Some(ordinal))
            .ok_or(FudgeError::InvalidOrdinal { ordinal })
    }

    // =========================================================================
    // FIELD APPENDING
    // =========================================================================

    /// Validates the name and appends, leaving the message untouched on
    /// failure.
    fn append(
        &mut self,
        type_id: u8,
        byte_length: i32,
        name: Option<&str>,
        ordinal: Option<i16>,
        value: FieldValue,
    ) -> Result<(), FudgeError> {
        let name: Option<Arc<str>> = match name {
            Some(n) if n.len() > MAX_NAME_LEN => {
                return Err(FudgeError::NameTooLong { len: n.len() });
            }
            Some(n) => Some(Arc::from(n)),
            None => None,
        };
        self.fields
            .push(Field::new(type_id, byte_length, name, ordinal, value));
        self.cached_width.store(WIDTH_UNKNOWN, Ordering::Relaxed);
        Ok(())
    }

    /// Appends a field decoded from the wire, keeping its type id exactly.
    pub(crate) fn append_decoded(
        &mut self,
        type_id: u8,
        byte_length: i32,
        name: Option<&str>,
        ordinal: Option<i16>,
        value: FieldValue,
    ) -> Result<(), FudgeError> {
        self.append(type_id, byte_length, name, ordinal, value)
    }

    /// Adds a zero-width indicator field.
    pub fn add_indicator(
        &mut self,
        name: Option<&str>,
        ordinal: Option<i16>,
    ) -> Result<(), FudgeError> {
        self.append(types::INDICATOR, 0, name, ordinal, FieldValue::Indicator)
    }

    /// Adds a boolean field.
    pub fn add_bool(
        &mut self,
        name: Option<&str>,
        ordinal: Option<i16>,
        value: bool,
    ) -> Result<(), FudgeError> {
        self.append(types::BOOLEAN, 0, name, ordinal, FieldValue::Bool(value))
    }

    /// Adds a byte field.
    pub fn add_byte(
        &mut self,
        name: Option<&str>,
        ordinal: Option<i16>,
        value: i8,
    ) -> Result<(), FudgeError> {
        self.append(types::BYTE, 0, name, ordinal, FieldValue::Byte(value))
    }

    /// Adds an integer field, stored in the narrowest type that holds it.
    pub fn add_i16(
        &mut self,
        name: Option<&str>,
        ordinal: Option<i16>,
        value: i16,
    ) -> Result<(), FudgeError> {
        self.add_integer(name, ordinal, value as i64)
    }

    /// Adds an integer field, stored in the narrowest type that holds it.
    pub fn add_i32(
        &mut self,
        name: Option<&str>,
        ordinal: Option<i16>,
        value: i32,
    ) -> Result<(), FudgeError> {
        self.add_integer(name, ordinal, value as i64)
    }

    /// Adds an integer field, stored in the narrowest type that holds it.
    pub fn add_i64(
        &mut self,
        name: Option<&str>,
        ordinal: Option<i16>,
        value: i64,
    ) -> Result<(), FudgeError> {
        self.add_integer(name, ordinal, value)
    }

    /// Adds an integer field in the narrowest of the four integer types
    /// that holds `value`.
    pub fn add_integer(
        &mut self,
        name: Option<&str>,
        ordinal: Option<i16>,
        value: i64,
    ) -> Result<(), FudgeError> {
        self.add_integer_at_least(name, ordinal, IntegerType::Byte, value)
    }

    /// Adds an integer field narrowed no further than `minimum`.
    pub fn add_integer_at_least(
        &mut self,
        name: Option<&str>,
        ordinal: Option<i16>,
        minimum: IntegerType,
        value: i64,
    ) -> Result<(), FudgeError> {
        let stored = IntegerType::fitting(value).max(minimum);
        let field_value = match stored {
            IntegerType::Byte => FieldValue::Byte(value as i8),
            IntegerType::Short => FieldValue::I16(value as i16),
            IntegerType::Int => FieldValue::I32(value as i32),
            IntegerType::Long => FieldValue::I64(value),
        };
        self.append(stored.type_id(), 0, name, ordinal, field_value)
    }

    /// Adds a 32-bit float field.
    pub fn add_f32(
        &mut self,
        name: Option<&str>,
        ordinal: Option<i16>,
        value: f32,
    ) -> Result<(), FudgeError> {
        self.append(types::FLOAT, 0, name, ordinal, FieldValue::F32(value))
    }

    /// Adds a 64-bit float field.
    pub fn add_f64(
        &mut self,
        name: Option<&str>,
        ordinal: Option<i16>,
        value: f64,
    ) -> Result<(), FudgeError> {
        self.append(types::DOUBLE, 0, name, ordinal, FieldValue::F64(value))
    }

    /// Adds a variable-length byte array field.
    pub fn add_bytes(
        &mut self,
        name: Option<&str>,
        ordinal: Option<i16>,
        bytes: &[u8],
    ) -> Result<(), FudgeError> {
        let byte_length = payload_len(bytes.len(), "byte array")?;
        self.append(
            types::BYTE_ARRAY,
            byte_length,
            name,
            ordinal,
            FieldValue::Bytes(bytes.to_vec()),
        )
    }

    /// Adds a fixed byte array field. `bytes` must be one of the nine
    /// built-in lengths (4, 8, 16, 20, 32, 64, 128, 256 or 512).
    pub fn add_fixed_bytes(
        &mut self,
        name: Option<&str>,
        ordinal: Option<i16>,
        bytes: &[u8],
    ) -> Result<(), FudgeError> {
        let type_id = types::fixed_byte_array_type(bytes.len())
            .ok_or(FudgeError::InvalidFixedArrayLength { len: bytes.len() })?;
        self.append(
            type_id,
            bytes.len() as i32,
            name,
            ordinal,
            FieldValue::Bytes(bytes.to_vec()),
        )
    }

    fn add_array<T: Scalar>(
        &mut self,
        type_id: u8,
        name: Option<&str>,
        ordinal: Option<i16>,
        values: &[T],
    ) -> Result<(), FudgeError> {
        let len = values.len().checked_mul(T::WIDTH).unwrap_or(usize::MAX);
        let byte_length = payload_len(len, "array")?;
        let mut block = Vec::with_capacity(len);
        for &v in values {
            v.put_ne(&mut block);
        }
        self.append(type_id, byte_length, name, ordinal, FieldValue::Bytes(block))
    }

    /// Adds an array of 16-bit integers.
    pub fn add_i16_array(
        &mut self,
        name: Option<&str>,
        ordinal: Option<i16>,
        values: &[i16],
    ) -> Result<(), FudgeError> {
        self.add_array(types::SHORT_ARRAY, name, ordinal, values)
    }

    /// Adds an array of 32-bit integers.
    pub fn add_i32_array(
        &mut self,
        name: Option<&str>,
        ordinal: Option<i16>,
        values: &[i32],
    ) -> Result<(), FudgeError> {
        self.add_array(types::INT_ARRAY, name, ordinal, values)
    }

    /// Adds an array of 64-bit integers.
    pub fn add_i64_array(
        &mut self,
        name: Option<&str>,
        ordinal: Option<i16>,
        values: &[i64],
    ) -> Result<(), FudgeError> {
        self.add_array(types::LONG_ARRAY, name, ordinal, values)
    }

    /// Adds an array of 32-bit floats.
    pub fn add_f32_array(
        &mut self,
        name: Option<&str>,
        ordinal: Option<i16>,
        values: &[f32],
    ) -> Result<(), FudgeError> {
        self.add_array(types::FLOAT_ARRAY, name, ordinal, values)
    }

    /// Adds an array of 64-bit floats.
    pub fn add_f64_array(
        &mut self,
        name: Option<&str>,
        ordinal: Option<i16>,
        values: &[f64],
    ) -> Result<(), FudgeError> {
        self.add_array(types::DOUBLE_ARRAY, name, ordinal, values)
    }

    /// Adds a UTF-8 string field.
    pub fn add_string(
        &mut self,
        name: Option<&str>,
        ordinal: Option<i16>,
        value: &str,
    ) -> Result<(), FudgeError> {
        let byte_length = payload_len(value.len(), "string")?;
        self.append(
            types::STRING,
            byte_length,
            name,
            ordinal,
            FieldValue::Str(Arc::from(value)),
        )
    }

    /// Adds a nested sub-message field.
    pub fn add_message(
        &mut self,
        name: Option<&str>,
        ordinal: Option<i16>,
        message: impl Into<Arc<Message>>,
    ) -> Result<(), FudgeError> {
        self.append(
            types::SUB_MESSAGE,
            0,
            name,
            ordinal,
            FieldValue::Message(message.into()),
        )
    }

    /// Adds a field of a user-registered type as raw payload bytes.
    pub fn add_opaque(
        &mut self,
        type_id: u8,
        name: Option<&str>,
        ordinal: Option<i16>,
        bytes: &[u8],
    ) -> Result<(), FudgeError> {
        let byte_length = payload_len(bytes.len(), "payload")?;
        self.append(
            type_id,
            byte_length,
            name,
            ordinal,
            FieldValue::Bytes(bytes.to_vec()),
        )
    }

    /// Adds a date field.
    pub fn add_date(
        &mut self,
        name: Option<&str>,
        ordinal: Option<i16>,
        date: Date,
    ) -> Result<(), FudgeError> {
        let bytes = date.to_wire_bytes();
        self.append(
            types::DATE,
            bytes.len() as i32,
            name,
            ordinal,
            FieldValue::Bytes(bytes.to_vec()),
        )
    }

    /// Adds a time field.
    pub fn add_time(
        &mut self,
        name: Option<&str>,
        ordinal: Option<i16>,
        time: Time,
    ) -> Result<(), FudgeError> {
        let bytes = time.to_wire_bytes();
        self.append(
            types::TIME,
            bytes.len() as i32,
            name,
            ordinal,
            FieldValue::Bytes(bytes.to_vec()),
        )
    }

    /// Adds a combined date and time field.
    pub fn add_datetime(
        &mut self,
        name: Option<&str>,
        ordinal: Option<i16>,
        datetime: DateTime,
    ) -> Result<(), FudgeError> {
        let bytes = datetime.to_wire_bytes();
        self.append(
            types::DATETIME,
            bytes.len() as i32,
            name,
            ordinal,
            FieldValue::Bytes(bytes.to_vec()),
        )
    }

    // =========================================================================
    // WIDTH MEMO
    // =========================================================================

    pub(crate) fn cached_width(&self) -> Option<i32> {
        match self.cached_width.load(Ordering::Relaxed) {
            WIDTH_UNKNOWN => None,
            width => Some(width),
        }
    }

    pub(crate) fn set_cached_width(&self, width: i32) {
        self.cached_width.store(width, Ordering::Relaxed);
    }
}

/// Converts a payload length to the signed 32-bit form the wire uses.
fn payload_len(len: usize, context: &'static str) -> Result<i32, FudgeError> {
    i32::try_from(len).map_err(|_| FudgeError::PayloadTooLarge { context, len })
}
