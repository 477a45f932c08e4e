//! Type coercion: reading a field as a related primitive type.
//!
//! Conversions are deliberately conservative. Integer types convert among
//! themselves and to boolean, booleans widen to any integer as 0 or 1, and
//! the two float widths convert to each other. Nothing else converts, so a
//! lossy or surprising read is an error rather than a guess.

use crate::error::FudgeError;
use crate::message::field::{Field, FieldValue};
use crate::registry::TypeRegistry;
use crate::types;

/// Result of asking a handler to coerce a field.
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    /// The field is already of the requested type; use its value as is.
    NotRequired,
    /// The converted value.
    Value(FieldValue),
}

/// Applies the built-in conversion lattice. Returns `None` when the
/// conversion is not allowed. Identity conversions are the caller's
/// business and are not handled here.
pub(crate) fn coerce_value(value: &FieldValue, target: u8) -> Option<FieldValue> {
    match (value, target) {
        (FieldValue::Bool(b), types::BYTE) => Some(FieldValue::Byte(*b as i8)),
        (FieldValue::Bool(b), types::SHORT) => Some(FieldValue::I16(*b as i16)),
        (FieldValue::Bool(b), types::INT) => Some(FieldValue::I32(*b as i32)),
        (FieldValue::Bool(b), types::LONG) => Some(FieldValue::I64(*b as i64)),

        (FieldValue::Byte(v), types::BOOLEAN) => Some(FieldValue::Bool(*v != 0)),
        (FieldValue::Byte(v), types::SHORT) => Some(FieldValue::I16(*v as i16)),
        (FieldValue::Byte(v), types::INT) => Some(FieldValue::I32(*v as i32)),
        (FieldValue::Byte(v), types::LONG) => Some(FieldValue::I64(*v as i64)),

        (FieldValue::I16(v), types::BOOLEAN) => Some(FieldValue::Bool(*v != 0)),
        (FieldValue::I16(v), types::INT) => Some(FieldValue::I32(*v as i32)),
        (FieldValue::I16(v), types::LONG) => Some(FieldValue::I64(*v as i64)),

        (FieldValue::I32(v), types::BOOLEAN) => Some(FieldValue::Bool(*v != 0)),
        (FieldValue::I32(v), types::LONG) => Some(FieldValue::I64(*v as i64)),

        (FieldValue::I64(v), types::BOOLEAN) => Some(FieldValue::Bool(*v != 0)),

        (FieldValue::F32(v), types::DOUBLE) => Some(FieldValue::F64(*v as f64)),
        (FieldValue::F64(v), types::FLOAT) => Some(FieldValue::F32(*v as f32)),

        _ => None,
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for bool {}
    impl Sealed for i8 {}
    impl Sealed for i16 {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// A primitive type a field can be read as through coercion.
pub trait Primitive: sealed::Sealed + Sized {
    /// The type id this primitive corresponds to.
    const TYPE_ID: u8;

    #[doc(hidden)]
    fn extract(value: &FieldValue) -> Option<Self>;
}

macro_rules! impl_primitive {
    ($ty:ty, $type_id:expr) => {
        impl Primitive for $ty {
            const TYPE_ID: u8 = $type_id;

            fn extract(value: &FieldValue) -> Option<Self> {
                crate::codec::primitives::Scalar::from_value(value)
            }
        }
    };
}

impl_primitive!(bool, types::BOOLEAN);
impl_primitive!(i8, types::BYTE);
impl_primitive!(i16, types::SHORT);
impl_primitive!(i32, types::INT);
impl_primitive!(i64, types::LONG);
impl_primitive!(f32, types::FLOAT);
impl_primitive!(f64, types::DOUBLE);

impl Field {
    /// Reads the field as `T`, coercing through the field's type handler
    /// in `registry` when the stored type differs.
    pub fn get_as<T: Primitive>(&self, registry: &TypeRegistry) -> Result<T, FudgeError> {
        let coerced = registry
            .lookup(self.type_id())
            .handler()
            .coerce(self, T::TYPE_ID)?;
        let value = match &coerced {
            Coerced::NotRequired => self.value(),
            Coerced::Value(value) => value,
        };
        T::extract(value).ok_or(FudgeError::InvalidCoercion {
            from: self.type_id(),
            to: T::TYPE_ID,
        })
    }

    /// Reads the field as a boolean, using the built-in registry.
    pub fn as_bool(&self) -> Result<bool, FudgeError> {
        self.get_as(crate::registry::default_registry())
    }

    /// Reads the field as a byte, using the built-in registry.
    pub fn as_byte(&self) -> Result<i8, FudgeError> {
        self.get_as(crate::registry::default_registry())
    }

    /// Reads the field as a 16-bit integer, using the built-in registry.
    pub fn as_i16(&self) -> Result<i16, FudgeError> {
        self.get_as(crate::registry::default_registry())
    }

    /// Reads the field as a 32-bit integer, using the built-in registry.
    pub fn as_i32(&self) -> Result<i32, FudgeError> {
        self.get_as(crate::registry::default_registry())
    }

    /// Reads the field as a 64-bit integer, using the built-in registry.
    pub fn as_i64(&self) -> Result<i64, FudgeError> {
        self.get_as(crate::registry::default_registry())
    }

    /// Reads the field as a 32-bit float, using the built-in registry.
    pub fn as_f32(&self) -> Result<f32, FudgeError> {
        self.get_as(crate::registry::default_registry())
    }

    /// Reads the field as a 64-bit float, using the built-in registry.
    pub fn as_f64(&self) -> Result<f64, FudgeError> {
        self.get_as(crate::registry::default_registry())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;

    #[test]
    fn test_integer_widening() {
        let mut msg = Message::new();
        msg.add_byte(None, None, 7).unwrap();
        let field = msg.field_at(0).unwrap();
        assert_eq!(field.as_byte(), Ok(7));
        assert_eq!(field.as_i16(), Ok(7));
        assert_eq!(field.as_i32(), Ok(7));
        assert_eq!(field.as_i64(), Ok(7));
        assert_eq!(field.as_bool(), Ok(true));
    }

    #[test]
    fn test_no_integer_narrowing() {
        let mut msg = Message::new();
        msg.add_integer_at_least(None, None, crate::message::IntegerType::Long, 3)
            .unwrap();
        let field = msg.field_at(0).unwrap();
        assert_eq!(field.as_i64(), Ok(3));
        assert_eq!(field.as_bool(), Ok(true));
        assert_eq!(
            field.as_i32(),
            Err(FudgeError::InvalidCoercion {
                from: types::LONG,
                to: types::INT
            })
        );
    }

    #[test]
    fn test_bool_to_integers() {
        let mut msg = Message::new();
        msg.add_bool(None, None, true).unwrap();
        msg.add_bool(None, None, false).unwrap();
        assert_eq!(msg.field_at(0).unwrap().as_i64(), Ok(1));
        assert_eq!(msg.field_at(1).unwrap().as_byte(), Ok(0));
        assert!(msg.field_at(0).unwrap().as_f64().is_err());
    }

    #[test]
    fn test_float_conversions() {
        let mut msg = Message::new();
        msg.add_f32(None, None, 1.5).unwrap();
        msg.add_f64(None, None, 2.25).unwrap();
        assert_eq!(msg.field_at(0).unwrap().as_f64(), Ok(1.5));
        assert_eq!(msg.field_at(1).unwrap().as_f32(), Ok(2.25));
        assert!(msg.field_at(0).unwrap().as_i32().is_err());
    }

    #[test]
    fn test_non_numeric_types_never_coerce() {
        let mut msg = Message::new();
        msg.add_string(None, None, "1").unwrap();
        msg.add_indicator(None, None).unwrap();
        assert!(msg.field_at(0).unwrap().as_i32().is_err());
        assert!(msg.field_at(1).unwrap().as_bool().is_err());
    }
}
