//! Handlers for the built-in types.

use std::marker::PhantomData;
use std::sync::Arc;

use crate::codec::decode::{self, DecodeContext};
use crate::codec::encode;
use crate::codec::primitives::{Reader, Scalar, Writer};
use crate::coerce::{self, Coerced};
use crate::error::FudgeError;
use crate::message::Message;
use crate::message::field::{Field, FieldValue};
use crate::registry::{TypeHandler, TypeRegistry};

/// The zero-width presence marker.
pub struct IndicatorHandler;

impl TypeHandler for IndicatorHandler {
    fn decode(&self, bytes: &[u8], _ctx: &DecodeContext<'_>) -> Result<FieldValue, FudgeError> {
        debug_assert!(bytes.is_empty());
        Ok(FieldValue::Indicator)
    }

    fn encode(
        &self,
        _field: &Field,
        _registry: &TypeRegistry,
        _writer: &mut Writer,
    ) -> Result<(), FudgeError> {
        Ok(())
    }
}

/// Fixed-width scalars: bool, the four integer widths and the two floats.
pub struct ScalarHandler<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> ScalarHandler<T> {
    pub(crate) fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T: Scalar> TypeHandler for ScalarHandler<T> {
    fn decode(&self, bytes: &[u8], _ctx: &DecodeContext<'_>) -> Result<FieldValue, FudgeError> {
        if bytes.len() != T::WIDTH {
            return Err(FudgeError::OutOfBytes {
                context: "scalar payload",
            });
        }
        Ok(T::from_be_chunk(bytes).into_value())
    }

    fn encode(
        &self,
        field: &Field,
        _registry: &TypeRegistry,
        writer: &mut Writer,
    ) -> Result<(), FudgeError> {
        let value = T::from_value(field.value()).ok_or(FudgeError::PayloadMismatch {
            type_id: field.type_id(),
            expected: "local",
        })?;
        value.put_be(writer);
        Ok(())
    }

    fn coerce(&self, field: &Field, target: u8) -> Result<Coerced, FudgeError> {
        if field.type_id() == target {
            return Ok(Coerced::NotRequired);
        }
        coerce::coerce_value(field.value(), target)
            .map(Coerced::Value)
            .ok_or(FudgeError::InvalidCoercion {
                from: field.type_id(),
                to: target,
            })
    }
}

/// Numeric arrays. Elements travel big-endian on the wire and are held as
/// one host-order byte block in the decoded field.
pub struct ArrayHandler<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> ArrayHandler<T> {
    pub(crate) fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T: Scalar> TypeHandler for ArrayHandler<T> {
    fn decode(&self, bytes: &[u8], _ctx: &DecodeContext<'_>) -> Result<FieldValue, FudgeError> {
        if bytes.len() % T::WIDTH != 0 {
            return Err(FudgeError::OutOfBytes {
                context: "array element",
            });
        }
        let mut block = Vec::with_capacity(bytes.len());
        for chunk in bytes.chunks_exact(T::WIDTH) {
            T::from_be_chunk(chunk).put_ne(&mut block);
        }
        Ok(FieldValue::Bytes(block))
    }

    fn encode(
        &self,
        field: &Field,
        _registry: &TypeRegistry,
        writer: &mut Writer,
    ) -> Result<(), FudgeError> {
        let block = field.bytes().ok_or(FudgeError::PayloadMismatch {
            type_id: field.type_id(),
            expected: "bytes",
        })?;
        debug_assert_eq!(block.len() % T::WIDTH, 0);
        writer.write_variable_width(block.len() as i32);
        for chunk in block.chunks_exact(T::WIDTH) {
            T::from_ne_chunk(chunk).put_be(writer);
        }
        Ok(())
    }
}

/// Raw byte payloads: the variable byte array, the fixed byte arrays, the
/// date and time types and every unregistered or user type id.
pub struct OpaqueHandler;

impl TypeHandler for OpaqueHandler {
    fn decode(&self, bytes: &[u8], _ctx: &DecodeContext<'_>) -> Result<FieldValue, FudgeError> {
        Ok(FieldValue::Bytes(bytes.to_vec()))
    }

    fn encode(
        &self,
        field: &Field,
        registry: &TypeRegistry,
        writer: &mut Writer,
    ) -> Result<(), FudgeError> {
        let bytes = field.bytes().ok_or(FudgeError::PayloadMismatch {
            type_id: field.type_id(),
            expected: "bytes",
        })?;
        match registry.lookup(field.type_id()).fixed_width() {
            Some(expected) => {
                if bytes.len() != expected as usize {
                    return Err(FudgeError::FixedWidthMismatch {
                        type_id: field.type_id(),
                        len: bytes.len(),
                        expected: expected as usize,
                    });
                }
            }
            None => writer.write_variable_width(bytes.len() as i32),
        }
        writer.write_bytes(bytes);
        Ok(())
    }
}

/// UTF-8 strings.
pub struct StringHandler;

impl TypeHandler for StringHandler {
    fn decode(&self, bytes: &[u8], _ctx: &DecodeContext<'_>) -> Result<FieldValue, FudgeError> {
        let s = std::str::from_utf8(bytes).map_err(|_| FudgeError::InvalidString {
            context: "string payload",
        })?;
        Ok(FieldValue::Str(Arc::from(s)))
    }

    fn encode(
        &self,
        field: &Field,
        _registry: &TypeRegistry,
        writer: &mut Writer,
    ) -> Result<(), FudgeError> {
        let s = field.string().ok_or(FudgeError::PayloadMismatch {
            type_id: field.type_id(),
            expected: "string",
        })?;
        writer.write_variable_width(s.len() as i32);
        writer.write_bytes(s.as_bytes());
        Ok(())
    }
}

/// Nested sub-messages.
pub struct MessageHandler;

impl TypeHandler for MessageHandler {
    fn decode(&self, bytes: &[u8], ctx: &DecodeContext<'_>) -> Result<FieldValue, FudgeError> {
        let nested_ctx = ctx.nest()?;
        let mut reader = Reader::new(bytes);
        let mut message = Message::new();
        decode::decode_fields_into(&mut reader, &mut message, &nested_ctx)?;
        Ok(FieldValue::Message(Arc::new(message)))
    }

    fn encode(
        &self,
        field: &Field,
        registry: &TypeRegistry,
        writer: &mut Writer,
    ) -> Result<(), FudgeError> {
        let message = field.message().ok_or(FudgeError::PayloadMismatch {
            type_id: field.type_id(),
            expected: "sub-message",
        })?;
        let width = encode::message_length(message, registry)?;
        writer.write_variable_width(width);
        encode::encode_fields(message, registry, writer)
    }
}
