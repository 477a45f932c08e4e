//! The type registry: per-type-id wire behaviour.
//!
//! Every one of the 256 type ids maps to a descriptor holding the type's
//! payload kind, its fixed width if it has one, and a handler implementing
//! its encode, decode and coercion behaviour. Ids nobody registered fall
//! back to an opaque variable-width byte payload, so unknown types pass
//! through a decode/encode cycle untouched.

pub mod builtin;

use std::sync::Arc;

use lazy_static::lazy_static;

use crate::codec::decode::DecodeContext;
use crate::codec::primitives::{Scalar, Writer};
use crate::coerce::Coerced;
use crate::error::FudgeError;
use crate::message::field::{Field, FieldValue};
use crate::types;

use builtin::{ArrayHandler, IndicatorHandler, MessageHandler, OpaqueHandler, ScalarHandler, StringHandler};

/// How a type's payload is represented in a decoded field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// The value lives inline in the field (scalars, indicator).
    Local,
    /// The value is a raw byte block.
    Bytes,
    /// The value is a UTF-8 string.
    String,
    /// The value is a nested message.
    SubMessage,
}

impl PayloadKind {
    pub(crate) fn describe(self) -> &'static str {
        match self {
            PayloadKind::Local => "local",
            PayloadKind::Bytes => "bytes",
            PayloadKind::String => "string",
            PayloadKind::SubMessage => "sub-message",
        }
    }
}

/// Wire behaviour for one type id.
///
/// `decode` receives exactly the payload bytes the field header announced.
/// `encode` writes the width prefix (for variable-width types) followed by
/// the payload. `coerce` implements the type's conversions; the default
/// accepts only the identity conversion.
pub trait TypeHandler: Send + Sync {
    /// Turns payload bytes into a field value.
    fn decode(&self, bytes: &[u8], ctx: &DecodeContext<'_>) -> Result<FieldValue, FudgeError>;

    /// Writes the field's payload (and width prefix where applicable).
    fn encode(
        &self,
        field: &Field,
        registry: &TypeRegistry,
        writer: &mut Writer,
    ) -> Result<(), FudgeError>;

    /// Converts a field's value to the target type.
    fn coerce(&self, field: &Field, target: u8) -> Result<Coerced, FudgeError> {
        if field.type_id() == target {
            return Ok(Coerced::NotRequired);
        }
        Err(FudgeError::InvalidCoercion {
            from: field.type_id(),
            to: target,
        })
    }
}

/// One registry slot.
#[derive(Clone)]
pub struct TypeDescriptor {
    type_id: u8,
    fixed_width: Option<u32>,
    payload: PayloadKind,
    handler: Arc<dyn TypeHandler>,
}

impl TypeDescriptor {
    /// The type id this descriptor is registered under.
    pub fn type_id(&self) -> u8 {
        self.type_id
    }

    /// The payload width for fixed-width types.
    pub fn fixed_width(&self) -> Option<u32> {
        self.fixed_width
    }

    /// The payload kind of decoded fields of this type.
    pub fn payload(&self) -> PayloadKind {
        self.payload
    }

    /// The type's wire behaviour.
    pub fn handler(&self) -> &Arc<dyn TypeHandler> {
        &self.handler
    }
}

impl std::fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_id", &self.type_id)
            .field("fixed_width", &self.fixed_width)
            .field("payload", &self.payload)
            .finish_non_exhaustive()
    }
}

/// The full 256-slot type table.
///
/// Registration takes `&mut self`, so a registry is set up first and shared
/// immutably afterwards; the encode and decode paths only ever read it.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    slots: Vec<TypeDescriptor>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates a registry with the built-in types installed and every other
    /// slot holding the opaque fallback.
    pub fn new() -> Self {
        let opaque: Arc<dyn TypeHandler> = Arc::new(OpaqueHandler);
        let slots = (0..=u8::MAX)
            .map(|type_id| TypeDescriptor {
                type_id,
                fixed_width: None,
                payload: PayloadKind::Bytes,
                handler: Arc::clone(&opaque),
            })
            .collect();
        let mut registry = Self { slots };
        registry.install_builtins();
        registry
    }

    fn install_builtins(&mut self) {
        self.install(
            types::INDICATOR,
            Some(0),
            PayloadKind::Local,
            Arc::new(IndicatorHandler),
        );
        self.install_scalar::<bool>(types::BOOLEAN);
        self.install_scalar::<i8>(types::BYTE);
        self.install_scalar::<i16>(types::SHORT);
        self.install_scalar::<i32>(types::INT);
        self.install_scalar::<i64>(types::LONG);
        self.install_scalar::<f32>(types::FLOAT);
        self.install_scalar::<f64>(types::DOUBLE);

        self.install_array::<i16>(types::SHORT_ARRAY);
        self.install_array::<i32>(types::INT_ARRAY);
        self.install_array::<i64>(types::LONG_ARRAY);
        self.install_array::<f32>(types::FLOAT_ARRAY);
        self.install_array::<f64>(types::DOUBLE_ARRAY);

        // BYTE_ARRAY keeps the opaque fallback: variable-width raw bytes.
        self.install(
            types::STRING,
            None,
            PayloadKind::String,
            Arc::new(StringHandler),
        );
        self.install(
            types::SUB_MESSAGE,
            None,
            PayloadKind::SubMessage,
            Arc::new(MessageHandler),
        );

        for (type_id, size) in types::FIXED_BYTE_ARRAY_SIZES {
            self.install(
                type_id,
                Some(size as u32),
                PayloadKind::Bytes,
                Arc::new(OpaqueHandler),
            );
        }

        self.install(types::DATE, Some(4), PayloadKind::Bytes, Arc::new(OpaqueHandler));
        self.install(types::TIME, Some(8), PayloadKind::Bytes, Arc::new(OpaqueHandler));
        self.install(
            types::DATETIME,
            Some(12),
            PayloadKind::Bytes,
            Arc::new(OpaqueHandler),
        );
    }

    fn install_scalar<T: Scalar>(&mut self, type_id: u8) {
        self.install(
            type_id,
            Some(T::WIDTH as u32),
            PayloadKind::Local,
            Arc::new(ScalarHandler::<T>::new()),
        );
    }

    fn install_array<T: Scalar>(&mut self, type_id: u8) {
        self.install(
            type_id,
            None,
            PayloadKind::Bytes,
            Arc::new(ArrayHandler::<T>::new()),
        );
    }

    fn install(
        &mut self,
        type_id: u8,
        fixed_width: Option<u32>,
        payload: PayloadKind,
        handler: Arc<dyn TypeHandler>,
    ) {
        self.slots[type_id as usize] = TypeDescriptor {
            type_id,
            fixed_width,
            payload,
            handler,
        };
    }

    /// Registers a type handler. Registered payloads must be bytes or
    /// sub-message; the local and string kinds are reserved for built-ins.
    ///
    /// Registering an id twice silently replaces the earlier entry, and
    /// there is no protection against overwriting a built-in slot. Ids
    /// from [`types::FIRST_USER_TYPE`] up are set aside for user types;
    /// callers registering below that range take over the wire semantics
    /// of a built-in id. Registered types are always variable-width.
    pub fn register(
        &mut self,
        type_id: u8,
        payload: PayloadKind,
        handler: Arc<dyn TypeHandler>,
    ) -> Result<(), FudgeError> {
        if !matches!(payload, PayloadKind::Bytes | PayloadKind::SubMessage) {
            return Err(FudgeError::InvalidUserType { type_id });
        }
        self.install(type_id, None, payload, handler);
        Ok(())
    }

    /// Returns the descriptor for a type id. Never fails: unregistered ids
    /// resolve to the opaque fallback.
    pub fn lookup(&self, type_id: u8) -> &TypeDescriptor {
        &self.slots[type_id as usize]
    }
}

lazy_static! {
    static ref DEFAULT_REGISTRY: TypeRegistry = TypeRegistry::new();
}

/// The shared registry holding only the built-in types.
pub fn default_registry() -> &'static TypeRegistry {
    &DEFAULT_REGISTRY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_fixed_widths() {
        let registry = TypeRegistry::new();
        let expect = [
            (types::INDICATOR, Some(0)),
            (types::BOOLEAN, Some(1)),
            (types::BYTE, Some(1)),
            (types::SHORT, Some(2)),
            (types::INT, Some(4)),
            (types::LONG, Some(8)),
            (types::FLOAT, Some(4)),
            (types::DOUBLE, Some(8)),
            (types::BYTE_ARRAY, None),
            (types::STRING, None),
            (types::SUB_MESSAGE, None),
            (types::BYTE_ARRAY_512, Some(512)),
            (types::DATE, Some(4)),
            (types::TIME, Some(8)),
            (types::DATETIME, Some(12)),
        ];
        for (type_id, width) in expect {
            assert_eq!(registry.lookup(type_id).fixed_width(), width, "type {}", type_id);
        }
    }

    #[test]
    fn test_unregistered_ids_are_opaque() {
        let registry = TypeRegistry::new();
        let descriptor = registry.lookup(200);
        assert_eq!(descriptor.fixed_width(), None);
        assert_eq!(descriptor.payload(), PayloadKind::Bytes);
    }

    #[test]
    fn test_register_validation() {
        let mut registry = TypeRegistry::new();
        assert_eq!(
            registry.register(40, PayloadKind::Local, Arc::new(OpaqueHandler)),
            Err(FudgeError::InvalidUserType { type_id: 40 })
        );
        assert_eq!(
            registry.register(41, PayloadKind::String, Arc::new(OpaqueHandler)),
            Err(FudgeError::InvalidUserType { type_id: 41 })
        );
        registry
            .register(40, PayloadKind::Bytes, Arc::new(OpaqueHandler))
            .unwrap();
        assert_eq!(registry.lookup(40).payload(), PayloadKind::Bytes);
    }

    #[test]
    fn test_register_overwrites_builtin_slots() {
        let mut registry = TypeRegistry::new();
        registry
            .register(types::STRING, PayloadKind::Bytes, Arc::new(OpaqueHandler))
            .unwrap();
        let descriptor = registry.lookup(types::STRING);
        assert_eq!(descriptor.payload(), PayloadKind::Bytes);
        assert_eq!(descriptor.fixed_width(), None);
        // the default registry is untouched
        assert_eq!(
            default_registry().lookup(types::STRING).payload(),
            PayloadKind::String
        );
    }
}
