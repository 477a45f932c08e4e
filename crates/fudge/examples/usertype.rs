//! Registers a user type with a custom handler and sends it through a
//! full encode/decode cycle.
//!
//! Run with `cargo run --example usertype`.

use std::sync::Arc;

use fudge::codec::primitives::Writer;
use fudge::{
    Coerced, DecodeContext, Envelope, Field, FieldValue, FudgeError, Message, PayloadKind,
    TypeHandler, TypeRegistry, types,
};

/// First free id in the user range.
const CURRENCY_TYPE: u8 = 32;

/// An amount of money: an ISO currency code and a minor-unit amount,
/// carried as 3 code bytes followed by a big-endian i64.
struct CurrencyHandler;

impl TypeHandler for CurrencyHandler {
    fn decode(&self, bytes: &[u8], _ctx: &DecodeContext<'_>) -> Result<FieldValue, FudgeError> {
        if bytes.len() != 11 {
            return Err(FudgeError::FixedWidthMismatch {
                type_id: CURRENCY_TYPE,
                len: bytes.len(),
                expected: 11,
            });
        }
        Ok(FieldValue::Bytes(bytes.to_vec()))
    }

    fn encode(
        &self,
        field: &Field,
        _registry: &TypeRegistry,
        writer: &mut Writer,
    ) -> Result<(), FudgeError> {
        let bytes = field.bytes().ok_or(FudgeError::PayloadMismatch {
            type_id: CURRENCY_TYPE,
            expected: "bytes",
        })?;
        writer.write_variable_width(bytes.len() as i32);
        writer.write_bytes(bytes);
        Ok(())
    }

    fn coerce(&self, field: &Field, target: u8) -> Result<Coerced, FudgeError> {
        if field.type_id() == target {
            return Ok(Coerced::NotRequired);
        }
        if target == types::STRING {
            if let Some(text) = field.bytes().and_then(format_amount) {
                return Ok(Coerced::Value(FieldValue::Str(Arc::from(text))));
            }
        }
        Err(FudgeError::InvalidCoercion {
            from: field.type_id(),
            to: target,
        })
    }
}

fn pack_amount(code: &str, minor_units: i64) -> Vec<u8> {
    let mut bytes = code.as_bytes()[..3].to_vec();
    bytes.extend_from_slice(&minor_units.to_be_bytes());
    bytes
}

fn format_amount(bytes: &[u8]) -> Option<String> {
    if bytes.len() != 11 {
        return None;
    }
    let code = std::str::from_utf8(&bytes[..3]).ok()?;
    let minor_units = i64::from_be_bytes(bytes[3..].try_into().ok()?);
    Some(format!("{} {}.{:02}", code, minor_units / 100, minor_units % 100))
}

fn main() -> Result<(), FudgeError> {
    let mut registry = TypeRegistry::new();
    registry.register(CURRENCY_TYPE, PayloadKind::Bytes, Arc::new(CurrencyHandler))?;

    let mut message = Message::new();
    message.add_string(Some("payee"), None, "ACME Corp")?;
    message.add_opaque(
        CURRENCY_TYPE,
        Some("amount"),
        None,
        &pack_amount("GBP", 12_50),
    )?;

    let bytes = fudge::encode_envelope_with_registry(&Envelope::new(message), &registry)?;
    println!("encoded {} bytes", bytes.len());

    let decoded = fudge::decode_envelope_with_registry(&bytes, &registry)?;
    let amount = decoded.message().field_by_name("amount")?;

    match registry.lookup(CURRENCY_TYPE).handler().coerce(amount, types::STRING)? {
        Coerced::Value(FieldValue::Str(text)) => println!("amount: {}", text),
        _ => println!("amount: <unformatted>"),
    }

    // a consumer without the registration still forwards the field intact
    let plain = fudge::decode_envelope(&bytes)?;
    assert_eq!(fudge::encode_envelope(&plain)?, bytes);
    println!("pass-through re-encode matches");
    Ok(())
}
