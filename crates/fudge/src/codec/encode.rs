//! Encoding messages to the wire format.

use crate::codec::header::{ENVELOPE_HEADER_WIDTH, EnvelopeHeader};
use crate::codec::prefix::FieldPrefix;
use crate::codec::primitives::{Writer, bytes_to_hold_width};
use crate::error::FudgeError;
use crate::message::envelope::Envelope;
use crate::message::field::Field;
use crate::message::Message;
use crate::registry::{TypeRegistry, default_registry};

/// Encodes an envelope using the built-in type registry.
pub fn encode_envelope(envelope: &Envelope) -> Result<Vec<u8>, FudgeError> {
    encode_envelope_with_registry(envelope, default_registry())
}

/// Encodes an envelope using the given type registry.
///
/// The output starts with the 8-byte envelope header whose total length
/// covers the header itself; decoding the result with the same registry
/// yields an equal envelope, and re-encoding a decoded envelope reproduces
/// the input bytes.
pub fn encode_envelope_with_registry(
    envelope: &Envelope,
    registry: &TypeRegistry,
) -> Result<Vec<u8>, FudgeError> {
    let message_len = message_length(envelope.message(), registry)? as usize;
    let total = message_len
        .checked_add(ENVELOPE_HEADER_WIDTH)
        .filter(|t| i32::try_from(*t).is_ok())
        .ok_or(FudgeError::PayloadTooLarge {
            context: "envelope",
            len: message_len,
        })?;

    let mut writer = Writer::with_capacity(total);
    EnvelopeHeader {
        directives: envelope.directives(),
        schema_version: envelope.schema_version(),
        taxonomy: envelope.taxonomy(),
        total_length: total as i32,
    }
    .encode(&mut writer);
    encode_fields(envelope.message(), registry, &mut writer)?;

    if writer.len() != total {
        return Err(FudgeError::EncodedLengthMismatch {
            declared: total,
            written: writer.len(),
        });
    }
    Ok(writer.into_bytes())
}

/// Total encoded size of a message's fields, memoized on the message.
pub(crate) fn message_length(
    message: &Message,
    registry: &TypeRegistry,
) -> Result<i32, FudgeError> {
    if let Some(width) = message.cached_width() {
        return Ok(width);
    }
    let mut total: i32 = 0;
    for field in message.fields() {
        total = total
            .checked_add(field_length(field, registry)?)
            .ok_or(FudgeError::PayloadTooLarge {
                context: "message",
                len: usize::MAX,
            })?;
    }
    message.set_cached_width(total);
    Ok(total)
}

/// Encoded size of one field, headers included.
fn field_length(field: &Field, registry: &TypeRegistry) -> Result<i32, FudgeError> {
    let data_len = field_data_length(field, registry)?;
    // prefix byte and type byte
    let mut len: i32 = 2;
    if field.ordinal().is_some() {
        len += 2;
    }
    if let Some(name) = field.name() {
        // length byte plus the name itself
        len += 1 + name.len() as i32;
    }
    if registry.lookup(field.type_id()).fixed_width().is_none() {
        len += bytes_to_hold_width(data_len) as i32;
    }
    len.checked_add(data_len).ok_or(FudgeError::PayloadTooLarge {
        context: "field",
        len: data_len as usize,
    })
}

/// Size of a field's payload alone.
fn field_data_length(field: &Field, registry: &TypeRegistry) -> Result<i32, FudgeError> {
    if let Some(width) = registry.lookup(field.type_id()).fixed_width() {
        return Ok(width as i32);
    }
    match field.message() {
        Some(message) => message_length(message, registry),
        None => Ok(field.byte_length()),
    }
}

/// Encodes every field of a message in order.
pub(crate) fn encode_fields(
    message: &Message,
    registry: &TypeRegistry,
    writer: &mut Writer,
) -> Result<(), FudgeError> {
    for field in message.fields() {
        encode_field(field, registry, writer)?;
    }
    Ok(())
}

fn encode_field(
    field: &Field,
    registry: &TypeRegistry,
    writer: &mut Writer,
) -> Result<(), FudgeError> {
    let descriptor = registry.lookup(field.type_id());
    let fixed = descriptor.fixed_width().is_some();
    let data_len = field_data_length(field, registry)?;

    writer.write_u8(FieldPrefix::encode_byte(
        fixed,
        data_len,
        field.ordinal().is_some(),
        field.name().is_some(),
    ));
    writer.write_u8(field.type_id());
    if let Some(ordinal) = field.ordinal() {
        writer.write_i16(ordinal);
    }
    if let Some(name) = field.name() {
        // names longer than 255 bytes are rejected at append time
        writer.write_u8(name.len() as u8);
        writer.write_bytes(name.as_bytes());
    }
    descriptor.handler().encode(field, registry, writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types;

    #[test]
    fn test_empty_message_is_header_only() {
        let bytes = encode_envelope(&Envelope::new(Message::new())).unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 0, 0, 0, 0, 8]);
    }

    #[test]
    fn test_single_bool_field_layout() {
        let mut message = Message::new();
        message.add_bool(None, None, true).unwrap();
        let bytes = encode_envelope(&Envelope::new(message)).unwrap();
        // header, then prefix (fixed, anonymous), type, payload
        assert_eq!(&bytes[..8], &[0, 0, 0, 0, 0, 0, 0, 11]);
        assert_eq!(&bytes[8..], &[0x80, types::BOOLEAN, 1]);
    }

    #[test]
    fn test_named_ordinal_string_layout() {
        let mut message = Message::new();
        message.add_string(Some("id"), Some(3), "hey").unwrap();
        let bytes = encode_envelope(&Envelope::new(message)).unwrap();
        assert_eq!(
            &bytes[8..],
            &[
                0x38, // variable 1-byte width, ordinal, name
                types::STRING,
                0,
                3, // ordinal 3
                2,
                b'i',
                b'd', // name
                3,
                b'h',
                b'e',
                b'y', // width prefix and payload
            ]
        );
        assert_eq!(bytes[7] as usize, bytes.len());
    }

    #[test]
    fn test_envelope_metadata_in_header() {
        let envelope = Envelope::with_metadata(Message::new(), 1, 9, -2);
        let bytes = encode_envelope(&envelope).unwrap();
        assert_eq!(bytes[0], 1);
        assert_eq!(bytes[1], 9);
        assert_eq!(i16::from_be_bytes([bytes[2], bytes[3]]), -2);
    }

    #[test]
    fn test_width_memo_reset_on_append() {
        let registry = default_registry();
        let mut message = Message::new();
        message.add_i32(None, None, 1).unwrap();
        let first = message_length(&message, registry).unwrap();
        message.add_i32(None, None, 2).unwrap();
        let second = message_length(&message, registry).unwrap();
        assert_eq!(second, first * 2);
    }
}
