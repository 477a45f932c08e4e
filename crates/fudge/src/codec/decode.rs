//! Decoding the wire format back into messages.

use std::sync::Arc;

use crate::codec::header::{ENVELOPE_HEADER_WIDTH, EnvelopeHeader, FieldHeader, read_field_width};
use crate::codec::primitives::Reader;
use crate::error::FudgeError;
use crate::limits::MAX_MESSAGE_DEPTH;
use crate::message::Message;
use crate::message::envelope::Envelope;
use crate::registry::{PayloadKind, TypeRegistry, default_registry};

/// Decode-time state threaded through nested sub-messages.
pub struct DecodeContext<'a> {
    registry: &'a TypeRegistry,
    depth: usize,
}

impl<'a> DecodeContext<'a> {
    pub(crate) fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry, depth: 0 }
    }

    /// The registry decoding is running against.
    pub fn registry(&self) -> &'a TypeRegistry {
        self.registry
    }

    /// Returns a context one nesting level deeper, refusing to recurse past
    /// [`MAX_MESSAGE_DEPTH`].
    pub fn nest(&self) -> Result<DecodeContext<'a>, FudgeError> {
        if self.depth >= MAX_MESSAGE_DEPTH {
            return Err(FudgeError::NestingTooDeep {
                max: MAX_MESSAGE_DEPTH,
            });
        }
        Ok(DecodeContext {
            registry: self.registry,
            depth: self.depth + 1,
        })
    }
}

/// Decodes an envelope using the built-in type registry.
pub fn decode_envelope(bytes: &[u8]) -> Result<Envelope, FudgeError> {
    decode_envelope_with_registry(bytes, default_registry())
}

/// Decodes an envelope using the given type registry.
///
/// The input is untrusted: truncated data, corrupt lengths and over-deep
/// nesting all fail with an error, never a panic. The header's declared
/// total length is authoritative; trailing bytes past it are ignored.
pub fn decode_envelope_with_registry(
    bytes: &[u8],
    registry: &TypeRegistry,
) -> Result<Envelope, FudgeError> {
    let mut header_reader = Reader::new(bytes);
    let header = EnvelopeHeader::decode(&mut header_reader)?;

    let declared = header.total_length;
    if declared < ENVELOPE_HEADER_WIDTH as i32 || bytes.len() < declared as usize {
        return Err(FudgeError::OutOfBytes {
            context: "envelope body",
        });
    }

    let mut reader = Reader::new(&bytes[ENVELOPE_HEADER_WIDTH..declared as usize]);
    let ctx = DecodeContext::new(registry);
    let mut message = Message::new();
    decode_fields_into(&mut reader, &mut message, &ctx)?;

    Ok(Envelope::with_metadata(
        Arc::new(message),
        header.directives,
        header.schema_version,
        header.taxonomy,
    ))
}

/// Decodes fields until the reader is exhausted, appending each to
/// `message`.
pub(crate) fn decode_fields_into(
    reader: &mut Reader<'_>,
    message: &mut Message,
    ctx: &DecodeContext<'_>,
) -> Result<(), FudgeError> {
    while !reader.is_empty() {
        let header = FieldHeader::decode(reader)?;
        let width = read_field_width(reader, &header, ctx.registry())?;
        let payload = reader.read_bytes(width, "field payload")?;

        let descriptor = ctx.registry().lookup(header.type_id);
        let value = descriptor.handler().decode(payload, ctx)?;

        // data payloads remember their width; everything else derives it
        let byte_length = match descriptor.payload() {
            PayloadKind::Bytes | PayloadKind::String => width as i32,
            PayloadKind::Local | PayloadKind::SubMessage => 0,
        };
        message.append_decoded(
            header.type_id,
            byte_length,
            header.name.as_deref(),
            header.ordinal,
            value,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode::encode_envelope;
    use crate::message::field::FieldValue;
    use crate::types;

    #[test]
    fn test_declared_length_is_authoritative() {
        let mut message = Message::new();
        message.add_bool(None, None, true).unwrap();
        let mut bytes = encode_envelope(&Envelope::new(message)).unwrap();
        // trailing garbage past the declared length is ignored
        bytes.extend_from_slice(&[0xDE, 0xAD]);
        let envelope = decode_envelope(&bytes).unwrap();
        assert_eq!(envelope.message().num_fields(), 1);
    }

    #[test]
    fn test_short_buffer_rejected() {
        let mut message = Message::new();
        message.add_string(None, None, "hello").unwrap();
        let bytes = encode_envelope(&Envelope::new(message)).unwrap();
        assert!(decode_envelope(&bytes[..bytes.len() - 1]).is_err());
    }

    #[test]
    fn test_header_length_below_minimum_rejected() {
        let bytes = [0, 0, 0, 0, 0, 0, 0, 4, 0, 0, 0, 0];
        assert_eq!(
            decode_envelope(&bytes),
            Err(FudgeError::OutOfBytes {
                context: "envelope body"
            })
        );
    }

    #[test]
    fn test_nesting_limit() {
        // hand-build an envelope of empty sub-messages nested past the limit
        let depth = MAX_MESSAGE_DEPTH + 1;
        let mut body = Vec::new();
        for _ in 0..depth {
            // wrap in a sub-message field with a 2-byte width prefix
            let mut field = vec![0x40, types::SUB_MESSAGE];
            field.extend_from_slice(&(body.len() as i16).to_be_bytes());
            field.append(&mut body);
            body = field;
        }
        let total = (body.len() + ENVELOPE_HEADER_WIDTH) as i32;
        let mut bytes = vec![0, 0, 0, 0];
        bytes.extend_from_slice(&total.to_be_bytes());
        bytes.extend_from_slice(&body);

        assert_eq!(
            decode_envelope(&bytes),
            Err(FudgeError::NestingTooDeep {
                max: MAX_MESSAGE_DEPTH
            })
        );
    }

    #[test]
    fn test_unregistered_type_decodes_as_bytes() {
        // a field of type 200 with a 3-byte payload
        let body = [0x20, 200, 3, 1, 2, 3];
        let total = (body.len() + ENVELOPE_HEADER_WIDTH) as i32;
        let mut bytes = vec![0, 0, 0, 0];
        bytes.extend_from_slice(&total.to_be_bytes());
        bytes.extend_from_slice(&body);

        let envelope = decode_envelope(&bytes).unwrap();
        let field = envelope.message().field_at(0).unwrap();
        assert_eq!(field.type_id(), 200);
        assert_eq!(field.value(), &FieldValue::Bytes(vec![1, 2, 3]));

        // and the opaque payload re-encodes byte for byte
        assert_eq!(encode_envelope(&envelope).unwrap(), bytes);
    }
}
