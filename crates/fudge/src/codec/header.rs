//! Envelope and field header codecs.

use crate::codec::prefix::FieldPrefix;
use crate::codec::primitives::{Reader, Writer};
use crate::error::FudgeError;
use crate::registry::TypeRegistry;

/// Fixed size of the envelope header in bytes.
pub const ENVELOPE_HEADER_WIDTH: usize = 8;

/// The 8-byte header at the front of every encoded envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeHeader {
    /// Processing directives. Reserved, currently always zero.
    pub directives: u8,
    /// Application schema version carried for the consumer.
    pub schema_version: u8,
    /// Taxonomy reference, zero when unused.
    pub taxonomy: i16,
    /// Total encoded size in bytes, header included.
    pub total_length: i32,
}

impl EnvelopeHeader {
    /// Decodes the envelope header from the front of `reader`.
    pub fn decode(reader: &mut Reader<'_>) -> Result<Self, FudgeError> {
        Ok(Self {
            directives: reader.read_u8("envelope directives")?,
            schema_version: reader.read_u8("envelope schema version")?,
            taxonomy: reader.read_i16("envelope taxonomy")?,
            total_length: reader.read_i32("envelope length")?,
        })
    }

    /// Encodes the envelope header.
    pub fn encode(&self, writer: &mut Writer) {
        writer.write_u8(self.directives);
        writer.write_u8(self.schema_version);
        writer.write_i16(self.taxonomy);
        writer.write_i32(self.total_length);
    }
}

/// Everything a field carries before its payload.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldHeader {
    pub prefix: FieldPrefix,
    pub type_id: u8,
    pub ordinal: Option<i16>,
    pub name: Option<String>,
}

impl FieldHeader {
    /// Decodes the prefix byte, type id, and the optional ordinal and name.
    ///
    /// Stops short of the width prefix, which needs the type registry to
    /// interpret; see [`read_field_width`].
    pub fn decode(reader: &mut Reader<'_>) -> Result<Self, FudgeError> {
        let prefix = FieldPrefix::decode(reader.read_u8("field prefix")?);
        let type_id = reader.read_u8("field type")?;

        let ordinal = if prefix.has_ordinal {
            Some(reader.read_i16("field ordinal")?)
        } else {
            None
        };

        let name = if prefix.has_name {
            let len = reader.read_u8("field name length")? as usize;
            let bytes = reader.read_bytes(len, "field name")?;
            let name = std::str::from_utf8(bytes)
                .map_err(|_| FudgeError::InvalidString {
                    context: "field name",
                })?
                .to_owned();
            Some(name)
        } else {
            None
        };

        Ok(Self {
            prefix,
            type_id,
            ordinal,
            name,
        })
    }
}

/// Reads the payload width for a field whose header has just been decoded.
///
/// A width-byte-count of zero means the width is implied by the type and
/// comes from the registry; a type with no fixed width there is fatal.
/// Otherwise the width sits on the wire: the single-byte form is unsigned,
/// the 2- and 4-byte forms are signed and rejected when negative.
pub fn read_field_width(
    reader: &mut Reader<'_>,
    header: &FieldHeader,
    registry: &TypeRegistry,
) -> Result<usize, FudgeError> {
    let width = match header.prefix.variable_width {
        0 => {
            return match registry.lookup(header.type_id).fixed_width() {
                Some(width) => Ok(width as usize),
                None => Err(FudgeError::UnknownFieldWidth {
                    type_id: header.type_id,
                }),
            };
        }
        1 => reader.read_u8("field width")? as i32,
        2 => reader.read_i16("field width")? as i32,
        4 => reader.read_i32("field width")?,
        // the prefix decoder only produces 0, 1, 2 or 4
        _ => unreachable!("invalid variable width size"),
    };
    if width < 0 {
        return Err(FudgeError::NegativeFieldWidth { width });
    }
    Ok(width as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TypeRegistry;
    use crate::types;

    #[test]
    fn test_envelope_header_roundtrip() {
        let header = EnvelopeHeader {
            directives: 0,
            schema_version: 3,
            taxonomy: -7,
            total_length: 1234,
        };
        let mut writer = Writer::new();
        header.encode(&mut writer);
        assert_eq!(writer.len(), ENVELOPE_HEADER_WIDTH);

        let mut reader = Reader::new(writer.as_bytes());
        assert_eq!(EnvelopeHeader::decode(&mut reader).unwrap(), header);
    }

    #[test]
    fn test_field_header_with_name_and_ordinal() {
        let mut writer = Writer::new();
        writer.write_u8(FieldPrefix::encode_byte(true, 0, true, true));
        writer.write_u8(types::INT);
        writer.write_i16(42);
        writer.write_u8(3);
        writer.write_bytes(b"foo");

        let mut reader = Reader::new(writer.as_bytes());
        let header = FieldHeader::decode(&mut reader).unwrap();
        assert_eq!(header.type_id, types::INT);
        assert_eq!(header.ordinal, Some(42));
        assert_eq!(header.name.as_deref(), Some("foo"));
        assert!(reader.is_empty());
    }

    #[test]
    fn test_field_name_invalid_utf8() {
        let mut writer = Writer::new();
        writer.write_u8(FieldPrefix::encode_byte(true, 0, false, true));
        writer.write_u8(types::BOOLEAN);
        writer.write_u8(2);
        writer.write_bytes(&[0xFF, 0xFE]);

        let mut reader = Reader::new(writer.as_bytes());
        assert_eq!(
            FieldHeader::decode(&mut reader),
            Err(FudgeError::InvalidString {
                context: "field name"
            })
        );
    }

    #[test]
    fn test_negative_width_rejected() {
        let registry = TypeRegistry::new();
        let header = FieldHeader {
            prefix: FieldPrefix::decode(FieldPrefix::encode_byte(false, 300, false, false)),
            type_id: types::BYTE_ARRAY,
            ordinal: None,
            name: None,
        };
        let data = (-5i16).to_be_bytes();
        let mut reader = Reader::new(&data);
        assert_eq!(
            read_field_width(&mut reader, &header, &registry),
            Err(FudgeError::NegativeFieldWidth { width: -5 })
        );
    }

    #[test]
    fn test_no_width_available() {
        let registry = TypeRegistry::new();
        // width-byte-count 0 for a type with no fixed width
        let header = FieldHeader {
            prefix: FieldPrefix::decode(0x00),
            type_id: types::STRING,
            ordinal: None,
            name: None,
        };
        let mut reader = Reader::new(&[]);
        assert_eq!(
            read_field_width(&mut reader, &header, &registry),
            Err(FudgeError::UnknownFieldWidth {
                type_id: types::STRING
            })
        );
    }

    #[test]
    fn test_fixed_width_from_registry() {
        let registry = TypeRegistry::new();
        let header = FieldHeader {
            prefix: FieldPrefix::decode(FieldPrefix::encode_byte(true, 0, false, false)),
            type_id: types::LONG,
            ordinal: None,
            name: None,
        };
        let mut reader = Reader::new(&[]);
        assert_eq!(read_field_width(&mut reader, &header, &registry), Ok(8));
    }
}
