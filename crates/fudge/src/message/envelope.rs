//! Envelopes: the top-level transmission unit.

use std::sync::Arc;

use crate::message::Message;

/// A message together with the metadata carried in the 8-byte wire header.
///
/// The total length field of the header is computed during encoding and is
/// not part of this type.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    directives: u8,
    schema_version: u8,
    taxonomy: i16,
    message: Arc<Message>,
}

impl Envelope {
    /// Wraps a message with zeroed metadata.
    pub fn new(message: impl Into<Arc<Message>>) -> Self {
        Self {
            directives: 0,
            schema_version: 0,
            taxonomy: 0,
            message: message.into(),
        }
    }

    /// Wraps a message with explicit metadata.
    pub fn with_metadata(
        message: impl Into<Arc<Message>>,
        directives: u8,
        schema_version: u8,
        taxonomy: i16,
    ) -> Self {
        Self {
            directives,
            schema_version,
            taxonomy,
            message: message.into(),
        }
    }

    /// Processing directives. Reserved, zero in current streams.
    pub fn directives(&self) -> u8 {
        self.directives
    }

    /// Application schema version.
    pub fn schema_version(&self) -> u8 {
        self.schema_version
    }

    /// Taxonomy reference, zero when unused.
    pub fn taxonomy(&self) -> i16 {
        self.taxonomy
    }

    /// The wrapped message.
    pub fn message(&self) -> &Arc<Message> {
        &self.message
    }
}
