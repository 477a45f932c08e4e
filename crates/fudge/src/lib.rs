//! Fudge self-describing binary message encoding.
//!
//! A Fudge message is an ordered collection of typed fields, each optionally
//! carrying a name and a 16-bit ordinal, with nested sub-messages forming a
//! tree. Messages travel inside an envelope whose 8-byte header states the
//! total encoded size, so a consumer can skip fields (or whole messages) it
//! does not understand while still re-encoding them byte for byte.
//!
//! # Example
//!
//! ```
//! use fudge::{Envelope, Message};
//!
//! let mut message = Message::new();
//! message.add_string(Some("name"), None, "Random Person")?;
//! message.add_i64(Some("dob"), None, 19801231)?;
//!
//! let bytes = fudge::encode_envelope(&Envelope::new(message))?;
//! let decoded = fudge::decode_envelope(&bytes)?;
//! assert_eq!(decoded.message().field_by_name("dob")?.as_i64()?, 19801231);
//! # Ok::<(), fudge::FudgeError>(())
//! ```
//!
//! Integers are stored in the narrowest built-in type that holds the value,
//! so the `dob` above travels as a 4-byte int even though it was added as an
//! `i64`; [`Field::as_i64`] widens it back on read.
//!
//! Type ids 32 and up are open for user types: register a
//! [`TypeHandler`] in a [`TypeRegistry`] and use the `*_with_registry`
//! encode/decode entry points. Payloads of ids nobody registered survive a
//! decode/encode cycle untouched.

pub mod codec;
pub mod coerce;
pub mod datetime;
pub mod error;
pub mod limits;
pub mod message;
pub mod registry;
pub mod types;

pub use codec::decode::{DecodeContext, decode_envelope, decode_envelope_with_registry};
pub use codec::encode::{encode_envelope, encode_envelope_with_registry};
pub use coerce::{Coerced, Primitive};
pub use datetime::{Date, DateTime, Precision, Time};
pub use error::FudgeError;
pub use message::envelope::Envelope;
pub use message::{Field, FieldValue, IntegerType, Message};
pub use registry::{PayloadKind, TypeDescriptor, TypeHandler, TypeRegistry, default_registry};
