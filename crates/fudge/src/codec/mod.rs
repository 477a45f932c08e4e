//! Binary codec: primitives, field prefix and header layouts, and the
//! envelope encode/decode entry points.

pub mod decode;
pub mod encode;
pub mod header;
pub mod prefix;
pub mod primitives;
