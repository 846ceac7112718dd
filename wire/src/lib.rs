//! Entity and field headers for the bitdelta wire format.
//!
//! Every message starts with a one-byte [`EntityHeader`] naming the schema and
//! whether the payload is a full snapshot or a delta. Every field inside the
//! payload starts with a one- or two-bit [`FieldHeader`].
//!
//! # Design Principles
//!
//! - **Stable wire format** - Bit layouts here are fixed; changes are breaking.
//! - **Corruption detection** - Header bytes that no encoder could produce are rejected.
//! - **No domain knowledge** - This crate handles headers, not field values.

mod error;
mod header;

pub use error::{HeaderError, WireResult};
pub use header::{
    decode_entity_header, decode_field_header, encode_entity_header, encode_field_header,
    EntityHeader, FieldHeader, HEADER_SIZE, MAX_ENTITY_ID, SNAPSHOT_BIT,
};
