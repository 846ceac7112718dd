//! Entity and field headers.
//!
//! Entity header, one byte:
//!
//! ```text
//! bit 7      bits 6..4   bits 3..0
//! snapshot   zero        entity id (0..=15)
//! ```
//!
//! Field header, one or two bits: `missing`, then `null` only when
//! `missing` is 0.

use bitstream::{BitReader, BitWriter};

use crate::error::{HeaderError, WireResult};

/// Largest entity id representable in the header.
pub const MAX_ENTITY_ID: u8 = 15;

/// Bit marking a snapshot message.
pub const SNAPSHOT_BIT: u8 = 0x80;

/// Entity header size in bytes.
pub const HEADER_SIZE: usize = 1;

/// Message-level header identifying the schema and message kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityHeader {
    /// Schema (entity type) id, `0..=15`.
    pub entity_id: u8,
    /// `true` for a full snapshot, `false` for a delta.
    pub snapshot: bool,
}

impl EntityHeader {
    /// Creates a snapshot header.
    #[must_use]
    pub const fn snapshot(entity_id: u8) -> Self {
        Self {
            entity_id,
            snapshot: true,
        }
    }

    /// Creates a delta header.
    #[must_use]
    pub const fn delta(entity_id: u8) -> Self {
        Self {
            entity_id,
            snapshot: false,
        }
    }

    /// Returns the encoded byte.
    pub const fn to_byte(self) -> WireResult<u8> {
        if self.entity_id > MAX_ENTITY_ID {
            return Err(HeaderError::EntityIdOutOfRange {
                id: self.entity_id,
                max: MAX_ENTITY_ID,
            });
        }
        if self.snapshot {
            Ok(self.entity_id ^ SNAPSHOT_BIT)
        } else {
            Ok(self.entity_id)
        }
    }

    /// Parses an encoded byte.
    pub const fn from_byte(byte: u8) -> WireResult<Self> {
        let snapshot = byte & SNAPSHOT_BIT != 0;
        let entity_id = byte & !SNAPSHOT_BIT;
        if entity_id > MAX_ENTITY_ID {
            return Err(HeaderError::InvalidHeader { byte });
        }
        Ok(Self {
            entity_id,
            snapshot,
        })
    }
}

/// Writes an entity header byte.
pub fn encode_entity_header(writer: &mut BitWriter<'_>, header: EntityHeader) -> WireResult<()> {
    let byte = header.to_byte()?;
    writer.write_byte(byte)?;
    Ok(())
}

/// Reads an entity header byte.
pub fn decode_entity_header(reader: &mut BitReader<'_>) -> WireResult<EntityHeader> {
    let byte = reader.read_byte()?;
    EntityHeader::from_byte(byte)
}

/// Per-field presence header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldHeader {
    /// The field was omitted; the receiver keeps its current value.
    pub is_missing: bool,
    /// The field is null. Always `false` when `is_missing` is set.
    pub is_null: bool,
}

impl FieldHeader {
    /// Header for an omitted field.
    #[must_use]
    pub const fn missing() -> Self {
        Self {
            is_missing: true,
            is_null: false,
        }
    }

    /// Header for a field that follows in the payload.
    #[must_use]
    pub const fn present(is_null: bool) -> Self {
        Self {
            is_missing: false,
            is_null,
        }
    }

    /// Returns `true` if a value payload follows this header.
    #[must_use]
    pub const fn has_payload(self) -> bool {
        !self.is_missing && !self.is_null
    }
}

/// Writes a field header.
pub fn encode_field_header(writer: &mut BitWriter<'_>, header: FieldHeader) -> WireResult<()> {
    if header.is_missing {
        writer.write_bit(true)?;
    } else {
        writer.write_bits(u64::from(header.is_null), 2)?;
    }
    Ok(())
}

/// Reads a field header.
pub fn decode_field_header(reader: &mut BitReader<'_>) -> WireResult<FieldHeader> {
    if reader.read_bit()? {
        return Ok(FieldHeader::missing());
    }
    let is_null = reader.read_bit()?;
    Ok(FieldHeader::present(is_null))
}
