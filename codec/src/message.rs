//! Message framing: an entity header followed by a full or delta payload.

use bitstream::{BitReader, BufferWriterFactory};
use tracing::trace;
use wire::{decode_entity_header, encode_entity_header, EntityHeader};

use crate::error::{CodecError, CodecResult};
use crate::tree::Schema;

/// Encodes a snapshot message: header with the snapshot bit, then every member.
pub fn encode_snapshot<T>(
    schema: &Schema<T>,
    entity_id: u8,
    entity: &T,
    factory: &mut BufferWriterFactory,
) -> CodecResult<Vec<u8>> {
    let mut writer = factory.make()?;
    encode_entity_header(&mut writer, EntityHeader::snapshot(entity_id))?;
    schema.serialize(&mut writer, entity)?;
    trace!(entity_id, bits = writer.bits_written(), "snapshot encoded");
    Ok(writer.to_vec())
}

/// Encodes a delta message: header without the snapshot bit, then the
/// members of `current` that differ from `previous`.
pub fn encode_delta<T>(
    schema: &Schema<T>,
    entity_id: u8,
    current: &T,
    previous: &T,
    factory: &mut BufferWriterFactory,
) -> CodecResult<Vec<u8>> {
    let mut writer = factory.make()?;
    encode_entity_header(&mut writer, EntityHeader::delta(entity_id))?;
    schema.serialize_delta(&mut writer, current, previous)?;
    trace!(entity_id, bits = writer.bits_written(), "delta encoded");
    Ok(writer.to_vec())
}

/// Decodes a snapshot or delta message into `target` and returns its header.
///
/// Snapshots overwrite every member; deltas only the members they carry.
///
/// A snapshot only replaces a target that is blank (its key members equal
/// those of `T::default()`) or already holds the snapshot's key. A snapshot
/// for another key fails with [`CodecError::KeyMismatch`] and leaves `target`
/// unchanged.
pub fn decode_message<T: Default>(
    schema: &Schema<T>,
    bytes: &[u8],
    target: &mut T,
) -> CodecResult<EntityHeader> {
    let mut reader = BitReader::new(bytes)?;
    let header = decode_entity_header(&mut reader)?;
    if !header.snapshot {
        schema.deserialize_delta(&mut reader, target)?;
        ensure_consumed(&reader)?;
        return Ok(header);
    }

    let mut entity = T::default();
    schema.deserialize_into(&mut reader, &mut entity)?;
    ensure_consumed(&reader)?;
    if schema.changed_key(target, &T::default()).is_some() {
        if let Some(field) = schema.changed_key(target, &entity) {
            return Err(CodecError::KeyMismatch {
                field: field.to_owned(),
            });
        }
    }
    *target = entity;
    Ok(header)
}

/// Decodes a snapshot message into a new entity.
pub fn decode_snapshot<T: Default>(
    schema: &Schema<T>,
    bytes: &[u8],
) -> CodecResult<(EntityHeader, T)> {
    let mut reader = BitReader::new(bytes)?;
    let header = decode_entity_header(&mut reader)?;
    if !header.snapshot {
        return Err(CodecError::ExpectedSnapshot);
    }
    let entity = schema.deserialize(&mut reader)?;
    ensure_consumed(&reader)?;
    Ok((header, entity))
}

/// Only the zero padding of the final byte may remain.
fn ensure_consumed(reader: &BitReader<'_>) -> CodecResult<()> {
    let remaining_bits = reader.bits_remaining();
    if remaining_bits >= 8 {
        return Err(CodecError::TrailingData { remaining_bits });
    }
    Ok(())
}
