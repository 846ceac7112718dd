//! Keyed snapshot cache producing deltas across time.

use std::collections::HashMap;

use bitstream::BufferWriterFactory;
use tracing::debug;
use wire::EntityHeader;

use crate::error::{CodecError, CodecResult};
use crate::key::EntityKey;
use crate::limits::CodecLimits;
use crate::message::{decode_snapshot, encode_delta, encode_snapshot};
use crate::tree::Schema;

/// Tracks the last transmitted state of every entity, by key.
///
/// Stored states are full snapshot messages owned by the manager. A manager
/// is not internally synchronized; share it behind a lock if needed.
pub struct EntityManager<T> {
    schema: Schema<T>,
    entity_id: u8,
    factory: BufferWriterFactory,
    snapshots: HashMap<EntityKey, Vec<u8>>,
}

impl<T> std::fmt::Debug for EntityManager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityManager")
            .field("entity_id", &self.entity_id)
            .field("tracked", &self.snapshots.len())
            .finish_non_exhaustive()
    }
}

impl<T> EntityManager<T> {
    /// Creates a manager for entities of `schema`, stamped with `entity_id`.
    ///
    /// Fails with `MissingKeyMembers` if the schema has no key.
    pub fn new(schema: Schema<T>, entity_id: u8) -> CodecResult<Self> {
        let limits = schema.limits().clone();
        Self::with_limits(schema, entity_id, &limits)
    }

    /// Creates a manager whose message buffers follow `limits`.
    pub fn with_limits(
        schema: Schema<T>,
        entity_id: u8,
        limits: &CodecLimits,
    ) -> CodecResult<Self> {
        if !schema.has_keys() {
            return Err(CodecError::MissingKeyMembers);
        }
        EntityHeader::snapshot(entity_id).to_byte()?;
        let factory = BufferWriterFactory::new(limits.buffer_capacity)?;
        Ok(Self {
            schema,
            entity_id,
            factory,
            snapshots: HashMap::new(),
        })
    }

    /// The schema this manager encodes with.
    pub const fn schema(&self) -> &Schema<T> {
        &self.schema
    }

    /// The entity id written into every message header.
    pub const fn entity_id(&self) -> u8 {
        self.entity_id
    }

    /// Encodes a snapshot of `entity`. With `checkpoint`, the snapshot
    /// replaces the tracked state for the entity's key.
    pub fn snapshot(&mut self, entity: &T, checkpoint: bool) -> CodecResult<Vec<u8>> {
        let bytes = encode_snapshot(&self.schema, self.entity_id, entity, &mut self.factory)?;
        if checkpoint {
            let key = self.schema.key_of(entity);
            debug!(%key, bytes = bytes.len(), "snapshot checkpoint");
            self.snapshots.insert(key, bytes.clone());
        }
        Ok(bytes)
    }

    /// Returns `true` if a state is tracked for the entity's key.
    pub fn contains(&self, entity: &T) -> bool {
        self.snapshots.contains_key(&self.schema.key_of(entity))
    }

    /// Forgets the entity's tracked state. Returns whether one existed.
    pub fn remove(&mut self, entity: &T) -> bool {
        let key = self.schema.key_of(entity);
        let removed = self.snapshots.remove(&key).is_some();
        debug!(%key, removed, "snapshot removed");
        removed
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Returns `true` if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Forgets every tracked state.
    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}

impl<T: Default> EntityManager<T> {
    /// Encodes the delta from the tracked state to `entity`.
    ///
    /// Returns an empty vector when nothing changed. Fails with
    /// `EntityNotFound` if no state is tracked for the key. With
    /// `checkpoint`, a full snapshot of `entity` becomes the tracked state.
    pub fn difference(&mut self, entity: &T, checkpoint: bool) -> CodecResult<Vec<u8>> {
        let key = self.schema.key_of(entity);
        let Some(stored) = self.snapshots.get(&key) else {
            return Err(CodecError::EntityNotFound { key });
        };
        let (_, previous) = decode_snapshot(&self.schema, stored)?;
        if self.schema.get_equals(entity, &previous) {
            return Ok(Vec::new());
        }

        let delta = encode_delta(
            &self.schema,
            self.entity_id,
            entity,
            &previous,
            &mut self.factory,
        )?;
        if checkpoint {
            let full = encode_snapshot(&self.schema, self.entity_id, entity, &mut self.factory)?;
            debug!(%key, delta = delta.len(), full = full.len(), "difference checkpoint");
            self.snapshots.insert(key, full);
        }
        Ok(delta)
    }
}
