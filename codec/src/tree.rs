//! Schema trees.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use bitstream::{with_thread_writer, BitReader, BitWriter, BufferWriterFactory};
use schema::{schema_hash, FieldShape, SchemaError, SchemaResult, SerializerRegistry};
use tracing::debug;

use crate::error::CodecResult;
use crate::field::{BuildContext, Field};
use crate::item::SchemaItem;
use crate::key::EntityKey;
use crate::limits::CodecLimits;

/// The ordered set of schema items for one entity type.
///
/// Items are sorted key members first, in declaration order, then the
/// remaining members by name. Encoder and decoder derive the same order from
/// the same descriptors, so the order is never transmitted.
///
/// A schema is immutable once built and cheap to clone; clones share items.
pub struct Schema<T> {
    items: Arc<[Box<dyn SchemaItem<T>>]>,
    shapes: Arc<[FieldShape]>,
    key_count: usize,
    fingerprint: u64,
    limits: CodecLimits,
}

impl<T> Clone for Schema<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
            shapes: Arc::clone(&self.shapes),
            key_count: self.key_count,
            fingerprint: self.fingerprint,
            limits: self.limits.clone(),
        }
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("fingerprint", &format_args!("{:#018x}", self.fingerprint))
            .field("fields", &self.shapes)
            .finish_non_exhaustive()
    }
}

impl<T: 'static> Schema<T> {
    /// Starts building a schema.
    #[must_use]
    pub fn builder() -> SchemaBuilder<T> {
        SchemaBuilder::new()
    }
}

impl<T> Schema<T> {
    /// Writes every member of `entity` (full mode).
    pub fn serialize(&self, writer: &mut BitWriter<'_>, entity: &T) -> CodecResult<()> {
        self.write_items(writer, entity)
    }

    /// Reads a full payload into a new entity.
    pub fn deserialize(&self, reader: &mut BitReader<'_>) -> CodecResult<T>
    where
        T: Default,
    {
        let mut entity = T::default();
        self.read_items(reader, &mut entity)?;
        Ok(entity)
    }

    /// Reads a full payload into an existing entity.
    ///
    /// On error the target is left partially updated.
    pub fn deserialize_into(&self, reader: &mut BitReader<'_>, target: &mut T) -> CodecResult<()> {
        self.read_items(reader, target)
    }

    /// Writes the members of `current` that differ from `previous`.
    ///
    /// Fails with `KeyMismatch` if a key member differs.
    pub fn serialize_delta(
        &self,
        writer: &mut BitWriter<'_>,
        current: &T,
        previous: &T,
    ) -> CodecResult<()> {
        self.write_item_deltas(writer, current, previous, true)
    }

    /// Applies a delta payload to `target`, leaving missing members untouched.
    ///
    /// Fails with `KeyMismatch` if the payload would change a key member. On
    /// error the target is left partially updated.
    pub fn deserialize_delta(&self, reader: &mut BitReader<'_>, target: &mut T) -> CodecResult<()> {
        self.read_item_deltas(reader, target, true)
    }

    /// Structural equality over every member, keys included.
    pub fn get_equals(&self, a: &T, b: &T) -> bool {
        self.items.iter().all(|item| item.equals(a, b))
    }

    /// Extracts the key member values of `entity`.
    pub fn key_of(&self, entity: &T) -> EntityKey {
        let values = self
            .items
            .iter()
            .take(self.key_count)
            .map(|item| item.key_value(entity))
            .collect();
        EntityKey::new(values)
    }

    /// Name of the first key member whose value differs between `a` and `b`.
    pub(crate) fn changed_key(&self, a: &T, b: &T) -> Option<&str> {
        self.items
            .iter()
            .take(self.key_count)
            .find(|item| item.key_value(a) != item.key_value(b))
            .map(|item| item.name())
    }

    /// Returns `true` if at least one member is a key.
    pub const fn has_keys(&self) -> bool {
        self.key_count > 0
    }

    /// Number of key members.
    pub const fn key_count(&self) -> usize {
        self.key_count
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if the schema has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item names in wire order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.items.iter().map(|item| item.name())
    }

    /// Item shapes in wire order.
    pub fn shapes(&self) -> &[FieldShape] {
        &self.shapes
    }

    /// Deterministic fingerprint of the item shapes.
    pub const fn fingerprint(&self) -> u64 {
        self.fingerprint
    }

    /// The limits this schema was built with.
    pub const fn limits(&self) -> &CodecLimits {
        &self.limits
    }

    /// Serializes `entity` to a standalone payload using the thread's writer.
    pub fn to_bytes(&self, entity: &T) -> CodecResult<Vec<u8>> {
        with_thread_writer(self.limits.buffer_capacity, |writer| {
            self.serialize(writer, entity)?;
            Ok(writer.to_vec())
        })
    }

    /// Serializes `entity` using a writer from `factory`.
    pub fn to_bytes_with(
        &self,
        factory: &mut BufferWriterFactory,
        entity: &T,
    ) -> CodecResult<Vec<u8>> {
        let mut writer = factory.make()?;
        self.serialize(&mut writer, entity)?;
        Ok(writer.to_vec())
    }

    /// Serializes the delta from `previous` to `current` using the thread's
    /// writer.
    pub fn delta_to_bytes(&self, current: &T, previous: &T) -> CodecResult<Vec<u8>> {
        with_thread_writer(self.limits.buffer_capacity, |writer| {
            self.serialize_delta(writer, current, previous)?;
            Ok(writer.to_vec())
        })
    }

    pub(crate) fn write_items(&self, writer: &mut BitWriter<'_>, entity: &T) -> CodecResult<()> {
        for item in self.items.iter() {
            item.write_full(writer, entity)?;
        }
        Ok(())
    }

    pub(crate) fn read_items(&self, reader: &mut BitReader<'_>, target: &mut T) -> CodecResult<()> {
        for item in self.items.iter() {
            item.read_full(reader, target)?;
        }
        Ok(())
    }

    pub(crate) fn write_item_deltas(
        &self,
        writer: &mut BitWriter<'_>,
        current: &T,
        previous: &T,
        check_keys: bool,
    ) -> CodecResult<()> {
        for item in self.items.iter() {
            item.write_delta(writer, current, previous, check_keys)?;
        }
        Ok(())
    }

    pub(crate) fn read_item_deltas(
        &self,
        reader: &mut BitReader<'_>,
        target: &mut T,
        check_keys: bool,
    ) -> CodecResult<()> {
        for item in self.items.iter() {
            item.read_delta(reader, target, check_keys)?;
        }
        Ok(())
    }
}

/// Builder collecting field descriptors for a [`Schema`].
pub struct SchemaBuilder<T> {
    fields: Vec<Field<T>>,
    limits: CodecLimits,
}

impl<T: 'static> Default for SchemaBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> SchemaBuilder<T> {
    /// Creates an empty builder with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            limits: CodecLimits::default(),
        }
    }

    /// Adds a field descriptor.
    #[must_use]
    pub fn field(mut self, field: Field<T>) -> Self {
        self.fields.push(field);
        self
    }

    /// Sets the limits. Nested schemas inherit the outer schema's limits.
    #[must_use]
    pub fn limits(mut self, limits: CodecLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Builds with the default serializer registry.
    pub fn build(self) -> SchemaResult<Schema<T>> {
        self.build_with(&SerializerRegistry::default())
    }

    /// Builds, resolving primitive types through `registry`.
    pub fn build_with(self, registry: &SerializerRegistry) -> SchemaResult<Schema<T>> {
        let limits = self.limits.clone();
        self.build_in(&BuildContext {
            registry,
            limits: &limits,
        })
    }

    pub(crate) fn build_in(self, ctx: &BuildContext<'_>) -> SchemaResult<Schema<T>> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name()) {
                return Err(SchemaError::DuplicateField {
                    name: field.name().to_owned(),
                });
            }
            if field.is_key() && field.is_composite() {
                return Err(SchemaError::CompositeKey {
                    name: field.name().to_owned(),
                });
            }
        }
        drop(seen);

        let (mut ordered, mut rest): (Vec<_>, Vec<_>) =
            self.fields.into_iter().partition(Field::is_key);
        let key_count = ordered.len();
        rest.sort_by(|a, b| a.name().cmp(b.name()));
        ordered.extend(rest);

        let items = ordered
            .into_iter()
            .map(|field| field.build(ctx))
            .collect::<SchemaResult<Vec<_>>>()?;
        let shapes: Vec<FieldShape> = items.iter().map(|item| item.shape()).collect();
        let fingerprint = schema_hash(&shapes);

        debug!(
            fields = items.len(),
            keys = key_count,
            fingerprint = format_args!("{fingerprint:#018x}"),
            "schema built"
        );

        Ok(Schema {
            items: items.into(),
            shapes: shapes.into(),
            key_count,
            fingerprint,
            limits: ctx.limits.clone(),
        })
    }
}
