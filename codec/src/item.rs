//! Schema items: one per entity member.
//!
//! Every item writes a field header followed by its payload. In delta mode an
//! unchanged item writes only the missing bit.

use bitstream::{BitReader, BitWriter};
use schema::{FieldShape, SemanticType, TypeSerializer, Value};
use wire::{decode_field_header, encode_field_header, FieldHeader};

use crate::access::{ListAccess, Projection};
use crate::error::{CodecError, CodecResult};
use crate::tree::Schema;
use crate::value::{
    count_patch_value, read_count, read_delta_count, read_field, write_delta_count, write_field,
};

/// Reads a scalar member as a wire value.
pub(crate) type Getter<T> = Box<dyn Fn(&T) -> Option<Value> + Send + Sync>;

/// Stores a wire value into a scalar member; `false` if it cannot be held.
pub(crate) type Setter<T> = Box<dyn Fn(&mut T, Option<Value>) -> bool + Send + Sync>;

pub(crate) trait SchemaItem<T>: Send + Sync {
    fn name(&self) -> &str;

    fn is_key(&self) -> bool {
        false
    }

    fn shape(&self) -> FieldShape;

    fn write_full(&self, writer: &mut BitWriter<'_>, entity: &T) -> CodecResult<()>;

    fn read_full(&self, reader: &mut BitReader<'_>, target: &mut T) -> CodecResult<()>;

    /// Writes the member of `current` relative to `previous`. With
    /// `check_key`, a changed key member fails instead of being written.
    fn write_delta(
        &self,
        writer: &mut BitWriter<'_>,
        current: &T,
        previous: &T,
        check_key: bool,
    ) -> CodecResult<()>;

    /// Applies a delta field to `target`. With `check_key`, a key member
    /// that would change fails.
    fn read_delta(
        &self,
        reader: &mut BitReader<'_>,
        target: &mut T,
        check_key: bool,
    ) -> CodecResult<()>;

    fn equals(&self, a: &T, b: &T) -> bool;

    /// The member's value, for key extraction. Composite items return `None`.
    fn key_value(&self, _entity: &T) -> Option<Value> {
        None
    }
}

fn write_missing(writer: &mut BitWriter<'_>) -> CodecResult<()> {
    encode_field_header(writer, FieldHeader::missing())?;
    Ok(())
}

fn write_null(writer: &mut BitWriter<'_>, field: &str, nullable: bool) -> CodecResult<()> {
    if !nullable {
        return Err(CodecError::NullNotAllowed {
            field: field.to_owned(),
        });
    }
    encode_field_header(writer, FieldHeader::present(true))?;
    Ok(())
}

fn null_not_allowed(field: &str) -> CodecError {
    CodecError::NullNotAllowed {
        field: field.to_owned(),
    }
}

fn rejected(field: &str) -> CodecError {
    CodecError::InvalidValue {
        field: field.to_owned(),
        reason: "member type cannot hold decoded value",
    }
}

fn shape_type(inner: SemanticType, nullable: bool) -> SemanticType {
    if nullable {
        SemanticType::nullable(inner)
    } else {
        inner
    }
}

/// A primitive member.
pub(crate) struct ScalarItem<T> {
    name: String,
    key: bool,
    ser: TypeSerializer,
    get: Getter<T>,
    set: Setter<T>,
}

impl<T> ScalarItem<T> {
    pub(crate) fn new(
        name: String,
        key: bool,
        ser: TypeSerializer,
        get: Getter<T>,
        set: Setter<T>,
    ) -> Self {
        Self {
            name,
            key,
            ser,
            get,
            set,
        }
    }

    fn assign(&self, target: &mut T, value: Option<Value>) -> CodecResult<()> {
        if (self.set)(target, value) {
            Ok(())
        } else {
            Err(rejected(&self.name))
        }
    }
}

impl<T> SchemaItem<T> for ScalarItem<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_key(&self) -> bool {
        self.key
    }

    fn shape(&self) -> FieldShape {
        let shape = FieldShape::primitive(self.name.clone(), self.ser.ty.clone());
        if self.key {
            shape.key()
        } else {
            shape
        }
    }

    fn write_full(&self, writer: &mut BitWriter<'_>, entity: &T) -> CodecResult<()> {
        write_field(writer, &self.name, &self.ser, (self.get)(entity).as_ref())
    }

    fn read_full(&self, reader: &mut BitReader<'_>, target: &mut T) -> CodecResult<()> {
        match read_field(reader, &self.name, &self.ser)? {
            Some(value) => self.assign(target, value),
            None => Ok(()),
        }
    }

    fn write_delta(
        &self,
        writer: &mut BitWriter<'_>,
        current: &T,
        previous: &T,
        check_key: bool,
    ) -> CodecResult<()> {
        let value = (self.get)(current);
        if value == (self.get)(previous) {
            return write_missing(writer);
        }
        if check_key && self.key {
            return Err(CodecError::KeyMismatch {
                field: self.name.clone(),
            });
        }
        write_field(writer, &self.name, &self.ser, value.as_ref())
    }

    fn read_delta(
        &self,
        reader: &mut BitReader<'_>,
        target: &mut T,
        check_key: bool,
    ) -> CodecResult<()> {
        let Some(value) = read_field(reader, &self.name, &self.ser)? else {
            return Ok(());
        };
        if check_key && self.key {
            if value != (self.get)(target) {
                return Err(CodecError::KeyMismatch {
                    field: self.name.clone(),
                });
            }
            return Ok(());
        }
        self.assign(target, value)
    }

    fn equals(&self, a: &T, b: &T) -> bool {
        (self.get)(a) == (self.get)(b)
    }

    fn key_value(&self, entity: &T) -> Option<Value> {
        (self.get)(entity)
    }
}

/// A list of primitives.
pub(crate) struct ListItem<T> {
    name: String,
    ser: TypeSerializer,
    access: Box<dyn ListAccess<T>>,
    max_len: usize,
}

impl<T> ListItem<T> {
    pub(crate) fn new(
        name: String,
        ser: TypeSerializer,
        access: Box<dyn ListAccess<T>>,
        max_len: usize,
    ) -> Self {
        Self {
            name,
            ser,
            access,
            max_len,
        }
    }

    fn assign_null(&self, target: &mut T) -> CodecResult<()> {
        if self.access.set_null(target) {
            Ok(())
        } else {
            Err(null_not_allowed(&self.name))
        }
    }

    fn assign(&self, target: &mut T, index: usize, value: Option<Value>) -> CodecResult<()> {
        if self.access.set_element(target, index, value) {
            Ok(())
        } else {
            Err(rejected(&self.name))
        }
    }

    fn read_elements(
        &self,
        reader: &mut BitReader<'_>,
        target: &mut T,
        count: usize,
    ) -> CodecResult<()> {
        self.access.resize(target, count);
        for index in 0..count {
            if let Some(value) = read_field(reader, &self.name, &self.ser)? {
                self.assign(target, index, value)?;
            }
        }
        Ok(())
    }
}

impl<T> SchemaItem<T> for ListItem<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn shape(&self) -> FieldShape {
        let ty = shape_type(
            SemanticType::list(self.ser.ty.clone()),
            self.access.nullable(),
        );
        FieldShape::primitive(self.name.clone(), ty)
    }

    fn write_full(&self, writer: &mut BitWriter<'_>, entity: &T) -> CodecResult<()> {
        let Some(len) = self.access.len(entity) else {
            return write_null(writer, &self.name, self.access.nullable());
        };
        encode_field_header(writer, FieldHeader::present(false))?;
        let bookmark = writer.reserve(32)?;
        let mut written = 0;
        for index in 0..len {
            let element = self.access.element(entity, index);
            write_field(writer, &self.name, &self.ser, element.as_ref())?;
            written += 1;
        }
        writer.patch(bookmark, count_patch_value(&self.name, written)?)?;
        Ok(())
    }

    fn read_full(&self, reader: &mut BitReader<'_>, target: &mut T) -> CodecResult<()> {
        let header = decode_field_header(reader)?;
        if header.is_missing {
            return Ok(());
        }
        if header.is_null {
            return self.assign_null(target);
        }
        let count = read_count(reader, &self.name, self.max_len)?;
        self.read_elements(reader, target, count)
    }

    fn write_delta(
        &self,
        writer: &mut BitWriter<'_>,
        current: &T,
        previous: &T,
        _check_key: bool,
    ) -> CodecResult<()> {
        if self.equals(current, previous) {
            return write_missing(writer);
        }
        let Some(len) = self.access.len(current) else {
            return write_null(writer, &self.name, self.access.nullable());
        };
        let previous_len = self.access.len(previous).unwrap_or(0);
        encode_field_header(writer, FieldHeader::present(false))?;
        write_delta_count(writer, &self.name, len, previous_len)?;

        let padding = self.access.default_element();
        for index in 0..len {
            let element = self.access.element(current, index);
            let before = if index < previous_len {
                self.access.element(previous, index)
            } else {
                padding.clone()
            };
            if element == before {
                write_missing(writer)?;
            } else {
                write_field(writer, &self.name, &self.ser, element.as_ref())?;
            }
        }
        Ok(())
    }

    fn read_delta(
        &self,
        reader: &mut BitReader<'_>,
        target: &mut T,
        _check_key: bool,
    ) -> CodecResult<()> {
        let header = decode_field_header(reader)?;
        if header.is_missing {
            return Ok(());
        }
        if header.is_null {
            return self.assign_null(target);
        }
        let current = self.access.len(target).unwrap_or(0);
        let count = read_delta_count(reader, &self.name, current, self.max_len)?;
        self.read_elements(reader, target, count)
    }

    fn equals(&self, a: &T, b: &T) -> bool {
        let len = self.access.len(a);
        len == self.access.len(b)
            && (0..len.unwrap_or(0))
                .all(|index| self.access.element(a, index) == self.access.element(b, index))
    }
}

/// A nested object.
pub(crate) struct ObjectItem<N, S> {
    name: String,
    nested: Schema<N>,
    slot: S,
}

impl<N, S> ObjectItem<N, S> {
    pub(crate) const fn new(name: String, nested: Schema<N>, slot: S) -> Self {
        Self { name, nested, slot }
    }
}

impl<T, N, S> SchemaItem<T> for ObjectItem<N, S>
where
    N: Default + 'static,
    S: Projection<T, N>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn shape(&self) -> FieldShape {
        let ty = shape_type(SemanticType::Object, self.slot.nullable());
        FieldShape::nested(self.name.clone(), ty, self.nested.shapes().to_vec())
    }

    fn write_full(&self, writer: &mut BitWriter<'_>, entity: &T) -> CodecResult<()> {
        let Some(value) = self.slot.get(entity) else {
            return write_null(writer, &self.name, self.slot.nullable());
        };
        encode_field_header(writer, FieldHeader::present(false))?;
        self.nested.write_items(writer, value)
    }

    fn read_full(&self, reader: &mut BitReader<'_>, target: &mut T) -> CodecResult<()> {
        let header = decode_field_header(reader)?;
        if header.is_missing {
            return Ok(());
        }
        if header.is_null {
            if self.slot.set(target, None) {
                return Ok(());
            }
            return Err(null_not_allowed(&self.name));
        }
        let mut value = N::default();
        self.nested.read_items(reader, &mut value)?;
        self.slot.set(target, Some(value));
        Ok(())
    }

    fn write_delta(
        &self,
        writer: &mut BitWriter<'_>,
        current: &T,
        previous: &T,
        _check_key: bool,
    ) -> CodecResult<()> {
        if self.equals(current, previous) {
            return write_missing(writer);
        }
        let Some(value) = self.slot.get(current) else {
            return write_null(writer, &self.name, self.slot.nullable());
        };
        encode_field_header(writer, FieldHeader::present(false))?;
        match self.slot.get(previous) {
            Some(before) => self.nested.write_item_deltas(writer, value, before, false),
            None => self.nested.write_items(writer, value),
        }
    }

    fn read_delta(
        &self,
        reader: &mut BitReader<'_>,
        target: &mut T,
        _check_key: bool,
    ) -> CodecResult<()> {
        if self.slot.get(target).is_none() {
            return self.read_full(reader, target);
        }
        let header = decode_field_header(reader)?;
        if header.is_missing {
            return Ok(());
        }
        if header.is_null {
            if self.slot.set(target, None) {
                return Ok(());
            }
            return Err(null_not_allowed(&self.name));
        }
        match self.slot.get_mut(target) {
            Some(existing) => self.nested.read_item_deltas(reader, existing, false),
            None => Ok(()),
        }
    }

    fn equals(&self, a: &T, b: &T) -> bool {
        match (self.slot.get(a), self.slot.get(b)) {
            (None, None) => true,
            (Some(a), Some(b)) => self.nested.get_equals(a, b),
            _ => false,
        }
    }
}

/// A list of nested objects.
pub(crate) struct ObjectListItem<N, S> {
    name: String,
    nested: Schema<N>,
    slot: S,
    max_len: usize,
}

impl<N, S> ObjectListItem<N, S> {
    pub(crate) const fn new(name: String, nested: Schema<N>, slot: S, max_len: usize) -> Self {
        Self {
            name,
            nested,
            slot,
            max_len,
        }
    }
}

impl<T, N, S> SchemaItem<T> for ObjectListItem<N, S>
where
    N: Default + 'static,
    S: Projection<T, Vec<N>>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn shape(&self) -> FieldShape {
        let ty = shape_type(
            SemanticType::list(SemanticType::Object),
            self.slot.nullable(),
        );
        FieldShape::nested(self.name.clone(), ty, self.nested.shapes().to_vec())
    }

    fn write_full(&self, writer: &mut BitWriter<'_>, entity: &T) -> CodecResult<()> {
        let Some(list) = self.slot.get(entity) else {
            return write_null(writer, &self.name, self.slot.nullable());
        };
        encode_field_header(writer, FieldHeader::present(false))?;
        let bookmark = writer.reserve(32)?;
        for element in list {
            self.nested.write_items(writer, element)?;
        }
        writer.patch(bookmark, count_patch_value(&self.name, list.len())?)?;
        Ok(())
    }

    fn read_full(&self, reader: &mut BitReader<'_>, target: &mut T) -> CodecResult<()> {
        let header = decode_field_header(reader)?;
        if header.is_missing {
            return Ok(());
        }
        if header.is_null {
            if self.slot.set(target, None) {
                return Ok(());
            }
            return Err(null_not_allowed(&self.name));
        }
        let count = read_count(reader, &self.name, self.max_len)?;
        let mut list = Vec::with_capacity(count);
        for _ in 0..count {
            let mut element = N::default();
            self.nested.read_items(reader, &mut element)?;
            list.push(element);
        }
        self.slot.set(target, Some(list));
        Ok(())
    }

    fn write_delta(
        &self,
        writer: &mut BitWriter<'_>,
        current: &T,
        previous: &T,
        _check_key: bool,
    ) -> CodecResult<()> {
        if self.equals(current, previous) {
            return write_missing(writer);
        }
        let Some(list) = self.slot.get(current) else {
            return write_null(writer, &self.name, self.slot.nullable());
        };
        let before = self.slot.get(previous);
        encode_field_header(writer, FieldHeader::present(false))?;
        write_delta_count(writer, &self.name, list.len(), before.map_or(0, Vec::len))?;

        let padding = N::default();
        for (index, element) in list.iter().enumerate() {
            let prior = before.and_then(|b| b.get(index)).unwrap_or(&padding);
            if self.nested.get_equals(element, prior) {
                write_missing(writer)?;
            } else {
                encode_field_header(writer, FieldHeader::present(false))?;
                self.nested.write_item_deltas(writer, element, prior, false)?;
            }
        }
        Ok(())
    }

    fn read_delta(
        &self,
        reader: &mut BitReader<'_>,
        target: &mut T,
        _check_key: bool,
    ) -> CodecResult<()> {
        let header = decode_field_header(reader)?;
        if header.is_missing {
            return Ok(());
        }
        if header.is_null {
            if self.slot.set(target, None) {
                return Ok(());
            }
            return Err(null_not_allowed(&self.name));
        }
        let current = self.slot.get(target).map_or(0, Vec::len);
        let count = read_delta_count(reader, &self.name, current, self.max_len)?;
        let list = self.slot.get_or_default(target);
        list.resize_with(count, N::default);
        for element in list.iter_mut() {
            let header = decode_field_header(reader)?;
            if header.is_missing {
                continue;
            }
            if header.is_null {
                return Err(null_not_allowed(&self.name));
            }
            self.nested.read_item_deltas(reader, element, false)?;
        }
        Ok(())
    }

    fn equals(&self, a: &T, b: &T) -> bool {
        match (self.slot.get(a), self.slot.get(b)) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                a.len() == b.len()
                    && a.iter().zip(b).all(|(x, y)| self.nested.get_equals(x, y))
            }
            _ => false,
        }
    }
}
