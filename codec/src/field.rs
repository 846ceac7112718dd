//! Field descriptors.
//!
//! A [`Field`] names one member of an entity, its type and a getter pair.
//! Descriptors are resolved into schema items when the schema is built.

use schema::{FieldType, SchemaResult, SemanticType, SerializerRegistry, Value};

use crate::access::{Optional, Required, TypedList, ValueList};
use crate::item::{Getter, ListItem, ObjectItem, ObjectListItem, ScalarItem, SchemaItem, Setter};
use crate::limits::CodecLimits;
use crate::tree::SchemaBuilder;

pub(crate) struct BuildContext<'a> {
    pub(crate) registry: &'a SerializerRegistry,
    pub(crate) limits: &'a CodecLimits,
}

type BuildFn<T> =
    Box<dyn FnOnce(String, bool, &BuildContext<'_>) -> SchemaResult<Box<dyn SchemaItem<T>>>>;

/// Describes one member of `T`.
pub struct Field<T> {
    name: String,
    key: bool,
    composite: bool,
    build: BuildFn<T>,
}

impl<T> std::fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("composite", &self.composite)
            .finish_non_exhaustive()
    }
}

impl<T: 'static> Field<T> {
    fn new<B>(name: impl Into<String>, composite: bool, build: B) -> Self
    where
        B: FnOnce(String, bool, &BuildContext<'_>) -> SchemaResult<Box<dyn SchemaItem<T>>>
            + 'static,
    {
        Self {
            name: name.into(),
            key: false,
            composite,
            build: Box::new(build),
        }
    }

    /// A primitive member of type `P`. `Option<P>` members are nullable.
    pub fn scalar<P, G, M>(name: impl Into<String>, get: G, get_mut: M) -> Self
    where
        P: FieldType,
        G: Fn(&T) -> &P + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut P + Send + Sync + 'static,
    {
        Self::new(name, false, move |name, key, ctx| {
            let ser = ctx.registry.make_for::<P>()?;
            let getter: Getter<T> = Box::new(move |entity: &T| get(entity).to_value());
            let setter: Setter<T> = Box::new(move |entity: &mut T, value: Option<Value>| {
                match P::from_value(value) {
                    Some(value) => {
                        *get_mut(entity) = value;
                        true
                    }
                    None => false,
                }
            });
            let item: Box<dyn SchemaItem<T>> =
                Box::new(ScalarItem::new(name, key, ser, getter, setter));
            Ok(item)
        })
    }

    /// A primitive member accessed through wire values, for entities whose
    /// shape is only known at runtime. `None` is null.
    pub fn value<G, S>(name: impl Into<String>, ty: SemanticType, get: G, set: S) -> Self
    where
        G: Fn(&T) -> Option<Value> + Send + Sync + 'static,
        S: Fn(&mut T, Option<Value>) + Send + Sync + 'static,
    {
        let composite = ty.non_null().is_composite();
        Self::new(name, composite, move |name, key, ctx| {
            let ser = ctx.registry.make(&ty)?;
            let setter: Setter<T> = Box::new(move |entity: &mut T, value: Option<Value>| {
                set(entity, value);
                true
            });
            let item: Box<dyn SchemaItem<T>> =
                Box::new(ScalarItem::new(name, key, ser, Box::new(get), setter));
            Ok(item)
        })
    }

    /// A list of primitives.
    pub fn list<P, G, M>(name: impl Into<String>, get: G, get_mut: M) -> Self
    where
        P: FieldType + Default,
        G: Fn(&T) -> &Vec<P> + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut Vec<P> + Send + Sync + 'static,
    {
        Self::new(name, true, move |name, _, ctx| {
            let ser = ctx.registry.make_for::<P>()?;
            let access = TypedList::<_, P>::new(Required::new::<T, Vec<P>>(get, get_mut));
            let item: Box<dyn SchemaItem<T>> = Box::new(ListItem::new(
                name,
                ser,
                Box::new(access),
                ctx.limits.max_list_len,
            ));
            Ok(item)
        })
    }

    /// A nullable list of primitives.
    pub fn optional_list<P, G, M>(name: impl Into<String>, get: G, get_mut: M) -> Self
    where
        P: FieldType + Default,
        G: Fn(&T) -> &Option<Vec<P>> + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut Option<Vec<P>> + Send + Sync + 'static,
    {
        Self::new(name, true, move |name, _, ctx| {
            let ser = ctx.registry.make_for::<P>()?;
            let access = TypedList::<_, P>::new(Optional::new::<T, Vec<P>>(get, get_mut));
            let item: Box<dyn SchemaItem<T>> = Box::new(ListItem::new(
                name,
                ser,
                Box::new(access),
                ctx.limits.max_list_len,
            ));
            Ok(item)
        })
    }

    /// A list of primitives held as wire values, element type `element_ty`.
    pub fn value_list<G, M>(
        name: impl Into<String>,
        element_ty: SemanticType,
        get: G,
        get_mut: M,
    ) -> Self
    where
        G: Fn(&T) -> &Vec<Option<Value>> + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut Vec<Option<Value>> + Send + Sync + 'static,
    {
        Self::new(name, true, move |name, _, ctx| {
            let ser = ctx.registry.make(&element_ty)?;
            let slot = Required::new::<T, Vec<Option<Value>>>(get, get_mut);
            let access = ValueList::new(slot, element_ty);
            let item: Box<dyn SchemaItem<T>> = Box::new(ListItem::new(
                name,
                ser,
                Box::new(access),
                ctx.limits.max_list_len,
            ));
            Ok(item)
        })
    }

    /// A nullable list of primitives held as wire values.
    pub fn optional_value_list<G, M>(
        name: impl Into<String>,
        element_ty: SemanticType,
        get: G,
        get_mut: M,
    ) -> Self
    where
        G: Fn(&T) -> &Option<Vec<Option<Value>>> + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut Option<Vec<Option<Value>>> + Send + Sync + 'static,
    {
        Self::new(name, true, move |name, _, ctx| {
            let ser = ctx.registry.make(&element_ty)?;
            let slot = Optional::new::<T, Vec<Option<Value>>>(get, get_mut);
            let access = ValueList::new(slot, element_ty);
            let item: Box<dyn SchemaItem<T>> = Box::new(ListItem::new(
                name,
                ser,
                Box::new(access),
                ctx.limits.max_list_len,
            ));
            Ok(item)
        })
    }

    /// A nested object described by `nested`.
    pub fn object<N, G, M>(
        name: impl Into<String>,
        nested: SchemaBuilder<N>,
        get: G,
        get_mut: M,
    ) -> Self
    where
        N: Default + 'static,
        G: Fn(&T) -> &N + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut N + Send + Sync + 'static,
    {
        Self::new(name, true, move |name, _, ctx| {
            let nested = nested.build_in(ctx)?;
            let slot = Required::new::<T, N>(get, get_mut);
            let item: Box<dyn SchemaItem<T>> = Box::new(ObjectItem::new(name, nested, slot));
            Ok(item)
        })
    }

    /// A nullable nested object.
    pub fn optional_object<N, G, M>(
        name: impl Into<String>,
        nested: SchemaBuilder<N>,
        get: G,
        get_mut: M,
    ) -> Self
    where
        N: Default + 'static,
        G: Fn(&T) -> &Option<N> + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut Option<N> + Send + Sync + 'static,
    {
        Self::new(name, true, move |name, _, ctx| {
            let nested = nested.build_in(ctx)?;
            let slot = Optional::new::<T, N>(get, get_mut);
            let item: Box<dyn SchemaItem<T>> = Box::new(ObjectItem::new(name, nested, slot));
            Ok(item)
        })
    }

    /// A list of nested objects.
    pub fn object_list<N, G, M>(
        name: impl Into<String>,
        nested: SchemaBuilder<N>,
        get: G,
        get_mut: M,
    ) -> Self
    where
        N: Default + 'static,
        G: Fn(&T) -> &Vec<N> + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut Vec<N> + Send + Sync + 'static,
    {
        Self::new(name, true, move |name, _, ctx| {
            let nested = nested.build_in(ctx)?;
            let slot = Required::new::<T, Vec<N>>(get, get_mut);
            let item: Box<dyn SchemaItem<T>> = Box::new(ObjectListItem::new(
                name,
                nested,
                slot,
                ctx.limits.max_list_len,
            ));
            Ok(item)
        })
    }

    /// A nullable list of nested objects.
    pub fn optional_object_list<N, G, M>(
        name: impl Into<String>,
        nested: SchemaBuilder<N>,
        get: G,
        get_mut: M,
    ) -> Self
    where
        N: Default + 'static,
        G: Fn(&T) -> &Option<Vec<N>> + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut Option<Vec<N>> + Send + Sync + 'static,
    {
        Self::new(name, true, move |name, _, ctx| {
            let nested = nested.build_in(ctx)?;
            let slot = Optional::new::<T, Vec<N>>(get, get_mut);
            let item: Box<dyn SchemaItem<T>> = Box::new(ObjectListItem::new(
                name,
                nested,
                slot,
                ctx.limits.max_list_len,
            ));
            Ok(item)
        })
    }
}

impl<T> Field<T> {
    /// Marks the field as a key member. Only primitive fields can be keys;
    /// building a schema with a composite key fails.
    #[must_use]
    pub const fn key(mut self) -> Self {
        self.key = true;
        self
    }

    /// The member name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if marked as a key member.
    pub const fn is_key(&self) -> bool {
        self.key
    }

    /// Returns `true` for list and object fields.
    pub const fn is_composite(&self) -> bool {
        self.composite
    }

    pub(crate) fn build(self, ctx: &BuildContext<'_>) -> SchemaResult<Box<dyn SchemaItem<T>>> {
        (self.build)(self.name, self.key, ctx)
    }
}
