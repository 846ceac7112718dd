//! Member projections used by schema items.
//!
//! A projection turns the getter pair supplied with a field descriptor into
//! uniform access over a possibly absent member, so items handle required and
//! nullable members with the same code.

use std::marker::PhantomData;

use schema::{FieldType, SemanticType, Value};

/// Access to one member of `T` holding a `V`.
pub(crate) trait Projection<T, V>: Send + Sync + 'static {
    /// Whether the member can be absent.
    fn nullable(&self) -> bool;

    fn get<'a>(&self, entity: &'a T) -> Option<&'a V>;

    fn get_mut<'a>(&self, entity: &'a mut T) -> Option<&'a mut V>;

    /// Replaces the member. Returns `false` if `value` is `None` and the
    /// member is required.
    fn set(&self, entity: &mut T, value: Option<V>) -> bool;

    /// Returns the member, creating a default one if absent.
    fn get_or_default<'a>(&self, entity: &'a mut T) -> &'a mut V
    where
        V: Default;
}

/// Projection onto a required member.
pub(crate) struct Required<G, M> {
    get: G,
    get_mut: M,
}

impl<G, M> Required<G, M> {
    pub(crate) fn new<T, V>(get: G, get_mut: M) -> Self
    where
        G: Fn(&T) -> &V,
        M: Fn(&mut T) -> &mut V,
    {
        Self { get, get_mut }
    }
}

impl<T, V, G, M> Projection<T, V> for Required<G, M>
where
    G: Fn(&T) -> &V + Send + Sync + 'static,
    M: Fn(&mut T) -> &mut V + Send + Sync + 'static,
{
    fn nullable(&self) -> bool {
        false
    }

    fn get<'a>(&self, entity: &'a T) -> Option<&'a V> {
        Some((self.get)(entity))
    }

    fn get_mut<'a>(&self, entity: &'a mut T) -> Option<&'a mut V> {
        Some((self.get_mut)(entity))
    }

    fn set(&self, entity: &mut T, value: Option<V>) -> bool {
        match value {
            Some(value) => {
                *(self.get_mut)(entity) = value;
                true
            }
            None => false,
        }
    }

    fn get_or_default<'a>(&self, entity: &'a mut T) -> &'a mut V
    where
        V: Default,
    {
        (self.get_mut)(entity)
    }
}

/// Projection onto an `Option` member.
pub(crate) struct Optional<G, M> {
    get: G,
    get_mut: M,
}

impl<G, M> Optional<G, M> {
    pub(crate) fn new<T, V>(get: G, get_mut: M) -> Self
    where
        G: Fn(&T) -> &Option<V>,
        M: Fn(&mut T) -> &mut Option<V>,
    {
        Self { get, get_mut }
    }
}

impl<T, V, G, M> Projection<T, V> for Optional<G, M>
where
    G: Fn(&T) -> &Option<V> + Send + Sync + 'static,
    M: Fn(&mut T) -> &mut Option<V> + Send + Sync + 'static,
{
    fn nullable(&self) -> bool {
        true
    }

    fn get<'a>(&self, entity: &'a T) -> Option<&'a V> {
        (self.get)(entity).as_ref()
    }

    fn get_mut<'a>(&self, entity: &'a mut T) -> Option<&'a mut V> {
        (self.get_mut)(entity).as_mut()
    }

    fn set(&self, entity: &mut T, value: Option<V>) -> bool {
        *(self.get_mut)(entity) = value;
        true
    }

    fn get_or_default<'a>(&self, entity: &'a mut T) -> &'a mut V
    where
        V: Default,
    {
        (self.get_mut)(entity).get_or_insert_with(V::default)
    }
}

/// Value-level access to a list of primitives.
pub(crate) trait ListAccess<T>: Send + Sync {
    fn nullable(&self) -> bool;

    /// Element count, `None` when the list is null.
    fn len(&self, entity: &T) -> Option<usize>;

    fn element(&self, entity: &T, index: usize) -> Option<Value>;

    /// The element a padded or resized list is filled with.
    fn default_element(&self) -> Option<Value>;

    /// Sets the list to null. Returns `false` for required lists.
    fn set_null(&self, entity: &mut T) -> bool;

    /// Creates the list if null, then truncates or pads it to `len`.
    fn resize(&self, entity: &mut T, len: usize);

    /// Returns `false` if the element type cannot hold `value`.
    fn set_element(&self, entity: &mut T, index: usize, value: Option<Value>) -> bool;
}

/// A `Vec<P>` member with `P` a [`FieldType`].
pub(crate) struct TypedList<S, P> {
    slot: S,
    _element: PhantomData<fn() -> P>,
}

impl<S, P> TypedList<S, P> {
    pub(crate) const fn new(slot: S) -> Self {
        Self {
            slot,
            _element: PhantomData,
        }
    }
}

impl<T, S, P> ListAccess<T> for TypedList<S, P>
where
    S: Projection<T, Vec<P>>,
    P: FieldType + Default,
{
    fn nullable(&self) -> bool {
        self.slot.nullable()
    }

    fn len(&self, entity: &T) -> Option<usize> {
        self.slot.get(entity).map(Vec::len)
    }

    fn element(&self, entity: &T, index: usize) -> Option<Value> {
        self.slot
            .get(entity)
            .and_then(|list| list.get(index))
            .and_then(P::to_value)
    }

    fn default_element(&self) -> Option<Value> {
        P::default().to_value()
    }

    fn set_null(&self, entity: &mut T) -> bool {
        self.slot.set(entity, None)
    }

    fn resize(&self, entity: &mut T, len: usize) {
        self.slot.get_or_default(entity).resize_with(len, P::default);
    }

    fn set_element(&self, entity: &mut T, index: usize, value: Option<Value>) -> bool {
        let Some(element) = P::from_value(value) else {
            return false;
        };
        match self.slot.get_mut(entity).and_then(|list| list.get_mut(index)) {
            Some(slot) => {
                *slot = element;
                true
            }
            None => false,
        }
    }
}

/// A `Vec<Option<Value>>` member for dynamically typed entities.
pub(crate) struct ValueList<S> {
    slot: S,
    element_ty: SemanticType,
}

impl<S> ValueList<S> {
    pub(crate) const fn new(slot: S, element_ty: SemanticType) -> Self {
        Self { slot, element_ty }
    }
}

impl<T, S> ListAccess<T> for ValueList<S>
where
    S: Projection<T, Vec<Option<Value>>>,
{
    fn nullable(&self) -> bool {
        self.slot.nullable()
    }

    fn len(&self, entity: &T) -> Option<usize> {
        self.slot.get(entity).map(Vec::len)
    }

    fn element(&self, entity: &T, index: usize) -> Option<Value> {
        self.slot
            .get(entity)
            .and_then(|list| list.get(index))
            .cloned()
            .flatten()
    }

    fn default_element(&self) -> Option<Value> {
        Value::default_for(&self.element_ty)
    }

    fn set_null(&self, entity: &mut T) -> bool {
        self.slot.set(entity, None)
    }

    fn resize(&self, entity: &mut T, len: usize) {
        let default = self.default_element();
        self.slot.get_or_default(entity).resize(len, default);
    }

    fn set_element(&self, entity: &mut T, index: usize, value: Option<Value>) -> bool {
        match self.slot.get_mut(entity).and_then(|list| list.get_mut(index)) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Holder {
        required: Vec<u16>,
        optional: Option<Vec<u16>>,
    }

    fn required() -> impl Projection<Holder, Vec<u16>> {
        Required::new(|h: &Holder| &h.required, |h: &mut Holder| &mut h.required)
    }

    fn optional() -> impl Projection<Holder, Vec<u16>> {
        Optional::new(|h: &Holder| &h.optional, |h: &mut Holder| &mut h.optional)
    }

    #[test]
    fn required_rejects_null() {
        let mut holder = Holder::default();
        let slot = required();
        assert!(!slot.nullable());
        assert!(!slot.set(&mut holder, None));
        assert!(slot.set(&mut holder, Some(vec![1])));
        assert_eq!(slot.get(&holder), Some(&vec![1]));
    }

    #[test]
    fn optional_creates_on_demand() {
        let mut holder = Holder::default();
        let slot = optional();
        assert!(slot.get(&holder).is_none());
        slot.get_or_default(&mut holder).push(3);
        assert_eq!(holder.optional, Some(vec![3]));
        assert!(slot.set(&mut holder, None));
        assert!(holder.optional.is_none());
    }

    #[test]
    fn typed_list_resize_and_set() {
        let mut holder = Holder::default();
        let list = TypedList::<_, u16>::new(optional());
        assert_eq!(list.len(&holder), None);
        list.resize(&mut holder, 2);
        assert_eq!(list.len(&holder), Some(2));
        assert!(list.set_element(&mut holder, 1, Some(Value::U16(9))));
        assert!(!list.set_element(&mut holder, 1, Some(Value::U8(9))));
        assert!(!list.set_element(&mut holder, 5, Some(Value::U16(9))));
        assert_eq!(holder.optional, Some(vec![0, 9]));
        assert_eq!(list.default_element(), Some(Value::U16(0)));
    }

    #[derive(Default)]
    struct Dynamic {
        values: Vec<Option<Value>>,
    }

    #[test]
    fn value_list_pads_with_type_default() {
        let mut entity = Dynamic::default();
        let slot = Required::new(|d: &Dynamic| &d.values, |d: &mut Dynamic| &mut d.values);
        let list = ValueList::new(slot, SemanticType::String);
        list.resize(&mut entity, 2);
        assert_eq!(list.element(&entity, 0), Some(Value::String(String::new())));
        assert!(!list.set_null(&mut entity));
    }
}
