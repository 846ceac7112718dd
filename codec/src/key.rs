//! Entity keys.

use std::fmt;

use schema::Value;

/// The tuple of an entity's key member values, in schema order.
///
/// Two keys are equal when every member value is wire-equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKey(Vec<Option<Value>>);

impl EntityKey {
    /// Creates a key from member values.
    #[must_use]
    pub const fn new(values: Vec<Option<Value>>) -> Self {
        Self(values)
    }

    /// Returns the member values.
    #[must_use]
    pub fn values(&self) -> &[Option<Value>] {
        &self.0
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match value {
                Some(value) => write!(f, "{value}")?,
                None => f.write_str("null")?,
            }
        }
        f.write_str(")")
    }
}
