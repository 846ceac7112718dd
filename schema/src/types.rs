//! Semantic type tags.

use std::fmt;

/// Inclusive numeric range of an enumeration's discriminants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnumRange {
    /// Smallest discriminant.
    pub min: i64,
    /// Largest discriminant.
    pub max: i64,
}

impl EnumRange {
    /// Creates a range from its bounds.
    #[must_use]
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Returns the tightest range covering `values`, or `None` if empty.
    #[must_use]
    pub fn covering(values: &[i64]) -> Option<Self> {
        let min = values.iter().copied().min()?;
        let max = values.iter().copied().max()?;
        Some(Self { min, max })
    }

    /// Returns `true` if `value` lies inside the range.
    #[must_use]
    pub const fn contains(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// The closed set of types a schema field can carry.
///
/// Primitive tags resolve to a serializer through the registry. `List` and
/// `Object` are composites handled by the schema tree itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SemanticType {
    Bool,
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
    Decimal,
    Char,
    Date,
    DateTime,
    Duration,
    Uuid,
    String,
    Enum(EnumRange),
    Nullable(Box<SemanticType>),
    List(Box<SemanticType>),
    Object,
}

impl SemanticType {
    /// Wraps a type in `Nullable`.
    #[must_use]
    pub fn nullable(inner: Self) -> Self {
        Self::Nullable(Box::new(inner))
    }

    /// Wraps a type in `List`.
    #[must_use]
    pub fn list(element: Self) -> Self {
        Self::List(Box::new(element))
    }

    /// Returns `true` for `Nullable` types.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        matches!(self, Self::Nullable(_))
    }

    /// Returns `true` for `List` and `Object`.
    #[must_use]
    pub const fn is_composite(&self) -> bool {
        matches!(self, Self::List(_) | Self::Object)
    }

    /// Strips one level of `Nullable`.
    #[must_use]
    pub fn non_null(&self) -> &Self {
        match self {
            Self::Nullable(inner) => inner,
            other => other,
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::U8 => "u8",
            Self::I8 => "i8",
            Self::U16 => "u16",
            Self::I16 => "i16",
            Self::U32 => "u32",
            Self::I32 => "i32",
            Self::U64 => "u64",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Decimal => "decimal",
            Self::Char => "char",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Duration => "duration",
            Self::Uuid => "uuid",
            Self::String => "string",
            Self::Object => "object",
            Self::Enum(range) => return write!(f, "enum[{}..={}]", range.min, range.max),
            Self::Nullable(inner) => return write!(f, "nullable<{inner}>"),
            Self::List(inner) => return write!(f, "list<{inner}>"),
        };
        f.write_str(name)
    }
}
