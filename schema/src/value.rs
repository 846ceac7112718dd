//! Primitive values and the [`FieldType`] bridge from Rust types.

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::types::SemanticType;

/// A single primitive field value.
///
/// Equality is wire equality: floats compare by bit pattern and decimals by
/// their serialized form, so two values are equal exactly when they encode
/// to the same bytes.
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    Char(char),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    Duration(TimeDelta),
    Uuid(Uuid),
    String(String),
    /// Enumeration discriminant.
    Enum(i64),
}

impl Value {
    /// Short name of the value's kind, for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::U8(_) => "u8",
            Self::I8(_) => "i8",
            Self::U16(_) => "u16",
            Self::I16(_) => "i16",
            Self::U32(_) => "u32",
            Self::I32(_) => "i32",
            Self::U64(_) => "u64",
            Self::I64(_) => "i64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Decimal(_) => "decimal",
            Self::Char(_) => "char",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
            Self::Duration(_) => "duration",
            Self::Uuid(_) => "uuid",
            Self::String(_) => "string",
            Self::Enum(_) => "enum",
        }
    }

    /// The value a freshly defaulted member of type `ty` holds, `None` for
    /// nullable and composite types.
    #[must_use]
    pub fn default_for(ty: &SemanticType) -> Option<Self> {
        let value = match ty {
            SemanticType::Bool => Self::Bool(false),
            SemanticType::U8 => Self::U8(0),
            SemanticType::I8 => Self::I8(0),
            SemanticType::U16 => Self::U16(0),
            SemanticType::I16 => Self::I16(0),
            SemanticType::U32 => Self::U32(0),
            SemanticType::I32 => Self::I32(0),
            SemanticType::U64 => Self::U64(0),
            SemanticType::I64 => Self::I64(0),
            SemanticType::F32 => Self::F32(0.0),
            SemanticType::F64 => Self::F64(0.0),
            SemanticType::Decimal => Self::Decimal(Decimal::ZERO),
            SemanticType::Char => Self::Char('\0'),
            SemanticType::Date => Self::Date(NaiveDate::default()),
            SemanticType::DateTime => Self::DateTime(DateTime::default()),
            SemanticType::Duration => Self::Duration(TimeDelta::zero()),
            SemanticType::Uuid => Self::Uuid(Uuid::nil()),
            SemanticType::String => Self::String(String::new()),
            SemanticType::Enum(range) => Self::Enum(range.min),
            SemanticType::Nullable(_) | SemanticType::List(_) | SemanticType::Object => {
                return None
            }
        };
        Some(value)
    }

    /// Returns `true` if this value can be carried by a field of type `ty`.
    ///
    /// `Nullable` is looked through; enum discriminants must lie in range.
    #[must_use]
    pub fn conforms_to(&self, ty: &SemanticType) -> bool {
        match (self, ty.non_null()) {
            (Self::Bool(_), SemanticType::Bool)
            | (Self::U8(_), SemanticType::U8)
            | (Self::I8(_), SemanticType::I8)
            | (Self::U16(_), SemanticType::U16)
            | (Self::I16(_), SemanticType::I16)
            | (Self::U32(_), SemanticType::U32)
            | (Self::I32(_), SemanticType::I32)
            | (Self::U64(_), SemanticType::U64)
            | (Self::I64(_), SemanticType::I64)
            | (Self::F32(_), SemanticType::F32)
            | (Self::F64(_), SemanticType::F64)
            | (Self::Decimal(_), SemanticType::Decimal)
            | (Self::Char(_), SemanticType::Char)
            | (Self::Date(_), SemanticType::Date)
            | (Self::DateTime(_), SemanticType::DateTime)
            | (Self::Duration(_), SemanticType::Duration)
            | (Self::Uuid(_), SemanticType::Uuid)
            | (Self::String(_), SemanticType::String) => true,
            (Self::Enum(v), SemanticType::Enum(range)) => range.contains(*v),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::U8(v) => write!(f, "{v}"),
            Self::I8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::Char(v) => write!(f, "{v:?}"),
            Self::Date(v) => write!(f, "{v}"),
            Self::DateTime(v) => write!(f, "{}", v.to_rfc3339()),
            Self::Duration(v) => write!(f, "{v}"),
            Self::Uuid(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v:?}"),
            Self::Enum(v) => write!(f, "#{v}"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::U8(a), Self::U8(b)) => a == b,
            (Self::I8(a), Self::I8(b)) => a == b,
            (Self::U16(a), Self::U16(b)) => a == b,
            (Self::I16(a), Self::I16(b)) => a == b,
            (Self::U32(a), Self::U32(b)) => a == b,
            (Self::I32(a), Self::I32(b)) => a == b,
            (Self::U64(a), Self::U64(b)) => a == b,
            (Self::I64(a), Self::I64(b)) => a == b,
            (Self::F32(a), Self::F32(b)) => a.to_bits() == b.to_bits(),
            (Self::F64(a), Self::F64(b)) => a.to_bits() == b.to_bits(),
            (Self::Decimal(a), Self::Decimal(b)) => a.serialize() == b.serialize(),
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::Duration(a), Self::Duration(b)) => a == b,
            (Self::Uuid(a), Self::Uuid(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Enum(a), Self::Enum(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Self::Bool(v) => v.hash(state),
            Self::U8(v) => v.hash(state),
            Self::I8(v) => v.hash(state),
            Self::U16(v) => v.hash(state),
            Self::I16(v) => v.hash(state),
            Self::U32(v) => v.hash(state),
            Self::I32(v) => v.hash(state),
            Self::U64(v) => v.hash(state),
            Self::I64(v) | Self::Enum(v) => v.hash(state),
            Self::F32(v) => v.to_bits().hash(state),
            Self::F64(v) => v.to_bits().hash(state),
            Self::Decimal(v) => v.serialize().hash(state),
            Self::Char(v) => v.hash(state),
            Self::Date(v) => v.hash(state),
            Self::DateTime(v) => v.hash(state),
            Self::Duration(v) => v.hash(state),
            Self::Uuid(v) => v.hash(state),
            Self::String(v) => v.hash(state),
        }
    }
}

/// A Rust type that can sit in a primitive schema field.
///
/// `to_value` returns `None` for null. `from_value` returns `None` when the
/// value cannot be represented by `Self`, including null for non-nullable
/// types.
pub trait FieldType: Clone + Send + Sync + 'static {
    /// The semantic type tag used to pick a serializer.
    fn semantic_type() -> SemanticType;

    /// Converts to a wire value.
    fn to_value(&self) -> Option<Value>;

    /// Converts from a wire value.
    fn from_value(value: Option<Value>) -> Option<Self>;
}

macro_rules! impl_field_type {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FieldType for $ty {
                fn semantic_type() -> SemanticType {
                    SemanticType::$variant
                }

                fn to_value(&self) -> Option<Value> {
                    Some(Value::$variant(self.clone()))
                }

                fn from_value(value: Option<Value>) -> Option<Self> {
                    match value {
                        Some(Value::$variant(v)) => Some(v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_field_type! {
    bool => Bool,
    u8 => U8,
    i8 => I8,
    u16 => U16,
    i16 => I16,
    u32 => U32,
    i32 => I32,
    u64 => U64,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    Decimal => Decimal,
    char => Char,
    NaiveDate => Date,
    DateTime<Utc> => DateTime,
    TimeDelta => Duration,
    Uuid => Uuid,
    String => String,
}

impl<P: FieldType> FieldType for Option<P> {
    fn semantic_type() -> SemanticType {
        SemanticType::nullable(P::semantic_type())
    }

    fn to_value(&self) -> Option<Value> {
        self.as_ref().and_then(P::to_value)
    }

    fn from_value(value: Option<Value>) -> Option<Self> {
        match value {
            None => Some(None),
            some => P::from_value(some).map(Some),
        }
    }
}

/// Implements [`FieldType`] for a fieldless enum with explicit discriminants.
///
/// ```
/// #[derive(Clone, Copy, Debug, PartialEq)]
/// enum Side {
///     Buy,
///     Sell,
/// }
///
/// schema::wire_enum!(Side { Buy = 0, Sell = 1 });
///
/// use schema::{EnumRange, FieldType, SemanticType, Value};
/// assert_eq!(Side::semantic_type(), SemanticType::Enum(EnumRange::new(0, 1)));
/// assert_eq!(Side::Sell.to_value(), Some(Value::Enum(1)));
/// assert_eq!(Side::from_value(Some(Value::Enum(0))), Some(Side::Buy));
/// ```
#[macro_export]
macro_rules! wire_enum {
    ($ty:ty { $($variant:ident = $value:expr),+ $(,)? }) => {
        impl $crate::FieldType for $ty {
            fn semantic_type() -> $crate::SemanticType {
                let range = $crate::EnumRange::covering(&[$(($value) as i64),+])
                    .unwrap_or($crate::EnumRange::new(0, 0));
                $crate::SemanticType::Enum(range)
            }

            fn to_value(&self) -> ::core::option::Option<$crate::Value> {
                match self {
                    $(Self::$variant => ::core::option::Option::Some($crate::Value::Enum(($value) as i64)),)+
                }
            }

            fn from_value(
                value: ::core::option::Option<$crate::Value>,
            ) -> ::core::option::Option<Self> {
                match value {
                    $(::core::option::Option::Some($crate::Value::Enum(v)) if v == ($value) as i64 => {
                        ::core::option::Option::Some(Self::$variant)
                    })+
                    _ => ::core::option::Option::None,
                }
            }
        }
    };
}
