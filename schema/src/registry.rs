//! Type serializer registry.
//!
//! Maps every supported [`SemanticType`] to a [`TypeSerializer`]: a wire
//! codec plus a nullability flag. The registry is immutable once built and
//! can be shared freely between schemas and threads.
//!
//! Payload widths (multi-byte values little-endian):
//!
//! | type                           | bytes |
//! |--------------------------------|-------|
//! | bool, u8, i8, char             | 1     |
//! | u16, i16                       | 2     |
//! | u32, i32, f32, date            | 4     |
//! | u64, i64, f64, datetime, duration | 8  |
//! | decimal, uuid                  | 16    |
//! | string                         | prefix + UTF-8 bytes |
//! | enum                           | 1 if the range fits `0..=255`, else 4 |

use crate::error::{SchemaError, SchemaResult};
use crate::types::{EnumRange, SemanticType};
use crate::value::FieldType;

/// Default width of the string length prefix, in bits.
pub const DEFAULT_STRING_LENGTH_BITS: u8 = 6;

/// Largest accepted string length prefix, in bits.
pub const MAX_STRING_LENGTH_BITS: u8 = 32;

/// Registry configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RegistryConfig {
    /// Width of the byte-count prefix written before every string.
    pub string_length_bits: u8,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            string_length_bits: DEFAULT_STRING_LENGTH_BITS,
        }
    }
}

impl RegistryConfig {
    /// Config with a 16-bit string prefix.
    #[must_use]
    pub const fn wide_strings() -> Self {
        Self {
            string_length_bits: 16,
        }
    }
}

/// Storage width of an enum discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumWidth {
    /// One unsigned byte.
    Byte,
    /// Four-byte little-endian signed integer.
    Int,
}

impl EnumWidth {
    /// Picks the width for a discriminant range, or `None` if unrepresentable.
    #[must_use]
    pub fn for_range(range: EnumRange) -> Option<Self> {
        if range.min > range.max {
            return None;
        }
        if range.min >= 0 && range.max <= i64::from(u8::MAX) {
            Some(Self::Byte)
        } else if range.min >= i64::from(i32::MIN) && range.max <= i64::from(i32::MAX) {
            Some(Self::Int)
        } else {
            None
        }
    }
}

/// Wire encoding of a non-null primitive payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueCodec {
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
    /// 16-byte `rust_decimal` serialized form.
    Decimal,
    /// One Latin-1 byte.
    Char,
    /// `i32` days since 0001-01-01.
    Date,
    /// `i64` seconds since the Unix epoch (UTC), then `u32` nanoseconds.
    DateTime,
    /// `i64` whole seconds, then `i32` nanoseconds of the same sign.
    Duration,
    Uuid,
    /// Byte-count prefix of `length_bits` bits, then UTF-8 bytes.
    String { length_bits: u8 },
    Enum { width: EnumWidth, range: EnumRange },
}

impl ValueCodec {
    /// Payload size in bytes, or `None` for variable-length codecs.
    #[must_use]
    pub const fn fixed_width(&self) -> Option<usize> {
        let bytes = match self {
            Self::Bool | Self::U8 | Self::I8 | Self::Char => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 | Self::Date => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
            Self::DateTime | Self::Duration => 12,
            Self::Decimal | Self::Uuid => 16,
            Self::Enum { width, .. } => match width {
                EnumWidth::Byte => 1,
                EnumWidth::Int => 4,
            },
            Self::String { .. } => return None,
        };
        Some(bytes)
    }
}

/// A resolved serializer for one primitive semantic type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSerializer {
    /// The type this serializer was resolved for.
    pub ty: SemanticType,
    /// Payload codec.
    pub codec: ValueCodec,
    /// Whether null is an accepted value.
    pub nullable: bool,
}

/// Resolves semantic types to serializers.
#[derive(Debug, Clone, Default)]
pub struct SerializerRegistry {
    config: RegistryConfig,
}

impl SerializerRegistry {
    /// Creates a registry, validating the configuration.
    pub fn new(config: RegistryConfig) -> SchemaResult<Self> {
        let bits = config.string_length_bits;
        if bits == 0 || bits > MAX_STRING_LENGTH_BITS {
            return Err(SchemaError::InvalidStringLengthBits { bits });
        }
        Ok(Self { config })
    }

    /// Returns the registry configuration.
    #[must_use]
    pub const fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Returns `true` if [`make`](Self::make) would succeed for `ty`.
    #[must_use]
    pub fn supports(&self, ty: &SemanticType) -> bool {
        self.make(ty).is_ok()
    }

    /// Resolves the serializer for a semantic type.
    ///
    /// Only primitives and single-level `Nullable` primitives resolve.
    pub fn make(&self, ty: &SemanticType) -> SchemaResult<TypeSerializer> {
        let (inner, nullable) = match ty {
            SemanticType::Nullable(inner) => (inner.as_ref(), true),
            other => (other, false),
        };
        let codec = self.codec_for(inner).ok_or_else(|| SchemaError::UnsupportedType {
            ty: ty.clone(),
        })?;
        Ok(TypeSerializer {
            ty: ty.clone(),
            codec,
            nullable,
        })
    }

    /// Resolves the serializer for a Rust field type.
    pub fn make_for<P: FieldType>(&self) -> SchemaResult<TypeSerializer> {
        self.make(&P::semantic_type())
    }

    fn codec_for(&self, ty: &SemanticType) -> Option<ValueCodec> {
        let codec = match ty {
            SemanticType::Bool => ValueCodec::Bool,
            SemanticType::U8 => ValueCodec::U8,
            SemanticType::I8 => ValueCodec::I8,
            SemanticType::U16 => ValueCodec::U16,
            SemanticType::I16 => ValueCodec::I16,
            SemanticType::U32 => ValueCodec::U32,
            SemanticType::I32 => ValueCodec::I32,
            SemanticType::U64 => ValueCodec::U64,
            SemanticType::I64 => ValueCodec::I64,
            SemanticType::F32 => ValueCodec::F32,
            SemanticType::F64 => ValueCodec::F64,
            SemanticType::Decimal => ValueCodec::Decimal,
            SemanticType::Char => ValueCodec::Char,
            SemanticType::Date => ValueCodec::Date,
            SemanticType::DateTime => ValueCodec::DateTime,
            SemanticType::Duration => ValueCodec::Duration,
            SemanticType::Uuid => ValueCodec::Uuid,
            SemanticType::String => ValueCodec::String {
                length_bits: self.config.string_length_bits,
            },
            SemanticType::Enum(range) => ValueCodec::Enum {
                width: EnumWidth::for_range(*range)?,
                range: *range,
            },
            SemanticType::Nullable(_) | SemanticType::List(_) | SemanticType::Object => {
                return None
            }
        };
        Some(codec)
    }
}
