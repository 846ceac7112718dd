//! Schema and registry errors.

use std::fmt;

use crate::types::SemanticType;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur when resolving serializers or describing a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// No serializer exists for this semantic type.
    UnsupportedType { ty: SemanticType },

    /// Two fields at the same level share a name.
    DuplicateField { name: String },

    /// A list or object field was marked as a key member.
    CompositeKey { name: String },

    /// String length prefix width outside `1..=32`.
    InvalidStringLengthBits { bits: u8 },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedType { ty } => write!(f, "no serializer for type {ty}"),
            Self::DuplicateField { name } => write!(f, "duplicate field '{name}'"),
            Self::CompositeKey { name } => {
                write!(f, "field '{name}' is a list or object and cannot be a key")
            }
            Self::InvalidStringLengthBits { bits } => {
                write!(f, "string length prefix of {bits} bits, expected 1..=32")
            }
        }
    }
}

impl std::error::Error for SchemaError {}
