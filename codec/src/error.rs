//! Error types for codec operations.

use std::fmt;

use crate::key::EntityKey;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding, decoding or tracking entities.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Bitstream error.
    Bitstream(bitstream::BitError),

    /// Entity or field header error.
    Header(wire::HeaderError),

    /// Schema or registry error.
    Schema(schema::SchemaError),

    /// String byte length does not fit the length prefix.
    InvalidStringLength { length: usize, max: usize },

    /// Decoded string bytes are not UTF-8.
    InvalidUtf8 { field: String },

    /// A key member differs between the two sides of a delta.
    KeyMismatch { field: String },

    /// No snapshot is tracked for this key.
    EntityNotFound { key: EntityKey },

    /// The schema has no key members.
    MissingKeyMembers,

    /// Null written to or read for a non-nullable member.
    NullNotAllowed { field: String },

    /// A value of the wrong kind for the member's type.
    TypeMismatch {
        field: String,
        expected: String,
        found: &'static str,
    },

    /// A value the member's type cannot represent.
    InvalidValue { field: String, reason: &'static str },

    /// A list count above the configured maximum.
    LimitsExceeded {
        field: String,
        limit: usize,
        actual: usize,
    },

    /// A delta message was passed where a snapshot is required.
    ExpectedSnapshot,

    /// Whole unread bytes left after the payload.
    TrailingData { remaining_bits: usize },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bitstream(e) => write!(f, "bitstream error: {e}"),
            Self::Header(e) => write!(f, "header error: {e}"),
            Self::Schema(e) => write!(f, "schema error: {e}"),
            Self::InvalidStringLength { length, max } => {
                write!(f, "string of {length} bytes exceeds prefix maximum {max}")
            }
            Self::InvalidUtf8 { field } => write!(f, "field '{field}' is not valid UTF-8"),
            Self::KeyMismatch { field } => write!(f, "key field '{field}' changed"),
            Self::EntityNotFound { key } => write!(f, "no snapshot tracked for key {key}"),
            Self::MissingKeyMembers => write!(f, "schema has no key members"),
            Self::NullNotAllowed { field } => write!(f, "field '{field}' is not nullable"),
            Self::TypeMismatch {
                field,
                expected,
                found,
            } => {
                write!(f, "field '{field}' expects {expected}, found {found}")
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "invalid value for field '{field}': {reason}")
            }
            Self::LimitsExceeded {
                field,
                limit,
                actual,
            } => {
                write!(f, "list '{field}' limit exceeded: {actual} > {limit}")
            }
            Self::ExpectedSnapshot => write!(f, "expected a snapshot message, found a delta"),
            Self::TrailingData { remaining_bits } => {
                write!(f, "{remaining_bits} bits left after payload")
            }
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bitstream(e) => Some(e),
            Self::Header(e) => Some(e),
            Self::Schema(e) => Some(e),
            _ => None,
        }
    }
}

impl From<bitstream::BitError> for CodecError {
    fn from(err: bitstream::BitError) -> Self {
        Self::Bitstream(err)
    }
}

impl From<wire::HeaderError> for CodecError {
    fn from(err: wire::HeaderError) -> Self {
        Self::Header(err)
    }
}

impl From<schema::SchemaError> for CodecError {
    fn from(err: schema::SchemaError) -> Self {
        Self::Schema(err)
    }
}
