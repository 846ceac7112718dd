//! Error types for header encoding and decoding.

use std::fmt;

/// Result type for header operations.
pub type WireResult<T> = Result<T, HeaderError>;

/// Errors raised while encoding or decoding headers.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HeaderError {
    /// Entity id does not fit in the 4-bit header field.
    EntityIdOutOfRange { id: u8, max: u8 },

    /// A header byte whose id bits could not have come from a valid encode.
    InvalidHeader { byte: u8 },

    /// The underlying buffer rejected the read or write.
    Bitstream(bitstream::BitError),
}

impl fmt::Display for HeaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EntityIdOutOfRange { id, max } => {
                write!(f, "entity id {id} out of range, maximum is {max}")
            }
            Self::InvalidHeader { byte } => {
                write!(f, "invalid entity header byte 0x{byte:02X}")
            }
            Self::Bitstream(e) => write!(f, "bitstream error: {e}"),
        }
    }
}

impl std::error::Error for HeaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Bitstream(e) => Some(e),
            _ => None,
        }
    }
}

impl From<bitstream::BitError> for HeaderError {
    fn from(err: bitstream::BitError) -> Self {
        Self::Bitstream(err)
    }
}
