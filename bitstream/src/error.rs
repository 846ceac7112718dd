//! Error types for bitstream operations.

use std::fmt;

/// Result type for bitstream operations.
pub type BitResult<T> = Result<T, BitError>;

/// Errors that can occur during bit-level encoding/decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitError {
    /// A read or write needs more bits than the buffer has left.
    ///
    /// Both counts are in bits. The failing call leaves the cursor untouched.
    InsufficientCapacity {
        /// Number of bits requested.
        requested: usize,
        /// Number of bits available.
        available: usize,
    },

    /// A buffer was constructed over an empty backing array.
    InvalidLength {
        /// The rejected length in bytes.
        len: usize,
    },

    /// Invalid bit count for the operation.
    InvalidBitCount {
        /// The invalid bit count provided.
        bits: u8,
        /// Maximum allowed bits for this operation.
        max_bits: u8,
    },

    /// Value exceeds the range representable by the specified number of bits.
    ValueOutOfRange {
        /// The value that was out of range.
        value: u64,
        /// Number of bits available.
        bits: u8,
    },

    /// A bookmark does not point at a reserved range of this writer.
    InvalidBookmark {
        /// Bit position recorded in the bookmark.
        bit_position: usize,
        /// Reserved width in bits.
        bits: u8,
    },

    /// The thread-scoped scratch buffer is already lent out.
    BufferBusy,
}

impl fmt::Display for BitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientCapacity {
                requested,
                available,
            } => {
                write!(
                    f,
                    "insufficient capacity: {requested} bits requested but only {available} bits available"
                )
            }
            Self::InvalidLength { len } => {
                write!(f, "invalid buffer length {len}, must be positive")
            }
            Self::InvalidBitCount { bits, max_bits } => {
                write!(f, "invalid bit count {bits}, maximum allowed is {max_bits}")
            }
            Self::ValueOutOfRange { value, bits } => {
                write!(f, "value {value} cannot be represented in {bits} bits")
            }
            Self::InvalidBookmark { bit_position, bits } => {
                write!(
                    f,
                    "bookmark at bit {bit_position} ({bits} bits) is outside the written range"
                )
            }
            Self::BufferBusy => {
                write!(f, "thread scratch buffer is already in use on this thread")
            }
        }
    }
}

impl std::error::Error for BitError {}
