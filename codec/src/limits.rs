//! Limits for codec-level encoding and decoding.

/// Default maximum number of elements in one list.
pub const DEFAULT_MAX_LIST_LEN: usize = 65_536;

/// Codec limits applied by a schema and the entity manager.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CodecLimits {
    /// Capacity in bytes of the writer buffers used to produce messages.
    pub buffer_capacity: usize,
    /// Maximum element count accepted for a decoded list.
    pub max_list_len: usize,
}

impl Default for CodecLimits {
    fn default() -> Self {
        Self {
            buffer_capacity: bitstream::DEFAULT_CAPACITY,
            max_list_len: DEFAULT_MAX_LIST_LEN,
        }
    }
}

impl CodecLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            buffer_capacity: 512,
            max_list_len: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_are_reasonable() {
        let limits = CodecLimits::default();
        assert!(limits.buffer_capacity >= 1024);
        assert!(limits.max_list_len >= 1024);
    }

    #[test]
    fn testing_limits_smaller() {
        let test_limits = CodecLimits::for_testing();
        let default_limits = CodecLimits::default();
        assert!(test_limits.buffer_capacity < default_limits.buffer_capacity);
        assert!(test_limits.max_list_len < default_limits.max_list_len);
    }
}
