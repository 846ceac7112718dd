//! Bit-level reader with bounded operations.

use crate::error::{BitError, BitResult};

/// A bit-level reader for decoding packed binary data.
///
/// All read operations are bounds-checked and return errors on failure.
/// A failed read leaves the cursor where it was. The reader never panics on
/// malformed input.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    /// Creates a new `BitReader` over a byte slice.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::InvalidLength`] if `data` is empty.
    pub const fn new(data: &'a [u8]) -> BitResult<Self> {
        if data.is_empty() {
            return Err(BitError::InvalidLength { len: 0 });
        }
        Ok(Self { data, bit_pos: 0 })
    }

    /// Returns the number of bits remaining to read.
    #[must_use]
    pub const fn bits_remaining(&self) -> usize {
        self.data
            .len()
            .saturating_mul(8)
            .saturating_sub(self.bit_pos)
    }

    /// Returns `true` if there are no more bits to read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits_remaining() == 0
    }

    /// Returns the current bit position.
    #[must_use]
    pub const fn bit_position(&self) -> usize {
        self.bit_pos
    }

    /// Reads a single bit as a boolean.
    pub fn read_bit(&mut self) -> BitResult<bool> {
        self.ensure_bits(1)?;
        Ok(self.take_bit())
    }

    /// Reads up to 64 bits as an unsigned integer, most significant first.
    pub fn read_bits(&mut self, bits: u8) -> BitResult<u64> {
        if bits > 64 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 64 });
        }
        if bits == 0 {
            return Ok(0);
        }
        self.ensure_bits(bits as usize)?;
        let mut value = 0u64;
        for _ in 0..bits {
            value = (value << 1) | u64::from(self.take_bit());
        }
        Ok(value)
    }

    /// Reads eight bits, straddling a byte boundary when unaligned.
    pub fn read_byte(&mut self) -> BitResult<u8> {
        self.ensure_bits(8)?;
        Ok(self.take_byte())
    }

    /// Fills `out` with the next `out.len()` bytes.
    pub fn read_into(&mut self, out: &mut [u8]) -> BitResult<()> {
        self.ensure_bits(out.len().saturating_mul(8))?;
        if self.bit_pos % 8 == 0 {
            let start = self.bit_pos / 8;
            out.copy_from_slice(&self.data[start..start + out.len()]);
            self.bit_pos += out.len() * 8;
        } else {
            for slot in out.iter_mut() {
                *slot = self.take_byte();
            }
        }
        Ok(())
    }

    /// Reads the next `len` bytes into a new vector.
    pub fn read_bytes(&mut self, len: usize) -> BitResult<Vec<u8>> {
        self.ensure_bits(len.saturating_mul(8))?;
        let mut out = vec![0u8; len];
        self.read_into(&mut out)?;
        Ok(out)
    }

    /// Reads the next `N` bytes into an array.
    pub fn read_array<const N: usize>(&mut self) -> BitResult<[u8; N]> {
        let mut out = [0u8; N];
        self.read_into(&mut out)?;
        Ok(out)
    }

    fn ensure_bits(&self, bits: usize) -> BitResult<()> {
        let available = self.bits_remaining();
        if bits > available {
            return Err(BitError::InsufficientCapacity {
                requested: bits,
                available,
            });
        }
        Ok(())
    }

    fn take_bit(&mut self) -> bool {
        let byte_idx = self.bit_pos / 8;
        let bit_idx = self.bit_pos % 8;
        let bit = (self.data[byte_idx] >> (7 - bit_idx)) & 1;
        self.bit_pos += 1;
        bit == 1
    }

    fn take_byte(&mut self) -> u8 {
        let idx = self.bit_pos / 8;
        let offset = self.bit_pos % 8;
        let value = if offset == 0 {
            self.data[idx]
        } else {
            (self.data[idx] << offset) | (self.data[idx + 1] >> (8 - offset))
        };
        self.bit_pos += 8;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_invalid() {
        let err = BitReader::new(&[]).unwrap_err();
        assert_eq!(err, BitError::InvalidLength { len: 0 });
    }

    #[test]
    fn fresh_reader_state() {
        let reader = BitReader::new(&[0xAB]).unwrap();
        assert!(!reader.is_empty());
        assert_eq!(reader.bits_remaining(), 8);
        assert_eq!(reader.bit_position(), 0);
    }

    #[test]
    fn read_past_end_fails_without_moving() {
        let mut reader = BitReader::new(&[0xFF]).unwrap();
        reader.read_bits(3).unwrap();
        let err = reader.read_byte().unwrap_err();
        assert_eq!(
            err,
            BitError::InsufficientCapacity {
                requested: 8,
                available: 5
            }
        );
        assert_eq!(reader.bit_position(), 3);
        assert_eq!(reader.read_bits(5).unwrap(), 0b11111);
        assert!(reader.is_empty());
        assert!(reader.read_bit().is_err());
    }

    #[test]
    fn read_bits_across_bytes() {
        let mut reader = BitReader::new(&[0b1111_0000, 0b0000_1111]).unwrap();
        assert_eq!(reader.read_bits(12).unwrap(), 0b1111_0000_0000);
        assert_eq!(reader.bits_remaining(), 4);
    }

    #[test]
    fn read_byte_straddles_boundary() {
        let mut reader = BitReader::new(&[0b1111_1111, 0b1000_0000]).unwrap();
        assert!(reader.read_bit().unwrap());
        assert_eq!(reader.read_byte().unwrap(), 0xFF);
        assert_eq!(reader.bit_position(), 9);
    }

    #[test]
    fn read_bytes_unaligned() {
        let mut reader = BitReader::new(&[0xAB, 0x0C, 0xDE, 0xF0]).unwrap();
        assert_eq!(reader.read_byte().unwrap(), 0xAB);
        assert_eq!(reader.read_bits(4).unwrap(), 0);
        assert_eq!(reader.read_bytes(2).unwrap(), vec![0xCD, 0xEF]);
        assert_eq!(reader.bits_remaining(), 4);
    }

    #[test]
    fn read_array_little_endian_u32() {
        let mut reader = BitReader::new(&[0x78, 0x56, 0x34, 0x12]).unwrap();
        let bytes = reader.read_array::<4>().unwrap();
        assert_eq!(u32::from_le_bytes(bytes), 0x1234_5678);
    }

    #[test]
    fn read_bytes_rejects_oversized_length() {
        let mut reader = BitReader::new(&[0x01, 0x02]).unwrap();
        let err = reader.read_bytes(usize::MAX).unwrap_err();
        assert!(matches!(err, BitError::InsufficientCapacity { .. }));
        assert_eq!(reader.bit_position(), 0);
    }

    #[test]
    fn read_bits_invalid_count() {
        let mut reader = BitReader::new(&[0xFF]).unwrap();
        assert!(matches!(
            reader.read_bits(65),
            Err(BitError::InvalidBitCount { .. })
        ));
    }
}
