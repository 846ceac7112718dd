//! Bit-level writer over a fixed-capacity buffer.

use crate::error::{BitError, BitResult};

/// A reserved, not yet final range of bits inside a [`BitWriter`].
///
/// Obtained from [`BitWriter::reserve`]. Dropping a bookmark commits the
/// reserved bits as zeros; passing it to [`BitWriter::patch`] overwrites them
/// with a value computed after the fact.
#[derive(Debug, PartialEq, Eq)]
pub struct Bookmark {
    bit_position: usize,
    bits: u8,
}

impl Bookmark {
    /// Bit position of the first reserved bit.
    #[must_use]
    pub const fn bit_position(&self) -> usize {
        self.bit_position
    }

    /// Width of the reserved range in bits.
    #[must_use]
    pub const fn bits(&self) -> u8 {
        self.bits
    }
}

/// A bit-level writer for encoding packed binary data.
///
/// The writer never grows: its capacity is the length of the slice it was
/// built over. Bits are packed MSB-first, so the first bit written lands in
/// bit 7 of byte 0. Every write either completes or fails with
/// [`BitError::InsufficientCapacity`] without touching the buffer.
#[derive(Debug)]
pub struct BitWriter<'a> {
    buf: &'a mut [u8],
    bit_pos: usize,
}

impl<'a> BitWriter<'a> {
    /// Creates a writer over `buf`, clearing its contents.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::InvalidLength`] if `buf` is empty.
    pub fn new(buf: &'a mut [u8]) -> BitResult<Self> {
        if buf.is_empty() {
            return Err(BitError::InvalidLength { len: 0 });
        }
        buf.fill(0);
        Ok(Self { buf, bit_pos: 0 })
    }

    /// Returns the capacity in bits.
    #[must_use]
    pub fn capacity_bits(&self) -> usize {
        self.buf.len().saturating_mul(8)
    }

    /// Returns the number of bits written so far.
    #[must_use]
    pub const fn bits_written(&self) -> usize {
        self.bit_pos
    }

    /// Returns the number of bytes touched so far, including a partial last byte.
    #[must_use]
    pub const fn bytes_written(&self) -> usize {
        self.bit_pos.div_ceil(8)
    }

    /// Returns the number of bits that can still be written.
    #[must_use]
    pub fn bits_remaining(&self) -> usize {
        self.capacity_bits().saturating_sub(self.bit_pos)
    }

    /// Writes a single bit.
    pub fn write_bit(&mut self, value: bool) -> BitResult<()> {
        self.ensure_bits(1)?;
        self.put_bit(value);
        Ok(())
    }

    /// Writes the low `bits` bits of `value`, most significant first.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::InvalidBitCount`] if `bits > 64`.
    /// Returns [`BitError::ValueOutOfRange`] if `value` doesn't fit in `bits`.
    pub fn write_bits(&mut self, value: u64, bits: u8) -> BitResult<()> {
        check_width(value, bits)?;
        if bits == 0 {
            return Ok(());
        }
        self.ensure_bits(bits as usize)?;
        self.put_bits(value, bits);
        Ok(())
    }

    /// Writes eight bits, straddling a byte boundary when unaligned.
    pub fn write_byte(&mut self, value: u8) -> BitResult<()> {
        self.ensure_bits(8)?;
        self.put_byte(value);
        Ok(())
    }

    /// Writes every byte of `bytes` in order.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> BitResult<()> {
        self.ensure_bits(bytes.len().saturating_mul(8))?;
        if self.bit_pos % 8 == 0 {
            let start = self.bit_pos / 8;
            self.buf[start..start + bytes.len()].copy_from_slice(bytes);
            self.bit_pos += bytes.len() * 8;
        } else {
            for byte in bytes {
                self.put_byte(*byte);
            }
        }
        Ok(())
    }

    /// Reserves `bits` zeroed bits for a value that is only known later.
    ///
    /// The cursor moves past the reserved range so writing can continue.
    pub fn reserve(&mut self, bits: u8) -> BitResult<Bookmark> {
        if bits == 0 || bits > 64 {
            return Err(BitError::InvalidBitCount { bits, max_bits: 64 });
        }
        self.ensure_bits(bits as usize)?;
        let bookmark = Bookmark {
            bit_position: self.bit_pos,
            bits,
        };
        self.put_bits(0, bits);
        Ok(bookmark)
    }

    /// Overwrites a reserved range with `value` and resumes at the current end.
    pub fn patch(&mut self, bookmark: Bookmark, value: u64) -> BitResult<()> {
        check_width(value, bookmark.bits)?;
        let end = bookmark.bit_position + bookmark.bits as usize;
        if end > self.bit_pos {
            return Err(BitError::InvalidBookmark {
                bit_position: bookmark.bit_position,
                bits: bookmark.bits,
            });
        }
        let resume = self.bit_pos;
        self.bit_pos = bookmark.bit_position;
        self.put_bits(value, bookmark.bits);
        self.bit_pos = resume;
        Ok(())
    }

    /// Returns the bytes written so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.bytes_written()]
    }

    /// Copies the bytes written so far into a new vector.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }

    /// Finishes writing and returns the number of bytes used.
    ///
    /// Unused bits of the last byte are zero.
    #[must_use]
    pub fn finish(self) -> usize {
        self.bytes_written()
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

    fn put_bit(&mut self, value: bool) {
        let idx = self.bit_pos / 8;
        let mask = 1u8 << (7 - self.bit_pos % 8);
        if value {
            self.buf[idx] |= mask;
        } else {
            self.buf[idx] &= !mask;
        }
        self.bit_pos += 1;
    }

    fn put_bits(&mut self, value: u64, bits: u8) {
        for i in (0..bits).rev() {
            self.put_bit((value >> i) & 1 == 1);
        }
    }

    fn put_byte(&mut self, value: u8) {
        let offset = self.bit_pos % 8;
        let idx = self.bit_pos / 8;
        if offset == 0 {
            self.buf[idx] = value;
            self.bit_pos += 8;
        } else {
            self.put_bits(u64::from(value), 8);
        }
    }
}

fn check_width(value: u64, bits: u8) -> BitResult<()> {
    if bits > 64 {
        return Err(BitError::InvalidBitCount { bits, max_bits: 64 });
    }
    if bits < 64 && value >= (1u64 << bits) {
        return Err(BitError::ValueOutOfRange { value, bits });
    }
    Ok(())
}
