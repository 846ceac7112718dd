//! Buffer factories and the thread-scoped scratch pool.

use std::cell::RefCell;

use crate::error::{BitError, BitResult};
use crate::reader::BitReader;
use crate::writer::BitWriter;

/// Default writer capacity in bytes.
pub const DEFAULT_CAPACITY: usize = 4096;

/// Hands out fixed-capacity writers backed by one reusable scratch array.
///
/// [`make`](Self::make) borrows the factory mutably, so a second writer
/// cannot be created while bytes from the first are still being produced.
#[derive(Debug)]
pub struct BufferWriterFactory {
    scratch: Vec<u8>,
}

impl BufferWriterFactory {
    /// Creates a factory whose writers hold `capacity` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::InvalidLength`] if `capacity` is zero.
    pub fn new(capacity: usize) -> BitResult<Self> {
        if capacity == 0 {
            return Err(BitError::InvalidLength { len: capacity });
        }
        Ok(Self {
            scratch: vec![0u8; capacity],
        })
    }

    /// Returns the writer capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.scratch.len()
    }

    /// Returns a cleared writer over the scratch array.
    pub fn make(&mut self) -> BitResult<BitWriter<'_>> {
        BitWriter::new(&mut self.scratch)
    }
}

impl Default for BufferWriterFactory {
    fn default() -> Self {
        Self {
            scratch: vec![0u8; DEFAULT_CAPACITY],
        }
    }
}

/// Builds readers over received byte sequences.
#[derive(Debug, Default, Clone, Copy)]
pub struct BufferReaderFactory;

impl BufferReaderFactory {
    /// Returns a reader positioned at the first bit of `bytes`.
    pub fn make<'a>(&self, bytes: &'a [u8]) -> BitResult<BitReader<'a>> {
        BitReader::new(bytes)
    }
}

thread_local! {
    static THREAD_SCRATCH: RefCell<Vec<u8>> = const { RefCell::new(Vec::new()) };
}

/// Runs `f` with a writer backed by this thread's scratch array.
///
/// The array grows to `capacity` on first use and is recycled by later calls
/// on the same thread. Calls must not nest: a call made from inside `f` on the
/// same thread fails with [`BitError::BufferBusy`]. Extract the bytes (for
/// example with [`BitWriter::to_vec`]) before `f` returns.
pub fn with_thread_writer<R, E, F>(capacity: usize, f: F) -> Result<R, E>
where
    F: FnOnce(&mut BitWriter<'_>) -> Result<R, E>,
    E: From<BitError>,
{
    THREAD_SCRATCH.with(|slot| {
        let mut scratch = slot.try_borrow_mut().map_err(|_| BitError::BufferBusy)?;
        if scratch.len() < capacity {
            scratch.resize(capacity, 0);
        }
        let mut writer = BitWriter::new(&mut scratch[..capacity])?;
        f(&mut writer)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_rejects_zero_capacity() {
        let err = BufferWriterFactory::new(0).unwrap_err();
        assert_eq!(err, BitError::InvalidLength { len: 0 });
    }

    #[test]
    fn factory_writers_start_clean() {
        let mut factory = BufferWriterFactory::new(4).unwrap();
        {
            let mut writer = factory.make().unwrap();
            writer.write_bytes(&[0xFF, 0xFF, 0xFF]).unwrap();
        }
        let mut writer = factory.make().unwrap();
        writer.write_bit(true).unwrap();
        assert_eq!(writer.to_vec(), vec![0b1000_0000]);
        assert_eq!(writer.capacity_bits(), 32);
    }

    #[test]
    fn default_factory_capacity() {
        let factory = BufferWriterFactory::default();
        assert_eq!(factory.capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn reader_factory_rejects_empty() {
        let factory = BufferReaderFactory;
        assert!(factory.make(&[]).is_err());
        let mut reader = factory.make(&[0x80]).unwrap();
        assert!(reader.read_bit().unwrap());
    }

    #[test]
    fn thread_writer_reuses_slot() {
        let first: Result<Vec<u8>, BitError> = with_thread_writer(8, |writer| {
            writer.write_bytes(&[1, 2, 3])?;
            Ok(writer.to_vec())
        });
        assert_eq!(first.unwrap(), vec![1, 2, 3]);

        let second: Result<Vec<u8>, BitError> = with_thread_writer(8, |writer| {
            writer.write_byte(9)?;
            Ok(writer.to_vec())
        });
        assert_eq!(second.unwrap(), vec![9]);
    }

    #[test]
    fn thread_writer_enforces_capacity() {
        let result: Result<(), BitError> = with_thread_writer(1, |writer| {
            writer.write_bytes(&[1, 2])?;
            Ok(())
        });
        assert!(matches!(
            result,
            Err(BitError::InsufficientCapacity { .. })
        ));
    }

    #[test]
    fn nested_thread_writer_is_busy() {
        let result: Result<Result<(), BitError>, BitError> =
            with_thread_writer(4, |_outer| Ok(with_thread_writer(4, |_inner| Ok(()))));
        assert_eq!(result.unwrap(), Err(BitError::BufferBusy));
    }
}
