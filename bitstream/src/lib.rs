//! Bit-addressable buffers for the bitdelta codec.
//!
//! This crate provides [`BitWriter`] and [`BitReader`] for bit-level encoding
//! and decoding over fixed-capacity byte arrays, plus the factories that hand
//! them out.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Fixed capacity** - Writers never grow; overflow is an error, not a reallocation.
//! - **Atomic operations** - A failed read or write leaves the cursor untouched.
//! - **No domain knowledge** - This crate knows nothing about entities, fields, or schemas.
//!
//! # Example
//!
//! ```
//! use bitstream::{BitReader, BufferWriterFactory};
//!
//! let mut factory = BufferWriterFactory::new(16).unwrap();
//! let mut writer = factory.make().unwrap();
//! writer.write_bit(true).unwrap();
//! let count = writer.reserve(8).unwrap();
//! writer.write_bytes(b"hi").unwrap();
//! writer.patch(count, 2).unwrap();
//! let bytes = writer.to_vec();
//!
//! let mut reader = BitReader::new(&bytes).unwrap();
//! assert!(reader.read_bit().unwrap());
//! assert_eq!(reader.read_byte().unwrap(), 2);
//! assert_eq!(reader.read_bytes(2).unwrap(), b"hi".to_vec());
//! ```

mod error;
mod factory;
mod reader;
mod writer;

pub use error::{BitError, BitResult};
pub use factory::{with_thread_writer, BufferReaderFactory, BufferWriterFactory, DEFAULT_CAPACITY};
pub use reader::BitReader;
pub use writer::{BitWriter, Bookmark};
