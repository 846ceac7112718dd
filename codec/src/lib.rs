//! Schema-driven snapshot and delta encoding for the bitdelta codec.
//!
//! This is the main codec crate that ties together bitstream, wire, and schema:
//!
//! - [`Field`] descriptors name each member of an entity type with a getter pair
//! - [`Schema`] orders them and drives full and delta (de)serialization
//! - [`encode_snapshot`], [`encode_delta`] and [`decode_message`] frame payloads
//!   behind a one-byte entity header
//! - [`EntityManager`] remembers the last state sent per [`EntityKey`] and
//!   produces deltas against it
//!
//! # Example
//!
//! ```
//! use codec::{Field, Schema};
//!
//! #[derive(Debug, Default, Clone, PartialEq)]
//! struct Person {
//!     name: String,
//!     age: u16,
//!     is_programmer: bool,
//! }
//!
//! let schema = Schema::builder()
//!     .field(Field::scalar("Name", |p: &Person| &p.name, |p: &mut Person| &mut p.name))
//!     .field(Field::scalar("Age", |p: &Person| &p.age, |p: &mut Person| &mut p.age))
//!     .field(
//!         Field::scalar(
//!             "IsProgrammer",
//!             |p: &Person| &p.is_programmer,
//!             |p: &mut Person| &mut p.is_programmer,
//!         )
//!         .key(),
//!     )
//!     .build()?;
//!
//! let person = Person { name: "Bryan".into(), age: 49, is_programmer: true };
//! let bytes = schema.to_bytes(&person)?;
//! let mut reader = bitstream::BitReader::new(&bytes)?;
//! assert_eq!(schema.deserialize(&mut reader)?, person);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Design Principles
//!
//! - **Fixed field order** - Keys first, then by name; never transmitted.
//! - **Independent fields** - Each field's header decides its own encoding.
//! - **Keys are immutable** - Deltas never move an entity to another key.

mod access;
mod error;
mod field;
mod item;
mod key;
mod limits;
mod manager;
mod message;
mod tree;
mod value;

pub use error::{CodecError, CodecResult};
pub use field::Field;
pub use key::EntityKey;
pub use limits::{CodecLimits, DEFAULT_MAX_LIST_LEN};
pub use manager::EntityManager;
pub use message::{decode_message, decode_snapshot, encode_delta, encode_snapshot};
pub use tree::{Schema, SchemaBuilder};

pub use schema::{
    wire_enum, EnumRange, FieldShape, FieldType, RegistryConfig, SchemaError, SchemaResult,
    SemanticType, SerializerRegistry, Value,
};
pub use wire::EntityHeader;
