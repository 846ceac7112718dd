//! Semantic types, values and serializers for the bitdelta codec.
//!
//! This crate defines what can sit in a schema field:
//! - [`SemanticType`], the closed set of field type tags
//! - [`Value`], a primitive value with wire-exact equality
//! - [`FieldType`], the bridge from Rust types to values
//! - [`SerializerRegistry`], which resolves a type to its wire codec
//! - [`FieldShape`] and [`schema_hash`] for describing and fingerprinting schemas
//!
//! # Design Principles
//!
//! - **Closed type set** - Anything outside [`SemanticType`] is rejected when a schema is built.
//! - **Immutable registry** - Serializers are resolved once and shared read-only.
//! - **Deterministic hashing** - Equal shapes hash equally across processes.

mod error;
mod hash;
mod registry;
mod shape;
mod types;
mod value;

pub use error::{SchemaError, SchemaResult};
pub use hash::schema_hash;
pub use registry::{
    EnumWidth, RegistryConfig, SerializerRegistry, TypeSerializer, ValueCodec,
    DEFAULT_STRING_LENGTH_BITS, MAX_STRING_LENGTH_BITS,
};
pub use shape::FieldShape;
pub use types::{EnumRange, SemanticType};
pub use value::{FieldType, Value};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_api_exports() {
        let registry = SerializerRegistry::default();
        let ser = registry.make_for::<u16>().unwrap();
        assert_eq!(ser.codec, ValueCodec::U16);
        let _ = schema_hash(&[]);
        let _: SchemaResult<()> = Ok(());
        assert_eq!(DEFAULT_STRING_LENGTH_BITS, 6);
    }

    #[test]
    fn registry_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SerializerRegistry>();
        assert_send_sync::<TypeSerializer>();
        assert_send_sync::<Value>();
    }
}
