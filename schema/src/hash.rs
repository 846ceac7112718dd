//! Deterministic schema hashing.

use blake3::Hasher;

use crate::shape::FieldShape;
use crate::types::SemanticType;

/// Computes a deterministic fingerprint of a schema's shape.
///
/// Field names, key flags, types and order all contribute. The hash is not
/// written to the wire; peers can compare it out of band.
#[must_use]
pub fn schema_hash(fields: &[FieldShape]) -> u64 {
    let mut hasher = Hasher::new();
    write_fields(&mut hasher, fields);

    let hash = hasher.finalize();
    let mut out = [0u8; 8];
    out.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(out)
}

fn write_fields(hasher: &mut Hasher, fields: &[FieldShape]) {
    write_len(hasher, fields.len());
    for field in fields {
        write_len(hasher, field.name.len());
        hasher.update(field.name.as_bytes());
        write_u8(hasher, u8::from(field.key));
        write_type(hasher, &field.ty);
        write_fields(hasher, &field.fields);
    }
}

fn write_type(hasher: &mut Hasher, ty: &SemanticType) {
    let tag = match ty {
        SemanticType::Bool => 0,
        SemanticType::U8 => 1,
        SemanticType::I8 => 2,
        SemanticType::U16 => 3,
        SemanticType::I16 => 4,
        SemanticType::U32 => 5,
        SemanticType::I32 => 6,
        SemanticType::U64 => 7,
        SemanticType::I64 => 8,
        SemanticType::F32 => 9,
        SemanticType::F64 => 10,
        SemanticType::Decimal => 11,
        SemanticType::Char => 12,
        SemanticType::Date => 13,
        SemanticType::DateTime => 14,
        SemanticType::Duration => 15,
        SemanticType::Uuid => 16,
        SemanticType::String => 17,
        SemanticType::Object => 18,
        SemanticType::Enum(range) => {
            write_u8(hasher, 19);
            write_i64(hasher, range.min);
            write_i64(hasher, range.max);
            return;
        }
        SemanticType::Nullable(inner) => {
            write_u8(hasher, 20);
            write_type(hasher, inner);
            return;
        }
        SemanticType::List(inner) => {
            write_u8(hasher, 21);
            write_type(hasher, inner);
            return;
        }
    };
    write_u8(hasher, tag);
}

fn write_u8(hasher: &mut Hasher, value: u8) {
    hasher.update(&[value]);
}

fn write_len(hasher: &mut Hasher, value: usize) {
    hasher.update(&(value as u64).to_le_bytes());
}

fn write_i64(hasher: &mut Hasher, value: i64) {
    hasher.update(&value.to_le_bytes());
}
