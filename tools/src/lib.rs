//! Inspection and decoding tools for bitdelta messages.
//!
//! - [`inspect_message`] reads the entity header and sizes of a message
//! - [`SchemaFile`] builds a [`Record`] schema from JSON field shapes, so
//!   messages can be decoded without the Rust type that produced them
//! - [`decode_message_json`] decodes a message into JSON in wire order

mod inspect;
mod json;
mod record;

use anyhow::{Context, Result};
use codec::Schema;

pub use inspect::{
    collect_message_entries, inspect_message, sort_by_size, InspectReport, MessageEntry,
};
pub use json::{format_pretty, record_json, value_json, DecodedMessage};
pub use record::{Record, SchemaFile};

/// Decodes a snapshot or delta message. A delta is applied to an empty
/// record, so only the members it carries appear. List and object members of
/// a delta are relative to a baseline the tool does not have and only decode
/// faithfully when that baseline was empty.
pub fn decode_message_json(bytes: &[u8], schema: &Schema<Record>) -> Result<DecodedMessage> {
    let mut record = Record::default();
    let header = codec::decode_message(schema, bytes, &mut record).context("decode message")?;
    Ok(DecodedMessage::new(
        header,
        schema.fingerprint(),
        schema.shapes(),
        &record,
    ))
}

/// One line per item in wire order, nested items indented.
pub fn describe_schema(schema: &Schema<Record>) -> String {
    let mut out = format!("fingerprint: {:#018x}\n", schema.fingerprint());
    describe_shapes(&mut out, schema.shapes(), 1);
    out
}

fn describe_shapes(out: &mut String, shapes: &[codec::FieldShape], depth: usize) {
    use std::fmt::Write as _;

    for (index, shape) in shapes.iter().enumerate() {
        let key = if shape.key { " [key]" } else { "" };
        let _ = writeln!(
            out,
            "{}{index}: {} {}{key}",
            "  ".repeat(depth),
            shape.name,
            shape.ty
        );
        describe_shapes(out, &shape.fields, depth + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitstream::BufferWriterFactory;
    use codec::Value;

    const SCHEMA: &str = r#"[
        { "name": "Name", "ty": "string" },
        { "name": "Age", "ty": "u16" },
        { "name": "IsProgrammer", "ty": "bool", "key": true }
    ]"#;

    fn bryan() -> Record {
        let mut record = Record::default();
        record
            .scalars
            .insert("Name".into(), Some(Value::String("Bryan".into())));
        record.scalars.insert("Age".into(), Some(Value::U16(49)));
        record
            .scalars
            .insert("IsProgrammer".into(), Some(Value::Bool(true)));
        record
    }

    #[test]
    fn describe_lists_wire_order() {
        let schema = SchemaFile::parse(SCHEMA).unwrap().build().unwrap();
        let text = describe_schema(&schema);
        let lines: Vec<_> = text.lines().skip(1).collect();
        assert_eq!(
            lines,
            ["  0: IsProgrammer bool [key]", "  1: Age u16", "  2: Name string"]
        );
    }

    #[test]
    fn decode_snapshot_to_json() {
        let schema = SchemaFile::parse(SCHEMA).unwrap().build().unwrap();
        let mut factory = BufferWriterFactory::new(64).unwrap();
        let bytes = codec::encode_snapshot(&schema, 2, &bryan(), &mut factory).unwrap();

        let decoded = decode_message_json(&bytes, &schema).unwrap();
        assert!(decoded.snapshot);
        assert_eq!(decoded.entity_id, 2);
        assert_eq!(
            decoded.fields,
            serde_json::json!({ "IsProgrammer": true, "Age": 49, "Name": "Bryan" })
        );
    }

    #[test]
    fn decode_delta_shows_carried_members() {
        let schema = SchemaFile::parse(SCHEMA).unwrap().build().unwrap();
        let mut factory = BufferWriterFactory::new(64).unwrap();
        let previous = bryan();
        let mut current = previous.clone();
        current.scalars.insert("Age".into(), Some(Value::U16(50)));
        let bytes = codec::encode_delta(&schema, 2, &current, &previous, &mut factory).unwrap();

        let decoded = decode_message_json(&bytes, &schema).unwrap();
        assert!(!decoded.snapshot);
        assert_eq!(
            decoded.fields,
            serde_json::json!({ "IsProgrammer": null, "Age": 50, "Name": null })
        );
    }
}
