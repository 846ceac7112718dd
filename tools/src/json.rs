//! Rendering decoded records.

use std::fmt::Write as _;

use chrono::SecondsFormat;
use codec::{EntityHeader, FieldShape, SemanticType, Value};
use serde::Serialize;
use serde_json::{json, Map, Number};

use crate::record::Record;

/// A decoded message ready for output.
#[derive(Debug, Clone, Serialize)]
pub struct DecodedMessage {
    pub entity_id: u8,
    pub snapshot: bool,
    pub fingerprint: String,
    pub fields: serde_json::Value,
}

impl DecodedMessage {
    pub fn new(
        header: EntityHeader,
        fingerprint: u64,
        shapes: &[FieldShape],
        record: &Record,
    ) -> Self {
        Self {
            entity_id: header.entity_id,
            snapshot: header.snapshot,
            fingerprint: format!("{fingerprint:#018x}"),
            fields: record_json(shapes, record),
        }
    }
}

/// Converts `record` to a JSON object with members in wire order.
pub fn record_json(shapes: &[FieldShape], record: &Record) -> serde_json::Value {
    let mut out = Map::new();
    for shape in shapes {
        out.insert(shape.name.clone(), member_json(shape, record));
    }
    serde_json::Value::Object(out)
}

fn member_json(shape: &FieldShape, record: &Record) -> serde_json::Value {
    let name = &shape.name;
    match shape.ty.non_null() {
        SemanticType::Object => match record.objects.get(name).and_then(Option::as_ref) {
            Some(nested) => record_json(&shape.fields, nested),
            None => serde_json::Value::Null,
        },
        SemanticType::List(element) if **element == SemanticType::Object => {
            match record.object_lists.get(name).and_then(Option::as_ref) {
                Some(list) => list.iter().map(|r| record_json(&shape.fields, r)).collect(),
                None => serde_json::Value::Null,
            }
        }
        SemanticType::List(_) => match record.lists.get(name).and_then(Option::as_ref) {
            Some(list) => list.iter().map(|v| value_json(v.as_ref())).collect(),
            None => serde_json::Value::Null,
        },
        _ => value_json(record.scalars.get(name).and_then(Option::as_ref)),
    }
}

/// Converts one primitive. Values JSON cannot carry exactly are rendered as
/// strings.
pub fn value_json(value: Option<&Value>) -> serde_json::Value {
    let Some(value) = value else {
        return serde_json::Value::Null;
    };
    match value {
        Value::Bool(v) => json!(v),
        Value::U8(v) => json!(v),
        Value::I8(v) => json!(v),
        Value::U16(v) => json!(v),
        Value::I16(v) => json!(v),
        Value::U32(v) => json!(v),
        Value::I32(v) => json!(v),
        Value::U64(v) => json!(v),
        Value::I64(v) => json!(v),
        Value::Enum(v) => json!(v),
        Value::F32(v) => float_json(f64::from(*v)),
        Value::F64(v) => float_json(*v),
        Value::Decimal(v) => json!(v.to_string()),
        Value::Char(v) => json!(v.to_string()),
        Value::Date(v) => json!(v.to_string()),
        Value::DateTime(v) => json!(v.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        Value::Duration(v) => json!(v.to_string()),
        Value::Uuid(v) => json!(v.to_string()),
        Value::String(v) => json!(v),
    }
}

fn float_json(v: f64) -> serde_json::Value {
    Number::from_f64(v).map_or_else(|| json!(v.to_string()), serde_json::Value::Number)
}

/// Human-readable rendering, one member per line.
pub fn format_pretty(message: &DecodedMessage) -> String {
    let kind = if message.snapshot { "snapshot" } else { "delta" };
    let mut out = format!(
        "entity {} {kind} (schema {})\n",
        message.entity_id, message.fingerprint
    );
    write_pretty(&mut out, &message.fields, 1);
    out
}

fn write_pretty(out: &mut String, value: &serde_json::Value, depth: usize) {
    let indent = "  ".repeat(depth);
    match value {
        serde_json::Value::Object(map) => {
            for (name, member) in map {
                match member {
                    serde_json::Value::Object(_) => {
                        let _ = writeln!(out, "{indent}{name}:");
                        write_pretty(out, member, depth + 1);
                    }
                    serde_json::Value::Array(items)
                        if items.iter().any(serde_json::Value::is_object) =>
                    {
                        let _ = writeln!(out, "{indent}{name}: [{}]", items.len());
                        for (index, item) in items.iter().enumerate() {
                            let _ = writeln!(out, "{indent}  [{index}]");
                            write_pretty(out, item, depth + 2);
                        }
                    }
                    other => {
                        let _ = writeln!(out, "{indent}{name}: {other}");
                    }
                }
            }
        }
        other => {
            let _ = writeln!(out, "{indent}{other}");
        }
    }
}
