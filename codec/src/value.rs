//! Primitive payload encoding.

use bitstream::{BitReader, BitWriter};
use chrono::{DateTime, Datelike, NaiveDate, TimeDelta};
use rust_decimal::Decimal;
use schema::{EnumWidth, TypeSerializer, Value, ValueCodec};
use uuid::Uuid;
use wire::{decode_field_header, encode_field_header, FieldHeader};

use crate::error::{CodecError, CodecResult};

/// Largest scale a `rust_decimal` value can carry.
const MAX_DECIMAL_SCALE: u8 = 28;
const NANOS_PER_SEC: u32 = 1_000_000_000;

/// Writes a present field: header, then the payload when non-null.
pub(crate) fn write_field(
    writer: &mut BitWriter<'_>,
    field: &str,
    ser: &TypeSerializer,
    value: Option<&Value>,
) -> CodecResult<()> {
    match value {
        None => {
            if !ser.nullable {
                return Err(CodecError::NullNotAllowed {
                    field: field.to_owned(),
                });
            }
            encode_field_header(writer, FieldHeader::present(true))?;
        }
        Some(value) => {
            encode_field_header(writer, FieldHeader::present(false))?;
            write_value(writer, field, ser, value)?;
        }
    }
    Ok(())
}

/// Reads a field header and payload.
///
/// Returns `None` when the field is missing, `Some(None)` when it is null.
pub(crate) fn read_field(
    reader: &mut BitReader<'_>,
    field: &str,
    ser: &TypeSerializer,
) -> CodecResult<Option<Option<Value>>> {
    let header = decode_field_header(reader)?;
    if header.is_missing {
        return Ok(None);
    }
    if header.is_null {
        if !ser.nullable {
            return Err(CodecError::NullNotAllowed {
                field: field.to_owned(),
            });
        }
        return Ok(Some(None));
    }
    read_value(reader, field, ser).map(|value| Some(Some(value)))
}

/// Writes a non-null payload.
pub(crate) fn write_value(
    writer: &mut BitWriter<'_>,
    field: &str,
    ser: &TypeSerializer,
    value: &Value,
) -> CodecResult<()> {
    if !value.conforms_to(&ser.ty) {
        return Err(CodecError::TypeMismatch {
            field: field.to_owned(),
            expected: ser.ty.non_null().to_string(),
            found: value.kind(),
        });
    }
    match (ser.codec, value) {
        (ValueCodec::Bool, Value::Bool(v)) => writer.write_byte(u8::from(*v))?,
        (ValueCodec::U8, Value::U8(v)) => writer.write_byte(*v)?,
        (ValueCodec::I8, Value::I8(v)) => writer.write_bytes(&v.to_le_bytes())?,
        (ValueCodec::U16, Value::U16(v)) => writer.write_bytes(&v.to_le_bytes())?,
        (ValueCodec::I16, Value::I16(v)) => writer.write_bytes(&v.to_le_bytes())?,
        (ValueCodec::U32, Value::U32(v)) => writer.write_bytes(&v.to_le_bytes())?,
        (ValueCodec::I32, Value::I32(v)) => writer.write_bytes(&v.to_le_bytes())?,
        (ValueCodec::U64, Value::U64(v)) => writer.write_bytes(&v.to_le_bytes())?,
        (ValueCodec::I64, Value::I64(v)) => writer.write_bytes(&v.to_le_bytes())?,
        (ValueCodec::F32, Value::F32(v)) => writer.write_bytes(&v.to_le_bytes())?,
        (ValueCodec::F64, Value::F64(v)) => writer.write_bytes(&v.to_le_bytes())?,
        (ValueCodec::Decimal, Value::Decimal(v)) => writer.write_bytes(&v.serialize())?,
        (ValueCodec::Char, Value::Char(v)) => {
            let byte = u8::try_from(u32::from(*v))
                .map_err(|_| invalid(field, "char outside Latin-1"))?;
            writer.write_byte(byte)?;
        }
        (ValueCodec::Date, Value::Date(v)) => {
            writer.write_bytes(&v.num_days_from_ce().to_le_bytes())?;
        }
        (ValueCodec::DateTime, Value::DateTime(v)) => {
            writer.write_bytes(&v.timestamp().to_le_bytes())?;
            writer.write_bytes(&v.timestamp_subsec_nanos().to_le_bytes())?;
        }
        (ValueCodec::Duration, Value::Duration(v)) => {
            writer.write_bytes(&v.num_seconds().to_le_bytes())?;
            writer.write_bytes(&v.subsec_nanos().to_le_bytes())?;
        }
        (ValueCodec::Uuid, Value::Uuid(v)) => writer.write_bytes(v.as_bytes())?,
        (ValueCodec::String { length_bits }, Value::String(v)) => {
            write_string(writer, length_bits, v)?;
        }
        (ValueCodec::Enum { width, .. }, Value::Enum(v)) => match width {
            EnumWidth::Byte => {
                let byte =
                    u8::try_from(*v).map_err(|_| invalid(field, "enum value out of range"))?;
                writer.write_byte(byte)?;
            }
            EnumWidth::Int => {
                let int =
                    i32::try_from(*v).map_err(|_| invalid(field, "enum value out of range"))?;
                writer.write_bytes(&int.to_le_bytes())?;
            }
        },
        _ => {
            return Err(CodecError::TypeMismatch {
                field: field.to_owned(),
                expected: ser.ty.non_null().to_string(),
                found: value.kind(),
            });
        }
    }
    Ok(())
}

/// Reads a non-null payload.
pub(crate) fn read_value(
    reader: &mut BitReader<'_>,
    field: &str,
    ser: &TypeSerializer,
) -> CodecResult<Value> {
    let value = match ser.codec {
        ValueCodec::Bool => match reader.read_byte()? {
            0 => Value::Bool(false),
            1 => Value::Bool(true),
            _ => return Err(invalid(field, "bool byte is not 0 or 1")),
        },
        ValueCodec::U8 => Value::U8(reader.read_byte()?),
        ValueCodec::I8 => Value::I8(i8::from_le_bytes(reader.read_array()?)),
        ValueCodec::U16 => Value::U16(u16::from_le_bytes(reader.read_array()?)),
        ValueCodec::I16 => Value::I16(i16::from_le_bytes(reader.read_array()?)),
        ValueCodec::U32 => Value::U32(u32::from_le_bytes(reader.read_array()?)),
        ValueCodec::I32 => Value::I32(i32::from_le_bytes(reader.read_array()?)),
        ValueCodec::U64 => Value::U64(u64::from_le_bytes(reader.read_array()?)),
        ValueCodec::I64 => Value::I64(i64::from_le_bytes(reader.read_array()?)),
        ValueCodec::F32 => Value::F32(f32::from_le_bytes(reader.read_array()?)),
        ValueCodec::F64 => Value::F64(f64::from_le_bytes(reader.read_array()?)),
        ValueCodec::Decimal => {
            let bytes: [u8; 16] = reader.read_array()?;
            if bytes[2] > MAX_DECIMAL_SCALE {
                return Err(invalid(field, "decimal scale above 28"));
            }
            Value::Decimal(Decimal::deserialize(bytes))
        }
        ValueCodec::Char => Value::Char(char::from(reader.read_byte()?)),
        ValueCodec::Date => {
            let days = i32::from_le_bytes(reader.read_array()?);
            let date = NaiveDate::from_num_days_from_ce_opt(days)
                .ok_or_else(|| invalid(field, "date out of range"))?;
            Value::Date(date)
        }
        ValueCodec::DateTime => {
            let secs = i64::from_le_bytes(reader.read_array()?);
            let nanos = u32::from_le_bytes(reader.read_array()?);
            let datetime = DateTime::from_timestamp(secs, nanos)
                .ok_or_else(|| invalid(field, "timestamp out of range"))?;
            Value::DateTime(datetime)
        }
        ValueCodec::Duration => {
            let secs = i64::from_le_bytes(reader.read_array()?);
            let nanos = i32::from_le_bytes(reader.read_array()?);
            let duration =
                read_duration(secs, nanos).ok_or_else(|| invalid(field, "duration out of range"))?;
            Value::Duration(duration)
        }
        ValueCodec::Uuid => Value::Uuid(Uuid::from_bytes(reader.read_array()?)),
        ValueCodec::String { length_bits } => {
            Value::String(read_string(reader, field, length_bits)?)
        }
        ValueCodec::Enum { width, range } => {
            let raw = match width {
                EnumWidth::Byte => i64::from(reader.read_byte()?),
                EnumWidth::Int => i64::from(i32::from_le_bytes(reader.read_array()?)),
            };
            if !range.contains(raw) {
                return Err(invalid(field, "enum value out of range"));
            }
            Value::Enum(raw)
        }
    };
    Ok(value)
}

/// Rebuilds a duration from whole seconds and a sub-second part of the same
/// sign, rejecting pairs `TimeDelta` would never produce.
fn read_duration(secs: i64, nanos: i32) -> Option<TimeDelta> {
    let mixed_sign = (secs > 0 && nanos < 0) || (secs < 0 && nanos > 0);
    if nanos.unsigned_abs() >= NANOS_PER_SEC || mixed_sign {
        return None;
    }
    TimeDelta::try_seconds(secs)?.checked_add(&TimeDelta::nanoseconds(i64::from(nanos)))
}

/// Writes a 32-bit little-endian element count.
fn write_count(
    writer: &mut BitWriter<'_>,
    field: &str,
    count: usize,
) -> CodecResult<()> {
    let count = u32::try_from(count).map_err(|_| invalid(field, "list longer than u32::MAX"))?;
    writer.write_bytes(&count.to_le_bytes())?;
    Ok(())
}

/// Reads a 32-bit little-endian element count and checks it against `limit`.
pub(crate) fn read_count(
    reader: &mut BitReader<'_>,
    field: &str,
    limit: usize,
) -> CodecResult<usize> {
    let count = u32::from_le_bytes(reader.read_array()?) as usize;
    if count > limit {
        return Err(CodecError::LimitsExceeded {
            field: field.to_owned(),
            limit,
            actual: count,
        });
    }
    Ok(count)
}

/// Writes the element count of a changed list. The count sits behind its own
/// field header: missing when it equals `previous`, else present with the
/// 32-bit count.
pub(crate) fn write_delta_count(
    writer: &mut BitWriter<'_>,
    field: &str,
    count: usize,
    previous: usize,
) -> CodecResult<()> {
    if count == previous {
        encode_field_header(writer, FieldHeader::missing())?;
        return Ok(());
    }
    encode_field_header(writer, FieldHeader::present(false))?;
    write_count(writer, field, count)
}

/// Reads a delta element count. A missing count keeps `current`.
pub(crate) fn read_delta_count(
    reader: &mut BitReader<'_>,
    field: &str,
    current: usize,
    limit: usize,
) -> CodecResult<usize> {
    let header = decode_field_header(reader)?;
    if header.has_payload() {
        return read_count(reader, field, limit);
    }
    if header.is_null {
        return Err(invalid(field, "list count cannot be null"));
    }
    Ok(current)
}

/// Converts a count to the bookmark patch value that lays it out little-endian.
pub(crate) fn count_patch_value(field: &str, count: usize) -> CodecResult<u64> {
    let count = u32::try_from(count).map_err(|_| invalid(field, "list longer than u32::MAX"))?;
    Ok(u64::from(u32::from_be_bytes(count.to_le_bytes())))
}

fn write_string(writer: &mut BitWriter<'_>, length_bits: u8, value: &str) -> CodecResult<()> {
    let max = max_string_len(length_bits);
    let length = value.len();
    if length > max {
        return Err(CodecError::InvalidStringLength { length, max });
    }
    writer.write_bits(length as u64, length_bits)?;
    writer.write_bytes(value.as_bytes())?;
    Ok(())
}

fn read_string(reader: &mut BitReader<'_>, field: &str, length_bits: u8) -> CodecResult<String> {
    let length = reader.read_bits(length_bits)? as usize;
    let bytes = reader.read_bytes(length)?;
    String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8 {
        field: field.to_owned(),
    })
}

const fn max_string_len(length_bits: u8) -> usize {
    ((1u64 << length_bits) - 1) as usize
}

fn invalid(field: &str, reason: &'static str) -> CodecError {
    CodecError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
}
