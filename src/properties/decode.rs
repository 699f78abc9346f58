//! Decode a FlatGeobuf property blob back into a record.
//!
//! Decoding never fails. The blob is read entry by entry and reading stops, keeping everything
//! decoded so far, at the first entry that cannot be read: a truncated column index, an index
//! past the end of the schema, or a value that is cut short.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};
use chrono::DateTime;

use crate::properties::{ColumnType, ColumnValue, Properties, Schema};

/// Read a null-terminated string.
///
/// A string without terminator extends to the end of the buffer. Returns `None` if no bytes are
/// left at all.
fn read_text(reader: &mut Cursor<&[u8]>) -> Option<String> {
    let buf = *reader.get_ref();
    let start = usize::try_from(reader.position()).ok()?;
    let remaining = buf.get(start..)?;
    if remaining.is_empty() {
        return None;
    }

    let (text, consumed) = match remaining.iter().position(|b| *b == 0) {
        Some(len) => (&remaining[..len], len + 1),
        None => {
            tracing::debug!("unterminated string property, reading to end of buffer");
            (remaining, remaining.len())
        }
    };
    reader.set_position((start + consumed) as u64);
    Some(String::from_utf8_lossy(text).into_owned())
}

fn read_binary(reader: &mut Cursor<&[u8]>) -> Option<Vec<u8>> {
    let len = usize::try_from(reader.read_u32::<LittleEndian>().ok()?).ok()?;
    let buf = *reader.get_ref();
    let start = usize::try_from(reader.position()).ok()?;
    let bytes = buf.get(start..start.checked_add(len)?)?;
    reader.set_position((start + len) as u64);
    Some(bytes.to_vec())
}

/// Read one value laid out according to `column_type`.
fn read_value(reader: &mut Cursor<&[u8]>, column_type: ColumnType) -> Option<ColumnValue> {
    use ColumnType as T;

    let value = match column_type {
        T::Bool => ColumnValue::Bool(reader.read_u8().ok()? != 0),
        T::Byte => ColumnValue::Byte(reader.read_i8().ok()?),
        T::UByte => ColumnValue::UByte(reader.read_u8().ok()?),
        T::Short => ColumnValue::Short(reader.read_i16::<LittleEndian>().ok()?),
        T::UShort => ColumnValue::UShort(reader.read_u16::<LittleEndian>().ok()?),
        T::Int => ColumnValue::Int(reader.read_i32::<LittleEndian>().ok()?),
        T::UInt => ColumnValue::UInt(reader.read_u32::<LittleEndian>().ok()?),
        T::Long => ColumnValue::Long(reader.read_i64::<LittleEndian>().ok()?),
        T::ULong => ColumnValue::ULong(reader.read_u64::<LittleEndian>().ok()?),
        T::Float => ColumnValue::Float(reader.read_f32::<LittleEndian>().ok()?),
        T::Double => ColumnValue::Double(reader.read_f64::<LittleEndian>().ok()?),
        T::String => ColumnValue::String(read_text(reader)?),
        T::DateTime => {
            let text = read_text(reader)?;
            match DateTime::parse_from_rfc3339(&text) {
                Ok(val) => ColumnValue::DateTime(val),
                Err(err) => {
                    tracing::debug!(%err, "datetime property is not RFC 3339, keeping text");
                    ColumnValue::String(text)
                }
            }
        }
        T::Json => {
            let text = read_text(reader)?;
            match serde_json::from_str(&text) {
                Ok(val) => ColumnValue::Json(val),
                Err(err) => {
                    tracing::debug!(%err, "json property failed to parse, keeping text");
                    ColumnValue::String(text)
                }
            }
        }
        T::Binary => ColumnValue::Binary(read_binary(reader)?),
    };
    Some(value)
}

/// Decode a property blob against the schema it was written with.
///
/// Each value is keyed by its column name and typed by the declared column type. If the blob
/// holds the same column twice, the later value wins.
pub fn decode_properties(data: &[u8], schema: &Schema) -> Properties {
    let mut properties = Properties::new();
    let mut reader = Cursor::new(data);

    while (reader.position() as usize) < data.len() {
        let Ok(col_idx) = reader.read_u16::<LittleEndian>() else {
            tracing::debug!("truncated column index in property blob");
            break;
        };
        let Some(column) = schema.column(col_idx.into()) else {
            tracing::debug!(col_idx, num_columns = schema.len(), "column index out of range");
            break;
        };
        let Some(value) = read_value(&mut reader, column.column_type) else {
            tracing::debug!(column = %column.name, "truncated property value");
            break;
        };
        properties.insert(column.name.clone(), value);
    }

    properties
}
