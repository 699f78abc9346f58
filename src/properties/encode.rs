//! Encode a property record into the FlatGeobuf property blob.
//!
//! The blob is a sequence of `[u16 column index][value bytes]` entries, all little-endian. Value
//! bytes are laid out according to the declared type of the column:
//!
//! | Column type                  | Value bytes                                    |
//! |------------------------------|------------------------------------------------|
//! | `Bool`, `Byte`, `UByte`      | 1 byte                                         |
//! | `Short`, `UShort`            | 2 bytes                                        |
//! | `Int`, `UInt`, `Float`       | 4 bytes                                        |
//! | `Long`, `ULong`, `Double`    | 8 bytes                                        |
//! | `String`, `DateTime`, `Json` | UTF-8 text followed by a `0x00` terminator     |
//! | `Binary`                     | `u32` byte length followed by the raw bytes    |

use std::borrow::Cow;
use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};
use chrono::SecondsFormat;

use crate::error::{FgbCodecError, Result};
use crate::properties::{Column, ColumnType, ColumnValue, Properties, Schema};

/// What to do with a property that cannot be written against the schema.
///
/// This covers names that are not columns of the schema and values that cannot be converted to
/// the declared type of their column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MismatchPolicy {
    /// Omit the property from the blob.
    #[default]
    Lenient,
    /// Fail with [`FgbCodecError::UnknownColumn`] or [`FgbCodecError::TypeMismatch`].
    Strict,
}

/// Options for the property encoder.
#[derive(Debug, Clone, Default)]
pub struct EncodeOptions {
    pub policy: MismatchPolicy,
}

/// A value converted to the wire representation of its column.
#[derive(Debug)]
enum WireValue<'a> {
    Bool(bool),
    Byte(i8),
    UByte(u8),
    Short(i16),
    UShort(u16),
    Int(i32),
    UInt(u32),
    Long(i64),
    ULong(u64),
    Float(f32),
    Double(f64),
    /// Null-terminated UTF-8 text.
    Text(Cow<'a, str>),
    /// Length-prefixed bytes.
    Bytes(&'a [u8], u32),
}

/// Convert to an unsigned width, keeping the two's complement bits of negative values that fit
/// the signed type of the same width.
macro_rules! to_unsigned {
    ($int:expr, $unsigned:ty, $signed:ty) => {{
        let int = $int;
        <$unsigned>::try_from(int)
            .ok()
            .or_else(|| <$signed>::try_from(int).ok().map(|val| val as $unsigned))
    }};
}

fn rfc3339(value: &chrono::DateTime<chrono::FixedOffset>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

/// Convert `value` to the representation of `column_type`.
///
/// Returns `None` if the value cannot be represented, including integers that are out of range of
/// the column type. Negative integers in an unsigned column are written as their two's complement
/// at the column width, so `-1` in a `UInt` column reads back as `u32::MAX`.
fn to_wire_value(value: &ColumnValue, column_type: ColumnType) -> Option<WireValue<'_>> {
    use ColumnType as T;

    if value.is_null() {
        return None;
    }

    let wire_value = match column_type {
        T::Bool => match value {
            ColumnValue::Bool(val) => WireValue::Bool(*val),
            _ => return None,
        },
        T::Byte => WireValue::Byte(i8::try_from(value.as_integer()?).ok()?),
        T::UByte => WireValue::UByte(to_unsigned!(value.as_integer()?, u8, i8)?),
        T::Short => WireValue::Short(i16::try_from(value.as_integer()?).ok()?),
        T::UShort => WireValue::UShort(to_unsigned!(value.as_integer()?, u16, i16)?),
        T::Int => WireValue::Int(i32::try_from(value.as_integer()?).ok()?),
        T::UInt => WireValue::UInt(to_unsigned!(value.as_integer()?, u32, i32)?),
        T::Long => WireValue::Long(i64::try_from(value.as_integer()?).ok()?),
        T::ULong => WireValue::ULong(to_unsigned!(value.as_integer()?, u64, i64)?),
        T::Float => WireValue::Float(value.as_f64()? as f32),
        T::Double => WireValue::Double(value.as_f64()?),
        T::String => match value {
            ColumnValue::String(val) => WireValue::Text(Cow::Borrowed(val)),
            ColumnValue::DateTime(val) => WireValue::Text(Cow::Owned(rfc3339(val))),
            ColumnValue::Binary(val) => WireValue::Text(String::from_utf8_lossy(val)),
            // Numbers, booleans and structured values promoted into a string column keep their
            // JSON text
            other => WireValue::Text(Cow::Owned(serde_json::to_string(other).ok()?)),
        },
        T::DateTime => match value {
            ColumnValue::DateTime(val) => WireValue::Text(Cow::Owned(rfc3339(val))),
            ColumnValue::String(val) => WireValue::Text(Cow::Borrowed(val)),
            _ => return None,
        },
        T::Json => {
            let text = serde_json::to_string(value).unwrap_or_else(|err| {
                tracing::debug!(%err, "failed to serialize json property, writing empty object");
                "{}".to_string()
            });
            WireValue::Text(Cow::Owned(text))
        }
        T::Binary => {
            let bytes = match value {
                ColumnValue::Binary(val) => val.as_slice(),
                ColumnValue::String(val) => val.as_bytes(),
                _ => return None,
            };
            WireValue::Bytes(bytes, u32::try_from(bytes.len()).ok()?)
        }
    };
    Some(wire_value)
}

fn write_wire_value<W: Write>(writer: &mut W, value: &WireValue) -> std::io::Result<()> {
    match value {
        WireValue::Bool(val) => writer.write_u8(u8::from(*val)),
        WireValue::Byte(val) => writer.write_i8(*val),
        WireValue::UByte(val) => writer.write_u8(*val),
        WireValue::Short(val) => writer.write_i16::<LittleEndian>(*val),
        WireValue::UShort(val) => writer.write_u16::<LittleEndian>(*val),
        WireValue::Int(val) => writer.write_i32::<LittleEndian>(*val),
        WireValue::UInt(val) => writer.write_u32::<LittleEndian>(*val),
        WireValue::Long(val) => writer.write_i64::<LittleEndian>(*val),
        WireValue::ULong(val) => writer.write_u64::<LittleEndian>(*val),
        WireValue::Float(val) => writer.write_f32::<LittleEndian>(*val),
        WireValue::Double(val) => writer.write_f64::<LittleEndian>(*val),
        WireValue::Text(val) => {
            writer.write_all(val.as_bytes())?;
            writer.write_u8(0)
        }
        WireValue::Bytes(val, len) => {
            writer.write_u32::<LittleEndian>(*len)?;
            writer.write_all(val)
        }
    }
}

/// Write the property blob of one record to a writer.
///
/// Entries are written in the iteration order of `properties`. Null values are never written.
/// Properties that do not fit the schema are handled according to [`EncodeOptions::policy`]; a
/// dropped property writes neither its index nor its value.
pub fn write_properties<W: Write>(
    writer: &mut W,
    properties: &Properties,
    schema: &Schema,
    options: &EncodeOptions,
) -> Result<()> {
    for (name, value) in properties {
        if value.is_null() {
            continue;
        }

        let Some(col_idx) = schema.index_of(name) else {
            if options.policy == MismatchPolicy::Strict {
                return Err(FgbCodecError::UnknownColumn(name.clone()));
            }
            tracing::debug!(column = %name, "dropping property not present in schema");
            continue;
        };

        // index_of only returns indices of existing columns
        let Some(Column { column_type, .. }) = schema.column(col_idx.into()) else {
            continue;
        };

        let Some(wire_value) = to_wire_value(value, *column_type) else {
            if options.policy == MismatchPolicy::Strict {
                return Err(FgbCodecError::TypeMismatch {
                    column: name.clone(),
                    expected: *column_type,
                    found: value.kind(),
                });
            }
            tracing::debug!(
                column = %name,
                expected = ?column_type,
                found = value.kind(),
                "dropping property that does not fit its column type"
            );
            continue;
        };

        writer.write_u16::<LittleEndian>(col_idx)?;
        write_wire_value(writer, &wire_value)?;
    }
    Ok(())
}

/// Encode the properties of one record against `schema` with specific options.
pub fn encode_properties_with_options(
    properties: &Properties,
    schema: &Schema,
    options: &EncodeOptions,
) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    write_properties(&mut buf, properties, schema, options)?;
    Ok(buf)
}

/// Encode the properties of one record against `schema`.
///
/// Unknown names and values that do not fit their column are silently dropped. A record with no
/// writable values encodes to an empty blob.
pub fn encode_properties(properties: &Properties, schema: &Schema) -> Vec<u8> {
    // Writing to a Vec cannot fail and the lenient policy never reports mismatches
    encode_properties_with_options(properties, schema, &EncodeOptions::default())
        .unwrap_or_default()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::properties::infer_schema;
    use crate::test::properties::record;
    use serde_json::json;

    fn schema(columns: &[(&str, ColumnType)]) -> Schema {
        Schema::try_new(
            columns
                .iter()
                .map(|(name, column_type)| Column::new(*name, *column_type))
                .collect(),
        )
        .unwrap()
    }

    fn strict() -> EncodeOptions {
        EncodeOptions {
            policy: MismatchPolicy::Strict,
        }
    }

    #[test]
    fn null_record_is_empty() {
        let records = [
            record([("n", "a".into()), ("v", 10.into())]),
            record([("n", "b".into()), ("v", 3.5.into())]),
        ];
        let schema = infer_schema(&records).unwrap();
        let blob = encode_properties(&record([("n", ColumnValue::Null)]), &schema);
        assert!(blob.is_empty());
    }

    #[test]
    fn fixed_width_layout() {
        let schema = schema(&[
            ("b", ColumnType::Bool),
            ("s", ColumnType::Short),
            ("i", ColumnType::Int),
            ("d", ColumnType::Double),
        ]);
        let props = record([
            ("d", 1.0.into()),
            ("b", true.into()),
            ("s", (-2i16).into()),
            ("i", 0x0102_0304.into()),
        ]);
        let blob = encode_properties(&props, &schema);

        let mut expected = vec![3, 0];
        expected.extend_from_slice(&1.0f64.to_le_bytes());
        expected.extend_from_slice(&[0, 0, 1]);
        expected.extend_from_slice(&[1, 0, 0xfe, 0xff]);
        expected.extend_from_slice(&[2, 0, 4, 3, 2, 1]);
        assert_eq!(blob, expected);
    }

    #[test]
    fn variable_width_layout() {
        let schema = schema(&[
            ("s", ColumnType::String),
            ("j", ColumnType::Json),
            ("x", ColumnType::Binary),
        ]);
        let props = record([
            ("s", "ab".into()),
            ("j", ColumnValue::Json(json!({"k": 1}))),
            ("x", vec![9u8, 8].into()),
        ]);
        let blob = encode_properties(&props, &schema);

        let mut expected = vec![0, 0, b'a', b'b', 0];
        expected.extend_from_slice(&[1, 0]);
        expected.extend_from_slice(br#"{"k":1}"#);
        expected.push(0);
        expected.extend_from_slice(&[2, 0, 2, 0, 0, 0, 9, 8]);
        assert_eq!(blob, expected);
    }

    #[test]
    fn trusts_column_type_width() {
        let schema = schema(&[("v", ColumnType::Long), ("f", ColumnType::Float)]);
        let blob = encode_properties(&record([("v", 7u8.into()), ("f", 2.into())]), &schema);

        let mut expected = vec![0, 0];
        expected.extend_from_slice(&7i64.to_le_bytes());
        expected.extend_from_slice(&[1, 0]);
        expected.extend_from_slice(&2.0f32.to_le_bytes());
        assert_eq!(blob, expected);
    }

    #[test]
    fn promoted_string_column_keeps_text() {
        let schema = schema(&[("v", ColumnType::String)]);
        let blob = encode_properties(&record([("v", 10.into())]), &schema);
        assert_eq!(blob, vec![0, 0, b'1', b'0', 0]);
    }

    #[test]
    fn unknown_column_dropped() {
        let schema = schema(&[("a", ColumnType::Int)]);
        let props = record([("zzz", 1.into()), ("a", 1.into())]);
        assert_eq!(encode_properties(&props, &schema), vec![0, 0, 1, 0, 0, 0]);

        let err = encode_properties_with_options(&props, &schema, &strict()).unwrap_err();
        assert!(matches!(err, FgbCodecError::UnknownColumn(name) if name == "zzz"));
    }

    #[test]
    fn out_of_range_dropped() {
        let schema = schema(&[("a", ColumnType::Int), ("b", ColumnType::Short)]);
        let props = record([("a", i64::MAX.into()), ("b", 1.into())]);
        assert_eq!(encode_properties(&props, &schema), vec![1, 0, 1, 0]);

        let err = encode_properties_with_options(&props, &schema, &strict()).unwrap_err();
        assert!(matches!(
            err,
            FgbCodecError::TypeMismatch {
                expected: ColumnType::Int,
                found: "Long",
                ..
            }
        ));
    }

    #[test]
    fn mismatched_type_dropped() {
        let schema = schema(&[("a", ColumnType::Bool), ("b", ColumnType::UByte)]);
        let props = record([("a", "yes".into()), ("b", (-200).into())]);
        assert!(encode_properties(&props, &schema).is_empty());
        assert!(encode_properties_with_options(&props, &schema, &strict()).is_err());
    }

    #[test]
    fn strict_accepts_conforming_record() {
        let schema = schema(&[("a", ColumnType::Double), ("b", ColumnType::Json)]);
        let props = record([("a", 1.into()), ("b", "text".into()), ("c", ColumnValue::Null)]);
        let blob = encode_properties_with_options(&props, &schema, &strict()).unwrap();
        assert_eq!(blob, encode_properties(&props, &schema));
    }

    #[test]
    fn negative_into_unsigned_column() {
        let schema = schema(&[
            ("a", ColumnType::UByte),
            ("b", ColumnType::UInt),
            ("c", ColumnType::ULong),
        ]);
        let props = record([("a", (-1).into()), ("b", (-2).into()), ("c", i64::MIN.into())]);
        let mut expected = vec![0, 0, 0xff, 1, 0];
        expected.extend_from_slice(&(-2i32).to_le_bytes());
        expected.extend_from_slice(&[2, 0]);
        expected.extend_from_slice(&i64::MIN.to_le_bytes());
        assert_eq!(encode_properties(&props, &schema), expected);
        assert!(encode_properties_with_options(&props, &schema, &strict()).is_ok());
    }

    #[test]
    fn binary_into_string_column() {
        let schema = schema(&[("s", ColumnType::String)]);
        let props = record([("s", vec![b'o', b'k', 0xff].into())]);
        let mut expected = vec![0, 0, b'o', b'k'];
        expected.extend_from_slice("\u{FFFD}".as_bytes());
        expected.push(0);
        assert_eq!(encode_properties(&props, &schema), expected);
    }

    #[test]
    fn datetime_as_rfc3339() {
        let schema = schema(&[("t", ColumnType::DateTime)]);
        let dt = chrono::DateTime::parse_from_rfc3339("2024-01-02T03:04:05+01:00").unwrap();
        let blob = encode_properties(&record([("t", dt.into())]), &schema);
        let mut expected = vec![0, 0];
        expected.extend_from_slice(b"2024-01-02T03:04:05+01:00");
        expected.push(0);
        assert_eq!(blob, expected);
    }

    #[test]
    fn writes_into_existing_buffer() {
        let schema = schema(&[("a", ColumnType::UByte)]);
        let mut buf = vec![0xaa];
        write_properties(
            &mut buf,
            &record([("a", 5.into())]),
            &schema,
            &Default::default(),
        )
        .unwrap();
        assert_eq!(buf, vec![0xaa, 0, 0, 5]);
    }
}
