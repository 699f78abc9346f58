//! The dynamically typed property value held by a feature record.

use chrono::{DateTime, FixedOffset, SecondsFormat};
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// The properties of one feature, keyed by column name.
///
/// Iteration order is insertion order. This is the order in which entries are written by
/// [`encode_properties`][crate::encode_properties] and the order in which names are first seen by
/// the schema inference.
pub type Properties = IndexMap<String, ColumnValue>;

/// A single property value.
///
/// The integer and float variants mirror the fixed-width FlatGeobuf column types so that a decoded
/// value carries exactly the width of its column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    /// An absent value. Never written to the wire.
    Null,
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
    String(String),
    DateTime(DateTime<FixedOffset>),
    Binary(Vec<u8>),
    /// Arbitrary structured data, typically an object or an array.
    Json(serde_json::Value),
}

impl ColumnValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }

    /// Convert a JSON value the way GeoJSON properties are usually interpreted.
    ///
    /// Scalars map to their natural variant. Integers become `Long` or `ULong` and other numbers
    /// `Double`. Objects and arrays are kept as [`ColumnValue::Json`].
    pub fn from_json(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => ColumnValue::Null,
            Value::Bool(val) => ColumnValue::Bool(val),
            Value::Number(num) => {
                if let Some(val) = num.as_i64() {
                    ColumnValue::Long(val)
                } else if let Some(val) = num.as_u64() {
                    ColumnValue::ULong(val)
                } else {
                    ColumnValue::Double(num.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(val) => ColumnValue::String(val),
            structured @ (Value::Array(_) | Value::Object(_)) => ColumnValue::Json(structured),
        }
    }

    /// A short name of the variant, used in error messages and logs.
    pub fn kind(&self) -> &'static str {
        use ColumnValue::*;
        match self {
            Null => "Null",
            Bool(_) => "Bool",
            Byte(_) => "Byte",
            UByte(_) => "UByte",
            Short(_) => "Short",
            UShort(_) => "UShort",
            Int(_) => "Int",
            UInt(_) => "UInt",
            Long(_) => "Long",
            ULong(_) => "ULong",
            Float(_) => "Float",
            Double(_) => "Double",
            String(_) => "String",
            ColumnValue::DateTime(_) => "DateTime",
            Binary(_) => "Binary",
            Json(_) => "Json",
        }
    }

    /// The exact integral value of a boolean or integer variant.
    pub(crate) fn as_integer(&self) -> Option<i128> {
        use ColumnValue::*;
        match *self {
            Bool(val) => Some(val as i128),
            Byte(val) => Some(val.into()),
            UByte(val) => Some(val.into()),
            Short(val) => Some(val.into()),
            UShort(val) => Some(val.into()),
            Int(val) => Some(val.into()),
            UInt(val) => Some(val.into()),
            Long(val) => Some(val.into()),
            ULong(val) => Some(val.into()),
            _ => None,
        }
    }

    /// The value of any boolean, integer or floating point variant as an `f64`.
    pub(crate) fn as_f64(&self) -> Option<f64> {
        match *self {
            ColumnValue::Float(val) => Some(val.into()),
            ColumnValue::Double(val) => Some(val),
            _ => self.as_integer().map(|val| val as f64),
        }
    }
}

impl Serialize for ColumnValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use ColumnValue::*;
        match self {
            Null => serializer.serialize_unit(),
            Bool(val) => serializer.serialize_bool(*val),
            Byte(val) => serializer.serialize_i8(*val),
            UByte(val) => serializer.serialize_u8(*val),
            Short(val) => serializer.serialize_i16(*val),
            UShort(val) => serializer.serialize_u16(*val),
            Int(val) => serializer.serialize_i32(*val),
            UInt(val) => serializer.serialize_u32(*val),
            Long(val) => serializer.serialize_i64(*val),
            ULong(val) => serializer.serialize_u64(*val),
            Float(val) => serializer.serialize_f32(*val),
            Double(val) => serializer.serialize_f64(*val),
            String(val) => serializer.serialize_str(val),
            ColumnValue::DateTime(val) => {
                serializer.serialize_str(&val.to_rfc3339_opts(SecondsFormat::AutoSi, false))
            }
            Binary(val) => serializer.serialize_bytes(val),
            Json(val) => val.serialize(serializer),
        }
    }
}

macro_rules! impl_from {
    ($from_ty:ty, $variant:expr) => {
        impl From<$from_ty> for ColumnValue {
            fn from(value: $from_ty) -> Self {
                $variant(value)
            }
        }
    };
}

impl_from!(bool, ColumnValue::Bool);
impl_from!(i8, ColumnValue::Byte);
impl_from!(u8, ColumnValue::UByte);
impl_from!(i16, ColumnValue::Short);
impl_from!(u16, ColumnValue::UShort);
impl_from!(i32, ColumnValue::Int);
impl_from!(u32, ColumnValue::UInt);
impl_from!(i64, ColumnValue::Long);
impl_from!(u64, ColumnValue::ULong);
impl_from!(f32, ColumnValue::Float);
impl_from!(f64, ColumnValue::Double);
impl_from!(String, ColumnValue::String);
impl_from!(DateTime<FixedOffset>, ColumnValue::DateTime);
impl_from!(Vec<u8>, ColumnValue::Binary);

impl From<&str> for ColumnValue {
    fn from(value: &str) -> Self {
        ColumnValue::String(value.to_string())
    }
}

impl From<serde_json::Value> for ColumnValue {
    fn from(value: serde_json::Value) -> Self {
        ColumnValue::from_json(value)
    }
}

impl<T: Into<ColumnValue>> From<Option<T>> for ColumnValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ColumnValue::Null, Into::into)
    }
}
