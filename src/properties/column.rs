//! Column types and the ordered column schema shared by the encoder and decoder.

use std::collections::HashMap;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};

use crate::error::{FgbCodecError, Result};
use crate::properties::ColumnValue;

/// The type of a property column.
///
/// Discriminants are the values of the FlatGeobuf `ColumnType` enum, so a raw byte read from a
/// header converts with [`ColumnType::try_from`].
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum ColumnType {
    Byte = 0,
    UByte = 1,
    Bool = 2,
    Short = 3,
    UShort = 4,
    Int = 5,
    UInt = 6,
    Long = 7,
    ULong = 8,
    Float = 9,
    Double = 10,
    String = 11,
    Json = 12,
    DateTime = 13,
    Binary = 14,
}

/// Numeric widening order used by [`ColumnType::promote`], narrowest first.
const NUMERIC_LATTICE: [ColumnType; 11] = [
    ColumnType::Bool,
    ColumnType::Byte,
    ColumnType::UByte,
    ColumnType::Short,
    ColumnType::UShort,
    ColumnType::Int,
    ColumnType::UInt,
    ColumnType::Long,
    ColumnType::ULong,
    ColumnType::Float,
    ColumnType::Double,
];

impl ColumnType {
    /// Position in the numeric widening lattice, or `None` for non-numeric types.
    pub fn numeric_rank(&self) -> Option<usize> {
        NUMERIC_LATTICE.iter().position(|t| t == self)
    }

    /// The least general type able to represent values of both `self` and `other`.
    ///
    /// `Json` absorbs everything, then `String`. Two numeric types resolve to the one of higher
    /// rank. Any other combination (for example `Binary` with `Int`) falls back to `Json`.
    pub fn promote(self, other: ColumnType) -> ColumnType {
        if self == other {
            return self;
        }
        if self == ColumnType::Json || other == ColumnType::Json {
            return ColumnType::Json;
        }
        if self == ColumnType::String || other == ColumnType::String {
            return ColumnType::String;
        }
        match (self.numeric_rank(), other.numeric_rank()) {
            (Some(a), Some(b)) => {
                if a > b {
                    self
                } else {
                    other
                }
            }
            _ => ColumnType::Json,
        }
    }

    /// The elementary type of a single value, or `None` for [`ColumnValue::Null`].
    ///
    /// Integers are classified by value rather than width: signed values within `i32` are `Int`,
    /// wider ones `Long`. Unsigned values within `u32` are `UInt`, wider ones `ULong`.
    pub fn of_value(value: &ColumnValue) -> Option<ColumnType> {
        let column_type = match value {
            ColumnValue::Null => return None,
            ColumnValue::Bool(_) => ColumnType::Bool,
            ColumnValue::Byte(_) | ColumnValue::Short(_) | ColumnValue::Int(_) => ColumnType::Int,
            ColumnValue::Long(val) => {
                if i32::try_from(*val).is_ok() {
                    ColumnType::Int
                } else {
                    ColumnType::Long
                }
            }
            ColumnValue::UByte(_) | ColumnValue::UShort(_) | ColumnValue::UInt(_) => {
                ColumnType::UInt
            }
            ColumnValue::ULong(val) => {
                if u32::try_from(*val).is_ok() {
                    ColumnType::UInt
                } else {
                    ColumnType::ULong
                }
            }
            ColumnValue::Float(_) => ColumnType::Float,
            ColumnValue::Double(_) => ColumnType::Double,
            ColumnValue::String(_) => ColumnType::String,
            ColumnValue::DateTime(_) => ColumnType::DateTime,
            ColumnValue::Binary(_) => ColumnType::Binary,
            ColumnValue::Json(_) => ColumnType::Json,
        };
        Some(column_type)
    }

    /// The number of value bytes for fixed-width types, `None` for variable-width ones.
    pub fn fixed_width(&self) -> Option<usize> {
        use ColumnType::*;
        match self {
            Bool | Byte | UByte => Some(1),
            Short | UShort => Some(2),
            Int | UInt | Float => Some(4),
            Long | ULong | Double => Some(8),
            String | Json | DateTime | Binary => None,
        }
    }
}

impl From<ColumnType> for flatgeobuf::ColumnType {
    fn from(value: ColumnType) -> Self {
        flatgeobuf::ColumnType(value.into())
    }
}

impl TryFrom<flatgeobuf::ColumnType> for ColumnType {
    type Error = FgbCodecError;

    fn try_from(value: flatgeobuf::ColumnType) -> Result<Self> {
        ColumnType::try_from(value.0).map_err(|_| FgbCodecError::UnknownColumnType(value.0))
    }
}

/// A named, typed property column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
    pub nullable: bool,
    /// Human readable title. Inferred columns use the column name.
    pub title: Option<String>,
    pub description: Option<String>,
}

impl Column {
    /// Create a new nullable column without title or description.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: true,
            title: None,
            description: None,
        }
    }
}

impl TryFrom<flatgeobuf::Column<'_>> for Column {
    type Error = FgbCodecError;

    fn try_from(value: flatgeobuf::Column<'_>) -> Result<Self> {
        Ok(Self {
            name: value.name().to_string(),
            column_type: value.type_().try_into()?,
            nullable: value.nullable(),
            title: value.title().map(str::to_string),
            description: value.description().map(str::to_string),
        })
    }
}

/// The ordered columns of a dataset.
///
/// The position of a column is its `u16` index on the wire. A schema is fixed once built and is
/// shared read-only by every encode and decode call of the dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    columns: Vec<Column>,
    lookup: HashMap<String, u16>,
}

impl Schema {
    /// Create a schema from ordered columns.
    ///
    /// If two columns share a name, lookups by name resolve to the first one.
    pub fn try_new(columns: Vec<Column>) -> Result<Self> {
        if columns.len() > usize::from(u16::MAX) + 1 {
            return Err(FgbCodecError::Overflow);
        }

        let mut lookup = HashMap::with_capacity(columns.len());
        for (idx, column) in columns.iter().enumerate() {
            // Bounded by the length check above
            let idx = idx as u16;
            lookup.entry(column.name.clone()).or_insert(idx);
        }
        Ok(Self { columns, lookup })
    }

    /// Create a schema from the columns of a FlatGeobuf header.
    ///
    /// ```ignore
    /// let schema = Schema::from_fgb_columns(header.columns().into_iter().flatten())?;
    /// ```
    pub fn from_fgb_columns<'a>(
        columns: impl IntoIterator<Item = flatgeobuf::Column<'a>>,
    ) -> Result<Self> {
        let columns = columns
            .into_iter()
            .map(Column::try_from)
            .collect::<Result<Vec<_>>>()?;
        Self::try_new(columns)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Access the column at a wire index.
    pub fn column(&self, idx: usize) -> Option<&Column> {
        self.columns.get(idx)
    }

    /// The wire index of the column named `name`.
    pub fn index_of(&self, name: &str) -> Option<u16> {
        self.lookup.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
