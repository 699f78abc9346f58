//! Defines [`FgbCodecError`], representing all errors returned by this crate.

use thiserror::Error;

use crate::properties::ColumnType;

/// Enum with all errors in this crate.
///
/// Decoding never fails: truncated or malformed input is read up to the first unreadable entry.
/// Errors only come out of schema construction, conversion of FlatGeobuf header types and out of
/// encoding under [`MismatchPolicy::Strict`][crate::MismatchPolicy::Strict].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum FgbCodecError {
    /// A record referenced a property name that is not a column of the schema.
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// A value could not be converted to the declared type of its column.
    #[error("Type mismatch in column '{column}': expected {expected:?}, found {found}")]
    TypeMismatch {
        /// The column name.
        column: String,
        /// The declared type of the column.
        expected: ColumnType,
        /// The kind of value that was supplied.
        found: &'static str,
    },

    /// A FlatGeobuf header declared a column type tag outside the known range.
    #[error("Unknown column type tag: {0}")]
    UnknownColumnType(u8),

    /// A FlatGeobuf geometry type tag outside the known range.
    #[error("Unknown geometry type tag: {0}")]
    UnknownGeometryType(u8),

    /// Whenever a schema has more columns than a `u16` column index can address.
    #[error("Overflow: more than 65536 columns cannot be addressed by a u16 column index")]
    Overflow,

    /// [std::io::Error]
    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, FgbCodecError>;
