//! Typed feature properties: column schema, schema inference, and the property blob codec.

mod column;
mod decode;
mod encode;
mod schema;
mod value;

pub use column::{Column, ColumnType, Schema};
pub use decode::decode_properties;
pub use encode::{
    encode_properties, encode_properties_with_options, write_properties, EncodeOptions,
    MismatchPolicy,
};
pub use schema::{infer_schema, SchemaBuilder, SchemaInferenceOptions};
pub use value::{ColumnValue, Properties};
