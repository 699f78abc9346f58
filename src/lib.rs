//! Encode and decode [FlatGeobuf](https://flatgeobuf.org/) feature records.
//!
//! This crate covers the two parts of a FlatGeobuf feature that carry real structure:
//!
//! - the typed property blob, built against a column [`Schema`] that can be inferred from a
//!   batch of records with [`infer_schema`], and
//! - the packed geometry: a flat `xy` coordinate buffer plus `ends` and `parts` arrays, converted
//!   to and from [`geo::Geometry`].
//!
//! File framing, the header, and the packed R-tree index are left to the
//! [`flatgeobuf`](https://docs.rs/flatgeobuf) crate. Its geometry tables implement
//! [`GeometryRecord`], and a header's columns convert with [`Schema::from_fgb_columns`].
//!
//! ```
//! use geoarrow_fgb_codec::{decode_properties, encode_properties, infer_schema, Properties};
//!
//! let mut record = Properties::new();
//! record.insert("name".to_string(), "a".into());
//! record.insert("value".to_string(), 10.into());
//!
//! let schema = infer_schema([&record]).unwrap();
//! let blob = encode_properties(&record, &schema);
//! assert_eq!(decode_properties(&blob, &schema), record);
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![cfg_attr(not(test), deny(unused_crate_dependencies))]

pub mod error;
pub mod feature;
pub mod geometry;
pub mod properties;
#[cfg(test)]
pub(crate) mod test;

pub use error::{FgbCodecError, Result};
#[cfg(feature = "rayon")]
pub use feature::encode_features_par;
pub use feature::{
    dataset_envelope, dataset_geometry_type, decode_feature, encode_feature, encode_features,
    EncodedFeature, Feature,
};
pub use geometry::{
    pack_geometry, unpack_geometry, unpack_geometry_with_options, BoundingBox, GeometryRecord,
    GeometryType, PackedGeometry, UnpackOptions,
};
pub use properties::{
    decode_properties, encode_properties, encode_properties_with_options, infer_schema,
    write_properties, Column, ColumnType, ColumnValue, EncodeOptions, MismatchPolicy, Properties,
    Schema, SchemaBuilder, SchemaInferenceOptions,
};
