//! Features: one geometry plus one property record, encoded together against a dataset schema.

use geo::Geometry;

use crate::error::Result;
use crate::geometry::{
    pack_geometry, unpack_geometry_with_options, BoundingBox, GeometryRecord, GeometryType,
    PackedGeometry, UnpackOptions,
};
use crate::properties::{
    decode_properties, encode_properties_with_options, EncodeOptions, Properties, Schema,
    SchemaBuilder,
};

/// A geometry with its properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feature {
    pub geometry: Option<Geometry>,
    pub properties: Properties,
}

impl Feature {
    pub fn new(geometry: impl Into<Geometry>, properties: Properties) -> Self {
        Self {
            geometry: Some(geometry.into()),
            properties,
        }
    }
}

/// The parts of one FlatGeobuf feature record handed to a file builder.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFeature {
    pub geometry: PackedGeometry,
    pub properties: Vec<u8>,
}

/// Encode one feature against a fixed schema.
///
/// Returns `Ok(None)` if the feature has no geometry or its geometry cannot be packed; such a
/// feature has no record in the output.
pub fn encode_feature(
    feature: &Feature,
    schema: &Schema,
    options: &EncodeOptions,
) -> Result<Option<EncodedFeature>> {
    let Some(geometry) = feature.geometry.as_ref().and_then(pack_geometry) else {
        tracing::debug!("skipping feature without a packable geometry");
        return Ok(None);
    };
    let properties = encode_properties_with_options(&feature.properties, schema, options)?;
    Ok(Some(EncodedFeature {
        geometry,
        properties,
    }))
}

/// Infer a schema from all features and encode each of them against it.
///
/// Properties of every feature contribute to the schema, including features that are skipped
/// for lack of a packable geometry.
pub fn encode_features(
    features: &[Feature],
    options: &EncodeOptions,
) -> Result<(Schema, Vec<EncodedFeature>)> {
    let mut builder = SchemaBuilder::default();
    for feature in features {
        builder.process(&feature.properties);
    }
    let schema = builder.finish()?;

    let mut encoded = Vec::with_capacity(features.len());
    for feature in features {
        if let Some(record) = encode_feature(feature, &schema, options)? {
            encoded.push(record);
        }
    }
    Ok((schema, encoded))
}

/// Encode features against a shared schema on the rayon thread pool.
///
/// The output keeps the input order.
#[cfg(feature = "rayon")]
pub fn encode_features_par(
    features: &[Feature],
    schema: &Schema,
    options: &EncodeOptions,
) -> Result<Vec<EncodedFeature>> {
    use rayon::prelude::*;

    let encoded = features
        .par_iter()
        .map(|feature| encode_feature(feature, schema, options))
        .collect::<Result<Vec<_>>>()?;
    Ok(encoded.into_iter().flatten().collect())
}

/// Decode one feature from its geometry record and property blob.
pub fn decode_feature(
    geometry: &impl GeometryRecord,
    properties: &[u8],
    schema: &Schema,
    options: &UnpackOptions,
) -> Feature {
    Feature {
        geometry: unpack_geometry_with_options(geometry, options),
        properties: decode_properties(properties, schema),
    }
}

/// The geometry type of a dataset, as written to the FlatGeobuf header.
///
/// This is the common type of all geometries, or `Unknown` if they differ or there are none.
pub fn dataset_geometry_type<'a>(
    geometries: impl IntoIterator<Item = &'a Geometry>,
) -> GeometryType {
    let mut types = geometries.into_iter().map(GeometryType::of);
    let Some(first) = types.next() else {
        return GeometryType::Unknown;
    };
    if types.all(|t| t == first) {
        first
    } else {
        GeometryType::Unknown
    }
}

/// The envelope of a dataset, as written to the FlatGeobuf header.
pub fn dataset_envelope<'a>(geometries: impl IntoIterator<Item = &'a Geometry>) -> [f64; 4] {
    BoundingBox::of_geometries(geometries).to_envelope()
}
