//! Conversion between [`geo::Geometry`] and packed FlatGeobuf geometry records.

mod bounding_box;
mod geometry_type;
mod pack;
mod record;
mod unpack;

pub use bounding_box::BoundingBox;
pub use geometry_type::GeometryType;
pub use pack::pack_geometry;
pub use record::{GeometryRecord, PackedGeometry};
pub use unpack::{unpack_geometry, unpack_geometry_with_options, UnpackOptions};
