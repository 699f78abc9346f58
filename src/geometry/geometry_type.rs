use geo::Geometry;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::error::FgbCodecError;

/// The geometry type tag of a FlatGeobuf geometry record.
///
/// Discriminants are the values of the FlatGeobuf `GeometryType` enum. Only the types up to
/// `GeometryCollection` can be packed and unpacked; the curve and surface types exist so that a
/// raw tag read from a file converts losslessly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum GeometryType {
    #[default]
    Unknown = 0,
    Point = 1,
    LineString = 2,
    Polygon = 3,
    MultiPoint = 4,
    MultiLineString = 5,
    MultiPolygon = 6,
    GeometryCollection = 7,
    CircularString = 8,
    CompoundCurve = 9,
    CurvePolygon = 10,
    MultiCurve = 11,
    MultiSurface = 12,
    Curve = 13,
    Surface = 14,
    PolyhedralSurface = 15,
    Tin = 16,
    Triangle = 17,
}

impl GeometryType {
    /// The type tag a geometry is packed with.
    ///
    /// A `Rect` is packed as a `Polygon`. `Line` and `Triangle` cannot be packed and map to
    /// `Unknown`.
    pub fn of(geometry: &Geometry) -> GeometryType {
        match geometry {
            Geometry::Point(_) => GeometryType::Point,
            Geometry::MultiPoint(_) => GeometryType::MultiPoint,
            Geometry::LineString(_) => GeometryType::LineString,
            Geometry::MultiLineString(_) => GeometryType::MultiLineString,
            Geometry::Polygon(_) | Geometry::Rect(_) => GeometryType::Polygon,
            Geometry::MultiPolygon(_) => GeometryType::MultiPolygon,
            Geometry::GeometryCollection(_) => GeometryType::GeometryCollection,
            Geometry::Line(_) | Geometry::Triangle(_) => GeometryType::Unknown,
        }
    }
}

impl From<GeometryType> for flatgeobuf::GeometryType {
    fn from(value: GeometryType) -> Self {
        flatgeobuf::GeometryType(value.into())
    }
}

impl TryFrom<flatgeobuf::GeometryType> for GeometryType {
    type Error = FgbCodecError;

    fn try_from(value: flatgeobuf::GeometryType) -> Result<Self, Self::Error> {
        GeometryType::try_from(value.0).map_err(|_| FgbCodecError::UnknownGeometryType(value.0))
    }
}
