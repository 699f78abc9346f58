//! The flat representation of a geometry: a type tag, an interleaved `xy` buffer, `ends`
//! offsets and nested `parts`.

use crate::geometry::GeometryType;

/// Read-only, random-access view of a FlatGeobuf geometry record.
///
/// This mirrors the accessors of a FlatGeobuf reader's geometry table, so that a reader can
/// hand its records to [`unpack_geometry`][crate::unpack_geometry] without copying them into a
/// [`PackedGeometry`] first.
///
/// Callers only invoke [`xy`][Self::xy] and [`ends`][Self::ends] with indices below
/// [`xy_len`][Self::xy_len] and [`ends_len`][Self::ends_len].
pub trait GeometryRecord {
    /// The type of each nested part, which implements [GeometryRecord]
    type Part<'a>: GeometryRecord
    where
        Self: 'a;

    /// The type tag of this record
    fn geometry_type(&self) -> GeometryType;

    /// The number of values in the interleaved `xy` buffer, twice the number of coordinates
    fn xy_len(&self) -> usize;

    /// The value at position `i` of the interleaved `xy` buffer
    fn xy(&self, i: usize) -> f64;

    /// The number of entries in the `ends` array
    fn ends_len(&self) -> usize;

    /// The cumulative vertex count after ring or line `i`
    fn ends(&self, i: usize) -> u32;

    /// The number of nested parts
    fn parts_len(&self) -> usize;

    /// Access to a specified part of this record
    /// Will return None if the provided index is out of bounds
    fn part(&self, i: usize) -> Option<Self::Part<'_>>;
}

/// An owned, packed geometry.
///
/// - `Point`, `MultiPoint`, `LineString`: coordinates in `xy`, no `ends`.
/// - `MultiLineString`, `Polygon`: coordinates of all lines or rings in `xy` and the running
///   vertex count after each one in `ends`.
/// - `MultiPolygon`, `GeometryCollection`: one packed geometry per member in `parts`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackedGeometry {
    pub geometry_type: GeometryType,
    pub xy: Vec<f64>,
    pub ends: Vec<u32>,
    pub parts: Vec<PackedGeometry>,
}

impl PackedGeometry {
    /// Create a packed geometry without parts.
    pub fn new(geometry_type: GeometryType, xy: Vec<f64>, ends: Vec<u32>) -> Self {
        Self {
            geometry_type,
            xy,
            ends,
            parts: vec![],
        }
    }

    /// Create a packed geometry made of parts only.
    pub fn from_parts(geometry_type: GeometryType, parts: Vec<PackedGeometry>) -> Self {
        Self {
            geometry_type,
            parts,
            ..Default::default()
        }
    }

    /// The number of coordinates in `xy`.
    pub fn num_coords(&self) -> usize {
        self.xy.len() / 2
    }
}

impl GeometryRecord for PackedGeometry {
    type Part<'a> = &'a PackedGeometry;

    fn geometry_type(&self) -> GeometryType {
        self.geometry_type
    }

    fn xy_len(&self) -> usize {
        self.xy.len()
    }

    fn xy(&self, i: usize) -> f64 {
        self.xy[i]
    }

    fn ends_len(&self) -> usize {
        self.ends.len()
    }

    fn ends(&self, i: usize) -> u32 {
        self.ends[i]
    }

    fn parts_len(&self) -> usize {
        self.parts.len()
    }

    fn part(&self, i: usize) -> Option<Self::Part<'_>> {
        self.parts.get(i)
    }
}

impl<G: GeometryRecord> GeometryRecord for &G {
    type Part<'a> = G::Part<'a> where Self: 'a;

    fn geometry_type(&self) -> GeometryType {
        (*self).geometry_type()
    }

    fn xy_len(&self) -> usize {
        (*self).xy_len()
    }

    fn xy(&self, i: usize) -> f64 {
        (*self).xy(i)
    }

    fn ends_len(&self) -> usize {
        (*self).ends_len()
    }

    fn ends(&self, i: usize) -> u32 {
        (*self).ends(i)
    }

    fn parts_len(&self) -> usize {
        (*self).parts_len()
    }

    fn part(&self, i: usize) -> Option<Self::Part<'_>> {
        (*self).part(i)
    }
}

/// The geometry table of a FlatGeobuf feature, as parsed by the `flatgeobuf` reader.
///
/// Tags outside the known geometry types read as [`GeometryType::Unknown`]. Missing `xy`, `ends`
/// or `parts` vectors read as empty.
impl<'g> GeometryRecord for flatgeobuf::Geometry<'g> {
    type Part<'a> = flatgeobuf::Geometry<'g> where Self: 'a;

    fn geometry_type(&self) -> GeometryType {
        GeometryType::try_from(self.type_()).unwrap_or_default()
    }

    fn xy_len(&self) -> usize {
        self.xy().map_or(0, |xy| xy.len())
    }

    fn xy(&self, i: usize) -> f64 {
        self.xy().map_or(0., |xy| xy.get(i))
    }

    fn ends_len(&self) -> usize {
        self.ends().map_or(0, |ends| ends.len())
    }

    fn ends(&self, i: usize) -> u32 {
        self.ends().map_or(0, |ends| ends.get(i))
    }

    fn parts_len(&self) -> usize {
        self.parts().map_or(0, |parts| parts.len())
    }

    fn part(&self, i: usize) -> Option<Self::Part<'_>> {
        let parts = self.parts()?;
        (i < parts.len()).then(|| parts.get(i))
    }
}
