use geo::{Coord, Geometry, LineString, Polygon, Rect};

use crate::geometry::{GeometryType, PackedGeometry};

fn push_coords(xy: &mut Vec<f64>, coords: &[Coord]) {
    xy.reserve(coords.len() * 2);
    for coord in coords {
        xy.push(coord.x);
        xy.push(coord.y);
    }
}

/// Pack lines or rings into one `xy` buffer with a running vertex count in `ends`.
///
/// Returns `None` if the total vertex count does not fit in a `u32`.
fn pack_lines<'a>(lines: impl Iterator<Item = &'a LineString>) -> Option<(Vec<f64>, Vec<u32>)> {
    let mut xy = vec![];
    let mut ends = vec![];
    let mut num_coords: u32 = 0;
    for line in lines {
        push_coords(&mut xy, &line.0);
        num_coords = num_coords.checked_add(u32::try_from(line.0.len()).ok()?)?;
        ends.push(num_coords);
    }
    Some((xy, ends))
}

fn pack_polygon(polygon: &Polygon) -> Option<PackedGeometry> {
    let rings = std::iter::once(polygon.exterior()).chain(polygon.interiors());
    let (xy, ends) = pack_lines(rings)?;
    Some(PackedGeometry::new(GeometryType::Polygon, xy, ends))
}

/// The closed ring of a rectangle, counter-clockwise from the lower left corner.
fn rect_to_polygon(rect: &Rect) -> Polygon {
    let (min, max) = (rect.min(), rect.max());
    let exterior = LineString::new(vec![
        Coord { x: min.x, y: min.y },
        Coord { x: max.x, y: min.y },
        Coord { x: max.x, y: max.y },
        Coord { x: min.x, y: max.y },
        Coord { x: min.x, y: min.y },
    ]);
    Polygon::new(exterior, vec![])
}

/// Pack a geometry into its FlatGeobuf geometry record.
///
/// Members of a collection are packed with their own type, and members that cannot be packed are
/// left out. A `Rect` is packed as a `Polygon` with one closed five-point ring.
///
/// Returns `None` for `Line` and `Triangle`, and for geometries with more than `u32::MAX`
/// vertices in a single record.
pub fn pack_geometry(geometry: &Geometry) -> Option<PackedGeometry> {
    let packed = match geometry {
        Geometry::Point(point) => {
            PackedGeometry::new(GeometryType::Point, vec![point.x(), point.y()], vec![])
        }
        Geometry::MultiPoint(multi_point) => {
            let mut xy = Vec::with_capacity(multi_point.0.len() * 2);
            for point in multi_point.iter() {
                xy.push(point.x());
                xy.push(point.y());
            }
            PackedGeometry::new(GeometryType::MultiPoint, xy, vec![])
        }
        Geometry::LineString(line_string) => {
            let mut xy = vec![];
            push_coords(&mut xy, &line_string.0);
            PackedGeometry::new(GeometryType::LineString, xy, vec![])
        }
        Geometry::MultiLineString(multi_line_string) => {
            let (xy, ends) = pack_lines(multi_line_string.iter())?;
            PackedGeometry::new(GeometryType::MultiLineString, xy, ends)
        }
        Geometry::Polygon(polygon) => pack_polygon(polygon)?,
        Geometry::Rect(rect) => pack_polygon(&rect_to_polygon(rect))?,
        Geometry::MultiPolygon(multi_polygon) => {
            let parts = multi_polygon
                .iter()
                .map(pack_polygon)
                .collect::<Option<Vec<_>>>()?;
            PackedGeometry::from_parts(GeometryType::MultiPolygon, parts)
        }
        Geometry::GeometryCollection(collection) => {
            let parts = collection
                .iter()
                .filter_map(|member| {
                    let part = pack_geometry(member);
                    if part.is_none() {
                        tracing::debug!(
                            member_type = ?GeometryType::of(member),
                            "dropping collection member that cannot be packed"
                        );
                    }
                    part
                })
                .collect();
            PackedGeometry::from_parts(GeometryType::GeometryCollection, parts)
        }
        Geometry::Line(_) | Geometry::Triangle(_) => return None,
    };
    Some(packed)
}
