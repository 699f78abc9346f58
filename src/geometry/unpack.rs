use geo::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};

use crate::geometry::{GeometryRecord, GeometryType};

/// Options for unpacking geometry records.
#[derive(Debug, Clone)]
pub struct UnpackOptions {
    /// How many levels of nested parts are followed.
    ///
    /// Parts of a `GeometryCollection` or `MultiPolygon` below this depth are dropped like
    /// unsupported members. This bounds the recursion on malformed or hostile input.
    pub max_depth: usize,
}

impl Default for UnpackOptions {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

fn num_coords(record: &impl GeometryRecord) -> usize {
    record.xy_len() / 2
}

/// Read coordinates `start..end` of the `xy` buffer, clamped to the coordinates that exist.
fn read_coords(record: &impl GeometryRecord, start: usize, end: usize) -> Vec<Coord> {
    let end = end.min(num_coords(record));
    (start.min(end)..end)
        .map(|i| Coord {
            x: record.xy(i * 2),
            y: record.xy(i * 2 + 1),
        })
        .collect()
}

/// Split the `xy` buffer into lines at each of the `ends`.
///
/// Without `ends`, the whole buffer is one line.
fn read_lines(record: &impl GeometryRecord) -> Vec<LineString> {
    if num_coords(record) == 0 {
        return vec![];
    }
    if record.ends_len() == 0 {
        return vec![LineString::new(read_coords(record, 0, num_coords(record)))];
    }

    let mut start = 0;
    (0..record.ends_len())
        .map(|i| {
            let end = record.ends(i) as usize;
            let line = LineString::new(read_coords(record, start, end));
            start = end;
            line
        })
        .collect()
}

fn read_polygon(record: &impl GeometryRecord) -> Option<Polygon> {
    let mut rings = read_lines(record).into_iter();
    let exterior = rings.next()?;
    Some(Polygon::new(exterior, rings.collect()))
}

fn empty_polygon() -> Polygon {
    Polygon::new(LineString::new(vec![]), vec![])
}

fn read_multi_polygon(record: &impl GeometryRecord) -> MultiPolygon {
    if record.parts_len() == 0 {
        // Part-less multi polygons store a single polygon inline
        return MultiPolygon::new(read_polygon(record).into_iter().collect());
    }

    let polygons = (0..record.parts_len())
        .filter_map(|i| record.part(i))
        .filter_map(|part| read_polygon(&part))
        .collect();
    MultiPolygon::new(polygons)
}

fn read_collection(
    record: &impl GeometryRecord,
    options: &UnpackOptions,
    depth: usize,
) -> GeometryCollection {
    if record.parts_len() == 0 {
        let members = read_polygon(record).map(Geometry::Polygon);
        return GeometryCollection(members.into_iter().collect());
    }
    if depth >= options.max_depth {
        tracing::debug!(
            max_depth = options.max_depth,
            "dropping collection members nested beyond the maximum depth"
        );
        return GeometryCollection(vec![]);
    }

    let members = (0..record.parts_len())
        .filter_map(|i| record.part(i))
        .filter_map(|part| unpack_at_depth(&part, options, depth + 1))
        .collect();
    GeometryCollection(members)
}

fn unpack_at_depth(
    record: &impl GeometryRecord,
    options: &UnpackOptions,
    depth: usize,
) -> Option<Geometry> {
    let geometry = match record.geometry_type() {
        GeometryType::Point => {
            let coord = read_coords(record, 0, 1).pop().unwrap_or_default();
            Geometry::Point(Point::from(coord))
        }
        GeometryType::MultiPoint => Geometry::MultiPoint(MultiPoint::new(
            read_coords(record, 0, num_coords(record))
                .into_iter()
                .map(Point::from)
                .collect(),
        )),
        GeometryType::LineString => Geometry::LineString(LineString::new(read_coords(
            record,
            0,
            num_coords(record),
        ))),
        GeometryType::MultiLineString => {
            Geometry::MultiLineString(MultiLineString::new(read_lines(record)))
        }
        GeometryType::Polygon => {
            Geometry::Polygon(read_polygon(record).unwrap_or_else(empty_polygon))
        }
        GeometryType::MultiPolygon => Geometry::MultiPolygon(read_multi_polygon(record)),
        GeometryType::GeometryCollection => {
            Geometry::GeometryCollection(read_collection(record, options, depth))
        }
        other => {
            tracing::debug!(geometry_type = ?other, "cannot unpack geometry type");
            return None;
        }
    };
    Some(geometry)
}

/// Unpack a geometry record with specific options.
pub fn unpack_geometry_with_options(
    record: &impl GeometryRecord,
    options: &UnpackOptions,
) -> Option<Geometry> {
    unpack_at_depth(record, options, 0)
}

/// Unpack a geometry record into a [`Geometry`].
///
/// Records that are too short never fail: missing coordinates are left out, and a `Point` without
/// coordinates is the origin. `Polygon` and `MultiLineString` records without `ends` are read as
/// a single ring or line; `MultiPolygon` and `GeometryCollection` records without `parts` are
/// read as a single polygon.
///
/// Returns `None` for `Unknown` and for curve and surface types.
pub fn unpack_geometry(record: &impl GeometryRecord) -> Option<Geometry> {
    unpack_geometry_with_options(record, &Default::default())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::{pack_geometry, PackedGeometry};
    use crate::test::geometry::{collection, ml1, mp0, mpt0, nested_collection, p_with_hole, rect};
    use geo::{line_string, point, polygon};

    fn round_trip(geometry: Geometry) -> Geometry {
        unpack_geometry(&pack_geometry(&geometry).unwrap()).unwrap()
    }

    #[test]
    fn round_trip_supported_types() {
        let geometries: Vec<Geometry> = vec![
            point!(x: 1., y: 2.).into(),
            mpt0().into(),
            line_string![(x: 0., y: 1.), (x: 2., y: 3.)].into(),
            ml1().into(),
            p_with_hole().into(),
            mp0().into(),
            Geometry::GeometryCollection(collection()),
            nested_collection(5),
        ];
        for geometry in geometries {
            assert_eq!(round_trip(geometry.clone()), geometry);
        }
    }

    #[test]
    fn rect_round_trips_to_polygon() {
        let expected = polygon![
            (x: 0., y: 0.),
            (x: 10., y: 0.),
            (x: 10., y: 10.),
            (x: 0., y: 10.),
            (x: 0., y: 0.),
        ];
        let unpacked = round_trip(rect().into());
        assert_eq!(unpacked, Geometry::Polygon(expected.clone()));
        assert_eq!(expected.exterior().0.len(), 5);
    }

    #[test]
    fn polygon_without_ends() {
        let record = PackedGeometry::new(
            GeometryType::Polygon,
            vec![0., 0., 1., 0., 1., 1., 0., 0.],
            vec![],
        );
        let expected = polygon![(x: 0., y: 0.), (x: 1., y: 0.), (x: 1., y: 1.), (x: 0., y: 0.)];
        assert_eq!(unpack_geometry(&record), Some(expected.into()));
    }

    #[test]
    fn multi_line_string_without_ends() {
        let record =
            PackedGeometry::new(GeometryType::MultiLineString, vec![0., 0., 1., 1.], vec![]);
        let expected = MultiLineString::new(vec![line_string![(x: 0., y: 0.), (x: 1., y: 1.)]]);
        assert_eq!(unpack_geometry(&record), Some(expected.into()));
    }

    #[test]
    fn multi_polygon_without_parts() {
        let mut record = pack_geometry(&p_with_hole().into()).unwrap();
        record.geometry_type = GeometryType::MultiPolygon;
        let expected = MultiPolygon::new(vec![p_with_hole()]);
        assert_eq!(unpack_geometry(&record), Some(expected.into()));

        let empty = PackedGeometry::new(GeometryType::MultiPolygon, vec![], vec![]);
        assert_eq!(
            unpack_geometry(&empty),
            Some(MultiPolygon::new(vec![]).into())
        );
    }

    #[test]
    fn collection_without_parts() {
        let mut record = pack_geometry(&p_with_hole().into()).unwrap();
        record.geometry_type = GeometryType::GeometryCollection;
        let expected = GeometryCollection(vec![p_with_hole().into()]);
        assert_eq!(unpack_geometry(&record), Some(Geometry::GeometryCollection(expected)));
    }

    #[test]
    fn short_buffers_degrade() {
        let point = PackedGeometry::new(GeometryType::Point, vec![1.], vec![]);
        assert_eq!(unpack_geometry(&point), Some(point!(x: 0., y: 0.).into()));

        let line = PackedGeometry::new(GeometryType::LineString, vec![1., 2., 3.], vec![]);
        assert_eq!(
            unpack_geometry(&line),
            Some(line_string![(x: 1., y: 2.)].into())
        );

        let polygon = PackedGeometry::new(GeometryType::Polygon, vec![], vec![3]);
        assert_eq!(unpack_geometry(&polygon), Some(empty_polygon().into()));
    }

    #[test]
    fn ends_past_buffer_are_clamped() {
        let record = PackedGeometry::new(
            GeometryType::MultiLineString,
            vec![0., 0., 1., 1., 2., 2.],
            vec![2, u32::MAX],
        );
        let expected = MultiLineString::new(vec![
            line_string![(x: 0., y: 0.), (x: 1., y: 1.)],
            line_string![(x: 2., y: 2.)],
        ]);
        assert_eq!(unpack_geometry(&record), Some(expected.into()));
    }

    #[test]
    fn unknown_type() {
        let record = PackedGeometry::new(GeometryType::Unknown, vec![0., 0.], vec![]);
        assert!(unpack_geometry(&record).is_none());
        let record = PackedGeometry::new(GeometryType::CircularString, vec![0., 0.], vec![]);
        assert!(unpack_geometry(&record).is_none());
    }

    #[test]
    fn unknown_collection_member_dropped() {
        let record = PackedGeometry::from_parts(
            GeometryType::GeometryCollection,
            vec![
                PackedGeometry::new(GeometryType::Tin, vec![0., 0.], vec![]),
                PackedGeometry::new(GeometryType::Point, vec![4., 5.], vec![]),
            ],
        );
        let expected = GeometryCollection(vec![point!(x: 4., y: 5.).into()]);
        assert_eq!(unpack_geometry(&record), Some(Geometry::GeometryCollection(expected)));
    }

    #[test]
    fn depth_limit() {
        let record = pack_geometry(&nested_collection(4)).unwrap();
        let options = UnpackOptions { max_depth: 2 };
        let unpacked = unpack_geometry_with_options(&record, &options).unwrap();
        assert_eq!(
            unpacked,
            Geometry::GeometryCollection(GeometryCollection(vec![Geometry::GeometryCollection(
                GeometryCollection(vec![Geometry::GeometryCollection(GeometryCollection(
                    vec![]
                ))])
            )]))
        );
    }
}
