use geo::{BoundingRect, Geometry, Rect};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// The box with all bounds at zero, used as the envelope of an empty dataset.
    pub const ZERO: BoundingBox = BoundingBox {
        min_x: 0.,
        min_y: 0.,
        max_x: 0.,
        max_y: 0.,
    };

    /// The bounding box of a geometry's own points, or `None` if it has no points.
    pub fn of(geometry: &Geometry) -> Option<Self> {
        geometry.bounding_rect().map(Self::from)
    }

    /// The combined bounding box of many geometries.
    ///
    /// Geometries without points are skipped. If no geometry has any point, this is
    /// [`BoundingBox::ZERO`].
    pub fn of_geometries<'a>(geometries: impl IntoIterator<Item = &'a Geometry>) -> Self {
        geometries
            .into_iter()
            .filter_map(Self::of)
            .reduce(Self::union)
            .unwrap_or(Self::ZERO)
    }

    /// The component-wise union of two boxes.
    pub fn union(self, other: BoundingBox) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// As a FlatGeobuf header envelope `[min_x, min_y, max_x, max_y]`.
    pub fn to_envelope(&self) -> [f64; 4] {
        [self.min_x, self.min_y, self.max_x, self.max_y]
    }
}

impl From<Rect> for BoundingBox {
    fn from(value: Rect) -> Self {
        Self {
            min_x: value.min().x,
            min_y: value.min().y,
            max_x: value.max().x,
            max_y: value.max().y,
        }
    }
}
