use serde::{Deserialize, Serialize};

/// A GeoJSON position: longitude (`x`) and latitude (`y`) in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f64; 2]> for Point {
    fn from(p: [f64; 2]) -> Self {
        Self::new(p[0], p[1])
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub min: Point,
    pub max: Point,
}

impl BBox {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bbox = Self::new(first, first);
        for p in iter {
            bbox.min.x = bbox.min.x.min(p.x);
            bbox.min.y = bbox.min.y.min(p.y);
            bbox.max.x = bbox.max.x.max(p.x);
            bbox.max.y = bbox.max.y.max(p.y);
        }
        Some(bbox)
    }

    /// Whether the two boxes share any area or edge.
    pub fn intersects(&self, other: &BBox) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
    }
}

/// The shape payload of a feature, in GeoJSON form.
///
/// Polygons are a list of rings; the first ring is the exterior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Point),
    LineString(Vec<Point>),
    Polygon(Vec<Vec<Point>>),
}

impl Geometry {
    /// Whether the payload is drawable: finite coordinates, a line with at
    /// least two positions, a polygon whose every ring has at least three.
    pub fn is_valid(&self) -> bool {
        match self {
            Geometry::Point(p) => p.is_finite(),
            Geometry::LineString(points) => {
                points.len() >= 2 && points.iter().all(Point::is_finite)
            }
            Geometry::Polygon(rings) => {
                !rings.is_empty()
                    && rings
                        .iter()
                        .all(|ring| ring.len() >= 3 && ring.iter().all(Point::is_finite))
            }
        }
    }

    pub fn positions(&self) -> Box<dyn Iterator<Item = &Point> + '_> {
        match self {
            Geometry::Point(p) => Box::new(std::iter::once(p)),
            Geometry::LineString(points) => Box::new(points.iter()),
            Geometry::Polygon(rings) => Box::new(rings.iter().flatten()),
        }
    }

    pub fn bbox(&self) -> Option<BBox> {
        BBox::from_points(self.positions())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geojson_shape() {
        let g = Geometry::LineString(vec![Point::new(1.0, 2.0), Point::new(3.0, 4.0)]);
        let json = serde_json::to_value(&g).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "LineString", "coordinates": [[1.0, 2.0], [3.0, 4.0]]})
        );
        let back: Geometry = serde_json::from_value(json).unwrap();
        assert_eq!(back, g);
    }

    #[test]
    fn test_validity() {
        assert!(Geometry::Point(Point::new(72.8, 19.0)).is_valid());
        assert!(!Geometry::Point(Point::new(f64::NAN, 19.0)).is_valid());
        assert!(!Geometry::LineString(vec![Point::new(0.0, 0.0)]).is_valid());
        assert!(!Geometry::Polygon(vec![]).is_valid());
        assert!(!Geometry::Polygon(vec![vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]]).is_valid());
        assert!(Geometry::Polygon(vec![vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 0.0),
        ]])
        .is_valid());
    }

    #[test]
    fn test_bbox_of_polygon() {
        let g = Geometry::Polygon(vec![vec![
            Point::new(-1.0, 2.0),
            Point::new(3.0, -4.0),
            Point::new(0.5, 0.5),
        ]]);
        let bb = g.bbox().unwrap();
        assert_eq!(bb, BBox::new(Point::new(-1.0, -4.0), Point::new(3.0, 2.0)));
    }

    #[test]
    fn test_bbox_intersects() {
        let a = BBox::new(Point::new(0.0, 0.0), Point::new(2.0, 2.0));
        let touching = BBox::new(Point::new(2.0, 1.0), Point::new(3.0, 3.0));
        let apart = BBox::new(Point::new(2.5, 0.0), Point::new(3.0, 1.0));
        assert!(a.intersects(&touching));
        assert!(touching.intersects(&a));
        assert!(!a.intersects(&apart));
        let line = Geometry::LineString(vec![Point::new(-5.0, 1.0), Point::new(5.0, 1.0)]);
        assert!(line.bbox().unwrap().intersects(&a));
    }
}
