use anyhow::{Result, bail};

use crate::geometry::Transformation;
use crate::geometry::geo_traits::{CollidesWith, Shape, Transformable};
use crate::geometry::primitives::{Edge, Point, Rect, SPolygon};
use crate::util::InvalidGeometry;

/// Polygon with a single outer boundary and zero or more holes.
#[derive(Clone, Debug)]
pub struct NSPolygon {
    pub outer: SPolygon,
    pub holes: Vec<SPolygon>,
}

impl NSPolygon {
    pub fn new(outer: SPolygon, holes: Vec<SPolygon>) -> Result<Self> {
        for (i, hole) in holes.iter().enumerate() {
            let inside = hole.vertices.iter().all(|v| outer.strictly_contains(v));
            let crossing = hole
                .edge_iter()
                .any(|he| outer.edge_iter().any(|oe| he.collides_with(&oe)));
            if !inside || crossing {
                bail!(InvalidGeometry::HoleOutsideContour(i));
            }
        }
        Ok(Self { outer, holes })
    }

    pub fn from_points(contour: Vec<Point>, holes: Vec<Vec<Point>>) -> Result<Self> {
        let outer = SPolygon::new(contour)?;
        let holes = holes
            .into_iter()
            .map(SPolygon::new)
            .collect::<Result<Vec<_>>>()?;
        NSPolygon::new(outer, holes)
    }

    /// Iterates over the outer boundary followed by the holes
    pub fn rings(&self) -> impl Iterator<Item = &SPolygon> {
        std::iter::once(&self.outer).chain(self.holes.iter())
    }

    pub fn edge_iter(&self) -> impl Iterator<Item = Edge> + '_ {
        self.rings().flat_map(|r| r.edge_iter())
    }

    pub fn vertex_iter(&self) -> impl Iterator<Item = &Point> + '_ {
        self.rings().flat_map(|r| r.vertices.iter())
    }

    /// True if `point` lies in the material of the polygon, away from every boundary
    pub fn strictly_contains(&self, point: &Point) -> bool {
        self.outer.strictly_contains(point) && !self.holes.iter().any(|h| h.collides_with(point))
    }

    pub fn convex_hull(&self) -> Vec<Point> {
        self.outer.convex_hull()
    }
}

impl CollidesWith<Point> for NSPolygon {
    fn collides_with(&self, point: &Point) -> bool {
        self.outer.collides_with(point) && !self.holes.iter().any(|h| h.strictly_contains(point))
    }
}

impl Shape for NSPolygon {
    fn centroid(&self) -> Point {
        let (mut c_x, mut c_y) = (0.0, 0.0);
        for (ring, sign) in self.rings().zip(std::iter::once(1.0).chain(std::iter::repeat(-1.0))) {
            let Point(x, y) = ring.centroid();
            c_x += sign * x * ring.area;
            c_y += sign * y * ring.area;
        }
        Point(c_x / self.area(), c_y / self.area())
    }

    fn area(&self) -> f64 {
        self.outer.area - self.holes.iter().map(|h| h.area).sum::<f64>()
    }

    fn bbox(&self) -> Rect {
        self.outer.bbox
    }
}

impl Transformable for NSPolygon {
    fn transform(&mut self, t: &Transformation) -> &mut Self {
        self.outer.transform(t);
        self.holes.iter_mut().for_each(|h| {
            h.transform(t);
        });
        self
    }
}

impl From<SPolygon> for NSPolygon {
    fn from(outer: SPolygon) -> Self {
        NSPolygon {
            outer,
            holes: vec![],
        }
    }
}
