use anyhow::{Result, bail};
use itertools::Itertools;

use crate::geometry::Transformation;
use crate::geometry::convex_hull::{convex_hull_from_points, is_convex};
use crate::geometry::geo_traits::{CollidesWith, DistanceTo, Shape, Transformable};
use crate::geometry::primitives::{Edge, Point, Rect, cross};
use crate::util::{GEOM_EPS, InvalidGeometry};

/// A Simple Polygon is a polygon that does not intersect itself and contains no holes.
/// Vertices are always stored counterclockwise.
/// [read more](https://en.wikipedia.org/wiki/Simple_polygon)
#[derive(Clone, Debug)]
pub struct SPolygon {
    /// Set of points that form the polygon
    pub vertices: Vec<Point>,
    /// Bounding box
    pub bbox: Rect,
    /// Area of its interior
    pub area: f64,
}

impl SPolygon {
    /// Creates a new simple polygon, fails with [`InvalidGeometry`] on degenerate or self-intersecting input.
    pub fn new(mut points: Vec<Point>) -> Result<Self> {
        if points.len() < 3 {
            bail!(InvalidGeometry::TooFewVertices(points.len()));
        }
        if !points.iter().all(|p| p.is_finite()) {
            bail!(InvalidGeometry::NonFinite);
        }
        if let Some(p) = points.iter().duplicates().next() {
            bail!(InvalidGeometry::DuplicateVertex(p.0, p.1));
        }

        let bbox = Rect::from_points(&points).ok_or(InvalidGeometry::TooFewVertices(0))?;
        let area = match SPolygon::calculate_area(&points) {
            a if a.abs() <= f64::EPSILON * bbox.area().max(1.0) => bail!(InvalidGeometry::ZeroArea),
            a if a < 0.0 => {
                //edges should always be ordered counterclockwise (positive area)
                points.reverse();
                -a
            }
            a => a,
        };

        if let Some((i, j)) = find_self_intersection(&points) {
            bail!(InvalidGeometry::SelfIntersecting(i, j));
        }

        Ok(SPolygon {
            vertices: points,
            bbox,
            area,
        })
    }

    pub fn vertex(&self, i: usize) -> Point {
        self.vertices[i]
    }

    pub fn edge(&self, i: usize) -> Edge {
        let j = (i + 1) % self.n_vertices();
        //consecutive vertices are distinct by construction
        Edge {
            start: self.vertices[i],
            end: self.vertices[j],
        }
    }

    pub fn edge_iter(&self) -> impl Iterator<Item = Edge> + '_ {
        (0..self.n_vertices()).map(move |i| self.edge(i))
    }

    pub fn n_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_convex(&self) -> bool {
        is_convex(&self.vertices)
    }

    pub fn convex_hull(&self) -> Vec<Point> {
        convex_hull_from_points(self.vertices.clone())
    }

    //https://en.wikipedia.org/wiki/Shoelace_formula
    //counterclockwise = positive area, clockwise = negative area
    pub fn calculate_area(points: &[Point]) -> f64 {
        let mut sigma = 0.0;
        for i in 0..points.len() {
            let j = (i + 1) % points.len();
            let (x_i, y_i) = points[i].into();
            let (x_j, y_j) = points[j].into();
            sigma += (y_i + y_j) * (x_i - x_j)
        }
        0.5 * sigma
    }

    /// Ray casting test, result is unspecified for points exactly on the boundary
    pub fn ray_cast(&self, point: &Point) -> bool {
        let Point(x, y) = *point;
        let mut inside = false;
        let n = self.n_vertices();
        let mut j = n - 1;
        for i in 0..n {
            let Point(xi, yi) = self.vertices[i];
            let Point(xj, yj) = self.vertices[j];
            if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }
        inside
    }

    pub fn distance_to_boundary(&self, point: &Point) -> f64 {
        self.edge_iter()
            .map(|e| e.sq_distance_to(point))
            .fold(f64::MAX, f64::min)
            .sqrt()
    }

    /// True if `point` lies in the interior, further than [`GEOM_EPS`] from the boundary
    pub fn strictly_contains(&self, point: &Point) -> bool {
        self.bbox.collides_with(point)
            && self.ray_cast(point)
            && self.distance_to_boundary(point) > GEOM_EPS
    }
}

impl CollidesWith<Point> for SPolygon {
    /// Closed test: points on the boundary collide
    fn collides_with(&self, point: &Point) -> bool {
        self.bbox.inflated(GEOM_EPS).collides_with(point)
            && (self.ray_cast(point) || self.distance_to_boundary(point) <= GEOM_EPS)
    }
}

impl Shape for SPolygon {
    fn centroid(&self) -> Point {
        //based on: https://en.wikipedia.org/wiki/Centroid#Of_a_polygon
        let (mut c_x, mut c_y) = (0.0, 0.0);
        for i in 0..self.n_vertices() {
            let Point(x_i, y_i) = self.vertex(i);
            let Point(x_j, y_j) = self.vertex((i + 1) % self.n_vertices());
            let f = x_i * y_j - x_j * y_i;
            c_x += (x_i + x_j) * f;
            c_y += (y_i + y_j) * f;
        }
        Point(c_x / (6.0 * self.area), c_y / (6.0 * self.area))
    }

    fn area(&self) -> f64 {
        self.area
    }

    fn bbox(&self) -> Rect {
        self.bbox
    }
}

impl Transformable for SPolygon {
    fn transform(&mut self, t: &Transformation) -> &mut Self {
        self.vertices.iter_mut().for_each(|v| {
            v.transform(t);
        });
        //rigid transformations preserve area and orientation
        self.bbox = Rect::from_points(&self.vertices).unwrap_or(self.bbox);
        self
    }
}

impl From<Rect> for SPolygon {
    fn from(r: Rect) -> Self {
        SPolygon {
            vertices: r.corners().to_vec(),
            bbox: r,
            area: r.width() * r.height(),
        }
    }
}

/// Returns the indices of two edges that intersect while they should not.
fn find_self_intersection(points: &[Point]) -> Option<(usize, usize)> {
    let n = points.len();
    let edge = |i: usize| Edge {
        start: points[i],
        end: points[(i + 1) % n],
    };
    for i in 0..n {
        //adjacent edges folding back onto each other
        let (a, b, c) = (points[i], points[(i + 1) % n], points[(i + 2) % n]);
        let (ab, bc) = ((b.0 - a.0, b.1 - a.1), (c.0 - b.0, c.1 - b.1));
        if cross(a, b, c).abs() <= GEOM_EPS * edge(i).length() && ab.0 * bc.0 + ab.1 * bc.1 < 0.0 {
            return Some((i, (i + 1) % n));
        }
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            if edge(i).collides_with(&edge(j)) {
                return Some((i, j));
            }
        }
    }
    None
}
