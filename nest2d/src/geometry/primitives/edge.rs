use anyhow::Result;
use anyhow::ensure;

use crate::geometry::Transformation;
use crate::geometry::geo_traits::{CollidesWith, DistanceTo, Transformable};
use crate::geometry::primitives::Point;
use crate::util::GEOM_EPS;

/// Line segment between two [`Point`]s
#[derive(Clone, Debug, PartialEq, Copy)]
pub struct Edge {
    pub start: Point,
    pub end: Point,
}

impl Edge {
    pub fn new(start: Point, end: Point) -> Result<Self> {
        ensure!(start != end, "degenerate edge, {start:?} == {end:?}");
        Ok(Edge { start, end })
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    pub fn direction(&self) -> (f64, f64) {
        (self.end.0 - self.start.0, self.end.1 - self.start.1)
    }

    /// Point at fraction `t` of the edge (0 = start, 1 = end)
    pub fn point_at(&self, t: f64) -> Point {
        let (dx, dy) = self.direction();
        Point(self.start.0 + t * dx, self.start.1 + t * dy)
    }

    /// Signed distance of `p` to the line through the edge, positive on the left side.
    pub fn signed_distance(&self, p: &Point) -> f64 {
        let l = self.length();
        let (dx, dy) = self.direction();
        (dx * (p.1 - self.start.1) - dy * (p.0 - self.start.0)) / l
    }

    /// Returns the closest point which lies on the edge to the given point
    pub fn closest_point_on_edge(&self, point: &Point) -> Point {
        let (dx, dy) = self.direction();
        let len_sq = dx * dx + dy * dy;
        let t = ((point.0 - self.start.0) * dx + (point.1 - self.start.1) * dy) / len_sq;
        self.point_at(t.clamp(0.0, 1.0))
    }

    /// True if both edges cross each other at a single point interior to both.
    /// Touching or collinear edges do not cross.
    pub fn crosses(&self, other: &Edge) -> bool {
        let d1 = self.signed_distance(&other.start);
        let d2 = self.signed_distance(&other.end);
        let d3 = other.signed_distance(&self.start);
        let d4 = other.signed_distance(&self.end);

        let opposite = |a: f64, b: f64| (a > GEOM_EPS && b < -GEOM_EPS) || (a < -GEOM_EPS && b > GEOM_EPS);
        opposite(d1, d2) && opposite(d3, d4)
    }

    /// Intersection point of two non-parallel edges, if it lies on both.
    pub fn intersection(&self, other: &Edge) -> Option<Point> {
        let (dx1, dy1) = self.direction();
        let (dx2, dy2) = other.direction();
        let denom = dx1 * dy2 - dy1 * dx2;
        if denom.abs() < f64::EPSILON * (dx1.abs() + dy1.abs()) * (dx2.abs() + dy2.abs()) {
            return None;
        }
        let (ox, oy) = (other.start.0 - self.start.0, other.start.1 - self.start.1);
        let t = (ox * dy2 - oy * dx2) / denom;
        let u = (ox * dy1 - oy * dx1) / denom;

        let t_tol = GEOM_EPS / self.length();
        let u_tol = GEOM_EPS / other.length();
        match (-t_tol..=1.0 + t_tol).contains(&t) && (-u_tol..=1.0 + u_tol).contains(&u) {
            true => Some(self.point_at(t.clamp(0.0, 1.0))),
            false => None,
        }
    }

    pub fn x_min(&self) -> f64 {
        f64::min(self.start.0, self.end.0)
    }

    pub fn y_min(&self) -> f64 {
        f64::min(self.start.1, self.end.1)
    }

    pub fn x_max(&self) -> f64 {
        f64::max(self.start.0, self.end.0)
    }

    pub fn y_max(&self) -> f64 {
        f64::max(self.start.1, self.end.1)
    }

    pub fn centroid(&self) -> Point {
        self.point_at(0.5)
    }
}

impl Transformable for Edge {
    fn transform(&mut self, t: &Transformation) -> &mut Self {
        self.start.transform(t);
        self.end.transform(t);
        self
    }
}

impl CollidesWith<Edge> for Edge {
    /// Closed segments: touching endpoints and collinear overlaps count as a collision
    fn collides_with(&self, other: &Edge) -> bool {
        self.crosses(other)
            || self.distance_to(&other.start) <= GEOM_EPS
            || self.distance_to(&other.end) <= GEOM_EPS
            || other.distance_to(&self.start) <= GEOM_EPS
            || other.distance_to(&self.end) <= GEOM_EPS
    }
}

impl DistanceTo<Point> for Edge {
    fn distance_to(&self, point: &Point) -> f64 {
        self.sq_distance_to(point).sqrt()
    }

    fn sq_distance_to(&self, point: &Point) -> f64 {
        self.closest_point_on_edge(point).sq_distance_to(point)
    }
}

impl DistanceTo<Edge> for Edge {
    fn distance_to(&self, other: &Edge) -> f64 {
        self.sq_distance_to(other).sqrt()
    }

    fn sq_distance_to(&self, other: &Edge) -> f64 {
        if self.crosses(other) {
            return 0.0;
        }
        [
            self.sq_distance_to(&other.start),
            self.sq_distance_to(&other.end),
            other.sq_distance_to(&self.start),
            other.sq_distance_to(&self.end),
        ]
        .into_iter()
        .fold(f64::MAX, f64::min)
    }
}
