use std::f64::consts::PI;

use anyhow::Result;
use anyhow::ensure;

use crate::geometry::geo_traits::{CollidesWith, DistanceTo, Shape};
use crate::geometry::primitives::Point;
use crate::geometry::primitives::Rect;

/// Circle
#[derive(Debug, Clone, PartialEq, Copy)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

impl Circle {
    pub fn try_new(center: Point, radius: f64) -> Result<Self> {
        ensure!(
            radius.is_finite() && radius > 0.0,
            "invalid circle radius: {radius}"
        );
        ensure!(center.is_finite(), "invalid circle center: {center:?}");
        Ok(Self { center, radius })
    }

    /// Regular `n`-gon with its vertices on the circle, counterclockwise.
    /// Lies entirely inside the circle.
    pub fn inscribed_polygon(&self, n: usize) -> Vec<Point> {
        regular_polygon(self.center, self.radius, n)
    }

    /// Regular `n`-gon whose edges are tangent to the circle, counterclockwise.
    /// Contains the entire circle.
    pub fn circumscribed_polygon(&self, n: usize) -> Vec<Point> {
        let r = self.radius / (PI / n as f64).cos();
        regular_polygon(self.center, r, n)
    }
}

fn regular_polygon(center: Point, r: f64, n: usize) -> Vec<Point> {
    (0..n)
        .map(|i| {
            let angle = 2.0 * PI * (i as f64) / (n as f64);
            Point(center.0 + r * angle.cos(), center.1 + r * angle.sin())
        })
        .collect()
}

impl Shape for Circle {
    fn centroid(&self) -> Point {
        self.center
    }

    fn area(&self) -> f64 {
        PI * self.radius * self.radius
    }

    fn bbox(&self) -> Rect {
        let Point(x, y) = self.center;
        let r = self.radius;
        Rect {
            x_min: x - r,
            y_min: y - r,
            x_max: x + r,
            y_max: y + r,
        }
    }
}

impl CollidesWith<Point> for Circle {
    fn collides_with(&self, point: &Point) -> bool {
        point.sq_distance_to(&self.center) <= self.radius.powi(2)
    }
}
