use anyhow::Result;
use anyhow::ensure;

use crate::geometry::geo_enums::{Alignment, GeoRelation};
use crate::geometry::geo_traits::{CollidesWith, Shape};
use crate::geometry::primitives::Point;
use crate::util::FPA;

/// Axis-aligned rectangle
#[derive(Clone, Debug, PartialEq, Copy)]
pub struct Rect {
    pub x_min: f64,
    pub y_min: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl Rect {
    pub fn try_new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<Self> {
        ensure!(
            x_min <= x_max && y_min <= y_max,
            "invalid rectangle, x_min: {x_min}, x_max: {x_max}, y_min: {y_min}, y_max: {y_max}"
        );
        Ok(Rect {
            x_min,
            y_min,
            x_max,
            y_max,
        })
    }

    /// Smallest rectangle containing all `points`, `None` if there are none.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        points.into_iter().fold(None, |acc: Option<Rect>, p| {
            Some(match acc {
                None => Rect {
                    x_min: p.0,
                    y_min: p.1,
                    x_max: p.0,
                    y_max: p.1,
                },
                Some(r) => Rect {
                    x_min: r.x_min.min(p.0),
                    y_min: r.y_min.min(p.1),
                    x_max: r.x_max.max(p.0),
                    y_max: r.y_max.max(p.1),
                },
            })
        })
    }

    /// Smallest rectangle containing both `a` and `b`
    pub fn bounding_rect(a: Rect, b: Rect) -> Rect {
        Rect {
            x_min: a.x_min.min(b.x_min),
            y_min: a.y_min.min(b.y_min),
            x_max: a.x_max.max(b.x_max),
            y_max: a.y_max.max(b.y_max),
        }
    }

    /// Returns the geometric relation between `self` and another [`Rect`],
    /// with a tolerance for floating point precision.
    pub fn relation_to(&self, other: Rect) -> GeoRelation {
        if !self.collides_with(&other) {
            return GeoRelation::Disjoint;
        }
        if FPA(self.x_min) <= FPA(other.x_min)
            && FPA(self.y_min) <= FPA(other.y_min)
            && FPA(self.x_max) >= FPA(other.x_max)
            && FPA(self.y_max) >= FPA(other.y_max)
        {
            return GeoRelation::Surrounding;
        }
        if FPA(self.x_min) >= FPA(other.x_min)
            && FPA(self.y_min) >= FPA(other.y_min)
            && FPA(self.x_max) <= FPA(other.x_max)
            && FPA(self.y_max) <= FPA(other.y_max)
        {
            return GeoRelation::Enclosed;
        }
        GeoRelation::Intersecting
    }

    /// Returns a new rectangle expanded by `d` in every direction.
    pub fn inflated(self, d: f64) -> Self {
        Rect {
            x_min: self.x_min - d,
            y_min: self.y_min - d,
            x_max: self.x_max + d,
            y_max: self.y_max + d,
        }
    }

    pub fn translated(self, (dx, dy): (f64, f64)) -> Self {
        Rect {
            x_min: self.x_min + dx,
            y_min: self.y_min + dy,
            x_max: self.x_max + dx,
            y_max: self.y_max + dy,
        }
    }

    /// Returns the four corners of `self`, counterclockwise starting from the bottom-left.
    pub fn corners(&self) -> [Point; 4] {
        [
            Point(self.x_min, self.y_min),
            Point(self.x_max, self.y_min),
            Point(self.x_max, self.y_max),
            Point(self.x_min, self.y_max),
        ]
    }

    /// Reference point of the rectangle for an [`Alignment`], `None` for [`Alignment::DontAlign`]
    pub fn reference_point(&self, alignment: Alignment) -> Option<Point> {
        match alignment {
            Alignment::Center => Some(self.centroid()),
            Alignment::BottomLeft => Some(Point(self.x_min, self.y_min)),
            Alignment::BottomRight => Some(Point(self.x_max, self.y_min)),
            Alignment::TopLeft => Some(Point(self.x_min, self.y_max)),
            Alignment::TopRight => Some(Point(self.x_max, self.y_max)),
            Alignment::DontAlign => None,
        }
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }
}

impl Shape for Rect {
    fn centroid(&self) -> Point {
        Point(
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }

    fn area(&self) -> f64 {
        self.width() * self.height()
    }

    fn bbox(&self) -> Rect {
        *self
    }
}

impl CollidesWith<Rect> for Rect {
    #[inline(always)]
    fn collides_with(&self, other: &Rect) -> bool {
        f64::max(self.x_min, other.x_min) <= f64::min(self.x_max, other.x_max)
            && f64::max(self.y_min, other.y_min) <= f64::min(self.y_max, other.y_max)
    }
}

impl CollidesWith<Point> for Rect {
    #[inline(always)]
    fn collides_with(&self, point: &Point) -> bool {
        let Point(x, y) = *point;
        x >= self.x_min && x <= self.x_max && y >= self.y_min && y <= self.y_max
    }
}
