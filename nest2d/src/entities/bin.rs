use anyhow::{Result, bail};

use crate::geometry::geo_enums::{Alignment, GeoRelation};
use crate::geometry::geo_traits::{DistanceTo, Shape};
use crate::geometry::primitives::{Circle, NSPolygon, Point, Rect};
use crate::util::{GEOM_EPS, InvalidGeometry};

/// Container into which items are nested. Immutable for the duration of a run.
#[derive(Clone, Debug, PartialEq)]
pub enum Bin {
    /// Axis-aligned box
    Box(Rect),
    Circle(Circle),
    /// Bounded in y, unbounded towards +x
    Strip { x_min: f64, y_min: f64, height: f64 },
}

impl Bin {
    pub fn new_box(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<Self> {
        let bin = Bin::Box(Rect {
            x_min,
            y_min,
            x_max,
            y_max,
        });
        bin.validate()?;
        Ok(bin)
    }

    pub fn new_circle(center: Point, radius: f64) -> Result<Self> {
        let bin = Bin::Circle(Circle { center, radius });
        bin.validate()?;
        Ok(bin)
    }

    pub fn new_strip(x_min: f64, y_min: f64, height: f64) -> Result<Self> {
        let bin = Bin::Strip {
            x_min,
            y_min,
            height,
        };
        bin.validate()?;
        Ok(bin)
    }

    pub fn validate(&self) -> Result<()> {
        let valid = match self {
            Bin::Box(r) => {
                [r.x_min, r.y_min, r.x_max, r.y_max].iter().all(|v| v.is_finite())
                    && r.width() > 0.0
                    && r.height() > 0.0
            }
            Bin::Circle(c) => c.center.is_finite() && c.radius.is_finite() && c.radius > 0.0,
            Bin::Strip {
                x_min,
                y_min,
                height,
            } => x_min.is_finite() && y_min.is_finite() && height.is_finite() && *height > 0.0,
        };
        if !valid {
            bail!(InvalidGeometry::InvalidBin(format!("{self:?}")));
        }
        Ok(())
    }

    /// Area of the bin, `None` for a strip
    pub fn area(&self) -> Option<f64> {
        match self {
            Bin::Box(r) => Some(r.area()),
            Bin::Circle(c) => Some(c.area()),
            Bin::Strip { .. } => None,
        }
    }

    /// Area consumed by a pile with bounding box `pile`.
    /// Strips are consumed up to the right edge of the pile.
    pub fn used_area(&self, pile: Option<Rect>) -> f64 {
        match self {
            Bin::Box(_) | Bin::Circle(_) => self.area().unwrap_or(0.0),
            Bin::Strip { x_min, height, .. } => {
                pile.map_or(0.0, |p| (p.x_max - x_min).max(0.0) * height)
            }
        }
    }

    /// Bounding box of the region available to a pile with bounding box `pile`,
    /// extended by `extra_length` beyond the pile for strips.
    pub fn bbox(&self, pile: Option<Rect>, extra_length: f64) -> Rect {
        match self {
            Bin::Box(r) => *r,
            Bin::Circle(c) => c.bbox(),
            Bin::Strip {
                x_min,
                y_min,
                height,
            } => {
                let pile_x_max = pile.map_or(*x_min, |p| p.x_max.max(*x_min));
                Rect {
                    x_min: *x_min,
                    y_min: *y_min,
                    x_max: pile_x_max + extra_length,
                    y_max: y_min + height,
                }
            }
        }
    }

    /// Convex counterclockwise polygon items must stay within.
    /// Circles are approximated from the inside by an `n_segments`-gon.
    pub fn container(&self, pile: Option<Rect>, extra_length: f64, n_segments: usize) -> Vec<Point> {
        match self {
            Bin::Circle(c) => c.inscribed_polygon(n_segments),
            Bin::Box(_) | Bin::Strip { .. } => self.bbox(pile, extra_length).corners().to_vec(),
        }
    }

    /// Alignment actually used for this bin.
    /// Strips have no right side, right alignments fall back to the left side.
    pub fn effective_alignment(&self, alignment: Alignment) -> Alignment {
        match (self, alignment) {
            (Bin::Strip { .. }, Alignment::BottomRight) => Alignment::BottomLeft,
            (Bin::Strip { .. }, Alignment::TopRight) => Alignment::TopLeft,
            _ => alignment,
        }
    }

    /// Reference point of the bin for an alignment, see [`Bin::effective_alignment`]
    pub fn anchor(&self, alignment: Alignment) -> Option<Point> {
        match self {
            Bin::Box(r) => r.reference_point(alignment),
            Bin::Circle(c) => c.bbox().reference_point(alignment),
            Bin::Strip {
                x_min,
                y_min,
                height,
            } => {
                let y = match self.effective_alignment(alignment) {
                    Alignment::Center => y_min + height / 2.0,
                    Alignment::BottomLeft => *y_min,
                    Alignment::TopLeft => y_min + height,
                    _ => return None,
                };
                Some(Point(*x_min, y))
            }
        }
    }

    /// Scale used to normalize placement costs: (area, length)
    pub fn cost_normalization(&self) -> (f64, f64) {
        let area = match self {
            Bin::Strip { height, .. } => height * height,
            _ => self.area().unwrap_or(1.0),
        };
        (area, area.sqrt())
    }

    /// True if `shape` lies within the bin, touching the boundary allowed
    pub fn contains(&self, shape: &NSPolygon) -> bool {
        self.contains_with_margin(shape, 0.0)
    }

    /// True if `shape` keeps at least `margin` from every bounded side of the bin
    pub fn contains_with_margin(&self, shape: &NSPolygon, margin: f64) -> bool {
        let bbox = shape.bbox();
        match self {
            Bin::Box(r) => r.inflated(GEOM_EPS - margin).relation_to(bbox) == GeoRelation::Surrounding,
            Bin::Circle(c) => shape
                .outer
                .vertices
                .iter()
                .all(|v| v.distance_to(&c.center) <= c.radius - margin + GEOM_EPS),
            Bin::Strip {
                x_min,
                y_min,
                height,
            } => {
                bbox.x_min >= x_min + margin - GEOM_EPS
                    && bbox.y_min >= y_min + margin - GEOM_EPS
                    && bbox.y_max <= y_min + height - margin + GEOM_EPS
            }
        }
    }
}
