use std::borrow::Borrow;

use crate::geometry::d_transformation::DTransformation;
use crate::geometry::primitives::Point;

/// Proper rigid transformation, stored as the cosine and sine of its rotation
/// together with the translation applied afterwards.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transformation {
    cos: f64,
    sin: f64,
    tx: f64,
    ty: f64,
}

impl Transformation {
    pub const fn empty() -> Self {
        Self {
            cos: 1.0,
            sin: 0.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    pub fn from_translation((tx, ty): (f64, f64)) -> Self {
        Self {
            tx,
            ty,
            ..Self::empty()
        }
    }

    pub fn from_dt(dt: &DTransformation) -> Self {
        let (sin, cos) = dt.rotation().sin_cos();
        let (tx, ty) = dt.translation();
        Self { cos, sin, tx, ty }
    }

    pub fn inverse(self) -> Self {
        //the inverse of a rotation matrix is its transpose
        Self {
            cos: self.cos,
            sin: -self.sin,
            tx: -(self.cos * self.tx + self.sin * self.ty),
            ty: -(-self.sin * self.tx + self.cos * self.ty),
        }
    }

    #[inline(always)]
    pub fn apply(&self, Point(x, y): Point) -> Point {
        Point(
            self.cos * x - self.sin * y + self.tx,
            self.sin * x + self.cos * y + self.ty,
        )
    }

    pub fn decompose(&self) -> DTransformation {
        DTransformation::new(self.sin.atan2(self.cos), (self.tx, self.ty))
    }
}

impl<T> From<T> for Transformation
where
    T: Borrow<DTransformation>,
{
    fn from(dt: T) -> Self {
        Self::from_dt(dt.borrow())
    }
}
