use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;

use crate::geometry::DTransformation;
use crate::geometry::geo_traits::{Shape, Transformable};
use crate::geometry::primitives::{NSPolygon, Point, Rect};

/// Item to be nested.
///
/// The contour is immutable, a nesting run only changes the transformation and the bin id.
#[derive(Clone, Debug)]
pub struct Item {
    shape: Arc<NSPolygon>,
    /// Rotation followed by translation applied to the contour
    pub d_transf: DTransformation,
    /// Bin the item is placed in, `None` while unplaced
    pub bin_id: Option<usize>,
    /// Items with a higher priority are processed first
    pub priority: i32,
    /// Never moved by the nester, requires a `bin_id`
    pub fixed: bool,
    /// Occupies space without being a part itself
    pub disallowed: bool,
    pub metadata: BTreeMap<String, String>,
}

impl Item {
    /// Creates an item from a contour and its holes, fails with
    /// [`InvalidGeometry`](crate::util::InvalidGeometry) on malformed input.
    pub fn new(contour: Vec<Point>, holes: Vec<Vec<Point>>) -> Result<Self> {
        Ok(Item::from_shape(NSPolygon::from_points(contour, holes)?))
    }

    pub fn from_shape(shape: NSPolygon) -> Self {
        Item {
            shape: Arc::new(shape),
            d_transf: DTransformation::empty(),
            bin_id: None,
            priority: 0,
            fixed: false,
            disallowed: false,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Pins the item in `bin_id` at `d_transf`
    pub fn fixed_at(mut self, bin_id: usize, d_transf: DTransformation) -> Self {
        self.fixed = true;
        self.bin_id = Some(bin_id);
        self.d_transf = d_transf;
        self
    }

    /// Marks the item as a disallowed area at its current transformation.
    /// Without `bin_id` the area is present in every bin.
    pub fn as_disallowed_area(mut self, bin_id: Option<usize>) -> Self {
        self.disallowed = true;
        self.bin_id = bin_id;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// The original contour, independent of the transformation
    pub fn shape(&self) -> &NSPolygon {
        &self.shape
    }

    /// The contour with the current transformation applied, recomputed on every call
    pub fn transformed_shape(&self) -> NSPolygon {
        self.shape_at(&self.d_transf)
    }

    pub fn shape_at(&self, d_transf: &DTransformation) -> NSPolygon {
        self.shape.transform_clone(&d_transf.compose())
    }

    pub fn area(&self) -> f64 {
        self.shape.area()
    }

    /// Bounding box of the transformed shape
    pub fn bbox(&self) -> Rect {
        self.transformed_shape().bbox()
    }

    /// Whether the nester decides where this item goes
    pub fn is_placeable(&self) -> bool {
        !self.fixed && !self.disallowed
    }
}
