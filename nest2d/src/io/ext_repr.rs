use serde::{Deserialize, Serialize};

use crate::geometry::DTransformation;

/// External representation of a nesting instance: one bin and the items to nest into copies of it
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtInstance {
    pub name: String,
    pub bin: ExtBin,
    /// Minimum clearance between items
    #[serde(default)]
    pub spacing: f64,
    pub items: Vec<ExtItem>,
}

/// External representation of a [`Bin`](crate::entities::Bin)
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExtBin {
    /// Axis-aligned box with its bottom left corner at (x_min, y_min)
    Box {
        #[serde(default)]
        x_min: f64,
        #[serde(default)]
        y_min: f64,
        width: f64,
        height: f64,
    },
    Circle { center: (f64, f64), radius: f64 },
    /// Strip of fixed height, unbounded towards +x
    Strip {
        #[serde(default)]
        x_min: f64,
        #[serde(default)]
        y_min: f64,
        height: f64,
    },
}

/// External representation of an [`Item`](crate::entities::Item)
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtItem {
    pub id: u64,
    pub contour: ExtSPolygon,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub holes: Vec<ExtSPolygon>,
    #[serde(default)]
    pub priority: i32,
    /// Number of copies to nest
    #[serde(default = "default_quantity")]
    pub quantity: usize,
    /// Fixed items stay at `transformation` in bin `bin_id`
    #[serde(default)]
    pub fixed: bool,
    /// Disallowed areas are present in bin `bin_id`, or in every bin if it is absent
    #[serde(default)]
    pub disallowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bin_id: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformation: Option<ExtTransformation>,
}

fn default_quantity() -> usize {
    1
}

/// A polygon without holes, as a list of points (x, y)
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtSPolygon(pub Vec<(f64, f64)>);

/// External representation of a nesting result
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtSolution {
    pub bins: Vec<ExtBinLayout>,
    /// Ids of the items that could not be placed, once per copy
    pub unresolved: Vec<u64>,
    pub n_bins: usize,
    /// Area of the placed items relative to the area of the used bins
    pub density: f64,
}

/// Content of a single bin
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtBinLayout {
    pub index: usize,
    pub placed_items: Vec<ExtPlacedItem>,
    pub density: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtPlacedItem {
    pub item_id: u64,
    pub transformation: ExtTransformation,
}

/// Proper rigid transformation: a rotation followed by a translation
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct ExtTransformation {
    /// Rotation angle in radians
    pub rotation: f64,
    pub translation: (f64, f64),
}

impl From<DTransformation> for ExtTransformation {
    fn from(dt: DTransformation) -> Self {
        ExtTransformation {
            rotation: dt.rotation(),
            translation: dt.translation(),
        }
    }
}

impl From<ExtTransformation> for DTransformation {
    fn from(et: ExtTransformation) -> Self {
        DTransformation::new(et.rotation, et.translation)
    }
}
