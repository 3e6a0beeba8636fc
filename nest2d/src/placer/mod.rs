mod bottom_left;
mod config;
mod nfp_placer;

#[doc(inline)]
pub use bottom_left::BottomLeftPlacer;
#[doc(inline)]
pub use config::{BottomLeftConfig, NfpConfig, PlacerConfig};
#[doc(inline)]
pub use nfp_placer::NfpPlacer;

use anyhow::Result;
use ordered_float::NotNan;

use crate::entities::{Bin, Item, Layout};
use crate::geometry::DTransformation;
use crate::opt::StopCriteria;

/// Cost of a placement, lower is better
#[derive(PartialEq, PartialOrd, Copy, Clone, Debug, Eq, Ord)]
pub struct PlacementCost(NotNan<f64>);

impl PlacementCost {
    pub fn new(cost: f64) -> Self {
        PlacementCost(NotNan::new(cost).expect("cost is NaN"))
    }

    pub fn value(&self) -> f64 {
        self.0.into_inner()
    }
}

/// Transformation proposed by a placer for one item in one layout.
/// Never overlaps an item already placed in that layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementCandidate {
    pub d_transf: DTransformation,
    pub cost: PlacementCost,
}

/// Placement strategy, chosen at runtime from a [`PlacerConfig`]
#[derive(Debug, Clone)]
pub enum Placer {
    Nfp(NfpPlacer),
    BottomLeft(BottomLeftPlacer),
}

impl Placer {
    /// `spacing` is the minimum clearance between placed items
    pub fn new(config: &PlacerConfig, spacing: f64, stop: StopCriteria) -> Self {
        match config {
            PlacerConfig::Nfp(c) => Placer::Nfp(NfpPlacer::new(c.clone(), spacing, stop)),
            PlacerConfig::BottomLeft(c) => Placer::BottomLeft(BottomLeftPlacer::new(*c, spacing)),
        }
    }

    /// Searches a placement for `item` among the items already in `layout`.
    /// `None` if there is no feasible placement, this is not an error.
    pub fn place(&self, item: &Item, bin: &Bin, layout: &Layout) -> Result<Option<PlacementCandidate>> {
        match self {
            Placer::Nfp(p) => p.place(item, bin, layout),
            Placer::BottomLeft(p) => p.place(item, bin, layout),
        }
    }

    /// Post-processing of a completely filled layout
    pub fn finalize(&self, bin: &Bin, layout: &mut Layout) {
        match self {
            Placer::Nfp(p) => p.align_pile(bin, layout),
            Placer::BottomLeft(_) => {}
        }
    }

    /// Minimum clearance enforced between items
    pub fn clearance(&self) -> f64 {
        match self {
            Placer::Nfp(p) => p.clearance(),
            Placer::BottomLeft(p) => p.clearance(),
        }
    }
}

/// Checks whether `item` at `d_transf` lies inside the bin and keeps `clearance` to every placed item
pub fn is_valid_placement(
    item: &Item,
    d_transf: &DTransformation,
    bin: &Bin,
    layout: &Layout,
    clearance: f64,
) -> bool {
    let shape = item.shape_at(d_transf);
    bin.contains(&shape)
        && layout
            .placed_items
            .iter()
            .all(|pi| !crate::geometry::kernel::collides(&shape, &pi.shape, clearance))
}
