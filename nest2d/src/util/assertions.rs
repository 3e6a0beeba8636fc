use itertools::Itertools;
use log::error;

use crate::entities::{Bin, Layout, PackGroup};
use crate::geometry::geo_traits::Shape;
use crate::geometry::kernel;

//Various checks to verify correctness of the state of the system
//Used in debug_assert!() blocks

/// Relative overlap tolerated between two items, absorbs the noise of the boolean operations
const OVERLAP_TOLERANCE: f64 = 1e-6;

/// Every item moved by the nester lies in the bin and keeps `clearance` to all other items.
/// Fixed content is not checked against itself.
pub fn layout_is_feasible(layout: &Layout, bin: &Bin, clearance: f64) -> bool {
    for pi in layout.placed_items.iter().filter(|pi| pi.is_movable()) {
        if !bin.contains(&pi.shape) {
            error!("item {} lies outside bin {}", pi.item_idx, layout.bin_idx);
            return false;
        }
    }
    for (a, b) in layout.placed_items.iter().tuple_combinations() {
        if !a.is_movable() && !b.is_movable() {
            continue;
        }
        if kernel::collides(&a.shape, &b.shape, clearance) {
            error!(
                "items {} and {} collide in bin {} (clearance {clearance})",
                a.item_idx, b.item_idx, layout.bin_idx
            );
            return false;
        }
    }
    true
}

/// No item moved by the nester overlaps another item by more than a negligible area
pub fn layout_is_overlap_free(layout: &Layout) -> bool {
    layout.placed_items.iter().tuple_combinations().all(|(a, b)| {
        if !a.is_movable() && !b.is_movable() {
            return true;
        }
        let overlap = kernel::overlap_area(&a.shape, &b.shape);
        let reference = a.shape.area().min(b.shape.area());
        overlap <= OVERLAP_TOLERANCE * reference
    })
}

/// Every index appears at most once over all bins and the unresolved items
pub fn pack_group_is_consistent(pack_group: &PackGroup) -> bool {
    pack_group
        .iter()
        .flatten()
        .chain(pack_group.unresolved.iter())
        .all_unique()
}
