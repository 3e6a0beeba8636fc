use std::f64::consts::FRAC_PI_2;

use anyhow::Result;
use itertools::Itertools;
use log::trace;
use ordered_float::OrderedFloat;

use crate::entities::{Bin, Item, Layout};
use crate::geometry::geo_traits::{CollidesWith, Shape, Transformable};
use crate::geometry::{DTransformation, Transformation};
use crate::geometry::kernel;
use crate::geometry::primitives::{NSPolygon, Rect};
use crate::placer::{BottomLeftConfig, PlacementCandidate, PlacementCost};

/// Weight of the vertical position in the cost
const ROW_WEIGHT: f64 = 10.0;

/// Slides items over a grid with step `epsilon`, row by row starting at the bottom,
/// and keeps the first position that collides with nothing.
#[derive(Debug, Clone, Copy)]
pub struct BottomLeftPlacer {
    config: BottomLeftConfig,
    clearance: f64,
}

impl BottomLeftPlacer {
    pub fn new(config: BottomLeftConfig, spacing: f64) -> Self {
        Self {
            clearance: spacing.max(config.min_obj_distance),
            config,
        }
    }

    pub fn clearance(&self) -> f64 {
        self.clearance
    }

    pub fn place(&self, item: &Item, bin: &Bin, layout: &Layout) -> Result<Option<PlacementCandidate>> {
        let rotations = match self.config.allow_rotations {
            true => vec![0.0, FRAC_PI_2, 2.0 * FRAC_PI_2, 3.0 * FRAC_PI_2],
            false => vec![0.0],
        };

        let best = rotations
            .iter()
            .enumerate()
            .filter_map(|(r_idx, &r)| {
                self.slide(item, bin, layout, r)
                    .map(|(d_transf, bbox)| (r_idx, d_transf, bbox))
            })
            .min_by_key(|(r_idx, _, bbox)| (OrderedFloat(bbox.y_min), OrderedFloat(bbox.x_min), *r_idx));

        Ok(best.map(|(_, d_transf, bbox)| {
            trace!("[BL] placement found at [{d_transf}]");
            PlacementCandidate {
                d_transf,
                cost: PlacementCost::new(bbox.y_min * ROW_WEIGHT + bbox.x_min),
            }
        }))
    }

    /// Lowest, then leftmost, collision-free grid position of `item` at `rotation`,
    /// together with the bounding box it occupies there
    fn slide(&self, item: &Item, bin: &Bin, layout: &Layout, rotation: f64) -> Option<(DTransformation, Rect)> {
        let shape = item.shape_at(&DTransformation::new(rotation, (0.0, 0.0)));
        let bbox = shape.bbox();
        let region = bin.bbox(layout.pile_bbox(), 0.0);

        //every bounded side of the bin is kept at `min_obj_distance`
        let margin = self.config.min_obj_distance;
        let (x_lo, y_lo) = (region.x_min + margin - bbox.x_min, region.y_min + margin - bbox.y_min);
        let x_hi = match bin {
            Bin::Strip { .. } => region.x_max.max(x_lo + bbox.x_min) + self.clearance - bbox.x_min,
            _ => region.x_max - margin - bbox.x_max,
        };
        let y_hi = region.y_max - margin - bbox.y_max;
        if x_lo > x_hi || y_lo > y_hi {
            return None;
        }

        let xs = grid_steps(x_lo, x_hi, self.config.epsilon);
        let ys = grid_steps(y_lo, y_hi, self.config.epsilon);
        ys.iter()
            .cartesian_product(xs.iter())
            .find_map(|(&ty, &tx)| {
                let d_transf = DTransformation::new(rotation, (tx, ty));
                let placed = shape.transform_clone(&Transformation::from_translation((tx, ty)));
                self.fits(&placed, bin, layout)
                    .then(|| (d_transf, bbox.translated((tx, ty))))
            })
    }

    fn fits(&self, shape: &NSPolygon, bin: &Bin, layout: &Layout) -> bool {
        let bbox = shape.bbox().inflated(self.clearance);
        bin.contains_with_margin(shape, self.config.min_obj_distance)
            && layout
                .placed_items
                .iter()
                .filter(|pi| pi.bbox().collides_with(&bbox))
                .all(|pi| !kernel::collides(shape, &pi.shape, self.clearance))
    }
}

/// Positions from `lo` to `hi` in steps of `step`, the last one snapped onto `hi`
fn grid_steps(lo: f64, hi: f64, step: f64) -> Vec<f64> {
    let n = ((hi - lo) / step).floor() as usize;
    let mut steps = (0..=n).map(|i| lo + i as f64 * step).collect_vec();
    if steps.last().is_some_and(|&last| last < hi) {
        steps.push(hi);
    }
    steps
}
