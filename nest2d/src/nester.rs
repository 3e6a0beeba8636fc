use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use anyhow::{Result, bail};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use thousands::Separable;

use crate::entities::{Bin, Item, PackGroup};
use crate::opt::StopCriteria;
use crate::placer::{Placer, PlacerConfig};
use crate::selection::{Selection, SelectionConfig, check_bin_ids};
use crate::util::NestError;
use crate::util::assertions;

/// Complete configuration of a nesting run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NestConfig {
    pub placer: PlacerConfig,
    pub selection: SelectionConfig,
    /// Termination criteria of the refinement steps of the placer
    pub optimizer: StopCriteria,
}

impl NestConfig {
    pub fn validate(&self) -> Result<()> {
        self.placer.validate()?;
        self.selection.validate()
    }
}

type ProgressFn = Box<dyn Fn(usize) + Send + Sync>;
type StopFn = Box<dyn Fn() -> bool + Send + Sync>;

enum StopCondition {
    Never,
    Flag(Arc<AtomicBool>),
    Fn(StopFn),
}

/// Progress reporting and cooperative cancellation of a nesting run.
///
/// The stop condition is polled between item placements and between bin fills.
/// A stopped run returns the partial result built so far.
pub struct NestControl {
    progress: Option<ProgressFn>,
    stop: StopCondition,
}

impl NestControl {
    pub fn new() -> Self {
        Self {
            progress: None,
            stop: StopCondition::Never,
        }
    }

    /// Called with the number of items that remain to be handled
    pub fn with_progress(mut self, progress: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Stops the run once `flag` is set
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop = StopCondition::Flag(flag);
        self
    }

    /// Stops the run once `condition` returns true
    pub fn with_stop_condition(mut self, condition: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.stop = StopCondition::Fn(Box::new(condition));
        self
    }

    pub fn should_stop(&self) -> bool {
        match &self.stop {
            StopCondition::Never => false,
            StopCondition::Flag(flag) => flag.load(Ordering::Relaxed),
            StopCondition::Fn(condition) => condition(),
        }
    }

    pub fn report_progress(&self, remaining: usize) {
        if let Some(progress) = &self.progress {
            progress(remaining);
        }
    }
}

impl Default for NestControl {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for NestControl {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let stop = match &self.stop {
            StopCondition::Never => "never",
            StopCondition::Flag(_) => "flag",
            StopCondition::Fn(_) => "fn",
        };
        f.debug_struct("NestControl")
            .field("progress", &self.progress.is_some())
            .field("stop", &stop)
            .finish()
    }
}

/// Nests `items` into copies of `bin`, keeping at least `spacing` between items.
///
/// Placed items get their transformation and bin id updated, unresolved items end up without a bin id.
/// Fixed items and disallowed areas are left untouched.
pub fn nest(
    items: &mut [Item],
    bin: &Bin,
    spacing: f64,
    config: &NestConfig,
    control: &NestControl,
) -> Result<PackGroup> {
    let start = Instant::now();
    bin.validate()?;
    if !(spacing.is_finite() && spacing >= 0.0) {
        bail!(NestError::InvalidSpacing(spacing));
    }
    config.validate()?;
    if let Some(idx) = items
        .iter()
        .position(|item| item.fixed && !item.disallowed && item.bin_id.is_none())
    {
        bail!(NestError::FixedItemWithoutBin(idx));
    }
    check_bin_ids(items)?;

    let placer = Placer::new(&config.placer, spacing, config.optimizer);
    let selection = Selection::new(&config.selection);
    info!(
        "[NEST] nesting {} items ({} placeable) with {:?} and {:?}",
        items.len().separate_with_commas(),
        items.iter().filter(|i| i.is_placeable()).count().separate_with_commas(),
        config.placer,
        config.selection
    );

    let mut outcome = selection.select(items, bin, &placer, control)?;
    for layout in outcome.layouts.iter_mut() {
        placer.finalize(bin, layout);
        debug_assert!(assertions::layout_is_feasible(layout, bin, placer.clearance()));
        debug_assert!(assertions::layout_is_overlap_free(layout));
    }
    if outcome.cancelled {
        warn!("[NEST] run stopped, returning a partial result");
    }

    for layout in &outcome.layouts {
        for pi in layout.placed_items.iter().filter(|pi| pi.is_movable()) {
            let item = &mut items[pi.item_idx];
            item.d_transf = pi.d_transf;
            item.bin_id = Some(layout.bin_idx);
        }
    }
    for &idx in &outcome.unresolved {
        items[idx].bin_id = None;
    }

    let pack_group = PackGroup {
        bins: outcome
            .layouts
            .iter()
            .map(|l| l.item_indices().collect())
            .collect(),
        unresolved: outcome.unresolved,
    };
    debug_assert!(assertions::pack_group_is_consistent(&pack_group));
    info!(
        "[NEST] finished in {:.3}ms: {} items in {} bins, {} unresolved",
        start.elapsed().as_secs_f64() * 1000.0,
        pack_group.n_placed().separate_with_commas(),
        pack_group.n_bins(),
        pack_group.unresolved.len()
    );
    Ok(pack_group)
}

/// Same as [`nest`], returning only the number of bins used
pub fn nest_count(
    items: &mut [Item],
    bin: &Bin,
    spacing: f64,
    config: &NestConfig,
    control: &NestControl,
) -> Result<usize> {
    nest(items, bin, spacing, config, control).map(|pg| pg.n_bins())
}
