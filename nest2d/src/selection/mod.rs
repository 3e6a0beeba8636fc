mod djd_heuristic;
mod first_fit;

#[doc(inline)]
pub use djd_heuristic::{DJDHeuristicConfig, DjdHeuristic, groups_in_window};
#[doc(inline)]
pub use first_fit::FirstFit;

use std::cmp::Reverse;

use anyhow::{Result, bail};
use itertools::Itertools;
use ordered_float::NotNan;
use serde::{Deserialize, Serialize};

use crate::entities::{Bin, Item, Layout};
use crate::nester::NestControl;
use crate::placer::Placer;
use crate::util::NestError;

/// Selects the selection strategy and its configuration
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SelectionConfig {
    #[default]
    FirstFit,
    DjdHeuristic(DJDHeuristicConfig),
}

impl SelectionConfig {
    pub fn validate(&self) -> Result<()> {
        match self {
            SelectionConfig::FirstFit => Ok(()),
            SelectionConfig::DjdHeuristic(c) => c.validate(),
        }
    }
}

/// Result of a selection run
#[derive(Debug, Clone)]
pub struct SelectionOutcome {
    /// One layout per bin, fixed content included
    pub layouts: Vec<Layout>,
    /// Placeable items that were not placed in any bin
    pub unresolved: Vec<usize>,
    /// Whether the run was stopped before all items were handled
    pub cancelled: bool,
}

impl SelectionOutcome {
    /// Number of placeable items placed in a bin
    pub fn n_placed(&self) -> usize {
        self.layouts.iter().map(|l| l.n_movable()).sum()
    }
}

/// Item ordering and bin assignment strategy, chosen at runtime from a [`SelectionConfig`]
#[derive(Debug, Clone, Copy)]
pub enum Selection {
    FirstFit(FirstFit),
    DjdHeuristic(DjdHeuristic),
}

impl Selection {
    pub fn new(config: &SelectionConfig) -> Self {
        match config {
            SelectionConfig::FirstFit => Selection::FirstFit(FirstFit),
            SelectionConfig::DjdHeuristic(c) => Selection::DjdHeuristic(DjdHeuristic::new(*c)),
        }
    }

    /// Assigns every placeable item in `items` to a bin, placing it with `placer`.
    /// Fixed items and disallowed areas are preloaded into their bins and never moved.
    pub fn select(
        &self,
        items: &[Item],
        bin: &Bin,
        placer: &Placer,
        control: &NestControl,
    ) -> Result<SelectionOutcome> {
        match self {
            Selection::FirstFit(s) => s.select(items, bin, placer, control),
            Selection::DjdHeuristic(s) => s.select(items, bin, placer, control),
        }
    }
}

/// Indices of the placeable items in processing order:
/// priority descending, then area descending, then input order
pub fn placement_order(items: &[Item]) -> Vec<usize> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.is_placeable())
        .sorted_by_cached_key(|(idx, item)| {
            let area = NotNan::new(item.area()).expect("item area is NaN");
            (Reverse(item.priority), Reverse(area), *idx)
        })
        .map(|(idx, _)| idx)
        .collect()
}

/// Fails if a fixed item or disallowed area references a bin id not below the number of items
pub fn check_bin_ids(items: &[Item]) -> Result<()> {
    let out_of_range = items
        .iter()
        .enumerate()
        .filter(|(_, item)| !item.is_placeable())
        .find_map(|(idx, item)| item.bin_id.filter(|&b| b >= items.len()).map(|b| (idx, b)));
    match out_of_range {
        Some((idx, bin_id)) => bail!(NestError::BinIdOutOfRange {
            item: idx,
            bin_id,
            n_items: items.len()
        }),
        None => Ok(()),
    }
}

/// Layouts of the bins referenced by fixed items and disallowed areas, holding that content
pub(crate) fn preload(items: &[Item]) -> Result<Vec<Layout>> {
    check_bin_ids(items)?;
    let n_bins = items
        .iter()
        .filter(|item| !item.is_placeable())
        .filter_map(|item| item.bin_id)
        .max()
        .map_or(0, |max| max + 1);

    let mut layouts = (0..n_bins).map(|b| new_layout(items, b)).collect_vec();
    for (idx, item) in items.iter().enumerate().filter(|(_, item)| !item.is_placeable()) {
        if let Some(b) = item.bin_id {
            layouts[b].place(idx, item, item.d_transf);
        }
    }
    Ok(layouts)
}

/// Empty layout for `bin_idx`, holding the disallowed areas that apply to every bin
pub(crate) fn new_layout(items: &[Item], bin_idx: usize) -> Layout {
    let mut layout = Layout::new(bin_idx);
    for (idx, item) in items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.disallowed && item.bin_id.is_none())
    {
        layout.place(idx, item, item.d_transf);
    }
    layout
}
