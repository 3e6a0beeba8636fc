use std::cmp::Reverse;

use anyhow::{Result, bail};
use itertools::Itertools;
use log::{debug, info};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thousands::Separable;

use crate::entities::{Bin, Item, Layout};
use crate::nester::NestControl;
use crate::placer::Placer;
use crate::selection::{FirstFit, SelectionOutcome, new_layout, placement_order, preload};
use crate::util::NestError;

/// Amount of work (item trials) from which evaluation is spread over threads
const PARALLEL_THRESHOLD: usize = 8;

/// Upper bound on the number of groups tried in a single step
const MAX_GROUP_TRIALS: usize = 10_000;

/// Upper bound on the number of partial groups visited while searching a single step
const MAX_GROUP_VISITS: usize = 200_000;

/// Configuration of the [`DjdHeuristic`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DJDHeuristicConfig {
    /// Also run on the reversed item order and keep the better result
    pub try_reverse_order: bool,
    /// Look for pairs of items filling the remaining space
    pub try_pairs: bool,
    /// Look for triplets of items filling the remaining space
    pub try_triplets: bool,
    /// Fraction of the bin filled greedily before looking for good fits
    pub initial_fill_proportion: f64,
    /// Increase of the allowed waste after every failed attempt, as a fraction of the bin
    pub waste_increment: f64,
    pub allow_parallel: bool,
    /// Evaluate in parallel regardless of the amount of work
    pub force_parallel: bool,
}

impl Default for DJDHeuristicConfig {
    fn default() -> Self {
        Self {
            try_reverse_order: true,
            try_pairs: true,
            try_triplets: false,
            initial_fill_proportion: 1.0 / 3.0,
            waste_increment: 0.1,
            allow_parallel: true,
            force_parallel: false,
        }
    }
}

impl DJDHeuristicConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.initial_fill_proportion) {
            bail!(NestError::InvalidConfig(format!(
                "initial_fill_proportion must lie in [0, 1], got {}",
                self.initial_fill_proportion
            )));
        }
        if !(self.waste_increment.is_finite() && self.waste_increment > 0.0) {
            bail!(NestError::InvalidConfig(format!(
                "waste_increment must be positive, got {}",
                self.waste_increment
            )));
        }
        Ok(())
    }
}

/// One complete run of the heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Variant {
    groups: bool,
    reversed: bool,
}

/// Djang and Finch heuristic: fills one bin at a time, first greedily up to an initial
/// fill proportion, then searching single items, pairs and triplets that fill the remaining
/// space with an allowed waste that grows after every failed attempt.
#[derive(Debug, Clone, Copy)]
pub struct DjdHeuristic {
    config: DJDHeuristicConfig,
}

impl DjdHeuristic {
    pub fn new(config: DJDHeuristicConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DJDHeuristicConfig {
        &self.config
    }

    pub fn select(
        &self,
        items: &[Item],
        bin: &Bin,
        placer: &Placer,
        control: &NestControl,
    ) -> Result<SelectionOutcome> {
        let order = placement_order(items);
        let Some(bin_area) = bin.area() else {
            debug!("[DJD] strip bins never fill up, placing in first-fit order");
            return FirstFit.select_in_order(items, bin, placer, control, &order);
        };

        let variants = self.variants();
        let parallel = self.parallel(variants.len() * order.len());
        let run = |(v_idx, variant): (usize, &Variant)| {
            let ordered = match variant.reversed {
                true => order.iter().rev().copied().collect_vec(),
                false => order.clone(),
            };
            let runner = Run {
                items,
                bin,
                bin_area,
                placer,
                control,
                config: &self.config,
                groups: variant.groups,
                report: v_idx == 0,
                parallel,
            };
            runner.execute(&ordered)
        };
        let outcomes = match parallel {
            true => variants.par_iter().enumerate().map(run).collect::<Vec<_>>(),
            false => variants.iter().enumerate().map(run).collect::<Vec<_>>(),
        }
        .into_iter()
        .collect::<Result<Vec<_>>>()?;

        for (variant, outcome) in variants.iter().zip(outcomes.iter()) {
            debug!(
                "[DJD] {:?}: {} bins, {} placed, {} unresolved",
                variant,
                outcome.layouts.len(),
                outcome.n_placed(),
                outcome.unresolved.len()
            );
        }

        let cancelled = outcomes.iter().any(|o| o.cancelled);
        let (best_idx, mut best) = outcomes
            .into_iter()
            .enumerate()
            .min_by_key(|(idx, o)| {
                let last_fill = o.layouts.last().map_or(0.0, |l| l.fill_ratio(bin));
                (
                    o.layouts.len(),
                    Reverse(o.n_placed()),
                    Reverse(OrderedFloat(last_fill)),
                    *idx,
                )
            })
            .expect("at least one variant is run");
        best.cancelled = cancelled;

        info!(
            "[DJD] placed {}/{} items in {} bins ({:?})",
            best.n_placed().separate_with_commas(),
            order.len().separate_with_commas(),
            best.layouts.len(),
            variants[best_idx]
        );
        Ok(best)
    }

    /// The configured run first, then the run without groups if groups are enabled,
    /// then all of them again on the reversed order if requested
    fn variants(&self) -> Vec<Variant> {
        let groups = self.config.try_pairs || self.config.try_triplets;
        let mut variants = vec![Variant {
            groups,
            reversed: false,
        }];
        if groups {
            variants.push(Variant {
                groups: false,
                reversed: false,
            });
        }
        if self.config.try_reverse_order {
            let reversed = variants
                .iter()
                .map(|v| Variant {
                    reversed: true,
                    ..*v
                })
                .collect_vec();
            variants.extend(reversed);
        }
        variants
    }

    fn parallel(&self, work: usize) -> bool {
        self.config.force_parallel || (self.config.allow_parallel && work >= PARALLEL_THRESHOLD)
    }
}

/// State shared by all steps of a single run
struct Run<'a> {
    items: &'a [Item],
    bin: &'a Bin,
    bin_area: f64,
    placer: &'a Placer,
    control: &'a NestControl,
    config: &'a DJDHeuristicConfig,
    groups: bool,
    /// Whether this run reports progress
    report: bool,
    parallel: bool,
}

impl Run<'_> {
    fn execute(&self, order: &[usize]) -> Result<SelectionOutcome> {
        let mut layouts = preload(self.items)?;
        let n_preloaded = layouts.len();
        let mut remaining = order.to_vec();
        let mut unresolved = vec![];
        let mut bin_idx = 0;

        let cancelled = loop {
            if remaining.is_empty() {
                break false;
            }
            if self.control.should_stop() {
                break true;
            }

            let fresh = bin_idx >= n_preloaded;
            let mut layout = match fresh {
                true => new_layout(self.items, bin_idx),
                false => layouts[bin_idx].clone(),
            };
            let n_before = layout.n_movable();
            let cancelled = self.fill_bin(&mut layout, &mut remaining)?;
            let placed_any = layout.n_movable() > n_before;

            match (fresh, placed_any) {
                (true, false) => {
                    //nothing left fits in an empty bin
                    unresolved.append(&mut remaining);
                }
                (true, true) => layouts.push(layout),
                (false, _) => layouts[bin_idx] = layout,
            }
            if cancelled {
                break true;
            }
            bin_idx += 1;
        };

        if cancelled {
            unresolved.append(&mut remaining);
        }
        Ok(SelectionOutcome {
            layouts,
            unresolved,
            cancelled,
        })
    }

    /// Fills a single bin, removing the placed items from `remaining`.
    /// Returns true if the run was stopped.
    fn fill_bin(&self, layout: &mut Layout, remaining: &mut Vec<usize>) -> Result<bool> {
        //greedy phase
        let mut i = 0;
        while i < remaining.len() && layout.fill_ratio(self.bin) < self.config.initial_fill_proportion {
            if self.control.should_stop() {
                return Ok(true);
            }
            let item_idx = remaining[i];
            match self.placer.place(&self.items[item_idx], self.bin, layout)? {
                Some(c) => {
                    layout.place(item_idx, &self.items[item_idx], c.d_transf);
                    remaining.remove(i);
                    self.report(remaining);
                }
                None => i += 1,
            }
        }

        //best fit phase, the last round before closing the bin accepts any waste
        let mut waste: f64 = 0.0;
        loop {
            let free = (1.0 - layout.fill_ratio(self.bin)).max(0.0);
            if remaining.is_empty() {
                return Ok(false);
            }
            if self.control.should_stop() {
                return Ok(true);
            }

            let last_round = waste >= free;
            let window = ((free - waste).max(0.0), free);
            let mut placed = self.try_group(layout, remaining, 1, window)?;
            if !placed && self.groups && self.config.try_pairs {
                placed = self.try_group(layout, remaining, 2, window)?;
            }
            if !placed && self.groups && self.config.try_triplets {
                placed = self.try_group(layout, remaining, 3, window)?;
            }

            match placed {
                true => {
                    waste = 0.0;
                    self.report(remaining);
                }
                false if last_round => return Ok(false),
                false => waste = (waste + self.config.waste_increment).min(free),
            }
        }
    }

    /// Searches `size` remaining items, in order, whose combined area fraction lies within
    /// `window` and that can all be placed. On success they are placed in `layout`.
    fn try_group(
        &self,
        layout: &mut Layout,
        remaining: &mut Vec<usize>,
        size: usize,
        (lo, hi): (f64, f64),
    ) -> Result<bool> {
        const TOLERANCE: f64 = 1e-9;
        let fractions = remaining
            .iter()
            .map(|&i| self.items[i].area() / self.bin_area)
            .collect_vec();
        let groups = groups_in_window(&fractions, size, (lo - TOLERANCE, hi + TOLERANCE));
        if groups.is_empty() {
            return Ok(false);
        }

        let attempt = |group: &Vec<usize>| -> Option<Result<Layout>> {
            let mut trial = layout.clone();
            for &i in group {
                let item_idx = remaining[i];
                let item = &self.items[item_idx];
                match self.placer.place(item, self.bin, &trial) {
                    Ok(Some(c)) => trial.place(item_idx, item, c.d_transf),
                    Ok(None) => return None,
                    Err(e) => return Some(Err(e)),
                }
            }
            Some(Ok(trial))
        };
        let found = match self.parallel && groups.len() * size >= PARALLEL_THRESHOLD {
            true => groups
                .par_iter()
                .enumerate()
                .find_map_first(|(g, group)| attempt(group).map(|r| (g, r))),
            false => groups
                .iter()
                .enumerate()
                .find_map(|(g, group)| attempt(group).map(|r| (g, r))),
        };

        match found {
            Some((g, trial)) => {
                *layout = trial?;
                let group = &groups[g];
                debug!(
                    "[DJD] group of {} items {:?} placed in bin {}",
                    size,
                    group.iter().map(|&i| remaining[i]).collect_vec(),
                    layout.bin_idx
                );
                //positions are ascending, remove back to front
                for &i in group.iter().rev() {
                    remaining.remove(i);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn report(&self, remaining: &[usize]) {
        if self.report {
            self.control.report_progress(remaining.len());
        }
    }
}

/// Groups of `size` positions into `fractions`, in lexicographic order, whose summed fraction
/// lies within `[lo, hi]`. Branches that can no longer reach the window are pruned and the
/// search stops after [`MAX_GROUP_VISITS`] visits or [`MAX_GROUP_TRIALS`] groups.
pub fn groups_in_window(fractions: &[f64], size: usize, (lo, hi): (f64, f64)) -> Vec<Vec<usize>> {
    if size == 0 || size > fractions.len() {
        return vec![];
    }
    let n = fractions.len();
    //smallest and largest fraction from each position onwards
    let mut suffix_min = vec![f64::INFINITY; n + 1];
    let mut suffix_max = vec![f64::NEG_INFINITY; n + 1];
    for i in (0..n).rev() {
        suffix_min[i] = suffix_min[i + 1].min(fractions[i]);
        suffix_max[i] = suffix_max[i + 1].max(fractions[i]);
    }
    let mut search = GroupSearch {
        fractions,
        suffix_min,
        suffix_max,
        window: (lo, hi),
        visits: 0,
        groups: vec![],
    };
    search.extend(0, &mut Vec::with_capacity(size), 0.0, size);
    search.groups
}

struct GroupSearch<'a> {
    fractions: &'a [f64],
    suffix_min: Vec<f64>,
    suffix_max: Vec<f64>,
    window: (f64, f64),
    visits: usize,
    groups: Vec<Vec<usize>>,
}

impl GroupSearch<'_> {
    fn extend(&mut self, start: usize, group: &mut Vec<usize>, sum: f64, left: usize) {
        let (lo, hi) = self.window;
        for i in start..=(self.fractions.len() - left) {
            if self.visits >= MAX_GROUP_VISITS || self.groups.len() >= MAX_GROUP_TRIALS {
                return;
            }
            self.visits += 1;
            let sum = sum + self.fractions[i];
            let rest = left - 1;
            let (min_total, max_total) = match rest {
                0 => (sum, sum),
                _ => (
                    sum + rest as f64 * self.suffix_min[i + 1],
                    sum + rest as f64 * self.suffix_max[i + 1],
                ),
            };
            if min_total > hi || max_total < lo {
                continue;
            }
            group.push(i);
            match rest {
                0 => self.groups.push(group.clone()),
                _ => self.extend(i + 1, group, sum, rest),
            }
            group.pop();
        }
    }
}
