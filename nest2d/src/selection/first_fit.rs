use anyhow::Result;
use log::{debug, info};
use thousands::Separable;

use crate::entities::{Bin, Item, Layout};
use crate::nester::NestControl;
use crate::placer::Placer;
use crate::selection::{SelectionOutcome, new_layout, placement_order, preload};

/// Places every item in the first bin that accepts it, opening a new bin only when none does
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstFit;

impl FirstFit {
    pub fn select(
        &self,
        items: &[Item],
        bin: &Bin,
        placer: &Placer,
        control: &NestControl,
    ) -> Result<SelectionOutcome> {
        self.select_in_order(items, bin, placer, control, &placement_order(items))
    }

    /// First-fit over the placeable items in `order`
    pub fn select_in_order(
        &self,
        items: &[Item],
        bin: &Bin,
        placer: &Placer,
        control: &NestControl,
        order: &[usize],
    ) -> Result<SelectionOutcome> {
        let mut layouts = preload(items)?;
        let mut unresolved = vec![];
        let mut cancelled = false;

        for (i, &item_idx) in order.iter().enumerate() {
            if control.should_stop() {
                info!("[FF] stopped with {} items remaining", order.len() - i);
                unresolved.extend_from_slice(&order[i..]);
                cancelled = true;
                break;
            }
            if !place_first_fit(items, item_idx, bin, placer, &mut layouts)? {
                debug!("[FF] item {item_idx} does not fit in an empty bin");
                unresolved.push(item_idx);
            }
            control.report_progress(order.len() - i - 1);
        }

        let outcome = SelectionOutcome {
            layouts,
            unresolved,
            cancelled,
        };
        info!(
            "[FF] placed {}/{} items in {} bins",
            outcome.n_placed().separate_with_commas(),
            order.len().separate_with_commas(),
            outcome.layouts.len()
        );
        Ok(outcome)
    }
}

/// Places the item in the first layout accepting it, or in a new one.
/// Returns false if even an empty layout rejects it.
fn place_first_fit(
    items: &[Item],
    item_idx: usize,
    bin: &Bin,
    placer: &Placer,
    layouts: &mut Vec<Layout>,
) -> Result<bool> {
    let item = &items[item_idx];
    for layout in layouts.iter_mut() {
        if let Some(c) = placer.place(item, bin, layout)? {
            debug!("[FF] placing item {item_idx} at [{}] in bin {}", c.d_transf, layout.bin_idx);
            layout.place(item_idx, item, c.d_transf);
            return Ok(true);
        }
    }

    //a strip never runs out of length, a second one will not help
    if matches!(bin, Bin::Strip { .. }) && !layouts.is_empty() {
        return Ok(false);
    }

    let mut layout = new_layout(items, layouts.len());
    match placer.place(item, bin, &layout)? {
        Some(c) => {
            debug!("[FF] placing item {item_idx} at [{}] in new bin {}", c.d_transf, layout.bin_idx);
            layout.place(item_idx, item, c.d_transf);
            layouts.push(layout);
            Ok(true)
        }
        None => Ok(false),
    }
}
