use itertools::Itertools;

use crate::entities::{Bin, Item, PackGroup};
use crate::geometry::primitives::Rect;
use crate::io::ext_repr::{ExtBinLayout, ExtPlacedItem, ExtSolution};
use crate::io::import::EXT_ID_KEY;

/// Composes an [`ExtSolution`] from nested items and the [`PackGroup`] of the run
pub fn export_solution(items: &[Item], bin: &Bin, pack_group: &PackGroup) -> ExtSolution {
    let bins = pack_group
        .iter()
        .enumerate()
        .map(|(index, indices)| ExtBinLayout {
            index,
            placed_items: indices
                .iter()
                .map(|&i| ExtPlacedItem {
                    item_id: ext_id(items, i),
                    transformation: items[i].d_transf.into(),
                })
                .collect_vec(),
            density: density(items, bin, indices),
        })
        .collect_vec();

    let placed_area = pack_group.iter().flatten().map(|&i| items[i].area()).sum::<f64>();
    let used_area = pack_group.iter().map(|indices| used_area(items, bin, indices)).sum::<f64>();

    ExtSolution {
        bins,
        unresolved: pack_group.unresolved.iter().map(|&i| ext_id(items, i)).collect(),
        n_bins: pack_group.n_bins(),
        density: if used_area > 0.0 { placed_area / used_area } else { 0.0 },
    }
}

/// External id of an imported item, its index otherwise
pub fn ext_id(items: &[Item], idx: usize) -> u64 {
    items[idx]
        .metadata
        .get(EXT_ID_KEY)
        .and_then(|id| id.parse().ok())
        .unwrap_or(idx as u64)
}

fn used_area(items: &[Item], bin: &Bin, indices: &[usize]) -> f64 {
    let pile = indices.iter().map(|&i| items[i].bbox()).reduce(Rect::bounding_rect);
    bin.used_area(pile)
}

fn density(items: &[Item], bin: &Bin, indices: &[usize]) -> f64 {
    let used = used_area(items, bin, indices);
    match used > 0.0 {
        true => indices.iter().map(|&i| items[i].area()).sum::<f64>() / used,
        false => 0.0,
    }
}
