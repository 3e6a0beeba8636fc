use std::sync::Arc;

use crate::entities::{Bin, Item};
use crate::geometry::geo_traits::{Shape, Transformable};
use crate::geometry::primitives::{NSPolygon, Point, Rect};
use crate::geometry::{DTransformation, Transformation};

/// An [`Item`] placed in a [`Layout`], with its transformed geometry cached
#[derive(Clone, Debug)]
pub struct PlacedItem {
    /// Index of the item in the collection being nested
    pub item_idx: usize,
    pub d_transf: DTransformation,
    /// Shape of the item after the transformation
    pub shape: Arc<NSPolygon>,
    /// Convex hull of `shape`
    pub hull: Arc<[Point]>,
    pub fixed: bool,
    pub disallowed: bool,
}

impl PlacedItem {
    pub fn new(item_idx: usize, item: &Item, d_transf: DTransformation) -> Self {
        let shape = item.shape_at(&d_transf);
        let hull = shape.convex_hull().into();
        PlacedItem {
            item_idx,
            d_transf,
            shape: Arc::new(shape),
            hull,
            fixed: item.fixed,
            disallowed: item.disallowed,
        }
    }

    pub fn bbox(&self) -> Rect {
        self.shape.bbox()
    }

    pub fn is_movable(&self) -> bool {
        !self.fixed && !self.disallowed
    }
}

/// Contents of a single bin while it is being filled
#[derive(Clone, Debug)]
pub struct Layout {
    /// Index of the bin in the resulting [`PackGroup`](crate::entities::PackGroup)
    pub bin_idx: usize,
    pub placed_items: Vec<PlacedItem>,
}

impl Layout {
    pub fn new(bin_idx: usize) -> Self {
        Layout {
            bin_idx,
            placed_items: vec![],
        }
    }

    pub fn place(&mut self, item_idx: usize, item: &Item, d_transf: DTransformation) {
        self.placed_items
            .push(PlacedItem::new(item_idx, item, d_transf));
    }

    /// Bounding box of all parts in the layout, disallowed areas excluded
    pub fn pile_bbox(&self) -> Option<Rect> {
        self.placed_items
            .iter()
            .filter(|pi| !pi.disallowed)
            .map(|pi| pi.bbox())
            .reduce(Rect::bounding_rect)
    }

    /// Area of all parts in the layout, disallowed areas excluded
    pub fn placed_area(&self) -> f64 {
        self.placed_items
            .iter()
            .filter(|pi| !pi.disallowed)
            .map(|pi| pi.shape.area())
            .sum()
    }

    /// Fraction of the bin occupied by parts and disallowed areas
    pub fn fill_ratio(&self, bin: &Bin) -> f64 {
        let occupied = self.placed_items.iter().map(|pi| pi.shape.area()).sum::<f64>();
        match bin.area() {
            Some(area) => occupied / area,
            None => {
                let used = bin.used_area(self.pile_bbox());
                if used > 0.0 { occupied / used } else { 0.0 }
            }
        }
    }

    /// Rigidly translates every movable item
    pub fn translate_pile(&mut self, (dx, dy): (f64, f64)) {
        let t = Transformation::from_translation((dx, dy));
        for pi in self.placed_items.iter_mut().filter(|pi| pi.is_movable()) {
            pi.d_transf = pi.d_transf.shifted((dx, dy));
            pi.shape = Arc::new(pi.shape.transform_clone(&t));
            pi.hull = pi.hull.iter().map(|p| p.translate((dx, dy))).collect();
        }
    }

    pub fn has_fixed_content(&self) -> bool {
        self.placed_items.iter().any(|pi| !pi.is_movable())
    }

    /// Indices of the items in this layout that are not disallowed areas
    pub fn item_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.placed_items
            .iter()
            .filter(|pi| !pi.disallowed)
            .map(|pi| pi.item_idx)
    }

    pub fn n_movable(&self) -> usize {
        self.placed_items.iter().filter(|pi| pi.is_movable()).count()
    }
}
