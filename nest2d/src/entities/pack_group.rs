/// Result of a nesting run: for each bin, the indices of the items it holds.
///
/// Indices refer to the item collection passed to [`nest`](crate::nest).
/// Disallowed areas never appear in a bin.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackGroup {
    pub bins: Vec<Vec<usize>>,
    /// Placeable items that ended up in no bin
    pub unresolved: Vec<usize>,
}

impl PackGroup {
    pub fn n_bins(&self) -> usize {
        self.bins.len()
    }

    pub fn bin(&self, idx: usize) -> Option<&[usize]> {
        self.bins.get(idx).map(|b| b.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &[usize]> {
        self.bins.iter().map(|b| b.as_slice())
    }

    /// The bin holding `item_idx`, if any
    pub fn bin_of(&self, item_idx: usize) -> Option<usize> {
        self.bins.iter().position(|b| b.contains(&item_idx))
    }

    pub fn n_placed(&self) -> usize {
        self.bins.iter().map(|b| b.len()).sum()
    }
}
