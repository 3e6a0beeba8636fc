mod bin;
mod item;
mod layout;
mod pack_group;

#[doc(inline)]
pub use bin::Bin;
#[doc(inline)]
pub use item::Item;
#[doc(inline)]
pub use layout::Layout;
#[doc(inline)]
pub use layout::PlacedItem;
#[doc(inline)]
pub use pack_group::PackGroup;
