/// Set of functions to compute [convex hulls](https://en.wikipedia.org/wiki/Convex_hull)
pub mod convex_hull;

mod d_transformation;

/// Set of enums representing various geometric properties
pub mod geo_enums;

/// Set of traits representing various geometric properties & operations
pub mod geo_traits;

/// Bridge to the `geo` crate: boolean operations, overlap and clearance predicates
pub mod kernel;

/// No-fit and inner-fit polygons
pub mod nfp;

/// Set of geometric primitives - atomic building blocks for the geometry module
pub mod primitives;

mod transformation;

#[doc(inline)]
pub use d_transformation::DTransformation;

#[doc(inline)]
pub use transformation::Transformation;
