//! Placement and selection core for 2D irregular nesting.
//!
//! Items (polygons with holes) are assigned to bins (boxes, circles or strips) by a
//! [`selection`] strategy, which asks a [`placer`] for a feasible transformation per item.

/// Entities modelling items, bins and their per-bin layouts
pub mod entities;

/// Geometric primitives, no-fit polygons and the boolean-ops bridge
pub mod geometry;

/// Importing instances into and exporting solutions out of this library
pub mod io;

/// Nest controller: the entry point of a nesting run
pub mod nester;

/// Derivative-free local optimization
pub mod opt;

/// Strategies computing a feasible position for a single item inside a bin
pub mod placer;

/// Strategies ordering items and assigning them to bins
pub mod selection;

/// Helper functions which do not belong to any specific module
pub mod util;

#[doc(inline)]
pub use nester::{NestConfig, NestControl, nest, nest_count};
