/// Set of functions used throughout to assure the correctness of the library.
pub mod assertions;

mod error;
mod fpa;

#[doc(inline)]
pub use error::InvalidGeometry;
#[doc(inline)]
pub use error::NestError;
#[doc(inline)]
pub use fpa::FPA;

/// Absolute tolerance used by geometric predicates
pub const GEOM_EPS: f64 = 1e-7;
