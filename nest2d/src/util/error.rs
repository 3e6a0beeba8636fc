use thiserror::Error;

/// Malformed input geometry. Raised instead of attempting a best-effort repair.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidGeometry {
    #[error("polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    #[error("polygon contains a non-finite coordinate")]
    NonFinite,
    #[error("polygon contains a duplicate vertex at ({0}, {1})")]
    DuplicateVertex(f64, f64),
    #[error("polygon has no area")]
    ZeroArea,
    #[error("polygon is self-intersecting between edges {0} and {1}")]
    SelfIntersecting(usize, usize),
    #[error("hole {0} is not contained in the outer boundary")]
    HoleOutsideContour(usize),
    #[error("invalid bin: {0}")]
    InvalidBin(String),
}

/// Invalid arguments to a nesting run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NestError {
    #[error("item {0} is fixed but has no bin assigned")]
    FixedItemWithoutBin(usize),
    #[error("item {item} references bin {bin_id}, but a run over {n_items} items never uses that many bins")]
    BinIdOutOfRange { item: usize, bin_id: usize, n_items: usize },
    #[error("spacing must be finite and non-negative, got {0}")]
    InvalidSpacing(f64),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
