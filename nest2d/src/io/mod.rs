/// External (serializable) representations of instances and solutions
pub mod ext_repr;

/// Conversion of external representations into items and bins
pub mod import;

/// Conversion of nested items into an external solution
pub mod export;
