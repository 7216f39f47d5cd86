//! Classifier training and selection.
//!
//! - seeded hold-out split (`split`)
//! - candidate training + accuracy-based selection (`selection`)

pub mod selection;
pub mod split;

pub use selection::*;
pub use split::*;
