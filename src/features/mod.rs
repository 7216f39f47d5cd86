//! Feature engineering for the classifier path.
//!
//! - categorical encoding (`encoder`)
//! - qualification labels for training pairs (`label`)
//! - candidate pair generation + feature layout (`candidates`)

pub mod candidates;
pub mod encoder;
pub mod label;

pub use candidates::*;
pub use encoder::*;
pub use label::*;
