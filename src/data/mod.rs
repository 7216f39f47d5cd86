//! Dataset sources.
//!
//! - `synthetic`: seeded student/company tables used to train the classifier

pub mod synthetic;

pub use synthetic::*;
