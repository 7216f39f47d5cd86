//! Serving-side ranking.
//!
//! Two independent paths:
//! - `recommend`: classifier probabilities per company, thresholded
//! - `matching`: deterministic weighted score per internship posting

pub mod matching;
pub mod recommend;

pub use matching::*;
pub use recommend::*;
