//! Domain types used throughout the crate.
//!
//! This module defines:
//!
//! - input records (`StudentProfile`, `CompanyProfile`, `InternshipPosting`)
//! - the fixed feature layout (`FeatureVector`, `FEATURE_COUNT`)
//! - outputs (`Recommendation`, `MatchScore`, `MatchResult`)
//! - run configuration (`TrainConfig`, `SyntheticConfig`)

pub mod types;

pub use types::*;
