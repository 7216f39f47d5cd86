//! `intern-match` library crate.
//!
//! The binary (`intern-match`) is a thin wrapper around this library so the
//! training, recommendation and matching workflows are testable without
//! spawning processes.
//!
//! Two engines live side by side:
//!
//! - a trained qualification classifier (`fit`, `models`) that scores
//!   student × company pairs and is persisted as a JSON artifact (`io`)
//! - a deterministic weighted scorer (`rank`) that ranks internship postings

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod features;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod rank;
pub mod report;
