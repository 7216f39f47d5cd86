//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - model artifact read/write (`artifact`)
//! - result exports (CSV/JSON) (`export`)

pub mod artifact;
pub mod export;
pub mod ingest;

pub use artifact::*;
pub use export::*;
pub use ingest::*;
