//! Reporting: plain-text summaries for the terminal.

pub mod format;

pub use format::*;
