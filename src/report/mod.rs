//! Reporting utilities: formatted terminal output for a mapping run.

pub mod format;

pub use format::*;
