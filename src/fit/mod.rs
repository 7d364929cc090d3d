//! Best-fit selection of candidate curves.
//!
//! Responsibilities:
//!
//! - match one training curve against the candidate pool (least squares)
//! - run the matcher for a whole training set (parallel or exclusive)
//! - rank the resulting fits for reporting

pub mod matcher;
pub mod selection;

pub use matcher::*;
pub use selection::*;
