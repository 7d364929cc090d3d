//! Test-point assignment against the chosen candidate curves.
//!
//! - exact x lookups on a candidate grid (`lookup`)
//! - the deviation rule and per-point classification (`assigner`)
//! - matched/unmatched counts for reporting (`summary`)

pub mod assigner;
pub mod lookup;
pub mod summary;

pub use assigner::*;
pub use lookup::*;
pub use summary::*;
