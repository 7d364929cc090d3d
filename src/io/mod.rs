//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - result table exports (CSV) (`export`)
//! - run results JSON read/write (`results`)

pub mod export;
pub mod ingest;
pub mod results;

pub use export::*;
pub use ingest::*;
pub use results::*;
