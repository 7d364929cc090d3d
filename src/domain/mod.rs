//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - curves and the collections they are grouped into (`Curve`, `TrainingSet`, `CandidatePool`)
//! - engine outputs (`FitResult`, `AssignmentResult`)
//! - run configuration (`RunConfig`, `PoolPolicy`)

pub mod types;

pub use types::*;
