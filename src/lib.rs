//! `curve-mapper` library crate.
//!
//! The binary (`cmap`) is a thin wrapper around this library so that:
//!
//! - the matching engine is testable without spawning processes
//! - ingest, export and plotting can be reused on their own
//!
//! Layout:
//!
//! - [`fit`]: choose the best candidate curve for each training curve
//! - [`assign`]: map test points onto the chosen candidates
//! - [`io`], [`report`], [`plot`]: everything around the engine

pub mod app;
pub mod assign;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub(crate) mod math;
pub mod plot;
pub mod report;
