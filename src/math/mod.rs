//! Mathematical utilities: aligned residual vectors and their norms.

pub mod residuals;

pub use residuals::*;
