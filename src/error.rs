//! Error types.
//!
//! Two layers:
//!
//! - `MatchError`: typed failures of the mapping engine (`fit` / `assign`).
//! - `AppError`: what the binary reports (message + process exit code).
//!
//! Exit codes used across the app:
//! - `2`: invalid input / usage (missing files, bad columns, misaligned grids)
//! - `3`: no usable data after ingest
//! - `4`: internal / engine failure

use thiserror::Error;

/// Failures raised by the curve matcher and the point assigner.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchError {
    /// Training and candidate x-grids do not line up.
    #[error("x-grid mismatch between '{training}' and '{candidate}': {detail}")]
    InputMismatch {
        training: String,
        candidate: String,
        detail: String,
    },

    /// A test point's x is not on a candidate's sample grid.
    #[error("x={x} is not on the grid of candidate '{candidate}'")]
    PointOutOfDomain { candidate: String, x: f64 },

    #[error("no candidate curves available to match '{training}'")]
    EmptyCandidatePool { training: String },

    /// A NaN or infinite value reached the engine.
    #[error("non-finite value in {context}")]
    NonFiniteValue { context: String },

    /// A fit refers to a candidate that is not part of the pool.
    #[error("candidate '{0}' is not in the pool")]
    UnknownCandidate(String),
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<MatchError> for AppError {
    fn from(err: MatchError) -> Self {
        let exit_code = match err {
            MatchError::InputMismatch { .. } | MatchError::NonFiniteValue { .. } => 2,
            MatchError::EmptyCandidatePool { .. } => 3,
            MatchError::PointOutOfDomain { .. } | MatchError::UnknownCandidate(_) => 4,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
