#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Error taxonomy for rubric loading and orchestration.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort an evaluation run before any per-submission work.
///
/// Per-submission problems (malformed code, an unreachable oracle) are never
/// surfaced through this type; they degrade into scored results instead.
#[derive(Error, Debug)]
pub enum GradingError {
    /// The rubric has the wrong shape or its weights are out of range.
    #[error("Invalid rubric configuration: {0}")]
    Configuration(String),

    /// A dimension lookup named a dimension the rubric does not define.
    #[error("No such dimension: {0}")]
    UnknownDimension(String),

    /// The requested assignment type is not one of `code`, `content`, `mixed`.
    #[error("Invalid assignment type `{0}`. Must be one of: code, content, mixed")]
    InvalidAssignmentType(String),

    /// A rubric or submission file could not be read.
    #[error("Could not read {path}: {source}")]
    Io {
        /// The path that failed.
        path:   PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A rubric document was not valid JSON.
    #[error("Could not parse rubric JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl GradingError {
    /// Returns true for errors that stem from invalid configuration rather
    /// than from the environment.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            GradingError::Configuration(_)
                | GradingError::UnknownDimension(_)
                | GradingError::InvalidAssignmentType(_)
                | GradingError::Json(_)
        )
    }
}
