//! # rubricate
//!
//! Rubric-based grading of code and written submissions.
//!
//! Each submission is scored by a heuristic analyzer, gated on whether it
//! addresses the assignment at all, and aggregated into a curved 0-100 grade
//! with organised, learning-oriented feedback. An optional language-model
//! oracle can refine the relevance check and explain the findings; grading
//! never depends on it being reachable.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

/// Score aggregation and curving
pub mod aggregate;
/// Code submission analysis
pub mod code;
/// Environment-driven configuration
pub mod config;
/// Tunable thresholds and word lists used throughout
pub mod constants;
/// Written submission analysis
pub mod content;
/// Error taxonomy
pub mod error;
/// Feedback vocabulary and combination
pub mod feedback;
/// Optional semantic oracle
pub mod oracle;
/// Batch evaluation per assignment type
pub mod orchestrator;
/// Keyword relevance gate
pub mod relevance;
/// Rubric configuration and validation
pub mod rubric;
/// Submission records and folder loading
pub mod submission;
/// Text helpers
pub mod text;
/// Shared result records
pub mod types;

pub use aggregate::Aggregator;
pub use code::{CodeAnalyzer, CodeSubmission};
pub use config::EvaluatorConfig;
pub use content::{ContentAnalyzer, ContentGuide, ContentSubmission};
pub use error::GradingError;
pub use oracle::{OracleGate, SemanticOracle};
pub use orchestrator::{EvaluationRequest, Orchestrator, Submissions};
pub use rubric::Rubric;
pub use types::{
    AggregatedResult, Analyzer, AnalyzerResult, AssignmentType, StudentResult, Summary, Verdict,
};
