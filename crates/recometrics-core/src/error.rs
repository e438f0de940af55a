//! Error types for recometrics-core.
//!
//! Every failure the engine can report is a variant of [`EvaluationError`].
//! Errors are raised to the caller as-is: computation is deterministic, so
//! nothing is retried and no partial result is ever returned.

use thiserror::Error;

/// Convenience alias used throughout the engine.
pub type Result<T> = std::result::Result<T, EvaluationError>;

/// Errors that can occur while binding inputs or computing metrics.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    /// A required column is absent or holds a value of the wrong kind
    #[error("Schema error on column '{column}': {reason}")]
    Schema {
        /// Source column name
        column: String,
        /// What was wrong with it
        reason: String,
    },
    /// The same (user, item) key appears twice in one collection
    #[error("Duplicate key: user {user}, item {item}")]
    DuplicateKey {
        /// User half of the duplicated key
        user: String,
        /// Item half of the duplicated key
        item: String,
    },
    /// Ground truth and predictions share no (user, item) key
    #[error("Ground truth and predictions have no (user, item) pair in common")]
    EmptyIntersection,
    /// Configuration is unusable for the requested evaluation
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// Ground-truth values have zero variance
    #[error("Cannot compute {metric}: ground-truth values have zero variance")]
    DegenerateVariance {
        /// Metric that could not be computed
        metric: &'static str,
    },
    /// Ranking evaluation was asked to average over zero users
    #[error("Ground truth contains no users")]
    EmptyGroundTruth,
    /// Only one label class is present, so AUC is undefined
    #[error("AUC requires both positive and negative labels")]
    DegenerateLabels,
}

impl EvaluationError {
    /// Builds a [`EvaluationError::Schema`] for `column`.
    pub fn schema(column: impl Into<String>, reason: impl Into<String>) -> Self {
        EvaluationError::Schema {
            column: column.into(),
            reason: reason.into(),
        }
    }
}
