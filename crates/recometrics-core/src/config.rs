//! Evaluation configuration.
//!
//! Default column names and metric parameters shared by the engine, the CLI
//! and the benchmarks, plus the validated [`EvalConfig`] consumed by ranking
//! evaluation.
//!
//! # Usage
//!
//! ```
//! use recometrics_core::config::{EvalConfig, RelevancyMethod, DEFAULT_K};
//!
//! let config = EvalConfig::new(DEFAULT_K, RelevancyMethod::ByRating).with_threshold(4.0);
//! assert!(config.validate(false).is_ok());
//! ```

use crate::error::{EvaluationError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Column Names
// =============================================================================

/// Default user column.
pub const DEFAULT_USER_COL: &str = "userID";

/// Default item column.
pub const DEFAULT_ITEM_COL: &str = "itemID";

/// Default ground-truth score column.
pub const DEFAULT_RATING_COL: &str = "rating";

/// Default prediction score column.
pub const DEFAULT_PREDICTION_COL: &str = "prediction";

/// Default timestamp column.
pub const DEFAULT_TIMESTAMP_COL: &str = "timestamp";

// =============================================================================
// Metric Parameters
// =============================================================================

/// Default cutoff for ranking metrics.
pub const DEFAULT_K: usize = 10;

/// Relative tolerance within which sequential and parallel reductions agree.
pub const REDUCTION_TOLERANCE: f64 = 1e-9;

/// Probability clip applied before taking logs in log loss.
pub const LOGLOSS_EPSILON: f64 = 1e-15;

// =============================================================================
// Relevancy
// =============================================================================

/// Rule deciding which ground-truth items count as relevant for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelevancyMethod {
    /// Every ground-truth item is relevant
    #[default]
    TopK,
    /// Ground-truth items scoring at or above the threshold are relevant
    ByRating,
    /// The k most recent ground-truth items are relevant
    ByTimestamp,
}

impl RelevancyMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelevancyMethod::TopK => "top_k",
            RelevancyMethod::ByRating => "by_rating",
            RelevancyMethod::ByTimestamp => "by_timestamp",
        }
    }
}

impl fmt::Display for RelevancyMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelevancyMethod {
    type Err = EvaluationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "top_k" => Ok(RelevancyMethod::TopK),
            "by_rating" => Ok(RelevancyMethod::ByRating),
            "by_timestamp" => Ok(RelevancyMethod::ByTimestamp),
            other => Err(EvaluationError::InvalidConfiguration(format!(
                "unknown relevancy method '{}'",
                other
            ))),
        }
    }
}

// =============================================================================
// EvalConfig
// =============================================================================

/// Parameters for ranking evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvalConfig {
    /// Cutoff; ranked lists are truncated to this length
    pub k: usize,
    #[serde(default)]
    pub relevancy: RelevancyMethod,
    /// Required iff `relevancy` is [`RelevancyMethod::ByRating`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self::new(DEFAULT_K, RelevancyMethod::TopK)
    }
}

impl EvalConfig {
    pub fn new(k: usize, relevancy: RelevancyMethod) -> Self {
        Self {
            k,
            relevancy,
            threshold: None,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Checks the configuration against the ground truth it will be applied to.
    ///
    /// `truth_has_timestamps` reports whether every ground-truth interaction
    /// carries a timestamp.
    ///
    /// # Errors
    ///
    /// [`EvaluationError::InvalidConfiguration`] if k is zero, the threshold is
    /// missing or non-finite under `by_rating`, or `by_timestamp` is selected
    /// without timestamps.
    pub fn validate(&self, truth_has_timestamps: bool) -> Result<()> {
        if self.k == 0 {
            return Err(EvaluationError::InvalidConfiguration(
                "k must be a positive integer".to_string(),
            ));
        }

        match self.relevancy {
            RelevancyMethod::ByRating => match self.threshold {
                None => Err(EvaluationError::InvalidConfiguration(
                    "by_rating requires a threshold".to_string(),
                )),
                Some(t) if !t.is_finite() => Err(EvaluationError::InvalidConfiguration(
                    format!("threshold must be finite, got {}", t),
                )),
                Some(_) => Ok(()),
            },
            RelevancyMethod::ByTimestamp if !truth_has_timestamps => {
                Err(EvaluationError::InvalidConfiguration(
                    "by_timestamp requires a timestamp column in the ground truth".to_string(),
                ))
            }
            _ => Ok(()),
        }
    }
}
