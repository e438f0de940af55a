//! Rating-error metrics over joined (actual, predicted) pairs.
//!
//! | Metric | Definition |
//! |--------|------------|
//! | RMSE | `sqrt(mean((actual - predicted)²))` |
//! | MAE | `mean(|actual - predicted|)` |
//! | R² | `1 - SS_res / SS_tot` |
//! | Explained variance | `1 - Var(actual - predicted) / Var(actual)` |
//!
//! All four come from one pass over the pairs. Each pair becomes a
//! [`RatingAccumulator`]; accumulators merge associatively, with mean and
//! second moment combined by Chan's parallel update so large partitions stay
//! numerically stable.
//!
//! R² and explained variance are undefined when every actual value is the
//! same; both fail with [`EvaluationError::DegenerateVariance`] instead of
//! dividing by zero.

use super::join::JoinedPair;
use super::result::{metric_names, MetricResult};
use crate::error::{EvaluationError, Result};
use serde::Serialize;

/// Count, mean and sum of squared deviations of a sample.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Moments {
    count: u64,
    mean: f64,
    m2: f64,
}

impl Moments {
    pub fn of(value: f64) -> Self {
        Self {
            count: 1,
            mean: value,
            m2: 0.0,
        }
    }

    /// Chan et al. pairwise combination.
    pub fn merge(self, other: Self) -> Self {
        if self.count == 0 {
            return other;
        }
        if other.count == 0 {
            return self;
        }
        let count = self.count + other.count;
        let delta = other.mean - self.mean;
        let n_a = self.count as f64;
        let n_b = other.count as f64;
        let n = count as f64;
        Self {
            count,
            mean: self.mean + delta * n_b / n,
            m2: self.m2 + other.m2 + delta * delta * n_a * n_b / n,
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Σ (x - mean)²
    pub fn sum_squared_deviations(&self) -> f64 {
        self.m2
    }

    /// Population variance; 0.0 for an empty sample.
    pub fn variance(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.m2 / self.count as f64
        }
    }
}

/// Mergeable running state for the rating metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RatingAccumulator {
    sum_abs_error: f64,
    sum_squared_error: f64,
    actual: Moments,
    residual: Moments,
}

impl RatingAccumulator {
    /// Accumulator holding a single pair.
    pub fn from_pair(pair: &JoinedPair) -> Self {
        let residual = pair.residual();
        Self {
            sum_abs_error: residual.abs(),
            sum_squared_error: residual * residual,
            actual: Moments::of(pair.actual),
            residual: Moments::of(residual),
        }
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            sum_abs_error: self.sum_abs_error + other.sum_abs_error,
            sum_squared_error: self.sum_squared_error + other.sum_squared_error,
            actual: self.actual.merge(other.actual),
            residual: self.residual.merge(other.residual),
        }
    }

    /// Number of pairs accumulated.
    pub fn count(&self) -> u64 {
        self.actual.count
    }

    fn non_empty(&self) -> Result<f64> {
        if self.count() == 0 {
            Err(EvaluationError::EmptyIntersection)
        } else {
            Ok(self.count() as f64)
        }
    }

    pub fn rmse(&self) -> Result<f64> {
        let n = self.non_empty()?;
        Ok((self.sum_squared_error / n).sqrt())
    }

    pub fn mae(&self) -> Result<f64> {
        let n = self.non_empty()?;
        Ok(self.sum_abs_error / n)
    }

    /// Coefficient of determination.
    pub fn rsquared(&self) -> Result<f64> {
        self.non_empty()?;
        let ss_tot = self.actual.sum_squared_deviations();
        if ss_tot == 0.0 {
            return Err(EvaluationError::DegenerateVariance {
                metric: metric_names::R2,
            });
        }
        Ok(1.0 - self.sum_squared_error / ss_tot)
    }

    pub fn explained_variance(&self) -> Result<f64> {
        self.non_empty()?;
        let var_actual = self.actual.variance();
        if var_actual == 0.0 {
            return Err(EvaluationError::DegenerateVariance {
                metric: metric_names::EXPLAINED_VARIANCE,
            });
        }
        Ok(1.0 - self.residual.variance() / var_actual)
    }

    /// All four metrics; fails if any one of them cannot be computed.
    pub fn finish(&self) -> Result<RatingMetrics> {
        Ok(RatingMetrics {
            pairs: self.count(),
            rmse: self.rmse()?,
            mae: self.mae()?,
            r2: self.rsquared()?,
            explained_variance: self.explained_variance()?,
        })
    }
}

/// Rating metrics over one joined pair set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingMetrics {
    /// Number of joined pairs
    pub pairs: u64,
    pub rmse: f64,
    pub mae: f64,
    pub r2: f64,
    pub explained_variance: f64,
}

impl From<RatingMetrics> for MetricResult {
    fn from(m: RatingMetrics) -> Self {
        MetricResult::from_iter([
            (metric_names::RMSE, m.rmse),
            (metric_names::MAE, m.mae),
            (metric_names::R2, m.r2),
            (metric_names::EXPLAINED_VARIANCE, m.explained_variance),
        ])
    }
}
