//! Public entry points.
//!
//! Each function takes the two validated collections (plus an [`EvalConfig`]
//! for ranking) and returns a fresh result. Nothing is cached between calls.
//! Functions taking an [`Executor`] run identically on [`Sequential`] or
//! [`RayonExecutor`](super::parallel::RayonExecutor); the single-metric
//! convenience wrappers always run sequentially.

use super::classification;
use super::join::join_pairs;
use super::parallel::{Executor, Sequential};
use super::rating::{RatingAccumulator, RatingMetrics};
use super::ranking::{RankingAccumulator, RankingMetrics, UserMetrics};
use super::relevancy::{extract, group_users, RelevancyPolicy};
use super::result::MetricResult;
use crate::config::EvalConfig;
use crate::data::InteractionSet;
use crate::error::Result;

// =============================================================================
// Rating metrics
// =============================================================================

/// Joins both collections and reduces the pairs into one accumulator.
pub fn rating_accumulator<E: Executor>(
    truth: &InteractionSet,
    predictions: &InteractionSet,
    executor: &E,
) -> Result<RatingAccumulator> {
    let pairs = join_pairs(truth, predictions)?;
    Ok(executor.map_reduce(
        &pairs,
        RatingAccumulator::default,
        RatingAccumulator::from_pair,
        RatingAccumulator::merge,
    ))
}

/// RMSE, MAE, R² and explained variance.
///
/// # Errors
///
/// [`EvaluationError::EmptyIntersection`](crate::error::EvaluationError::EmptyIntersection)
/// if no (user, item) key is shared, and
/// [`EvaluationError::DegenerateVariance`](crate::error::EvaluationError::DegenerateVariance)
/// if every joined ground-truth value is identical.
pub fn rating_metrics<E: Executor>(
    truth: &InteractionSet,
    predictions: &InteractionSet,
    executor: &E,
) -> Result<RatingMetrics> {
    let metrics = rating_accumulator(truth, predictions, executor)?.finish()?;
    tracing::debug!(
        pairs = metrics.pairs,
        rmse = metrics.rmse,
        mae = metrics.mae,
        "rating evaluation complete"
    );
    Ok(metrics)
}

/// [`rating_metrics`] as a name → value map.
pub fn evaluate_rating<E: Executor>(
    truth: &InteractionSet,
    predictions: &InteractionSet,
    executor: &E,
) -> Result<MetricResult> {
    rating_metrics(truth, predictions, executor).map(MetricResult::from)
}

pub fn rmse(truth: &InteractionSet, predictions: &InteractionSet) -> Result<f64> {
    rating_accumulator(truth, predictions, &Sequential)?.rmse()
}

pub fn mae(truth: &InteractionSet, predictions: &InteractionSet) -> Result<f64> {
    rating_accumulator(truth, predictions, &Sequential)?.mae()
}

pub fn rsquared(truth: &InteractionSet, predictions: &InteractionSet) -> Result<f64> {
    rating_accumulator(truth, predictions, &Sequential)?.rsquared()
}

pub fn explained_variance(truth: &InteractionSet, predictions: &InteractionSet) -> Result<f64> {
    rating_accumulator(truth, predictions, &Sequential)?.explained_variance()
}

// =============================================================================
// Ranking metrics
// =============================================================================

/// Precision, recall, NDCG, MAP and MRR at `config.k`, averaged over every
/// ground-truth user.
///
/// Grouping by user happens once; relevancy extraction and per-user scoring
/// run inside the executor's map step.
///
/// # Errors
///
/// [`EvaluationError::InvalidConfiguration`](crate::error::EvaluationError::InvalidConfiguration)
/// if `config` does not validate against `truth`, and
/// [`EvaluationError::EmptyGroundTruth`](crate::error::EvaluationError::EmptyGroundTruth)
/// if `truth` is empty.
pub fn ranking_metrics<E: Executor>(
    truth: &InteractionSet,
    predictions: &InteractionSet,
    config: &EvalConfig,
    executor: &E,
) -> Result<RankingMetrics> {
    let policy = RelevancyPolicy::from_config(config, truth.has_timestamps())?;
    let k = config.k;
    let groups = group_users(truth, predictions);

    let metrics = executor
        .map_reduce(
            &groups,
            RankingAccumulator::default,
            |group| {
                let (relevant, ranked) = extract(&group.truth, &group.predictions, k, policy);
                RankingAccumulator::from_user(UserMetrics::compute(&ranked, &relevant, k))
            },
            RankingAccumulator::merge,
        )
        .finish(k)?;

    tracing::debug!(
        users = metrics.users,
        k,
        relevancy = %config.relevancy,
        ndcg = metrics.ndcg_at_k,
        "ranking evaluation complete"
    );
    Ok(metrics)
}

/// [`ranking_metrics`] as a name → value map.
pub fn evaluate_ranking<E: Executor>(
    truth: &InteractionSet,
    predictions: &InteractionSet,
    config: &EvalConfig,
    executor: &E,
) -> Result<MetricResult> {
    ranking_metrics(truth, predictions, config, executor).map(MetricResult::from)
}

pub fn precision_at_k(
    truth: &InteractionSet,
    predictions: &InteractionSet,
    config: &EvalConfig,
) -> Result<f64> {
    ranking_metrics(truth, predictions, config, &Sequential).map(|m| m.precision_at_k)
}

pub fn recall_at_k(
    truth: &InteractionSet,
    predictions: &InteractionSet,
    config: &EvalConfig,
) -> Result<f64> {
    ranking_metrics(truth, predictions, config, &Sequential).map(|m| m.recall_at_k)
}

pub fn ndcg_at_k(
    truth: &InteractionSet,
    predictions: &InteractionSet,
    config: &EvalConfig,
) -> Result<f64> {
    ranking_metrics(truth, predictions, config, &Sequential).map(|m| m.ndcg_at_k)
}

pub fn map_at_k(
    truth: &InteractionSet,
    predictions: &InteractionSet,
    config: &EvalConfig,
) -> Result<f64> {
    ranking_metrics(truth, predictions, config, &Sequential).map(|m| m.map_at_k)
}

// =============================================================================
// Classification metrics
// =============================================================================

/// AUC and log loss, treating ground-truth scores as 0/1 labels and
/// predictions as probabilities.
pub fn evaluate_classification(
    truth: &InteractionSet,
    predictions: &InteractionSet,
) -> Result<MetricResult> {
    let pairs = join_pairs(truth, predictions)?;
    classification::classification_metrics(&pairs)
}

pub fn auc(truth: &InteractionSet, predictions: &InteractionSet) -> Result<f64> {
    classification::auc(&join_pairs(truth, predictions)?)
}

pub fn logloss(truth: &InteractionSet, predictions: &InteractionSet) -> Result<f64> {
    classification::logloss(&join_pairs(truth, predictions)?)
}
