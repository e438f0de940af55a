//! Inner join of ground truth and predictions on (user, item).

use crate::data::{EntityId, InteractionSet};
use crate::error::{EvaluationError, Result};
use std::collections::HashMap;

/// Ground-truth and predicted score for one (user, item) key.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedPair {
    pub user: EntityId,
    pub item: EntityId,
    pub actual: f64,
    pub predicted: f64,
}

impl JoinedPair {
    /// `actual - predicted`
    #[inline]
    pub fn residual(&self) -> f64 {
        self.actual - self.predicted
    }
}

/// Pairs every ground-truth interaction with the prediction for the same key.
///
/// Keys present on only one side are dropped. Pairs come out in ground-truth
/// order, so the result is deterministic for a given input.
///
/// # Errors
///
/// [`EvaluationError::EmptyIntersection`] if no key is shared.
pub fn join_pairs(truth: &InteractionSet, predictions: &InteractionSet) -> Result<Vec<JoinedPair>> {
    let predicted: HashMap<(&EntityId, &EntityId), f64> = predictions
        .iter()
        .map(|p| ((&p.user, &p.item), p.score))
        .collect();

    let pairs: Vec<JoinedPair> = truth
        .iter()
        .filter_map(|t| {
            predicted
                .get(&(&t.user, &t.item))
                .map(|&predicted| JoinedPair {
                    user: t.user.clone(),
                    item: t.item.clone(),
                    actual: t.score,
                    predicted,
                })
        })
        .collect();

    tracing::debug!(
        truth = truth.len(),
        predictions = predictions.len(),
        joined = pairs.len(),
        "joined ground truth with predictions"
    );

    if pairs.is_empty() {
        return Err(EvaluationError::EmptyIntersection);
    }
    Ok(pairs)
}
