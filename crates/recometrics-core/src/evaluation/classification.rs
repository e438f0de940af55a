//! Binary-classification metrics over joined pairs.
//!
//! Ground-truth scores are read as labels (exactly 0 or 1) and predicted
//! scores as probabilities of the positive class.

use super::join::JoinedPair;
use super::result::{metric_names, MetricResult};
use crate::config::LOGLOSS_EPSILON;
use crate::error::{EvaluationError, Result};

fn label(pair: &JoinedPair) -> Result<bool> {
    if pair.actual == 1.0 {
        Ok(true)
    } else if pair.actual == 0.0 {
        Ok(false)
    } else {
        Err(EvaluationError::schema(
            "label",
            format!(
                "user {}, item {}: label must be 0 or 1, got {}",
                pair.user, pair.item, pair.actual
            ),
        ))
    }
}

/// Area under the ROC curve.
///
/// Uses the rank-sum formulation: predictions are ranked ascending, tied
/// scores share their average rank, and
///
/// ```text
/// AUC = (Σ rank(positive) - P(P + 1) / 2) / (P · N)
/// ```
///
/// # Errors
///
/// * [`EvaluationError::Schema`] if a label is not 0 or 1.
/// * [`EvaluationError::DegenerateLabels`] if only one class is present.
pub fn auc(pairs: &[JoinedPair]) -> Result<f64> {
    let mut scored: Vec<(f64, bool)> = pairs
        .iter()
        .map(|p| -> Result<(f64, bool)> { Ok((p.predicted, label(p)?)) })
        .collect::<Result<_>>()?;

    let positives = scored.iter().filter(|(_, positive)| *positive).count();
    let negatives = scored.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(EvaluationError::DegenerateLabels);
    }

    scored.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut positive_rank_sum = 0.0;
    let mut start = 0;
    while start < scored.len() {
        let mut end = start + 1;
        while end < scored.len() && scored[end].0 == scored[start].0 {
            end += 1;
        }
        // 1-indexed ranks start+1..=end share their mean
        let average_rank = (start + 1 + end) as f64 / 2.0;
        let tied_positives = scored[start..end].iter().filter(|(_, p)| *p).count();
        positive_rank_sum += average_rank * tied_positives as f64;
        start = end;
    }

    let p = positives as f64;
    let n = negatives as f64;
    Ok((positive_rank_sum - p * (p + 1.0) / 2.0) / (p * n))
}

/// Mean binary cross-entropy.
///
/// Probabilities are clipped to `[ε, 1 - ε]` with ε = [`LOGLOSS_EPSILON`].
///
/// # Errors
///
/// * [`EvaluationError::EmptyIntersection`] if `pairs` is empty.
/// * [`EvaluationError::Schema`] if a label is not 0 or 1.
pub fn logloss(pairs: &[JoinedPair]) -> Result<f64> {
    if pairs.is_empty() {
        return Err(EvaluationError::EmptyIntersection);
    }

    let mut total = 0.0;
    for pair in pairs {
        let p = pair.predicted.clamp(LOGLOSS_EPSILON, 1.0 - LOGLOSS_EPSILON);
        total -= if label(pair)? { p.ln() } else { (1.0 - p).ln() };
    }
    Ok(total / pairs.len() as f64)
}

/// AUC and log loss together.
pub fn classification_metrics(pairs: &[JoinedPair]) -> Result<MetricResult> {
    Ok(MetricResult::from_iter([
        (metric_names::AUC, auc(pairs)?),
        (metric_names::LOGLOSS, logloss(pairs)?),
    ]))
}
