//! Ranking-quality metrics for top-k recommendation lists.
//!
//! This module implements the standard IR metrics with binary relevance:
//! - Precision@k, Recall@k
//! - NDCG@k (Normalized Discounted Cumulative Gain)
//! - MAP@k (Mean Average Precision)
//! - MRR@k (Mean Reciprocal Rank)
//!
//! Per-user values are computed by the free functions below and folded into
//! a [`RankingAccumulator`], which averages over every ground-truth user.
//! Users with no predictions or no relevant items still count in the
//! denominator and contribute 0.
//!
//! # References
//!
//! - Järvelin & Kekäläinen (2002). "Cumulated gain-based evaluation of IR techniques"
//! - Voorhees & Harman (2005). "TREC: Experiment and Evaluation in Information Retrieval"

use super::relevancy::{RankedList, RelevantSet};
use super::result::{metric_names, MetricResult};
use crate::error::{EvaluationError, Result};
use serde::Serialize;

// ============================================================================
// NDCG (Normalized Discounted Cumulative Gain)
// ============================================================================

/// Computes NDCG@k for one user.
///
/// # Formula
///
/// ```text
/// DCG@k  = Σ rel(i) / log₂(i + 1)   for i in 1..=k, rel(i) ∈ {0, 1}
/// IDCG@k = Σ 1 / log₂(i + 1)        for i in 1..=min(|relevant|, k)
/// NDCG@k = DCG@k / IDCG@k
/// ```
///
/// # Returns
///
/// NDCG between 0.0 and 1.0. Returns 0.0 when there are no relevant items.
pub fn ndcg_at_k(ranked: &RankedList, relevant: &RelevantSet, k: usize) -> f64 {
    let dcg: f64 = ranked
        .iter()
        .take(k)
        .enumerate()
        .filter(|(_, item)| relevant.contains(*item))
        .map(|(i, _)| 1.0 / discount(i + 1))
        .sum();

    let idcg: f64 = (1..=relevant.len().min(k)).map(|i| 1.0 / discount(i)).sum();

    if idcg == 0.0 {
        0.0
    } else {
        dcg / idcg
    }
}

/// Computes the discount factor for position (1-indexed).
///
/// Uses logarithmic discount: log₂(position + 1)
#[inline]
fn discount(position: usize) -> f64 {
    (position as f64 + 1.0).log2()
}

// ============================================================================
// MAP (Mean Average Precision)
// ============================================================================

/// Computes Average Precision@k for one user.
///
/// # Formula
///
/// ```text
/// AP@k = (1 / |hits|) * Σ P(i)   over hit positions i <= k
/// where P(i) is precision at cutoff i
/// ```
///
/// # Returns
///
/// Average Precision between 0.0 and 1.0. Returns 0.0 if nothing in the top k
/// is relevant.
pub fn average_precision(ranked: &RankedList, relevant: &RelevantSet, k: usize) -> f64 {
    let mut precision_sum = 0.0;
    let mut hits = 0usize;

    for (i, item) in ranked.iter().take(k).enumerate() {
        if relevant.contains(item) {
            hits += 1;
            precision_sum += hits as f64 / (i + 1) as f64;
        }
    }

    if hits == 0 {
        0.0
    } else {
        precision_sum / hits as f64
    }
}

// ============================================================================
// MRR (Mean Reciprocal Rank)
// ============================================================================

/// Computes Reciprocal Rank@k for one user: 1 / position of the first hit.
///
/// Returns 0.0 if no relevant item appears in the top k.
pub fn reciprocal_rank(ranked: &RankedList, relevant: &RelevantSet, k: usize) -> f64 {
    ranked
        .iter()
        .take(k)
        .position(|item| relevant.contains(item))
        .map(|i| 1.0 / (i + 1) as f64)
        .unwrap_or(0.0)
}

// ============================================================================
// Set-Based Metrics: Precision, Recall
// ============================================================================

fn hits_at_k(ranked: &RankedList, relevant: &RelevantSet, k: usize) -> usize {
    ranked
        .iter()
        .take(k)
        .filter(|item| relevant.contains(*item))
        .count()
}

/// Computes Precision@k: relevant items in the top k, divided by k.
///
/// The denominator is k even when fewer than k items were recommended.
pub fn precision_at_k(ranked: &RankedList, relevant: &RelevantSet, k: usize) -> f64 {
    if k == 0 {
        0.0
    } else {
        hits_at_k(ranked, relevant, k) as f64 / k as f64
    }
}

/// Computes Recall@k: fraction of relevant items found in the top k.
///
/// Returns 0.0 when the relevant set is empty.
pub fn recall_at_k(ranked: &RankedList, relevant: &RelevantSet, k: usize) -> f64 {
    if relevant.is_empty() {
        0.0
    } else {
        hits_at_k(ranked, relevant, k) as f64 / relevant.len() as f64
    }
}

// ============================================================================
// Per-user and aggregate results
// ============================================================================

/// All ranking metrics for a single user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct UserMetrics {
    pub precision: f64,
    pub recall: f64,
    pub ndcg: f64,
    pub average_precision: f64,
    pub reciprocal_rank: f64,
}

impl UserMetrics {
    /// Computes every metric for one user's ranked list and relevant set.
    pub fn compute(ranked: &RankedList, relevant: &RelevantSet, k: usize) -> Self {
        if relevant.is_empty() {
            tracing::trace!("user has an empty relevant set");
        }
        Self {
            precision: precision_at_k(ranked, relevant, k),
            recall: recall_at_k(ranked, relevant, k),
            ndcg: ndcg_at_k(ranked, relevant, k),
            average_precision: average_precision(ranked, relevant, k),
            reciprocal_rank: reciprocal_rank(ranked, relevant, k),
        }
    }
}

/// Running per-metric sums over users. Merging is associative.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RankingAccumulator {
    users: usize,
    precision: f64,
    recall: f64,
    ndcg: f64,
    average_precision: f64,
    reciprocal_rank: f64,
}

impl RankingAccumulator {
    /// Accumulator holding a single user.
    pub fn from_user(metrics: UserMetrics) -> Self {
        Self {
            users: 1,
            precision: metrics.precision,
            recall: metrics.recall,
            ndcg: metrics.ndcg,
            average_precision: metrics.average_precision,
            reciprocal_rank: metrics.reciprocal_rank,
        }
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            users: self.users + other.users,
            precision: self.precision + other.precision,
            recall: self.recall + other.recall,
            ndcg: self.ndcg + other.ndcg,
            average_precision: self.average_precision + other.average_precision,
            reciprocal_rank: self.reciprocal_rank + other.reciprocal_rank,
        }
    }

    pub fn users(&self) -> usize {
        self.users
    }

    /// Averages the sums over users.
    ///
    /// # Errors
    ///
    /// [`EvaluationError::EmptyGroundTruth`] if no user was accumulated.
    pub fn finish(&self, k: usize) -> Result<RankingMetrics> {
        if self.users == 0 {
            return Err(EvaluationError::EmptyGroundTruth);
        }
        let n = self.users as f64;
        Ok(RankingMetrics {
            k,
            users: self.users,
            precision_at_k: self.precision / n,
            recall_at_k: self.recall / n,
            ndcg_at_k: self.ndcg / n,
            map_at_k: self.average_precision / n,
            mrr_at_k: self.reciprocal_rank / n,
        })
    }
}

/// Ranking metrics averaged over ground-truth users.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RankingMetrics {
    pub k: usize,
    /// Number of ground-truth users averaged over
    pub users: usize,
    pub precision_at_k: f64,
    pub recall_at_k: f64,
    pub ndcg_at_k: f64,
    pub map_at_k: f64,
    pub mrr_at_k: f64,
}

impl From<RankingMetrics> for MetricResult {
    fn from(m: RankingMetrics) -> Self {
        MetricResult::from_iter([
            (metric_names::PRECISION_AT_K, m.precision_at_k),
            (metric_names::RECALL_AT_K, m.recall_at_k),
            (metric_names::NDCG_AT_K, m.ndcg_at_k),
            (metric_names::MAP_AT_K, m.map_at_k),
            (metric_names::MRR_AT_K, m.mrr_at_k),
        ])
    }
}

// ============================================================================
// Tests
// ============================================================================
