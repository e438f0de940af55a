//! Metrics computation engine.
//!
//! Scores a recommender offline by comparing ground-truth interactions with
//! model predictions. Two independent pipelines share the same inputs:
//!
//! ```text
//! ground truth ─┐                  ┌─> join ──────> rating aggregator  ─> {rmse, mae, r2, explained_variance}
//!               ├─> InteractionSet ┤
//! predictions ──┘                  └─> relevancy ─> ranking aggregator ─> {precision, recall, ndcg, map, mrr}@k
//! ```
//!
//! # Example
//!
//! ```
//! use recometrics_core::config::{EvalConfig, RelevancyMethod};
//! use recometrics_core::data::InteractionSet;
//! use recometrics_core::evaluation::{evaluate_ranking, Sequential};
//!
//! let truth = InteractionSet::from_triples([(1, 1, 5.0), (1, 2, 4.0), (1, 3, 3.0)]).unwrap();
//! let preds = InteractionSet::from_triples([(1, 3, 14.0), (1, 10, 13.0), (1, 12, 12.0)]).unwrap();
//!
//! let config = EvalConfig::new(3, RelevancyMethod::TopK);
//! let result = evaluate_ranking(&truth, &preds, &config, &Sequential).unwrap();
//! assert!((result.get("precision_at_k").unwrap() - 1.0 / 3.0).abs() < 1e-12);
//! ```
//!
//! # Metrics Reference
//!
//! | Metric | Description | Empty case |
//! |--------|-------------|------------|
//! | RMSE / MAE | Rating error over joined pairs | `EmptyIntersection` |
//! | R² / explained variance | Variance explained by predictions | `DegenerateVariance` |
//! | P@k | Hits in top k / k | 0 |
//! | R@k | Hits in top k / relevant items | 0 |
//! | NDCG@k | Position-discounted gain, binary relevance | 0 |
//! | MAP@k | Mean over users of precision at each hit | 0 |
//! | MRR@k | Mean over users of 1 / first hit position | 0 |
//! | AUC / log loss | Binary labels vs. probabilities | `DegenerateLabels` |
//!
//! Ranking scores are averaged over every ground-truth user; users without
//! predictions or relevant items contribute 0.

pub mod classification;
pub mod engine;
pub mod join;
pub mod parallel;
pub mod ranking;
pub mod rating;
pub mod relevancy;
pub mod result;

pub use engine::{
    auc, evaluate_classification, evaluate_ranking, evaluate_rating, explained_variance,
    logloss, mae, map_at_k, ndcg_at_k, precision_at_k, ranking_metrics, rating_accumulator,
    rating_metrics, recall_at_k, rmse, rsquared,
};
pub use join::{join_pairs, JoinedPair};
pub use parallel::{Executor, RayonExecutor, Sequential};
pub use ranking::{RankingAccumulator, RankingMetrics, UserMetrics};
pub use rating::{RatingAccumulator, RatingMetrics};
pub use relevancy::{
    extract, extract_all, top_k_items, RankedList, RelevancyPolicy, RelevantSet, UserRelevancy,
};
pub use result::{metric_names, MetricResult};
