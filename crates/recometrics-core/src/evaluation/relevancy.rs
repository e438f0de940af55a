//! Relevancy extraction: per-user relevant sets and ranked recommendation lists.
//!
//! For every ground-truth user the extractor derives
//!
//! - a [`RelevantSet`] from that user's ground truth, chosen by the active
//!   [`RelevancyPolicy`], and
//! - a [`RankedList`] from that user's predictions: score descending, item id
//!   ascending on ties, truncated to k.
//!
//! | Policy | Relevant set |
//! |--------|--------------|
//! | `top_k` | every ground-truth item |
//! | `by_rating` | ground-truth items with score >= threshold |
//! | `by_timestamp` | the k most recent ground-truth items |
//!
//! The item-id tie-break applies to every sort here, so repeated or parallel
//! runs always rank equal scores the same way.

use crate::config::{EvalConfig, RelevancyMethod};
use crate::data::{EntityId, Interaction, InteractionSet};
use crate::error::{EvaluationError, Result};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

/// Items judged relevant for one user. Order-insensitive.
pub type RelevantSet = HashSet<EntityId>;

/// Recommended items for one user, best first, at most k long.
pub type RankedList = Vec<EntityId>;

/// Resolved relevancy rule, with any parameter it needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RelevancyPolicy {
    TopK,
    ByRating { threshold: f64 },
    ByTimestamp,
}

impl RelevancyPolicy {
    /// Resolves and validates the policy described by `config`.
    ///
    /// # Errors
    ///
    /// [`EvaluationError::InvalidConfiguration`] as described in
    /// [`EvalConfig::validate`].
    pub fn from_config(config: &EvalConfig, truth_has_timestamps: bool) -> Result<Self> {
        config.validate(truth_has_timestamps)?;
        Ok(match config.relevancy {
            RelevancyMethod::TopK => RelevancyPolicy::TopK,
            RelevancyMethod::ByTimestamp => RelevancyPolicy::ByTimestamp,
            RelevancyMethod::ByRating => RelevancyPolicy::ByRating {
                // validate() guarantees presence
                threshold: config.threshold.ok_or_else(|| {
                    EvaluationError::InvalidConfiguration(
                        "by_rating requires a threshold".to_string(),
                    )
                })?,
            },
        })
    }
}

/// Relevant set and ranked list for one ground-truth user.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRelevancy {
    pub user: EntityId,
    pub relevant: RelevantSet,
    pub ranked: RankedList,
}

/// One user's ground truth and predictions, borrowed from the input sets.
#[derive(Debug, Clone)]
pub struct UserGroup<'a> {
    pub user: &'a EntityId,
    pub truth: Vec<&'a Interaction>,
    /// Empty when the model produced nothing for this user
    pub predictions: Vec<&'a Interaction>,
}

/// Orders by score descending, then item id ascending.
fn by_score_desc(a: &&Interaction, b: &&Interaction) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.item.cmp(&b.item))
}

/// Orders by timestamp descending (most recent first), then item id ascending.
fn by_recency_desc(a: &&Interaction, b: &&Interaction) -> Ordering {
    b.timestamp
        .cmp(&a.timestamp)
        .then_with(|| a.item.cmp(&b.item))
}

/// Ranks a user's predictions and keeps the best `k`.
///
/// Fewer than `k` predictions yield a shorter list; nothing is padded.
pub fn rank_predictions(predictions: &[&Interaction], k: usize) -> RankedList {
    let mut sorted = predictions.to_vec();
    sorted.sort_by(by_score_desc);
    sorted.into_iter().take(k).map(|p| p.item.clone()).collect()
}

/// Derives the relevant set and ranked list for a single user.
///
/// `truth` and `predictions` must both belong to the same user.
pub fn extract(
    truth: &[&Interaction],
    predictions: &[&Interaction],
    k: usize,
    policy: RelevancyPolicy,
) -> (RelevantSet, RankedList) {
    let relevant: RelevantSet = match policy {
        RelevancyPolicy::TopK => truth.iter().map(|t| t.item.clone()).collect(),
        RelevancyPolicy::ByRating { threshold } => truth
            .iter()
            .filter(|t| t.score >= threshold)
            .map(|t| t.item.clone())
            .collect(),
        RelevancyPolicy::ByTimestamp => {
            let mut recent = truth.to_vec();
            recent.sort_by(by_recency_desc);
            recent.into_iter().take(k).map(|t| t.item.clone()).collect()
        }
    };

    (relevant, rank_predictions(predictions, k))
}

/// Groups both collections by ground-truth user.
///
/// Users that appear only in the predictions are dropped: scores are averaged
/// over ground-truth users. Groups come out in user-id order.
pub fn group_users<'a>(
    truth: &'a InteractionSet,
    predictions: &'a InteractionSet,
) -> Vec<UserGroup<'a>> {
    let mut predicted = predictions.group_by_user();

    let groups: Vec<UserGroup<'a>> = truth
        .group_by_user()
        .into_iter()
        .map(|(user, truth)| UserGroup {
            user,
            truth,
            predictions: predicted.remove(user).unwrap_or_default(),
        })
        .collect();

    let missing = groups.iter().filter(|g| g.predictions.is_empty()).count();
    if missing > 0 {
        tracing::warn!(
            users = missing,
            "ground-truth users without predictions score zero"
        );
    }
    if !predicted.is_empty() {
        tracing::debug!(
            users = predicted.len(),
            "ignoring prediction users absent from ground truth"
        );
    }

    groups
}

/// Runs [`extract`] for every ground-truth user.
///
/// # Errors
///
/// [`EvaluationError::InvalidConfiguration`] if `config` does not validate
/// against `truth`.
pub fn extract_all(
    truth: &InteractionSet,
    predictions: &InteractionSet,
    config: &EvalConfig,
) -> Result<Vec<UserRelevancy>> {
    let policy = RelevancyPolicy::from_config(config, truth.has_timestamps())?;

    Ok(group_users(truth, predictions)
        .into_iter()
        .map(|group| {
            let (relevant, ranked) = extract(&group.truth, &group.predictions, config.k, policy);
            UserRelevancy {
                user: group.user.clone(),
                relevant,
                ranked,
            }
        })
        .collect())
}

/// Top-k predicted items for every user in `predictions`.
pub fn top_k_items(predictions: &InteractionSet, k: usize) -> BTreeMap<EntityId, RankedList> {
    predictions
        .group_by_user()
        .into_iter()
        .map(|(user, items)| (user.clone(), rank_predictions(&items, k)))
        .collect()
}
