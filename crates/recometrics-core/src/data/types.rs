//! Canonical interaction records.

use crate::error::{EvaluationError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

/// User or item identifier.
///
/// Identifiers are either integers or strings. The derived ordering (all
/// integers before all strings, then natural order within a kind) is the
/// tie-break key used when scores are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    /// Numeric identifier
    Int(i64),
    /// Free-form identifier
    Text(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityId::Int(id) => write!(f, "{}", id),
            EntityId::Text(id) => write!(f, "{}", id),
        }
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        EntityId::Int(id)
    }
}

impl From<i32> for EntityId {
    fn from(id: i32) -> Self {
        EntityId::Int(i64::from(id))
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        EntityId::Text(id.to_string())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        EntityId::Text(id)
    }
}

/// Orderable event time (seconds since the Unix epoch, or any monotone unit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

/// One (user, item, score) observation, either ground truth or prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub user: EntityId,
    pub item: EntityId,
    /// Rating for ground truth, model score for predictions
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
}

impl Interaction {
    /// Creates an interaction without a timestamp.
    pub fn new(user: impl Into<EntityId>, item: impl Into<EntityId>, score: f64) -> Self {
        Self {
            user: user.into(),
            item: item.into(),
            score,
            timestamp: None,
        }
    }

    /// Attaches a timestamp.
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(Timestamp(timestamp));
        self
    }
}

/// A validated collection of interactions with unique (user, item) keys.
///
/// Construction fails on the first duplicate key or non-finite score, so
/// every downstream component can rely on both properties.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InteractionSet {
    interactions: Vec<Interaction>,
}

impl InteractionSet {
    /// Validates and wraps `interactions`.
    pub fn new(interactions: Vec<Interaction>) -> Result<Self> {
        let mut seen: HashSet<(&EntityId, &EntityId)> = HashSet::with_capacity(interactions.len());
        for interaction in &interactions {
            if !interaction.score.is_finite() {
                return Err(EvaluationError::schema(
                    "score",
                    format!(
                        "non-finite value {} for user {}, item {}",
                        interaction.score, interaction.user, interaction.item
                    ),
                ));
            }
            if !seen.insert((&interaction.user, &interaction.item)) {
                return Err(EvaluationError::DuplicateKey {
                    user: interaction.user.to_string(),
                    item: interaction.item.to_string(),
                });
            }
        }
        Ok(Self { interactions })
    }

    /// Builds a set from `(user, item, score)` triples.
    pub fn from_triples<U, I>(triples: impl IntoIterator<Item = (U, I, f64)>) -> Result<Self>
    where
        U: Into<EntityId>,
        I: Into<EntityId>,
    {
        Self::new(
            triples
                .into_iter()
                .map(|(user, item, score)| Interaction::new(user, item, score))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Interaction> {
        self.interactions.iter()
    }

    pub fn as_slice(&self) -> &[Interaction] {
        &self.interactions
    }

    /// Returns true if every interaction carries a timestamp.
    pub fn has_timestamps(&self) -> bool {
        self.interactions.iter().all(|i| i.timestamp.is_some())
    }

    /// Distinct users, in identifier order.
    pub fn users(&self) -> BTreeSet<&EntityId> {
        self.interactions.iter().map(|i| &i.user).collect()
    }

    /// Groups interactions by user, preserving input order within a user.
    pub fn group_by_user(&self) -> BTreeMap<&EntityId, Vec<&Interaction>> {
        let mut groups: BTreeMap<&EntityId, Vec<&Interaction>> = BTreeMap::new();
        for interaction in &self.interactions {
            groups.entry(&interaction.user).or_default().push(interaction);
        }
        groups
    }
}

impl<'a> IntoIterator for &'a InteractionSet {
    type Item = &'a Interaction;
    type IntoIter = std::slice::Iter<'a, Interaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.interactions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_ordering() {
        let mut ids = vec![
            EntityId::from("b"),
            EntityId::from(10),
            EntityId::from("a"),
            EntityId::from(2),
        ];
        ids.sort();
        assert_eq!(
            ids,
            vec![
                EntityId::from(2),
                EntityId::from(10),
                EntityId::from("a"),
                EntityId::from("b"),
            ]
        );
    }

    #[test]
    fn test_entity_id_deserialize_untagged() {
        let ids: Vec<EntityId> = serde_json::from_str(r#"[3, "u7"]"#).unwrap();
        assert_eq!(ids, vec![EntityId::Int(3), EntityId::Text("u7".to_string())]);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let result = InteractionSet::from_triples([(1, 1, 5.0), (1, 2, 4.0), (1, 1, 3.0)]);
        assert_eq!(
            result,
            Err(EvaluationError::DuplicateKey {
                user: "1".to_string(),
                item: "1".to_string(),
            })
        );
    }

    #[test]
    fn test_same_item_for_different_users_allowed() {
        let set = InteractionSet::from_triples([(1, 1, 5.0), (2, 1, 4.0)]).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.users().len(), 2);
    }

    #[test]
    fn test_non_finite_score_rejected() {
        let result = InteractionSet::from_triples([(1, 1, f64::NAN)]);
        assert!(matches!(result, Err(EvaluationError::Schema { .. })));
    }

    #[test]
    fn test_has_timestamps() {
        let with = InteractionSet::new(vec![
            Interaction::new(1, 1, 1.0).with_timestamp(10),
            Interaction::new(1, 2, 1.0).with_timestamp(20),
        ])
        .unwrap();
        assert!(with.has_timestamps());

        let partial = InteractionSet::new(vec![
            Interaction::new(1, 1, 1.0).with_timestamp(10),
            Interaction::new(1, 2, 1.0),
        ])
        .unwrap();
        assert!(!partial.has_timestamps());
    }

    #[test]
    fn test_group_by_user() {
        let set = InteractionSet::from_triples([(2, 5, 1.0), (1, 3, 2.0), (2, 4, 3.0)]).unwrap();
        let groups = set.group_by_user();
        let keys: Vec<_> = groups.keys().cloned().cloned().collect();
        assert_eq!(keys, vec![EntityId::from(1), EntityId::from(2)]);
        let items: Vec<_> = groups[&EntityId::from(2)]
            .iter()
            .map(|i| i.item.clone())
            .collect();
        assert_eq!(items, vec![EntityId::from(5), EntityId::from(4)]);
    }
}
