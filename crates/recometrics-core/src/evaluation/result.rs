//! Named scalar results.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Keys used in [`MetricResult`] maps.
pub mod metric_names {
    pub const RMSE: &str = "rmse";
    pub const MAE: &str = "mae";
    pub const R2: &str = "r2";
    pub const EXPLAINED_VARIANCE: &str = "explained_variance";

    pub const PRECISION_AT_K: &str = "precision_at_k";
    pub const RECALL_AT_K: &str = "recall_at_k";
    pub const NDCG_AT_K: &str = "ndcg_at_k";
    pub const MAP_AT_K: &str = "map_at_k";
    pub const MRR_AT_K: &str = "mrr_at_k";

    pub const AUC: &str = "auc";
    pub const LOGLOSS: &str = "logloss";
}

/// Mapping from metric name to value; the engine's only output.
///
/// Immutable once built. Iteration is in name order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricResult(BTreeMap<String, f64>);

impl MetricResult {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Combines two results; `other` wins on a name clash.
    pub fn merged(mut self, other: MetricResult) -> MetricResult {
        self.0.extend(other.0);
        self
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for MetricResult {
    fn from_iter<T: IntoIterator<Item = (K, f64)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl fmt::Display for MetricResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.0 {
            writeln!(f, "{:<20} {:.6}", name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_and_order() {
        let result = MetricResult::from_iter([("mae", 1.5), ("rmse", 2.0)]);
        assert_eq!(result.get(metric_names::RMSE), Some(2.0));
        assert_eq!(result.get("missing"), None);
        assert_eq!(result.names().collect::<Vec<_>>(), vec!["mae", "rmse"]);
    }

    #[test]
    fn test_merged() {
        let a = MetricResult::from_iter([("rmse", 1.0)]);
        let b = MetricResult::from_iter([("ndcg_at_k", 0.5)]);
        let merged = a.merged(b);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.get("ndcg_at_k"), Some(0.5));
    }

    #[test]
    fn test_serializes_as_flat_map() {
        let result = MetricResult::from_iter([("rmse", 0.25)]);
        assert_eq!(serde_json::to_string(&result).unwrap(), r#"{"rmse":0.25}"#);
    }
}
