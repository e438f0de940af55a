//! Schema binding: raw rows to canonical [`Interaction`]s.
//!
//! Loaders hand the engine loosely-typed rows keyed by source column name.
//! [`bind_records`] looks up the configured columns, checks each value has the
//! right kind, and produces a validated [`InteractionSet`].

use super::types::{EntityId, Interaction, InteractionSet, Timestamp};
use crate::config::{
    DEFAULT_ITEM_COL, DEFAULT_PREDICTION_COL, DEFAULT_RATING_COL, DEFAULT_TIMESTAMP_COL,
    DEFAULT_USER_COL,
};
use crate::error::{EvaluationError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single loosely-typed cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

/// One input row, keyed by source column name.
pub type RawRecord = BTreeMap<String, FieldValue>;

/// Maps canonical fields to source column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    pub user: String,
    pub item: String,
    pub score: String,
    /// Timestamp column; `None` when the collection carries no event time
    pub timestamp: Option<String>,
}

impl ColumnMap {
    /// Default columns for a ground-truth collection.
    pub fn ground_truth() -> Self {
        Self {
            user: DEFAULT_USER_COL.to_string(),
            item: DEFAULT_ITEM_COL.to_string(),
            score: DEFAULT_RATING_COL.to_string(),
            timestamp: None,
        }
    }

    /// Default columns for a prediction collection.
    pub fn predictions() -> Self {
        Self {
            score: DEFAULT_PREDICTION_COL.to_string(),
            ..Self::ground_truth()
        }
    }

    pub fn with_user(mut self, column: impl Into<String>) -> Self {
        self.user = column.into();
        self
    }

    pub fn with_item(mut self, column: impl Into<String>) -> Self {
        self.item = column.into();
        self
    }

    pub fn with_score(mut self, column: impl Into<String>) -> Self {
        self.score = column.into();
        self
    }

    pub fn with_timestamp(mut self, column: impl Into<String>) -> Self {
        self.timestamp = Some(column.into());
        self
    }

    /// Binds the default timestamp column name.
    pub fn with_default_timestamp(self) -> Self {
        self.with_timestamp(DEFAULT_TIMESTAMP_COL)
    }
}

/// Binds raw rows to a validated [`InteractionSet`].
///
/// # Errors
///
/// * [`EvaluationError::Schema`] if a mapped column is missing from a row or
///   holds a value of the wrong kind (identifiers must be integers or strings,
///   scores numeric and finite, timestamps integers).
/// * [`EvaluationError::DuplicateKey`] if a (user, item) key repeats.
pub fn bind_records(rows: &[RawRecord], columns: &ColumnMap) -> Result<InteractionSet> {
    let mut interactions = Vec::with_capacity(rows.len());

    for (row_num, row) in rows.iter().enumerate() {
        let user = bind_id(row, &columns.user, row_num)?;
        let item = bind_id(row, &columns.item, row_num)?;
        let score = bind_score(row, &columns.score, row_num)?;
        let timestamp = match &columns.timestamp {
            Some(column) => Some(bind_timestamp(row, column, row_num)?),
            None => None,
        };

        interactions.push(Interaction {
            user,
            item,
            score,
            timestamp,
        });
    }

    tracing::debug!(rows = rows.len(), "bound interaction rows");
    InteractionSet::new(interactions)
}

/// Whether any row carries a non-null value under `column`.
///
/// Callers use this to tell a column that is absent from the whole file
/// (a configuration problem) from one that is missing in individual rows.
pub fn has_column(rows: &[RawRecord], column: &str) -> bool {
    rows.iter()
        .any(|row| !matches!(row.get(column), None | Some(FieldValue::Null)))
}

fn lookup<'a>(row: &'a RawRecord, column: &str, row_num: usize) -> Result<&'a FieldValue> {
    match row.get(column) {
        None | Some(FieldValue::Null) => Err(EvaluationError::schema(
            column,
            format!("missing in row {}", row_num + 1),
        )),
        Some(value) => Ok(value),
    }
}

fn bind_id(row: &RawRecord, column: &str, row_num: usize) -> Result<EntityId> {
    match lookup(row, column, row_num)? {
        FieldValue::Int(id) => Ok(EntityId::Int(*id)),
        FieldValue::Text(id) => Ok(EntityId::Text(id.clone())),
        other => Err(EvaluationError::schema(
            column,
            format!(
                "row {}: identifier must be an integer or string, got {:?}",
                row_num + 1,
                other
            ),
        )),
    }
}

fn bind_score(row: &RawRecord, column: &str, row_num: usize) -> Result<f64> {
    let score = match lookup(row, column, row_num)? {
        FieldValue::Int(v) => *v as f64,
        FieldValue::Float(v) => *v,
        other => {
            return Err(EvaluationError::schema(
                column,
                format!("row {}: score must be numeric, got {:?}", row_num + 1, other),
            ))
        }
    };
    if !score.is_finite() {
        return Err(EvaluationError::schema(
            column,
            format!("row {}: score must be finite", row_num + 1),
        ));
    }
    Ok(score)
}

fn bind_timestamp(row: &RawRecord, column: &str, row_num: usize) -> Result<Timestamp> {
    match lookup(row, column, row_num)? {
        FieldValue::Int(v) => Ok(Timestamp(*v)),
        other => Err(EvaluationError::schema(
            column,
            format!(
                "row {}: timestamp must be an integer, got {:?}",
                row_num + 1,
                other
            ),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[(&str, FieldValue)]) -> RawRecord {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_bind_default_ground_truth_columns() {
        let rows = vec![
            row(&[
                ("userID", FieldValue::Int(1)),
                ("itemID", FieldValue::Int(3)),
                ("rating", FieldValue::Int(5)),
            ]),
            row(&[
                ("userID", FieldValue::Text("u2".to_string())),
                ("itemID", FieldValue::Int(4)),
                ("rating", FieldValue::Float(3.5)),
            ]),
        ];

        let set = bind_records(&rows, &ColumnMap::ground_truth()).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.as_slice()[0].score, 5.0);
        assert_eq!(set.as_slice()[1].user, EntityId::from("u2"));
        assert!(set.as_slice()[1].timestamp.is_none());
    }

    #[test]
    fn test_bind_renamed_columns() {
        let rows = vec![row(&[
            ("UserId", FieldValue::Int(1)),
            ("ItemId", FieldValue::Int(3)),
            ("Score", FieldValue::Float(0.7)),
            ("ts", FieldValue::Int(1_700_000_000)),
        ])];
        let columns = ColumnMap::predictions()
            .with_user("UserId")
            .with_item("ItemId")
            .with_score("Score")
            .with_timestamp("ts");

        let set = bind_records(&rows, &columns).unwrap();
        assert_eq!(set.as_slice()[0].timestamp, Some(Timestamp(1_700_000_000)));
        assert!(set.has_timestamps());
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let rows = vec![row(&[
            ("userID", FieldValue::Int(1)),
            ("itemID", FieldValue::Int(3)),
        ])];
        let err = bind_records(&rows, &ColumnMap::predictions()).unwrap_err();
        assert_eq!(
            err,
            EvaluationError::schema("prediction", "missing in row 1")
        );
    }

    #[test]
    fn test_has_column() {
        let rows = vec![
            row(&[("userID", FieldValue::Int(1)), ("timestamp", FieldValue::Null)]),
            row(&[("userID", FieldValue::Int(2))]),
        ];
        assert!(has_column(&rows, "userID"));
        assert!(!has_column(&rows, "timestamp"));
        assert!(!has_column(&[], "userID"));

        let mut rows = rows;
        rows[1].insert("timestamp".to_string(), FieldValue::Int(100));
        assert!(has_column(&rows, "timestamp"));
    }

    #[test]
    fn test_null_counts_as_missing() {
        let rows = vec![row(&[
            ("userID", FieldValue::Int(1)),
            ("itemID", FieldValue::Null),
            ("rating", FieldValue::Int(5)),
        ])];
        assert!(matches!(
            bind_records(&rows, &ColumnMap::ground_truth()),
            Err(EvaluationError::Schema { column, .. }) if column == "itemID"
        ));
    }

    #[test]
    fn test_text_score_rejected() {
        let rows = vec![row(&[
            ("userID", FieldValue::Int(1)),
            ("itemID", FieldValue::Int(3)),
            ("rating", FieldValue::Text("five".to_string())),
        ])];
        assert!(matches!(
            bind_records(&rows, &ColumnMap::ground_truth()),
            Err(EvaluationError::Schema { .. })
        ));
    }

    #[test]
    fn test_float_identifier_rejected() {
        let rows = vec![row(&[
            ("userID", FieldValue::Float(1.5)),
            ("itemID", FieldValue::Int(3)),
            ("rating", FieldValue::Int(5)),
        ])];
        assert!(matches!(
            bind_records(&rows, &ColumnMap::ground_truth()),
            Err(EvaluationError::Schema { column, .. }) if column == "userID"
        ));
    }

    #[test]
    fn test_duplicate_rows_rejected() {
        let r = row(&[
            ("userID", FieldValue::Int(1)),
            ("itemID", FieldValue::Int(3)),
            ("rating", FieldValue::Int(5)),
        ]);
        let rows = vec![r.clone(), r];
        assert!(matches!(
            bind_records(&rows, &ColumnMap::ground_truth()),
            Err(EvaluationError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn test_raw_record_from_json() {
        let rows: Vec<RawRecord> = serde_json::from_str(
            r#"[{"userID": 1, "itemID": "i9", "rating": 4.5, "timestamp": null}]"#,
        )
        .unwrap();
        assert_eq!(rows[0]["userID"], FieldValue::Int(1));
        assert_eq!(rows[0]["itemID"], FieldValue::Text("i9".to_string()));
        assert_eq!(rows[0]["rating"], FieldValue::Float(4.5));
        assert_eq!(rows[0]["timestamp"], FieldValue::Null);
    }
}
