//! Interaction file loading.
//!
//! Reads rows as loosely-typed [`RawRecord`]s; column binding and validation
//! happen in `recometrics_core::data::bind_records`.
//!
//! # Formats
//!
//! ```text
//! ratings.jsonl   # one object per line: {"userID": 1, "itemID": 3, "rating": 5.0}
//! ratings.json    # a single array of such objects
//! ratings.tsv     # header row of column names, then tab-separated values
//! ```

use clap::ValueEnum;
use recometrics_core::data::{FieldValue, RawRecord};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// On-disk layout of an interaction file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DataFormat {
    Jsonl,
    Json,
    Tsv,
}

impl DataFormat {
    /// Guesses the format from the file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "jsonl" | "ndjson" => Some(DataFormat::Jsonl),
            "json" => Some(DataFormat::Json),
            "tsv" | "tab" => Some(DataFormat::Tsv),
            _ => None,
        }
    }
}

/// Failure to turn an interaction file into rows.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no such file: {0}")]
    MissingFile(String),

    #[error("cannot infer format of {0}; pass --format")]
    UnknownFormat(String),

    /// A record that is not a JSON object of scalar cells.
    #[error("line {line}, column {column}: malformed interaction record: {message}")]
    Record {
        line: usize,
        column: usize,
        message: String,
    },

    /// A TSV row whose field count differs from the header.
    #[error("line {line}: expected {expected} tab-separated fields, got {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },
}

impl DatasetError {
    /// `line` overrides serde's own line number, which is always 1 when a
    /// JSONL row is parsed on its own.
    fn record(line: Option<usize>, e: serde_json::Error) -> Self {
        DatasetError::Record {
            line: line.unwrap_or_else(|| e.line()),
            column: e.column(),
            message: e.to_string(),
        }
    }
}

/// Loads every row of an interaction file.
///
/// `format` overrides the extension-based guess.
pub fn load_records(path: &Path, format: Option<DataFormat>) -> Result<Vec<RawRecord>, DatasetError> {
    if !path.exists() {
        return Err(DatasetError::MissingFile(path.display().to_string()));
    }

    let format = format
        .or_else(|| DataFormat::from_path(path))
        .ok_or_else(|| DatasetError::UnknownFormat(path.display().to_string()))?;

    let records = match format {
        DataFormat::Jsonl => load_jsonl(path)?,
        DataFormat::Json => load_json_array(path)?,
        DataFormat::Tsv => load_tsv(path)?,
    };

    tracing::info!(
        path = %path.display(),
        rows = records.len(),
        ?format,
        "loaded interactions"
    );
    Ok(records)
}

/// One record per non-blank line.
fn load_jsonl(path: &Path) -> Result<Vec<RawRecord>, DatasetError> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: RawRecord =
            serde_json::from_str(&line).map_err(|e| DatasetError::record(Some(idx + 1), e))?;
        records.push(normalize_ids(record));
    }

    Ok(records)
}

fn load_json_array(path: &Path) -> Result<Vec<RawRecord>, DatasetError> {
    let reader = BufReader::new(File::open(path)?);
    let records: Vec<RawRecord> =
        serde_json::from_reader(reader).map_err(|e| DatasetError::record(None, e))?;
    Ok(records.into_iter().map(normalize_ids).collect())
}

/// Retypes JSON strings holding a canonical integer (`"42"`, `"-7"`) as
/// integers, so that `"1"` in a JSON file and `1` in a TSV cell name the
/// same user or item.
///
/// Zero-padded strings such as `"007"` stay text, while the TSV reader
/// parses the cell `007` as the integer 7.
fn normalize_ids(record: RawRecord) -> RawRecord {
    record
        .into_iter()
        .map(|(column, value)| match value {
            FieldValue::Text(text) => match text.parse::<i64>() {
                Ok(v) if v.to_string() == text => (column, FieldValue::Int(v)),
                _ => (column, FieldValue::Text(text)),
            },
            other => (column, other),
        })
        .collect()
}

/// Loads a TSV file with a header row.
///
/// Cells are typed by what they parse as: empty is null, then integer,
/// then float, otherwise text.
fn load_tsv(path: &Path) -> Result<Vec<RawRecord>, DatasetError> {
    let reader = BufReader::new(File::open(path)?);
    let mut lines = reader.lines().enumerate();

    let header: Vec<String> = loop {
        match lines.next() {
            Some((_, line)) => {
                let line = line?;
                if line.trim().is_empty() || line.starts_with('#') {
                    continue;
                }
                break line.split('\t').map(|c| c.trim().to_string()).collect();
            }
            None => return Ok(Vec::new()),
        }
    };

    let mut records = Vec::new();
    for (idx, line) in lines {
        let line = line?;
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let cells: Vec<&str> = line.split('\t').collect();
        if cells.len() != header.len() {
            return Err(DatasetError::RaggedRow {
                line: idx + 1,
                expected: header.len(),
                found: cells.len(),
            });
        }

        records.push(
            header
                .iter()
                .zip(cells)
                .map(|(column, cell)| (column.clone(), parse_cell(cell)))
                .collect(),
        );
    }

    Ok(records)
}

fn parse_cell(cell: &str) -> FieldValue {
    let cell = cell.trim();
    if cell.is_empty() {
        FieldValue::Null
    } else if let Ok(v) = cell.parse::<i64>() {
        FieldValue::Int(v)
    } else if let Ok(v) = cell.parse::<f64>() {
        FieldValue::Float(v)
    } else {
        FieldValue::Text(cell.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, lines: &[&str]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    #[test]
    fn test_load_jsonl() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "truth.jsonl",
            &[
                r#"{"userID": 1, "itemID": "a", "rating": 4.5}"#,
                "",
                r#"{"userID": 2, "itemID": "b", "rating": 3}"#,
            ],
        );

        let records = load_records(&path, None).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["userID"], FieldValue::Int(1));
        assert_eq!(records[0]["itemID"], FieldValue::Text("a".to_string()));
        assert_eq!(records[0]["rating"], FieldValue::Float(4.5));
        assert_eq!(records[1]["rating"], FieldValue::Int(3));
    }

    #[test]
    fn test_load_jsonl_bad_line() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "bad.jsonl", &[r#"{"userID": 1}"#, "not json"]);

        match load_records(&path, None) {
            Err(DatasetError::Record { line, column, .. }) => {
                assert_eq!(line, 2);
                assert!(column >= 1);
            }
            other => panic!("expected Record error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_json_array_reports_position() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "preds.json",
            &["[", r#"  {"userID": 1, "itemID": 2},"#, r#"  {"userID": 1, "itemID": }"#, "]"],
        );

        match load_records(&path, None) {
            Err(DatasetError::Record { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected Record error, got {:?}", other),
        }
    }

    #[test]
    fn test_json_integer_strings_match_tsv_ids() {
        let dir = TempDir::new().unwrap();
        let json = write_file(
            &dir,
            "preds.jsonl",
            &[
                r#"{"userID": "1", "itemID": "-42", "prediction": 0.5}"#,
                r#"{"userID": "007", "itemID": "a1", "prediction": "3"}"#,
            ],
        );
        let tsv = write_file(&dir, "truth.tsv", &["userID\titemID\trating", "1\t-42\t5"]);

        let from_json = load_records(&json, None).unwrap();
        let from_tsv = load_records(&tsv, None).unwrap();
        assert_eq!(from_json[0]["userID"], from_tsv[0]["userID"]);
        assert_eq!(from_json[0]["itemID"], from_tsv[0]["itemID"]);

        assert_eq!(from_json[1]["userID"], FieldValue::Text("007".to_string()));
        assert_eq!(from_json[1]["itemID"], FieldValue::Text("a1".to_string()));
        assert_eq!(from_json[1]["prediction"], FieldValue::Int(3));
    }

    #[test]
    fn test_load_json_array_with_null() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "preds.json",
            &[r#"[{"userID": 1, "itemID": 2, "prediction": null}]"#],
        );

        let records = load_records(&path, None).unwrap();
        assert_eq!(records[0]["prediction"], FieldValue::Null);
    }

    #[test]
    fn test_load_tsv_infers_cell_types() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "truth.tsv",
            &[
                "userID\titemID\trating\ttimestamp",
                "1\tx\t5\t100",
                "u2\t7\t2.5\t",
            ],
        );

        let records = load_records(&path, None).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["rating"], FieldValue::Int(5));
        assert_eq!(records[0]["timestamp"], FieldValue::Int(100));
        assert_eq!(records[1]["userID"], FieldValue::Text("u2".to_string()));
        assert_eq!(records[1]["rating"], FieldValue::Float(2.5));
        assert_eq!(records[1]["timestamp"], FieldValue::Null);
    }

    #[test]
    fn test_load_tsv_ragged_row() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "bad.tsv",
            &["userID\titemID\trating", "# comment", "1\t2\t3", "1\t2"],
        );

        let err = load_records(&path, None).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::RaggedRow {
                line: 4,
                expected: 3,
                found: 2
            }
        ));
        assert_eq!(
            err.to_string(),
            "line 4: expected 3 tab-separated fields, got 2"
        );
    }

    #[test]
    fn test_format_override_and_unknown_extension() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "data.txt", &["userID\titemID\trating", "1\t2\t3"]);

        assert!(matches!(
            load_records(&path, None),
            Err(DatasetError::UnknownFormat(_))
        ));
        assert_eq!(load_records(&path, Some(DataFormat::Tsv)).unwrap().len(), 1);
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = load_records(&dir.path().join("absent.jsonl"), None);
        assert!(matches!(result, Err(DatasetError::MissingFile(_))));
    }
}
