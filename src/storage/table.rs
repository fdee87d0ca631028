use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Data file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed data file: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed data file: line {line} has {found} fields, header has {expected}")]
    TooManyFields {
        line: u64,
        found: usize,
        expected: usize,
    },

    #[error("Column '{0}' not present in data file")]
    MissingColumn(String),

    #[error("Derived column '{0}' would overwrite an existing column")]
    ColumnConflict(String),

    #[error("Background load failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Where and how to read the tabular source
#[derive(Debug, Clone)]
pub struct TableSource {
    pub path: PathBuf,
    pub delimiter: u8,
}

impl TableSource {
    pub fn new(path: impl Into<PathBuf>, delimiter: u8) -> Self {
        Self {
            path: path.into(),
            delimiter,
        }
    }

    pub fn load(&self) -> Result<TransactionTable> {
        TransactionTable::load(&self.path, self.delimiter)
    }
}

/// In-memory transaction rows. Read-only once loaded.
#[derive(Debug, Clone, Default)]
pub struct TransactionTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl TransactionTable {
    /// Load a delimited file whose first line is the header
    pub fn load(path: &Path, delimiter: u8) -> Result<Self> {
        let file = File::open(path).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound {
                path: path.to_path_buf(),
            },
            _ => StorageError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        let table = Self::from_reader(file, delimiter)?;

        info!(
            path = %path.display(),
            rows = table.len(),
            columns = table.headers.len(),
            "Loaded transaction table"
        );

        Ok(table)
    }

    /// Parse delimited text. Short rows are kept and their missing trailing
    /// cells read as null; rows longer than the header are rejected.
    pub fn from_reader<R: std::io::Read>(reader: R, delimiter: u8) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            if record.len() > headers.len() {
                return Err(StorageError::TooManyFields {
                    line: record.position().map(|p| p.line()).unwrap_or_default(),
                    found: record.len(),
                    expected: headers.len(),
                });
            }
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_index(&self, column: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| StorageError::MissingColumn(column.to_string()))
    }

    /// Group rows by `category` and count non-null `value` cells per group.
    ///
    /// Rows with an empty category are dropped. A group whose values are all
    /// empty is still reported, with a count of 0.
    pub fn group_count(&self, category: &str, value: &str) -> Result<BTreeMap<String, u64>> {
        let cat_idx = self.column_index(category)?;
        let val_idx = self.column_index(value)?;

        let mut counts = BTreeMap::new();
        for row in &self.rows {
            let Some(key) = cell(row, cat_idx) else {
                continue;
            };
            let count = counts.entry(key.to_string()).or_insert(0);
            if cell(row, val_idx).is_some() {
                *count += 1;
            }
        }
        Ok(counts)
    }

    /// First `limit` rows as JSON objects (all rows when `limit` is `None`)
    pub fn records(&self, limit: Option<usize>) -> Vec<Map<String, Value>> {
        let take = limit.unwrap_or(self.rows.len());
        self.rows
            .iter()
            .take(take)
            .map(|row| self.record(row))
            .collect()
    }

    /// Like [`records`](Self::records), with `derived` set to `value * factor`.
    /// Non-numeric or empty values produce `null`.
    pub fn records_with_derived(
        &self,
        limit: Option<usize>,
        value: &str,
        derived: &str,
        factor: f64,
    ) -> Result<Vec<Map<String, Value>>> {
        let val_idx = self.column_index(value)?;
        if self.headers.iter().any(|h| h == derived) {
            return Err(StorageError::ColumnConflict(derived.to_string()));
        }
        let take = limit.unwrap_or(self.rows.len());

        Ok(self
            .rows
            .iter()
            .take(take)
            .map(|row| {
                let mut record = self.record(row);
                let scaled = cell(row, val_idx)
                    .and_then(|v| v.parse::<f64>().ok())
                    .and_then(|v| Number::from_f64(v * factor))
                    .map(Value::Number)
                    .unwrap_or(Value::Null);
                record.insert(derived.to_string(), scaled);
                record
            })
            .collect())
    }

    fn record(&self, row: &[String]) -> Map<String, Value> {
        self.headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let value = cell(row, idx)
                    .map(|v| Value::String(v.to_string()))
                    .unwrap_or(Value::Null);
                (header.clone(), value)
            })
            .collect()
    }
}

/// Non-empty cell, if present
fn cell(row: &[String], idx: usize) -> Option<&str> {
    row.get(idx).map(String::as_str).filter(|v| !v.is_empty())
}
