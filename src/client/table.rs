use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt::Write;

/// Tabular view of a dashboard response, ready to render
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Two-column table from a category -> count mapping
    pub fn from_counts(counts: &BTreeMap<String, u64>) -> Self {
        Self {
            columns: vec!["category".to_string(), "count".to_string()],
            rows: counts
                .iter()
                .map(|(category, count)| vec![category.clone(), count.to_string()])
                .collect(),
        }
    }

    /// Table from row objects. Columns follow first appearance.
    pub fn from_records(records: &[Map<String, Value>]) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|col| match record.get(col) {
                        None | Some(Value::Null) => String::new(),
                        Some(Value::String(s)) => s.clone(),
                        Some(other) => other.to_string(),
                    })
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    /// Sum of the numeric cells in `column`, skipping blanks
    pub fn total(&self, column: &str) -> Option<f64> {
        let idx = self.columns.iter().position(|c| c == column)?;
        Some(
            self.rows
                .iter()
                .filter_map(|row| row.get(idx)?.parse::<f64>().ok())
                .sum(),
        )
    }

    /// Aligned plain-text rendering
    pub fn render(&self) -> String {
        if self.columns.is_empty() {
            return "(no data)\n".to_string();
        }

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(idx, col)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(idx))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(col.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        write_line(&mut out, &self.columns, &widths);
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_line(&mut out, &rule, &widths);
        for row in &self.rows {
            write_line(&mut out, row, &widths);
        }
        out
    }
}

fn write_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(idx, width)| {
            let cell = cells.get(idx).map(String::as_str).unwrap_or("");
            format!("{:<width$}", cell, width = *width)
        })
        .collect();
    let _ = writeln!(out, "{}", line.join(" | ").trim_end());
}
