//! Frequency report
//!
//! For every source column, the distinct raw cell values and how often each
//! occurred, in first-seen order. Meant for people checking the corpus by
//! eye, nothing reads it back.

use crate::fields::ColumnMap;
use prag_common::Result;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

const BANNER: &str = "=============================";
/// Stand-in for an empty cell
const EMPTY_VALUE: &str = "■";

#[derive(Debug, Default, Clone)]
struct Tally {
    index: HashMap<String, usize>,
    values: Vec<(String, usize)>,
}

impl Tally {
    fn observe(&mut self, value: &str) {
        match self.index.get(value) {
            Some(&slot) => self.values[slot].1 += 1,
            None => {
                self.index.insert(value.to_string(), self.values.len());
                self.values.push((value.to_string(), 1));
            }
        }
    }
}

/// Per-column value frequencies
#[derive(Debug, Clone)]
pub struct FrequencyReport {
    /// (field name, source header) per column
    columns: Vec<(String, String)>,
    tallies: Vec<Tally>,
}

impl FrequencyReport {
    pub fn new(column_map: &ColumnMap) -> Self {
        let columns: Vec<(String, String)> = (0..column_map.len())
            .map(|i| {
                let header = column_map.header_at(i).unwrap_or_default().to_string();
                let name = column_map
                    .field_at(i)
                    .map(|f| f.as_str().to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                (name, header)
            })
            .collect();
        let tallies = vec![Tally::default(); columns.len()];
        Self { columns, tallies }
    }

    /// Count one data row; cells beyond the header are ignored
    pub fn observe_row(&mut self, row: &[String]) {
        for (tally, cell) in self.tallies.iter_mut().zip(row.iter()) {
            tally.observe(cell);
        }
    }

    /// Count of one value in one column
    pub fn count(&self, column: usize, value: &str) -> usize {
        self.tallies
            .get(column)
            .and_then(|t| t.index.get(value).map(|&slot| t.values[slot].1))
            .unwrap_or(0)
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for ((name, header), tally) in self.columns.iter().zip(&self.tallies) {
            out.push_str(BANNER);
            out.push('\n');
            out.push_str(BANNER);
            out.push('\n');
            out.push_str(&format!("{}||{}\n", name, header));
            out.push_str(BANNER);
            out.push('\n');
            for (value, count) in &tally.values {
                let shown = if value.is_empty() { EMPTY_VALUE } else { value };
                out.push_str(&format!("{}\t{}\n", shown, count));
            }
        }
        out
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.render())?;
        info!("Frequency report written: {}", path.display());
        Ok(())
    }
}
