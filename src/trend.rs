//! The daily DI history table: one row per calendar date, one column per
//! trend bucket plus the overall total, persisted as CSV across runs.
//!
//! Re-running on the same day replaces that day's row (last write wins), so
//! the append is idempotent per date. Bucket columns can come and go when the
//! roster changes between runs; rows simply leave absent columns empty.

use crate::errors::DtsError;
use crate::score::Di;
use indexmap::IndexMap;
use std::path::Path;

const DATE_COLUMN: &str = "Date";

#[derive(Debug, Clone, PartialEq)]
pub struct DailyRow {
    /// YYYYMMDD.
    pub date: String,
    /// Column name -> value; absent columns were not recorded that day.
    pub values: IndexMap<String, Di>,
}

/// The persisted history plus its column universe (union over all rows, in
/// first-seen order).
#[derive(Debug, Clone, Default)]
pub struct DailyHistory {
    columns: Vec<String>,
    rows: Vec<DailyRow>,
}

impl DailyHistory {
    /// Load the history file, or start empty if it does not exist yet.
    pub fn load(path: &Path) -> Result<Self, DtsError> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| DtsError::input_table(path, e.to_string()))?;
        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| DtsError::input_table(path, e.to_string()))?
            .iter()
            .map(String::from)
            .collect();
        if headers.first().map(String::as_str) != Some(DATE_COLUMN) {
            return Err(DtsError::input_table(
                path,
                format!("first history column must be '{DATE_COLUMN}'"),
            ));
        }
        let columns: Vec<String> = headers[1..].to_vec();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| DtsError::input_table(path, e.to_string()))?;
            let date = record.get(0).unwrap_or("").to_string();
            if date.is_empty() {
                continue;
            }
            let mut values = IndexMap::new();
            for (i, column) in columns.iter().enumerate() {
                let cell = record.get(i + 1).unwrap_or("").trim();
                if cell.is_empty() {
                    continue;
                }
                let di: Di = cell
                    .parse()
                    .map_err(|e: String| DtsError::input_table(path, e))?;
                values.insert(column.clone(), di);
            }
            rows.push(DailyRow { date, values });
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[DailyRow] {
        &self.rows
    }

    /// Append one day's values. Any new column joins the column universe;
    /// any earlier row for the same date is dropped in favor of this one.
    pub fn append(&mut self, date: &str, values: IndexMap<String, Di>) {
        for column in values.keys() {
            if !self.columns.contains(column) {
                self.columns.push(column.clone());
            }
        }
        self.rows.retain(|row| row.date != date);
        self.rows.push(DailyRow {
            date: date.to_string(),
            values,
        });
    }

    /// Persist back to CSV. A failure here is reported as a locked output so
    /// the operator gets the close-and-re-run hint.
    pub fn save(&self, path: &Path) -> Result<(), DtsError> {
        let mut writer =
            csv::Writer::from_path(path).map_err(|e| DtsError::output_locked(path, e.to_string()))?;
        let mut header = Vec::with_capacity(self.columns.len() + 1);
        header.push(DATE_COLUMN.to_string());
        header.extend(self.columns.iter().cloned());
        writer
            .write_record(&header)
            .map_err(|e| DtsError::output_locked(path, e.to_string()))?;
        for row in &self.rows {
            let mut record = Vec::with_capacity(header.len());
            record.push(row.date.clone());
            for column in &self.columns {
                record.push(
                    row.values
                        .get(column)
                        .map(Di::to_string)
                        .unwrap_or_default(),
                );
            }
            writer
                .write_record(&record)
                .map_err(|e| DtsError::output_locked(path, e.to_string()))?;
        }
        writer
            .flush()
            .map_err(|e| DtsError::output_locked(path, e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn values(pairs: &[(&str, i64)]) -> IndexMap<String, Di> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Di::from_tenths(*v)))
            .collect()
    }

    #[test]
    fn append_same_date_keeps_latest_row_only() {
        let mut history = DailyHistory::default();
        history.append("20260826", values(&[("研发总DI", 100)]));
        history.append("20260827", values(&[("研发总DI", 120)]));
        history.append("20260827", values(&[("研发总DI", 90)]));
        assert_eq!(history.rows().len(), 2);
        let last = &history.rows()[1];
        assert_eq!(last.date, "20260827");
        assert_eq!(last.values["研发总DI"], Di::from_tenths(90));
    }

    #[test]
    fn new_columns_join_the_universe() {
        let mut history = DailyHistory::default();
        history.append("20260826", values(&[("研发总DI", 100), ("TeamA", 50)]));
        history.append("20260827", values(&[("研发总DI", 80), ("TeamB", 80)]));
        assert_eq!(history.columns(), ["研发总DI", "TeamA", "TeamB"]);
        // The older row simply lacks the new column.
        assert!(!history.rows()[0].values.contains_key("TeamB"));
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("DI-DAILY.csv");

        let mut history = DailyHistory::default();
        history.append("20260826", values(&[("研发总DI", 103), ("TeamA", 103)]));
        history.append("20260827", values(&[("研发总DI", 90), ("TeamB", 90)]));
        history.save(&path).unwrap();

        let loaded = DailyHistory::load(&path).unwrap();
        assert_eq!(loaded.columns(), history.columns());
        assert_eq!(loaded.rows().len(), 2);
        assert_eq!(loaded.rows()[0].values["TeamA"], Di::from_tenths(103));
        // TeamA is empty on the second day and stays absent after reload.
        assert!(!loaded.rows()[1].values.contains_key("TeamA"));
        assert_eq!(loaded.rows()[1].values["TeamB"], Di::from_tenths(90));
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let history = DailyHistory::load(&dir.path().join("absent.csv")).unwrap();
        assert!(history.rows().is_empty());
        assert!(history.columns().is_empty());
    }

    #[test]
    fn rerun_after_reload_is_idempotent_per_date() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("DI-DAILY.csv");

        let mut history = DailyHistory::default();
        history.append("20260827", values(&[("研发总DI", 120)]));
        history.save(&path).unwrap();

        let mut reloaded = DailyHistory::load(&path).unwrap();
        reloaded.append("20260827", values(&[("研发总DI", 130)]));
        reloaded.save(&path).unwrap();

        let fin = DailyHistory::load(&path).unwrap();
        assert_eq!(fin.rows().len(), 1);
        assert_eq!(fin.rows()[0].values["研发总DI"], Di::from_tenths(130));
    }
}
