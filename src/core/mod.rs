//! Core data model: the in-memory ticket table and the fixed DTS vocabulary
//! (severity levels, archived and regression status sets, column names).
//!
//! The table keeps every column of the export verbatim so report sheets can
//! echo the original data; the fixed columns the pipeline reasons about are
//! resolved to indices once at load time.

use crate::errors::DtsError;
use std::collections::HashSet;
use std::path::Path;

/// Severity levels in report order. Counts and weights are always emitted in
/// this order.
pub const DI_LEVELS: [&str; 4] = ["致命", "严重", "一般", "提示"];

/// Statuses that mean a ticket has been filed/archived.
pub const FILING_STATUSES: [&str; 1] = ["CMO归档"];

/// Statuses of the test-regression phase (owned by test, not development).
pub const REGRESS_STATUSES: [&str; 3] = ["测试经理组织测试", "测试人员回归测试", "确认问题单"];

pub const COL_ID: &str = "问题单号";
pub const COL_VERSION: &str = "B版本";
pub const COL_SEVERITY: &str = "严重程度";
pub const COL_STATUS: &str = "当前状态";
pub const COL_OWNER: &str = "当前处理人";
pub const COL_MODIFIERS: &str = "所有实施修改人";
pub const COL_CREATOR: &str = "创建人";

pub fn is_filing_status(status: &str) -> bool {
    FILING_STATUSES.contains(&status)
}

pub fn is_regress_status(status: &str) -> bool {
    REGRESS_STATUSES.contains(&status)
}

/// Indices of the fixed columns within the export header.
#[derive(Debug, Clone, Copy)]
pub struct Columns {
    pub id: usize,
    pub version: usize,
    pub severity: usize,
    pub status: usize,
    pub owner: usize,
    pub modifiers: usize,
    /// Not every export carries the creator column.
    pub creator: Option<usize>,
}

impl Columns {
    fn resolve(headers: &[String], path: &Path) -> Result<Self, DtsError> {
        let find = |name: &str| -> Result<usize, DtsError> {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DtsError::MissingColumn {
                    path: path.to_path_buf(),
                    column: name.to_string(),
                })
        };
        Ok(Self {
            id: find(COL_ID)?,
            version: find(COL_VERSION)?,
            severity: find(COL_SEVERITY)?,
            status: find(COL_STATUS)?,
            owner: find(COL_OWNER)?,
            modifiers: find(COL_MODIFIERS)?,
            creator: headers.iter().position(|h| h == COL_CREATOR),
        })
    }
}

/// The full ticket export held in memory. Rows are referenced by index from
/// the filter and aggregation stages; the table itself is immutable after
/// [`TicketTable::dedup_by_id`] has run.
#[derive(Debug, Clone)]
pub struct TicketTable {
    headers: Vec<String>,
    columns: Columns,
    rows: Vec<Vec<String>>,
}

impl TicketTable {
    /// Build a table from raw records. Short rows are padded so every row has
    /// one cell per header; long rows are truncated.
    pub fn new(
        headers: Vec<String>,
        mut rows: Vec<Vec<String>>,
        path: &Path,
    ) -> Result<Self, DtsError> {
        let columns = Columns::resolve(&headers, path)?;
        let width = headers.len();
        for row in &mut rows {
            row.resize(width, String::new());
        }
        Ok(Self {
            headers,
            columns,
            rows,
        })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn columns(&self) -> Columns {
        self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All row indices, in input order.
    pub fn all_rows(&self) -> Vec<usize> {
        (0..self.rows.len()).collect()
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        &self.rows[row][col]
    }

    pub fn row(&self, row: usize) -> &[String] {
        &self.rows[row]
    }

    pub fn id(&self, row: usize) -> &str {
        self.cell(row, self.columns.id)
    }

    pub fn version(&self, row: usize) -> &str {
        self.cell(row, self.columns.version)
    }

    pub fn severity(&self, row: usize) -> &str {
        self.cell(row, self.columns.severity)
    }

    pub fn status(&self, row: usize) -> &str {
        self.cell(row, self.columns.status)
    }

    pub fn owner(&self, row: usize) -> &str {
        self.cell(row, self.columns.owner)
    }

    pub fn modifiers(&self, row: usize) -> &str {
        self.cell(row, self.columns.modifiers)
    }

    /// Drop rows whose ticket id has been seen before, keeping the first
    /// occurrence. Idempotent. Must run before any row indices are handed out.
    pub fn dedup_by_id(&mut self) -> usize {
        let id_col = self.columns.id;
        let mut seen: HashSet<String> = HashSet::with_capacity(self.rows.len());
        let before = self.rows.len();
        self.rows.retain(|row| seen.insert(row[id_col].clone()));
        before - self.rows.len()
    }
}

/// Deduplicate a list of row indices, keeping the first occurrence. Row
/// indices are unique per ticket once the table itself is deduplicated, so
/// index identity is id identity.
pub fn dedup_rows(rows: Vec<usize>) -> Vec<usize> {
    let mut seen = HashSet::with_capacity(rows.len());
    rows.into_iter().filter(|r| seen.insert(*r)).collect()
}
