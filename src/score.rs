//! Weighted DI scoring with exact decimal arithmetic.
//!
//! The severity weight table is 致命=10, 严重=3, 一般=1, 提示=0.1. The 0.1
//! weight rules out binary floating point for accumulation (repeated sums
//! drift visibly over many runs), so [`Di`] is a fixed-point integer count of
//! tenths of a DI point. Every sum and difference stays exact; conversion to
//! `f64` happens only when a value is written into a workbook cell.

use crate::core::{self, TicketTable, DI_LEVELS};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

/// A DI score held as an integer number of tenths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Di(i64);

impl Di {
    pub const ZERO: Di = Di(0);

    pub const fn from_tenths(tenths: i64) -> Self {
        Di(tenths)
    }

    pub fn tenths(self) -> i64 {
        self.0
    }

    /// Weight times an integer row count, exact.
    pub fn times(self, count: usize) -> Di {
        Di(self.0 * count as i64)
    }

    /// Lossless up to one decimal place, which is all a tenths count has.
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 10.0
    }
}

impl Add for Di {
    type Output = Di;
    fn add(self, rhs: Di) -> Di {
        Di(self.0 + rhs.0)
    }
}

impl AddAssign for Di {
    fn add_assign(&mut self, rhs: Di) {
        self.0 += rhs.0;
    }
}

impl Sub for Di {
    type Output = Di;
    fn sub(self, rhs: Di) -> Di {
        Di(self.0 - rhs.0)
    }
}

impl Sum for Di {
    fn sum<I: Iterator<Item = Di>>(iter: I) -> Di {
        iter.fold(Di::ZERO, Add::add)
    }
}

impl fmt::Display for Di {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        if abs % 10 == 0 {
            write!(f, "{sign}{}", abs / 10)
        } else {
            write!(f, "{sign}{}.{}", abs / 10, abs % 10)
        }
    }
}

impl FromStr for Di {
    type Err = String;

    /// Parses decimal strings the history writer emits ("12", "12.3",
    /// "12.30"); fractional digits beyond tenths must be zero.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (sign, digits) = match s.strip_prefix('-') {
            Some(rest) => (-1i64, rest),
            None => (1i64, s),
        };
        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f.trim_end_matches('0')),
            None => (digits, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(format!("not a DI value: '{s}'"));
        }
        if frac.len() > 1 {
            return Err(format!("DI value '{s}' has sub-tenth precision"));
        }
        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| format!("not a DI value: '{s}'"))?
        };
        let tenth: i64 = if frac.is_empty() {
            0
        } else {
            frac.parse().map_err(|_| format!("not a DI value: '{s}'"))?
        };
        Ok(Di(sign * (whole * 10 + tenth)))
    }
}

/// Weight of one severity level; unknown levels score nothing.
pub fn level_weight(level: &str) -> Di {
    match level {
        "致命" => Di::from_tenths(100),
        "严重" => Di::from_tenths(30),
        "一般" => Di::from_tenths(10),
        "提示" => Di::from_tenths(1),
        _ => Di::ZERO,
    }
}

/// Result of scoring one row set: per-level counts in [`DI_LEVELS`] order,
/// then the three derived counters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScoreBreakdown {
    pub level_counts: Vec<usize>,
    /// DI of rows currently in a filing/archived status.
    pub filing: Di,
    /// DI still in development: total minus filing.
    pub development: Di,
    pub total: Di,
}

/// Score a set of rows: count each severity level over the full set and over
/// the archived subset, weight both, and derive development = total - filing.
pub fn score_rows(table: &TicketTable, rows: &[usize]) -> ScoreBreakdown {
    let mut level_counts = Vec::with_capacity(DI_LEVELS.len());
    let mut filing = Di::ZERO;
    let mut total = Di::ZERO;
    for level in DI_LEVELS {
        let weight = level_weight(level);
        let count_all = rows.iter().filter(|&&r| table.severity(r) == level).count();
        let count_filing = rows
            .iter()
            .filter(|&&r| table.severity(r) == level && core::is_filing_status(table.status(r)))
            .count();
        filing += weight.times(count_filing);
        total += weight.times(count_all);
        level_counts.push(count_all);
    }
    ScoreBreakdown {
        level_counts,
        filing,
        development: total - filing,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{COL_ID, COL_MODIFIERS, COL_OWNER, COL_SEVERITY, COL_STATUS, COL_VERSION};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn table(rows: Vec<(&str, &str, &str)>) -> TicketTable {
        let headers = vec![
            COL_ID, COL_VERSION, COL_SEVERITY, COL_STATUS, COL_OWNER, COL_MODIFIERS,
        ]
        .into_iter()
        .map(String::from)
        .collect();
        let rows = rows
            .into_iter()
            .enumerate()
            .map(|(i, (sev, status, owner))| {
                vec![
                    format!("T{i}"),
                    "V1.0".to_string(),
                    sev.to_string(),
                    status.to_string(),
                    owner.to_string(),
                    owner.to_string(),
                ]
            })
            .collect();
        TicketTable::new(headers, rows, &PathBuf::from("in.csv")).unwrap()
    }

    #[test]
    fn display_renders_exact_tenths() {
        assert_eq!(Di::from_tenths(123).to_string(), "12.3");
        assert_eq!(Di::from_tenths(70).to_string(), "7");
        assert_eq!(Di::from_tenths(1).to_string(), "0.1");
        assert_eq!(Di::from_tenths(0).to_string(), "0");
        assert_eq!(Di::from_tenths(-31).to_string(), "-3.1");
    }

    #[test]
    fn parse_round_trips_and_accepts_trailing_zeros() {
        assert_eq!("12.3".parse::<Di>().unwrap(), Di::from_tenths(123));
        assert_eq!("12.30".parse::<Di>().unwrap(), Di::from_tenths(123));
        assert_eq!("7".parse::<Di>().unwrap(), Di::from_tenths(70));
        assert_eq!("0.1".parse::<Di>().unwrap(), Di::from_tenths(1));
        assert!("12.34".parse::<Di>().is_err());
        assert!("abc".parse::<Di>().is_err());
        assert!("".parse::<Di>().is_err());
    }

    #[test]
    fn repeated_hint_weight_sums_exactly() {
        // 0.1 summed ten thousand times is exactly 1000.0 in tenths; binary
        // floating point would already have drifted here.
        let sum: Di = std::iter::repeat(level_weight("提示")).take(10_000).sum();
        assert_eq!(sum, Di::from_tenths(10_000));
        assert_eq!(sum.to_string(), "1000");
    }

    #[test]
    fn uniform_level_identities_hold() {
        // N rows all at 严重 (weight 3), none archived.
        let t = table(vec![
            ("严重", "open", "a"),
            ("严重", "open", "a"),
            ("严重", "open", "a"),
        ]);
        let s = score_rows(&t, &t.all_rows());
        assert_eq!(s.total, level_weight("严重").times(3));
        assert_eq!(s.filing, Di::ZERO);
        assert_eq!(s.development + s.filing, s.total);
        assert_eq!(s.level_counts, vec![0, 3, 0, 0]);
    }

    #[test]
    fn all_archived_moves_total_into_filing() {
        let t = table(vec![("致命", "CMO归档", "a"), ("致命", "CMO归档", "a")]);
        let s = score_rows(&t, &t.all_rows());
        assert_eq!(s.filing, level_weight("致命").times(2));
        assert_eq!(s.development, Di::ZERO);
        assert_eq!(s.total, s.filing);
    }

    #[test]
    fn mixed_levels_and_statuses() {
        let t = table(vec![
            ("致命", "CMO归档", "a"), // 10 archived
            ("严重", "open", "a"),    // 3 in development
            ("提示", "open", "a"),    // 0.1 in development
        ]);
        let s = score_rows(&t, &t.all_rows());
        assert_eq!(s.filing, Di::from_tenths(100));
        assert_eq!(s.development, Di::from_tenths(31));
        assert_eq!(s.total, Di::from_tenths(131));
        assert_eq!(s.level_counts, vec![1, 1, 0, 1]);
    }

    #[test]
    fn unknown_severity_counts_nothing() {
        let t = table(vec![("无效", "open", "a")]);
        let s = score_rows(&t, &t.all_rows());
        assert_eq!(s.total, Di::ZERO);
        assert_eq!(s.level_counts, vec![0, 0, 0, 0]);
    }

    #[test]
    fn empty_row_set_scores_zero() {
        let t = table(vec![]);
        let s = score_rows(&t, &[]);
        assert_eq!(s.total, Di::ZERO);
        assert_eq!(s.development, Di::ZERO);
        assert_eq!(s.filing, Di::ZERO);
    }
}
