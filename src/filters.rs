//! Row filtering: version prefix selection and ownership splits.
//!
//! The version filter is a plain predicate fold over the configured prefix
//! lists: a version passes when it starts with at least one include prefix
//! and with no exclude prefix. Matching is exact string-prefix, not semantic
//! version comparison.

use crate::config::VersionSelection;
use crate::core::TicketTable;

/// Predicate over a version string for the given include/exclude prefix
/// lists. An empty exclude list excludes nothing; an empty include list
/// (rejected at config load) would retain nothing.
pub fn version_predicate<'a>(
    include: &'a [String],
    exclude: &'a [String],
) -> impl Fn(&str) -> bool + 'a {
    move |version: &str| {
        include.iter().any(|p| version.starts_with(p.as_str()))
            && !exclude.iter().any(|p| version.starts_with(p.as_str()))
    }
}

/// Indices of rows whose version passes the selection, in table order.
pub fn version_rows(table: &TicketTable, selection: &VersionSelection) -> Vec<usize> {
    let pred = version_predicate(&selection.include, &selection.exclude);
    (0..table.len())
        .filter(|&r| pred(table.version(r)))
        .collect()
}

/// Rows with a non-empty current owner: the set the per-member ownership
/// tests run against.
pub fn ownable_rows(table: &TicketTable, rows: &[usize]) -> Vec<usize> {
    rows.iter()
        .copied()
        .filter(|&r| !table.owner(r).trim().is_empty())
        .collect()
}

/// Ownable rows in the designated single version: the candidate universe for
/// "other contributor" accounting, narrowed later as teams are attributed.
pub fn single_version_rows(table: &TicketTable, ownable: &[usize], single: &str) -> Vec<usize> {
    ownable
        .iter()
        .copied()
        .filter(|&r| table.version(r).starts_with(single))
        .collect()
}

/// Identity test against a free-text owner/modifier field: exact match or
/// substring containment, so multi-person fields like "alice,bob" match each
/// listed identifier. Substring matching is deliberately preserved from the
/// existing reports even though a short identifier can match inside a longer
/// one ("li" inside "wangli"); switching to token matching would silently
/// change report output.
pub fn matches_identity(field: &str, id: &str) -> bool {
    field == id || field.contains(id)
}
