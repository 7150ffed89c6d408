//! The aggregation core: partition rows per team and member, score the
//! partitions, and accumulate the named buckets that drive the report and
//! the daily trend.
//!
//! Attribution of the "other contributors" bucket is order-dependent: an
//! explicit set of already-attributed ticket ids is threaded through the team
//! loop (absorbing each team's active rows and every regression row seen so
//! far), and the bucket is whatever remains of the single-version candidate
//! set afterwards. A ticket claimed by any earlier team never reaches the
//! "other" bucket.
//!
//! Known limitation carried over from the existing reports: a ticket whose
//! owner field matches members of two different teams is counted in both
//! team buckets.

use crate::config::AppConfig;
use crate::core::{dedup_rows, TicketTable};
use crate::filters::{self, matches_identity};
use crate::score::{score_rows, Di, ScoreBreakdown};
use indexmap::IndexMap;
use log::{debug, info};
use std::collections::HashSet;

/// Bucket for the regression-phase rows across all teams.
pub const BUCKET_REGRESS: &str = "测试回归";
/// Bucket for single-version rows not attributable to any roster member.
pub const BUCKET_OTHER: &str = "组外其他";
/// Bucket for every row a roster member has ever modified.
pub const BUCKET_TOUCHED: &str = "组内修改";
/// Trend column holding the overall development DI for the day.
pub const COLUMN_OVERALL: &str = "研发总DI";

/// A named accumulation unit: its (deduplicated) rows, its score, and where
/// it participates.
#[derive(Debug, Clone)]
pub struct Bucket {
    pub name: String,
    pub rows: Vec<usize>,
    pub score: ScoreBreakdown,
    /// Whether the bucket gets a column in the daily trend table.
    pub in_trend: bool,
    /// Whether its development DI counts into the daily overall total.
    pub in_daily_total: bool,
}

/// One row of the individual ranking sheet.
#[derive(Debug, Clone)]
pub struct RankEntry {
    pub display_name: String,
    pub score: ScoreBreakdown,
}

/// Everything the trend and report writers need from one aggregation pass.
#[derive(Debug, Clone)]
pub struct Aggregation {
    /// Teams in roster order, then 测试回归, 组外其他, 组内修改.
    pub buckets: Vec<Bucket>,
    pub ranking: Vec<RankEntry>,
    /// Identifier -> display name over all teams, for name substitution.
    pub display_names: IndexMap<String, String>,
    /// Sum of development DI over the buckets marked `in_daily_total`.
    pub daily_total: Di,
}

impl Aggregation {
    /// Trend column values for today: the overall total first, then one
    /// column per trend-visible bucket, each carrying its development DI.
    pub fn trend_values(&self) -> IndexMap<String, Di> {
        let mut values = IndexMap::new();
        values.insert(COLUMN_OVERALL.to_string(), self.daily_total);
        for bucket in self.buckets.iter().filter(|b| b.in_trend) {
            values.insert(bucket.name.clone(), bucket.score.development);
        }
        values
    }
}

/// Run the aggregation over the version-filtered rows.
pub fn aggregate(table: &TicketTable, version_rows: &[usize], cfg: &AppConfig) -> Aggregation {
    let ownable = filters::ownable_rows(table, version_rows);
    let candidates = filters::single_version_rows(table, &ownable, &cfg.versions.single);
    debug!(
        "aggregating {} ownable rows, {} single-version candidates",
        ownable.len(),
        candidates.len()
    );

    let mut buckets = Vec::new();
    let mut ranking = Vec::new();
    let mut display_names = IndexMap::new();
    let mut attributed: HashSet<usize> = HashSet::new();
    let mut regress_all: Vec<usize> = Vec::new();
    let mut touched_all: Vec<usize> = Vec::new();

    for (team, members) in &cfg.roster.teams {
        let mut team_rows: Vec<usize> = Vec::new();
        for (id, name) in members {
            display_names.insert(id.clone(), name.clone());

            // Actively owned by this member and not parked in regression.
            let active: Vec<usize> = ownable
                .iter()
                .copied()
                .filter(|&r| {
                    matches_identity(table.owner(r), id)
                        && !crate::core::is_regress_status(table.status(r))
                })
                .collect();
            // Modified by this member and currently in the regression phase.
            let regress: Vec<usize> = ownable
                .iter()
                .copied()
                .filter(|&r| {
                    matches_identity(table.modifiers(r), id)
                        && crate::core::is_regress_status(table.status(r))
                })
                .collect();
            // Everything this member has ever modified, regardless of status.
            let touched: Vec<usize> = version_rows
                .iter()
                .copied()
                .filter(|&r| matches_identity(table.modifiers(r), id))
                .collect();

            ranking.push(RankEntry {
                display_name: name.clone(),
                score: score_rows(table, &active),
            });
            team_rows.extend(&active);
            regress_all.extend(&regress);
            touched_all.extend(&touched);
        }

        let team_rows = dedup_rows(team_rows);
        attributed.extend(&team_rows);
        attributed.extend(&regress_all);
        let score = score_rows(table, &team_rows);
        info!(
            "team {team}: {} tickets, development DI {}",
            team_rows.len(),
            score.development
        );
        buckets.push(Bucket {
            name: team.clone(),
            rows: team_rows,
            score,
            in_trend: true,
            in_daily_total: true,
        });
    }

    let regress_rows = dedup_rows(regress_all);
    let regress_score = score_rows(table, &regress_rows);
    buckets.push(Bucket {
        name: BUCKET_REGRESS.to_string(),
        rows: regress_rows,
        score: regress_score,
        in_trend: true,
        in_daily_total: false,
    });

    let other_rows: Vec<usize> = candidates
        .into_iter()
        .filter(|r| !attributed.contains(r))
        .collect();
    let other_score = score_rows(table, &other_rows);
    info!(
        "unattributed contributors: {} tickets, development DI {}",
        other_rows.len(),
        other_score.development
    );
    buckets.push(Bucket {
        name: BUCKET_OTHER.to_string(),
        rows: other_rows,
        score: other_score,
        in_trend: true,
        in_daily_total: true,
    });

    let touched_rows = dedup_rows(touched_all);
    let touched_score = score_rows(table, &touched_rows);
    buckets.push(Bucket {
        name: BUCKET_TOUCHED.to_string(),
        rows: touched_rows,
        score: touched_score,
        in_trend: false,
        in_daily_total: false,
    });

    let daily_total: Di = buckets
        .iter()
        .filter(|b| b.in_daily_total)
        .map(|b| b.score.development)
        .sum();
    info!("daily overall development DI: {daily_total}");

    Aggregation {
        buckets,
        ranking,
        display_names,
        daily_total,
    }
}
