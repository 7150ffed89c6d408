//! The analyze pipeline: config -> table load -> version filter -> ownership
//! split -> aggregation -> trend append -> report -> open.
//!
//! The history file is only touched after aggregation has fully succeeded, so
//! an aborted run never corrupts persisted history.

use crate::aggregate;
use crate::config::AppConfig;
use crate::errors::DtsError;
use crate::filters;
use crate::io;
use crate::report;
use crate::trend::DailyHistory;
use log::{debug, info};
use std::path::PathBuf;

/// Resolved options for one analyze run.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub input: PathBuf,
    pub history: PathBuf,
    pub report: PathBuf,
    pub member_cnf: PathBuf,
    pub version_cnf: PathBuf,
    pub settings_cnf: PathBuf,
    /// Open the report in the default viewer after writing it.
    pub open_report: bool,
}

/// Log a detail line: at info level when the settings DEBUG switch is on,
/// otherwise at debug level (visible under RUST_LOG=debug).
fn detail(cfg: &AppConfig, message: impl AsRef<str>) {
    if cfg.settings.debug {
        info!("{}", message.as_ref());
    } else {
        debug!("{}", message.as_ref());
    }
}

pub fn run(opts: &AnalyzeOptions) -> Result<(), DtsError> {
    let cfg = AppConfig::load(
        &opts.member_cnf,
        &opts.version_cnf,
        &opts.settings_cnf,
        &opts.input,
        &opts.history,
        &opts.report,
    )?;
    info!("configuration loaded");
    detail(&cfg, format!("roster: {:?}", cfg.roster.teams));
    detail(
        &cfg,
        format!(
            "versions: include={:?} exclude={:?} single={}",
            cfg.versions.include, cfg.versions.exclude, cfg.versions.single
        ),
    );

    let mut table = io::read_ticket_table(&cfg.paths.input)?;
    let dropped = table.dedup_by_id();
    info!(
        "ticket table loaded: {} rows ({dropped} duplicates dropped)",
        table.len()
    );

    let version_rows = filters::version_rows(&table, &cfg.versions);
    info!("version filter kept {} rows", version_rows.len());

    let agg = aggregate::aggregate(&table, &version_rows, &cfg);

    let mut history = DailyHistory::load(&cfg.paths.history)?;
    history.append(&cfg.today, agg.trend_values());
    history.save(&cfg.paths.history)?;
    info!(
        "trend history updated: {} ({} days)",
        cfg.paths.history.display(),
        history.rows().len()
    );

    report::write_report(&table, &agg, &history, &cfg)?;

    if opts.open_report {
        io::open_in_viewer(&cfg.paths.report);
    }
    Ok(())
}
