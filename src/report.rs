//! The report workbook: one sheet per bucket, the DI summary, the individual
//! ranking, and the trend chart sheet.
//!
//! Bucket sheets echo every column of the export, sorted by (owner, severity,
//! status) on the raw cell values, with a trailing 链接 column of HYPERLINK
//! formulas back to the tracker. When name substitution is enabled, member
//! identifiers in the owner/modifier/creator columns are replaced by their
//! display names; two identifiers that substring-match each other can collide
//! here, which matches the behavior of existing reports.

use crate::aggregate::Aggregation;
use crate::config::AppConfig;
use crate::core::{TicketTable, DI_LEVELS};
use crate::errors::DtsError;
use crate::trend::DailyHistory;
use indexmap::IndexMap;
use log::info;
use rust_xlsxwriter::{
    Chart, ChartMarker, ChartMarkerType, ChartType, Format, FormatUnderline, Formula, Workbook,
    XlsxError,
};

pub const SHEET_SUMMARY: &str = "DI汇总";
pub const SHEET_RANKING: &str = "个人DI排行";
pub const SHEET_CHART: &str = "DI可视化";
const CHART_TITLE: &str = "各组DI曲线图";

const LINK_HEADER: &str = "链接";
const LINK_TEXT: &str = "打开";
const CATEGORY_HEADER: &str = "类别";
const MEMBER_HEADER: &str = "成员";
const COUNTER_LABELS: [&str; 3] = ["归档DI", "开发DI", "总DI"];

/// Write the whole report workbook and save it.
pub fn write_report(
    table: &TicketTable,
    agg: &Aggregation,
    history: &DailyHistory,
    cfg: &AppConfig,
) -> Result<(), DtsError> {
    let path = &cfg.paths.report;
    build_workbook(table, agg, history, cfg)
        .and_then(|mut workbook| workbook.save(path))
        .map_err(|e| DtsError::output_locked(path, e.to_string()))?;
    info!("report written to {}", path.display());
    Ok(())
}

fn build_workbook(
    table: &TicketTable,
    agg: &Aggregation,
    history: &DailyHistory,
    cfg: &AppConfig,
) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header_fmt = Format::new().set_bold();
    // Blue underlined text so the HYPERLINK formulas render as links.
    let link_fmt = Format::new()
        .set_font_color("#0563C1")
        .set_underline(FormatUnderline::Single);

    for bucket in &agg.buckets {
        write_bucket_sheet(&mut workbook, table, agg, cfg, bucket, &header_fmt, &link_fmt)?;
    }
    write_summary_sheet(&mut workbook, agg, &header_fmt)?;
    write_ranking_sheet(&mut workbook, agg, &header_fmt)?;
    write_chart_sheet(&mut workbook, history, &header_fmt)?;
    Ok(workbook)
}

/// Replace every known identifier with its display name. Replacement is plain
/// substring replacement over the roster in order.
fn substitute_names(cell: &str, names: &IndexMap<String, String>) -> String {
    let mut out = cell.to_string();
    for (id, name) in names {
        if out.contains(id.as_str()) {
            out = out.replace(id.as_str(), name);
        }
    }
    out
}

/// Sort bucket rows by (owner, severity, status), lexicographically on the
/// raw cell values.
fn sorted_rows(table: &TicketTable, rows: &[usize]) -> Vec<usize> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(|&a, &b| {
        (table.owner(a), table.severity(a), table.status(a)).cmp(&(
            table.owner(b),
            table.severity(b),
            table.status(b),
        ))
    });
    sorted
}

fn write_bucket_sheet(
    workbook: &mut Workbook,
    table: &TicketTable,
    agg: &Aggregation,
    cfg: &AppConfig,
    bucket: &crate::aggregate::Bucket,
    header_fmt: &Format,
    link_fmt: &Format,
) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(&bucket.name)?;

    for (c, header) in table.headers().iter().enumerate() {
        sheet.write_string_with_format(0, c as u16, header, header_fmt)?;
    }
    let link_col = table.headers().len() as u16;
    sheet.write_string_with_format(0, link_col, LINK_HEADER, header_fmt)?;

    let columns = table.columns();
    let mut name_columns = vec![columns.owner, columns.modifiers];
    name_columns.extend(columns.creator);

    for (i, &r) in sorted_rows(table, &bucket.rows).iter().enumerate() {
        let excel_row = (i + 1) as u32;
        for (c, cell) in table.row(r).iter().enumerate() {
            if cfg.settings.change_name && name_columns.contains(&c) {
                sheet.write_string(
                    excel_row,
                    c as u16,
                    substitute_names(cell, &agg.display_names),
                )?;
            } else {
                sheet.write_string(excel_row, c as u16, cell)?;
            }
        }
        let formula = format!(
            "=HYPERLINK(\"{}{}\", \"{}\")",
            cfg.settings.url,
            table.id(r),
            LINK_TEXT
        );
        sheet.write_formula_with_format(excel_row, link_col, Formula::new(formula), link_fmt)?;
    }
    Ok(())
}

/// DI汇总: rows are the severity levels plus the three counters; one column
/// per bucket.
fn write_summary_sheet(
    workbook: &mut Workbook,
    agg: &Aggregation,
    header_fmt: &Format,
) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_SUMMARY)?;

    sheet.write_string_with_format(0, 0, CATEGORY_HEADER, header_fmt)?;
    for (i, level) in DI_LEVELS.iter().enumerate() {
        sheet.write_string((i + 1) as u32, 0, *level)?;
    }
    for (i, label) in COUNTER_LABELS.iter().enumerate() {
        sheet.write_string((DI_LEVELS.len() + i + 1) as u32, 0, *label)?;
    }

    for (c, bucket) in agg.buckets.iter().enumerate() {
        let col = (c + 1) as u16;
        sheet.write_string_with_format(0, col, &bucket.name, header_fmt)?;
        for (i, count) in bucket.score.level_counts.iter().enumerate() {
            sheet.write_number((i + 1) as u32, col, *count as f64)?;
        }
        let counters = [
            bucket.score.filing,
            bucket.score.development,
            bucket.score.total,
        ];
        for (i, di) in counters.iter().enumerate() {
            sheet.write_number((DI_LEVELS.len() + i + 1) as u32, col, di.to_f64())?;
        }
    }
    Ok(())
}

/// 个人DI排行: one row per member, sorted descending by development DI.
fn write_ranking_sheet(
    workbook: &mut Workbook,
    agg: &Aggregation,
    header_fmt: &Format,
) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_RANKING)?;

    sheet.write_string_with_format(0, 0, MEMBER_HEADER, header_fmt)?;
    let mut col = 1u16;
    for level in DI_LEVELS {
        sheet.write_string_with_format(0, col, level, header_fmt)?;
        col += 1;
    }
    for label in COUNTER_LABELS {
        sheet.write_string_with_format(0, col, label, header_fmt)?;
        col += 1;
    }

    let mut entries: Vec<_> = agg.ranking.iter().collect();
    entries.sort_by(|a, b| b.score.development.cmp(&a.score.development));

    for (i, entry) in entries.iter().enumerate() {
        let row = (i + 1) as u32;
        sheet.write_string(row, 0, &entry.display_name)?;
        let mut col = 1u16;
        for count in &entry.score.level_counts {
            sheet.write_number(row, col, *count as f64)?;
            col += 1;
        }
        for di in [
            entry.score.filing,
            entry.score.development,
            entry.score.total,
        ] {
            sheet.write_number(row, col, di.to_f64())?;
            col += 1;
        }
    }
    Ok(())
}

/// DI可视化: the history table plus a line chart, one series per bucket
/// column, dates as categories.
fn write_chart_sheet(
    workbook: &mut Workbook,
    history: &DailyHistory,
    header_fmt: &Format,
) -> Result<(), XlsxError> {
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_CHART)?;

    sheet.write_string_with_format(0, 0, "Date", header_fmt)?;
    sheet.set_column_width(0, 12)?;
    for (c, column) in history.columns().iter().enumerate() {
        sheet.write_string_with_format(0, (c + 1) as u16, column, header_fmt)?;
    }
    for (i, row) in history.rows().iter().enumerate() {
        let excel_row = (i + 1) as u32;
        sheet.write_string(excel_row, 0, &row.date)?;
        for (c, column) in history.columns().iter().enumerate() {
            if let Some(di) = row.values.get(column) {
                sheet.write_number(excel_row, (c + 1) as u16, di.to_f64())?;
            }
        }
    }

    let last_row = history.rows().len() as u32;
    if last_row > 0 && !history.columns().is_empty() {
        let mut chart = Chart::new(ChartType::Line);
        chart.title().set_name(CHART_TITLE);
        for c in 0..history.columns().len() {
            let col = (c + 1) as u16;
            chart
                .add_series()
                .set_name((SHEET_CHART, 0, col))
                .set_categories((SHEET_CHART, 1, 0, last_row, 0))
                .set_values((SHEET_CHART, 1, col, last_row, col))
                .set_marker(&ChartMarker::new().set_type(ChartMarkerType::Circle).set_size(5));
        }
        chart.set_width(960).set_height(420);
        sheet.insert_chart(1, (history.columns().len() + 2) as u16, &chart)?;
    }
    Ok(())
}
