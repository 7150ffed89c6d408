//! File-format glue: reading the ticket export, the `init` config templates,
//! and the best-effort "open the report in the default viewer" convenience.

use crate::core::TicketTable;
use crate::errors::DtsError;
use log::{info, warn};
use std::path::Path;
use std::process::Command;

/// Read the DTS ticket export into a [`TicketTable`]. Rows keep every column
/// of the export; only the header is interpreted here.
pub fn read_ticket_table(path: &Path) -> Result<TicketTable, DtsError> {
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
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| DtsError::input_table(path, e.to_string()))?;
        rows.push(record.iter().map(String::from).collect());
    }
    TicketTable::new(headers, rows, path)
}

/// Open a file with the desktop environment's default handler. Failures are
/// logged and otherwise ignored; the report is already on disk.
pub fn open_in_viewer(path: &Path) {
    #[cfg(target_os = "windows")]
    let result = Command::new("cmd")
        .args(["/C", "start", ""])
        .arg(path)
        .spawn();
    #[cfg(target_os = "macos")]
    let result = Command::new("open").arg(path).spawn();
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let result = Command::new("xdg-open").arg(path).spawn();

    match result {
        Ok(_) => info!("opened {} in the default viewer", path.display()),
        Err(e) => warn!("could not open {}: {e}", path.display()),
    }
}

pub const MEMBER_TEMPLATE: &str = r#"{
    "团队A": {
        "zhangsan": "张三",
        "lisi": "李四"
    },
    "团队B": {
        "wangwu": "王五"
    }
}
"#;

pub const VERSION_TEMPLATE: &str = r#"{
    "include": ["V1"],
    "exclude": [],
    "single": "V1"
}
"#;

pub const SETTINGS_TEMPLATE: &str = r#"{
    "URL": "http://dts.example.com/ticket/",
    "DEBUG": false,
    "CH_NAME": true,
    "TIMESTAMP": false
}
"#;

/// Write one config template, refusing to clobber an existing file unless
/// `force` is set.
pub fn write_template(path: &Path, contents: &str, force: bool) -> anyhow::Result<bool> {
    if path.exists() && !force {
        return Ok(false);
    }
    std::fs::write(path, contents)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn reads_a_ticket_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("DTS-IN.csv");
        std::fs::write(
            &path,
            indoc! {"
                问题单号,B版本,严重程度,当前状态,当前处理人,所有实施修改人,备注
                T1,V1.0,致命,CMO归档,alice,alice,留着
                T2,V1.0,严重,open,bob,\"alice,bob\",
            "},
        )
        .unwrap();
        let table = read_ticket_table(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.id(0), "T1");
        assert_eq!(table.modifiers(1), "alice,bob");
        // Extra columns ride along untouched.
        assert_eq!(table.headers().last().unwrap(), "备注");
        assert_eq!(table.cell(0, 6), "留着");
    }

    #[test]
    fn missing_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("DTS-IN.csv");
        std::fs::write(&path, "问题单号,B版本\nT1,V1.0\n").unwrap();
        let err = read_ticket_table(&path).unwrap_err();
        assert!(matches!(err, DtsError::MissingColumn { .. }));
    }

    #[test]
    fn templates_parse_as_their_config_types() {
        let roster: crate::config::Roster = serde_json::from_str(MEMBER_TEMPLATE).unwrap();
        assert_eq!(roster.teams.len(), 2);
        let _: crate::config::VersionSelection = serde_json::from_str(VERSION_TEMPLATE).unwrap();
        let settings: crate::config::Settings = serde_json::from_str(SETTINGS_TEMPLATE).unwrap();
        assert!(settings.change_name);
    }

    #[test]
    fn template_write_respects_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("member.json");
        assert!(write_template(&path, MEMBER_TEMPLATE, false).unwrap());
        assert!(!write_template(&path, "{}", false).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), MEMBER_TEMPLATE);
        assert!(write_template(&path, "{}", true).unwrap());
    }
}
