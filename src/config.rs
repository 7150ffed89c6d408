//! Configuration loading: the team roster, the version selection, and the
//! runtime settings, each a small JSON document validated at startup and
//! assembled into one immutable [`AppConfig`] that the pipeline stages borrow.

use crate::errors::DtsError;
use indexmap::IndexMap;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_INPUT: &str = "DTS-IN.csv";
pub const DEFAULT_HISTORY: &str = "DI-DAILY.csv";
pub const DEFAULT_REPORT: &str = "DTS-OUT.xlsx";
pub const DEFAULT_MEMBER_CNF: &str = "member.json";
pub const DEFAULT_VERSION_CNF: &str = "version.json";
pub const DEFAULT_SETTINGS_CNF: &str = "settings.json";

/// Team roster: team name -> member identifier -> display name, in file
/// order. Team order is the aggregation processing order, which the
/// "other contributors" narrowing depends on.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct Roster {
    pub teams: IndexMap<String, IndexMap<String, String>>,
}

impl Roster {
    fn validate(&self, path: &Path) -> Result<(), DtsError> {
        if self.teams.is_empty() {
            return Err(DtsError::invalid_config(path, "roster has no teams"));
        }
        for (team, members) in &self.teams {
            if members.is_empty() {
                return Err(DtsError::invalid_config(
                    path,
                    format!("team '{team}' has no members"),
                ));
            }
            for (id, name) in members {
                if id.trim().is_empty() || name.trim().is_empty() {
                    return Err(DtsError::invalid_config(
                        path,
                        format!("team '{team}' has an empty member identifier or display name"),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Flattened identifier -> display name map over all teams, in roster
    /// order. Later duplicates of the same identifier overwrite earlier ones.
    pub fn display_names(&self) -> IndexMap<String, String> {
        let mut names = IndexMap::new();
        for members in self.teams.values() {
            for (id, name) in members {
                names.insert(id.clone(), name.clone());
            }
        }
        names
    }
}

/// Which versions are in scope: prefix include/exclude lists plus the single
/// version prefix that defines the universe for unattributed-ticket
/// accounting.
#[derive(Debug, Clone, Deserialize)]
pub struct VersionSelection {
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    pub single: String,
}

impl VersionSelection {
    fn validate(&self, path: &Path) -> Result<(), DtsError> {
        // An empty include list would drop every ticket; always a
        // misconfiguration, so refuse to run.
        if self.include.is_empty() {
            return Err(DtsError::invalid_config(path, "include version list is empty"));
        }
        if self.include.iter().any(|v| v.trim().is_empty()) {
            return Err(DtsError::invalid_config(
                path,
                "include version list contains an empty prefix",
            ));
        }
        if self.single.trim().is_empty() {
            return Err(DtsError::invalid_config(path, "single version prefix is empty"));
        }
        Ok(())
    }
}

/// Runtime settings. Key names follow the settings file as the operators
/// know it.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Tracker base URL; the report's link column is URL + ticket id.
    #[serde(rename = "URL")]
    pub url: String,
    /// When set, stage detail dumps log at info level instead of debug.
    #[serde(rename = "DEBUG")]
    pub debug: bool,
    /// Substitute member identifiers with display names in the report.
    #[serde(rename = "CH_NAME")]
    pub change_name: bool,
    /// Suffix the report filename with today's date.
    #[serde(rename = "TIMESTAMP")]
    pub timestamp: bool,
}

/// Resolved input/output paths for one run.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub input: PathBuf,
    pub history: PathBuf,
    pub report: PathBuf,
}

/// Everything a run needs, built once and passed by reference.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub roster: Roster,
    pub versions: VersionSelection,
    pub settings: Settings,
    pub paths: RunPaths,
    /// Today as YYYYMMDD; the trend row key and the optional report suffix.
    pub today: String,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, DtsError> {
    if !path.is_file() {
        return Err(DtsError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    let contents = fs::read_to_string(path).map_err(|source| DtsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|e| DtsError::invalid_config(path, e.to_string()))
}

/// Insert a `-YYYYMMDD` suffix before the file extension.
fn timestamped(path: &Path, today: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("DTS-OUT");
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("xlsx");
    path.with_file_name(format!("{stem}-{today}.{ext}"))
}

impl AppConfig {
    /// Load and validate the three config documents and resolve run paths.
    #[allow(clippy::too_many_arguments)]
    pub fn load(
        member_cnf: &Path,
        version_cnf: &Path,
        settings_cnf: &Path,
        input: &Path,
        history: &Path,
        report: &Path,
    ) -> Result<Self, DtsError> {
        let settings: Settings = read_json(settings_cnf)?;
        let roster: Roster = read_json(member_cnf)?;
        roster.validate(member_cnf)?;
        let versions: VersionSelection = read_json(version_cnf)?;
        versions.validate(version_cnf)?;

        if !input.is_file() {
            return Err(DtsError::MissingFile {
                path: input.to_path_buf(),
            });
        }

        let today = chrono::Local::now().format("%Y%m%d").to_string();
        let report = if settings.timestamp {
            timestamped(report, &today)
        } else {
            report.to_path_buf()
        };

        Ok(Self {
            roster,
            versions,
            settings,
            paths: RunPaths {
                input: input.to_path_buf(),
                history: history.to_path_buf(),
                report,
            },
            today,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    #[test]
    fn roster_parses_in_file_order() {
        let roster: Roster = serde_json::from_str(indoc! {r#"
            {
                "平台组": {"zhangsan": "张三", "lisi": "李四"},
                "应用组": {"wangwu": "王五"}
            }
        "#})
        .unwrap();
        let teams: Vec<&String> = roster.teams.keys().collect();
        assert_eq!(teams, ["平台组", "应用组"]);
        let names = roster.display_names();
        assert_eq!(names.get("lisi"), Some(&"李四".to_string()));
        assert_eq!(names.len(), 3);
        assert!(roster.validate(Path::new("member.json")).is_ok());
    }

    #[test]
    fn empty_roster_is_rejected() {
        let roster: Roster = serde_json::from_str("{}").unwrap();
        assert!(roster.validate(Path::new("member.json")).is_err());
    }

    #[test]
    fn version_selection_requires_include_and_single() {
        let sel: VersionSelection =
            serde_json::from_str(r#"{"include": [], "exclude": [], "single": "V1"}"#).unwrap();
        assert!(sel.validate(Path::new("version.json")).is_err());

        let sel: VersionSelection =
            serde_json::from_str(r#"{"include": ["V1"], "single": ""}"#).unwrap();
        assert!(sel.validate(Path::new("version.json")).is_err());

        let sel: VersionSelection =
            serde_json::from_str(r#"{"include": ["V1"], "single": "V1"}"#).unwrap();
        assert!(sel.validate(Path::new("version.json")).is_ok());
        // Missing exclude key means no exclusion.
        assert!(sel.exclude.is_empty());
    }

    #[test]
    fn settings_keys_match_the_settings_file() {
        let settings: Settings = serde_json::from_str(indoc! {r#"
            {"URL": "http://dts/", "DEBUG": false, "CH_NAME": true, "TIMESTAMP": true}
        "#})
        .unwrap();
        assert_eq!(settings.url, "http://dts/");
        assert!(settings.change_name);
        assert!(settings.timestamp);

        // A missing key is a parse error, reported against the file.
        let missing: Result<Settings, _> =
            serde_json::from_str(r#"{"URL": "http://dts/", "DEBUG": false}"#);
        assert!(missing.is_err());
    }

    #[test]
    fn timestamped_report_name_keeps_extension() {
        assert_eq!(
            timestamped(Path::new("DTS-OUT.xlsx"), "20260827"),
            PathBuf::from("DTS-OUT-20260827.xlsx")
        );
        assert_eq!(
            timestamped(Path::new("out/report.xlsx"), "20260827"),
            PathBuf::from("out/report-20260827.xlsx")
        );
    }
}
