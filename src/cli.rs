use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "dtstat")]
#[command(about = "DTS defect-ticket DI analyzer and report generator", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Exit immediately instead of pausing so the operator can read the log
    #[arg(long = "no-pause", global = true)]
    pub no_pause: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a ticket export and write the DI report and trend history
    Analyze {
        /// Ticket export to analyze
        #[arg(short, long, default_value = "DTS-IN.csv")]
        input: PathBuf,

        /// Daily DI history table, created on first run
        #[arg(long, default_value = "DI-DAILY.csv")]
        history: PathBuf,

        /// Report workbook to write
        #[arg(short, long, default_value = "DTS-OUT.xlsx")]
        output: PathBuf,

        /// Team roster file
        #[arg(long = "member", default_value = "member.json")]
        member_cnf: PathBuf,

        /// Version selection file
        #[arg(long = "versions", default_value = "version.json")]
        version_cnf: PathBuf,

        /// Runtime settings file
        #[arg(long = "settings", default_value = "settings.json")]
        settings_cnf: PathBuf,

        /// Do not open the report in the default viewer afterwards
        #[arg(long = "no-open")]
        no_open: bool,
    },

    /// Write template configuration files
    Init {
        /// Force overwrite existing config files
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_defaults_match_the_conventional_filenames() {
        let cli = Cli::parse_from(["dtstat", "analyze"]);
        match cli.command {
            Commands::Analyze {
                input,
                history,
                output,
                member_cnf,
                no_open,
                ..
            } => {
                assert_eq!(input, PathBuf::from("DTS-IN.csv"));
                assert_eq!(history, PathBuf::from("DI-DAILY.csv"));
                assert_eq!(output, PathBuf::from("DTS-OUT.xlsx"));
                assert_eq!(member_cnf, PathBuf::from("member.json"));
                assert!(!no_open);
            }
            _ => panic!("expected analyze command"),
        }
        assert!(!cli.no_pause);
    }

    #[test]
    fn paths_and_flags_parse() {
        let cli = Cli::parse_from([
            "dtstat", "analyze", "--input", "export.csv", "--no-open", "--no-pause",
        ]);
        assert!(cli.no_pause);
        match cli.command {
            Commands::Analyze { input, no_open, .. } => {
                assert_eq!(input, PathBuf::from("export.csv"));
                assert!(no_open);
            }
            _ => panic!("expected analyze command"),
        }
    }

    #[test]
    fn init_parses_force() {
        let cli = Cli::parse_from(["dtstat", "init", "--force"]);
        match cli.command {
            Commands::Init { force } => assert!(force),
            _ => panic!("expected init command"),
        }
    }
}
