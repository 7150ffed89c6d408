use clap::Parser;
use dtstat::cli::{Cli, Commands};
use dtstat::commands;
use dtstat::errors::DtsError;
use log::{error, info};
use std::time::Duration;

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    info!("dtstat v{}", env!("CARGO_PKG_VERSION"));

    let result = match cli.command {
        Commands::Analyze {
            input,
            history,
            output,
            member_cnf,
            version_cnf,
            settings_cnf,
            no_open,
        } => {
            let opts = commands::analyze::AnalyzeOptions {
                input,
                history,
                report: output,
                member_cnf,
                version_cnf,
                settings_cnf,
                open_report: !no_open,
            };
            commands::analyze::run(&opts).map_err(anyhow::Error::from)
        }
        Commands::Init { force } => commands::init::init_config(force),
    };

    // The exit is always code 0 with an operator-facing pause: the tool is
    // run interactively from a console window that would vanish otherwise.
    let delay = match result {
        Ok(()) => 5,
        Err(e) => {
            error!("{e:#}");
            e.downcast_ref::<DtsError>()
                .map(DtsError::exit_delay_secs)
                .unwrap_or(20)
        }
    };
    exit_delay(delay, cli.no_pause);
}

fn exit_delay(secs: u64, skip: bool) -> ! {
    if !skip {
        info!("exiting in {secs}s...");
        std::thread::sleep(Duration::from_secs(secs));
    }
    std::process::exit(0);
}
