use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;

mod cli;
mod commands;

use cli::Cli;
use commands::Status;

/// Exit code when the operator declines the confirmation prompt.
const EXIT_DECLINED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // Usage errors exit 1 so that 2 stays reserved for a declined prompt.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            e.print().ok();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_logging(cli.verbose, cli.quiet);

    match cli.execute().await {
        Ok(Status::Done) => ExitCode::SUCCESS,
        Ok(Status::Declined) => {
            eprintln!("Aborted by operator.");
            ExitCode::from(EXIT_DECLINED)
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn level_filter(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Warn;
    }
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn init_logging(verbose: u8, quiet: bool) {
    // RUST_LOG overrides the verbosity flags
    env_logger::Builder::new()
        .filter_level(level_filter(verbose, quiet))
        .parse_default_env()
        .format_timestamp(None)
        .format_target(verbose >= 2)
        .init();
}
