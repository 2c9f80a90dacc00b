//! logprobe -- incremental log checker for monitoring systems
//!
//! Prints one verdict line on stdout and exits with the plugin code
//! (OK=0, WARNING=1, CRITICAL=2, UNKNOWN=3).

mod cli;
mod error;
mod logging;
mod output;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info};

use logprobe_checker::{CheckerConfig, LOCK_TIMEOUT_MESSAGE, LogChecker};
use logprobe_core::{ProbeConfig, State};

use cli::{Cli, OutputFormat};
use error::CliError;
use output::{OutputWriter, Report};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if !e.use_stderr() => {
            // --help / --version
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            let summary = e.to_string();
            let summary = summary.lines().next().unwrap_or_default();
            let err = CliError::Config(summary.trim_start_matches("error: ").to_owned());
            return exit_with(OutputFormat::Text, &Report::new(State::Unknown, err.plugin_line()));
        }
    };

    let report = match run(&cli) {
        Ok(report) => report,
        Err(e) => Report::new(State::Unknown, e.plugin_line()),
    };
    exit_with(cli.output, &report)
}

fn run(cli: &Cli) -> Result<Report, CliError> {
    let mut config = load_config(cli.config.as_deref())?;
    cli.apply_to(&mut config)?;

    logging::init_tracing(&config.general).map_err(|e| CliError::Config(e.to_string()))?;
    debug!(logfile = %cli.logfile, "logprobe starting");

    let mut checker = LogChecker::new(CheckerConfig::from_core(&config.check))?;

    if cli.reset {
        return Ok(match checker.reset_offsets(&cli.logfile, cli.state_dir.as_deref())? {
            Some(removed) => {
                info!(removed, "offset records reset");
                Report::new(State::Ok, format!("OK - Removed {removed} offset records."))
            }
            None => Report::new(State::Unknown, LOCK_TIMEOUT_MESSAGE),
        });
    }

    let state = checker.check(
        &cli.logfile,
        cli.seekfile.as_deref(),
        cli.state_dir.as_deref(),
    )?;
    Ok(Report::new(state, checker.message()))
}

/// Configuration file, or defaults, with environment overrides applied.
fn load_config(path: Option<&Path>) -> Result<ProbeConfig, CliError> {
    match path {
        Some(path) => Ok(ProbeConfig::load(path)?),
        None => {
            let mut config = ProbeConfig::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }
}

fn exit_with(format: OutputFormat, report: &Report) -> ExitCode {
    let code = match OutputWriter::new(format).render(report) {
        Ok(()) => report.state.exit_code(),
        Err(e) => {
            eprintln!("{e}");
            e.exit_code()
        }
    };
    ExitCode::from(u8::try_from(code).unwrap_or(3))
}
