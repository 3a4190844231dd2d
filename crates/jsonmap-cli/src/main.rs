//! Jsonmap CLI - inspect and check value substitution specs
//!
//! This is the main entry point for the `jsonmap` binary, providing commands
//! for parsing substitution specs and checking record manifests with the same
//! rules the transcoding engine applies at run time.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;

fn main() {
    let cli = Cli::parse_args();

    control::set_override(cli.use_color());

    let result = Config::load_with_file(cli.config.as_deref()).and_then(|mut config| {
        if let Err(e) = init_logging(&cli, &config) {
            eprintln!("Failed to initialize logging: {}", e);
        }
        // Invalid values are reported through tracing, so this runs after init
        config.mapper.merge_with_env();
        run(cli, config)
    });

    match result {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!("{}", error::format_error(&e, control::SHOULD_COLORIZE.should_colorize()));

            if e.should_show_help() {
                eprintln!("\nFor more information, try '--help'");
            }

            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
#[instrument(skip(cli, config), fields(command = ?cli.command))]
fn run(cli: Cli, config: Config) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let mut output = OutputWriter::new(cli.output, cli.use_color(), cli.quiet);

    tracing::info!(
        verbosity = cli.verbosity_level(),
        duplicate_labels = ?config.mapper.duplicate_labels,
        "Executing command"
    );

    match cli.command {
        Commands::Inspect(args) => handlers::handle_inspect(args, &config, &mut output),
        Commands::Check(args) => handlers::handle_check(args, &config, &mut output),
        Commands::Completions(args) => handlers::handle_completions(args),
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: &Config) -> Result<()> {
    // A [logging] section replaces the verbosity defaults; -v still raises the level
    let mut logging_config = match &config.logging {
        Some(file_config) if cli.verbose == 0 => file_config.clone(),
        _ => LoggingConfig::from_verbosity(cli.verbosity_level()),
    };

    let env_format = logging_config.merge_with_env();

    if cli.quiet {
        logging_config.level = "error".to_string();
    }

    logging::init_logging(logging_config)?;
    if let Err(e) = env_format {
        tracing::warn!(variable = logging::ENV_LOG_FORMAT, "{}, keeping the configured format", e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["jsonmap", "-vv", "inspect", "0:dog;1:cat"]);
        assert_eq!(cli.verbosity_level(), 2);

        let cli = Cli::parse_from(["jsonmap", "--quiet", "check", "records.json"]);
        assert_eq!(cli.verbosity_level(), 0);
    }

    #[test]
    fn test_run_inspect() {
        let cli = Cli::parse_from(["jsonmap", "--output", "json", "--quiet", "inspect", "0:dog;1:cat"]);
        assert!(run(cli, Config::default()).is_ok());
    }

    #[test]
    fn test_run_reports_malformed_spec() {
        let cli = Cli::parse_from(["jsonmap", "inspect", "0:dog;1cat", "--field", "Animal.type"]);
        let err = run(cli, Config::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
