//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use jsonmap_core::DuplicateLabelPolicy;
use std::path::PathBuf;

/// jsonmap - inspect and check JSON value substitution specs
///
/// Parses `code:label;code:label` specs the same way the transcoding engine
/// does, so malformed or ambiguous tables are caught before they ship.
#[derive(Parser, Debug)]
#[command(
    name = "jsonmap",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "JSONMAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a substitution spec and show both lookup directions
    Inspect(InspectArgs),

    /// Check every field of a record manifest
    Check(CheckArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the inspect command
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Substitution spec, e.g. "0:dog;1:cat;2:cow"
    #[arg(value_name = "SPEC")]
    pub spec: String,

    /// Field name to report errors against
    #[arg(short, long, default_value = "field")]
    pub field: String,

    /// Duplicate code/label policy (overrides the configuration)
    #[arg(long, value_enum)]
    pub duplicates: Option<DuplicatePolicy>,
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Path to the record manifest (JSON, YAML or TOML)
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,

    /// Duplicate code/label policy (overrides the configuration)
    #[arg(long, value_enum)]
    pub duplicates: Option<DuplicatePolicy>,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Duplicate code/label policy
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum DuplicatePolicy {
    /// Later pairs replace earlier ones
    LastDeclaredWins,
    /// Any repeated code or label is an error
    Reject,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl From<DuplicatePolicy> for DuplicateLabelPolicy {
    fn from(policy: DuplicatePolicy) -> Self {
        match policy {
            DuplicatePolicy::LastDeclaredWins => DuplicateLabelPolicy::LastDeclaredWins,
            DuplicatePolicy::Reject => DuplicateLabelPolicy::Reject,
        }
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_inspect_parsing() {
        let cli = Cli::parse_from([
            "jsonmap",
            "inspect",
            "0:dog;1:cat",
            "--field",
            "Animal.type",
            "--duplicates",
            "reject",
        ]);

        match cli.command {
            Commands::Inspect(args) => {
                assert_eq!(args.spec, "0:dog;1:cat");
                assert_eq!(args.field, "Animal.type");
                assert_eq!(args.duplicates, Some(DuplicatePolicy::Reject));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_verbosity_level() {
        let cli = Cli::parse_from(["jsonmap", "-vv", "check", "records.toml"]);
        assert_eq!(cli.verbosity_level(), 2);

        let cli = Cli::parse_from(["jsonmap", "--quiet", "check", "records.toml"]);
        assert_eq!(cli.verbosity_level(), 0);
    }

    #[test]
    fn test_output_format_parsing() {
        let cli = Cli::parse_from(["jsonmap", "--output", "json-pretty", "completions", "bash"]);
        assert_eq!(cli.output, OutputFormat::JsonPretty);
    }

    #[test]
    fn test_policy_conversion() {
        assert_eq!(
            DuplicateLabelPolicy::from(DuplicatePolicy::LastDeclaredWins),
            DuplicateLabelPolicy::LastDeclaredWins
        );
    }
}
