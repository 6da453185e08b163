//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use envdesk_core::FallbackMode;
use envdesk_types::Metric;

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

/// Visual styling mode for output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum StyleMode {
    /// Standard styling with colors
    Minimal,
    /// Rich styling with tables and full formatting (default)
    #[default]
    Rich,
    /// Plain text with no decorations (for scripting)
    Plain,
}

/// Reusable output format arguments
#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Omit header row in CSV output (useful for appending)
    #[arg(long)]
    pub no_header: bool,
}

impl OutputArgs {
    /// Resolve the effective format: `--json` wins over `--format`.
    pub fn resolve(&self, json: bool) -> OutputFormat {
        if json { OutputFormat::Json } else { self.format }
    }
}

#[derive(Parser)]
#[command(name = "envdesk")]
#[command(author, version, about = "Workspace comfort monitor: telemetry, suggestions and a Pomodoro timer", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as JSON (shorthand for --format json)
    #[arg(long, global = true)]
    pub json: bool,

    /// Output compact JSON (no pretty-printing)
    #[arg(long, global = true)]
    pub compact: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Use mock telemetry and rule-based suggestions; no network access
    #[arg(long, global = true, env = "ENVDESK_OFFLINE")]
    pub offline: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, env = "ENVDESK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Visual styling mode (minimal, rich, plain)
    #[arg(
        long,
        global = true,
        value_enum,
        default_value = "rich",
        env = "ENVDESK_STYLE"
    )]
    pub style: StyleMode,

    /// Write output to file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read current workspace conditions
    Read {
        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show recent telemetry history
    History {
        /// Only show this metric (light, temperature, humidity, noise)
        #[arg(short, long, value_parser = parse_metric)]
        metric: Option<Metric>,

        /// Number of samples per metric
        #[arg(short = 'n', long, default_value = "24", value_parser = clap::value_parser!(u16).range(1..=8000))]
        count: u16,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Continuously poll telemetry
    Watch {
        /// Polling interval in seconds (defaults to the configured poll interval)
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,

        /// Number of polls before exiting (0 for unlimited)
        #[arg(short = 'n', long, default_value = "0")]
        count: u32,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Generate workspace suggestions for the current conditions
    Suggest {
        /// Fallback when the model is unavailable (rules, placeholder)
        #[arg(long, value_parser = parse_fallback)]
        fallback: Option<FallbackMode>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Run a Pomodoro timer in the terminal
    Pomodoro {
        #[command(flatten)]
        durations: PomodoroArgs,

        /// Stop after this many completed work sessions (0 for unlimited)
        #[arg(long, default_value = "0")]
        cycles: u32,
    },

    /// Queue a command for the workspace hardware
    Send {
        /// Command identifier, e.g. decrease_temperature
        command: String,

        /// Adjustment amount
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Launch interactive terminal dashboard
    #[cfg(feature = "tui")]
    Dashboard,
}

/// Pomodoro duration overrides (minutes).
#[derive(Debug, Clone, Args)]
pub struct PomodoroArgs {
    /// Work session length in minutes
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub work: Option<u32>,

    /// Short break length in minutes
    #[arg(short = 'b', long = "break", value_parser = clap::value_parser!(u32).range(1..))]
    pub short_break: Option<u32>,

    /// Long break length in minutes
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u32).range(1..))]
    pub long_break: Option<u32>,

    /// Work sessions before a long break
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    pub sessions: Option<u32>,
}

/// Configuration subcommands
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration (secrets masked)
    Show,

    /// Show configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file without asking
        #[arg(short, long)]
        force: bool,
    },

    /// Check the configuration file for errors
    Validate,
}

/// Parse a metric name.
fn parse_metric(s: &str) -> Result<Metric, String> {
    s.parse().map_err(|e: envdesk_types::ParseError| e.to_string())
}

/// Parse a fallback mode name.
fn parse_fallback(s: &str) -> Result<FallbackMode, String> {
    s.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_metric() {
        assert_eq!(parse_metric("temp"), Ok(Metric::Temperature));
        assert!(parse_metric("co2").is_err());
    }

    #[test]
    fn test_json_flag_overrides_format() {
        let cli = Cli::parse_from(["envdesk", "--json", "read", "--format", "csv"]);
        match cli.command {
            Commands::Read { output } => assert_eq!(output.resolve(cli.json), OutputFormat::Json),
            _ => panic!("expected read"),
        }
    }

    #[test]
    fn test_history_args() {
        let cli = Cli::parse_from(["envdesk", "history", "-m", "noise", "-n", "5"]);
        match cli.command {
            Commands::History { metric, count, .. } => {
                assert_eq!(metric, Some(Metric::Noise));
                assert_eq!(count, 5);
            }
            _ => panic!("expected history"),
        }
    }

    #[test]
    fn test_send_accepts_negative_value() {
        let cli = Cli::parse_from(["envdesk", "send", "increase_light", "-20"]);
        match cli.command {
            Commands::Send { command, value } => {
                assert_eq!(command, "increase_light");
                assert_eq!(value, -20.0);
            }
            _ => panic!("expected send"),
        }
    }

    #[test]
    fn test_pomodoro_break_flag() {
        let cli = Cli::parse_from(["envdesk", "pomodoro", "--work", "50", "--break", "10"]);
        match cli.command {
            Commands::Pomodoro { durations, cycles } => {
                assert_eq!(durations.work, Some(50));
                assert_eq!(durations.short_break, Some(10));
                assert_eq!(durations.long_break, None);
                assert_eq!(cycles, 0);
            }
            _ => panic!("expected pomodoro"),
        }
    }

    #[test]
    fn test_zero_duration_rejected() {
        assert!(Cli::try_parse_from(["envdesk", "pomodoro", "--work", "0"]).is_err());
    }
}
