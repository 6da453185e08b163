use std::io;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use envdesk_core::default_config_path;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod format;
mod style;
mod util;

use cli::{Cli, Commands};
use commands::{HistoryArgs, SuggestArgs, WatchArgs};
use format::FormatOptions;

fn env_filter(cli: &Cli) -> EnvFilter {
    // When quiet mode is enabled, suppress info-level logging
    if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Log file for the dashboard, which owns the terminal while it runs.
#[cfg(feature = "tui")]
fn dashboard_log_path() -> Option<std::path::PathBuf> {
    dirs::data_local_dir().map(|d| d.join("envdesk").join("dashboard.log"))
}

fn init_tracing(cli: &Cli) {
    let filter = env_filter(cli);

    #[cfg(feature = "tui")]
    if matches!(cli.command, Commands::Dashboard) {
        let file = dashboard_log_path().and_then(|path| {
            std::fs::create_dir_all(path.parent()?).ok()?;
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });
        match file {
            Some(file) => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init(),
            None => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::sink)
                .init(),
        }
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    // Handle completions command early (before tracing init)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "envdesk", &mut io::stdout());
        return Ok(());
    }

    init_tracing(&cli);

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let opts = FormatOptions::new(cli.no_color, cli.style).with_compact(cli.compact);

    // Config management works on the raw file, so broken files can be inspected
    if let Commands::Config { action } = cli.command {
        return commands::cmd_config(action, &config_path, cli.json, &opts);
    }

    let config = util::load_config(cli.config.as_deref())?;
    let opts = if config.display.no_color {
        FormatOptions::new(true, cli.style).with_compact(cli.compact)
    } else {
        opts
    };
    let output = cli.output.as_ref();

    match cli.command {
        Commands::Read { output: out } => {
            let opts = opts.with_no_header(out.no_header);
            commands::cmd_read(
                &config,
                cli.offline,
                out.resolve(cli.json),
                output,
                cli.quiet,
                &opts,
            )
            .await?;
        }
        Commands::History {
            metric,
            count,
            output: out,
        } => {
            let opts = opts.with_no_header(out.no_header);
            commands::cmd_history(HistoryArgs {
                config: &config,
                offline: cli.offline,
                metric,
                count,
                format: out.resolve(cli.json),
                output,
                quiet: cli.quiet,
                opts: &opts,
            })
            .await?;
        }
        Commands::Watch {
            interval,
            count,
            output: out,
        } => {
            let opts = opts.with_no_header(out.no_header);
            commands::cmd_watch(WatchArgs {
                config: &config,
                offline: cli.offline,
                interval: interval.unwrap_or(config.telemetry.poll_interval_secs),
                count,
                format: out.resolve(cli.json),
                output,
                opts: &opts,
            })
            .await?;
        }
        Commands::Suggest {
            fallback,
            output: out,
        } => {
            let opts = opts.with_no_header(out.no_header);
            commands::cmd_suggest(SuggestArgs {
                config: &config,
                offline: cli.offline,
                fallback,
                format: out.resolve(cli.json),
                output,
                quiet: cli.quiet,
                opts: &opts,
            })
            .await?;
        }
        Commands::Pomodoro { durations, cycles } => {
            let settings = commands::apply_overrides(config.pomodoro, &durations);
            commands::cmd_pomodoro(settings, cycles, cli.quiet, opts.no_color).await?;
        }
        Commands::Send { command, value } => {
            commands::cmd_send(&config, &command, value, cli.quiet, &opts).await?;
        }
        #[cfg(feature = "tui")]
        Commands::Dashboard => {
            let source = util::telemetry_source(&config, cli.offline)?;
            let engine = util::suggestion_engine(&config, cli.offline, None)?;
            let store = util::store_client(&config)?;
            envdesk_cli::tui::run(config, source, engine, store).await?;
        }
        Commands::Config { .. } | Commands::Completions { .. } => {
            // Already handled above
            unreachable!()
        }
    }

    Ok(())
}
