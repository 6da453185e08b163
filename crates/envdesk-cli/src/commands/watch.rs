//! Watch command implementation.
//!
//! Keeps one poller alive for the whole session so history windows grow with
//! each poll. A failed poll keeps the previous values and is reported on
//! stderr; the loop never exits on a transient error.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use envdesk_core::{Config, MergedView, TelemetryPoller, mock_environment};
use owo_colors::OwoColorize;
use time::OffsetDateTime;

use crate::cli::OutputFormat;
use crate::format::{
    FormatOptions, format_watch_csv_header, format_watch_csv_line, format_watch_json,
    format_watch_line,
};
use crate::util::{telemetry_source, write_output};

/// Arguments for the watch command.
pub struct WatchArgs<'a> {
    pub config: &'a Config,
    pub offline: bool,
    pub interval: u64,
    pub count: u32,
    pub format: OutputFormat,
    pub output: Option<&'a PathBuf>,
    pub opts: &'a FormatOptions,
}

pub async fn cmd_watch(args: WatchArgs<'_>) -> Result<()> {
    let WatchArgs {
        config,
        offline,
        interval,
        count,
        format,
        output,
        opts,
    } = args;

    let source = telemetry_source(config, offline)?;
    let mut poller = TelemetryPoller::new(source, config.telemetry.history_count);
    let mut fallback = mock_environment();
    config.thresholds().apply_to(&mut fallback);

    let target = match (offline, config.telemetry.channel_id.as_deref()) {
        (false, Some(channel)) if config.telemetry.is_configured() => format!("channel {}", channel),
        _ => "mock telemetry".to_string(),
    };
    let header = if opts.no_color {
        format!("Watching: {}", target)
    } else {
        format!("Watching: {}", target.green())
    };
    eprintln!("{}", header);
    if count > 0 {
        eprintln!(
            "Interval: {}s | Count: {} | Press Ctrl+C to stop",
            interval, count
        );
    } else {
        eprintln!("Interval: {}s | Press Ctrl+C to stop", interval);
    }
    eprintln!("{}", "-".repeat(50));

    let mut header_written = opts.no_header;
    let mut readings_taken: u32 = 0;

    poller.initialize().await;
    loop {
        let state = poller.state();
        if let Some(error) = &state.last_error {
            eprintln!("Poll failed: {}. Keeping previous values.", error);
        }

        let view = MergedView::build(state, &fallback, OffsetDateTime::now_utc());
        readings_taken += 1;
        let content = match format {
            OutputFormat::Json => format_watch_json(&view)?,
            OutputFormat::Csv => {
                let mut out = String::new();
                if !header_written {
                    out.push_str(&format_watch_csv_header(opts));
                    header_written = true;
                }
                out.push_str(&format_watch_csv_line(&view.snapshot));
                out
            }
            OutputFormat::Text => format_watch_line(&view.snapshot, opts),
        };
        append_output(output, &content)?;

        if count > 0 && readings_taken >= count {
            eprintln!("Completed {} readings.", readings_taken);
            return Ok(());
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                eprintln!("\nShutting down...");
                return Ok(());
            }
            _ = tokio::time::sleep(Duration::from_secs(interval)) => {}
        }
        poller.poll().await;
    }
}

/// Append to the output file, or print to stdout.
fn append_output(output: Option<&PathBuf>, content: &str) -> Result<()> {
    use std::io::Write;

    match output {
        Some(path) => {
            let mut file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            file.write_all(content.as_bytes())?;
            Ok(())
        }
        None => write_output(None, content),
    }
}
