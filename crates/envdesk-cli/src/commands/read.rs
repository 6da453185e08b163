//! Read command implementation.

use std::path::PathBuf;

use anyhow::Result;
use envdesk_core::Config;

use crate::cli::OutputFormat;
use crate::format::{FormatOptions, format_snapshot_csv, format_snapshot_json, format_snapshot_text};
use crate::style;
use crate::util::{current_view, telemetry_source, write_output};

pub async fn cmd_read(
    config: &Config,
    offline: bool,
    format: OutputFormat,
    output: Option<&PathBuf>,
    quiet: bool,
    opts: &FormatOptions,
) -> Result<()> {
    let source = telemetry_source(config, offline)?;

    let show_progress = !quiet && format == OutputFormat::Text && output.is_none();
    let spinner = show_progress.then(|| style::operation_spinner("Fetching telemetry..."));
    let view = current_view(source, config).await;
    if let Some(sp) = spinner {
        sp.finish_and_clear();
    }

    let content = match format {
        OutputFormat::Json => format_snapshot_json(&view, opts)?,
        OutputFormat::Csv => format_snapshot_csv(&view, opts),
        OutputFormat::Text => format_snapshot_text(&view, opts),
    };
    write_output(output, &content)
}
