//! Suggest command implementation.

use std::path::PathBuf;

use anyhow::Result;
use envdesk_core::{Config, FallbackMode, SuggestionSource};

use crate::cli::OutputFormat;
use crate::format::{
    FormatOptions, format_suggestions_csv, format_suggestions_json, format_suggestions_text,
};
use crate::style;
use crate::util::{current_view, suggestion_engine, telemetry_source, write_output};

/// Arguments for the suggest command.
pub struct SuggestArgs<'a> {
    pub config: &'a Config,
    pub offline: bool,
    pub fallback: Option<FallbackMode>,
    pub format: OutputFormat,
    pub output: Option<&'a PathBuf>,
    pub quiet: bool,
    pub opts: &'a FormatOptions,
}

pub async fn cmd_suggest(args: SuggestArgs<'_>) -> Result<()> {
    let SuggestArgs {
        config,
        offline,
        fallback,
        format,
        output,
        quiet,
        opts,
    } = args;

    let source = telemetry_source(config, offline)?;
    let engine = suggestion_engine(config, offline, fallback)?;

    let show_progress = !quiet && format == OutputFormat::Text && output.is_none();
    let spinner = show_progress.then(|| style::operation_spinner("Fetching telemetry..."));
    let view = current_view(source, config).await;
    if let Some(sp) = &spinner {
        sp.set_message("Generating suggestions...");
    }
    // Always generate here; the live-data gate only applies to the dashboard
    let batch = engine.generate(&view.snapshot).await;
    if let Some(sp) = spinner {
        sp.finish_and_clear();
    }

    if !quiet && format == OutputFormat::Text && batch.source == SuggestionSource::Placeholder {
        eprintln!(
            "{}",
            style::format_warning("Suggestion service unavailable", opts.no_color)
        );
    }

    let content = match format {
        OutputFormat::Json => format_suggestions_json(&batch, opts)?,
        OutputFormat::Csv => format_suggestions_csv(&batch, opts),
        OutputFormat::Text => format_suggestions_text(&batch, opts),
    };
    write_output(output, &content)
}
