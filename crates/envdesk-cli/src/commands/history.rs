//! History command implementation.

use std::path::PathBuf;

use anyhow::{Result, bail};
use envdesk_core::{Config, Metric};
use tracing::warn;

use crate::cli::OutputFormat;
use crate::format::{
    FormatOptions, MetricHistory, format_history_csv, format_history_json, format_history_text,
};
use crate::style;
use crate::util::{telemetry_source, write_output};

/// Arguments for the history command.
pub struct HistoryArgs<'a> {
    pub config: &'a Config,
    pub offline: bool,
    pub metric: Option<Metric>,
    pub count: u16,
    pub format: OutputFormat,
    pub output: Option<&'a PathBuf>,
    pub quiet: bool,
    pub opts: &'a FormatOptions,
}

pub async fn cmd_history(args: HistoryArgs<'_>) -> Result<()> {
    let HistoryArgs {
        config,
        offline,
        metric,
        count,
        format,
        output,
        quiet,
        opts,
    } = args;

    let source = telemetry_source(config, offline)?;
    let metrics: Vec<Metric> = match metric {
        Some(m) => vec![m],
        None => Metric::ALL.to_vec(),
    };

    let show_progress = !quiet && format == OutputFormat::Text && output.is_none();
    let spinner = show_progress.then(|| style::operation_spinner("Downloading history..."));

    let mut series = Vec::with_capacity(metrics.len());
    let mut last_error = None;
    for metric in metrics {
        match source.history(metric, usize::from(count)).await {
            Ok(points) => series.push(MetricHistory { metric, points }),
            Err(e) => {
                warn!(metric = %metric, error = %e, "Failed to fetch history");
                last_error = Some(e);
            }
        }
    }

    if let Some(sp) = spinner {
        sp.finish_and_clear();
    }

    if series.is_empty() {
        match last_error {
            Some(e) => bail!("Failed to fetch history: {}", e),
            None => bail!("No metrics selected"),
        }
    }

    let content = match format {
        OutputFormat::Json => format_history_json(&series, opts)?,
        OutputFormat::Csv => format_history_csv(&series, opts),
        OutputFormat::Text => format_history_text(&series, opts),
    };
    write_output(output, &content)
}
