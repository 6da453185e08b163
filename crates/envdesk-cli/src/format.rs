//! Output formatting utilities for text, JSON, and CSV output.

use anyhow::Result;
use envdesk_core::trend::history_trend;
use envdesk_core::{MergedView, RangeStatus, SuggestionBatch, Thresholds};
use envdesk_types::{DataPoint, EnvironmentSnapshot, Metric, Reading, Trend};
use owo_colors::OwoColorize;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

use crate::cli::StyleMode;
use crate::style;

/// Formatting options for output.
#[derive(Debug, Clone, Copy)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
    /// Omit header row in CSV output.
    pub no_header: bool,
    /// Use compact JSON output (no pretty-printing).
    pub compact: bool,
    /// Visual styling mode.
    pub style: StyleMode,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            no_color: false,
            no_header: false,
            compact: false,
            style: StyleMode::Rich,
        }
    }
}

impl FormatOptions {
    pub fn new(no_color: bool, style: StyleMode) -> Self {
        // Plain mode automatically disables colors for pipe-friendliness
        Self {
            no_color: no_color || style == StyleMode::Plain,
            style,
            ..Self::default()
        }
    }

    /// Check if rich styling is enabled.
    pub fn is_rich(&self) -> bool {
        self.style == StyleMode::Rich
    }

    /// Check if plain styling is enabled (no decorations).
    pub fn is_plain(&self) -> bool {
        self.style == StyleMode::Plain
    }

    /// Create with no_header option for CSV output.
    pub fn with_no_header(mut self, no_header: bool) -> Self {
        self.no_header = no_header;
        self
    }

    /// Create with compact JSON option.
    pub fn with_compact(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    /// Serialize value to JSON string, respecting compact option.
    pub fn as_json<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.compact {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        Ok(json + "\n")
    }

    /// Format a value with its unit. Plain mode drops the degree sign.
    #[must_use]
    pub fn format_value(&self, metric: Metric, value: f64, unit: &str) -> String {
        let number = format_number(metric, value);
        match unit {
            "%" => format!("{}%", number),
            "°C" if self.is_plain() => format!("{} C", number),
            _ => format!("{} {}", number, unit),
        }
    }
}

/// Number with the precision used for `metric`.
#[must_use]
pub fn format_number(metric: Metric, value: f64) -> String {
    match metric {
        Metric::Temperature => format!("{:.1}", value),
        Metric::Light | Metric::Humidity | Metric::Noise => format!("{:.0}", value),
    }
}

/// Escape a string for CSV output.
/// Wraps the value in quotes if it contains commas, quotes, or newlines.
/// Double quotes are escaped by doubling them.
#[must_use]
pub fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// RFC 3339 timestamp, empty if it cannot be formatted.
#[must_use]
pub fn format_timestamp(ts: OffsetDateTime) -> String {
    ts.format(&Rfc3339).unwrap_or_default()
}

fn format_short_timestamp(ts: OffsetDateTime) -> String {
    ts.format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .unwrap_or_default()
}

fn format_clock(ts: OffsetDateTime) -> String {
    ts.format(format_description!("[hour]:[minute]:[second]"))
        .unwrap_or_default()
}

fn status_name(status: RangeStatus) -> &'static str {
    match status {
        RangeStatus::Below => "low",
        RangeStatus::Optimal => "optimal",
        RangeStatus::Above => "high",
    }
}

// ============================================================================
// Snapshot (read)
// ============================================================================

#[derive(Serialize)]
struct ReadingJson<'a> {
    metric: Metric,
    value: f64,
    unit: &'a str,
    optimal_min: f64,
    optimal_max: f64,
    status: &'static str,
    trend: Option<Trend>,
    source: &'static str,
    history_source: &'static str,
    samples: usize,
}

#[derive(Serialize)]
struct SnapshotJson<'a> {
    timestamp: String,
    readings: Vec<ReadingJson<'a>>,
}

fn snapshot_json(view: &MergedView) -> SnapshotJson<'_> {
    let readings = view
        .snapshot
        .iter()
        .map(|reading| {
            let provenance = view.provenance(reading.metric);
            ReadingJson {
                metric: reading.metric,
                value: reading.value,
                unit: &reading.unit,
                optimal_min: reading.optimal.min,
                optimal_max: reading.optimal.max,
                status: status_name(Thresholds::evaluate_reading(reading)),
                trend: history_trend(&reading.history),
                source: provenance.value.badge(),
                history_source: provenance.history.badge(),
                samples: reading.history.len(),
            }
        })
        .collect();

    SnapshotJson {
        timestamp: format_timestamp(view.snapshot.timestamp),
        readings,
    }
}

pub fn format_snapshot_json(view: &MergedView, opts: &FormatOptions) -> Result<String> {
    opts.as_json(&snapshot_json(view))
}

#[must_use]
pub fn format_snapshot_csv(view: &MergedView, opts: &FormatOptions) -> String {
    let mut output = if opts.no_header {
        String::new()
    } else {
        "timestamp,metric,value,unit,optimal_min,optimal_max,status,trend,source\n".to_string()
    };
    let ts = format_timestamp(view.snapshot.timestamp);
    for reading in view.snapshot.iter() {
        let trend = history_trend(&reading.history)
            .map(|t| t.to_string())
            .unwrap_or_default();
        output.push_str(&format!(
            "{},{},{},{},{},{},{},{},{}\n",
            ts,
            reading.metric,
            format_number(reading.metric, reading.value),
            csv_escape(&reading.unit),
            reading.optimal.min,
            reading.optimal.max,
            status_name(Thresholds::evaluate_reading(reading)),
            trend,
            view.provenance(reading.metric).value.badge(),
        ));
    }
    output
}

#[must_use]
pub fn format_snapshot_text(view: &MergedView, opts: &FormatOptions) -> String {
    if opts.is_rich() {
        return format_snapshot_rich(view, opts);
    }

    let mut output = String::new();
    for reading in view.snapshot.iter() {
        let status = Thresholds::evaluate_reading(reading);
        let value = opts.format_value(reading.metric, reading.value, &reading.unit);
        output.push_str(&format!(
            "{:<12} {} {} {} ({})\n",
            format!("{}:", reading.metric.label()),
            style::format_value_colored(&value, status, opts.no_color),
            style::trend_indicator(history_trend(&reading.history), opts.no_color),
            style::format_status_colored(status, opts.no_color),
            style::format_source_badge(view.provenance(reading.metric).value, opts.no_color),
        ));
    }
    output
}

fn format_snapshot_rich(view: &MergedView, opts: &FormatOptions) -> String {
    use tabled::builder::Builder;

    let mut builder = Builder::default();
    builder.push_record(["Metric", "Value", "Trend", "Optimal", "Status", "Source"]);

    for reading in view.snapshot.iter() {
        let status = Thresholds::evaluate_reading(reading);
        let value = opts.format_value(reading.metric, reading.value, &reading.unit);
        builder.push_record([
            reading.metric.label().to_string(),
            style::format_value_colored(&value, status, opts.no_color),
            style::trend_indicator(history_trend(&reading.history), opts.no_color).to_string(),
            format!("{} {}", reading.optimal, reading.unit),
            style::format_status_colored(status, opts.no_color),
            style::format_source_badge(view.provenance(reading.metric).value, opts.no_color),
        ]);
    }

    let mut table = builder.build();
    style::apply_table_style(&mut table, opts.style);

    let mut output = style::format_title(
        &format!(
            "Workspace conditions ({})",
            format_short_timestamp(view.snapshot.timestamp)
        ),
        opts.no_color,
    );
    output.push('\n');
    output.push_str(&table.to_string());
    output.push('\n');

    if !view.has_live_values() {
        output.push_str(&style::format_info(
            "No live telemetry, showing mock data",
            opts.no_color,
        ));
        output.push('\n');
    }
    output
}

// ============================================================================
// History
// ============================================================================

/// Samples for one metric.
#[derive(Debug, Clone)]
pub struct MetricHistory {
    pub metric: Metric,
    pub points: Vec<DataPoint>,
}

impl MetricHistory {
    fn trend(&self) -> Option<Trend> {
        let values: Vec<f64> = self.points.iter().map(|p| p.value).collect();
        envdesk_core::analyze_trend(&values)
    }
}

pub fn format_history_json(series: &[MetricHistory], opts: &FormatOptions) -> Result<String> {
    #[derive(Serialize)]
    struct SeriesJson<'a> {
        metric: Metric,
        unit: &'static str,
        trend: Option<Trend>,
        count: usize,
        points: &'a [DataPoint],
    }

    let body: Vec<SeriesJson> = series
        .iter()
        .map(|s| SeriesJson {
            metric: s.metric,
            unit: s.metric.unit(),
            trend: s.trend(),
            count: s.points.len(),
            points: &s.points,
        })
        .collect();
    opts.as_json(&body)
}

#[must_use]
pub fn format_history_csv(series: &[MetricHistory], opts: &FormatOptions) -> String {
    let mut output = if opts.no_header {
        String::new()
    } else {
        "metric,timestamp,value,unit\n".to_string()
    };
    for s in series {
        for point in &s.points {
            output.push_str(&format!(
                "{},{},{},{}\n",
                s.metric,
                format_timestamp(point.timestamp),
                point.value,
                csv_escape(s.metric.unit()),
            ));
        }
    }
    output
}

#[must_use]
pub fn format_history_text(series: &[MetricHistory], opts: &FormatOptions) -> String {
    use tabled::builder::Builder;

    if series.iter().all(|s| s.points.is_empty()) {
        return "No history samples found.\n".to_string();
    }

    // Narrow terminals get fewer rows to avoid wrapping issues
    let max_rows = if style::terminal_width() < 80 { 10 } else { 20 };
    let mut output = String::new();

    for s in series {
        let header = format!(
            "{} ({} samples, trend {})",
            s.metric.label(),
            s.points.len(),
            style::trend_indicator(s.trend(), opts.no_color)
        );
        output.push_str(&style::format_title(&header, opts.no_color));
        output.push('\n');

        if s.points.is_empty() {
            output.push_str("No samples.\n\n");
            continue;
        }

        let mut builder = Builder::default();
        builder.push_record(["Timestamp", "Value"]);
        let skip = s.points.len().saturating_sub(max_rows);
        for point in s.points.iter().skip(skip) {
            builder.push_record([
                format_short_timestamp(point.timestamp),
                opts.format_value(s.metric, point.value, s.metric.unit()),
            ]);
        }

        let mut table = builder.build();
        style::apply_table_style(&mut table, opts.style);
        output.push_str(&table.to_string());
        output.push('\n');

        if skip > 0 {
            output.push_str(&format!("... {} earlier samples omitted\n", skip));
        }
        output.push('\n');
    }

    if series.iter().any(|s| s.points.len() > max_rows) {
        output.push_str("(Use --format csv or --format json for full data)\n");
    }
    output
}

// ============================================================================
// Suggestions
// ============================================================================

pub fn format_suggestions_json(batch: &SuggestionBatch, opts: &FormatOptions) -> Result<String> {
    opts.as_json(batch)
}

#[must_use]
pub fn format_suggestions_csv(batch: &SuggestionBatch, opts: &FormatOptions) -> String {
    let mut output = if opts.no_header {
        String::new()
    } else {
        "id,type,message,action_label,command,parameter,source\n".to_string()
    };
    for s in &batch.suggestions {
        let (label, command) = s
            .action
            .as_ref()
            .map(|a| (a.label.as_str(), a.command.as_str()))
            .unwrap_or(("", ""));
        output.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            csv_escape(&s.id),
            s.category,
            csv_escape(&s.message),
            csv_escape(label),
            csv_escape(command),
            s.parameter,
            batch.source,
        ));
    }
    output
}

#[must_use]
pub fn format_suggestions_text(batch: &SuggestionBatch, opts: &FormatOptions) -> String {
    let mut output = String::new();
    if !opts.is_plain() {
        output.push_str(&style::format_title(
            &format!("Suggestions ({})", batch.source),
            opts.no_color,
        ));
        output.push('\n');
    }

    if batch.suggestions.is_empty() {
        output.push_str("Conditions look good, nothing to suggest.\n");
        return output;
    }

    for s in &batch.suggestions {
        output.push_str(&format!(
            "{} {}\n",
            style::format_kind_colored(s.category, opts.no_color),
            s.message
        ));
        if let Some(action) = &s.action {
            let command = if opts.no_color {
                format!("{} {}", action.command, s.parameter)
            } else {
                format!("{} {}", action.command.dimmed(), s.parameter.dimmed())
            };
            let arrow = if opts.no_color { "->" } else { "→" };
            output.push_str(&format!("    {} {} ({})\n", arrow, action.label, command));
        }
    }
    output
}

// ============================================================================
// Watch
// ============================================================================

fn watch_cell(reading: &Reading, opts: &FormatOptions) -> String {
    let status = Thresholds::evaluate_reading(reading);
    let value = opts.format_value(reading.metric, reading.value, &reading.unit);
    format!(
        "{} {} {}",
        reading.metric.label(),
        style::format_value_colored(&value, status, opts.no_color),
        style::trend_indicator(history_trend(&reading.history), opts.no_color)
    )
}

#[must_use]
pub fn format_watch_line(snapshot: &EnvironmentSnapshot, opts: &FormatOptions) -> String {
    let cells: Vec<String> = snapshot.iter().map(|r| watch_cell(r, opts)).collect();
    let ts = format_clock(snapshot.timestamp);
    let ts = if opts.no_color {
        format!("[{}]", ts)
    } else {
        format!("[{}]", ts.dimmed())
    };
    format!("{} {}\n", ts, cells.join("  "))
}

#[must_use]
pub fn format_watch_csv_header(opts: &FormatOptions) -> String {
    if opts.no_header {
        return String::new();
    }
    "timestamp,light,temperature,humidity,noise\n".to_string()
}

#[must_use]
pub fn format_watch_csv_line(snapshot: &EnvironmentSnapshot) -> String {
    let values: Vec<String> = snapshot
        .iter()
        .map(|r| format_number(r.metric, r.value))
        .collect();
    format!("{},{}\n", format_timestamp(snapshot.timestamp), values.join(","))
}

pub fn format_watch_json(view: &MergedView) -> Result<String> {
    // One object per line so the stream can be piped
    Ok(serde_json::to_string(&snapshot_json(view))? + "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use envdesk_core::{SuggestionSource, TelemetryState, mock_environment};
    use envdesk_types::{Suggestion, SuggestionAction, SuggestionKind};

    fn plain() -> FormatOptions {
        FormatOptions::new(true, StyleMode::Plain)
    }

    fn mock_view() -> MergedView {
        let fallback = mock_environment();
        MergedView::build(&TelemetryState::default(), &fallback, fallback.timestamp)
    }

    fn batch() -> SuggestionBatch {
        SuggestionBatch {
            suggestions: vec![
                Suggestion::new("s1", SuggestionKind::Warning, "Too warm, lower it")
                    .with_action(SuggestionAction::new("Cool down", "decrease_temperature"), 2.0),
                Suggestion::new("s2", SuggestionKind::Info, "Humidity is fine"),
            ],
            source: SuggestionSource::Rules,
            generated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_plain_disables_color() {
        let opts = FormatOptions::new(false, StyleMode::Plain);
        assert!(opts.no_color);
        assert!(opts.is_plain());
    }

    #[test]
    fn test_format_value_units() {
        let opts = FormatOptions::default();
        assert_eq!(opts.format_value(Metric::Temperature, 23.456, "°C"), "23.5 °C");
        assert_eq!(opts.format_value(Metric::Humidity, 42.4, "%"), "42%");
        assert_eq!(opts.format_value(Metric::Light, 512.0, "lux"), "512 lux");
        assert_eq!(plain().format_value(Metric::Temperature, 21.0, "°C"), "21.0 C");
    }

    #[test]
    fn test_csv_escape() {
        assert_eq!(csv_escape("simple"), "simple");
        assert_eq!(csv_escape("a,b"), "\"a,b\"");
        assert_eq!(csv_escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_as_json_compact() {
        let opts = FormatOptions::default().with_compact(true);
        assert_eq!(opts.as_json(&serde_json::json!({"a": 1})).unwrap(), "{\"a\":1}\n");
    }

    #[test]
    fn test_snapshot_text_plain_lists_all_metrics() {
        let text = format_snapshot_text(&mock_view(), &plain());
        for label in ["Light", "Temperature", "Humidity", "Noise"] {
            assert!(text.contains(label), "missing {label}");
        }
        assert!(text.contains("512 lux"));
        assert!(text.contains("(mock)"));
    }

    #[test]
    fn test_snapshot_csv() {
        let csv = format_snapshot_csv(&mock_view(), &plain());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("timestamp,metric,value"));
        assert!(lines[1].contains(",light,512,lux,300,500,high,"));
        assert!(lines[1].ends_with(",mock"));

        let no_header = format_snapshot_csv(&mock_view(), &plain().with_no_header(true));
        assert_eq!(no_header.lines().count(), 4);
    }

    #[test]
    fn test_snapshot_json() {
        let json = format_snapshot_json(&mock_view(), &plain()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let readings = value["readings"].as_array().unwrap();
        assert_eq!(readings.len(), 4);
        assert_eq!(readings[0]["metric"], "light");
        assert_eq!(readings[0]["status"], "high");
        assert_eq!(readings[0]["source"], "mock");
        assert_eq!(readings[0]["samples"], 24);
    }

    #[test]
    fn test_history_csv_and_json() {
        let series = vec![MetricHistory {
            metric: Metric::Noise,
            points: vec![
                DataPoint::new(50.0, OffsetDateTime::UNIX_EPOCH),
                DataPoint::new(55.0, OffsetDateTime::UNIX_EPOCH + time::Duration::minutes(5)),
            ],
        }];

        let csv = format_history_csv(&series, &plain());
        assert_eq!(
            csv,
            "metric,timestamp,value,unit\n\
             noise,1970-01-01T00:00:00Z,50,dB\n\
             noise,1970-01-01T00:05:00Z,55,dB\n"
        );

        let json = format_history_json(&series, &plain()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["metric"], "noise");
        assert_eq!(value[0]["count"], 2);
        assert!(value[0]["trend"].is_null());
    }

    #[test]
    fn test_history_text_empty() {
        let series = vec![MetricHistory {
            metric: Metric::Light,
            points: Vec::new(),
        }];
        assert_eq!(format_history_text(&series, &plain()), "No history samples found.\n");
    }

    #[test]
    fn test_suggestions_text() {
        let text = format_suggestions_text(&batch(), &FormatOptions::new(true, StyleMode::Rich));
        assert!(text.starts_with("Suggestions (rules)"));
        assert!(text.contains("[WARNING] Too warm, lower it"));
        assert!(text.contains("-> Cool down (decrease_temperature 2)"));
        assert!(text.contains("[INFO] Humidity is fine"));
    }

    #[test]
    fn test_suggestions_csv_escapes_message() {
        let csv = format_suggestions_csv(&batch(), &plain());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "s1,warning,\"Too warm, lower it\",Cool down,decrease_temperature,2,rules"
        );
        assert_eq!(lines[2], "s2,info,Humidity is fine,,,0,rules");
    }

    #[test]
    fn test_suggestions_json_roundtrips_batch() {
        let json = format_suggestions_json(&batch(), &plain()).unwrap();
        let parsed: SuggestionBatch = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, batch());
    }

    #[test]
    fn test_watch_csv() {
        let snapshot = mock_environment();
        assert_eq!(
            format_watch_csv_header(&plain()),
            "timestamp,light,temperature,humidity,noise\n"
        );
        assert!(format_watch_csv_header(&plain().with_no_header(true)).is_empty());
        let line = format_watch_csv_line(&snapshot);
        assert!(line.ends_with(",512,24.7,42,58\n"));
    }

    #[test]
    fn test_watch_line_plain() {
        let line = format_watch_line(&mock_environment(), &plain());
        assert!(line.starts_with('['));
        assert!(line.contains("Light 512 lux"));
        assert!(line.contains("Temperature 24.7 C"));
    }
}
