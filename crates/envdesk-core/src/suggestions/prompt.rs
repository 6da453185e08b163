//! Prompt construction for the inference model.

use std::fmt::Write as _;

use envdesk_types::{EnvironmentSnapshot, Reading};

use crate::trend::history_trend;

/// Hardware commands the model may reference.
pub const KNOWN_COMMANDS: [&str; 8] = [
    "increase_light",
    "decrease_light",
    "increase_temperature",
    "decrease_temperature",
    "increase_humidity",
    "decrease_humidity",
    "reduce_noise",
    "add_ambient_sound",
];

/// One "Current readings" line, e.g.
/// `- Temperature: 24.7 °C (optimal range: 21-25) (trend: stable)`.
pub fn reading_line(reading: &Reading) -> String {
    let mut line = format!(
        "- {}: {} {} (optimal range: {})",
        reading.metric.label(),
        reading.value,
        reading.unit,
        reading.optimal
    );
    if let Some(trend) = history_trend(&reading.history) {
        let _ = write!(line, " (trend: {trend})");
    }
    line
}

/// Build the instruction prompt for `snapshot`.
pub fn build_prompt(snapshot: &EnvironmentSnapshot) -> String {
    let readings = snapshot
        .iter()
        .map(reading_line)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"<s>[INST] You are an AI assistant specialized in workspace comfort and productivity.
Analyze these environmental readings and provide 1-3 actionable suggestions to improve the workspace.

Current readings:
{readings}

For each suggestion, provide:
1. A message explaining the issue
2. A recommended action
3. The type of message (must be one of: info, warning, alert, success)
4. An action command (use: {commands})
5. A parameter value to adjust by

Format your response in valid JSON like this:
[
  {{
    "id": "unique-suggestion-id",
    "type": "info|warning|alert|success",
    "message": "Detailed explanation of the issue",
    "action": {{
      "label": "Your action label",
      "command": "your-command-identifier"
    }},
    "parameter": 10
  }}
]
Only return valid JSON, nothing else. [/INST]</s>"#,
        commands = join_commands()
    )
}

fn join_commands() -> String {
    let last = KNOWN_COMMANDS.len() - 1;
    format!(
        "{}, or {}",
        KNOWN_COMMANDS[..last].join(", "),
        KNOWN_COMMANDS[last]
    )
}
