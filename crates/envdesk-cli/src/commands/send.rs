//! Send command implementation.

use anyhow::{Context, Result, bail};
use envdesk_core::Config;
use envdesk_core::suggestions::parse::DEFAULT_COMMAND;

use crate::format::FormatOptions;
use crate::style;
use crate::util::store_client;

pub async fn cmd_send(
    config: &Config,
    command: &str,
    value: f64,
    quiet: bool,
    opts: &FormatOptions,
) -> Result<()> {
    let command = command.trim();
    if command.is_empty() || command == DEFAULT_COMMAND {
        bail!("Command must not be empty or '{}'", DEFAULT_COMMAND);
    }
    if !value.is_finite() {
        bail!("Value must be a finite number");
    }

    let Some(store) = store_client(config)? else {
        bail!(
            "Store is not configured.\n\
             Set SUPABASE_URL and SUPABASE_ANON_KEY, or add a [store] section to the config file."
        );
    };

    let spinner = (!quiet).then(|| style::operation_spinner("Sending command..."));
    let result = store.send_command_to_hardware(command, value).await;
    if let Some(sp) = spinner {
        sp.finish_and_clear();
    }
    let row = result.with_context(|| format!("Failed to send command '{}'", command))?;

    if !quiet {
        println!(
            "{}",
            style::format_success(
                &format!(
                    "Queued {} {} (id {}, status {})",
                    row.command, row.value, row.id, row.status
                ),
                opts.no_color
            )
        );
    }
    Ok(())
}
