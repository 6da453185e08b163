//! Config command implementation.

use std::io::IsTerminal;
use std::path::Path;

use anyhow::{Context, Result, bail};
use dialoguer::{Confirm, theme::ColorfulTheme};
use envdesk_core::{Config, ConfigError};

use crate::cli::ConfigAction;
use crate::format::FormatOptions;
use crate::style;

/// Replace a secret with its first four characters followed by asterisks.
fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        return "****".to_string();
    }
    format!("{}****", visible)
}

/// A copy of `config` that is safe to print.
pub fn masked(config: &Config) -> Config {
    let mut masked = config.clone();
    masked.telemetry.api_key = masked.telemetry.api_key.as_deref().map(mask);
    masked.inference.token = masked.inference.token.as_deref().map(mask);
    masked.store.anon_key = masked.store.anon_key.as_deref().map(mask);
    masked
}

pub fn cmd_config(
    action: ConfigAction,
    path: &Path,
    json: bool,
    opts: &FormatOptions,
) -> Result<()> {
    match action {
        ConfigAction::Path => {
            println!("{}", path.display());
        }
        ConfigAction::Show => {
            let mut config = if path.exists() {
                Config::load(path)?
            } else {
                Config::default()
            };
            config.apply_env_overrides();
            let config = masked(&config);

            if json {
                print!("{}", opts.as_json(&config)?);
            } else {
                if !opts.is_plain() {
                    let source = if path.exists() {
                        path.display().to_string()
                    } else {
                        "defaults".to_string()
                    };
                    println!("# {}", source);
                }
                let content =
                    toml::to_string_pretty(&config).context("Failed to serialize config")?;
                print!("{}", content);
            }
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                if !std::io::stdin().is_terminal() {
                    bail!(
                        "Config file already exists at {}. Use --force to overwrite.",
                        path.display()
                    );
                }
                let overwrite = Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt(format!("Overwrite {}?", path.display()))
                    .default(false)
                    .interact()
                    .context("Failed to get user confirmation")?;
                if !overwrite {
                    println!("{}", style::format_info("Left existing config unchanged", opts.no_color));
                    return Ok(());
                }
            }
            Config::default().save(path)?;
            println!(
                "{}",
                style::format_success(
                    &format!("Wrote default config to {}", path.display()),
                    opts.no_color
                )
            );
        }
        ConfigAction::Validate => {
            if !path.exists() {
                println!(
                    "{}",
                    style::format_info(
                        &format!("No config file at {}, using defaults", path.display()),
                        opts.no_color
                    )
                );
                return Ok(());
            }
            match Config::load_validated(path) {
                Ok(_) => println!(
                    "{}",
                    style::format_success(&format!("{} is valid", path.display()), opts.no_color)
                ),
                Err(ConfigError::Validation(errors)) => {
                    for error in &errors {
                        eprintln!("{}", style::format_warning(&error.to_string(), opts.no_color));
                    }
                    bail!("{} has {} invalid setting(s)", path.display(), errors.len());
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask() {
        assert_eq!(mask("hf_abcdef"), "hf_a****");
        assert_eq!(mask("abc"), "****");
    }

    #[test]
    fn test_masked_hides_secrets() {
        let mut config = Config::default();
        config.telemetry.api_key = Some("READKEY123".to_string());
        config.inference.token = Some("hf_secret".to_string());
        config.store.url = Some("https://example.supabase.co".to_string());

        let masked = masked(&config);
        assert_eq!(masked.telemetry.api_key.as_deref(), Some("READ****"));
        assert_eq!(masked.inference.token.as_deref(), Some("hf_s****"));
        assert_eq!(masked.store.anon_key, None);
        assert_eq!(masked.store.url, config.store.url);
    }

    #[test]
    fn test_init_and_validate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("envdesk").join("config.toml");
        let opts = FormatOptions::new(true, crate::cli::StyleMode::Plain);

        cmd_config(ConfigAction::Init { force: false }, &path, false, &opts).unwrap();
        assert!(path.exists());
        cmd_config(ConfigAction::Validate, &path, false, &opts).unwrap();

        // Overwriting with --force never prompts
        cmd_config(ConfigAction::Init { force: true }, &path, false, &opts).unwrap();
    }

    #[test]
    fn test_validate_reports_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[telemetry]\npoll_interval_secs = 0\n").unwrap();
        let opts = FormatOptions::new(true, crate::cli::StyleMode::Plain);

        let err = cmd_config(ConfigAction::Validate, &path, false, &opts).unwrap_err();
        assert!(err.to_string().contains("1 invalid setting"));
    }
}
