//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use linkdeck_core::Config;

use crate::output::{Output, OutputFormat};

/// Keys accepted by `config set`
const KEYS: &str = "data_dir, storage_key, remote_url, remote_username, remote_password, \
                    remote_enabled, remote_timeout_secs, log_file";

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "data_dir": config.data_dir,
                    "storage_key": config.storage_key,
                    "store_path": config.store_path(),
                    "remote_url": config.remote_url,
                    "remote_username": config.remote_username,
                    "remote_password_set": config.remote_password.is_some(),
                    "remote_enabled": config.remote_enabled,
                    "remote_timeout_secs": config.remote_timeout_secs,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.store_path().display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:            {}", config.data_dir.display());
            println!("  storage_key:         {}", config.storage_key);
            println!("  remote_url:          {}", or_not_set(config.remote_url.as_deref()));
            println!(
                "  remote_username:     {}",
                or_not_set(config.remote_username.as_deref())
            );
            println!(
                "  remote_password:     {}",
                if config.remote_password.is_some() {
                    "********"
                } else {
                    "(not set)"
                }
            );
            println!("  remote_enabled:      {}", config.remote_enabled);
            println!("  remote_timeout_secs: {}", config.remote_timeout_secs);
            println!(
                "  log_file:            {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!();
            println!("Config file: {}", effective_path.display());
        }
    }

    Ok(())
}

/// Set a configuration value
pub fn set(
    key: String,
    value: String,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    let mut config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    let shown = if key == "remote_password" { "********" } else { value.as_str() };
    output.success(&format!("Set {} = {}", key, shown));

    Ok(())
}

fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "data_dir" => config.data_dir = value.into(),
        "storage_key" => {
            if value.trim().is_empty() {
                bail!("storage_key must not be empty");
            }
            config.storage_key = value.to_string();
        }
        "remote_url" => config.remote_url = optional(value),
        "remote_username" => config.remote_username = optional(value),
        "remote_password" => config.remote_password = optional(value),
        "remote_enabled" => {
            config.remote_enabled = value
                .parse()
                .context("Invalid value for remote_enabled. Use 'true' or 'false'.")?;
        }
        "remote_timeout_secs" => {
            config.remote_timeout_secs = value
                .parse()
                .context("Invalid value for remote_timeout_secs. Use a number of seconds.")?;
        }
        "log_file" => config.log_file = optional(value).map(PathBuf::from),
        _ => bail!("Unknown configuration key: '{}'\nValid keys: {}", key, KEYS),
    }
    Ok(())
}

/// Empty or "none" clears an optional value
fn optional(value: &str) -> Option<String> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.to_string())
    }
}

fn or_not_set(value: Option<&str>) -> &str {
    value.unwrap_or("(not set)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_known_keys() {
        let mut config = Config::default();

        apply(&mut config, "remote_url", "https://dav.example.com").unwrap();
        apply(&mut config, "remote_enabled", "true").unwrap();
        apply(&mut config, "remote_timeout_secs", "5").unwrap();
        apply(&mut config, "storage_key", "alt").unwrap();

        assert_eq!(config.remote_url.as_deref(), Some("https://dav.example.com"));
        assert!(config.remote_enabled);
        assert_eq!(config.remote_timeout_secs, 5);
        assert_eq!(config.storage_key, "alt");

        apply(&mut config, "remote_url", "none").unwrap();
        assert!(config.remote_url.is_none());
    }

    #[test]
    fn test_apply_rejects_bad_input() {
        let mut config = Config::default();
        assert!(apply(&mut config, "remote_enabled", "maybe").is_err());
        assert!(apply(&mut config, "remote_timeout_secs", "soon").is_err());
        assert!(apply(&mut config, "storage_key", " ").is_err());
        assert!(apply(&mut config, "favorite", "x").is_err());
    }
}
