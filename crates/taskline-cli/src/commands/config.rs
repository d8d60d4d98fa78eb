//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use taskline_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(config_path: Option<&PathBuf>, output: &Output) -> Result<()> {
    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "api_url": config.api_url,
                    "request_timeout_secs": config.request_timeout_secs,
                    "notify_duration_ms": config.notify_duration_ms,
                    "log_level": config.log_level
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.api_url);
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  api_url:              {}", config.api_url);
            println!(
                "  request_timeout_secs: {}",
                config
                    .request_timeout_secs
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!("  notify_duration_ms:   {}", config.notify_duration_ms);
            println!("  log_level:            {}", config.log_level);
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

    apply_setting(&mut config, &key, &value)?;

    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn apply_setting(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "api_url" => {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                bail!("api_url must start with http:// or https://");
            }
            config.api_url = value.to_string();
        }
        "request_timeout_secs" => {
            config.request_timeout_secs = if value.is_empty() || value == "none" {
                None
            } else {
                Some(
                    value
                        .parse()
                        .context("Invalid value for request_timeout_secs. Use a number of seconds or 'none'.")?,
                )
            };
        }
        "notify_duration_ms" => {
            config.notify_duration_ms = value
                .parse()
                .context("Invalid value for notify_duration_ms. Use a number of milliseconds.")?;
        }
        "log_level" => {
            if !["error", "warn", "info", "debug", "trace"].contains(&value) {
                bail!("Invalid log_level. Use error, warn, info, debug or trace.");
            }
            config.log_level = value.to_string();
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: api_url, request_timeout_secs, notify_duration_ms, log_level",
                key
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_apply_setting() {
        let mut config = Config::default();

        apply_setting(&mut config, "api_url", "https://tasks.example.com/api").unwrap();
        apply_setting(&mut config, "request_timeout_secs", "15").unwrap();
        apply_setting(&mut config, "notify_duration_ms", "2500").unwrap();
        apply_setting(&mut config, "log_level", "debug").unwrap();

        assert_eq!(config.api_url, "https://tasks.example.com/api");
        assert_eq!(config.request_timeout_secs, Some(15));
        assert_eq!(config.notify_duration_ms, 2500);
        assert_eq!(config.log_level, "debug");

        apply_setting(&mut config, "request_timeout_secs", "none").unwrap();
        assert!(config.request_timeout_secs.is_none());
    }

    #[test]
    fn test_apply_setting_rejects_bad_values() {
        let mut config = Config::default();

        assert!(apply_setting(&mut config, "api_url", "localhost:3000").is_err());
        assert!(apply_setting(&mut config, "notify_duration_ms", "soon").is_err());
        assert!(apply_setting(&mut config, "log_level", "loud").is_err());
        assert!(apply_setting(&mut config, "favorite_tag", "x").is_err());
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_set_writes_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        let output = Output::new(OutputFormat::Quiet);

        set(
            "api_url".to_string(),
            "http://10.0.0.5:8080/api".to_string(),
            Some(&path),
            &output,
        )
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("http://10.0.0.5:8080/api"));
    }
}
