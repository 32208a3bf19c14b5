//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use papyrus_core::Config;

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
                    "store_dir": config.store_dir,
                    "author_name": config.author_name,
                    "author_email": config.author_email,
                    "log_file": config.log_file
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.store_dir.display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  store_dir:    {}", config.store_dir.display());
            println!(
                "  author_name:  {}",
                config.author_name.as_deref().unwrap_or("(not set)")
            );
            println!(
                "  author_email: {}",
                config.author_email.as_deref().unwrap_or("(not set)")
            );
            println!(
                "  log_file:     {}",
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
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    let mut config = Config::load_file(&save_path).context("Failed to load configuration")?;

    apply(&mut config, &key, &value)?;

    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

/// Apply one `key = value` setting; empty or `none` unsets optional keys
fn apply(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let optional = |value: &str| {
        if value.is_empty() || value == "none" {
            None
        } else {
            Some(value.to_string())
        }
    };

    match key {
        "store_dir" => {
            if value.is_empty() {
                bail!("store_dir cannot be empty");
            }
            config.store_dir = value.into();
        }
        "author_name" => config.author_name = optional(value),
        "author_email" => config.author_email = optional(value),
        "log_file" => config.log_file = optional(value).map(PathBuf::from),
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: store_dir, author_name, author_email, log_file",
                key
            );
        }
    }

    Ok(())
}
