//! Config command - manage configuration.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use docbind_core::DocbindConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g., "extraction.mode")
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// New value (JSON, or a bare string)
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub fn run(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(),
        ConfigCommand::Init(init_args) => init_config(init_args),
        ConfigCommand::Get { key } => get_config(&key),
        ConfigCommand::Set { key, value } => set_config(&key, &value),
        ConfigCommand::Path => show_path(),
    }
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docbind")
        .join("config.json")
}

fn load_or_default() -> anyhow::Result<DocbindConfig> {
    let config_path = default_config_path();
    if config_path.exists() {
        Ok(DocbindConfig::from_file(&config_path)?)
    } else {
        Ok(DocbindConfig::default())
    }
}

fn show_config() -> anyhow::Result<()> {
    if !default_config_path().exists() {
        println!(
            "{} No config file found, showing defaults.",
            style("ℹ").blue()
        );
    }

    println!("{}", serde_json::to_string_pretty(&load_or_default()?)?);
    Ok(())
}

fn init_config(args: InitArgs) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or_else(default_config_path);

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    DocbindConfig::default().save(&output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}

fn get_config(key: &str) -> anyhow::Result<()> {
    let json = serde_json::to_value(load_or_default()?)?;
    println!("{}", serde_json::to_string_pretty(lookup(&json, key)?)?);
    Ok(())
}

fn set_config(key: &str, value: &str) -> anyhow::Result<()> {
    let config_path = default_config_path();
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let parsed_value: Value =
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));

    let config = apply(load_or_default()?, key, parsed_value.clone())?;
    config.save(&config_path)?;

    println!(
        "{} Set {} = {}",
        style("✓").green(),
        key,
        serde_json::to_string(&parsed_value)?
    );

    Ok(())
}

fn show_path() -> anyhow::Result<()> {
    let config_path = default_config_path();

    println!("Configuration file: {}", config_path.display());

    if config_path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'docbind config init' to create a configuration file.");
    }

    Ok(())
}

/// Follow a dotted key path through a JSON value.
fn lookup<'a>(json: &'a Value, key: &str) -> anyhow::Result<&'a Value> {
    key.split('.').try_fold(json, |current, part| {
        current
            .get(part)
            .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))
    })
}

/// Set a dotted key and re-validate the whole configuration.
fn apply(config: DocbindConfig, key: &str, value: Value) -> anyhow::Result<DocbindConfig> {
    let mut json = serde_json::to_value(&config)?;

    let (parent_path, leaf) = match key.rsplit_once('.') {
        Some((parent, leaf)) => (Some(parent), leaf),
        None => (None, key),
    };

    let mut current = &mut json;
    if let Some(parent_path) = parent_path {
        for part in parent_path.split('.') {
            current = current
                .get_mut(part)
                .ok_or_else(|| anyhow::anyhow!("Configuration path not found: {}", key))?;
        }
    }

    match current.as_object_mut() {
        Some(obj) if obj.contains_key(leaf) => {
            obj.insert(leaf.to_string(), value);
        }
        Some(_) => anyhow::bail!("Configuration key not found: {}", key),
        None => anyhow::bail!("Cannot set value at non-object path"),
    }

    serde_json::from_value(json)
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docbind_core::ExtractionMode;

    #[test]
    fn test_lookup_nested_key() {
        let json = serde_json::to_value(DocbindConfig::default()).unwrap();
        assert_eq!(
            lookup(&json, "inference.text_model").unwrap(),
            &Value::String("qwen-plus".to_string())
        );
        assert!(lookup(&json, "inference.nope").is_err());
    }

    #[test]
    fn test_apply_sets_typed_value() {
        let config = apply(
            DocbindConfig::default(),
            "extraction.mode",
            Value::String("per_field".to_string()),
        )
        .unwrap();
        assert_eq!(config.extraction.mode, ExtractionMode::PerField);

        let config = apply(config, "cli.timeout_secs", serde_json::json!(5)).unwrap();
        assert_eq!(config.cli.timeout_secs, 5);
    }

    #[test]
    fn test_apply_rejects_bad_values() {
        assert!(apply(DocbindConfig::default(), "extraction.mode", serde_json::json!("fast")).is_err());
        assert!(apply(DocbindConfig::default(), "extraction.unknown", serde_json::json!(1)).is_err());
        assert!(apply(DocbindConfig::default(), "nope.mode", serde_json::json!(1)).is_err());
    }
}
