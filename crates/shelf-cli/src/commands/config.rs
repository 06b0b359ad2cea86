//! Config command handlers

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use shelf_core::{Config, SortOrder};

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
                    "data_dir": config.data_dir,
                    "books_file": config.books_path(),
                    "log_file": config.log_file,
                    "cell_width": config.cell_width,
                    "cell_height": config.cell_height,
                    "default_sort": config.default_sort,
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.books_path().display());
        }
        OutputFormat::Human => {
            let effective_path = config_path
                .cloned()
                .unwrap_or_else(Config::config_file_path);
            println!("Configuration:");
            println!("  data_dir:     {}", config.data_dir.display());
            println!("  books_file:   {}", config.books_path().display());
            println!(
                "  log_file:     {}",
                config
                    .log_file
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(not set)".to_string())
            );
            println!("  cell_width:   {}", config.cell_width);
            println!("  cell_height:  {}", config.cell_height);
            println!("  default_sort: {}", config.default_sort);
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

    match key.as_str() {
        "data_dir" => {
            config.data_dir = value.clone().into();
        }
        "books_file" => {
            config.books_file = optional_path(&value);
        }
        "log_file" => {
            config.log_file = optional_path(&value);
        }
        "cell_width" => {
            config.cell_width = parse_cell_size(&key, &value)?;
        }
        "cell_height" => {
            config.cell_height = parse_cell_size(&key, &value)?;
        }
        "default_sort" => {
            config.default_sort = value
                .parse::<SortOrder>()
                .map_err(|e| anyhow::anyhow!(e))?;
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: data_dir, books_file, log_file, cell_width, cell_height, default_sort",
                key
            );
        }
    }

    // Save to the CLI-specified path or default
    let save_path = config_path
        .cloned()
        .unwrap_or_else(Config::config_file_path);
    config
        .save_to_path(&save_path)
        .context("Failed to save configuration")?;

    output.success(&format!("Set {} = {}", key, value));

    Ok(())
}

fn optional_path(value: &str) -> Option<PathBuf> {
    if value.is_empty() || value == "none" {
        None
    } else {
        Some(value.into())
    }
}

fn parse_cell_size(key: &str, value: &str) -> Result<u16> {
    let size: u16 = value
        .parse()
        .with_context(|| format!("Invalid value for {}. Use a whole number of pixels.", key))?;
    if size == 0 {
        bail!("{} must be greater than zero", key);
    }
    Ok(size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_path() {
        assert_eq!(optional_path(""), None);
        assert_eq!(optional_path("none"), None);
        assert_eq!(optional_path("/tmp/b.json"), Some(PathBuf::from("/tmp/b.json")));
    }

    #[test]
    fn test_parse_cell_size() {
        assert_eq!(parse_cell_size("cell_width", "10").unwrap(), 10);
        assert!(parse_cell_size("cell_width", "0").is_err());
        assert!(parse_cell_size("cell_width", "wide").is_err());
    }

    #[test]
    fn test_set_writes_to_cli_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let output = Output::new(OutputFormat::Quiet);

        set(
            "default_sort".to_string(),
            "author".to_string(),
            Some(&path),
            &output,
        )
        .unwrap();

        let saved = std::fs::read_to_string(&path).unwrap();
        assert!(saved.contains("default_sort = \"author\""));
        assert!(set("bogus".to_string(), "1".to_string(), Some(&path), &output).is_err());
    }
}
