use crate::core::config::AppConfig;
use anyhow::{Context, Result};
use std::path::Path;

/// Creates a default configuration file with example content at the default location
pub fn run() -> Result<()> {
    let path = AppConfig::default_config_path()?;
    write_default(&path)?;
    println!("Created default configuration at {}", path.display());
    Ok(())
}

/// Creates a default configuration file with example content at the specified path
pub fn write_default<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    // Include the example config as a string literal in the binary
    let default_config = include_str!("../../docs/example_config.yaml");

    std::fs::write(path, default_config)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    tracing::info!("Created default configuration at {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_writes_parseable_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        write_default(&path).unwrap();
        let config = AppConfig::load_from_path(&path).unwrap();
        assert_eq!(config.provider.base_url, "https://finnhub.io");
    }

    #[test]
    fn test_refuses_to_overwrite_existing_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        write_default(&path).unwrap();
        assert!(write_default(&path).is_err());
    }
}
