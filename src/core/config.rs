use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::{fs, path::PathBuf};
use tracing::debug;

use crate::core::currency::{Currency, RateTable};

/// Demo API key shipped with the application; override it in config.yaml
/// for a personal quota.
pub const DEFAULT_TOKEN: &str = "csvdo61r01qq28mn4ph0csvdo61r01qq28mn4phg";

pub const DEFAULT_BASE_URL: &str = "https://finnhub.io";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub token: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: DEFAULT_TOKEN.to_string(),
        }
    }
}

fn default_quote_currency() -> Currency {
    Currency::Usd
}

fn default_refresh_interval() -> u64 {
    60
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Currency stock quotes are denominated in. Its conversion rate comes
    /// from the same table as every other conversion.
    #[serde(default = "default_quote_currency")]
    pub quote_currency: Currency,
    /// Overrides for individual rate-table entries, keyed by currency code.
    #[serde(default)]
    pub rates: HashMap<Currency, f64>,
    #[serde(default)]
    pub data_path: Option<String>,
    /// Seconds between quote polls in watch mode.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            provider: ProviderConfig::default(),
            quote_currency: default_quote_currency(),
            rates: HashMap::new(),
            data_path: None,
            refresh_interval_secs: default_refresh_interval(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, falling back to defaults
    /// when no file exists yet.
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config file found, using defaults");
            return Ok(AppConfig::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "finboard", "finboard")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Directory holding the durable record store.
    pub fn data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("dev", "finboard", "finboard")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    /// The static rate table with this config's overrides applied.
    pub fn rate_table(&self) -> RateTable {
        RateTable::with_overrides(&self.rates)
    }
}
