use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::fetch::FetchSettings;
use crate::parser::ExtractOptions;

pub const DEFAULT_URL: &str = "http://hash.h10a.de/";

/// Runtime settings: `h10a.toml` (optional), then `H10A_*` environment
/// variables, then whatever the command line overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default)]
    pub proxies: Vec<String>,
    #[serde(default = "default_true")]
    pub direct_first: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
    #[serde(default = "default_true")]
    pub capture_colors: bool,
}

fn default_url() -> String {
    DEFAULT_URL.to_string()
}
fn default_true() -> bool {
    true
}
fn default_timeout_secs() -> u64 {
    15
}
fn default_max_retries() -> u32 {
    3
}
fn default_backoff_ms() -> u64 {
    2000
}
fn default_db_path() -> PathBuf {
    PathBuf::from("data/h10a.sqlite")
}
fn default_state_path() -> PathBuf {
    PathBuf::from("data/state.json")
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name("h10a").required(false))
                .add_source(env_source()),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        builder
            .build()
            .context("Failed to load settings")?
            .try_deserialize()
            .context("Invalid settings")
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            url: self.url.clone(),
            proxies: self.proxies.clone(),
            direct_first: self.direct_first,
            timeout: Duration::from_secs(self.timeout_secs),
            max_retries: self.max_retries,
            backoff: Duration::from_millis(self.backoff_ms),
        }
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            capture_colors: self.capture_colors,
        }
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("H10A")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("proxies")
}
