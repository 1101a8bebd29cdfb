use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub state: StateConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_timeout_secs() -> u64 {
    30
}
fn default_max_retries() -> u32 {
    2
}

#[derive(Debug, Deserialize, Clone)]
pub struct StateConfig {
    #[serde(default = "default_state_path")]
    pub path: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: default_state_path(),
        }
    }
}

fn default_state_path() -> PathBuf {
    PathBuf::from("./data/state.json")
}

impl ServiceConfig {
    /// Joins an API path onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl Config {
    /// Defaults for commands that can run without a config file: the local
    /// development service and a state file under `./data`.
    pub fn minimal() -> Self {
        Self {
            service: ServiceConfig {
                base_url: "http://localhost:5000".to_string(),
                timeout_secs: default_timeout_secs(),
                max_retries: default_max_retries(),
            },
            state: StateConfig::default(),
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate service
    let url = config.service.base_url.trim();
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        anyhow::bail!(
            "service.base_url must start with http:// or https:// (got '{}')",
            config.service.base_url
        );
    }
    if config.service.timeout_secs == 0 {
        anyhow::bail!("service.timeout_secs must be > 0");
    }

    // Validate state
    if config.state.path.as_os_str().is_empty() {
        anyhow::bail!("state.path must not be empty");
    }

    Ok(config)
}
