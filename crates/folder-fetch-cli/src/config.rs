use std::path::PathBuf;
use std::time::Duration;

use folder_fetch::DEFAULT_BACKOFF;
use serde::{Deserialize, Serialize};

/// Optional settings file: `~/.config/gh-folder-fetch/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// GitHub personal access token.
    pub token: Option<String>,
    /// Alternative API root, e.g. a GitHub Enterprise `https://host/api/v3`.
    pub api_base_url: Option<String>,
    /// Default destination directory.
    pub destination: Option<PathBuf>,
    /// Wait after a rate-limit response that carries no reset time.
    pub rate_limit_backoff_secs: Option<u64>,
}

/// Config file path: `~/.config/gh-folder-fetch/config.toml`
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("gh-folder-fetch").join("config.toml"))
}

pub fn parse_config(contents: &str) -> Result<AppConfig, toml::de::Error> {
    toml::from_str(contents)
}

/// Load config from file, falling back to defaults if missing or invalid.
pub fn load_config() -> AppConfig {
    if let Some(path) = config_path()
        && let Ok(contents) = std::fs::read_to_string(&path)
    {
        match parse_config(&contents) {
            Ok(config) => return config,
            Err(e) => tracing::warn!(
                "failed to parse config at {}, using defaults: {e}",
                path.display()
            ),
        }
    }

    AppConfig::default()
}

/// Values supplied on the command line (or by the interactive prompts).
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub token: Option<String>,
    pub api_base_url: Option<String>,
    pub destination: Option<PathBuf>,
}

/// Effective settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub token: Option<String>,
    pub api_base_url: Option<String>,
    pub destination: PathBuf,
    pub fallback_backoff: Duration,
}

impl Settings {
    /// Command line beats the environment, which beats the config file.
    /// The destination defaults to the current directory.
    pub fn resolve(overrides: Overrides, env_token: Option<String>, file: AppConfig) -> Self {
        let non_empty = |s: Option<String>| s.filter(|v| !v.trim().is_empty());

        Self {
            token: non_empty(overrides.token)
                .or_else(|| non_empty(env_token))
                .or_else(|| non_empty(file.token)),
            api_base_url: overrides.api_base_url.or(file.api_base_url),
            destination: overrides
                .destination
                .or(file.destination)
                .unwrap_or_else(|| PathBuf::from(".")),
            fallback_backoff: file
                .rate_limit_backoff_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_BACKOFF),
        }
    }
}
