use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
pub const BIND_ADDR_ENV: &str = "WEATHER_BIND_ADDR";

const DEFAULT_BASE_URL: &str = "http://api.openweathermap.org";
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error(
        "No OpenWeather API key configured.\n\
         Hint: run `weather-web configure` or set OPENWEATHER_API_KEY."
    )]
    MissingApiKey,

    #[error("timeout_secs must be at least 1, got 0")]
    ZeroTimeout,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// api_key = "..."
/// bind_addr = "127.0.0.1:8080"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Upper bound for one provider request.
    pub timeout_secs: u64,
    pub bind_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

/// What the repository needs to talk to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenWeatherSettings {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl OpenWeatherSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Config {
    /// Load config from disk (or defaults on first run), then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;
        cfg.apply_overrides(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Environment values win over the file; blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_blank(API_KEY_ENV) {
            self.api_key = Some(key);
        }
        if let Some(addr) = non_blank(BIND_ADDR_ENV) {
            self.bind_addr = addr;
        }
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Where the rotating log files live.
    pub fn log_dir_path() -> Result<PathBuf> {
        Ok(project_dirs()?.data_local_dir().join("logs"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key.trim().to_string());
    }

    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn openweather_settings(&self) -> Result<OpenWeatherSettings, ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(OpenWeatherSettings {
            api_key: self.api_key()?.to_string(),
            base_url: self.base_url.clone(),
            timeout: self.timeout(),
        })
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "weather-lookup", "weather-web")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}
