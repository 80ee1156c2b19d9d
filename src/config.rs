//! Run configuration: TOML file, `.env` credentials and built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::error::BenchError;
use crate::invoker::ResilienceConfig;
use crate::pipeline::{DEFAULT_MAX_WORKERS, DEFAULT_TEMPERATURES};

const LOCAL_CONFIG_FILE: &str = "vestibench.toml";
const DEFAULT_INTERVAL_SECS: f64 = 5.0;
const DEFAULT_LOG_ROTATE_SIZE: u64 = 10 * 1024 * 1024;
const DEFAULT_LOG_ROTATE_KEEP: usize = 5;

/// Environment variables checked for provider credentials.
const KNOWN_KEY_VARS: [&str; 3] = ["OPENAI_API_KEY", "ANTHROPIC_API_KEY", "GOOGLE_API_KEY"];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BenchConfig {
    pub paths: PathsConfig,
    pub run: RunConfig,
    pub provider: ProviderConfig,
    pub retry: ResilienceConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    pub input: PathBuf,
    pub raw_runs: PathBuf,
    pub analysis: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("data/input/questions.csv"),
            raw_runs: PathBuf::from("data/output/raw_runs"),
            analysis: PathBuf::from("data/output/analysis"),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RunConfig {
    pub model: String,
    pub temperatures: Vec<f32>,
    pub max_workers: usize,
    /// Minimum spacing between two model calls, process-wide
    pub request_interval_secs: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            temperatures: DEFAULT_TEMPERATURES.to_vec(),
            max_workers: DEFAULT_MAX_WORKERS,
            request_interval_secs: DEFAULT_INTERVAL_SECS,
        }
    }
}

impl RunConfig {
    /// Negative, NaN and infinite intervals are rejected.
    pub fn request_interval(&self) -> Result<Duration, BenchError> {
        Duration::try_from_secs_f64(self.request_interval_secs).map_err(|e| {
            BenchError::Config(format!(
                "invalid request_interval_secs {}: {e}",
                self.request_interval_secs
            ))
        })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Per-call deadline; unset means calls may wait indefinitely
    pub timeout_seconds: Option<u64>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1/".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_seconds: None,
        }
    }
}

impl ProviderConfig {
    /// Reads the configured key from the environment (after `.env` is loaded).
    pub fn api_key(&self) -> Option<SecretString> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .map(SecretString::new)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Log file; stderr when unset
    pub path: Option<PathBuf>,
    pub rotate_size: u64,
    pub rotate_keep: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            path: None,
            rotate_size: DEFAULT_LOG_ROTATE_SIZE,
            rotate_keep: DEFAULT_LOG_ROTATE_KEEP,
        }
    }
}

#[derive(Debug)]
pub struct LoadedConfig {
    pub config: BenchConfig,
    /// File the config came from, if any
    pub source: Option<PathBuf>,
}

/// Resolves and reads the config file.
///
/// An explicit path must exist. Otherwise `./vestibench.toml` and then the
/// user config dir are tried, falling back to defaults.
pub fn load_config(path_override: Option<PathBuf>) -> Result<LoadedConfig, BenchError> {
    let _ = dotenvy::dotenv();

    let candidate = match path_override {
        Some(path) => {
            if !path.exists() {
                return Err(BenchError::Config(format!(
                    "config file {} not found",
                    path.display()
                )));
            }
            Some(path)
        }
        None => default_locations().into_iter().find(|p| p.exists()),
    };

    let config = match &candidate {
        Some(path) => read_config(path)?,
        None => BenchConfig::default(),
    };
    Ok(LoadedConfig {
        config,
        source: candidate,
    })
}

pub fn read_config(path: &Path) -> Result<BenchConfig, BenchError> {
    let contents = fs::read_to_string(path)?;
    Ok(toml::from_str(&contents)?)
}

fn default_locations() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("vestibench").join("config.toml"));
    }
    paths
}

/// Logs a warning when no provider key is present; runs against local
/// servers need none, so this never fails.
pub fn warn_if_no_credentials(provider: &ProviderConfig) -> bool {
    let any_set = KNOWN_KEY_VARS
        .iter()
        .copied()
        .chain(std::iter::once(provider.api_key_env.as_str()))
        .any(|var| std::env::var(var).is_ok_and(|v| !v.trim().is_empty()));
    if !any_set {
        log::warn!("no API key found in the environment or .env; make sure your provider is configured");
    }
    any_set
}
