use std::collections::HashMap;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::straico::auth::DEFAULT_API_KEY_ENV;
use crate::straico::transport::DEFAULT_BASE_URL;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Config file '{}' does not contain a [profiles] section.", .path.display())]
    MissingProfiles { path: PathBuf },
    #[error("Profile '{name}' not found in config file '{}'.", .path.display())]
    ProfileNotFound { name: String, path: PathBuf },
    #[error("Cannot resolve config path: set STRAICO_CONFIG or HOME/XDG_CONFIG_HOME.")]
    NoConfigPath,
    #[error("{0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ProfileConfig {
    pub base_url: Option<String>,
    pub timeout: Option<u64>,
    pub continue_on_fail: Option<bool>,
    pub output: Option<String>,
    pub api_key_env: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct ConfigFile {
    profiles: Option<HashMap<String, ProfileConfig>>,
}

/// How the output sequence is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One pretty-printed JSON array.
    #[default]
    Json,
    /// One compact JSON value per line.
    Lines,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Lines => "lines",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "lines" | "ndjson" => Ok(Self::Lines),
            _ => Err(()),
        }
    }
}

/// Values given on the command line; `None` defers to env, profile, default.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Option<u64>,
    pub continue_on_fail: bool,
    pub output: Option<OutputFormat>,
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub base_url: String,
    pub timeout: Option<Duration>,
    pub continue_on_fail: bool,
    pub output: OutputFormat,
    pub api_key_env: String,
}

impl Settings {
    /// Resolves settings from the process environment and config file.
    pub fn load(overrides: &Overrides) -> Result<Self, ConfigError> {
        let profile = match overrides.profile.as_deref() {
            Some(name) => load_profile(name)?,
            None => ProfileConfig::default(),
        };
        Self::resolve(overrides, &profile, |key| env::var(key).ok())
    }

    /// Precedence: CLI, then environment, then profile, then defaults.
    pub fn resolve(
        overrides: &Overrides,
        profile: &ProfileConfig,
        env_var: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let env_value = |key: &str| env_var(key).filter(|value| !value.trim().is_empty());

        let base_url = overrides
            .base_url
            .clone()
            .or_else(|| env_value("STRAICO_BASE_URL"))
            .or_else(|| profile.base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout = match overrides.timeout {
            Some(secs) => Some(secs),
            None => match env_value("STRAICO_TIMEOUT") {
                Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                    ConfigError::Invalid(format!("Invalid STRAICO_TIMEOUT '{raw}'"))
                })?),
                None => profile.timeout,
            },
        };

        let continue_on_fail = if overrides.continue_on_fail {
            true
        } else {
            match env_value("STRAICO_CONTINUE_ON_FAIL") {
                Some(raw) => parse_bool(&raw).ok_or_else(|| {
                    ConfigError::Invalid(format!("Invalid STRAICO_CONTINUE_ON_FAIL '{raw}'"))
                })?,
                None => profile.continue_on_fail.unwrap_or(false),
            }
        };

        let output = match overrides.output {
            Some(output) => output,
            None => match env_value("STRAICO_OUTPUT") {
                Some(raw) => raw.parse().map_err(|_| {
                    ConfigError::Invalid(format!(
                        "Invalid STRAICO_OUTPUT '{raw}'. Supported values: json, lines."
                    ))
                })?,
                None => profile_output(profile)?.unwrap_or_default(),
            },
        };

        let api_key_env = profile
            .api_key_env
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_KEY_ENV.to_string());

        Ok(Self {
            base_url,
            timeout: timeout.filter(|secs| *secs > 0).map(Duration::from_secs),
            continue_on_fail,
            output,
            api_key_env,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn profile_output(profile: &ProfileConfig) -> Result<Option<OutputFormat>, ConfigError> {
    profile
        .output
        .as_deref()
        .map(|raw| {
            raw.parse().map_err(|_| {
                ConfigError::Invalid(format!(
                    "Invalid profile output '{raw}'. Supported values: json, lines."
                ))
            })
        })
        .transpose()
}

pub fn load_profile(name: &str) -> Result<ProfileConfig, ConfigError> {
    let path = config_path()?;
    load_profile_from(&path, name)
}

fn load_profile_from(path: &Path, name: &str) -> Result<ProfileConfig, ConfigError> {
    let profiles = read_profiles(path)?;
    profiles
        .get(name)
        .cloned()
        .ok_or_else(|| ConfigError::ProfileNotFound {
            name: name.to_string(),
            path: path.to_path_buf(),
        })
}

fn read_profiles(path: &Path) -> Result<HashMap<String, ProfileConfig>, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let config: ConfigFile = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    config.profiles.ok_or_else(|| ConfigError::MissingProfiles {
        path: path.to_path_buf(),
    })
}

/// Checks that the config file parses and every (or the named) profile is valid.
pub fn validate_config(profile: Option<&str>) -> Result<PathBuf, ConfigError> {
    let path = config_path()?;
    let profiles = read_profiles(&path)?;

    let selected: Vec<(&String, &ProfileConfig)> = match profile {
        Some(name) => {
            let entry = profiles.get_key_value(name).ok_or_else(|| {
                ConfigError::ProfileNotFound {
                    name: name.to_string(),
                    path: path.clone(),
                }
            })?;
            vec![entry]
        }
        None => profiles.iter().collect(),
    };

    for (name, profile) in selected {
        profile_output(profile)
            .map_err(|err| ConfigError::Invalid(format!("Profile '{name}': {err}")))?;
    }
    Ok(path)
}

fn config_path() -> Result<PathBuf, ConfigError> {
    if let Ok(path) = env::var("STRAICO_CONFIG") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let trimmed = xdg.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed).join("straico").join("config.toml"));
        }
    }

    let home = env::var("HOME").map_err(|_| ConfigError::NoConfigPath)?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("straico")
        .join("config.toml"))
}
