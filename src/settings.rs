//! Layered configuration for the dashboard.
//!
//! Settings come from an optional `plcwatch.toml` (or an explicit `--config`
//! path) overlaid with `PLCWATCH_*` environment variables; CLI flags win
//! over both.

use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Complete dashboard settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub stream: StreamSettings,
}

/// Hub REST API settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL of the hub.
    pub endpoint: String,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

/// Telemetry push feed settings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamSettings {
    /// `host:port` of the hub's telemetry feed.
    pub endpoint: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            stream: StreamSettings::default(),
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5000".to_string(),
            username: None,
            password: None,
            timeout_secs: 10,
        }
    }
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            endpoint: "localhost:5001".to_string(),
        }
    }
}

/// Load settings from an optional file plus the environment.
///
/// With no explicit path, a `plcwatch.toml` in the working directory is used
/// when present. Environment variables use a double underscore separator,
/// e.g. `PLCWATCH_API__ENDPOINT`.
pub fn load(path: Option<&Path>) -> Result<Settings> {
    let mut builder = Config::builder();

    builder = match path {
        Some(path) => builder.add_source(File::from(path)),
        None => builder.add_source(File::with_name("plcwatch").required(false)),
    };

    let config = builder
        .add_source(Environment::with_prefix("PLCWATCH").separator("__"))
        .build()
        .context("failed to load configuration")?;

    config
        .try_deserialize()
        .context("invalid configuration values")
}
