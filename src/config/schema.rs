//! Configuration schema definitions.
//!
//! `SettingsFile` mirrors the on-disk document and is what serde produces.
//! It is only turned into [`Settings`] by `validation::validate_settings`,
//! so a `Settings` value always carries a legal [`Mode`].

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Execution mode selecting the weather backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Static data read from a local file.
    Demo,
    /// Live data from the network.
    Real,
}

impl Mode {
    pub const ALLOWED: [&'static str; 2] = ["demo", "real"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Demo => "demo",
            Mode::Real => "real",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "demo" => Ok(Mode::Demo),
            "real" => Ok(Mode::Real),
            other => Err(other.to_string()),
        }
    }
}

/// Raw configuration document as read from disk.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SettingsFile {
    /// Requested mode, validated later.
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Weather backend parameters. Required, checked during validation.
    #[serde(default)]
    pub weather: Option<WeatherConfig>,

    /// Logging target.
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_mode() -> String {
    "demo".to_string()
}

/// Validated, immutable settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    pub mode: Mode,
    pub weather: WeatherConfig,
    pub logging: LoggingConfig,
}

/// Parameters for both backend styles.
///
/// Only the fields of the selected mode are required, and that is enforced
/// when the backend is built rather than here.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Mock data file for demo mode.
    pub demo_data_path: Option<PathBuf>,

    /// Open-Meteo geocoding endpoint.
    pub geocoding_endpoint: Option<String>,

    /// Open-Meteo forecast endpoint.
    pub forecast_endpoint: Option<String>,

    /// Timezone passed to the forecast endpoint.
    pub timezone: String,

    /// Unit system. Accepted for compatibility; the live backend always queries metric.
    pub units: String,

    /// Per-attempt request timeout in seconds.
    pub timeout_seconds: u64,

    /// Total attempts per upstream request.
    pub max_retries: u32,

    /// Backoff before the second attempt, in milliseconds.
    pub backoff_base_ms: u64,

    /// Added to the backoff for every further attempt, in milliseconds.
    pub backoff_step_ms: u64,

    /// Backoff ceiling in milliseconds.
    pub backoff_max_ms: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            demo_data_path: None,
            geocoding_endpoint: None,
            forecast_endpoint: None,
            timezone: "UTC".to_string(),
            units: "metric".to_string(),
            timeout_seconds: 8,
            max_retries: 2,
            backoff_base_ms: 1000,
            backoff_step_ms: 500,
            backoff_max_ms: 5000,
        }
    }
}

/// Logging target configuration.
///
/// When the section is missing entirely the default file target is used;
/// a section without `path` logs to stderr only.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_log_level() -> String {
    "INFO".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            path: Some(PathBuf::from("logs/app.log")),
        }
    }
}
