//! Crate-level error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::orchestrator::mode::InvalidMode;
use crate::weather::WeatherError;

/// Errors that stop the orchestrator from starting or from applying a
/// configuration.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    InvalidMode(#[from] InvalidMode),

    #[error(transparent)]
    Backend(#[from] WeatherError),

    #[error("failed to configure logging target: {0}")]
    Logging(#[source] std::io::Error),

    #[error("failed to start config watcher: {0}")]
    Watcher(#[from] notify::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
