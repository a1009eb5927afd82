//! Effective mode resolution.
//!
//! Precedence, first non-empty wins:
//! 1. command-line override
//! 2. `URA_MODE` environment variable
//! 3. the `mode` value from the loaded configuration

use std::fmt;

use thiserror::Error;

use crate::config::Mode;

/// Environment variable consulted for the second precedence tier.
pub const MODE_ENV_VAR: &str = "URA_MODE";

/// The resolved value was not one of the allowed modes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid mode '{value}' from {origin}: must be 'demo' or 'real'")]
pub struct InvalidMode {
    pub value: String,
    pub origin: ModeSource,
}

/// Which input supplied the effective mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSource {
    Cli,
    Env,
    Config,
}

impl fmt::Display for ModeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeSource::Cli => f.write_str("CLI"),
            ModeSource::Env => write!(f, "ENV {MODE_ENV_VAR}"),
            ModeSource::Config => f.write_str("config file"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedMode {
    pub mode: Mode,
    pub source: ModeSource,
}

/// Pick the effective mode from the three override tiers.
pub fn resolve_mode(
    cli: Option<&str>,
    env: Option<&str>,
    config: Mode,
) -> Result<ResolvedMode, InvalidMode> {
    fn non_empty(value: Option<&str>) -> Option<&str> {
        value.filter(|v| !v.trim().is_empty())
    }

    let (raw, source) = if let Some(cli) = non_empty(cli) {
        (cli, ModeSource::Cli)
    } else if let Some(env) = non_empty(env) {
        (env, ModeSource::Env)
    } else {
        (config.as_str(), ModeSource::Config)
    };

    let mode = raw.parse::<Mode>().map_err(|value| InvalidMode {
        value,
        origin: source,
    })?;
    tracing::info!(mode = %mode, source = %source, "Mode resolved");
    Ok(ResolvedMode { mode, source })
}
