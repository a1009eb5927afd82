//! Weather orchestrator library.
//!
//! Resolves a demo/real execution mode, keeps a hot-reloaded configuration
//! and dispatches weather requests to the backend for the active mode.

pub mod config;
pub mod error;
pub mod observability;
pub mod orchestrator;
pub mod resilience;
pub mod weather;

pub use config::{ConfigSnapshot, ConfigStore, Mode, Settings};
pub use error::{Error, Result};
pub use observability::LoggingContext;
pub use orchestrator::{Orchestrator, OrchestratorOptions};
pub use weather::{WeatherError, WeatherReport};
