//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (JSON/TOML)
//!     → loader.rs (read, strip BOM, parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → Settings (validated, immutable)
//!     → store.rs wraps it in an Arc<ConfigSnapshot>
//!
//! On file change:
//!     watcher.rs detects change
//!     → store.rs reloads via loader.rs + validation.rs
//!     → atomic swap of Arc<ConfigSnapshot>
//!     → registered listeners observe new snapshot
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - A failed reload never replaces the current snapshot

pub mod loader;
pub mod schema;
pub mod store;
pub mod validation;
pub mod watcher;

pub use loader::{ConfigError, ParseError};
pub use schema::{LoggingConfig, Mode, Settings, WeatherConfig};
pub use store::{ConfigSnapshot, ConfigStore, ListenerError};
pub use validation::ValidationError;
pub use watcher::FileWatcher;
