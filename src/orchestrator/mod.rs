//! Mode resolution and backend dispatch.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     ConfigStore::open → mode.rs (CLI > ENV > config)
//!     → build logging target + backend → start FileWatcher
//!
//! On reload:
//!     ConfigStore listener → snapshot.mode (no CLI/ENV)
//!     → build logging target + backend → swap ActiveBackend
//!
//! fetch_weather:
//!     load ActiveBackend once → backend.fetch → WeatherReport
//! ```
//!
//! # Design Decisions
//! - Mode and backend are swapped together, so callers never see a mix
//! - A failed rebuild leaves the previous pair in place
//! - In-flight fetches keep the backend they started with

pub mod controller;
pub mod mode;

pub use self::controller::{ActiveBackend, Orchestrator, OrchestratorOptions};
pub use self::mode::{resolve_mode, InvalidMode, ModeSource, ResolvedMode, MODE_ENV_VAR};
