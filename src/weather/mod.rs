//! Weather backends.
//!
//! # Data Flow
//! ```text
//! fetch(location)
//!     → backend.rs (dispatch on the active mode)
//!         - demo.rs (read mock JSON file)
//!         - live.rs (Open-Meteo geocoding → forecast, with retries)
//!     → types.rs (normalize into WeatherReport)
//! ```
//!
//! # Design Decisions
//! - Backends validate their own required fields when built, not at config load
//! - Missing payload fields never fail a fetch; they come back as `None`

pub mod backend;
pub mod demo;
pub mod live;
pub mod types;

pub use backend::WeatherBackend;
pub use types::{WeatherError, WeatherReport, WeatherResult};
