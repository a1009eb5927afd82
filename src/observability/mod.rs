//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing macros (structured log events)
//!     → logging.rs subscriber (stderr + configured log file)
//!
//! On config change:
//!     → orchestrator calls LoggingContext::apply
//!     → level filter reloaded, file target swapped
//! ```

pub mod logging;

pub use logging::{LogTarget, LoggingContext};
