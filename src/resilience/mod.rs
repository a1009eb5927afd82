//! Resilience helpers for upstream calls.
//!
//! # Data Flow
//! ```text
//! Request to weather API:
//!     → per-attempt timeout (reqwest client)
//!     → On failure: backoff.rs (linear delay + jitter), then retry
//!     → After the last attempt: error surfaces to the caller
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Retry budget is a fixed attempt count from configuration
//! - The orchestrator never retries on top of the backend

pub mod backoff;
