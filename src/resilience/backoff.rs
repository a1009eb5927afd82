//! Linear backoff with jitter.

use std::time::Duration;
use rand::Rng;

/// Delay to wait after a failed `attempt` (1-based) before the next one.
///
/// Grows by `step_ms` per attempt starting from `base_ms`, capped at `max_ms`.
pub fn calculate_backoff(attempt: u32, base_ms: u64, step_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let delay_ms = base_ms.saturating_add(step_ms.saturating_mul(u64::from(attempt)));
    let capped_delay = delay_ms.min(max_ms);

    // Apply jitter (0 to 10% of the delay)
    let jitter_range = capped_delay / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped_delay + jitter)
}
