//! Exponential backoff for retry scheduling (§4.4).
//!
//! `delay = INITIAL_RETRY_DELAY × BACKOFF_FACTOR^(attempt_number - 1)`.
//! Deliberately no jitter and no cap: the specification defines this as a
//! pure deterministic formula (testable property 5 checks the exact
//! lower bound), unlike status-code-based retry eligibility, which this
//! design does not use at all — every non-2xx response is retried up to
//! `MAX_RETRY_ATTEMPTS` regardless of status code class.

use chrono::Duration;

/// Delay to wait before submitting the task for `attempt_number + 1`,
/// given the just-failed `attempt_number`.
pub fn backoff_delay(attempt_number: i32, initial_delay_secs: i64, backoff_factor: i64) -> Duration {
    let exponent = (attempt_number - 1).max(0) as u32;
    let multiplier = backoff_factor.pow(exponent);
    Duration::seconds(initial_delay_secs * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_backoff_sequence() {
        // attempt 1 -> 2: 10s, 2 -> 3: 20s, 3 -> 4: 40s, 4 -> 5: 80s
        assert_eq!(backoff_delay(1, 10, 2), Duration::seconds(10));
        assert_eq!(backoff_delay(2, 10, 2), Duration::seconds(20));
        assert_eq!(backoff_delay(3, 10, 2), Duration::seconds(40));
        assert_eq!(backoff_delay(4, 10, 2), Duration::seconds(80));
    }

    #[test]
    fn test_custom_factor() {
        assert_eq!(backoff_delay(1, 5, 3), Duration::seconds(5));
        assert_eq!(backoff_delay(2, 5, 3), Duration::seconds(15));
        assert_eq!(backoff_delay(3, 5, 3), Duration::seconds(45));
    }
}
