//! Reconnection backoff policy.
//!
//! When a connection attempt fails and auto-reconnect is enabled, the next
//! attempt waits `min(base × 2^(attempt − 1), cap)`.  With the defaults
//! (base 1 s, cap 10 s) that is 1 s, 2 s, 4 s, 8 s, 10 s, 10 s, …
//!
//! The policy is pure arithmetic.  Sleeping is the caller's business, which
//! keeps this module free of any async runtime.

use std::time::Duration;

/// Default number of retries after the first failed attempt.
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 3;
/// Default delay before the first retry.
pub const DEFAULT_BASE_RECONNECT_DELAY: Duration = Duration::from_millis(1_000);
/// Default upper bound for any single retry delay.
pub const DEFAULT_CAP_RECONNECT_DELAY: Duration = Duration::from_millis(10_000);

/// Reconnection settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Retry at all?  When `false` the first failure is final.
    pub auto_reconnect: bool,
    /// Maximum number of retries before giving up.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub cap_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            auto_reconnect: false,
            max_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            base_delay: DEFAULT_BASE_RECONNECT_DELAY,
            cap_delay: DEFAULT_CAP_RECONNECT_DELAY,
        }
    }
}

impl ReconnectPolicy {
    /// Delay before retry number `attempt` (1-based).
    ///
    /// `attempt == 0` is treated as the first retry.  The doubling saturates
    /// instead of overflowing, so very large attempt numbers simply yield the
    /// cap.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let base_ms = u64::try_from(self.base_delay.as_millis()).unwrap_or(u64::MAX);
        let factor = 1u64.checked_shl(exponent).unwrap_or(u64::MAX);
        let delay = Duration::from_millis(base_ms.saturating_mul(factor));
        delay.min(self.cap_delay)
    }
}

/// Counts consecutive failed connection attempts, bounded by a maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectAttemptCounter {
    count: u32,
    max: u32,
}

impl ReconnectAttemptCounter {
    pub fn new(max: u32) -> Self {
        Self { count: 0, max }
    }

    /// Consumes one retry.
    ///
    /// Returns the new (1-based) attempt number, or `None` once the maximum
    /// has been reached.
    pub fn try_increment(&mut self) -> Option<u32> {
        if self.count >= self.max {
            return None;
        }
        self.count += 1;
        Some(self.count)
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn is_exhausted(&self) -> bool {
        self.count >= self.max
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
