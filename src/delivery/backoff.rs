//! Backoff policy for rate-limited deliveries.
//!
//! The platform tells the relay exactly how long to wait, so there is no
//! exponential schedule to compute; the policy's job is to bound the total
//! time a single delivery may spend suspended. Once the accumulated waits
//! would exceed the ceiling, the delivery is deferred instead of retried,
//! which keeps a persistently throttled target from stalling the relay
//! forever on one video.

use std::time::Duration;

/// Default ceiling on accumulated backoff per delivery (15 minutes).
const DEFAULT_MAX_ELAPSED_SECS: u64 = 900;

/// Default pause after a successful send (2 seconds).
///
/// Throttles the relay below the platform's implicit per-chat rate limit
/// even when every send succeeds.
const DEFAULT_SEND_COOLDOWN_SECS: u64 = 2;

/// Timing policy for the delivery engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    /// Maximum accumulated backoff before a delivery is deferred.
    pub max_elapsed: Duration,

    /// Pause after each successful send.
    pub send_cooldown: Duration,
}

impl BackoffPolicy {
    /// Default policy: 15-minute backoff ceiling, 2-second success cooldown.
    pub const DEFAULT: Self = Self {
        max_elapsed: Duration::from_secs(DEFAULT_MAX_ELAPSED_SECS),
        send_cooldown: Duration::from_secs(DEFAULT_SEND_COOLDOWN_SECS),
    };

    /// Creates a policy with the given ceiling and cooldown.
    pub fn new(max_elapsed: Duration, send_cooldown: Duration) -> Self {
        Self {
            max_elapsed,
            send_cooldown,
        }
    }

    /// Decides whether a delivery that has already waited `waited` may wait
    /// another `requested`.
    ///
    /// Returns the wait to perform (always exactly what the platform
    /// requested; partial waits would just earn another rate limit), or
    /// `None` when the ceiling would be exceeded and the delivery should be
    /// deferred.
    pub fn next_wait(&self, waited: Duration, requested: Duration) -> Option<Duration> {
        if waited + requested > self.max_elapsed {
            None
        } else {
            Some(requested)
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}
