//! Minimum spacing between outbound requests.
//!
//! A depth-1 limiter: at most one request per `delay`, no bursts, no queue.
//! Built on a `governor` rate limiter whose quota replenishes a single cell
//! every `delay`. A zero delay disables throttling.

use std::fmt;
use std::thread;
use std::time::Duration;

use governor::clock::{Clock, MonotonicClock};
use governor::middleware::NoOpMiddleware;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

type DirectRateLimiter =
    RateLimiter<NotKeyed, InMemoryState, MonotonicClock, NoOpMiddleware<<MonotonicClock as Clock>::Instant>>;

pub struct Throttle {
    delay: Duration,
    clock: MonotonicClock,
    limiter: Option<DirectRateLimiter>,
}

impl Throttle {
    pub fn new(delay: Duration) -> Self {
        let clock = MonotonicClock::default();
        // `with_period` rejects a zero period; no limiter means no spacing.
        let limiter =
            Quota::with_period(delay).map(|quota| RateLimiter::direct_with_clock(quota, &clock));
        Self {
            delay,
            clock,
            limiter,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Blocks until the next request may depart and claims its slot.
    ///
    /// Returns how long the caller was held back.
    pub fn wait(&self) -> Duration {
        let Some(limiter) = &self.limiter else {
            return Duration::ZERO;
        };

        let mut slept = Duration::ZERO;
        while let Err(not_until) = limiter.check() {
            let pause = not_until.wait_time_from(self.clock.now());
            tracing::debug!(sleep_ms = pause.as_millis() as u64, "throttling before request");
            thread::sleep(pause);
            slept += pause;
        }
        slept
    }
}

impl fmt::Debug for Throttle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Throttle")
            .field("delay", &self.delay)
            .field("enabled", &self.limiter.is_some())
            .finish()
    }
}
