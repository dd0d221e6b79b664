//! Request-rate ceiling shared by every agent of a crew.

use std::num::NonZeroU32;
use std::thread;

use anyhow::{Result, anyhow};
use governor::clock::{Clock, DefaultClock};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use tracing::debug;

/// Blocking rate limiter allowing `max_rpm` model requests per minute.
pub struct Throttle {
    limiter: DefaultDirectRateLimiter,
    clock: DefaultClock,
    max_rpm: u32,
}

impl std::fmt::Debug for Throttle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Throttle")
            .field("max_rpm", &self.max_rpm)
            .finish()
    }
}

impl Throttle {
    pub fn per_minute(max_rpm: u32) -> Result<Self> {
        let rate = NonZeroU32::new(max_rpm).ok_or_else(|| anyhow!("max_rpm must be > 0"))?;
        Ok(Self {
            limiter: RateLimiter::direct(Quota::per_minute(rate)),
            clock: DefaultClock::default(),
            max_rpm,
        })
    }

    /// Block the calling thread until a request slot is available.
    pub fn acquire(&self) {
        while let Err(not_until) = self.limiter.check() {
            let wait = not_until.wait_time_from(self.clock.now());
            debug!(
                wait_ms = wait.as_millis() as u64,
                max_rpm = self.max_rpm,
                "rate limit reached, waiting"
            );
            thread::sleep(wait);
        }
    }
}

#[cfg(test)]
impl Throttle {
    /// Take a slot if one is free right now.
    fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}
