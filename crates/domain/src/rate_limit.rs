//! Rate limiting for geocoding calls.
//!
//! The limiter counts elapsed seconds through [`tick`](GeocodeRateLimiter::tick)
//! rather than reading a clock, so the control loop's 1 s timer is the only
//! time source. Requests arriving too early are dropped, never queued.

use serde::{Deserialize, Serialize};

/// Default minimum spacing between two completed geocoding calls.
pub const DEFAULT_MIN_INTERVAL_SECS: u64 = 60;

/// Outcome of asking for a geocoding slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Admission {
    Granted,
    /// Another call is still in flight.
    Busy,
    /// The last success is too recent.
    TooSoon { remaining_secs: u64 },
}

impl Admission {
    #[must_use]
    pub fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// At most one successful geocode per window, one call in flight at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocodeRateLimiter {
    min_interval_secs: u64,
    /// Seconds since the last success; `None` before the first one.
    elapsed_secs: Option<u64>,
    in_flight: bool,
}

impl Default for GeocodeRateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL_SECS)
    }
}

impl GeocodeRateLimiter {
    #[must_use]
    pub fn new(min_interval_secs: u64) -> Self {
        Self {
            min_interval_secs,
            elapsed_secs: None,
            in_flight: false,
        }
    }

    /// Advance the elapsed-seconds counter by one.
    pub fn tick(&mut self) {
        self.advance(1);
    }

    /// Advance the elapsed-seconds counter by `secs`.
    pub fn advance(&mut self, secs: u64) {
        if let Some(elapsed) = self.elapsed_secs.as_mut() {
            *elapsed = elapsed.saturating_add(secs);
        }
    }

    /// Check whether a call may start, without taking the slot.
    #[must_use]
    pub fn check(&self) -> Admission {
        if self.in_flight {
            return Admission::Busy;
        }
        match self.elapsed_secs {
            Some(elapsed) if elapsed < self.min_interval_secs => Admission::TooSoon {
                remaining_secs: self.min_interval_secs - elapsed,
            },
            _ => Admission::Granted,
        }
    }

    /// Take the slot if a call may start.
    pub fn try_acquire(&mut self) -> Admission {
        let admission = self.check();
        if admission.is_granted() {
            self.in_flight = true;
        }
        admission
    }

    /// The in-flight call succeeded: release the slot and restart the window.
    pub fn record_success(&mut self) {
        self.in_flight = false;
        self.elapsed_secs = Some(0);
    }

    /// The in-flight call failed: release the slot, keep the window.
    pub fn record_failure(&mut self) {
        self.in_flight = false;
    }

    #[must_use]
    pub fn elapsed_secs(&self) -> Option<u64> {
        self.elapsed_secs
    }

    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_grant_first_request() {
        let mut limiter = GeocodeRateLimiter::default();
        assert_eq!(limiter.try_acquire(), Admission::Granted);
    }

    #[test]
    fn should_complete_exactly_one_call_within_window() {
        let mut limiter = GeocodeRateLimiter::default();
        let mut completed = 0;
        for second in 0..60 {
            if limiter.try_acquire().is_granted() {
                limiter.record_success();
                completed += 1;
            }
            if second < 59 {
                limiter.tick();
            }
        }
        assert_eq!(completed, 1);
    }

    #[test]
    fn should_grant_second_call_after_window() {
        let mut limiter = GeocodeRateLimiter::default();
        assert!(limiter.try_acquire().is_granted());
        limiter.record_success();

        limiter.advance(59);
        assert_eq!(
            limiter.try_acquire(),
            Admission::TooSoon { remaining_secs: 1 }
        );

        limiter.tick();
        assert!(limiter.try_acquire().is_granted());
    }

    #[test]
    fn should_refuse_while_call_in_flight() {
        let mut limiter = GeocodeRateLimiter::default();
        assert!(limiter.try_acquire().is_granted());
        assert_eq!(limiter.try_acquire(), Admission::Busy);
    }

    #[test]
    fn should_allow_retry_after_failure_before_any_success() {
        let mut limiter = GeocodeRateLimiter::default();
        assert!(limiter.try_acquire().is_granted());
        limiter.record_failure();
        assert!(limiter.try_acquire().is_granted());
    }

    #[test]
    fn should_keep_window_after_failure() {
        let mut limiter = GeocodeRateLimiter::new(10);
        assert!(limiter.try_acquire().is_granted());
        limiter.record_success();
        limiter.advance(10);
        assert!(limiter.try_acquire().is_granted());
        limiter.record_failure();
        assert_eq!(limiter.elapsed_secs(), Some(10));
        assert!(limiter.try_acquire().is_granted());
    }

    #[test]
    fn should_not_count_before_first_success() {
        let mut limiter = GeocodeRateLimiter::default();
        limiter.advance(120);
        assert_eq!(limiter.elapsed_secs(), None);
    }
}
