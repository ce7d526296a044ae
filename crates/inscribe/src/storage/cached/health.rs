//! Cache health tracking for a decorated repository.
//!
//! ```text
//! Healthy --(store fault)--> Degraded { until }
//! Degraded --(now >= until)--> Recovering --(purge ok)--> Healthy
//! Recovering --(purge failed)--> Degraded { until }
//! ```
//!
//! The cooldown is checked lazily on the next call; nothing runs in the
//! background. Only the caller that moves the state to `Recovering` runs
//! the purge. Everyone else keeps bypassing the cache until it finishes.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Default time spent bypassing the cache after a fault.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Healthy,
    Degraded { until: Instant },
    /// Cooldown elapsed; a purge is in flight.
    Recovering,
}

/// Outcome of [`CacheHealth::check`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthCheck {
    /// Use the cache.
    Healthy,
    /// Degraded or recovering; bypass the cache.
    Degraded,
    /// The cooldown just elapsed. The caller must purge and then report
    /// back with [`CacheHealth::recovered`] or [`CacheHealth::degrade`].
    /// Exactly one caller observes this per degraded window.
    Recovered,
}

/// Per-repository health flag with a fixed cooldown.
#[derive(Debug)]
pub struct CacheHealth {
    state: Mutex<HealthState>,
    cooldown: Duration,
}

impl CacheHealth {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            state: Mutex::new(HealthState::Healthy),
            cooldown,
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn state(&self) -> HealthState {
        *self.lock()
    }

    /// Reports whether the cache may be used at `now`, moving to
    /// `Recovering` once the cooldown has elapsed.
    pub fn check(&self, now: Instant) -> HealthCheck {
        let mut state = self.lock();
        match *state {
            HealthState::Healthy => HealthCheck::Healthy,
            HealthState::Degraded { until } if now < until => HealthCheck::Degraded,
            HealthState::Degraded { .. } => {
                *state = HealthState::Recovering;
                HealthCheck::Recovered
            }
            HealthState::Recovering => HealthCheck::Degraded,
        }
    }

    /// Completes a recovery. A fault recorded while the purge ran wins.
    pub fn recovered(&self) -> bool {
        let mut state = self.lock();
        if *state == HealthState::Recovering {
            *state = HealthState::Healthy;
            true
        } else {
            false
        }
    }

    /// Enters (or extends) the degraded state, returning when it ends.
    pub fn degrade(&self, now: Instant) -> Instant {
        let until = now + self.cooldown;
        *self.lock() = HealthState::Degraded { until };
        until
    }

    fn lock(&self) -> MutexGuard<'_, HealthState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CacheHealth {
    fn default() -> Self {
        Self::new(DEFAULT_COOLDOWN)
    }
}
