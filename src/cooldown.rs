//! Cooldown gates for repeatable rewards
//!
//! A gate maps a string key to the timestamp of its last successful
//! trigger. Readiness is a pure function of (last trigger, now, window):
//! there are no countdown tasks; callers recompute on demand and the only
//! state lives in the persistent store.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::error::Result;
use crate::persistence::StateStore;

/// Time left until a gate reopens: `max(0, window - (now - last))`.
/// A gate that has never triggered is immediately ready.
pub fn time_remaining(
    last_triggered: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    window: Duration,
) -> Duration {
    match last_triggered {
        None => Duration::zero(),
        Some(last) => {
            let elapsed = now - last;
            if elapsed >= window {
                Duration::zero()
            } else {
                window - elapsed
            }
        }
    }
}

pub fn is_ready(
    last_triggered: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    window: Duration,
) -> bool {
    time_remaining(last_triggered, now, window) == Duration::zero()
}

/// Gate state over the shared [`StateStore`], with a fixed window per gate
/// type (24 hours for every gate in this system).
pub struct CooldownStore {
    store: Arc<StateStore>,
    window: Duration,
}

impl CooldownStore {
    pub fn new(store: Arc<StateStore>, window: Duration) -> Self {
        Self { store, window }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Last trigger for `key`. An unknown key is not an error: it reads as
    /// "never triggered" and the gate is ready.
    pub fn last_trigger(&self, key: &str) -> Option<DateTime<Utc>> {
        let last = self.store.gate_timestamp(key);
        if last.is_none() {
            tracing::debug!(key, "no recorded trigger for gate, treating as ready");
        }
        last
    }

    pub fn time_remaining(&self, key: &str, now: DateTime<Utc>) -> Duration {
        time_remaining(self.last_trigger(key), now, self.window)
    }

    pub fn is_ready(&self, key: &str, now: DateTime<Utc>) -> bool {
        self.time_remaining(key, now) == Duration::zero()
    }

    /// Record a successful trigger at `now` and persist it.
    pub fn trigger(&self, key: &str, now: DateTime<Utc>) -> Result<()> {
        self.store.set_gate_timestamp(key, now)?;
        tracing::info!(key, at = %now, "cooldown gate triggered");
        Ok(())
    }
}
