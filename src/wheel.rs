//! The daily prize wheel
//!
//! One free spin per cooldown window. The winning section comes from the
//! shared weighted selector; the prize is credited to the ledger and the
//! wheel's gate records the spin time.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::RngCore;

use crate::config::{WheelConfig, WheelSectionDef};
use crate::cooldown::CooldownStore;
use crate::error::{Error, Result};
use crate::ledger::CoinLedger;
use crate::random::WeightedSet;

/// Gate key the wheel records its spins under.
pub const WHEEL_GATE: &str = "lucky_wheel";

/// What a spin landed on.
#[derive(Debug, Clone)]
pub struct WheelReward {
    pub section_index: usize,
    pub section_name: String,
    pub coins: u64,
    pub balance: u64,
}

pub struct PrizeWheel {
    sections: Vec<WheelSectionDef>,
    selector: WeightedSet<usize>,
    gates: CooldownStore,
    ledger: Arc<CoinLedger>,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl PrizeWheel {
    pub fn new(
        config: &WheelConfig,
        gates: CooldownStore,
        ledger: Arc<CoinLedger>,
        rng: Box<dyn RngCore + Send>,
    ) -> Result<Self> {
        Ok(Self {
            sections: config.sections.clone(),
            selector: config.section_set()?,
            gates,
            ledger,
            rng: Mutex::new(rng),
        })
    }

    /// Time left until the next free spin; zero when ready.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> chrono::Duration {
        self.gates.time_remaining(WHEEL_GATE, now)
    }

    /// Spin the wheel at `now`. Rejected with the remaining wait while the
    /// gate is closed.
    pub fn spin(&self, now: DateTime<Utc>) -> Result<WheelReward> {
        let remaining = self.gates.time_remaining(WHEEL_GATE, now);
        if remaining > chrono::Duration::zero() {
            return Err(Error::CooldownActive {
                remaining: remaining.to_std().unwrap_or_default(),
            });
        }

        let section_index = {
            let mut rng = self.rng.lock();
            *self.selector.pick(&mut **rng)
        };
        let section = &self.sections[section_index];

        let balance = self.ledger.credit(section.coins)?;
        self.gates.trigger(WHEEL_GATE, now)?;

        tracing::info!(
            section = %section.name,
            coins = section.coins,
            "wheel spin won"
        );

        Ok(WheelReward {
            section_index,
            section_name: section.name.clone(),
            coins: section.coins,
            balance,
        })
    }
}
