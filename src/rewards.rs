//! Daily reward boxes
//!
//! A fixed small set of boxes, each on its own cooldown gate. Opening a
//! ready box draws a prize from the box's weighted table, credits it and
//! records the open time under the box's key.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::RngCore;

use crate::config::RewardsConfig;
use crate::cooldown::CooldownStore;
use crate::error::{Error, Result};
use crate::ledger::CoinLedger;
use crate::random::WeightedSet;

#[derive(Debug, Clone)]
pub struct BoxReward {
    pub box_id: String,
    pub coins: u64,
    pub balance: u64,
}

/// Readiness of one box, for rendering affordances.
#[derive(Debug, Clone)]
pub struct BoxStatus {
    pub box_id: String,
    pub remaining: chrono::Duration,
}

pub struct RewardBoxes {
    boxes: Vec<(String, WeightedSet<u64>)>,
    gates: CooldownStore,
    ledger: Arc<CoinLedger>,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl RewardBoxes {
    pub fn new(
        config: &RewardsConfig,
        gates: CooldownStore,
        ledger: Arc<CoinLedger>,
        rng: Box<dyn RngCore + Send>,
    ) -> Result<Self> {
        Ok(Self {
            boxes: config.prize_sets()?,
            gates,
            ledger,
            rng: Mutex::new(rng),
        })
    }

    pub fn box_ids(&self) -> impl Iterator<Item = &str> {
        self.boxes.iter().map(|(id, _)| id.as_str())
    }

    /// Readiness of every box at `now`, in configuration order.
    pub fn statuses(&self, now: DateTime<Utc>) -> Vec<BoxStatus> {
        self.boxes
            .iter()
            .map(|(id, _)| BoxStatus {
                box_id: id.clone(),
                remaining: self.gates.time_remaining(id, now),
            })
            .collect()
    }

    /// Open `box_id` at `now`. Unknown ids and closed gates are typed
    /// rejections; neither touches the ledger.
    pub fn open(&self, box_id: &str, now: DateTime<Utc>) -> Result<BoxReward> {
        let Some((id, prizes)) = self.boxes.iter().find(|(id, _)| id == box_id) else {
            tracing::warn!(box_id, "open request for unknown reward box");
            return Err(Error::GateNotFound(box_id.to_string()));
        };

        let remaining = self.gates.time_remaining(id, now);
        if remaining > chrono::Duration::zero() {
            return Err(Error::CooldownActive {
                remaining: remaining.to_std().unwrap_or_default(),
            });
        }

        let coins = {
            let mut rng = self.rng.lock();
            *prizes.pick(&mut **rng)
        };

        let balance = self.ledger.credit(coins)?;
        self.gates.trigger(id, now)?;

        tracing::info!(box_id, coins, "reward box opened");

        Ok(BoxReward {
            box_id: id.clone(),
            coins,
            balance,
        })
    }
}
