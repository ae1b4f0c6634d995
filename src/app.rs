//! Application facade wiring the whole casino together
//!
//! [`Casino`] owns construction: it validates the configuration, opens the
//! persistent store, builds the ledger and the cooldown gates and hands
//! each game its dependencies explicitly; there are no ambient globals.
//! Its methods are the inbound command surface the presentation layer
//! calls.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::Config;
use crate::cooldown::CooldownStore;
use crate::error::{Error, Result};
use crate::ledger::{BalanceWatch, CoinLedger};
use crate::persistence::StateStore;
use crate::plinko::{DropGame, VolleyReport};
use crate::rewards::{BoxReward, BoxStatus, RewardBoxes};
use crate::slots::{SlotMachine, SpinReport};
use crate::thimble::{ThimbleGame, ThimbleOutcome};
use crate::wheel::{PrizeWheel, WheelReward};

pub struct Casino {
    ledger: Arc<CoinLedger>,
    pub slots: SlotMachine,
    pub wheel: PrizeWheel,
    pub rewards: RewardBoxes,
    pub thimble: ThimbleGame,
    pub drop_game: DropGame,
}

impl Casino {
    /// Open the casino with entropy-seeded randomness.
    pub fn new<P: AsRef<Path>>(config: Config, data_dir: P) -> Result<Self> {
        Self::build(config, data_dir, &mut |_| {
            Box::new(StdRng::from_entropy()) as Box<dyn RngCore + Send>
        })
    }

    /// Open the casino with deterministic randomness, for replays and
    /// tests. Each game gets its own stream derived from `seed`.
    pub fn with_seed<P: AsRef<Path>>(config: Config, data_dir: P, seed: u64) -> Result<Self> {
        Self::build(config, data_dir, &mut |stream| {
            Box::new(ChaCha8Rng::seed_from_u64(seed.wrapping_add(stream))) as Box<dyn RngCore + Send>
        })
    }

    fn build<P: AsRef<Path>>(
        config: Config,
        data_dir: P,
        make_rng: &mut dyn FnMut(u64) -> Box<dyn RngCore + Send>,
    ) -> Result<Self> {
        config.validate()?;

        let store = Arc::new(StateStore::open(data_dir)?);
        let ledger = Arc::new(CoinLedger::new(Arc::clone(&store)));

        let wheel_window = chrono::Duration::from_std(config.wheel.cooldown)
            .map_err(|e| Error::Config(format!("wheel.cooldown: {}", e)))?;
        let rewards_window = chrono::Duration::from_std(config.rewards.cooldown)
            .map_err(|e| Error::Config(format!("rewards.cooldown: {}", e)))?;

        let slots = SlotMachine::new(
            &config.slots,
            config.economy.max_bet,
            Arc::clone(&ledger),
            make_rng(0),
        )?;
        let wheel = PrizeWheel::new(
            &config.wheel,
            CooldownStore::new(Arc::clone(&store), wheel_window),
            Arc::clone(&ledger),
            make_rng(1),
        )?;
        let rewards = RewardBoxes::new(
            &config.rewards,
            CooldownStore::new(Arc::clone(&store), rewards_window),
            Arc::clone(&ledger),
            make_rng(2),
        )?;
        let thimble = ThimbleGame::new(
            &config.thimble,
            config.economy.max_bet,
            Arc::clone(&ledger),
            make_rng(3),
        );
        let drop_game = DropGame::new(&config.drop_game, Arc::clone(&ledger), make_rng(4))?;

        tracing::info!(balance = ledger.balance(), "casino ready");

        Ok(Self {
            ledger,
            slots,
            wheel,
            rewards,
            thimble,
            drop_game,
        })
    }

    // --- coin commands ---

    pub fn balance(&self) -> u64 {
        self.ledger.balance()
    }

    pub fn add_coins(&self, amount: u64) -> Result<u64> {
        self.ledger.credit(amount)
    }

    pub fn remove_coins(&self, amount: u64) -> Result<bool> {
        self.ledger.debit(amount)
    }

    pub fn reset_coins(&self) -> Result<()> {
        self.ledger.reset()
    }

    pub fn watch_balance(&self, observer: impl Fn(u64) + Send + Sync + 'static) -> BalanceWatch {
        self.ledger.watch_balance(observer)
    }

    // --- game commands ---

    pub async fn spin_slots(&self, bet: u64) -> Result<SpinReport> {
        self.slots.spin(bet).await
    }

    pub fn spin_wheel(&self) -> Result<WheelReward> {
        self.wheel.spin(Utc::now())
    }

    pub fn open_reward_box(&self, box_id: &str) -> Result<BoxReward> {
        self.rewards.open(box_id, Utc::now())
    }

    pub fn box_statuses(&self) -> Vec<BoxStatus> {
        self.rewards.statuses(Utc::now())
    }

    pub fn play_thimble(&self, bet: u64, cup: usize) -> Result<ThimbleOutcome> {
        self.thimble.play(bet, cup)
    }

    pub fn drop_volley(&self, balls: u32, bet: u64) -> Result<VolleyReport> {
        self.drop_game.drop_volley(balls, bet)
    }
}
