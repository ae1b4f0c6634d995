//! Static configuration for MiniVegas
//!
//! Everything tunable lives here: weighted symbol/wheel/box/bucket tables,
//! win multipliers, probability constants, bet bounds, reel geometry and
//! the cooldown window. Configuration is loaded once (TOML) and validated
//! up front; a bad table is fatal at startup, never at draw time.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::random::{WeightedItem, WeightedSet};
use crate::slots::SymbolId;

/// Top-level configuration aggregate.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub economy: EconomyConfig,
    pub slots: SlotsConfig,
    pub wheel: WheelConfig,
    pub rewards: RewardsConfig,
    pub thimble: ThimbleConfig,
    pub drop_game: DropConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Upper bet bound for slots and thimbles; the lower bound is always 1.
    pub max_bet: u64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self { max_bet: 10 }
    }
}

/// One slot symbol: stable id, display name (opaque to the core), weight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolDef {
    pub id: SymbolId,
    pub name: String,
    pub weight: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WinMultipliers {
    pub vertical: u64,
    pub horizontal: u64,
    pub big_win: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotsConfig {
    pub reels: usize,
    pub rows: usize,
    pub symbols: Vec<SymbolDef>,
    /// Total spin time per reel
    #[serde(with = "humantime_serde")]
    pub spin_duration: Duration,
    /// Delay between shift-and-refill ticks
    #[serde(with = "humantime_serde")]
    pub spin_interval: Duration,
    /// Chance that a spin is forced into a win
    pub win_chance: f64,
    /// Chance that a forced win upgrades to a big win
    pub big_win_chance: f64,
    pub multipliers: WinMultipliers,
}

impl Default for SlotsConfig {
    fn default() -> Self {
        let symbols = [
            ("cherry", 12),
            ("lemon", 12),
            ("orange", 10),
            ("bell", 8),
            ("clover", 6),
            ("star", 4),
            ("seven", 2),
            ("diamond", 1),
        ]
        .iter()
        .enumerate()
        .map(|(i, &(name, weight))| SymbolDef {
            id: i as SymbolId + 1,
            name: name.to_string(),
            weight,
        })
        .collect();

        Self {
            reels: 5,
            rows: 3,
            symbols,
            spin_duration: Duration::from_secs(2),
            spin_interval: Duration::from_millis(100),
            win_chance: 0.15,
            big_win_chance: 0.2,
            multipliers: WinMultipliers {
                vertical: 10,
                horizontal: 15,
                big_win: 100,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WheelSectionDef {
    pub name: String,
    pub coins: u64,
    pub weight: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    pub sections: Vec<WheelSectionDef>,
    #[serde(with = "humantime_serde")]
    pub cooldown: Duration,
}

impl Default for WheelConfig {
    fn default() -> Self {
        let sections = [
            ("50 coins", 50u64, 30u32),
            ("100 coins", 100, 22),
            ("150 coins", 150, 16),
            ("200 coins", 200, 12),
            ("300 coins", 300, 9),
            ("500 coins", 500, 6),
            ("750 coins", 750, 4),
            ("1000 coins", 1000, 1),
        ]
        .iter()
        .map(|&(name, coins, weight)| WheelSectionDef {
            name: name.to_string(),
            coins,
            weight,
        })
        .collect();

        Self {
            sections,
            cooldown: Duration::from_secs(24 * 60 * 60),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrizeDef {
    pub coins: u64,
    pub weight: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxDef {
    pub id: String,
    pub prizes: Vec<PrizeDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardsConfig {
    pub boxes: Vec<BoxDef>,
    #[serde(with = "humantime_serde")]
    pub cooldown: Duration,
}

impl Default for RewardsConfig {
    fn default() -> Self {
        // Every box shares the original payout range, weighted toward the
        // small prizes
        let prizes: Vec<PrizeDef> = [
            (99u64, 40u32),
            (250, 30),
            (500, 18),
            (1000, 8),
            (1999, 3),
            (2999, 1),
        ]
        .iter()
        .map(|&(coins, weight)| PrizeDef { coins, weight })
        .collect();

        Self {
            boxes: ["red", "green", "blue"]
                .iter()
                .map(|&id| BoxDef {
                    id: id.to_string(),
                    prizes: prizes.clone(),
                })
                .collect(),
            cooldown: Duration::from_secs(24 * 60 * 60),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThimbleConfig {
    pub cups: usize,
    pub shuffle_swaps: usize,
    /// A correct guess pays bet times this
    pub win_multiplier: u64,
}

impl Default for ThimbleConfig {
    fn default() -> Self {
        Self {
            cups: 3,
            shuffle_swaps: 10,
            win_multiplier: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BucketDef {
    pub multiplier: f64,
    pub weight: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DropConfig {
    pub buckets: Vec<BucketDef>,
    pub max_balls: u32,
    pub max_bet: u64,
}

impl Default for DropConfig {
    fn default() -> Self {
        // Center-heavy landing odds stand in for the board physics
        let buckets = [
            (5.0, 2u32),
            (2.0, 8),
            (0.5, 20),
            (0.2, 40),
            (0.5, 20),
            (2.0, 8),
            (5.0, 2),
        ]
        .iter()
        .map(|&(multiplier, weight)| BucketDef { multiplier, weight })
        .collect();

        Self {
            buckets,
            max_balls: 10,
            max_bet: 100,
        }
    }
}

impl SlotsConfig {
    /// Weighted symbol table for the reels.
    pub fn symbol_set(&self) -> Result<WeightedSet<SymbolId>> {
        WeightedSet::new(
            self.symbols
                .iter()
                .map(|s| WeightedItem::new(s.id, s.weight))
                .collect(),
        )
    }
}

impl WheelConfig {
    /// Weighted wheel-section table, payload is the section index.
    pub fn section_set(&self) -> Result<WeightedSet<usize>> {
        WeightedSet::new(
            self.sections
                .iter()
                .enumerate()
                .map(|(i, s)| WeightedItem::new(i, s.weight))
                .collect(),
        )
    }
}

impl RewardsConfig {
    /// Weighted prize table per reward box, in configuration order.
    pub fn prize_sets(&self) -> Result<Vec<(String, WeightedSet<u64>)>> {
        self.boxes
            .iter()
            .map(|b| {
                let set = WeightedSet::new(
                    b.prizes
                        .iter()
                        .map(|p| WeightedItem::new(p.coins, p.weight))
                        .collect(),
                )
                .map_err(|e| Error::Config(format!("reward box {}: {}", b.id, e)))?;
                Ok((b.id.clone(), set))
            })
            .collect()
    }
}

impl DropConfig {
    /// Weighted bucket table, payload is the bucket index.
    pub fn bucket_set(&self) -> Result<WeightedSet<usize>> {
        WeightedSet::new(
            self.buckets
                .iter()
                .enumerate()
                .map(|(i, b)| WeightedItem::new(i, b.weight))
                .collect(),
        )
    }
}

impl Config {
    /// Load and validate a TOML configuration file. Missing sections fall
    /// back to the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Fail-fast validation of every table and constant.
    pub fn validate(&self) -> Result<()> {
        if self.economy.max_bet < 1 {
            return Err(Error::Config("economy.max_bet must be at least 1".into()));
        }

        let slots = &self.slots;
        if slots.reels == 0 || slots.rows == 0 {
            return Err(Error::Config("slots grid must have reels and rows".into()));
        }
        if slots.spin_interval.is_zero() {
            return Err(Error::Config("slots.spin_interval must be positive".into()));
        }
        if slots.spin_duration < slots.spin_interval {
            return Err(Error::Config(
                "slots.spin_duration must cover at least one tick".into(),
            ));
        }
        for chance in [slots.win_chance, slots.big_win_chance] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(Error::Config("slots win chances must be in [0, 1]".into()));
            }
        }
        let m = slots.multipliers;
        if !(m.big_win > m.horizontal && m.horizontal >= m.vertical && m.vertical > 1) {
            return Err(Error::Config(
                "slots multipliers must satisfy big_win > horizontal >= vertical > 1".into(),
            ));
        }
        self.slots.symbol_set()?;

        self.wheel.section_set()?;
        if self.wheel.cooldown.is_zero() {
            return Err(Error::Config("wheel.cooldown must be positive".into()));
        }

        if self.rewards.cooldown.is_zero() {
            return Err(Error::Config("rewards.cooldown must be positive".into()));
        }
        if self.rewards.boxes.is_empty() {
            return Err(Error::Config("rewards.boxes must not be empty".into()));
        }
        for (i, a) in self.rewards.boxes.iter().enumerate() {
            if self.rewards.boxes[..i].iter().any(|b| b.id == a.id) {
                return Err(Error::Config(format!("duplicate reward box id: {}", a.id)));
            }
        }
        self.rewards.prize_sets()?;

        if self.thimble.cups < 2 {
            return Err(Error::Config("thimble.cups must be at least 2".into()));
        }
        if self.thimble.shuffle_swaps == 0 {
            return Err(Error::Config("thimble.shuffle_swaps must be positive".into()));
        }
        if self.thimble.win_multiplier < 2 {
            return Err(Error::Config("thimble.win_multiplier must be at least 2".into()));
        }

        if self.drop_game.max_balls == 0 || self.drop_game.max_bet == 0 {
            return Err(Error::Config("drop_game bounds must be positive".into()));
        }
        for bucket in &self.drop_game.buckets {
            if !bucket.multiplier.is_finite() || bucket.multiplier < 0.0 {
                return Err(Error::Config(
                    "drop_game bucket multipliers must be finite and non-negative".into(),
                ));
            }
        }
        self.drop_game.bucket_set()?;

        Ok(())
    }
}
