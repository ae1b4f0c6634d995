//! MiniVegas - a casino mini-game core
//!
//! One coin economy, one timed-gating mechanism, and the features built
//! on top of them:
//! - slots: weighted reels, payline evaluation, forced-outcome injection
//! - wheel: a daily prize wheel behind a 24 h cooldown gate
//! - rewards: daily reward boxes, one gate per box
//! - thimble: the classic shell game at even-money-plus odds
//! - plinko: a drop game resolved through weighted landing buckets
//!
//! The shared pieces live in their own modules: the ledger owns the
//! balance, the cooldown store owns the gates, and every random outcome
//! in every game flows through the weighted selector.

pub mod app;
pub mod config;
pub mod cooldown;
pub mod error;
pub mod ledger;
pub mod persistence;
pub mod plinko;
pub mod random;
pub mod rewards;
pub mod slots;
pub mod thimble;
pub mod wheel;

// Re-export commonly used types for easy access
pub use app::Casino;
pub use config::Config;
pub use error::{Error, Result};
pub use ledger::{BalanceWatch, CoinLedger};
pub use persistence::StateStore;
pub use random::{WeightedItem, WeightedSet};
pub use slots::{Grid, SlotMachine, SpinOutcome, SpinReport, SymbolId, WinKind};
