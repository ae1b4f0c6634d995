//! Slot machine: reels, win evaluation and the spin session
//!
//! - [`reel`]: one scrolling column with its spin lifecycle
//! - [`evaluator`]: settled-grid inspection and outcome classification
//! - [`machine`]: the per-spin protocol tying bets, reels, forced
//!   outcomes and payouts together

pub mod evaluator;
pub mod machine;
pub mod reel;

pub use evaluator::{evaluate, Grid, SpinOutcome, WinKind};
pub use machine::{SlotMachine, SpinReport};
pub use reel::{Reel, ReelState};

/// Stable identifier of a slot symbol; display data is opaque to the core.
pub type SymbolId = u32;
