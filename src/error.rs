//! Error types and handling for MiniVegas

use thiserror::Error;

/// Result type alias for MiniVegas operations
pub type Result<T> = std::result::Result<T, Error>;

/// MiniVegas error types
#[derive(Debug, Error)]
pub enum Error {
    /// A credit would push the balance past its representable range.
    /// Negative amounts are unrepresentable by type; overflow is the
    /// remaining caller bug this variant surfaces.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("insufficient funds: {needed} needed, {available} available")]
    InsufficientFunds { needed: u64, available: u64 },

    #[error("weighted set has no drawable entries")]
    EmptyWeightedSet,

    #[error("spin already in progress")]
    SpinAlreadyInProgress,

    #[error("invalid bet {bet}: must be between 1 and {max}")]
    InvalidBet { bet: u64, max: u64 },

    #[error("unknown cooldown gate: {0}")]
    GateNotFound(String),

    #[error("cooldown active: ready in {}s", remaining.as_secs())]
    CooldownActive { remaining: std::time::Duration },

    #[error("round already in progress")]
    RoundInProgress,

    #[error("no active round")]
    NoActiveRound,

    #[error("invalid cup {cup}: table has {cups} cups")]
    InvalidGuess { cup: usize, cups: usize },

    #[error("invalid ball count {balls}: must be between 1 and {max}")]
    InvalidVolley { balls: u32, max: u32 },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
