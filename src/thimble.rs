//! The thimble (shell) game
//!
//! One ball under one of three cups. A round runs bet -> shuffle ->
//! guess: the bet is debited up front, the shuffle performs a fixed
//! number of random pair swaps while tracking the ball, and a correct
//! guess pays double the bet. The swap sequence is part of the round
//! report, so a recorded round can be replayed move for move.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::config::ThimbleConfig;
use crate::error::{Error, Result};
use crate::ledger::CoinLedger;

/// One executed cup swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swap {
    pub first: usize,
    pub second: usize,
}

#[derive(Debug, Clone)]
pub struct ShuffleReport {
    pub swaps: Vec<Swap>,
}

#[derive(Debug, Clone)]
pub struct ThimbleOutcome {
    pub won: bool,
    pub ball_cup: usize,
    pub guessed_cup: usize,
    pub bet: u64,
    pub payout: u64,
    pub balance: u64,
    /// Net winnings across rounds: +bet per win, -bet per loss
    pub net_winnings: i64,
}

enum RoundState {
    Idle,
    BetPlaced { bet: u64 },
    Shuffled { bet: u64, ball_cup: usize },
}

pub struct ThimbleGame {
    cups: usize,
    shuffle_swaps: usize,
    win_multiplier: u64,
    max_bet: u64,
    ledger: Arc<CoinLedger>,
    rng: Mutex<Box<dyn RngCore + Send>>,
    state: Mutex<RoundState>,
    net_winnings: AtomicI64,
}

impl ThimbleGame {
    pub fn new(
        config: &ThimbleConfig,
        max_bet: u64,
        ledger: Arc<CoinLedger>,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        Self {
            cups: config.cups,
            shuffle_swaps: config.shuffle_swaps,
            win_multiplier: config.win_multiplier,
            max_bet,
            ledger,
            rng: Mutex::new(rng),
            state: Mutex::new(RoundState::Idle),
            net_winnings: AtomicI64::new(0),
        }
    }

    pub fn net_winnings(&self) -> i64 {
        self.net_winnings.load(Ordering::Relaxed)
    }

    /// Stake a round. The bet is debited immediately and fails closed.
    pub fn place_bet(&self, bet: u64) -> Result<()> {
        let mut state = self.state.lock();
        if !matches!(*state, RoundState::Idle) {
            return Err(Error::RoundInProgress);
        }
        if bet == 0 || bet > self.max_bet {
            return Err(Error::InvalidBet {
                bet,
                max: self.max_bet,
            });
        }
        if !self.ledger.debit(bet)? {
            return Err(Error::InsufficientFunds {
                needed: bet,
                available: self.ledger.balance(),
            });
        }

        *state = RoundState::BetPlaced { bet };
        Ok(())
    }

    /// Hide the ball and shuffle. Only valid once per placed bet.
    pub fn shuffle(&self) -> Result<ShuffleReport> {
        let mut state = self.state.lock();
        let bet = match &*state {
            RoundState::BetPlaced { bet } => *bet,
            RoundState::Shuffled { .. } => return Err(Error::RoundInProgress),
            RoundState::Idle => return Err(Error::NoActiveRound),
        };

        let mut rng = self.rng.lock();
        let mut ball_cup = rng.gen_range(0..self.cups);

        let mut swaps = Vec::with_capacity(self.shuffle_swaps);
        for _ in 0..self.shuffle_swaps {
            let first = rng.gen_range(0..self.cups);
            let second = rng.gen_range(0..self.cups);
            if first == second {
                continue;
            }
            // The ball follows its cup through every swap
            if ball_cup == first {
                ball_cup = second;
            } else if ball_cup == second {
                ball_cup = first;
            }
            swaps.push(Swap { first, second });
        }

        tracing::debug!(ball_cup, swap_count = swaps.len(), "cups shuffled");
        *state = RoundState::Shuffled { bet, ball_cup };
        Ok(ShuffleReport { swaps })
    }

    /// Resolve the round: a correct guess pays `bet * win_multiplier`.
    pub fn guess(&self, cup: usize) -> Result<ThimbleOutcome> {
        let mut state = self.state.lock();
        let (bet, ball_cup) = match &*state {
            RoundState::Shuffled { bet, ball_cup } => (*bet, *ball_cup),
            _ => return Err(Error::NoActiveRound),
        };
        if cup >= self.cups {
            return Err(Error::InvalidGuess {
                cup,
                cups: self.cups,
            });
        }

        let won = cup == ball_cup;
        let payout = if won { bet * self.win_multiplier } else { 0 };
        if payout > 0 {
            self.ledger.credit(payout)?;
        }

        let delta = if won { bet as i64 } else { -(bet as i64) };
        let net_winnings = self.net_winnings.fetch_add(delta, Ordering::Relaxed) + delta;

        *state = RoundState::Idle;
        tracing::info!(won, cup, ball_cup, payout, "thimble round resolved");

        Ok(ThimbleOutcome {
            won,
            ball_cup,
            guessed_cup: cup,
            bet,
            payout,
            balance: self.ledger.balance(),
            net_winnings,
        })
    }

    /// Convenience for command surfaces: one full round.
    pub fn play(&self, bet: u64, cup: usize) -> Result<ThimbleOutcome> {
        self.place_bet(bet)?;
        self.shuffle()?;
        self.guess(cup)
    }
}
