//! The plinko-style drop game
//!
//! Ball physics lives in the presentation layer; here a ball's landing
//! bucket is one draw from the weighted bucket table. A volley debits
//! `balls * bet` up front, resolves each ball against its bucket's
//! multiplier and keeps running spent/won totals.

use std::sync::Arc;

use parking_lot::Mutex;
use rand::RngCore;

use crate::config::DropConfig;
use crate::error::{Error, Result};
use crate::ledger::CoinLedger;
use crate::random::WeightedSet;

#[derive(Debug, Clone, Copy)]
pub struct BallDrop {
    pub bucket: usize,
    pub multiplier: f64,
    pub payout: u64,
}

#[derive(Debug, Clone)]
pub struct VolleyReport {
    pub balls: Vec<BallDrop>,
    pub spent: u64,
    pub won: u64,
    pub balance: u64,
    /// Lifetime totals for this game instance
    pub total_spent: u64,
    pub total_won: u64,
}

impl VolleyReport {
    pub fn net(&self) -> i64 {
        self.total_won as i64 - self.total_spent as i64
    }
}

#[derive(Default)]
struct Totals {
    spent: u64,
    won: u64,
}

pub struct DropGame {
    multipliers: Vec<f64>,
    selector: WeightedSet<usize>,
    max_balls: u32,
    max_bet: u64,
    ledger: Arc<CoinLedger>,
    rng: Mutex<Box<dyn RngCore + Send>>,
    totals: Mutex<Totals>,
}

impl DropGame {
    pub fn new(
        config: &DropConfig,
        ledger: Arc<CoinLedger>,
        rng: Box<dyn RngCore + Send>,
    ) -> Result<Self> {
        Ok(Self {
            multipliers: config.buckets.iter().map(|b| b.multiplier).collect(),
            selector: config.bucket_set()?,
            max_balls: config.max_balls,
            max_bet: config.max_bet,
            ledger,
            rng: Mutex::new(rng),
            totals: Mutex::new(Totals::default()),
        })
    }

    /// Drop `balls` balls at `bet` coins each.
    pub fn drop_volley(&self, balls: u32, bet: u64) -> Result<VolleyReport> {
        if balls == 0 || balls > self.max_balls {
            return Err(Error::InvalidVolley {
                balls,
                max: self.max_balls,
            });
        }
        if bet == 0 || bet > self.max_bet {
            return Err(Error::InvalidBet {
                bet,
                max: self.max_bet,
            });
        }

        let stake = bet * balls as u64;
        if !self.ledger.debit(stake)? {
            return Err(Error::InsufficientFunds {
                needed: stake,
                available: self.ledger.balance(),
            });
        }

        let mut drops = Vec::with_capacity(balls as usize);
        let mut won = 0u64;
        for _ in 0..balls {
            let bucket = {
                let mut rng = self.rng.lock();
                *self.selector.pick(&mut **rng)
            };
            let multiplier = self.multipliers[bucket];
            let payout = (bet as f64 * multiplier).round() as u64;
            if payout > 0 {
                self.ledger.credit(payout)?;
            }
            won += payout;
            drops.push(BallDrop {
                bucket,
                multiplier,
                payout,
            });
        }

        let (total_spent, total_won) = {
            let mut totals = self.totals.lock();
            totals.spent += stake;
            totals.won += won;
            (totals.spent, totals.won)
        };

        tracing::info!(balls, bet, spent = stake, won, "volley resolved");

        Ok(VolleyReport {
            balls: drops,
            spent: stake,
            won,
            balance: self.ledger.balance(),
            total_spent,
            total_won,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::StateStore;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn game(seed: u64) -> (tempfile::TempDir, Arc<CoinLedger>, DropGame) {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(StateStore::open(dir.path()).unwrap());
        let ledger = Arc::new(CoinLedger::new(store));
        let game = DropGame::new(
            &DropConfig::default(),
            Arc::clone(&ledger),
            Box::new(ChaCha8Rng::seed_from_u64(seed)),
        )
        .unwrap();
        (dir, ledger, game)
    }

    #[test]
    fn volley_accounting_adds_up() {
        let (_dir, ledger, game) = game(1);
        ledger.credit(1_000).unwrap();

        let report = game.drop_volley(5, 10).unwrap();

        assert_eq!(report.spent, 50);
        assert_eq!(report.balls.len(), 5);
        let per_ball: u64 = report.balls.iter().map(|b| b.payout).sum();
        assert_eq!(per_ball, report.won);
        assert_eq!(ledger.balance(), 1_000 - 50 + report.won);
        assert_eq!(report.net(), report.total_won as i64 - report.total_spent as i64);
    }

    #[test]
    fn payouts_round_the_fractional_multiplier() {
        let (_dir, ledger, game) = game(2);
        ledger.credit(1_000).unwrap();

        let report = game.drop_volley(10, 3).unwrap();
        for ball in &report.balls {
            assert_eq!(ball.payout, (3.0 * ball.multiplier).round() as u64);
        }
        assert_eq!(ledger.balance(), 1_000 - 30 + report.won);
    }

    #[test]
    fn bounds_are_enforced_without_debit() {
        let (_dir, ledger, game) = game(3);
        ledger.credit(1_000).unwrap();

        assert!(matches!(
            game.drop_volley(0, 10),
            Err(Error::InvalidVolley { .. })
        ));
        assert!(matches!(
            game.drop_volley(11, 10),
            Err(Error::InvalidVolley { .. })
        ));
        assert!(matches!(
            game.drop_volley(1, 0),
            Err(Error::InvalidBet { .. })
        ));
        assert!(matches!(
            game.drop_volley(1, 101),
            Err(Error::InvalidBet { .. })
        ));
        assert_eq!(ledger.balance(), 1_000);
    }

    #[test]
    fn whole_volley_needs_funding_up_front() {
        let (_dir, ledger, game) = game(4);
        ledger.credit(49).unwrap();

        let result = game.drop_volley(5, 10);
        assert!(matches!(result, Err(Error::InsufficientFunds { .. })));
        assert_eq!(ledger.balance(), 49);
    }

    #[test]
    fn totals_accumulate_across_volleys() {
        let (_dir, ledger, game) = game(5);
        ledger.credit(10_000).unwrap();

        let first = game.drop_volley(10, 10).unwrap();
        let second = game.drop_volley(10, 10).unwrap();

        assert_eq!(second.total_spent, first.spent + second.spent);
        assert_eq!(second.total_won, first.won + second.won);
    }
}
