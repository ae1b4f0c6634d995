//! A single slot reel
//!
//! The reel is a small state machine: `Idle -> Spinning -> Settled`, and
//! `Settled -> Spinning` again for the next round. While spinning, each
//! tick shifts every visible symbol one slot toward the exit edge (index 0
//! leaves first) and refills the tail from the weighted symbol table. The
//! session coordinator owns the clock; the reel itself never waits.

use rand::Rng;

use crate::error::{Error, Result};
use crate::random::WeightedSet;

use super::SymbolId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReelState {
    Idle,
    Spinning,
    Settled,
}

#[derive(Debug)]
pub struct Reel {
    /// Visible column, exit edge first
    visible: Vec<SymbolId>,
    state: ReelState,
    ticks_left: u32,
}

impl Reel {
    /// Build a reel with `rows` visible symbols drawn from the table.
    pub fn new<R: Rng + ?Sized>(
        rows: usize,
        symbols: &WeightedSet<SymbolId>,
        rng: &mut R,
    ) -> Self {
        let visible = (0..rows).map(|_| *symbols.pick(rng)).collect();
        Self {
            visible,
            state: ReelState::Idle,
            ticks_left: 0,
        }
    }

    pub fn state(&self) -> ReelState {
        self.state
    }

    pub fn is_spinning(&self) -> bool {
        self.state == ReelState::Spinning
    }

    /// The visible column, exit edge first. Only meaningful for evaluation
    /// once the reel has settled.
    pub fn symbols(&self) -> &[SymbolId] {
        &self.visible
    }

    /// Enter the spinning state for `ticks` shift-and-refill steps.
    pub fn begin_spin(&mut self, ticks: u32) -> Result<()> {
        if self.state == ReelState::Spinning {
            return Err(Error::SpinAlreadyInProgress);
        }
        self.state = ReelState::Spinning;
        self.ticks_left = ticks.max(1);
        Ok(())
    }

    /// One spin tick: the symbol at the exit edge leaves, the rest shift
    /// toward it, and a fresh draw fills the vacated tail slot. Settles
    /// after the final tick.
    pub fn step<R: Rng + ?Sized>(&mut self, symbols: &WeightedSet<SymbolId>, rng: &mut R) {
        if self.state != ReelState::Spinning {
            return;
        }

        self.visible.rotate_left(1);
        if let Some(tail) = self.visible.last_mut() {
            *tail = *symbols.pick(rng);
        }

        self.ticks_left -= 1;
        if self.ticks_left == 0 {
            self.state = ReelState::Settled;
        }
    }

    /// Abandon an in-flight spin without settling. Used when a cancelled
    /// session left the reel mid-flight; the ledger is untouched by design.
    pub fn cancel(&mut self) {
        if self.state == ReelState::Spinning {
            self.state = ReelState::Idle;
            self.ticks_left = 0;
        }
    }

    /// Overwrite one visible symbol (forced-outcome injection).
    pub fn set_symbol(&mut self, row: usize, id: SymbolId) {
        debug_assert!(row < self.visible.len());
        if let Some(slot) = self.visible.get_mut(row) {
            *slot = id;
        }
    }

    /// Overwrite the whole column with one symbol (forced vertical win).
    pub fn fill(&mut self, id: SymbolId) {
        self.visible.fill(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::WeightedItem;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn table() -> WeightedSet<SymbolId> {
        WeightedSet::new((1..=4).map(|id| WeightedItem::new(id, 1)).collect()).unwrap()
    }

    #[test]
    fn lifecycle_transitions() {
        let symbols = table();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut reel = Reel::new(3, &symbols, &mut rng);

        assert_eq!(reel.state(), ReelState::Idle);
        reel.begin_spin(2).unwrap();
        assert_eq!(reel.state(), ReelState::Spinning);

        reel.step(&symbols, &mut rng);
        assert_eq!(reel.state(), ReelState::Spinning);
        reel.step(&symbols, &mut rng);
        assert_eq!(reel.state(), ReelState::Settled);

        // Re-entrant: a settled reel can spin again
        reel.begin_spin(1).unwrap();
        assert_eq!(reel.state(), ReelState::Spinning);
        assert!(matches!(
            reel.begin_spin(1),
            Err(Error::SpinAlreadyInProgress)
        ));
    }

    #[test]
    fn step_shifts_toward_exit_edge() {
        let symbols = table();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut reel = Reel::new(3, &symbols, &mut rng);
        let before = reel.symbols().to_vec();

        reel.begin_spin(5).unwrap();
        reel.step(&symbols, &mut rng);
        let after = reel.symbols();

        // Oldest symbol left at index 0, survivors moved one slot up
        assert_eq!(after[0], before[1]);
        assert_eq!(after[1], before[2]);
        assert_eq!(after.len(), 3);
    }

    #[test]
    fn column_order_is_replayable() {
        let symbols = table();
        let run = |seed: u64| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut reel = Reel::new(3, &symbols, &mut rng);
            reel.begin_spin(20).unwrap();
            for _ in 0..20 {
                reel.step(&symbols, &mut rng);
            }
            reel.symbols().to_vec()
        };

        assert_eq!(run(9), run(9));
        assert_eq!(run(9).len(), 3);
    }

    #[test]
    fn cancel_returns_to_idle() {
        let symbols = table();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut reel = Reel::new(3, &symbols, &mut rng);

        reel.begin_spin(10).unwrap();
        reel.cancel();
        assert_eq!(reel.state(), ReelState::Idle);

        // Stepping a cancelled reel is a no-op
        let frozen = reel.symbols().to_vec();
        reel.step(&symbols, &mut rng);
        assert_eq!(reel.symbols(), frozen.as_slice());
    }
}
