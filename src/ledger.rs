//! Coin economy for MiniVegas
//!
//! This module implements the shared coin ledger:
//! - The single owner of the player balance
//! - Atomic credit/debit with fail-closed insufficient-funds handling
//! - Persistence after every successful mutation
//! - Balance-changed notifications with scoped observer registration
//!
//! Every game mode funnels its bets and payouts through here, so the
//! check-then-act of a debit is serialized against every other ledger call.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::persistence::StateStore;

type ObserverFn = dyn Fn(u64) + Send + Sync;

struct Observers {
    next_id: u64,
    entries: Vec<(u64, Arc<ObserverFn>)>,
}

/// Registration guard returned by [`CoinLedger::watch_balance`]. Dropping
/// it deregisters the observer, so a detached caller can never be notified
/// again.
pub struct BalanceWatch {
    registry: Arc<Mutex<Observers>>,
    id: u64,
}

impl Drop for BalanceWatch {
    fn drop(&mut self) {
        self.registry
            .lock()
            .entries
            .retain(|(id, _)| *id != self.id);
    }
}

/// The player's coin balance.
///
/// Successful mutations follow a fixed order: mutate, persist, notify.
/// The persist happens before the in-memory value commits, so a failed
/// save rolls the whole operation back. One lock guards the entire
/// sequence; two debits can never interleave their check and decrement.
pub struct CoinLedger {
    store: Arc<StateStore>,
    op_lock: Mutex<()>,
    observers: Arc<Mutex<Observers>>,
}

impl CoinLedger {
    /// Build the ledger over the persistent store; the starting balance is
    /// whatever the store loaded (0 on a fresh install).
    pub fn new(store: Arc<StateStore>) -> Self {
        Self {
            store,
            op_lock: Mutex::new(()),
            observers: Arc::new(Mutex::new(Observers {
                next_id: 0,
                entries: Vec::new(),
            })),
        }
    }

    pub fn balance(&self) -> u64 {
        self.store.coins()
    }

    /// Unconditionally add `amount` coins. Returns the new balance.
    pub fn credit(&self, amount: u64) -> Result<u64> {
        let after = {
            let _guard = self.op_lock.lock();
            let before = self.store.coins();
            let after = before.checked_add(amount).ok_or_else(|| {
                Error::InvalidAmount(format!("credit of {} overflows balance {}", amount, before))
            })?;
            self.store.set_coins(after)?;
            after
        };

        tracing::info!(amount, balance = after, "credited coins");
        // Observers run outside the lock so they may call back in
        self.notify(after);
        Ok(after)
    }

    /// Remove `amount` coins if the balance covers it. Insufficient funds
    /// is a normal `false` result, never an error, and leaves the balance
    /// untouched.
    pub fn debit(&self, amount: u64) -> Result<bool> {
        let after = {
            let _guard = self.op_lock.lock();
            let before = self.store.coins();
            if before < amount {
                tracing::debug!(amount, balance = before, "debit rejected, insufficient funds");
                return Ok(false);
            }
            let after = before - amount;
            self.store.set_coins(after)?;
            after
        };

        tracing::info!(amount, balance = after, "debited coins");
        self.notify(after);
        Ok(true)
    }

    /// Set the balance back to zero.
    pub fn reset(&self) -> Result<()> {
        {
            let _guard = self.op_lock.lock();
            self.store.set_coins(0)?;
        }

        tracing::info!("coin balance reset");
        self.notify(0);
        Ok(())
    }

    /// Register a balance observer. The observer fires synchronously after
    /// every successful credit, debit and reset, with the new balance.
    pub fn watch_balance(&self, observer: impl Fn(u64) + Send + Sync + 'static) -> BalanceWatch {
        let mut registry = self.observers.lock();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.entries.push((id, Arc::new(observer)));
        BalanceWatch {
            registry: Arc::clone(&self.observers),
            id,
        }
    }

    fn notify(&self, balance: u64) {
        // Snapshot outside the call so an observer can register or drop
        // watchers without deadlocking
        let observers: Vec<Arc<ObserverFn>> = self
            .observers
            .lock()
            .entries
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();

        for observer in observers {
            observer(balance);
        }
    }
}
