//! Weighted random outcome selection
//!
//! One selector serves every game mode: slot symbols, wheel sections,
//! reward-box prizes and drop-game buckets are all drawn from a
//! [`WeightedSet`]. Selection walks the items accumulating weights, which
//! keeps a draw O(n) no matter how large the weights are, and makes the
//! output a pure function of the RNG sequence and the set's item order,
//! so seeded replays reproduce every draw.

use rand::Rng;

use crate::error::{Error, Result};

/// A payload with its relative draw weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedItem<T> {
    pub item: T,
    pub weight: u32,
}

impl<T> WeightedItem<T> {
    pub fn new(item: T, weight: u32) -> Self {
        Self { item, weight }
    }
}

/// An ordered collection of weighted items with total weight > 0.
///
/// Construction validates the invariants (non-empty, every weight >= 1),
/// so draws on a built set are infallible.
#[derive(Debug, Clone)]
pub struct WeightedSet<T> {
    items: Vec<WeightedItem<T>>,
    total_weight: u64,
}

impl<T> WeightedSet<T> {
    pub fn new(items: Vec<WeightedItem<T>>) -> Result<Self> {
        if items.is_empty() {
            return Err(Error::EmptyWeightedSet);
        }
        if let Some(position) = items.iter().position(|entry| entry.weight == 0) {
            return Err(Error::Config(format!(
                "weighted entry {} has zero weight",
                position
            )));
        }

        let total_weight = items.iter().map(|entry| entry.weight as u64).sum();
        Ok(Self {
            items,
            total_weight,
        })
    }

    /// Draw one item: roll uniformly in `[1, total_weight]`, then walk the
    /// items accumulating weights until the running sum reaches the roll.
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> &T {
        self.pick_indexed(rng).1
    }

    /// Like [`pick`](Self::pick), additionally returning the item's index.
    pub fn pick_indexed<R: Rng + ?Sized>(&self, rng: &mut R) -> (usize, &T) {
        let roll = rng.gen_range(1..=self.total_weight);

        let mut accumulated = 0u64;
        for (index, entry) in self.items.iter().enumerate() {
            accumulated += entry.weight as u64;
            if accumulated >= roll {
                return (index, &entry.item);
            }
        }

        // total_weight is the sum of all entry weights, so the walk always
        // terminates inside the loop
        unreachable!("roll {} exceeded total weight {}", roll, self.total_weight)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    pub fn items(&self) -> impl Iterator<Item = &WeightedItem<T>> {
        self.items.iter()
    }
}
