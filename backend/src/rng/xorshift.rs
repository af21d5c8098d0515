//! xorshift64* random number generator
//!
//! Same seed → same sequence. A simulation run is reproducible only if every
//! random draw (account visiting order, shareholder selection in collaborators)
//! comes from a single seeded instance of this generator.

use serde::{Deserialize, Serialize};

/// Deterministic random number generator using xorshift64*
///
/// # Example
/// ```
/// use credit_ledger_core_rs::RngManager;
///
/// let mut rng = RngManager::new(12345);
/// let mut order = vec![0, 1, 2, 3];
/// rng.shuffle(&mut order);
/// order.sort();
/// assert_eq!(order, vec![0, 1, 2, 3]);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngManager {
    state: u64,
}

impl RngManager {
    /// Create a new RNG with given seed. A zero seed is replaced by 1.
    pub fn new(seed: u64) -> Self {
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u64 value
    pub fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }

    /// Uniform index in `[0, bound)`
    ///
    /// # Panics
    /// Panics if `bound == 0`
    pub fn index(&mut self, bound: usize) -> usize {
        assert!(bound > 0, "bound must be positive");
        (self.next() % bound as u64) as usize
    }

    /// Generate random value in range [min, max)
    ///
    /// # Panics
    /// Panics if min >= max
    pub fn range(&mut self, min: i64, max: i64) -> i64 {
        assert!(min < max, "min must be less than max");

        let range_size = (max - min) as u64;
        min + (self.next() % range_size) as i64
    }

    /// Shuffle a slice in place (Fisher–Yates, back to front)
    ///
    /// Consumes exactly `len - 1` draws, so two generators with the same
    /// state produce the same permutation.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.index(i + 1);
            items.swap(i, j);
        }
    }

    /// Current state (the seed of an equivalent generator)
    pub fn get_state(&self) -> u64 {
        self.state
    }
}
