//! Deterministic RNG hierarchy.
//!
//! A master seed generates deterministic sub-seeds for each
//! `(ticker, strategy, iteration)` tuple. Sub-seeds are derived via BLAKE3
//! hashing, independently of thread scheduling order, so a batch of
//! backtests run in parallel draws exactly the same numbers as the same
//! batch run sequentially.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Deterministic RNG hierarchy.
#[derive(Debug, Clone)]
pub struct RngHierarchy {
    master_seed: u64,
}

impl RngHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derive a deterministic sub-seed for a specific (ticker, strategy, iteration).
    pub fn sub_seed(&self, ticker: &str, strategy: &str, iteration: u64) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(ticker.as_bytes());
        // Separator so ("AB", "C") and ("A", "BC") hash differently.
        hasher.update(&[0]);
        hasher.update(strategy.as_bytes());
        hasher.update(&iteration.to_le_bytes());
        let hash = hasher.finalize();

        let mut word = [0u8; 8];
        word.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(word)
    }

    /// Create a seeded StdRng from a sub-seed.
    pub fn rng_for(&self, ticker: &str, strategy: &str, iteration: u64) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(ticker, strategy, iteration))
    }
}
