//! Deterministic RNG hierarchy.
//!
//! A master seed generates deterministic sub-seeds for each `(stream, trial)`
//! pair. Sub-seeds are derived via BLAKE3 hashing, independently of thread
//! scheduling order, so parallel simulations give identical results
//! regardless of thread count.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Deterministic RNG hierarchy.
///
/// The master seed is expanded into per-(stream, trial) sub-seeds using
/// BLAKE3. Because derivation is hash-based, trial 917 gets the same seed
/// whether it runs first or last.
#[derive(Debug, Clone)]
pub struct RngHierarchy {
    master_seed: u64,
}

impl RngHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    /// A hierarchy whose master seed is drawn from OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derive a deterministic sub-seed for a specific (stream, trial).
    pub fn sub_seed(&self, stream: &str, trial: u64) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(stream.as_bytes());
        hasher.update(&trial.to_le_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }

    /// Create a seeded StdRng for a specific (stream, trial).
    pub fn rng_for(&self, stream: &str, trial: u64) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(stream, trial))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn sub_seeds_are_deterministic() {
        let hierarchy = RngHierarchy::new(42);
        assert_eq!(
            hierarchy.sub_seed("shuffle", 0),
            hierarchy.sub_seed("shuffle", 0)
        );
    }

    #[test]
    fn different_streams_different_seeds() {
        let hierarchy = RngHierarchy::new(42);
        assert_ne!(
            hierarchy.sub_seed("shuffle", 0),
            hierarchy.sub_seed("bootstrap", 0)
        );
    }

    #[test]
    fn different_trials_different_seeds() {
        let hierarchy = RngHierarchy::new(42);
        assert_ne!(
            hierarchy.sub_seed("shuffle", 0),
            hierarchy.sub_seed("shuffle", 1)
        );
    }

    #[test]
    fn derivation_order_independent() {
        let hierarchy = RngHierarchy::new(7);
        let forward: Vec<u64> = (0..16).map(|t| hierarchy.sub_seed("shuffle", t)).collect();
        let mut backward: Vec<u64> = (0..16)
            .rev()
            .map(|t| hierarchy.sub_seed("shuffle", t))
            .collect();
        backward.reverse();
        assert_eq!(forward, backward);
    }

    #[test]
    fn rng_streams_reproduce() {
        let hierarchy = RngHierarchy::new(99);
        let a: u64 = hierarchy.rng_for("shuffle", 3).gen();
        let b: u64 = hierarchy.rng_for("shuffle", 3).gen();
        assert_eq!(a, b);
    }

    #[test]
    fn different_master_seeds_different_output() {
        let h1 = RngHierarchy::new(42);
        let h2 = RngHierarchy::new(43);
        assert_ne!(h1.sub_seed("shuffle", 0), h2.sub_seed("shuffle", 0));
    }
}
