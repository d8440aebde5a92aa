//! Seeded random number generation
//!
//! Uses a ChaCha stream so every generation step is reproducible from its seed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

const SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Generation random number generator
///
/// Wraps ChaCha8Rng. Only the seed is serialized; the stream restarts from it.
#[derive(Debug, Clone)]
pub struct GenRng {
    rng: ChaCha8Rng,
    seed: u64,
}

impl Serialize for GenRng {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.seed.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GenRng {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let seed = u64::deserialize(deserializer)?;
        Ok(GenRng::new(seed))
    }
}

impl GenRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create a new RNG with a random seed
    pub fn from_entropy() -> Self {
        let seed = rand::random();
        Self::new(seed)
    }

    /// Get the seed used to create this RNG
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Returns 0..n-1, or 0 if n is 0
    pub fn rn2(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.rng.gen_range(0..n)
    }

    /// Uniform integer in `lo..=hi`. Returns `lo` when the range is empty.
    pub fn range_inclusive(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }

    /// Uniform index into a collection of `len` items
    pub fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }

    /// Uniform float in [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        self.rng.gen_range(0.0..1.0)
    }

    /// Returns true with probability `p` (clamped to [0, 1])
    pub fn chance(&mut self, p: f64) -> bool {
        if p <= 0.0 {
            return false;
        }
        if p >= 1.0 {
            return true;
        }
        self.next_f64() < p
    }

    /// Choose a random element from a slice
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            Some(&items[self.index(items.len())])
        }
    }

    /// Shuffle a slice in place
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.index(i + 1);
            items.swap(i, j);
        }
    }
}

impl Default for GenRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

/// Seed for the step at `index` when the step does not fix its own.
pub fn derive_step_seed(master: u64, index: usize) -> u64 {
    master ^ (index as u64 + 1).wrapping_mul(SEED_MIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rn2_bounds() {
        let mut rng = GenRng::new(42);
        for _ in 0..1000 {
            assert!(rng.rn2(10) < 10);
        }
    }

    #[test]
    fn test_range_inclusive_bounds() {
        let mut rng = GenRng::new(42);
        for _ in 0..1000 {
            let n = rng.range_inclusive(-3, 4);
            assert!((-3..=4).contains(&n));
        }
        assert_eq!(rng.range_inclusive(5, 2), 5);
    }

    #[test]
    fn test_chance_edges() {
        let mut rng = GenRng::new(7);
        for _ in 0..100 {
            assert!(!rng.chance(0.0));
            assert!(rng.chance(1.0));
        }
    }

    #[test]
    fn test_reproducibility() {
        let mut rng1 = GenRng::new(42);
        let mut rng2 = GenRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.rn2(100), rng2.rn2(100));
            assert_eq!(rng1.next_f64(), rng2.next_f64());
        }
    }

    #[test]
    fn test_shuffle_is_permutation() {
        let mut rng = GenRng::new(3);
        let mut items: Vec<u32> = (0..50).collect();
        rng.shuffle(&mut items);
        let mut sorted = items.clone();
        sorted.sort();
        assert_eq!(sorted, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_zero_inputs() {
        let mut rng = GenRng::new(42);
        assert_eq!(rng.rn2(0), 0);
        assert_eq!(rng.index(0), 0);
        assert!(rng.choose::<u8>(&[]).is_none());
    }

    #[test]
    fn test_serde_keeps_seed() {
        let rng = GenRng::new(99);
        let json = serde_json::to_string(&rng).unwrap();
        let back: GenRng = serde_json::from_str(&json).unwrap();
        assert_eq!(back.seed(), 99);
    }

    #[test]
    fn test_step_seeds_differ() {
        assert_ne!(derive_step_seed(1, 0), derive_step_seed(1, 1));
        assert_eq!(derive_step_seed(9, 3), derive_step_seed(9, 3));
    }
}
