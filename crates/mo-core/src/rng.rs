//! Random number service
//!
//! Uses a seeded ChaCha RNG for reproducibility. Every random decision in the
//! generator, the creature engine and the turn loop goes through [`GameRng`].

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Game random number generator
///
/// Wraps ChaCha8Rng. Only the seed is serialized; a restored RNG restarts the
/// stream from that seed.
#[derive(Debug, Clone)]
pub struct GameRng {
    rng: ChaCha8Rng,
    seed: u64,
}

// Custom serialization - only serialize seed, recreate RNG on deserialize
impl Serialize for GameRng {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.seed.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GameRng {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let seed = u64::deserialize(deserializer)?;
        Ok(GameRng::new(seed))
    }
}

impl GameRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create a new RNG with a random seed
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// Get the seed used to create this RNG
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform draw in `1..=max_value`
    ///
    /// Returns 0 if `max_value` is not positive.
    pub fn randint(&mut self, max_value: i32) -> i32 {
        if max_value <= 0 {
            return 0;
        }
        self.rng.gen_range(1..=max_value)
    }

    /// Approximately normal draw with the given mean and standard deviation
    pub fn randnor(&mut self, mean: i32, stand: i32) -> i32 {
        // Box-Muller; u1 is kept away from zero so ln stays finite
        let u1: f64 = self.rng.gen_range(f64::EPSILON..1.0);
        let u2: f64 = self.rng.r#gen();
        let z = (-2.0 * u1.ln()).sqrt() * (core::f64::consts::TAU * u2).cos();
        mean + (z * f64::from(stand)).round() as i32
    }

    /// Roll `num` dice with `sides` sides
    pub fn damroll(&mut self, num: i32, sides: i32) -> i32 {
        (0..num.max(0)).map(|_| self.randint(sides)).sum()
    }

    /// Returns true with probability 1/n
    pub fn one_in(&mut self, n: i32) -> bool {
        self.randint(n) == 1
    }

    /// Choose a random element from a slice
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            Some(&items[(self.randint(items.len() as i32) - 1) as usize])
        }
    }

    /// Shuffle a slice in place
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = (self.randint(i as i32 + 1) - 1) as usize;
            items.swap(i, j);
        }
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_randint_bounds() {
        let mut rng = GameRng::new(42);
        for _ in 0..1000 {
            let n = rng.randint(10);
            assert!((1..=10).contains(&n));
        }
    }

    #[test]
    fn test_randint_non_positive() {
        let mut rng = GameRng::new(42);
        assert_eq!(rng.randint(0), 0);
        assert_eq!(rng.randint(-3), 0);
    }

    #[test]
    fn test_randint_one() {
        let mut rng = GameRng::new(7);
        for _ in 0..50 {
            assert_eq!(rng.randint(1), 1);
        }
    }

    #[test]
    fn test_damroll_bounds() {
        let mut rng = GameRng::new(42);
        for _ in 0..1000 {
            let n = rng.damroll(3, 6);
            assert!((3..=18).contains(&n));
        }
        assert_eq!(rng.damroll(0, 6), 0);
    }

    #[test]
    fn test_randnor_centered() {
        let mut rng = GameRng::new(1234);
        let samples = 4000;
        let total: i64 = (0..samples).map(|_| i64::from(rng.randnor(32, 2))).sum();
        let mean = total as f64 / samples as f64;
        assert!((mean - 32.0).abs() < 0.5, "mean was {mean}");
    }

    #[test]
    fn test_reproducibility() {
        let mut a = GameRng::new(12345);
        let mut b = GameRng::new(12345);
        for _ in 0..100 {
            assert_eq!(a.randint(1000), b.randint(1000));
        }
    }

    #[test]
    fn test_shuffle_keeps_elements() {
        let mut rng = GameRng::new(42);
        let mut items = vec![1, 2, 3, 4, 5, 6];
        rng.shuffle(&mut items);
        items.sort();
        assert_eq!(items, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_serde_keeps_seed() {
        let rng = GameRng::new(99);
        let json = serde_json::to_string(&rng).unwrap();
        let back: GameRng = serde_json::from_str(&json).unwrap();
        assert_eq!(back.seed(), 99);
    }
}
