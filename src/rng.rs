//! # RandomNumberGenerator
//!
//! The `RandomNumberGenerator` struct provides a seedable source of
//! randomness for the evolution engine, wrapping the `rand` crate's
//! `StdRng`. Every genetic operator receives one of these explicitly; the
//! engine never touches a global RNG, which is what makes seeded runs
//! reproducible and lets each island of an island-model run own an
//! independent stream.
//!
//! ## Example
//!
//! ```rust
//! use evofolio::rng::RandomNumberGenerator;
//!
//! let mut rng = RandomNumberGenerator::from_seed(42);
//! let random_numbers = rng.fetch_uniform(0.0, 1.0, 5);
//!
//! assert_eq!(random_numbers.len(), 5);
//! ```
//!
//! ## Forking streams
//!
//! ```rust
//! use evofolio::rng::RandomNumberGenerator;
//!
//! let mut driver_rng = RandomNumberGenerator::from_seed(7);
//! // Two independent child streams, derived deterministically.
//! let island_a = driver_rng.fork();
//! let island_b = driver_rng.fork();
//! ```

use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::VecDeque;

/// A wrapper around the `rand` crate's `StdRng` that provides the random
/// draws used by selection, crossover, and mutation.
#[derive(Clone, Debug)]
pub struct RandomNumberGenerator {
    pub rng: StdRng,
}

impl RandomNumberGenerator {
    /// Creates a new `RandomNumberGenerator` instance seeded from the system entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a new `RandomNumberGenerator` instance with a specific seed.
    ///
    /// This is what makes reproducible runs possible: two engines built from
    /// the same seed and the same inputs walk through identical populations.
    ///
    /// # Arguments
    ///
    /// * `seed` - The seed to use for the random number generator.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Derives an independent child generator from this one.
    ///
    /// The child is seeded from the parent's stream, so forking is itself
    /// deterministic: a seeded driver always hands the same sequence of
    /// streams to its islands. Draws from the child do not advance the
    /// parent.
    pub fn fork(&mut self) -> Self {
        Self::from_seed(self.rng.gen())
    }

    /// Generates a specified number of random floating-point numbers within the given range.
    ///
    /// # Parameters
    ///
    /// - `from`: The lower bound of the range (inclusive).
    /// - `to`: The upper bound of the range (exclusive).
    /// - `num`: The number of random numbers to generate.
    ///
    /// # Returns
    ///
    /// A `VecDeque` containing the generated random numbers.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use evofolio::rng::RandomNumberGenerator;
    ///
    /// let mut rng = RandomNumberGenerator::new();
    /// for number in rng.fetch_uniform(0.0, 1.0, 5) {
    ///     assert!((0.0..1.0).contains(&number));
    /// }
    /// ```
    pub fn fetch_uniform(&mut self, from: f32, to: f32, num: usize) -> VecDeque<f32> {
        let mut uniform_numbers = VecDeque::new();
        uniform_numbers.extend((0..num).map(|_| self.rng.gen_range(from..to)));
        uniform_numbers
    }

    /// Draws a single Bernoulli trial.
    ///
    /// `probability` must lie in `[0, 1]`; run configurations are validated
    /// at construction, so the engine never passes anything else.
    pub fn chance(&mut self, probability: f64) -> bool {
        self.rng.gen_bool(probability)
    }
}

impl Default for RandomNumberGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_uniform_with_positive_range() {
        let mut rng = RandomNumberGenerator::new();
        let result = rng.fetch_uniform(0.0, 1.0, 5);

        assert_eq!(result.len(), 5);

        for &num in result.iter() {
            assert!((0.0..1.0).contains(&num));
        }
    }

    #[test]
    fn test_fetch_uniform_with_negative_range() {
        let mut rng = RandomNumberGenerator::new();
        let result = rng.fetch_uniform(-1.0, 1.0, 3);

        assert_eq!(result.len(), 3);

        for &num in result.iter() {
            assert!((-1.0..1.0).contains(&num));
        }
    }

    #[test]
    fn test_fetch_uniform_with_empty_result() {
        let mut rng = RandomNumberGenerator::new();
        let result = rng.fetch_uniform(1.0, 2.0, 0);

        assert!(result.is_empty());
    }

    #[test]
    fn test_seeded_generators_agree() {
        let mut rng1 = RandomNumberGenerator::from_seed(42);
        let mut rng2 = RandomNumberGenerator::from_seed(42);

        let nums1 = rng1.fetch_uniform(0.0, 1.0, 5);
        let nums2 = rng2.fetch_uniform(0.0, 1.0, 5);

        assert_eq!(nums1, nums2);
    }

    #[test]
    fn test_fork_is_deterministic() {
        let mut parent1 = RandomNumberGenerator::from_seed(7);
        let mut parent2 = RandomNumberGenerator::from_seed(7);

        let mut child1 = parent1.fork();
        let mut child2 = parent2.fork();

        assert_eq!(
            child1.fetch_uniform(0.0, 1.0, 4),
            child2.fetch_uniform(0.0, 1.0, 4)
        );
    }

    #[test]
    fn test_forked_children_diverge() {
        let mut parent = RandomNumberGenerator::from_seed(7);

        let mut first = parent.fork();
        let mut second = parent.fork();

        // Successive forks are seeded from different points of the parent
        // stream.
        assert_ne!(
            first.fetch_uniform(0.0, 1.0, 8),
            second.fetch_uniform(0.0, 1.0, 8)
        );
    }

    #[test]
    fn test_chance_extremes() {
        let mut rng = RandomNumberGenerator::from_seed(1);
        assert!(rng.chance(1.0));
        assert!(!rng.chance(0.0));
    }
}
