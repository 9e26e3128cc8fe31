//! # Chromosome Trait
//!
//! The `Chromosome` trait defines the interface for candidate solutions in
//! an evolutionary optimization. It provides methods for fitness evaluation,
//! crossover, and mutation; the engine never inspects a concrete chromosome
//! type, only this contract.
//!
//! ## Example
//!
//! ```rust
//! use evofolio::chromosome::Chromosome;
//! use evofolio::error::Result;
//! use evofolio::rng::RandomNumberGenerator;
//!
//! #[derive(Clone, Debug)]
//! struct Knob {
//!     value: f64,
//! }
//!
//! impl Chromosome for Knob {
//!     fn fitness(&self) -> Result<f64> {
//!         Ok(-(self.value - 3.0).powi(2))
//!     }
//!
//!     fn crossover(&self, other: &Self, _rng: &mut RandomNumberGenerator) -> (Self, Self) {
//!         let mid = (self.value + other.value) / 2.0;
//!         (Knob { value: mid }, Knob { value: mid })
//!     }
//!
//!     fn mutate(&mut self, rng: &mut RandomNumberGenerator) {
//!         let delta = *rng.fetch_uniform(-1.0, 1.0, 1).front().unwrap() as f64;
//!         self.value += delta / 10.0;
//!     }
//! }
//! ```

use std::fmt::Debug;

use crate::error::Result;
use crate::rng::RandomNumberGenerator;

/// Trait for candidate solutions in an evolutionary optimization.
///
/// A population handed to the engine must be homogeneous: every individual
/// of one run is the same concrete type, and any domain collaborator a
/// chromosome needs to score itself (a market-data engine, a fundamentals
/// universe) is closed over by the chromosome at construction time. The
/// collaborator must be read-only: islands of an island-model run evaluate
/// fitness concurrently against the same instance.
///
/// Types implementing this trait must also implement `Clone`, `Debug`,
/// `Send`, and `Sync` to enable parallel island execution and debugging.
pub trait Chromosome: Clone + Debug + Send + Sync {
    /// Scores this candidate. Higher is better.
    ///
    /// The score must be derived from the chromosome's state and its
    /// read-only collaborator only — no genetic side effects — and it must
    /// be total: if the underlying data cannot support evaluation, return an
    /// error rather than a sentinel value. The engine treats any error here
    /// as fatal for the run, and rejects non-finite scores the same way.
    fn fitness(&self) -> Result<f64>;

    /// Recombines this chromosome with `other`, producing exactly two
    /// children.
    ///
    /// Both children must be freshly owned: no mutable state may be aliased
    /// with either parent, so that mutating a child later can never corrupt
    /// a parent still present in the population.
    fn crossover(&self, other: &Self, rng: &mut RandomNumberGenerator) -> (Self, Self);

    /// Perturbs this chromosome in place.
    ///
    /// Implementations must preserve their encoding's invariants (e.g. a
    /// conserved allocation total, no non-positive position). When a random
    /// perturbation would violate them, retry a bounded number of times and
    /// then leave the chromosome unchanged instead of producing an invalid
    /// encoding.
    fn mutate(&mut self, rng: &mut RandomNumberGenerator);
}
