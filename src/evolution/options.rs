//! # EvolutionOptions
//!
//! The `EvolutionOptions` struct carries the configuration of one
//! evolutionary run: the fitness threshold that ends it early, the
//! generation budget, the genetic-operator probabilities, and the
//! parent-selection strategy. A configuration is validated when it is built
//! and immutable for the lifetime of the run that receives it.
//!
//! ## Example
//!
//! ```rust
//! use evofolio::evolution::options::EvolutionOptions;
//!
//! let options = EvolutionOptions::builder()
//!     .threshold(1.0)
//!     .max_generations(700)
//!     .mutation_chance(0.1)
//!     .crossover_chance(0.7)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(options.get_max_generations(), 700);
//! ```

use crate::error::{EvolutionError, Result};
use crate::selection::SelectionStrategy;

/// Configuration of a single evolutionary run (or of every island of an
/// island-model run, which clones one configuration per island).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct EvolutionOptions {
    /// Fitness value at or above which the run terminates successfully.
    threshold: f64,
    /// Generation budget; the run stops once the counter reaches it.
    max_generations: usize,
    /// Per-individual probability of mutation, in [0, 1].
    mutation_chance: f64,
    /// Per-pair probability of crossover, in [0, 1].
    crossover_chance: f64,
    /// Parent-selection policy.
    selection: SelectionStrategy,
}

impl EvolutionOptions {
    /// Creates a new `EvolutionOptions` instance, validating every field.
    ///
    /// # Arguments
    ///
    /// * `threshold` - Fitness value at which the run may stop early.
    /// * `max_generations` - Generation budget of the run.
    /// * `mutation_chance` - Per-individual mutation probability, in [0, 1].
    /// * `crossover_chance` - Per-pair crossover probability, in [0, 1].
    /// * `selection` - The parent-selection strategy.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a probability falls outside [0, 1]
    /// or the threshold is NaN. Validation happens here, before any
    /// generation runs.
    pub fn new(
        threshold: f64,
        max_generations: usize,
        mutation_chance: f64,
        crossover_chance: f64,
        selection: SelectionStrategy,
    ) -> Result<Self> {
        if threshold.is_nan() {
            return Err(EvolutionError::Configuration(
                "Threshold cannot be NaN".to_string(),
            ));
        }

        validate_chance("Mutation chance", mutation_chance)?;
        validate_chance("Crossover chance", crossover_chance)?;

        Ok(Self {
            threshold,
            max_generations,
            mutation_chance,
            crossover_chance,
            selection,
        })
    }

    pub fn get_threshold(&self) -> f64 {
        self.threshold
    }

    pub fn get_max_generations(&self) -> usize {
        self.max_generations
    }

    pub fn get_mutation_chance(&self) -> f64 {
        self.mutation_chance
    }

    pub fn get_crossover_chance(&self) -> f64 {
        self.crossover_chance
    }

    pub fn get_selection(&self) -> &SelectionStrategy {
        &self.selection
    }

    /// Returns a builder for creating an `EvolutionOptions` instance.
    pub fn builder() -> EvolutionOptionsBuilder {
        EvolutionOptionsBuilder::default()
    }
}

fn validate_chance(name: &str, chance: f64) -> Result<()> {
    if !chance.is_finite() || !(0.0..=1.0).contains(&chance) {
        return Err(EvolutionError::Configuration(format!(
            "{} must lie in [0, 1], got {}",
            name, chance
        )));
    }
    Ok(())
}

/// Builder for `EvolutionOptions`.
///
/// Provides a fluent interface for constructing `EvolutionOptions`
/// instances. Unset fields fall back to their defaults: an unreachable
/// threshold (the run spends its whole generation budget), 100 generations,
/// 1% mutation, 70% crossover, and tournament selection.
#[derive(Debug, Clone, Default)]
pub struct EvolutionOptionsBuilder {
    threshold: Option<f64>,
    max_generations: Option<usize>,
    mutation_chance: Option<f64>,
    crossover_chance: Option<f64>,
    selection: Option<SelectionStrategy>,
}

impl EvolutionOptionsBuilder {
    /// Sets the early-termination fitness threshold.
    pub fn threshold(mut self, value: f64) -> Self {
        self.threshold = Some(value);
        self
    }

    /// Sets the generation budget.
    pub fn max_generations(mut self, value: usize) -> Self {
        self.max_generations = Some(value);
        self
    }

    /// Sets the per-individual mutation probability.
    pub fn mutation_chance(mut self, value: f64) -> Self {
        self.mutation_chance = Some(value);
        self
    }

    /// Sets the per-pair crossover probability.
    pub fn crossover_chance(mut self, value: f64) -> Self {
        self.crossover_chance = Some(value);
        self
    }

    /// Sets the parent-selection strategy.
    pub fn selection(mut self, value: SelectionStrategy) -> Self {
        self.selection = Some(value);
        self
    }

    /// Builds the `EvolutionOptions` instance.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when a provided probability falls
    /// outside [0, 1] or the threshold is NaN.
    pub fn build(self) -> Result<EvolutionOptions> {
        EvolutionOptions::new(
            self.threshold.unwrap_or(f64::INFINITY),
            self.max_generations.unwrap_or(100),
            self.mutation_chance.unwrap_or(0.01),
            self.crossover_chance.unwrap_or(0.7),
            self.selection.unwrap_or_default(),
        )
    }
}
