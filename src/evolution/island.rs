//! # IslandModel
//!
//! The parallel driver for multi-population runs. The initial population is
//! split into disjoint contiguous islands, each island runs a full
//! [`GeneticAlgorithm`] to its own termination on its own worker thread and
//! its own RNG stream, and the merge barrier concatenates the terminal
//! populations in island order. Islands share nothing and never exchange
//! individuals mid-run; the design trades migration-based diversity for
//! embarrassingly-parallel throughput.

use rayon::prelude::*;
use tracing::debug;

use super::genetic::GeneticAlgorithm;
use super::options::EvolutionOptions;
use crate::chromosome::Chromosome;
use crate::error::{EvolutionError, Result, ResultExt};
use crate::rng::RandomNumberGenerator;

/// Partitions an initial population into isolated sub-populations, evolves
/// them concurrently, and merges their terminal results.
///
/// # Examples
///
/// ```rust
/// use evofolio::chromosome::Chromosome;
/// use evofolio::error::Result;
/// use evofolio::evolution::{EvolutionOptions, IslandModel};
/// use evofolio::rng::RandomNumberGenerator;
///
/// #[derive(Clone, Debug)]
/// struct Knob {
///     value: f64,
/// }
///
/// impl Chromosome for Knob {
///     fn fitness(&self) -> Result<f64> {
///         Ok(self.value)
///     }
///
///     fn crossover(&self, other: &Self, _rng: &mut RandomNumberGenerator) -> (Self, Self) {
///         let mid = (self.value + other.value) / 2.0;
///         (Knob { value: mid }, Knob { value: mid })
///     }
///
///     fn mutate(&mut self, rng: &mut RandomNumberGenerator) {
///         self.value += *rng.fetch_uniform(0.0, 0.1, 1).front().unwrap() as f64;
///     }
/// }
///
/// let population: Vec<Knob> = (0..20).map(|i| Knob { value: i as f64 / 20.0 }).collect();
/// let options = EvolutionOptions::builder().max_generations(5).build()?;
///
/// let mut rng = RandomNumberGenerator::from_seed(42);
/// let merged = IslandModel::new(population, 4, options)?.run(&mut rng)?;
///
/// // Generation exhaustion conserves every island's population size.
/// assert_eq!(merged.len(), 20);
/// # Ok::<(), evofolio::error::EvolutionError>(())
/// ```
#[derive(Debug, Clone)]
pub struct IslandModel<C: Chromosome> {
    population: Vec<C>,
    islands_number: usize,
    options: EvolutionOptions,
}

impl<C: Chromosome> IslandModel<C> {
    /// Creates a new island-model run over `initial_population`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `islands_number` is zero or
    /// exceeds the population size (an island must hold at least one
    /// individual), and [`EvolutionError::EmptyPopulation`] when the initial
    /// population is empty.
    pub fn new(
        initial_population: Vec<C>,
        islands_number: usize,
        options: EvolutionOptions,
    ) -> Result<Self> {
        if initial_population.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }

        if islands_number < 1 {
            return Err(EvolutionError::Configuration(
                "Islands number must be at least 1".to_string(),
            ));
        }

        if islands_number > initial_population.len() {
            return Err(EvolutionError::Configuration(format!(
                "Cannot split {} individuals across {} islands",
                initial_population.len(),
                islands_number
            )));
        }

        Ok(Self {
            population: initial_population,
            islands_number,
            options,
        })
    }

    /// Evolves every island to completion and returns the merged terminal
    /// populations, concatenated in island order.
    ///
    /// Each island receives a clone of the run configuration and an RNG
    /// stream forked from `rng` before dispatch, so a seeded driver is fully
    /// reproducible. The call blocks until every island has finished; there
    /// is no per-island timeout and no way to observe partial results.
    ///
    /// # Errors
    ///
    /// If an island fails, its error is wrapped in
    /// [`EvolutionError::Island`] naming the island index, and is returned
    /// only after all islands have run — a failed island never silently
    /// drops out of the merge.
    pub fn run(self, rng: &mut RandomNumberGenerator) -> Result<Vec<C>> {
        let options = self.options;
        let islands_number = self.islands_number;

        let islands: Vec<(usize, Vec<C>, RandomNumberGenerator)> =
            partition(self.population, islands_number)
                .into_iter()
                .enumerate()
                .map(|(island, sub_population)| (island, sub_population, rng.fork()))
                .collect();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(islands_number)
            .build()
            .context("Failed to build island worker pool")?;

        let results: Vec<Result<Vec<C>>> = pool.install(|| {
            islands
                .into_par_iter()
                .map(|(island, sub_population, mut island_rng)| {
                    debug!(island, size = sub_population.len(), "island dispatched");
                    let terminal = GeneticAlgorithm::new(sub_population, options.clone())
                        .and_then(|algorithm| algorithm.run(&mut island_rng))
                        .map_err(|source| EvolutionError::Island {
                            island,
                            source: Box::new(source),
                        })?;
                    debug!(island, size = terminal.len(), "island finished");
                    Ok(terminal)
                })
                .collect()
        });

        // Merge barrier: every island has terminated by now. Concatenate in
        // island order, surfacing the first failure instead of returning a
        // partial merge.
        let mut merged = Vec::new();
        for result in results {
            merged.extend(result?);
        }

        Ok(merged)
    }
}

/// Splits a population into `islands_number` contiguous, order-preserving
/// slices. When the size is not evenly divisible, earlier islands carry one
/// more individual than later ones; no individual is duplicated or dropped.
fn partition<C>(mut population: Vec<C>, islands_number: usize) -> Vec<Vec<C>> {
    let base = population.len() / islands_number;
    let remainder = population.len() % islands_number;

    let mut islands = Vec::with_capacity(islands_number);
    for island in 0..islands_number {
        let take = base + usize::from(island < remainder);
        let tail = population.split_off(take);
        islands.push(std::mem::replace(&mut population, tail));
    }

    islands
}
