//! # GeneticAlgorithm
//!
//! The single-population evolutionary loop. Each generation is evaluated
//! once, checked against the termination policy, and then replaced through
//! selection, crossover, and mutation. The loop is strictly sequential
//! within a run; parallelism lives one level up, in the island-model driver.

use tracing::{debug, trace};

use super::options::EvolutionOptions;
use crate::chromosome::Chromosome;
use crate::error::{EvolutionError, Result};
use crate::rng::RandomNumberGenerator;

/// Why an evolutionary run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TerminationReason {
    /// At least one individual reached the fitness threshold.
    ThresholdReached,
    /// The generation budget ran out first.
    GenerationsExhausted,
}

/// Runs one population through successive generations until an individual
/// reaches the fitness threshold or the generation budget is exhausted.
///
/// The algorithm exclusively owns its population for the lifetime of the
/// run; [`run`](GeneticAlgorithm::run) and
/// [`run_fittest`](GeneticAlgorithm::run_fittest) consume the instance and
/// hand the terminal result back to the caller.
///
/// # Examples
///
/// ```rust
/// use evofolio::chromosome::Chromosome;
/// use evofolio::error::Result;
/// use evofolio::evolution::{EvolutionOptions, GeneticAlgorithm};
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
/// let population = vec![Knob { value: 0.4 }, Knob { value: 0.9 }];
/// let options = EvolutionOptions::builder()
///     .threshold(0.5)
///     .max_generations(10)
///     .build()?;
///
/// let mut rng = RandomNumberGenerator::from_seed(42);
/// let survivors = GeneticAlgorithm::new(population, options)?.run(&mut rng)?;
///
/// // 0.9 already satisfies the threshold, so the run stops at generation 0.
/// assert_eq!(survivors.len(), 1);
/// # Ok::<(), evofolio::error::EvolutionError>(())
/// ```
#[derive(Debug, Clone)]
pub struct GeneticAlgorithm<C: Chromosome> {
    population: Vec<C>,
    options: EvolutionOptions,
    generation: usize,
}

impl<C: Chromosome> GeneticAlgorithm<C> {
    /// Creates a new run over `initial_population`.
    ///
    /// # Errors
    ///
    /// Returns [`EvolutionError::EmptyPopulation`] when the initial
    /// population is empty. The options themselves were validated when they
    /// were built.
    pub fn new(initial_population: Vec<C>, options: EvolutionOptions) -> Result<Self> {
        if initial_population.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }

        Ok(Self {
            population: initial_population,
            options,
            generation: 0,
        })
    }

    /// The number of completed evolutionary cycles.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// The current population.
    pub fn population(&self) -> &[C] {
        &self.population
    }

    /// Runs the population to termination and returns the surviving
    /// population.
    ///
    /// When the fitness threshold is reached, the result is the
    /// sub-population meeting or exceeding it. When the generation budget is
    /// exhausted first, the result is the full final population — this is
    /// the mode the island-model driver consumes, so that every island
    /// contributes seed material for a later refinement pass.
    ///
    /// # Errors
    ///
    /// Propagates any fitness-evaluation or selection failure; the run
    /// terminates at the first such error.
    pub fn run(mut self, rng: &mut RandomNumberGenerator) -> Result<Vec<C>> {
        let (fitness, reason) = self.evolve(rng)?;

        match reason {
            TerminationReason::ThresholdReached => {
                let threshold = self.options.get_threshold();
                Ok(self
                    .population
                    .into_iter()
                    .zip(fitness)
                    .filter(|(_, score)| *score >= threshold)
                    .map(|(individual, _)| individual)
                    .collect())
            }
            TerminationReason::GenerationsExhausted => Ok(self.population),
        }
    }

    /// Runs the population to termination and returns only the fittest
    /// individual.
    ///
    /// Ties at the maximal fitness resolve to the first occurrence in
    /// population order. This is the refinement-pass mode: whatever the
    /// termination reason, the caller always receives one usable result.
    ///
    /// # Errors
    ///
    /// Propagates any fitness-evaluation or selection failure.
    pub fn run_fittest(mut self, rng: &mut RandomNumberGenerator) -> Result<C> {
        let (fitness, _) = self.evolve(rng)?;
        let best = best_index(&fitness);
        Ok(self.population.swap_remove(best))
    }

    /// Drives the loop until the termination policy fires, returning the
    /// final generation's fitness values and the reason for stopping.
    fn evolve(
        &mut self,
        rng: &mut RandomNumberGenerator,
    ) -> Result<(Vec<f64>, TerminationReason)> {
        loop {
            let fitness = self.evaluate()?;
            let best = best_index(&fitness);
            trace!(
                generation = self.generation,
                best_fitness = fitness[best],
                "generation evaluated"
            );

            if fitness
                .iter()
                .any(|&score| score >= self.options.get_threshold())
            {
                debug!(
                    generation = self.generation,
                    best_fitness = fitness[best],
                    "fitness threshold reached"
                );
                return Ok((fitness, TerminationReason::ThresholdReached));
            }

            if self.generation >= self.options.get_max_generations() {
                debug!(
                    generation = self.generation,
                    best_fitness = fitness[best],
                    "generation budget exhausted"
                );
                return Ok((fitness, TerminationReason::GenerationsExhausted));
            }

            self.next_generation(&fitness, rng)?;
        }
    }

    /// Computes the fitness of every individual exactly once for this
    /// generation.
    fn evaluate(&self) -> Result<Vec<f64>> {
        let mut fitness = Vec::with_capacity(self.population.len());
        for individual in &self.population {
            let score = individual.fitness()?;
            if !score.is_finite() {
                return Err(EvolutionError::FitnessEvaluation(format!(
                    "Non-finite fitness score encountered: {}",
                    score
                )));
            }
            fitness.push(score);
        }
        Ok(fitness)
    }

    /// Produces the replacement population: select parent pairs, cross them
    /// over with the configured probability (independent copies otherwise),
    /// then mutate each new individual with the configured probability.
    fn next_generation(
        &mut self,
        fitness: &[f64],
        rng: &mut RandomNumberGenerator,
    ) -> Result<()> {
        let size = self.population.len();
        let selection = self.options.get_selection();
        let mut next = Vec::with_capacity(size);

        while next.len() < size {
            let first_parent = selection.select_parent(fitness, rng)?;
            let second_parent = selection.select_parent(fitness, rng)?;

            let (first_child, second_child) = if rng.chance(self.options.get_crossover_chance())
            {
                self.population[first_parent].crossover(&self.population[second_parent], rng)
            } else {
                (
                    self.population[first_parent].clone(),
                    self.population[second_parent].clone(),
                )
            };

            next.push(first_child);
            if next.len() < size {
                next.push(second_child);
            }
        }

        for individual in &mut next {
            if rng.chance(self.options.get_mutation_chance()) {
                individual.mutate(rng);
            }
        }

        self.population = next;
        self.generation += 1;
        Ok(())
    }
}

/// Index of the maximal fitness value, first occurrence on ties.
fn best_index(fitness: &[f64]) -> usize {
    let mut best = 0;
    for (idx, &score) in fitness.iter().enumerate().skip(1) {
        if score > fitness[best] {
            best = idx;
        }
    }
    best
}
