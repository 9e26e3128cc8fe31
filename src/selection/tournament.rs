use crate::error::{EvolutionError, Result};
use crate::rng::RandomNumberGenerator;

/// A selection strategy that picks parents through tournament selection.
///
/// Each invocation draws `tournament_size` individuals uniformly at random
/// (with replacement) from the population and returns the one with maximal
/// fitness. Larger tournaments increase selection pressure:
/// - a size of 1 degenerates to uniform random selection
/// - larger sizes focus the draw on the fittest individuals
///
/// # Examples
///
/// ```
/// use evofolio::selection::TournamentSelection;
/// use evofolio::rng::RandomNumberGenerator;
///
/// let fitness = vec![0.5, 0.8, 0.3, 0.9, 0.1];
/// let mut rng = RandomNumberGenerator::from_seed(42);
///
/// let selection = TournamentSelection::default();
/// let parent = selection.select_parent(&fitness, &mut rng).unwrap();
///
/// assert!(parent < fitness.len());
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub struct TournamentSelection {
    tournament_size: usize,
}

impl TournamentSelection {
    /// Creates a new TournamentSelection strategy with the specified
    /// tournament size.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `tournament_size` is 0.
    pub fn new(tournament_size: usize) -> Result<Self> {
        if tournament_size < 1 {
            return Err(EvolutionError::Configuration(
                "Tournament size must be at least 1".to_string(),
            ));
        }

        Ok(Self { tournament_size })
    }

    /// The number of individuals drawn into each tournament.
    pub fn tournament_size(&self) -> usize {
        self.tournament_size
    }

    /// Runs one tournament over the fitness values and returns the index of
    /// the winner.
    ///
    /// Participants are drawn with replacement. Ties at the maximal fitness
    /// resolve to the earliest population index, so the outcome is fully
    /// determined by the fitness values and the RNG stream.
    ///
    /// # Errors
    ///
    /// Returns an error if `fitness` is empty or a random draw fails.
    pub fn select_parent(
        &self,
        fitness: &[f64],
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        if fitness.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }

        let population_size = fitness.len();
        let mut participants = Vec::with_capacity(self.tournament_size);
        for _ in 0..self.tournament_size {
            let uniform = rng.fetch_uniform(0.0, population_size as f32, 1);
            let idx = match uniform.front() {
                Some(val) => (*val as usize) % population_size,
                None => {
                    return Err(EvolutionError::RandomGeneration(
                        "Failed to generate random value for tournament selection".to_string(),
                    ))
                }
            };
            participants.push(idx);
        }

        let mut best_idx = participants[0];
        let mut best_fitness = fitness[best_idx];

        for &idx in &participants[1..] {
            let current_fitness = fitness[idx];
            let is_better = current_fitness > best_fitness
                || (current_fitness == best_fitness && idx < best_idx);

            if is_better {
                best_idx = idx;
                best_fitness = current_fitness;
            }
        }

        Ok(best_idx)
    }
}

impl Default for TournamentSelection {
    fn default() -> Self {
        // Safe to unwrap because the default size is valid
        Self::new(3).unwrap()
    }
}
