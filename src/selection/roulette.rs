use crate::error::{EvolutionError, Result};
use crate::rng::RandomNumberGenerator;

/// A selection strategy that picks parents through roulette-wheel selection.
///
/// Roulette-wheel selection (fitness-proportionate selection) picks each
/// parent with probability proportional to its fitness. Because portfolio
/// fitness scores are routinely negative (a losing wallet has a negative
/// risk-adjusted return), the wheel first shifts every fitness value by the
/// population minimum plus a small epsilon, so that every individual keeps a
/// positive, finite slice of the wheel.
///
/// # Examples
///
/// ```
/// use evofolio::selection::RouletteWheelSelection;
/// use evofolio::rng::RandomNumberGenerator;
///
/// let fitness = vec![-0.5, 0.8, 0.3];
/// let mut rng = RandomNumberGenerator::from_seed(42);
///
/// let selection = RouletteWheelSelection::new();
/// let parent = selection.select_parent(&fitness, &mut rng).unwrap();
///
/// assert!(parent < fitness.len());
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Default)]
pub struct RouletteWheelSelection;

impl RouletteWheelSelection {
    /// Keeps the slice of the least-fit individual strictly positive after
    /// the shift.
    const EPSILON: f64 = 1e-9;

    /// Creates a new RouletteWheelSelection strategy.
    pub fn new() -> Self {
        Self
    }

    /// Calculates cumulative selection probabilities for each individual.
    ///
    /// Fitness values at or below zero are handled by shifting the whole
    /// population by its minimum plus [`Self::EPSILON`] before normalizing.
    fn cumulative_probabilities(&self, fitness: &[f64]) -> Result<Vec<f64>> {
        let min = fitness.iter().cloned().fold(f64::INFINITY, f64::min);
        if !min.is_finite() {
            return Err(EvolutionError::FitnessEvaluation(
                "Roulette wheel selection requires finite fitness values".to_string(),
            ));
        }

        let shift = if min <= 0.0 { -min + Self::EPSILON } else { 0.0 };
        let total: f64 = fitness.iter().map(|&f| f + shift).sum();

        let mut probs = Vec::with_capacity(fitness.len());
        let mut cumulative = 0.0;
        for &f in fitness {
            cumulative += (f + shift) / total;
            probs.push(cumulative);
        }

        // Pin the last slot to exactly 1.0 to absorb floating-point drift.
        if let Some(last) = probs.last_mut() {
            *last = 1.0;
        }

        Ok(probs)
    }

    /// Spins the wheel once and returns the index it lands on.
    fn spin(
        &self,
        cumulative_probs: &[f64],
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        let uniform = rng.fetch_uniform(0.0, 1.0, 1);
        let r = match uniform.front() {
            Some(val) => *val as f64,
            None => {
                return Err(EvolutionError::RandomGeneration(
                    "Failed to generate random value for roulette wheel selection".to_string(),
                ))
            }
        };

        for (i, &prob) in cumulative_probs.iter().enumerate() {
            if r <= prob {
                return Ok(i);
            }
        }

        // Only reachable through floating-point rounding; the wheel ends at
        // the last individual.
        Ok(cumulative_probs.len() - 1)
    }

    /// Selects one parent index, weighted by fitness.
    ///
    /// # Errors
    ///
    /// Returns an error if `fitness` is empty, contains non-finite values,
    /// or a random draw fails.
    pub fn select_parent(
        &self,
        fitness: &[f64],
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        if fitness.is_empty() {
            return Err(EvolutionError::EmptyPopulation);
        }

        let cumulative_probs = self.cumulative_probabilities(fitness)?;
        self.spin(&cumulative_probs, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_population_is_rejected() {
        let selection = RouletteWheelSelection::new();
        let mut rng = RandomNumberGenerator::from_seed(42);

        let result = selection.select_parent(&[], &mut rng);
        assert!(matches!(result, Err(EvolutionError::EmptyPopulation)));
    }

    #[test]
    fn test_negative_fitness_keeps_every_slice_positive() {
        let fitness = vec![-2.0, -1.0, -3.0];
        let selection = RouletteWheelSelection::new();

        let probs = selection.cumulative_probabilities(&fitness).unwrap();

        assert_eq!(probs.len(), 3);
        assert!(probs[0] > 0.0);
        assert!(probs[0] < probs[1]);
        assert!(probs[1] < probs[2]);
        assert_eq!(probs[2], 1.0);
    }

    #[test]
    fn test_uniform_fitness_spreads_the_wheel_evenly() {
        let fitness = vec![0.0, 0.0, 0.0, 0.0];
        let selection = RouletteWheelSelection::new();

        let probs = selection.cumulative_probabilities(&fitness).unwrap();

        assert!((probs[0] - 0.25).abs() < 1e-6);
        assert!((probs[1] - 0.5).abs() < 1e-6);
        assert!((probs[2] - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_fitter_individuals_are_selected_more_often() {
        let fitness = vec![0.1, 10.0];
        let selection = RouletteWheelSelection::new();
        let mut rng = RandomNumberGenerator::from_seed(42);

        let mut counts = [0usize; 2];
        for _ in 0..500 {
            let idx = selection.select_parent(&fitness, &mut rng).unwrap();
            counts[idx] += 1;
        }

        assert!(counts[1] > counts[0]);
    }

    #[test]
    fn test_non_finite_fitness_is_rejected() {
        let fitness = vec![0.5, f64::NEG_INFINITY];
        let selection = RouletteWheelSelection::new();
        let mut rng = RandomNumberGenerator::from_seed(42);

        let result = selection.select_parent(&fitness, &mut rng);
        assert!(matches!(result, Err(EvolutionError::FitnessEvaluation(_))));
    }
}
