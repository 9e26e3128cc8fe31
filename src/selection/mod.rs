//! # Selection Strategies
//!
//! Parent-selection policies for the genetic algorithm. The engine picks a
//! strategy by configuration: [`SelectionStrategy`] is an enumerated tag
//! resolved when the run configuration is built, not a per-call virtual
//! dispatch. Each invocation selects exactly one parent, weighted by the
//! population's fitness values.

pub mod roulette;
pub mod tournament;

pub use roulette::RouletteWheelSelection;
pub use tournament::TournamentSelection;

use crate::error::Result;
use crate::rng::RandomNumberGenerator;

/// The parent-selection policy of a run.
///
/// Defaults to tournament selection, which tolerates negative and
/// non-normalized fitness values without preprocessing.
///
/// # Examples
///
/// ```
/// use evofolio::selection::{SelectionStrategy, TournamentSelection};
/// use evofolio::rng::RandomNumberGenerator;
///
/// let strategy = SelectionStrategy::Tournament(TournamentSelection::new(4)?);
/// let mut rng = RandomNumberGenerator::from_seed(42);
///
/// let parent = strategy.select_parent(&[0.2, 0.9, 0.4], &mut rng)?;
/// assert!(parent < 3);
/// # Ok::<(), evofolio::error::EvolutionError>(())
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone)]
pub enum SelectionStrategy {
    /// Best-of-k among uniformly drawn individuals.
    Tournament(TournamentSelection),
    /// Fitness-proportionate selection with a minimum-shift for non-positive
    /// fitness values.
    RouletteWheel(RouletteWheelSelection),
}

impl SelectionStrategy {
    /// Selects the index of one parent from the population's fitness values.
    ///
    /// # Errors
    ///
    /// Returns an error if `fitness` is empty or the underlying strategy
    /// cannot complete its draw.
    pub fn select_parent(
        &self,
        fitness: &[f64],
        rng: &mut RandomNumberGenerator,
    ) -> Result<usize> {
        match self {
            Self::Tournament(tournament) => tournament.select_parent(fitness, rng),
            Self::RouletteWheel(roulette) => roulette.select_parent(fitness, rng),
        }
    }
}

impl Default for SelectionStrategy {
    fn default() -> Self {
        Self::Tournament(TournamentSelection::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_tournament() {
        assert!(matches!(
            SelectionStrategy::default(),
            SelectionStrategy::Tournament(_)
        ));
    }

    #[test]
    fn test_dispatch_reaches_both_strategies() {
        let fitness = vec![0.2, 0.9, 0.4];
        let mut rng = RandomNumberGenerator::from_seed(42);

        for strategy in [
            SelectionStrategy::default(),
            SelectionStrategy::RouletteWheel(RouletteWheelSelection::new()),
        ] {
            let parent = strategy.select_parent(&fitness, &mut rng).unwrap();
            assert!(parent < fitness.len());
        }
    }
}
