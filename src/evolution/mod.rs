pub mod genetic;
pub mod island;
pub mod options;

pub use genetic::GeneticAlgorithm;
pub use island::IslandModel;
pub use options::{EvolutionOptions, EvolutionOptionsBuilder};
