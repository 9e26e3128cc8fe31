pub mod caching;
pub mod chromosome;
pub mod error;
pub mod evolution;
pub mod market;
pub mod portfolio;
pub mod rng;
pub mod selection;

// Re-export commonly used types for convenience
pub use error::{EvolutionError, Result, ResultExt};
