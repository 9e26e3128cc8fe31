//! # Error Types
//!
//! This module defines the error taxonomy for the evolution engine. The
//! variants keep the three failure classes apart: invalid configuration
//! (rejected before any generation runs), fitness-evaluation failures
//! (fatal for the run that hit them), and market-data unavailability
//! reported by a domain collaborator.
//!
//! ## Examples
//!
//! Using the `Result` type:
//!
//! ```rust
//! use evofolio::error::{EvolutionError, Result};
//!
//! fn validate_chance(chance: f64) -> Result<f64> {
//!     if !(0.0..=1.0).contains(&chance) {
//!         return Err(EvolutionError::Configuration(format!(
//!             "chance must lie in [0, 1], got {}",
//!             chance
//!         )));
//!     }
//!     Ok(chance)
//! }
//!
//! assert!(validate_chance(1.5).is_err());
//! ```
//!
//! Using the `ResultExt` trait to add context to foreign errors:
//!
//! ```rust
//! use evofolio::error::{Result, ResultExt};
//!
//! fn parse_amount(raw: &str) -> Result<u32> {
//!     raw.parse::<u32>().context("Failed to parse position amount")
//! }
//!
//! assert!(parse_amount("12").is_ok());
//! assert!(parse_amount("twelve").is_err());
//! ```

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Represents errors that can occur while configuring or running an
/// evolutionary optimization.
///
/// The variants deliberately separate "bad configuration" from "evaluation
/// failure" from "collaborator failure" so that callers can react to each
/// class differently.
#[derive(Error, Debug)]
pub enum EvolutionError {
    /// Error that occurs when an invalid configuration is provided.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error that occurs when an empty population is encountered.
    #[error("Empty population error: cannot evolve an empty population")]
    EmptyPopulation,

    /// Error that occurs when a chromosome cannot be scored. Propagated
    /// rather than substituted with a default, since ranking an unevaluable
    /// individual would corrupt selection pressure.
    #[error("Fitness evaluation error: {0}")]
    FitnessEvaluation(String),

    /// Error that occurs when a market-data collaborator cannot produce a
    /// value (e.g. an unknown ticker or a series too short to evaluate).
    #[error("Market data unavailable: {0}")]
    DataUnavailable(String),

    /// Error that occurs when random number generation fails.
    #[error("Random generation error: {0}")]
    RandomGeneration(String),

    /// Error raised by one island of an island-model run. The island index
    /// identifies which sub-population failed; the remaining islands are
    /// still driven to completion before this surfaces.
    #[error("Island {island} failed: {source}")]
    Island {
        island: usize,
        #[source]
        source: Box<EvolutionError>,
    },

    /// A generic error with a custom message.
    #[error("{0}")]
    Other(String),
}

/// A specialized Result type for evolution-engine operations.
pub type Result<T> = std::result::Result<T, EvolutionError>;

/// Extension trait for Result to add context to errors.
///
/// This provides a convenient way to fold a foreign error into an
/// [`EvolutionError`] while keeping the original message.
///
/// ## Examples
///
/// ```rust
/// use evofolio::error::ResultExt;
///
/// fn parse(raw: &str) -> evofolio::error::Result<f64> {
///     raw.parse::<f64>().context("Failed to parse risk-free rate")
/// }
/// ```
pub trait ResultExt<T, E> {
    /// Adds context to an error, converting it to an [`EvolutionError`].
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| EvolutionError::Other(format!("{}: {}", context, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_island_error_names_failed_island() {
        let err = EvolutionError::Island {
            island: 3,
            source: Box::new(EvolutionError::EmptyPopulation),
        };
        assert!(err.to_string().contains("Island 3"));
    }

    #[test]
    fn test_context_wraps_foreign_error() {
        let parsed: std::result::Result<u32, _> = "nope".parse::<u32>();
        let err = parsed.context("Failed to parse amount").unwrap_err();
        assert!(err.to_string().contains("Failed to parse amount"));
    }
}
