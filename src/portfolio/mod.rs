//! # Portfolio Encodings
//!
//! The concrete chromosome types of the crate: a capital-allocation
//! encoding scored on risk-adjusted return ratios, and an asset-subset
//! encoding scored on fundamental quality. Both close over their read-only
//! domain collaborator, so the evolution engine only ever sees the
//! [`Chromosome`](crate::chromosome::Chromosome) contract.

pub mod allocation;
pub mod fundamentalist;

pub use allocation::AllocationChromosome;
pub use fundamentalist::{FundamentalUniverse, FundamentalistChromosome};
