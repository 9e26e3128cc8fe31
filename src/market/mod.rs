//! # Market Data
//!
//! The domain collaborator side of the engine: wallet positions,
//! fundamental figures, and the [`MarketEngine`] contract that chromosomes
//! score themselves against. Engines are read-only once built — every
//! island of an island-model run evaluates fitness against the same
//! instance concurrently, so implementations must be safe for concurrent
//! reads and must report missing data as an error instead of a sentinel
//! value.

pub mod history;

pub use history::PriceHistory;

use std::fmt::Debug;

use crate::error::Result;

/// One position of a wallet: a ticker and the number of units allocated to
/// it.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Stock {
    pub ticker: String,
    pub amount: u32,
}

impl Stock {
    pub fn new(ticker: impl Into<String>, amount: u32) -> Self {
        Self {
            ticker: ticker.into(),
            amount,
        }
    }
}

/// Fundamental figures of one company, as consumed by the fundamentalist
/// scoring encoding.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct FundamentalData {
    pub ticker: String,
    /// Return on invested capital.
    pub roic: f64,
    /// Return on equity.
    pub roe: f64,
    /// Total debt over EBITDA; non-positive or NaN means "no meaningful
    /// leverage figure".
    pub debt_ebitda: f64,
    /// Year-over-year net-income growth rate.
    pub growth_rate: f64,
}

/// Read-only provider of the financial ratios a wallet is scored on.
///
/// All wallet-level methods take the full position list and weight each
/// ticker's return series by its allocated amount. A ticker the engine has
/// no data for is a [`DataUnavailable`](crate::error::EvolutionError::DataUnavailable)
/// error: silently scoring an unevaluable wallet would corrupt selection
/// pressure.
pub trait MarketEngine: Debug + Send + Sync {
    /// The annual risk-free rate used for excess-return figures.
    fn risk_free_rate(&self) -> f64;

    /// Annualized mean excess return of the amount-weighted wallet.
    fn wallet_mean_return(&self, wallet: &[Stock]) -> Result<f64>;

    /// Annualized volatility of the amount-weighted wallet.
    fn wallet_volatility(&self, wallet: &[Stock]) -> Result<f64>;

    /// Annualized Sharpe ratio of the wallet.
    fn sharpe_ratio(&self, wallet: &[Stock]) -> Result<f64>;

    /// Annualized Sortino ratio of the wallet (downside deviation in the
    /// denominator).
    fn sortino_ratio(&self, wallet: &[Stock]) -> Result<f64>;

    /// Calmar ratio of the wallet: annualized growth over maximum drawdown.
    fn calmar_ratio(&self, wallet: &[Stock]) -> Result<f64>;
}
