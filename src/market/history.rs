//! In-memory [`MarketEngine`] over pre-fetched closing-price series.
//!
//! Data acquisition is out of scope for this crate; callers hand over
//! aligned per-ticker close series (one value per trading period) and the
//! engine derives simple returns and the risk-adjusted ratios from them.

use std::collections::HashMap;

use super::{MarketEngine, Stock};
use crate::error::{EvolutionError, Result};

/// Trading periods per year, for annualization.
const TRADING_PERIODS: f64 = 252.0;

/// Floor applied to volatility denominators.
const MIN_VOLATILITY: f64 = 1e-8;

/// Drawdowns closer to zero than this yield a Calmar ratio of 0 instead of
/// exploding.
const MIN_DRAWDOWN: f64 = 1e-6;

/// A [`MarketEngine`] computing ratios over aligned closing-price rows.
///
/// # Examples
///
/// ```rust
/// use evofolio::market::{MarketEngine, PriceHistory, Stock};
///
/// let history = PriceHistory::from_closes(
///     vec![
///         ("AAPL", vec![100.0, 101.0, 103.0, 102.0]),
///         ("MSFT", vec![200.0, 199.0, 202.0, 205.0]),
///     ],
///     0.05,
/// )?;
///
/// let wallet = vec![Stock::new("AAPL", 60), Stock::new("MSFT", 40)];
/// let sharpe = history.sharpe_ratio(&wallet)?;
/// assert!(sharpe.is_finite());
/// # Ok::<(), evofolio::error::EvolutionError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PriceHistory {
    index_by_ticker: HashMap<String, usize>,
    /// Per-period simple returns, one row per period, aligned with the
    /// ticker indices.
    returns: Vec<Vec<f64>>,
    risk_free_rate: f64,
}

impl PriceHistory {
    /// Builds a history from per-ticker closing-price series.
    ///
    /// Every series must cover the same trading periods (same length) and
    /// hold at least three closes, so that the derived return series
    /// supports a sample standard deviation.
    ///
    /// # Errors
    ///
    /// Returns [`EvolutionError::DataUnavailable`] when no series is given,
    /// when series lengths disagree, when a series is too short, or when a
    /// close is non-finite or non-positive.
    pub fn from_closes<S: Into<String>>(
        closes: Vec<(S, Vec<f64>)>,
        risk_free_rate: f64,
    ) -> Result<Self> {
        if closes.is_empty() {
            return Err(EvolutionError::DataUnavailable(
                "No price series provided".to_string(),
            ));
        }

        let mut index_by_ticker = HashMap::with_capacity(closes.len());
        let mut series = Vec::with_capacity(closes.len());
        let mut periods = None;

        for (ticker, values) in closes {
            let ticker = ticker.into();

            if values.len() < 3 {
                return Err(EvolutionError::DataUnavailable(format!(
                    "Price series for {} holds {} closes; at least 3 are needed",
                    ticker,
                    values.len()
                )));
            }

            match periods {
                None => periods = Some(values.len()),
                Some(expected) if expected != values.len() => {
                    return Err(EvolutionError::DataUnavailable(format!(
                        "Price series for {} covers {} periods, expected {}",
                        ticker,
                        values.len(),
                        expected
                    )));
                }
                Some(_) => {}
            }

            if let Some(bad) = values.iter().find(|v| !v.is_finite() || **v <= 0.0) {
                return Err(EvolutionError::DataUnavailable(format!(
                    "Price series for {} contains an invalid close: {}",
                    ticker, bad
                )));
            }

            index_by_ticker.insert(ticker, series.len());
            series.push(values);
        }

        // One row of simple returns per period transition, aligned with the
        // ticker indices.
        let periods = periods.unwrap_or(0);
        let returns = (1..periods)
            .map(|t| {
                series
                    .iter()
                    .map(|closes| closes[t] / closes[t - 1] - 1.0)
                    .collect()
            })
            .collect();

        Ok(Self {
            index_by_ticker,
            returns,
            risk_free_rate,
        })
    }

    /// Amount-weighted per-period returns of the wallet, plus the equity
    /// curve compounded from them.
    fn portfolio_series(&self, wallet: &[Stock]) -> Result<(Vec<f64>, Vec<f64>)> {
        if wallet.is_empty() {
            return Err(EvolutionError::FitnessEvaluation(
                "Cannot evaluate an empty wallet".to_string(),
            ));
        }

        let total: u32 = wallet.iter().map(|stock| stock.amount).sum();
        if total == 0 {
            return Err(EvolutionError::FitnessEvaluation(
                "Wallet has no allocated capital".to_string(),
            ));
        }

        let mut positions = Vec::with_capacity(wallet.len());
        for stock in wallet {
            let index = self.index_by_ticker.get(&stock.ticker).ok_or_else(|| {
                EvolutionError::DataUnavailable(format!(
                    "No price series for ticker {}",
                    stock.ticker
                ))
            })?;
            positions.push((*index, f64::from(stock.amount) / f64::from(total)));
        }

        let returns: Vec<f64> = self
            .returns
            .iter()
            .map(|row| {
                positions
                    .iter()
                    .map(|(index, weight)| weight * row[*index])
                    .sum()
            })
            .collect();

        let mut equity = Vec::with_capacity(returns.len());
        let mut level = 1.0;
        for r in &returns {
            level *= 1.0 + r;
            equity.push(level);
        }

        Ok((returns, equity))
    }

    /// Raw amount-weighted return series (not normalized to weights), the
    /// basis for the wallet-level mean-return and volatility figures.
    fn weighted_returns(&self, wallet: &[Stock]) -> Result<Vec<f64>> {
        if wallet.is_empty() {
            return Err(EvolutionError::FitnessEvaluation(
                "Cannot evaluate an empty wallet".to_string(),
            ));
        }

        let mut positions = Vec::with_capacity(wallet.len());
        for stock in wallet {
            let index = self.index_by_ticker.get(&stock.ticker).ok_or_else(|| {
                EvolutionError::DataUnavailable(format!(
                    "No price series for ticker {}",
                    stock.ticker
                ))
            })?;
            positions.push((*index, f64::from(stock.amount)));
        }

        Ok(self
            .returns
            .iter()
            .map(|row| {
                positions
                    .iter()
                    .map(|(index, amount)| amount * row[*index])
                    .sum()
            })
            .collect())
    }
}

impl MarketEngine for PriceHistory {
    fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    fn wallet_mean_return(&self, wallet: &[Stock]) -> Result<f64> {
        let weighted = self.weighted_returns(wallet)?;
        Ok(mean(&weighted) - self.risk_free_rate)
    }

    fn wallet_volatility(&self, wallet: &[Stock]) -> Result<f64> {
        let weighted = self.weighted_returns(wallet)?;
        Ok(sample_std(&weighted) * TRADING_PERIODS.sqrt())
    }

    fn sharpe_ratio(&self, wallet: &[Stock]) -> Result<f64> {
        let (returns, _) = self.portfolio_series(wallet)?;
        let per_period_rf = self.risk_free_rate / TRADING_PERIODS;

        let excess_mean = mean(&returns) - per_period_rf;
        let volatility = sample_std(&returns).max(MIN_VOLATILITY);

        Ok(excess_mean / volatility * TRADING_PERIODS.sqrt())
    }

    fn sortino_ratio(&self, wallet: &[Stock]) -> Result<f64> {
        let (returns, _) = self.portfolio_series(wallet)?;
        let per_period_rf = self.risk_free_rate / TRADING_PERIODS;

        let downside_squares: Vec<f64> = returns
            .iter()
            .map(|r| (r - per_period_rf).min(0.0).powi(2))
            .collect();
        let downside =
            (mean(&downside_squares).sqrt() * TRADING_PERIODS.sqrt()).max(MIN_VOLATILITY);

        let annualized = (1.0 + mean(&returns)).powf(TRADING_PERIODS) - 1.0;

        Ok((annualized - self.risk_free_rate) / downside)
    }

    fn calmar_ratio(&self, wallet: &[Stock]) -> Result<f64> {
        let (_, equity) = self.portfolio_series(wallet)?;

        let first = equity[0];
        let last = equity[equity.len() - 1];
        let annualized = (last / first).powf(TRADING_PERIODS / equity.len() as f64) - 1.0;

        let mut peak = f64::NEG_INFINITY;
        let mut max_drawdown = 0.0_f64;
        for level in &equity {
            peak = peak.max(*level);
            max_drawdown = max_drawdown.min(level / peak - 1.0);
        }

        if max_drawdown.abs() < MIN_DRAWDOWN {
            return Ok(0.0);
        }

        Ok(annualized / max_drawdown.abs())
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (ddof = 1), 0 for series shorter than 2.
fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mu = mean(values);
    let variance =
        values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
