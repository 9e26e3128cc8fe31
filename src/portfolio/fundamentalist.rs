use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::chromosome::Chromosome;
use crate::error::{EvolutionError, Result};
use crate::market::FundamentalData;
use crate::rng::RandomNumberGenerator;

/// The investable universe of a fundamentalist run: ordered tickers plus
/// their fundamental figures.
///
/// The ordering is part of the contract — mutation draws replacement
/// candidates from it, and a deterministic order is what keeps seeded runs
/// reproducible. One universe is shared read-only by the whole population.
#[derive(Debug)]
pub struct FundamentalUniverse {
    order: Vec<String>,
    data: HashMap<String, FundamentalData>,
}

impl FundamentalUniverse {
    /// Builds a universe from fundamental records, keeping their order.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no records are given or a ticker
    /// appears twice.
    pub fn new(entries: Vec<FundamentalData>) -> Result<Self> {
        if entries.is_empty() {
            return Err(EvolutionError::Configuration(
                "Fundamental universe needs at least one ticker".to_string(),
            ));
        }

        let mut order = Vec::with_capacity(entries.len());
        let mut data = HashMap::with_capacity(entries.len());
        for entry in entries {
            if data.contains_key(&entry.ticker) {
                return Err(EvolutionError::Configuration(format!(
                    "Duplicate fundamental data for ticker {}",
                    entry.ticker
                )));
            }
            order.push(entry.ticker.clone());
            data.insert(entry.ticker.clone(), entry);
        }

        Ok(Self { order, data })
    }

    /// Tickers of the universe, in construction order.
    pub fn tickers(&self) -> &[String] {
        &self.order
    }

    /// Fundamental figures for `ticker`, if the universe covers it.
    pub fn get(&self, ticker: &str) -> Option<&FundamentalData> {
        self.data.get(ticker)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// An asset-subset candidate: a selection of tickers scored on the average
/// quality of their fundamentals, with no allocation dimension.
///
/// Each ticker's score folds return on invested capital, return on equity,
/// net-income growth, and leverage into `[0, 1]`-ish territory:
///
/// `0.35 * squash(roic) + 0.35 * squash(roe) + 0.2 * (tanh(growth) + 1) / 2
///  + 0.1 * debt_score`
///
/// where `squash(x) = max(x, -0.99) / (|max(x, -0.99)| + 1)` and
/// `debt_score` is 1 for companies without a meaningful debt/EBITDA figure,
/// `1 / (1 + debt_ebitda)` otherwise.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
///
/// use evofolio::market::FundamentalData;
/// use evofolio::portfolio::{FundamentalistChromosome, FundamentalUniverse};
/// use evofolio::rng::RandomNumberGenerator;
///
/// let universe = Arc::new(FundamentalUniverse::new(vec![
///     FundamentalData { ticker: "AAPL".into(), roic: 0.3, roe: 0.5, debt_ebitda: 1.2, growth_rate: 0.1 },
///     FundamentalData { ticker: "MSFT".into(), roic: 0.25, roe: 0.4, debt_ebitda: 0.8, growth_rate: 0.15 },
///     FundamentalData { ticker: "GOOG".into(), roic: 0.2, roe: 0.3, debt_ebitda: 0.1, growth_rate: 0.2 },
/// ])?);
///
/// let mut rng = RandomNumberGenerator::from_seed(42);
/// let pick = FundamentalistChromosome::random(Arc::clone(&universe), 1, 3, &mut rng)?;
///
/// assert!(!pick.tickers().is_empty());
/// # Ok::<(), evofolio::error::EvolutionError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FundamentalistChromosome {
    tickers: Vec<String>,
    universe: Arc<FundamentalUniverse>,
}

impl FundamentalistChromosome {
    /// Creates a subset selection over `tickers`.
    ///
    /// Membership in the universe is checked lazily, at evaluation time; an
    /// unknown ticker surfaces as a data-unavailability error there.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `tickers` is empty.
    pub fn new(tickers: Vec<String>, universe: Arc<FundamentalUniverse>) -> Result<Self> {
        if tickers.is_empty() {
            return Err(EvolutionError::Configuration(
                "Subset selection needs at least one ticker".to_string(),
            ));
        }

        Ok(Self { tickers, universe })
    }

    /// Samples a random subset of `min_assets..=max_assets` tickers from
    /// the universe.
    ///
    /// # Errors
    ///
    /// Returns a configuration error unless
    /// `1 <= min_assets <= max_assets <= universe.len()`.
    pub fn random(
        universe: Arc<FundamentalUniverse>,
        min_assets: usize,
        max_assets: usize,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Self> {
        if min_assets < 1 || min_assets > max_assets || max_assets > universe.len() {
            return Err(EvolutionError::Configuration(format!(
                "Invalid subset bounds {}..={} for a universe of {} tickers",
                min_assets,
                max_assets,
                universe.len()
            )));
        }

        let count = rng.rng.gen_range(min_assets..=max_assets);
        let tickers = universe
            .tickers()
            .choose_multiple(&mut rng.rng, count)
            .cloned()
            .collect();

        Self::new(tickers, universe)
    }

    /// The selected tickers, in encoding order.
    pub fn tickers(&self) -> &[String] {
        &self.tickers
    }

    /// Fundamentalist score of one ticker.
    fn score_for(&self, ticker: &str) -> Result<f64> {
        let data = self.universe.get(ticker).ok_or_else(|| {
            EvolutionError::DataUnavailable(format!("No fundamental data for ticker {}", ticker))
        })?;

        let roic_score = squash(data.roic);
        let roe_score = squash(data.roe);

        let debt_score = if data.debt_ebitda <= 0.0 || data.debt_ebitda.is_nan() {
            1.0
        } else {
            1.0 / (1.0 + data.debt_ebitda)
        };

        let growth_score = (data.growth_rate.tanh() + 1.0) / 2.0;

        Ok(0.35 * roic_score + 0.35 * roe_score + 0.2 * growth_score + 0.1 * debt_score)
    }

    /// Order-preserving union of both parents' tickers, deduplicated.
    fn combined_tickers(&self, other: &Self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut combined = Vec::new();
        for ticker in self.tickers.iter().chain(other.tickers.iter()) {
            if seen.insert(ticker.as_str()) {
                combined.push(ticker.clone());
            }
        }
        combined
    }
}

impl Chromosome for FundamentalistChromosome {
    fn fitness(&self) -> Result<f64> {
        let mut total = 0.0;
        for ticker in &self.tickers {
            total += self.score_for(ticker)?;
        }
        Ok(total / self.tickers.len() as f64)
    }

    fn crossover(&self, other: &Self, rng: &mut RandomNumberGenerator) -> (Self, Self) {
        let min_size = self.tickers.len().min(other.tickers.len());
        let max_size = self.tickers.len().max(other.tickers.len());
        let combined = self.combined_tickers(other);

        let mut child = |rng: &mut RandomNumberGenerator| {
            let mut tickers = combined.clone();
            tickers.shuffle(&mut rng.rng);
            tickers.truncate(rng.rng.gen_range(min_size..=max_size));
            Self {
                tickers,
                universe: Arc::clone(&self.universe),
            }
        };

        (child(rng), child(rng))
    }

    fn mutate(&mut self, rng: &mut RandomNumberGenerator) {
        let available: Vec<&String> = self
            .universe
            .tickers()
            .iter()
            .filter(|ticker| !self.tickers.contains(ticker))
            .collect();

        // Each arm degrades to a no-op when the universe or the subset
        // leaves it nothing to do.
        match rng.rng.gen_range(0..3) {
            // Add a ticker the subset does not hold yet.
            0 => {
                if let Some(added) = available.as_slice().choose(&mut rng.rng) {
                    self.tickers.push((*added).clone());
                }
            }
            // Drop a ticker, keeping the subset non-empty.
            1 => {
                if self.tickers.len() > 1 {
                    let index = rng.rng.gen_range(0..self.tickers.len());
                    self.tickers.remove(index);
                }
            }
            // Swap a held ticker for an unheld one.
            _ => {
                if let Some(added) = available.as_slice().choose(&mut rng.rng) {
                    let added = (*added).clone();
                    let index = rng.rng.gen_range(0..self.tickers.len());
                    self.tickers[index] = added;
                }
            }
        }
    }
}

/// Maps an unbounded ratio into (-1, 1), clamping pathological lows.
fn squash(value: f64) -> f64 {
    let clamped = value.max(-0.99);
    clamped / (clamped.abs() + 1.0)
}
