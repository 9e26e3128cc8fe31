//! # Ratio Caching
//!
//! Memoization for market-engine ratio computations. Wallet encodings
//! re-evaluate the same allocations many times across generations — every
//! clone of a surviving individual scores identically — so wrapping the
//! engine in a [`CachedEngine`] trades memory for skipped recomputation.
//!
//! The cache is thread-local: each island of an island-model run lives on
//! its own worker thread, so per-thread maps need no locking and islands
//! never contend on a shared cache.

use std::cell::RefCell;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use thread_local::ThreadLocal;

use crate::error::Result;
use crate::market::{MarketEngine, Stock};

/// Which ratio a cached value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Metric {
    MeanReturn,
    Volatility,
    Sharpe,
    Sortino,
    Calmar,
}

/// A per-thread memo of (wallet, metric) → value.
#[derive(Debug, Default)]
struct RatioCache {
    cache: ThreadLocal<RefCell<HashMap<(u64, Metric), f64>>>,
}

impl RatioCache {
    fn get(&self, key: (u64, Metric)) -> Option<f64> {
        self.cache
            .get()
            .and_then(|cell| cell.borrow().get(&key).copied())
    }

    fn insert(&self, key: (u64, Metric), value: f64) {
        self.cache
            .get_or(|| RefCell::new(HashMap::new()))
            .borrow_mut()
            .insert(key, value);
    }

    /// Number of cached entries on the current thread.
    fn len(&self) -> usize {
        self.cache.get().map_or(0, |cell| cell.borrow().len())
    }
}

/// A wrapper around a [`MarketEngine`] that memoizes ratio computations
/// per wallet.
///
/// Only successful computations are cached; errors (unknown tickers,
/// unevaluable wallets) propagate on every call.
///
/// # Examples
///
/// ```rust
/// use evofolio::caching::CachedEngine;
/// use evofolio::market::{MarketEngine, PriceHistory, Stock};
///
/// let history = PriceHistory::from_closes(
///     vec![("AAPL", vec![100.0, 102.0, 101.0, 104.0])],
///     0.0,
/// )?;
/// let engine = CachedEngine::new(history);
///
/// let wallet = vec![Stock::new("AAPL", 10)];
/// let first = engine.sharpe_ratio(&wallet)?;
/// let second = engine.sharpe_ratio(&wallet)?;
/// assert_eq!(first, second);
/// # Ok::<(), evofolio::error::EvolutionError>(())
/// ```
#[derive(Debug)]
pub struct CachedEngine<E: MarketEngine> {
    engine: E,
    cache: RatioCache,
}

impl<E: MarketEngine> CachedEngine<E> {
    /// Creates a new caching wrapper around `engine`.
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            cache: RatioCache::default(),
        }
    }

    /// Returns a reference to the wrapped engine.
    pub fn inner(&self) -> &E {
        &self.engine
    }

    /// Number of memoized values on the calling thread.
    pub fn cached_on_this_thread(&self) -> usize {
        self.cache.len()
    }

    fn memoized<F>(&self, wallet: &[Stock], metric: Metric, compute: F) -> Result<f64>
    where
        F: FnOnce(&E, &[Stock]) -> Result<f64>,
    {
        let key = (wallet_key(wallet), metric);
        if let Some(value) = self.cache.get(key) {
            return Ok(value);
        }

        let value = compute(&self.engine, wallet)?;
        self.cache.insert(key, value);
        Ok(value)
    }
}

impl<E: MarketEngine> MarketEngine for CachedEngine<E> {
    fn risk_free_rate(&self) -> f64 {
        self.engine.risk_free_rate()
    }

    fn wallet_mean_return(&self, wallet: &[Stock]) -> Result<f64> {
        self.memoized(wallet, Metric::MeanReturn, E::wallet_mean_return)
    }

    fn wallet_volatility(&self, wallet: &[Stock]) -> Result<f64> {
        self.memoized(wallet, Metric::Volatility, E::wallet_volatility)
    }

    fn sharpe_ratio(&self, wallet: &[Stock]) -> Result<f64> {
        self.memoized(wallet, Metric::Sharpe, E::sharpe_ratio)
    }

    fn sortino_ratio(&self, wallet: &[Stock]) -> Result<f64> {
        self.memoized(wallet, Metric::Sortino, E::sortino_ratio)
    }

    fn calmar_ratio(&self, wallet: &[Stock]) -> Result<f64> {
        self.memoized(wallet, Metric::Calmar, E::calmar_ratio)
    }
}

/// Hash of a wallet's genetic content: every (ticker, amount) pair, in
/// order.
fn wallet_key(wallet: &[Stock]) -> u64 {
    let mut hasher = DefaultHasher::new();
    for stock in wallet {
        stock.ticker.hash(&mut hasher);
        stock.amount.hash(&mut hasher);
    }
    hasher.finish()
}
