use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};
use tracing::debug;

use common::{Error, MarketContext, PricePoint, Result};

use crate::snapshot::Snapshot;

/// Bounded per-token price history.
///
/// Each token owns a FIFO of at most `capacity` points, oldest first. Series
/// are created lazily on the first append for a token.
#[derive(Debug)]
pub struct SeriesStore {
    capacity: usize,
    series: HashMap<String, VecDeque<PricePoint>>,
    pub(crate) snapshots: VecDeque<Snapshot>,
}

impl SeriesStore {
    pub const DEFAULT_CAPACITY: usize = 50;

    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            series: HashMap::new(),
            snapshots: VecDeque::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Append one observation. Rejects non-positive prices, negative volumes
    /// and timestamps older than the series' latest point; the series is left
    /// unchanged on error.
    pub fn append(
        &mut self,
        token: &str,
        price: f64,
        volume: f64,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        if !price.is_finite() || price <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "price for {token} must be positive, got {price}"
            )));
        }
        if !volume.is_finite() || volume < 0.0 {
            return Err(Error::InvalidInput(format!(
                "volume for {token} must be non-negative, got {volume}"
            )));
        }
        if let Some(last) = self.series.get(token).and_then(|s| s.back()) {
            if timestamp < last.timestamp {
                return Err(Error::InvalidInput(format!(
                    "timestamp {timestamp} for {token} is older than latest point {}",
                    last.timestamp
                )));
            }
        }

        let history = self.series.entry(token.to_string()).or_default();
        history.push_back(PricePoint { timestamp, price, volume });
        if history.len() > self.capacity {
            history.pop_front();
        }
        debug!(token, price, volume, len = history.len(), "Point appended");
        Ok(())
    }

    /// The last `min(n, len)` points for `token`, oldest first. Empty for an
    /// unknown token.
    pub fn window(&self, token: &str, n: usize) -> Vec<PricePoint> {
        match self.series.get(token) {
            Some(history) => {
                let skip = history.len().saturating_sub(n);
                history.iter().skip(skip).copied().collect()
            }
            None => Vec::new(),
        }
    }

    /// The whole retained history for `token`.
    pub fn history(&self, token: &str) -> Vec<PricePoint> {
        self.window(token, self.capacity)
    }

    pub fn latest(&self, token: &str) -> Option<PricePoint> {
        self.series.get(token).and_then(|s| s.back().copied())
    }

    pub fn len(&self, token: &str) -> usize {
        self.series.get(token).map_or(0, VecDeque::len)
    }

    /// Tracked tokens in sorted order.
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens: Vec<String> = self.series.keys().cloned().collect();
        tokens.sort();
        tokens
    }

    pub fn token_count(&self) -> usize {
        self.series.len()
    }

    /// Market-wide aggregates over the latest price of every tracked token.
    pub fn market_context(&self, major_tokens: &[String]) -> MarketContext {
        let latest: Vec<(&str, f64)> = self
            .series
            .iter()
            .filter_map(|(token, s)| s.back().map(|p| (token.as_str(), p.price)))
            .collect();

        if latest.is_empty() {
            return MarketContext::default();
        }

        let prices: Vec<f64> = latest.iter().map(|(_, p)| *p).collect();
        let avg = prices.iter().sum::<f64>() / prices.len() as f64;
        let max = prices.iter().copied().fold(f64::MIN, f64::max);
        let min = prices.iter().copied().fold(f64::MAX, f64::min);
        let dispersion = if prices.len() > 1 && min > 0.0 {
            max / min
        } else {
            MarketContext::DEFAULT_DISPERSION
        };

        let major_tokens_count = latest
            .iter()
            .filter(|(token, _)| major_tokens.iter().any(|m| m.eq_ignore_ascii_case(token)))
            .count();

        MarketContext {
            tokens_analyzed: latest.len(),
            major_tokens_count,
            market_avg_price: avg,
            price_dispersion: dispersion,
        }
    }
}

impl Default for SeriesStore {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
