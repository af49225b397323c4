//! Technical indicators over a price window (oldest first).
//!
//! Every indicator returns `None` when the window is too short for it, so
//! callers never branch on errors. `IndicatorSet::compute` evaluates the full
//! set under fixed names.

pub mod bollinger;
pub mod levels;
pub mod macd;
pub mod momentum;
pub mod moving_average;
pub mod rsi;
pub mod volatility;
pub mod volume;

use std::collections::BTreeMap;

use common::PricePoint;

pub use bollinger::{BollingerBands, BollingerIndicator};
pub use levels::{higher_highs, lower_lows, support_resistance, SupportResistance};
pub use macd::{MacdIndicator, MacdReading};
pub use momentum::momentum;
pub use moving_average::{ema, ema_series, sma};
pub use rsi::RsiIndicator;
pub use volatility::{atr, volatility};
pub use volume::volume_ratio;

pub const SMA_7: &str = "sma_7";
pub const SMA_14: &str = "sma_14";
pub const SMA_21: &str = "sma_21";
pub const SMA_50: &str = "sma_50";
pub const EMA_12: &str = "ema_12";
pub const EMA_26: &str = "ema_26";
pub const MACD: &str = "macd";
pub const MACD_SIGNAL: &str = "macd_signal";
pub const MACD_HISTOGRAM: &str = "macd_histogram";
pub const RSI: &str = "rsi";
pub const BB_POSITION: &str = "bb_position";
pub const BB_WIDTH: &str = "bb_width";
pub const VOLUME_RATIO: &str = "volume_ratio";
pub const MOMENTUM_5: &str = "momentum_5";
pub const MOMENTUM_10: &str = "momentum_10";
pub const MOMENTUM_20: &str = "momentum_20";
pub const ATR: &str = "atr";
pub const VOLATILITY_20: &str = "volatility_20";
pub const SUPPORT_DISTANCE: &str = "support_distance";
pub const RESISTANCE_DISTANCE: &str = "resistance_distance";
pub const HIGHER_HIGHS: &str = "higher_highs";
pub const LOWER_LOWS: &str = "lower_lows";

/// Every name `IndicatorSet::compute` produces, in feature order.
pub const INDICATOR_NAMES: [&str; 22] = [
    SMA_7,
    SMA_14,
    SMA_21,
    SMA_50,
    EMA_12,
    EMA_26,
    MACD,
    MACD_SIGNAL,
    MACD_HISTOGRAM,
    RSI,
    BB_POSITION,
    BB_WIDTH,
    VOLUME_RATIO,
    MOMENTUM_5,
    MOMENTUM_10,
    MOMENTUM_20,
    ATR,
    VOLATILITY_20,
    SUPPORT_DISTANCE,
    RESISTANCE_DISTANCE,
    HIGHER_HIGHS,
    LOWER_LOWS,
];

const BAND_PERIOD: usize = 20;
const ATR_PERIOD: usize = 14;
const STRENGTH_LOOKBACK: usize = 5;

/// Indicator readings derived from one window. `None` = unavailable.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    current_price: Option<f64>,
    values: BTreeMap<&'static str, Option<f64>>,
}

impl IndicatorSet {
    /// Evaluate every indicator over `window` (oldest first).
    pub fn compute(window: &[PricePoint]) -> Self {
        let closes: Vec<f64> = window.iter().map(|p| p.price).collect();
        let volumes: Vec<f64> = window.iter().map(|p| p.volume).collect();

        let macd = MacdIndicator::default().compute(&closes);
        let bands = BollingerIndicator::default().compute(&closes);
        let levels = support_resistance(window, BAND_PERIOD);

        let mut values = BTreeMap::new();
        values.insert(SMA_7, sma(&closes, 7));
        values.insert(SMA_14, sma(&closes, 14));
        values.insert(SMA_21, sma(&closes, 21));
        values.insert(SMA_50, sma(&closes, 50));
        values.insert(EMA_12, ema(&closes, 12));
        values.insert(EMA_26, ema(&closes, 26));
        values.insert(MACD, macd.map(|m| m.macd));
        values.insert(MACD_SIGNAL, macd.map(|m| m.signal));
        values.insert(MACD_HISTOGRAM, macd.map(|m| m.histogram));
        values.insert(RSI, RsiIndicator::default().compute(&closes));
        values.insert(BB_POSITION, bands.and_then(|b| b.position));
        values.insert(BB_WIDTH, bands.map(|b| b.width));
        values.insert(VOLUME_RATIO, volume_ratio(&volumes, BAND_PERIOD));
        values.insert(MOMENTUM_5, momentum(&closes, 5));
        values.insert(MOMENTUM_10, momentum(&closes, 10));
        values.insert(MOMENTUM_20, momentum(&closes, 20));
        values.insert(ATR, atr(window, ATR_PERIOD));
        values.insert(VOLATILITY_20, volatility(&closes, BAND_PERIOD));
        values.insert(SUPPORT_DISTANCE, levels.map(|l| l.support_distance));
        values.insert(RESISTANCE_DISTANCE, levels.map(|l| l.resistance_distance));
        values.insert(HIGHER_HIGHS, higher_highs(window, STRENGTH_LOOKBACK));
        values.insert(LOWER_LOWS, lower_lows(window, STRENGTH_LOOKBACK));

        Self {
            current_price: closes.last().copied(),
            values,
        }
    }

    /// Latest close of the window, `None` for an empty window.
    pub fn current_price(&self) -> Option<f64> {
        self.current_price
    }

    /// Reading for `name`; `None` if unavailable or not an indicator name.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied().flatten()
    }

    pub fn is_known(name: &str) -> bool {
        INDICATOR_NAMES.contains(&name)
    }

    pub fn available_count(&self) -> usize {
        self.values.values().filter(|v| v.is_some()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Option<f64>)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }
}

// ─── Window helpers ───────────────────────────────────────────────────────────

/// A point carries only its close, so the close stands in for high and low.
pub(crate) fn high(point: &PricePoint) -> f64 {
    point.price
}

pub(crate) fn low(point: &PricePoint) -> f64 {
    point.price
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n − 1 denominator); 0 for fewer than 2 values.
pub(crate) fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

#[cfg(test)]
pub(crate) fn test_points(prices: &[f64]) -> Vec<PricePoint> {
    use chrono::{Duration, TimeZone, Utc};
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    prices
        .iter()
        .enumerate()
        .map(|(i, &price)| PricePoint {
            timestamp: start + Duration::hours(i as i64),
            price,
            volume: 1000.0,
        })
        .collect()
}
