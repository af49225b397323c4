use common::PricePoint;

use super::{high, low};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupportResistance {
    pub support: f64,
    pub resistance: f64,
    /// `(price - support) / price`
    pub support_distance: f64,
    /// `(resistance - price) / price`
    pub resistance_distance: f64,
}

/// Lowest low and highest high of the last `period` points, and how far the
/// latest close sits from each.
pub fn support_resistance(points: &[PricePoint], period: usize) -> Option<SupportResistance> {
    if period == 0 || points.len() < period {
        return None;
    }
    let window = &points[points.len() - period..];
    let price = window.last()?.price;
    if price <= 0.0 {
        return None;
    }

    let support = window.iter().map(low).fold(f64::INFINITY, f64::min);
    let resistance = window.iter().map(high).fold(f64::NEG_INFINITY, f64::max);

    Some(SupportResistance {
        support,
        resistance,
        support_distance: (price - support) / price,
        resistance_distance: (resistance - price) / price,
    })
}

/// How many of the last `lookback` steps printed a high above the previous one.
pub fn higher_highs(points: &[PricePoint], lookback: usize) -> Option<f64> {
    count_steps(points, lookback, |prev, cur| high(cur) > high(prev))
}

/// How many of the last `lookback` steps printed a low below the previous one.
pub fn lower_lows(points: &[PricePoint], lookback: usize) -> Option<f64> {
    count_steps(points, lookback, |prev, cur| low(cur) < low(prev))
}

fn count_steps<F>(points: &[PricePoint], lookback: usize, hit: F) -> Option<f64>
where
    F: Fn(&PricePoint, &PricePoint) -> bool,
{
    if lookback == 0 || points.len() < lookback + 1 {
        return None;
    }
    let recent = &points[points.len() - (lookback + 1)..];
    let count = recent.windows(2).filter(|w| hit(&w[0], &w[1])).count();
    Some(count as f64)
}
