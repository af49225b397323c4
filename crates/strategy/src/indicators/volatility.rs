use common::PricePoint;

use super::{high, low, mean, sample_std};

/// True range of one step: the widest of the bar's own range and its gaps to
/// the previous close.
fn true_range(high: f64, low: f64, prev_close: f64) -> f64 {
    (high - low)
        .max((high - prev_close).abs())
        .max((low - prev_close).abs())
}

/// Average True Range: mean of the last `period` true ranges.
/// Needs `period + 1` points since every true range looks one step back.
pub fn atr(points: &[PricePoint], period: usize) -> Option<f64> {
    if period == 0 || points.len() < period + 1 {
        return None;
    }
    let recent = &points[points.len() - (period + 1)..];
    let sum: f64 = recent
        .windows(2)
        .map(|w| true_range(high(&w[1]), low(&w[1]), w[0].price))
        .sum();
    Some(sum / period as f64)
}

/// Coefficient of variation of the last `period` closes (sample std / mean).
pub fn volatility(closes: &[f64], period: usize) -> Option<f64> {
    if period < 2 || closes.len() < period {
        return None;
    }
    let window = &closes[closes.len() - period..];
    let m = mean(window);
    if m == 0.0 {
        return None;
    }
    Some(sample_std(window) / m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_points;

    #[test]
    fn atr_of_close_only_series_is_mean_absolute_change() {
        let points = test_points(&[10.0, 11.0, 9.0, 9.5]);
        let value = atr(&points, 3).unwrap();
        assert!((value - (1.0 + 2.0 + 0.5) / 3.0).abs() < 1e-12);
    }

    #[test]
    fn atr_needs_period_plus_one_points() {
        let points = test_points(&[10.0; 14]);
        assert!(atr(&points, 14).is_none());
        let points = test_points(&[10.0; 15]);
        assert_eq!(atr(&points, 14), Some(0.0));
    }

    #[test]
    fn true_range_takes_largest_gap() {
        assert_eq!(true_range(12.0, 10.0, 11.0), 2.0);
        assert_eq!(true_range(12.0, 11.5, 9.0), 3.0);
        assert_eq!(true_range(8.0, 7.0, 10.0), 3.0);
    }

    #[test]
    fn volatility_of_flat_series_is_zero() {
        assert_eq!(volatility(&[4.0; 20], 20), Some(0.0));
        assert!(volatility(&[4.0; 19], 20).is_none());
    }

    #[test]
    fn volatility_is_std_over_mean() {
        let value = volatility(&[1.0, 3.0], 2).unwrap();
        assert!((value - 2f64.sqrt() / 2.0).abs() < 1e-12);
    }
}
