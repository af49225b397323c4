/// RSI level below which a token is considered oversold.
pub const OVERSOLD: f64 = 30.0;
/// RSI level above which a token is considered overbought.
pub const OVERBOUGHT: f64 = 70.0;

/// RSI (Relative Strength Index) indicator.
///
/// Uses plain averages of gains and losses over the last `period` price
/// changes. Returns `None` until at least `period + 1` closes are available.
#[derive(Debug, Clone)]
pub struct RsiIndicator {
    pub period: usize,
}

impl RsiIndicator {
    pub const DEFAULT_PERIOD: usize = 14;

    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self { period }
    }

    /// Compute RSI from a slice of close prices (oldest first).
    pub fn compute(&self, closes: &[f64]) -> Option<f64> {
        if closes.len() < self.period + 1 {
            return None;
        }

        let recent = &closes[closes.len() - (self.period + 1)..];
        let (gains, losses) = recent
            .windows(2)
            .map(|w| w[1] - w[0])
            .fold((0.0, 0.0), |(g, l), change| {
                if change > 0.0 {
                    (g + change, l)
                } else {
                    (g, l - change)
                }
            });

        let avg_gain = gains / self.period as f64;
        let avg_loss = losses / self.period as f64;

        if avg_loss == 0.0 {
            return Some(100.0);
        }

        let rs = avg_gain / avg_loss;
        Some(100.0 - 100.0 / (1.0 + rs))
    }
}

impl Default for RsiIndicator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PERIOD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rsi_returns_none_when_insufficient_data() {
        let rsi = RsiIndicator::new(14);
        // Need at least period+1 = 15 values
        let prices = vec![100.0; 14];
        assert!(rsi.compute(&prices).is_none());
    }

    #[test]
    fn rsi_returns_some_with_sufficient_data() {
        let rsi = RsiIndicator::new(14);
        let prices: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        assert!(rsi.compute(&prices).is_some());
    }

    #[test]
    fn rsi_all_gains_returns_100() {
        let rsi = RsiIndicator::new(3);
        let prices = vec![10.0, 11.0, 12.0, 13.0, 14.0];
        assert_eq!(rsi.compute(&prices), Some(100.0));
    }

    #[test]
    fn rsi_all_losses_returns_0() {
        let rsi = RsiIndicator::new(3);
        let prices = vec![14.0, 13.0, 12.0, 11.0, 10.0];
        let value = rsi.compute(&prices).unwrap();
        assert!(value.abs() < 1e-9, "Expected ~0, got {value}");
    }

    #[test]
    fn rsi_ignores_changes_before_the_window() {
        let rsi = RsiIndicator::new(2);
        // Big drop first, then two gains: only the gains are in the window.
        let prices = vec![50.0, 10.0, 11.0, 12.0];
        assert_eq!(rsi.compute(&prices), Some(100.0));
    }

    #[test]
    fn rsi_balanced_moves_give_50() {
        let rsi = RsiIndicator::new(4);
        let prices = vec![10.0, 11.0, 10.0, 11.0, 10.0];
        let value = rsi.compute(&prices).unwrap();
        assert!((value - 50.0).abs() < 1e-9);
    }
}
