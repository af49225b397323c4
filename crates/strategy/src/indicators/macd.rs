use super::moving_average::ema_series;

/// MACD (Moving Average Convergence/Divergence) indicator.
///
/// MACD line = EMA(fast) − EMA(slow), signal = EMA(signal) of the MACD line,
/// histogram = MACD − signal. All EMAs run over the whole window.
#[derive(Debug, Clone)]
pub struct MacdIndicator {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
}

/// Latest MACD values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MacdReading {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

impl MacdIndicator {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast < slow, "MACD fast period must be less than slow period");
        Self { fast, slow, signal }
    }

    /// Compute the latest MACD reading from close prices (oldest first).
    /// Returns `None` until `slow` closes are available.
    pub fn compute(&self, closes: &[f64]) -> Option<MacdReading> {
        if closes.len() < self.slow {
            return None;
        }

        let fast = ema_series(closes, self.fast);
        let slow = ema_series(closes, self.slow);
        let macd_line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal_line = ema_series(&macd_line, self.signal);

        let macd = *macd_line.last()?;
        let signal = *signal_line.last()?;
        Some(MacdReading {
            macd,
            signal,
            histogram: macd - signal,
        })
    }
}

impl Default for MacdIndicator {
    fn default() -> Self {
        Self::new(12, 26, 9)
    }
}
