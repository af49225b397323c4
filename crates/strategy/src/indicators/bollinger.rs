use super::{mean, sample_std};

/// Bollinger Bands around a simple moving average.
#[derive(Debug, Clone)]
pub struct BollingerIndicator {
    pub period: usize,
    pub k: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    pub width: f64,
    /// Where the latest close sits between the bands (0 = lower, 1 = upper).
    /// `None` when the bands collapse onto each other. Not clamped: a close
    /// outside the bands gives a value outside `[0, 1]`.
    pub position: Option<f64>,
}

impl BollingerIndicator {
    pub fn new(period: usize, k: f64) -> Self {
        assert!(period >= 2, "Bollinger period must be >= 2");
        Self { period, k }
    }

    pub fn compute(&self, closes: &[f64]) -> Option<BollingerBands> {
        if closes.len() < self.period {
            return None;
        }
        let window = &closes[closes.len() - self.period..];
        let price = *window.last()?;

        let middle = mean(window);
        let std = sample_std(window);
        let upper = middle + self.k * std;
        let lower = middle - self.k * std;
        let position = if upper == lower {
            None
        } else {
            Some((price - lower) / (upper - lower))
        };

        Some(BollingerBands {
            upper,
            middle,
            lower,
            width: upper - lower,
            position,
        })
    }
}

impl Default for BollingerIndicator {
    fn default() -> Self {
        Self::new(20, 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_series_has_no_position() {
        let bands = BollingerIndicator::default().compute(&[2.0; 20]).unwrap();
        assert_eq!(bands.upper, bands.lower);
        assert_eq!(bands.width, 0.0);
        assert!(bands.position.is_none());
    }

    #[test]
    fn requires_full_period() {
        assert!(BollingerIndicator::default().compute(&[2.0; 19]).is_none());
    }

    #[test]
    fn uses_sample_standard_deviation() {
        let bands = BollingerIndicator::new(2, 1.0).compute(&[1.0, 3.0]).unwrap();
        // mean 2, sample std sqrt(2)
        assert!((bands.middle - 2.0).abs() < 1e-12);
        assert!((bands.upper - (2.0 + 2f64.sqrt())).abs() < 1e-12);
        assert!((bands.lower - (2.0 - 2f64.sqrt())).abs() < 1e-12);
    }

    #[test]
    fn position_can_leave_unit_interval() {
        let mut closes = vec![10.0; 19];
        closes.push(10.1);
        let calm = BollingerIndicator::default().compute(&closes).unwrap();
        assert!(calm.position.unwrap() > 0.5);

        let mut closes: Vec<f64> = (0..19).map(|i| 10.0 + (i % 2) as f64 * 0.01).collect();
        closes.push(20.0);
        let bands = BollingerIndicator::new(20, 0.1).compute(&closes).unwrap();
        assert!(bands.position.unwrap() > 1.0);
    }
}
