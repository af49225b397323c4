use serde::{Deserialize, Serialize};

/// Per-column standardization: `(x - mean) / std`, population std.
/// A constant column keeps scale 1 so it maps to 0 instead of NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    /// Fit on row-major data. All rows must have the same width.
    pub fn fit(rows: &[Vec<f64>]) -> Self {
        let width = rows.first().map_or(0, Vec::len);
        let n = rows.len().max(1) as f64;

        let mut means = vec![0.0; width];
        for row in rows {
            for (m, v) in means.iter_mut().zip(row) {
                *m += v;
            }
        }
        means.iter_mut().for_each(|m| *m /= n);

        let mut scales = vec![0.0; width];
        for row in rows {
            for ((s, v), m) in scales.iter_mut().zip(row).zip(&means) {
                *s += (v - m).powi(2);
            }
        }
        for s in &mut scales {
            let std = (*s / n).sqrt();
            *s = if std > 0.0 { std } else { 1.0 };
        }

        Self { means, scales }
    }

    pub fn width(&self) -> usize {
        self.means.len()
    }

    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        row.iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(v, (m, s))| (v - m) / s)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standardizes_each_column() {
        let scaler = StandardScaler::fit(&[vec![1.0, 10.0], vec![3.0, 10.0]]);
        assert_eq!(scaler.width(), 2);
        assert_eq!(scaler.transform(&[1.0, 10.0]), vec![-1.0, 0.0]);
        assert_eq!(scaler.transform(&[3.0, 10.0]), vec![1.0, 0.0]);
    }

    #[test]
    fn constant_column_keeps_unit_scale() {
        let scaler = StandardScaler::fit(&[vec![5.0], vec![5.0], vec![5.0]]);
        assert_eq!(scaler.transform(&[7.0]), vec![2.0]);
    }
}
