/// Percent change of the latest close against the close `lag` steps back.
pub fn momentum(closes: &[f64], lag: usize) -> Option<f64> {
    if lag == 0 || closes.len() <= lag {
        return None;
    }
    let latest = *closes.last()?;
    let base = closes[closes.len() - 1 - lag];
    if base <= 0.0 {
        return None;
    }
    Some((latest / base - 1.0) * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn momentum_compares_against_lagged_close() {
        let closes = vec![100.0, 101.0, 102.0, 103.0, 104.0, 110.0];
        let value = momentum(&closes, 5).unwrap();
        assert!((value - 10.0).abs() < 1e-9);
    }

    #[test]
    fn momentum_needs_lag_plus_one_points() {
        assert!(momentum(&[1.0; 5], 5).is_none());
        assert_eq!(momentum(&[1.0; 6], 5), Some(0.0));
    }

    #[test]
    fn momentum_unavailable_for_non_positive_base() {
        assert!(momentum(&[0.0, 1.0], 1).is_none());
    }
}
