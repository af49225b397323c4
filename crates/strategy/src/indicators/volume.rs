use super::mean;

/// Latest volume relative to the mean volume of the last `period` points.
pub fn volume_ratio(volumes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || volumes.len() < period {
        return None;
    }
    let window = &volumes[volumes.len() - period..];
    let avg = mean(window);
    if avg == 0.0 {
        return None;
    }
    Some(window.last()? / avg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spike_shows_up_as_ratio_above_one() {
        let mut volumes = vec![100.0; 19];
        volumes.push(300.0);
        let ratio = volume_ratio(&volumes, 20).unwrap();
        assert!((ratio - 300.0 / 110.0).abs() < 1e-12);
    }

    #[test]
    fn zero_mean_volume_is_unavailable() {
        assert!(volume_ratio(&[0.0; 20], 20).is_none());
        assert!(volume_ratio(&[1.0; 19], 20).is_none());
    }
}
