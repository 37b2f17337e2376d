/// Power factor (efficiency) of a load: active / apparent power.
///
/// Defined as 0 when both components are exactly zero instead of NaN.
pub fn power_factor(active: f64, reactive: f64) -> f64 {
    let apparent_sq = active * active + reactive * reactive;
    if apparent_sq > 0.0 {
        active / apparent_sq.sqrt()
    } else {
        0.0
    }
}

/// Linearly fill `None` slots between known values. Trailing gaps take the
/// last known value; leading gaps stay `None`.
pub fn interpolate_gaps(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut out = values.to_vec();
    let mut prev: Option<(usize, f64)> = None;

    for (i, value) in values.iter().enumerate() {
        let Some(v) = *value else { continue };
        if let Some((j, pv)) = prev {
            let span = (i - j) as f64;
            for (k, slot) in out.iter_mut().enumerate().take(i).skip(j + 1) {
                *slot = Some(pv + (v - pv) * (k - j) as f64 / span);
            }
        }
        prev = Some((i, v));
    }

    if let Some((j, pv)) = prev {
        for slot in out.iter_mut().skip(j + 1) {
            *slot = Some(pv);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_power_factor() {
        assert_eq!(power_factor(3.0, 4.0), 0.6);
        assert_eq!(power_factor(2.0, 0.0), 1.0);
        assert_eq!(power_factor(0.0, 0.0), 0.0);
        assert!(!power_factor(0.0, 0.0).is_nan());
    }

    #[test]
    fn test_interpolate_gaps() {
        let filled = interpolate_gaps(&[None, Some(1.0), None, None, Some(4.0), None]);
        assert_eq!(
            filled,
            vec![None, Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(4.0)]
        );
    }

    #[test]
    fn test_interpolate_all_missing() {
        assert_eq!(interpolate_gaps(&[None, None]), vec![None, None]);
    }
}
