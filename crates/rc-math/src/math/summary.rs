//! Summary statistics over small samples.
//!
//! Every function returns `None` for an empty sample instead of NaN so that
//! "no value" stays distinguishable from a computed zero.

/// Neumaier-compensated sum.
pub fn stable_sum(values: &[f64]) -> f64 {
    let mut sum = 0.0;
    let mut compensation = 0.0;
    for &v in values {
        let t = sum + v;
        if sum.abs() >= v.abs() {
            compensation += (sum - t) + v;
        } else {
            compensation += (v - t) + sum;
        }
        sum = t;
    }
    sum + compensation
}

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(stable_sum(values) / values.len() as f64)
}

/// Population standard deviation (divides by `n`), two-pass.
pub fn population_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let squared: Vec<f64> = values.iter().map(|v| (v - m) * (v - m)).collect();
    Some((stable_sum(&squared) / values.len() as f64).sqrt())
}

/// Burstiness coefficient `(σ − μ) / (σ + μ)` of a set of waiting times.
///
/// Tends to −1 for perfectly regular gaps, 0 for Poisson-like gaps and +1
/// for heavily clustered gaps. Defined as 0 when `σ + μ == 0`.
pub fn burstiness(gaps: &[f64]) -> Option<f64> {
    let m = mean(gaps)?;
    let s = population_std(gaps)?;
    let denom = s + m;
    if denom == 0.0 {
        return Some(0.0);
    }
    Some((s - m) / denom)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn empty_sample_has_no_value() {
        assert_eq!(mean(&[]), None);
        assert_eq!(population_std(&[]), None);
        assert_eq!(burstiness(&[]), None);
    }

    #[test]
    fn mean_and_std_basic() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!(approx_eq(mean(&v).unwrap(), 5.0, 1e-12));
        assert!(approx_eq(population_std(&v).unwrap(), 2.0, 1e-12));
    }

    #[test]
    fn stable_sum_recovers_small_terms() {
        let v = [1e16, 1.0, -1e16];
        assert_eq!(stable_sum(&v), 1.0);
    }

    #[test]
    fn regular_gaps_are_minus_one() {
        assert_eq!(burstiness(&[3.0, 3.0, 3.0]), Some(-1.0));
    }

    #[test]
    fn zero_denominator_is_zero() {
        assert_eq!(burstiness(&[0.0, 0.0]), Some(0.0));
    }

    #[test]
    fn clustered_gaps_are_positive() {
        let b = burstiness(&[0.1, 0.1, 0.1, 0.1, 50.0]).unwrap();
        assert!(b > 0.0 && b < 1.0);
    }
}
