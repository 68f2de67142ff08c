//! Binomial emission costs for count series.
//!
//! An epoch with `r` relevant events out of `d` total events, observed under
//! a burst level whose expected proportion is `p`, has likelihood
//!
//! P(r | d, p) = C(d, r) · p^r · (1 − p)^(d − r)
//!
//! The burst solver works with the negative log of this quantity.

use super::stable::log_binomial;

/// Largest proportion a burst level may expect.
///
/// Levels whose scaled proportion would reach 1 are clamped here so the
/// `(1 − p)` term stays finite.
pub const MAX_PROPORTION: f64 = 1.0 - 1e-5;

/// Clamp an expected proportion into `[0, MAX_PROPORTION]`.
pub fn clamp_proportion(p: f64) -> f64 {
    if p.is_nan() || p <= 0.0 {
        return 0.0;
    }
    p.min(MAX_PROPORTION)
}

/// Log probability mass of `r` successes in `d` trials with proportion `p`.
///
/// Returns NEG_INFINITY for impossible observations and NAN for invalid
/// inputs (`r > d`, `p` outside `[0, 1]`).
pub fn log_pmf(r: u64, d: u64, p: f64) -> f64 {
    if p.is_nan() || !(0.0..=1.0).contains(&p) || r > d {
        return f64::NAN;
    }
    let misses = d - r;
    let hit_term = if r == 0 {
        0.0
    } else if p == 0.0 {
        return f64::NEG_INFINITY;
    } else {
        r as f64 * p.ln()
    };
    let miss_term = if misses == 0 {
        0.0
    } else if p == 1.0 {
        return f64::NEG_INFINITY;
    } else {
        misses as f64 * (-p).ln_1p()
    };
    log_binomial(d, r) + hit_term + miss_term
}

/// Negative log-likelihood of `r` out of `d` under proportion `p`.
///
/// Impossible observations cost `+inf`.
pub fn neg_log_likelihood(r: u64, d: u64, p: f64) -> f64 {
    -log_pmf(r, d, p)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn pmf_matches_direct_formula() {
        // C(4,2) * 0.5^2 * 0.5^2 = 6/16
        let lp = log_pmf(2, 4, 0.5);
        assert!(approx_eq(lp, (6.0f64 / 16.0).ln(), 1e-12));
    }

    #[test]
    fn pmf_sums_to_one() {
        let d = 12;
        let p = 0.3;
        let total: f64 = (0..=d).map(|r| log_pmf(r, d, p).exp()).sum();
        assert!(approx_eq(total, 1.0, 1e-9));
    }

    #[test]
    fn degenerate_proportions() {
        assert_eq!(log_pmf(0, 10, 0.0), 0.0);
        assert_eq!(log_pmf(1, 10, 0.0), f64::NEG_INFINITY);
        assert_eq!(log_pmf(10, 10, 1.0), 0.0);
        assert_eq!(log_pmf(9, 10, 1.0), f64::NEG_INFINITY);
        assert!(neg_log_likelihood(1, 10, 0.0).is_infinite());
    }

    #[test]
    fn invalid_inputs_are_nan() {
        assert!(log_pmf(11, 10, 0.5).is_nan());
        assert!(log_pmf(1, 10, 1.5).is_nan());
        assert!(log_pmf(1, 10, f64::NAN).is_nan());
    }

    #[test]
    fn cost_is_minimized_near_observed_proportion() {
        let r = 20;
        let d = 67;
        let at_mle = neg_log_likelihood(r, d, 20.0 / 67.0);
        assert!(at_mle < neg_log_likelihood(r, d, 0.1));
        assert!(at_mle < neg_log_likelihood(r, d, 0.6));
    }

    #[test]
    fn clamp_keeps_proportion_below_one() {
        assert_eq!(clamp_proportion(1.7), MAX_PROPORTION);
        assert_eq!(clamp_proportion(-0.2), 0.0);
        assert_eq!(clamp_proportion(f64::NAN), 0.0);
        assert_eq!(clamp_proportion(0.25), 0.25);
    }
}
