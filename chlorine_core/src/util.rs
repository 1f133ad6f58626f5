//! Small numeric helpers shared by the search and result stages.

use crate::error::{ChlorineError, Result};

/// Quotients this close to an integer count as that integer when sizing a
/// sweep, so `(9.5 - 4.0) / 0.05` yields 110 steps rather than 111.
pub const COUNT_TOLERANCE: f64 = 1e-9;

/// Hard cap on candidates per sweep.
pub const MAX_CANDIDATES: usize = chlorine_config::MAX_SWEEP_CANDIDATES;

/// Return `x` when finite, otherwise `default`.
#[inline]
pub fn finite_or(x: f64, default: f64) -> f64 {
    if x.is_finite() { x } else { default }
}

/// Number of candidates for an inclusive sweep of width `span`:
/// `ceil(span / step) + 1`, with near-integer quotients snapped.
///
/// Callers validate `span >= 0` and `step > 0` first.
pub fn candidate_count(span: f64, step: f64) -> Result<usize> {
    let q = span / step;
    if !q.is_finite() || q < 0.0 {
        return Err(ChlorineError::InvalidRange(format!(
            "cannot size sweep of width {span} with step {step}"
        )));
    }
    let nearest = q.round();
    let steps = if (q - nearest).abs() <= COUNT_TOLERANCE * nearest.max(1.0) {
        nearest
    } else {
        q.ceil()
    };
    if steps >= MAX_CANDIDATES as f64 {
        return Err(ChlorineError::InvalidRange(format!(
            "sweep has too many candidates (>{MAX_CANDIDATES})"
        )));
    }
    Ok(steps as usize + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(5.5, 0.05, 111)]
    #[case(0.0, 0.05, 1)]
    #[case(1.0, 0.3, 5)] // 0, .3, .6, .9, 1.0 (clamped)
    #[case(0.3, 0.1, 4)] // 0.3/0.1 = 2.9999999999999996
    #[case(1.0, 2.0, 2)]
    fn counts(#[case] span: f64, #[case] step: f64, #[case] want: usize) {
        assert_eq!(candidate_count(span, step).unwrap(), want);
    }

    #[test]
    fn refuses_absurd_sweeps() {
        assert!(candidate_count(10.0, 1e-9).is_err());
    }

    #[test]
    fn cap_is_inclusive_of_max_candidates() {
        assert_eq!(
            candidate_count((MAX_CANDIDATES - 1) as f64, 1.0).unwrap(),
            MAX_CANDIDATES
        );
        assert!(candidate_count(MAX_CANDIDATES as f64, 1.0).is_err());
    }

    #[test]
    fn finite_or_replaces_only_non_finite() {
        assert_eq!(finite_or(1.5, 0.0), 1.5);
        assert_eq!(finite_or(-0.0, 7.0), -0.0);
        assert_eq!(finite_or(f64::NAN, 0.0), 0.0);
        assert_eq!(finite_or(f64::INFINITY, 0.0), 0.0);
        assert_eq!(finite_or(f64::NEG_INFINITY, 0.0), 0.0);
    }
}
