//! Output record and the sanitization boundary.

use crate::search::SearchOutcome;
use crate::util::finite_or;

/// Value substituted for any non-finite output field.
pub const SANITIZED_DEFAULT: f64 = 0.0;

/// Caller-facing optimization result. Every field is finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizationResult {
    /// Predicted residual chlorine at the reading's own dose.
    pub predicted_at_current_dose: f64,
    pub optimal_dose: f64,
    pub predicted_at_optimal_dose: f64,
    pub error_at_optimal: f64,
}

impl OptimizationResult {
    /// Assemble the result, replacing NaN/inf fields with `SANITIZED_DEFAULT`.
    pub fn finalize(outcome: &SearchOutcome) -> Self {
        let fields = [
            ("predicted_at_current_dose", outcome.baseline),
            ("optimal_dose", outcome.best.dose),
            ("predicted_at_optimal_dose", outcome.best.predicted),
            ("error_at_optimal", outcome.best.error),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                tracing::warn!(field, value, "non-finite result field replaced");
            }
        }
        Self {
            predicted_at_current_dose: finite_or(outcome.baseline, SANITIZED_DEFAULT),
            optimal_dose: finite_or(outcome.best.dose, SANITIZED_DEFAULT),
            predicted_at_optimal_dose: finite_or(outcome.best.predicted, SANITIZED_DEFAULT),
            error_at_optimal: finite_or(outcome.best.error, SANITIZED_DEFAULT),
        }
    }
}

/// Free-function form of `OptimizationResult::finalize`.
pub fn finalize(outcome: &SearchOutcome) -> OptimizationResult {
    OptimizationResult::finalize(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::Candidate;

    fn outcome(baseline: f64, dose: f64, predicted: f64) -> SearchOutcome {
        SearchOutcome {
            baseline,
            best: Candidate::new(dose, predicted, 0.5),
            evaluated: 1,
        }
    }

    #[test]
    fn finite_values_pass_through() {
        let r = finalize(&outcome(0.62, 6.3, 0.51));
        assert_eq!(r.predicted_at_current_dose, 0.62);
        assert_eq!(r.optimal_dose, 6.3);
        assert_eq!(r.predicted_at_optimal_dose, 0.51);
        assert!((r.error_at_optimal - 0.01).abs() < 1e-12);
    }

    #[test]
    fn nan_and_inf_become_zero() {
        let r = finalize(&outcome(f64::INFINITY, 6.3, f64::NAN));
        assert_eq!(r.predicted_at_current_dose, 0.0);
        assert_eq!(r.optimal_dose, 6.3);
        assert_eq!(r.predicted_at_optimal_dose, 0.0);
        assert_eq!(r.error_at_optimal, 0.0);
    }

    #[test]
    fn negative_infinity_error_is_sanitized() {
        let r = finalize(&outcome(0.5, 5.0, f64::NEG_INFINITY));
        // |-inf - 0.5| = inf
        assert_eq!(r.error_at_optimal, 0.0);
        assert_eq!(r.predicted_at_optimal_dose, 0.0);
    }
}
