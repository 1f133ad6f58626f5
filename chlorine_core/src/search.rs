//! Bounded exhaustive dose search.
//!
//! The optimizer evaluates every candidate dose on an inclusive grid through
//! the predictor and keeps the first candidate with the smallest absolute
//! deviation from the target. A baseline prediction at the reading's own dose
//! is taken once, independent of the sweep.

use std::sync::Arc;

use chlorine_traits::Predictor;

use crate::config::SweepCfg;
use crate::error::{ChlorineError, Result};
use crate::features::FeatureVector;
use crate::pred_error::map_predictor_error;
use crate::util::candidate_count;

/// One evaluated dose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub dose: f64,
    /// Predicted residual chlorine, mg/L.
    pub predicted: f64,
    /// `|predicted - target|`
    pub error: f64,
}

impl Candidate {
    pub fn new(dose: f64, predicted: f64, target: f64) -> Self {
        Self {
            dose,
            predicted,
            error: (predicted - target).abs(),
        }
    }
}

/// Raw search result before output sanitization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome {
    /// Prediction at the reading's own dose.
    pub baseline: f64,
    pub best: Candidate,
    /// Candidates evaluated (excludes the baseline call).
    pub evaluated: usize,
}

/// Ascending candidate doses `min(dose_min + i * step, dose_max)`; the last
/// one is always exactly `dose_max`.
#[derive(Debug, Clone)]
pub struct CandidateDoses {
    dose_min: f64,
    dose_max: f64,
    step: f64,
    next: usize,
    count: usize,
}

impl Iterator for CandidateDoses {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.next >= self.count {
            return None;
        }
        let i = self.next;
        self.next += 1;
        if self.next == self.count {
            return Some(self.dose_max);
        }
        Some((self.dose_min + i as f64 * self.step).min(self.dose_max))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.count - self.next;
        (n, Some(n))
    }
}

impl ExactSizeIterator for CandidateDoses {}

/// Candidate grid for an inclusive sweep. Generated by integer counting, so
/// the last value is exactly `dose_max` and never beyond it.
pub fn candidate_doses(dose_min: f64, dose_max: f64, step: f64) -> Result<CandidateDoses> {
    let cfg = SweepCfg {
        dose_min,
        dose_max,
        step,
        target: 0.0,
    };
    cfg.validate()?;
    Ok(CandidateDoses {
        dose_min,
        dose_max,
        step,
        next: 0,
        count: candidate_count(dose_max - dose_min, step)?,
    })
}

/// `true` when `candidate` strictly beats `best`. NaN never beats anything;
/// anything that is not NaN beats a NaN best.
#[inline]
fn improves(candidate: f64, best: f64) -> bool {
    if candidate.is_nan() {
        return false;
    }
    best.is_nan() || candidate < best
}

/// Left-to-right scan keeping the first candidate with minimal error.
///
/// Ties keep the earlier candidate, so for an ascending sweep the smallest
/// dose among equally good candidates wins.
pub fn select_first_min<I>(candidates: I) -> Option<Candidate>
where
    I: IntoIterator<Item = Candidate>,
{
    candidates.into_iter().fold(None, keep_first_min)
}

/// One reduction step of `select_first_min`.
#[inline]
fn keep_first_min(best: Option<Candidate>, c: Candidate) -> Option<Candidate> {
    match best {
        Some(b) if !improves(c.error, b.error) => Some(b),
        _ => Some(c),
    }
}

/// Dose optimizer over a shared, read-only predictor.
pub struct DoseOptimizer<P> {
    pub(crate) predictor: Arc<P>,
    pub(crate) sweep: SweepCfg,
}

impl<P> core::fmt::Debug for DoseOptimizer<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DoseOptimizer")
            .field("sweep", &self.sweep)
            .finish_non_exhaustive()
    }
}

impl<P> Clone for DoseOptimizer<P> {
    fn clone(&self) -> Self {
        Self {
            predictor: Arc::clone(&self.predictor),
            sweep: self.sweep,
        }
    }
}

impl<P: Predictor> DoseOptimizer<P> {
    /// Sweep policy used by `optimize`.
    pub fn sweep_cfg(&self) -> &SweepCfg {
        &self.sweep
    }

    /// Shared handle to the backing predictor.
    pub fn predictor(&self) -> &Arc<P> {
        &self.predictor
    }

    fn predict(&self, v: &FeatureVector) -> Result<f64> {
        self.predictor
            .predict_physical(v.as_slice())
            .map_err(|e| ChlorineError::Prediction(map_predictor_error(&*e)))
    }

    /// Prediction for the vector exactly as given (no dose override).
    pub fn baseline(&self, v: &FeatureVector) -> Result<f64> {
        self.predict(v)
    }

    /// Evaluate a single candidate dose against `target`.
    pub fn evaluate(&self, v: &FeatureVector, dose: f64, target: f64) -> Result<Candidate> {
        let predicted = self.predict(&v.with_dose(dose))?;
        tracing::trace!(dose, predicted, "candidate evaluated");
        Ok(Candidate::new(dose, predicted, target))
    }

    /// Evaluate every candidate of `cfg` in ascending dose order.
    ///
    /// Aborts on the first predictor failure; no partial list is returned.
    pub fn sweep(&self, v: &FeatureVector, cfg: &SweepCfg) -> Result<Vec<Candidate>> {
        cfg.validate()?;
        candidate_doses(cfg.dose_min, cfg.dose_max, cfg.step)?
            .map(|dose| self.evaluate(v, dose, cfg.target))
            .collect()
    }

    /// Like `optimize_with`, but also returns every evaluated candidate in
    /// sweep order. Each candidate is evaluated once.
    pub fn optimize_traced(
        &self,
        v: &FeatureVector,
        cfg: &SweepCfg,
    ) -> Result<(SearchOutcome, Vec<Candidate>)> {
        cfg.validate()?;
        let baseline = self.predict(v)?;
        let candidates = self.sweep(v, cfg)?;
        let best = select_first_min(candidates.iter().copied())
            .ok_or_else(|| ChlorineError::InvalidRange("empty sweep".into()))?;
        let outcome = SearchOutcome {
            baseline,
            best,
            evaluated: candidates.len(),
        };
        Ok((outcome, candidates))
    }

    /// Search with the optimizer's configured sweep.
    pub fn optimize(&self, v: &FeatureVector) -> Result<SearchOutcome> {
        let cfg = self.sweep;
        self.optimize_with(v, cfg.dose_min, cfg.dose_max, cfg.step, cfg.target)
    }

    /// Search `[dose_min, dose_max]` in increments of `step` for the dose whose
    /// prediction is closest to `target`.
    ///
    /// Range preconditions are checked before any predictor call.
    pub fn optimize_with(
        &self,
        v: &FeatureVector,
        dose_min: f64,
        dose_max: f64,
        step: f64,
        target: f64,
    ) -> Result<SearchOutcome> {
        let cfg = SweepCfg {
            dose_min,
            dose_max,
            step,
            target,
        };
        cfg.validate()?;
        let doses = candidate_doses(dose_min, dose_max, step)?;
        let evaluated = doses.len();

        let baseline = self.predict(v)?;

        let best = doses
            .map(|dose| self.evaluate(v, dose, target))
            .try_fold(None, |best, c| c.map(|c| keep_first_min(best, c)))?
            .ok_or_else(|| ChlorineError::InvalidRange("empty sweep".into()))?;

        tracing::debug!(
            current_dose = v.dose(),
            baseline,
            optimal_dose = best.dose,
            predicted = best.predicted,
            error = best.error,
            evaluated,
            "dose search complete"
        );
        Ok(SearchOutcome {
            baseline,
            best,
            evaluated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn default_grid_is_inclusive_and_exact() {
        let doses: Vec<f64> = candidate_doses(4.0, 9.5, 0.05).unwrap().collect();
        assert_eq!(doses.len(), 111);
        assert_eq!(doses[0], 4.0);
        assert_eq!(*doses.last().unwrap(), 9.5);
        assert!(doses.windows(2).all(|w| w[0] < w[1]));
        assert!(doses.iter().all(|d| *d <= 9.5));
    }

    #[test]
    fn uneven_grid_clamps_last_value() {
        let doses: Vec<f64> = candidate_doses(1.0, 2.0, 0.3).unwrap().collect();
        assert_eq!(doses.len(), 5);
        assert_eq!(doses[4], 2.0);
        assert!((doses[3] - 1.9).abs() < 1e-12);
    }

    #[test]
    fn degenerate_grid_has_one_value() {
        let doses: Vec<f64> = candidate_doses(5.0, 5.0, 0.05).unwrap().collect();
        assert_eq!(doses, vec![5.0]);
    }

    #[rstest]
    #[case(9.5, 4.0, 0.05)]
    #[case(4.0, 9.5, 0.0)]
    #[case(4.0, 9.5, -0.1)]
    #[case(f64::NAN, 9.5, 0.05)]
    #[case(4.0, f64::INFINITY, 0.05)]
    fn invalid_ranges(#[case] lo: f64, #[case] hi: f64, #[case] step: f64) {
        assert!(matches!(
            candidate_doses(lo, hi, step),
            Err(ChlorineError::InvalidRange(_))
        ));
    }

    #[test]
    fn first_min_wins_ties() {
        let cs = [
            Candidate::new(1.0, 0.7, 0.5),
            Candidate::new(2.0, 0.4, 0.5),
            Candidate::new(3.0, 0.6, 0.5),
            Candidate::new(4.0, 0.4, 0.5),
        ];
        let best = select_first_min(cs).unwrap();
        assert_eq!(best.dose, 2.0);
    }

    #[test]
    fn nan_errors_never_win_over_numbers() {
        let cs = [
            Candidate::new(1.0, f64::NAN, 0.5),
            Candidate::new(2.0, 3.0, 0.5),
            Candidate::new(3.0, f64::NAN, 0.5),
        ];
        assert_eq!(select_first_min(cs).unwrap().dose, 2.0);
    }

    #[test]
    fn all_nan_keeps_first() {
        let cs = [
            Candidate::new(1.0, f64::NAN, 0.5),
            Candidate::new(2.0, f64::NAN, 0.5),
        ];
        assert_eq!(select_first_min(cs).unwrap().dose, 1.0);
    }

    #[test]
    fn empty_selection_is_none() {
        assert!(select_first_min(std::iter::empty()).is_none());
    }

    #[test]
    fn candidate_error_is_absolute() {
        assert_eq!(Candidate::new(5.0, 0.25, 0.5).error, 0.25);
        assert_eq!(Candidate::new(5.0, 0.75, 0.5).error, 0.25);
    }
}
