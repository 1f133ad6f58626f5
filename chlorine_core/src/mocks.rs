//! Test and helper predictors for chlorine_core.

use std::sync::atomic::{AtomicUsize, Ordering};

use chlorine_traits::{BoxError, DOSE_INDEX, FEATURE_COUNT, FEATURE_SCHEMA, Predictor};

use crate::error::PredictionError;

/// Predictor whose output depends only on the dose column: `f(dose)`.
///
/// Scaling is the identity in both directions, so `predict_physical`
/// returns `f` unchanged.
pub struct FnPredictor<F> {
    f: F,
}

impl<F: Fn(f64) -> f64> FnPredictor<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F: Fn(f64) -> f64> Predictor for FnPredictor<F> {
    fn scale(&self, features: &[f64]) -> Result<Vec<f64>, BoxError> {
        if features.len() != FEATURE_COUNT {
            return Err(Box::new(PredictionError::DimensionMismatch {
                expected: FEATURE_COUNT,
                got: features.len(),
            }));
        }
        Ok(features.to_vec())
    }

    fn predict(&self, scaled: &[f64]) -> Result<f64, BoxError> {
        let dose = scaled.get(DOSE_INDEX).copied().ok_or_else(|| {
            Box::new(PredictionError::DimensionMismatch {
                expected: FEATURE_COUNT,
                got: scaled.len(),
            })
        })?;
        Ok((self.f)(dose))
    }

    fn unscale(&self, scaled: f64) -> Result<f64, BoxError> {
        Ok(scaled)
    }

    fn input_schema(&self) -> Option<Vec<String>> {
        Some(FEATURE_SCHEMA.iter().map(|s| (*s).to_string()).collect())
    }
}

/// Wraps a predictor and counts `predict_physical` calls.
pub struct CountingPredictor<P> {
    inner: P,
    calls: AtomicUsize,
}

impl<P> CountingPredictor<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of full predictions requested so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl<P: Predictor> Predictor for CountingPredictor<P> {
    fn scale(&self, features: &[f64]) -> Result<Vec<f64>, BoxError> {
        self.inner.scale(features)
    }
    fn predict(&self, scaled: &[f64]) -> Result<f64, BoxError> {
        self.inner.predict(scaled)
    }
    fn unscale(&self, scaled: f64) -> Result<f64, BoxError> {
        self.inner.unscale(scaled)
    }
    fn input_schema(&self) -> Option<Vec<String>> {
        self.inner.input_schema()
    }
    fn predict_physical(&self, features: &[f64]) -> Result<f64, BoxError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.inner.predict_physical(features)
    }
}

/// Returns `value` for the first `ok_calls` predictions, then fails.
pub struct FailingPredictor {
    value: f64,
    ok_calls: usize,
    calls: AtomicUsize,
}

impl FailingPredictor {
    pub fn new(value: f64, ok_calls: usize) -> Self {
        Self {
            value,
            ok_calls,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Predictor for FailingPredictor {
    fn scale(&self, features: &[f64]) -> Result<Vec<f64>, BoxError> {
        Ok(features.to_vec())
    }

    fn predict(&self, _scaled: &[f64]) -> Result<f64, BoxError> {
        let n = self.calls.fetch_add(1, Ordering::Relaxed);
        if n >= self.ok_calls {
            return Err(Box::new(std::io::Error::other("model backend unavailable")));
        }
        Ok(self.value)
    }

    fn unscale(&self, scaled: f64) -> Result<f64, BoxError> {
        Ok(scaled)
    }
}
