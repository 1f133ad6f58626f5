//! Type-state builder for `DoseOptimizer`.
//!
//! `build()` only exists once a predictor is set. `try_build()` is always
//! available for dynamic checks and reports a typed `BuildError`.

use std::marker::PhantomData;
use std::sync::Arc;

use chlorine_traits::{Predictor, check_schema};

use crate::config::SweepCfg;
use crate::error::BuildError;
use crate::search::DoseOptimizer;

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

/// Builder for `DoseOptimizer`. Validation happens on `build()`.
pub struct OptimizerBuilder<P, S> {
    predictor: Option<Arc<P>>,
    sweep: Option<SweepCfg>,
    _s: PhantomData<S>,
}

impl<P> Default for OptimizerBuilder<P, Missing> {
    fn default() -> Self {
        Self {
            predictor: None,
            sweep: None,
            _s: PhantomData,
        }
    }
}

impl<P: Predictor> DoseOptimizer<P> {
    /// Start building an optimizer.
    pub fn builder() -> OptimizerBuilder<P, Missing> {
        OptimizerBuilder::default()
    }
}

/// Chainable setters that do not affect type-state.
impl<P, S> OptimizerBuilder<P, S> {
    pub fn with_sweep(mut self, sweep: SweepCfg) -> Self {
        self.sweep = Some(sweep);
        self
    }
}

// Setters that advance type-state
impl<P> OptimizerBuilder<P, Missing> {
    pub fn with_predictor(self, predictor: P) -> OptimizerBuilder<P, Set> {
        self.with_shared_predictor(Arc::new(predictor))
    }

    /// Use a predictor already shared with other optimizers or threads.
    pub fn with_shared_predictor(self, predictor: Arc<P>) -> OptimizerBuilder<P, Set> {
        OptimizerBuilder {
            predictor: Some(predictor),
            sweep: self.sweep,
            _s: PhantomData,
        }
    }
}

impl<P: Predictor, S> OptimizerBuilder<P, S> {
    /// Fallible build available in any type-state.
    pub fn try_build(self) -> eyre::Result<DoseOptimizer<P>> {
        let predictor = self
            .predictor
            .ok_or_else(|| eyre::Report::new(BuildError::MissingPredictor))?;

        if let Some(names) = predictor.input_schema() {
            check_schema(&names[..])
                .map_err(|m| eyre::Report::new(BuildError::SchemaMismatch(m.to_string())))?;
        }

        let sweep = self.sweep.unwrap_or_default();
        validate_sweep(&sweep).map_err(eyre::Report::new)?;

        Ok(DoseOptimizer { predictor, sweep })
    }
}

impl<P: Predictor> OptimizerBuilder<P, Set> {
    /// Validate and build. Only available once a predictor is set.
    pub fn build(self) -> eyre::Result<DoseOptimizer<P>> {
        self.try_build()
    }
}

fn validate_sweep(s: &SweepCfg) -> Result<(), BuildError> {
    s.candidate_count()
        .map(drop)
        .map_err(|e| BuildError::InvalidConfig(e.to_string()))
}
