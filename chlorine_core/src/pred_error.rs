//! Maps `Box<dyn Error>` from the predictor trait boundary to `PredictionError`.
//!
//! The `Predictor` trait uses `Box<dyn Error + Send + Sync>` so any model
//! backend can plug in; this module converts those to the typed enum, with an
//! optional feature-gated path for `chlorine_model::ModelError` downcasting.

use crate::error::PredictionError;

/// Map a trait-boundary error to a typed `PredictionError`.
///
/// Attempts to downcast known model error types first, then falls back to
/// wrapping the message.
pub fn map_predictor_error(e: &(dyn std::error::Error + 'static)) -> PredictionError {
    if let Some(p) = e.downcast_ref::<PredictionError>() {
        return p.clone();
    }

    // Feature-gated: try to downcast to ModelError for precise mapping
    #[cfg(feature = "model-errors")]
    {
        use chlorine_model::ModelError;
        if let Some(m) = e.downcast_ref::<ModelError>() {
            return match m {
                ModelError::DimensionMismatch { expected, got } => {
                    PredictionError::DimensionMismatch {
                        expected: *expected,
                        got: *got,
                    }
                }
                ModelError::NonFiniteInput { index } => {
                    PredictionError::NonFiniteInput { index: *index }
                }
                ModelError::Schema(s) => PredictionError::SchemaMismatch(s.to_string()),
                other => PredictionError::Model(other.to_string()),
            };
        }
    }

    if let Some(s) = e.downcast_ref::<chlorine_traits::SchemaMismatch>() {
        return PredictionError::SchemaMismatch(s.to_string());
    }
    PredictionError::Model(e.to_string())
}
