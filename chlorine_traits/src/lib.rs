pub mod schema;

pub use schema::{
    DOSE_INDEX, FEATURE_COUNT, FEATURE_SCHEMA, HISTORIAN_SCHEMA, SchemaMismatch, check_schema,
};

/// Error type used at the predictor trait boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Capability contract for a pre-trained residual chlorine model.
///
/// Implementations hold immutable state only: every method takes `&self` and
/// one instance may be shared across threads for the lifetime of the process.
pub trait Predictor {
    /// Normalize a raw feature vector (columns in `FEATURE_SCHEMA` order).
    fn scale(&self, features: &[f64]) -> Result<Vec<f64>, BoxError>;

    /// Run the regressor on an already scaled vector; returns a scaled target.
    fn predict(&self, scaled: &[f64]) -> Result<f64, BoxError>;

    /// Map a scaled target back to physical units (mg/L).
    fn unscale(&self, scaled: f64) -> Result<f64, BoxError>;

    /// Column names the input scaler was fit with, if the backing artifacts
    /// record them. `None` skips the schema check.
    fn input_schema(&self) -> Option<Vec<String>> {
        None
    }

    /// `unscale(predict(scale(features)))`
    fn predict_physical(&self, features: &[f64]) -> Result<f64, BoxError> {
        let scaled = self.scale(features)?;
        let y = self.predict(&scaled)?;
        self.unscale(y)
    }
}

impl<P: Predictor + ?Sized> Predictor for Box<P> {
    fn scale(&self, features: &[f64]) -> Result<Vec<f64>, BoxError> {
        (**self).scale(features)
    }
    fn predict(&self, scaled: &[f64]) -> Result<f64, BoxError> {
        (**self).predict(scaled)
    }
    fn unscale(&self, scaled: f64) -> Result<f64, BoxError> {
        (**self).unscale(scaled)
    }
    fn input_schema(&self) -> Option<Vec<String>> {
        (**self).input_schema()
    }
    fn predict_physical(&self, features: &[f64]) -> Result<f64, BoxError> {
        (**self).predict_physical(features)
    }
}

impl<P: Predictor + ?Sized> Predictor for std::sync::Arc<P> {
    fn scale(&self, features: &[f64]) -> Result<Vec<f64>, BoxError> {
        (**self).scale(features)
    }
    fn predict(&self, scaled: &[f64]) -> Result<f64, BoxError> {
        (**self).predict(scaled)
    }
    fn unscale(&self, scaled: f64) -> Result<f64, BoxError> {
        (**self).unscale(scaled)
    }
    fn input_schema(&self) -> Option<Vec<String>> {
        (**self).input_schema()
    }
    fn predict_physical(&self, features: &[f64]) -> Result<f64, BoxError> {
        (**self).predict_physical(features)
    }
}
