#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Artifact-backed residual chlorine predictor.
//!
//! Three pre-trained artifacts are loaded once from JSON parameter dumps:
//! an input scaler, a regressor and an output scaler. `ArtifactPredictor`
//! validates their shapes and the input column order at construction and is
//! immutable afterwards, so one instance can be shared across threads.

pub mod error;
pub mod regressor;
pub mod scaler;

use std::path::Path;

use chlorine_traits::{BoxError, FEATURE_COUNT, Predictor, check_schema};
use serde::de::DeserializeOwned;

pub use error::{ModelError, Result};
pub use regressor::{Activation, Regressor};
pub use scaler::Scaler;

/// Read and deserialize one JSON artifact.
pub fn read_artifact<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ModelError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Clone)]
pub struct ArtifactPredictor {
    input: Scaler,
    model: Regressor,
    output: Scaler,
}

impl ArtifactPredictor {
    /// Validate and assemble a predictor from already parsed artifacts.
    ///
    /// Fails when the input scaler does not record its fit-time column names,
    /// when those names differ from `FEATURE_SCHEMA` in any position, or when
    /// the three artifacts disagree on widths.
    pub fn new(input: Scaler, model: Regressor, output: Scaler) -> Result<Self> {
        input.validate("input scaler")?;
        model.validate()?;
        output.validate("output scaler")?;

        let names = input.feature_names().ok_or_else(|| {
            ModelError::invalid(
                "input scaler",
                "feature_names are required to verify column order",
            )
        })?;
        check_schema(names)?;

        if input.n_features() != FEATURE_COUNT {
            return Err(ModelError::DimensionMismatch {
                expected: FEATURE_COUNT,
                got: input.n_features(),
            });
        }
        if model.n_inputs() != FEATURE_COUNT {
            return Err(ModelError::invalid(
                "model",
                format!(
                    "model consumes {} features, scaler produces {FEATURE_COUNT}",
                    model.n_inputs()
                ),
            ));
        }
        if output.n_features() != 1 {
            return Err(ModelError::invalid(
                "output scaler",
                format!("expected 1 column, got {}", output.n_features()),
            ));
        }
        Ok(Self {
            input,
            model,
            output,
        })
    }

    /// Load the three artifacts from disk.
    pub fn load(model: &Path, input_scaler: &Path, output_scaler: &Path) -> Result<Self> {
        let input: Scaler = read_artifact(input_scaler)?;
        let regressor: Regressor = read_artifact(model)?;
        let output: Scaler = read_artifact(output_scaler)?;
        let p = Self::new(input, regressor, output)?;
        tracing::info!(
            model = %model.display(),
            input_scaler = %input_scaler.display(),
            output_scaler = %output_scaler.display(),
            kind = p.model_kind(),
            "model artifacts loaded"
        );
        Ok(p)
    }

    /// Short name of the regressor kind, for logs and self-check output.
    pub fn model_kind(&self) -> &'static str {
        match self.model {
            Regressor::Linear { .. } => "linear",
            Regressor::Mlp { .. } => "mlp",
        }
    }
}

impl Predictor for ArtifactPredictor {
    fn scale(&self, features: &[f64]) -> std::result::Result<Vec<f64>, BoxError> {
        Ok(self.input.transform(features)?)
    }

    fn predict(&self, scaled: &[f64]) -> std::result::Result<f64, BoxError> {
        Ok(self.model.predict(scaled)?)
    }

    fn unscale(&self, scaled: f64) -> std::result::Result<f64, BoxError> {
        Ok(self.output.inverse_scalar(scaled)?)
    }

    fn input_schema(&self) -> Option<Vec<String>> {
        self.input.feature_names().map(<[String]>::to_vec)
    }
}
