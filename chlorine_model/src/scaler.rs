//! Fitted per-column normalization transforms.

use serde::Deserialize;

use crate::error::{ModelError, Result};

/// A fitted scaler, deserialized from its parameter dump.
///
/// - `standard`: `z = (x - mean) / scale`
/// - `min_max`: `z = x * scale + min`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scaler {
    Standard {
        #[serde(default)]
        feature_names: Option<Vec<String>>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
    MinMax {
        #[serde(default)]
        feature_names: Option<Vec<String>>,
        min: Vec<f64>,
        scale: Vec<f64>,
    },
}

impl Scaler {
    /// Identity-like standard scaler over `n` columns (mean 0, scale 1).
    pub fn identity(n: usize) -> Self {
        Self::Standard {
            feature_names: None,
            mean: vec![0.0; n],
            scale: vec![1.0; n],
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            Self::Standard { scale, .. } | Self::MinMax { scale, .. } => scale.len(),
        }
    }

    pub fn feature_names(&self) -> Option<&[String]> {
        match self {
            Self::Standard { feature_names, .. } | Self::MinMax { feature_names, .. } => {
                feature_names.as_deref()
            }
        }
    }

    /// Attach fit-time column names (used when building scalers in code).
    pub fn with_feature_names(mut self, names: Vec<String>) -> Self {
        match &mut self {
            Self::Standard { feature_names, .. } | Self::MinMax { feature_names, .. } => {
                *feature_names = Some(names);
            }
        }
        self
    }

    /// Check internal consistency; `artifact` names the scaler in errors.
    pub fn validate(&self, artifact: &'static str) -> Result<()> {
        let (offsets, scale) = match self {
            Self::Standard { mean, scale, .. } => (mean, scale),
            Self::MinMax { min, scale, .. } => (min, scale),
        };
        if scale.is_empty() {
            return Err(ModelError::invalid(artifact, "scaler has no columns"));
        }
        if offsets.len() != scale.len() {
            return Err(ModelError::invalid(
                artifact,
                format!(
                    "offset/scale length mismatch ({} vs {})",
                    offsets.len(),
                    scale.len()
                ),
            ));
        }
        if let Some(names) = self.feature_names()
            && names.len() != scale.len()
        {
            return Err(ModelError::invalid(
                artifact,
                format!(
                    "{} feature names for {} columns",
                    names.len(),
                    scale.len()
                ),
            ));
        }
        for (i, (o, s)) in offsets.iter().zip(scale).enumerate() {
            if !o.is_finite() || !s.is_finite() {
                return Err(ModelError::invalid(
                    artifact,
                    format!("non-finite parameter at column {i}"),
                ));
            }
            // Both kinds divide by `scale` in one direction.
            if *s == 0.0 {
                return Err(ModelError::invalid(
                    artifact,
                    format!("zero scale at column {i}"),
                ));
            }
        }
        Ok(())
    }

    /// Forward transform of one row.
    pub fn transform(&self, x: &[f64]) -> Result<Vec<f64>> {
        let n = self.n_features();
        if x.len() != n {
            return Err(ModelError::DimensionMismatch {
                expected: n,
                got: x.len(),
            });
        }
        if let Some(index) = x.iter().position(|v| !v.is_finite()) {
            return Err(ModelError::NonFiniteInput { index });
        }
        let out = match self {
            Self::Standard { mean, scale, .. } => x
                .iter()
                .zip(mean.iter().zip(scale))
                .map(|(v, (m, s))| (v - m) / s)
                .collect(),
            Self::MinMax { min, scale, .. } => x
                .iter()
                .zip(min.iter().zip(scale))
                .map(|(v, (m, s))| v * s + m)
                .collect(),
        };
        Ok(out)
    }

    /// Inverse transform of a single-column value (target scalers).
    pub fn inverse_scalar(&self, z: f64) -> Result<f64> {
        let n = self.n_features();
        if n != 1 {
            return Err(ModelError::DimensionMismatch {
                expected: n,
                got: 1,
            });
        }
        Ok(match self {
            Self::Standard { mean, scale, .. } => z * scale[0] + mean[0],
            Self::MinMax { min, scale, .. } => (z - min[0]) / scale[0],
        })
    }
}
