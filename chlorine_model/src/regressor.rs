//! Regression models evaluated on scaled feature rows.

use serde::Deserialize;

use crate::error::{ModelError, Result};

/// Hidden-layer activation for `Regressor::Mlp`. The output layer is identity.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    #[default]
    Relu,
    Tanh,
    Logistic,
    Identity,
}

impl Activation {
    #[inline]
    fn apply(self, x: f64) -> f64 {
        match self {
            Self::Relu => x.max(0.0),
            Self::Tanh => x.tanh(),
            Self::Logistic => 1.0 / (1.0 + (-x).exp()),
            Self::Identity => x,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Regressor {
    /// `y = coef . x + intercept`
    Linear { coef: Vec<f64>, intercept: f64 },
    /// Dense feed-forward network. `weights[l]` is `n_in x n_out` (row per input).
    Mlp {
        weights: Vec<Vec<Vec<f64>>>,
        biases: Vec<Vec<f64>>,
        #[serde(default)]
        activation: Activation,
    },
}

impl Regressor {
    /// Number of input columns the model consumes.
    pub fn n_inputs(&self) -> usize {
        match self {
            Self::Linear { coef, .. } => coef.len(),
            Self::Mlp { weights, .. } => weights.first().map_or(0, Vec::len),
        }
    }

    pub fn validate(&self) -> Result<()> {
        const ARTIFACT: &str = "model";
        match self {
            Self::Linear { coef, intercept } => {
                if coef.is_empty() {
                    return Err(ModelError::invalid(ARTIFACT, "linear model has no coefficients"));
                }
                if !intercept.is_finite() || coef.iter().any(|c| !c.is_finite()) {
                    return Err(ModelError::invalid(ARTIFACT, "non-finite linear parameter"));
                }
            }
            Self::Mlp {
                weights, biases, ..
            } => {
                if weights.is_empty() {
                    return Err(ModelError::invalid(ARTIFACT, "mlp has no layers"));
                }
                if weights.len() != biases.len() {
                    return Err(ModelError::invalid(
                        ARTIFACT,
                        format!("{} weight layers but {} bias layers", weights.len(), biases.len()),
                    ));
                }
                let mut width = self.n_inputs();
                if width == 0 {
                    return Err(ModelError::invalid(ARTIFACT, "mlp first layer has no inputs"));
                }
                for (l, (w, b)) in weights.iter().zip(biases).enumerate() {
                    if w.len() != width {
                        return Err(ModelError::invalid(
                            ARTIFACT,
                            format!("layer {l} expects {} inputs, previous layer has {width}", w.len()),
                        ));
                    }
                    let n_out = b.len();
                    if n_out == 0 || w.iter().any(|row| row.len() != n_out) {
                        return Err(ModelError::invalid(
                            ARTIFACT,
                            format!("layer {l} weight rows do not match {n_out} biases"),
                        ));
                    }
                    if b.iter().chain(w.iter().flatten()).any(|v| !v.is_finite()) {
                        return Err(ModelError::invalid(
                            ARTIFACT,
                            format!("non-finite parameter in layer {l}"),
                        ));
                    }
                    width = n_out;
                }
                if width != 1 {
                    return Err(ModelError::invalid(
                        ARTIFACT,
                        format!("mlp must end in a single output, got {width}"),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Evaluate on one scaled row. Non-finite outputs are returned as-is.
    pub fn predict(&self, x: &[f64]) -> Result<f64> {
        let n = self.n_inputs();
        if x.len() != n {
            return Err(ModelError::DimensionMismatch {
                expected: n,
                got: x.len(),
            });
        }
        if let Some(index) = x.iter().position(|v| !v.is_finite()) {
            return Err(ModelError::NonFiniteInput { index });
        }
        match self {
            Self::Linear { coef, intercept } => {
                Ok(coef.iter().zip(x).map(|(c, v)| c * v).sum::<f64>() + intercept)
            }
            Self::Mlp {
                weights,
                biases,
                activation,
            } => {
                let last = weights.len().saturating_sub(1);
                let mut a: Vec<f64> = x.to_vec();
                for (l, (w, b)) in weights.iter().zip(biases).enumerate() {
                    let mut z = b.clone();
                    for (xi, row) in a.iter().zip(w) {
                        for (zj, wij) in z.iter_mut().zip(row) {
                            *zj += xi * wij;
                        }
                    }
                    if l < last {
                        z.iter_mut().for_each(|v| *v = activation.apply(*v));
                    }
                    a = z;
                }
                a.first().copied().ok_or_else(|| ModelError::DimensionMismatch {
                    expected: 1,
                    got: 0,
                })
            }
        }
    }
}
