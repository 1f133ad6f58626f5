//! Configuration types for the dose optimizer.
//!
//! These are the runtime configuration structs used by `DoseOptimizer`.
//! They are separate from the TOML-deserialized config in `chlorine_config`.

use crate::error::{ChlorineError, Result};
use crate::util::candidate_count;

/// Candidate sweep policy (mg/L).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepCfg {
    /// Lowest candidate dose.
    pub dose_min: f64,
    /// Highest candidate dose (inclusive, never exceeded).
    pub dose_max: f64,
    /// Spacing between consecutive candidates.
    pub step: f64,
    /// Residual chlorine setpoint.
    pub target: f64,
}

impl Default for SweepCfg {
    fn default() -> Self {
        Self {
            dose_min: 4.0,
            dose_max: 9.5,
            step: 0.05,
            target: 0.5,
        }
    }
}

impl SweepCfg {
    /// Check sweep preconditions: finite values, `dose_min <= dose_max`, `step > 0`.
    pub fn validate(&self) -> Result<()> {
        if !(self.dose_min.is_finite()
            && self.dose_max.is_finite()
            && self.step.is_finite()
            && self.target.is_finite())
        {
            return Err(ChlorineError::InvalidRange(
                "sweep values must be finite".into(),
            ));
        }
        if self.dose_min > self.dose_max {
            return Err(ChlorineError::InvalidRange(format!(
                "dose_min {} > dose_max {}",
                self.dose_min, self.dose_max
            )));
        }
        if self.step <= 0.0 {
            return Err(ChlorineError::InvalidRange(format!(
                "step {} must be > 0",
                self.step
            )));
        }
        if self.dose_min < 0.0 {
            return Err(ChlorineError::InvalidRange(format!(
                "dose_min {} must be >= 0",
                self.dose_min
            )));
        }
        if self.target < 0.0 {
            return Err(ChlorineError::InvalidRange(format!(
                "target {} must be >= 0",
                self.target
            )));
        }
        Ok(())
    }

    /// Number of candidates the sweep evaluates.
    pub fn candidate_count(&self) -> Result<usize> {
        self.validate()?;
        candidate_count(self.dose_max - self.dose_min, self.step)
    }
}

/// Inclusive bounds for one reading field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }
}

/// Accepted reading ranges. Defaults are the documented sensor envelope.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    pub dose: Bounds,
    pub flow: Bounds,
    pub orp: Bounds,
    pub turbidity: Bounds,
    pub ph: Bounds,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            dose: Bounds::new(5.0, 9.0),
            flow: Bounds::new(5.0, 15.0),
            orp: Bounds::new(300.0, 400.0),
            turbidity: Bounds::new(5.0, 100.0),
            ph: Bounds::new(5.0, 15.0),
        }
    }
}
