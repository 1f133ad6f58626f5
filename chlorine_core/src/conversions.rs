//! `From` implementations bridging `chlorine_config` types to `chlorine_core` types.

use chlorine_config::{FieldRange, ReadingRecord};

use crate::config::{Bounds, Limits, SweepCfg};
use crate::error::ChlorineError;
use crate::reading::Reading;

// ── SweepCfg ─────────────────────────────────────────────────────────────────

impl From<&chlorine_config::SweepCfg> for SweepCfg {
    fn from(c: &chlorine_config::SweepCfg) -> Self {
        Self {
            dose_min: c.dose_min,
            dose_max: c.dose_max,
            step: c.step,
            target: c.target,
        }
    }
}

// ── Limits ───────────────────────────────────────────────────────────────────

impl From<FieldRange> for Bounds {
    fn from(r: FieldRange) -> Self {
        Self::new(r.min, r.max)
    }
}

impl From<&chlorine_config::Limits> for Limits {
    fn from(c: &chlorine_config::Limits) -> Self {
        Self {
            dose: c.dose.into(),
            flow: c.flow.into(),
            orp: c.orp.into(),
            turbidity: c.turbidity.into(),
            ph: c.ph.into(),
        }
    }
}

// ── Reading ──────────────────────────────────────────────────────────────────

impl TryFrom<&ReadingRecord> for Reading {
    type Error = ChlorineError;

    fn try_from(r: &ReadingRecord) -> Result<Self, Self::Error> {
        Reading::from_parts(r.dose, r.flow, r.orp, r.turbidity, r.ph, &r.date, &r.time)
    }
}
