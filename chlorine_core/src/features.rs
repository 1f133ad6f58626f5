//! Feature vector construction.
//!
//! A reading becomes 12 columns in `FEATURE_SCHEMA` order: the five process
//! values, sine/cosine pairs for hour (period 24), weekday (period 7,
//! Monday = 0) and month (period 12, January = 1), then the raw year.

use chrono::{Datelike, NaiveDateTime, Timelike};
use chlorine_traits::{DOSE_INDEX, FEATURE_COUNT, FEATURE_SCHEMA};
use std::f64::consts::TAU;

use crate::reading::Reading;

pub const HOUR_PERIOD: f64 = 24.0;
pub const WEEKDAY_PERIOD: f64 = 7.0;
pub const MONTH_PERIOD: f64 = 12.0;

/// `(sin(2*pi*value/period), cos(2*pi*value/period))`
#[inline]
pub fn cyclical(value: f64, period: f64) -> (f64, f64) {
    let angle = TAU * value / period;
    (angle.sin(), angle.cos())
}

/// Calendar components used by the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeFeatures {
    /// 0-23
    pub hour: u32,
    /// 0 = Monday .. 6 = Sunday
    pub weekday: u32,
    /// 1-12
    pub month: u32,
    pub year: i32,
}

impl From<&NaiveDateTime> for TimeFeatures {
    fn from(ts: &NaiveDateTime) -> Self {
        Self {
            hour: ts.hour(),
            weekday: ts.weekday().num_days_from_monday(),
            month: ts.month(),
            year: ts.year(),
        }
    }
}

/// Fixed-order model input. Copy-on-override: `with_dose` never mutates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Build the vector for one reading. Pure.
    pub fn build(reading: &Reading) -> Self {
        let t = TimeFeatures::from(&reading.timestamp);
        let (hour_sin, hour_cos) = cyclical(f64::from(t.hour), HOUR_PERIOD);
        let (dow_sin, dow_cos) = cyclical(f64::from(t.weekday), WEEKDAY_PERIOD);
        let (month_sin, month_cos) = cyclical(f64::from(t.month), MONTH_PERIOD);
        Self([
            reading.dose,
            reading.flow,
            f64::from(reading.orp),
            reading.turbidity,
            reading.ph,
            hour_sin,
            hour_cos,
            dow_sin,
            dow_cos,
            month_sin,
            month_cos,
            f64::from(t.year),
        ])
    }

    pub const fn from_array(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn dose(&self) -> f64 {
        self.0[DOSE_INDEX]
    }

    /// Copy of this vector with only the dose column replaced.
    pub fn with_dose(&self, dose: f64) -> Self {
        let mut v = self.0;
        v[DOSE_INDEX] = dose;
        Self(v)
    }

    /// Value of a column by schema name.
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_SCHEMA
            .iter()
            .position(|n| *n == name)
            .map(|i| self.0[i])
    }

    /// `(name, value)` pairs in schema order.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_SCHEMA.iter().copied().zip(self.0.iter().copied())
    }
}

/// Free-function form of `FeatureVector::build`.
pub fn build(reading: &Reading) -> FeatureVector {
    FeatureVector::build(reading)
}
