//! Process readings and timestamp parsing.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::config::Limits;
use crate::error::{ChlorineError, Result};

/// Accepted time-of-day layouts with their zero-padded shapes (`9` = digit).
const TIME_FORMATS: [(&str, &str); 2] = [("%H:%M", "99:99"), ("%H:%M:%S", "99:99:99")];

const DATE_SHAPE: &str = "9999-99-99";

/// chrono accepts unpadded and signed fields; require the exact padded form.
fn has_shape(s: &str, shape: &str) -> bool {
    s.len() == shape.len()
        && s.bytes().zip(shape.bytes()).all(|(c, p)| match p {
            b'9' => c.is_ascii_digit(),
            _ => c == p,
        })
}

/// One set of process readings at a local (already zoned) instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    /// Current chlorine dose, mg/L.
    pub dose: f64,
    pub flow: f64,
    /// Oxidation-reduction potential, mV.
    pub orp: i32,
    pub turbidity: f64,
    pub ph: f64,
    pub timestamp: NaiveDateTime,
}

impl Reading {
    pub fn new(
        dose: f64,
        flow: f64,
        orp: i32,
        turbidity: f64,
        ph: f64,
        timestamp: NaiveDateTime,
    ) -> Self {
        Self {
            dose,
            flow,
            orp,
            turbidity,
            ph,
            timestamp,
        }
    }

    /// Build a reading from request fields with a `YYYY-MM-DD` date and an
    /// `HH:MM` (or `HH:MM:SS`) time.
    pub fn from_parts(
        dose: f64,
        flow: f64,
        orp: i32,
        turbidity: f64,
        ph: f64,
        date: &str,
        time: &str,
    ) -> Result<Self> {
        let timestamp = parse_timestamp(date, time)?;
        Ok(Self::new(dose, flow, orp, turbidity, ph, timestamp))
    }

    /// Check every numeric field against `limits`. NaN is always rejected.
    pub fn validate(&self, limits: &Limits) -> Result<()> {
        let fields = [
            ("dose", self.dose, limits.dose),
            ("flow", self.flow, limits.flow),
            ("orp", f64::from(self.orp), limits.orp),
            ("turbidity", self.turbidity, limits.turbidity),
            ("ph", self.ph, limits.ph),
        ];
        for (field, value, bounds) in fields {
            if !bounds.contains(value) {
                return Err(ChlorineError::InvalidReading {
                    field,
                    value,
                    min: bounds.min,
                    max: bounds.max,
                });
            }
        }
        Ok(())
    }
}

/// Parse a calendar date and time of day into a naive instant. No timezone
/// conversion is applied.
pub fn parse_timestamp(date: &str, time: &str) -> Result<NaiveDateTime> {
    let invalid = || ChlorineError::InvalidTimestamp {
        date: date.to_string(),
        time: time.to_string(),
    };
    let (date_s, time_s) = (date.trim(), time.trim());
    if !has_shape(date_s, DATE_SHAPE) {
        return Err(invalid());
    }
    let d = NaiveDate::parse_from_str(date_s, "%Y-%m-%d").map_err(|_| invalid())?;
    let t = TIME_FORMATS
        .iter()
        .filter(|(_, shape)| has_shape(time_s, shape))
        .find_map(|(fmt, _)| NaiveTime::parse_from_str(time_s, fmt).ok())
        .ok_or_else(invalid)?;
    Ok(d.and_time(t))
}
