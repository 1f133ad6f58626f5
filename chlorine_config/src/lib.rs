#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and readings CSV parsing for the chlorine dose optimizer.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Readings CSV loader enforces exact headers so column drift is caught
//!   before any row reaches the feature builder.
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One process reading as it arrives from a CSV export or a request body.
///
/// Expected headers:
/// dose,flow,orp,turbidity,ph,date,time
///
/// Example:
/// dose,flow,orp,turbidity,ph,date,time
/// 7.0,10.0,350,20.0,7.5,2024-03-15,14:30
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ReadingRecord {
    pub dose: f64,
    pub flow: f64,
    pub orp: i32,
    pub turbidity: f64,
    pub ph: f64,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
}

/// Candidate sweep policy. All values in mg/L.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct SweepCfg {
    pub dose_min: f64,
    pub dose_max: f64,
    pub step: f64,
    /// Residual chlorine setpoint
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

/// Paths to the three pre-trained artifacts (JSON parameter dumps).
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ModelCfg {
    pub model: PathBuf,
    pub input_scaler: PathBuf,
    pub output_scaler: PathBuf,
}

impl Default for ModelCfg {
    fn default() -> Self {
        Self::in_dir(Path::new("models"))
    }
}

impl ModelCfg {
    /// Conventional file names inside one artifact directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            model: dir.join("model.json"),
            input_scaler: dir.join("scaler_x.json"),
            output_scaler: dir.join("scaler_y.json"),
        }
    }
}

/// Inclusive bounds for one request field.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct FieldRange {
    pub min: f64,
    pub max: f64,
}

impl FieldRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Accepted request ranges. Defaults match the documented sensor envelope.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct Limits {
    pub dose: FieldRange,
    pub flow: FieldRange,
    pub orp: FieldRange,
    pub turbidity: FieldRange,
    pub ph: FieldRange,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            dose: FieldRange::new(5.0, 9.0),
            flow: FieldRange::new(5.0, 15.0),
            orp: FieldRange::new(300.0, 400.0),
            turbidity: FieldRange::new(5.0, 100.0),
            ph: FieldRange::new(5.0, 15.0),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RunnerCfg {
    /// Worker threads for batch mode (1 = sequential)
    pub workers: usize,
}

impl Default for RunnerCfg {
    fn default() -> Self {
        Self { workers: 1 }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub sweep: SweepCfg,
    #[serde(default)]
    pub model: ModelCfg,
    #[serde(default)]
    pub limits: Limits,
    #[serde(default)]
    pub runner: RunnerCfg,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

const READING_HEADERS: [&str; 7] = ["dose", "flow", "orp", "turbidity", "ph", "date", "time"];

pub fn load_readings_csv(path: &Path) -> eyre::Result<Vec<ReadingRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open readings CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != READING_HEADERS {
        eyre::bail!(
            "readings CSV must have headers '{}', got: {}",
            READING_HEADERS.join(","),
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<ReadingRecord>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }
    if rows.is_empty() {
        eyre::bail!("readings CSV {:?} has no rows", path);
    }
    Ok(rows)
}

/// Upper bound on the number of candidates one sweep may evaluate.
pub const MAX_SWEEP_CANDIDATES: usize = 100_000;

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Sweep
        let s = &self.sweep;
        for (name, v) in [
            ("dose_min", s.dose_min),
            ("dose_max", s.dose_max),
            ("step", s.step),
            ("target", s.target),
        ] {
            if !v.is_finite() {
                eyre::bail!("sweep.{name} must be a finite number");
            }
        }
        if s.dose_min < 0.0 {
            eyre::bail!("sweep.dose_min must be >= 0");
        }
        if s.dose_min > s.dose_max {
            eyre::bail!("sweep.dose_min must be <= sweep.dose_max");
        }
        if s.step <= 0.0 {
            eyre::bail!("sweep.step must be > 0");
        }
        if ((s.dose_max - s.dose_min) / s.step).ceil() >= MAX_SWEEP_CANDIDATES as f64 {
            eyre::bail!(
                "sweep has too many candidates (>{MAX_SWEEP_CANDIDATES}); increase sweep.step"
            );
        }
        if s.target < 0.0 {
            eyre::bail!("sweep.target must be >= 0");
        }

        // Limits
        for (name, r) in [
            ("dose", self.limits.dose),
            ("flow", self.limits.flow),
            ("orp", self.limits.orp),
            ("turbidity", self.limits.turbidity),
            ("ph", self.limits.ph),
        ] {
            if !(r.min.is_finite() && r.max.is_finite()) || r.min > r.max {
                eyre::bail!("limits.{name} must have finite min <= max");
            }
        }

        // Runner
        if self.runner.workers == 0 {
            eyre::bail!("runner.workers must be >= 1");
        }
        if self.runner.workers > 256 {
            eyre::bail!("runner.workers is unreasonably large (>256)");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}
