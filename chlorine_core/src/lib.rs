#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Chlorine dose optimization (model-agnostic).
//!
//! Given one set of process readings, this crate predicts the residual
//! chlorine at the current dose and searches a bounded grid of candidate
//! doses for the one whose prediction lands closest to the setpoint. All
//! model access goes through `chlorine_traits::Predictor`.
//!
//! ## Pipeline
//!
//! - **Readings**: timestamp parsing and range checks (`reading` module)
//! - **Features**: the 12-column vector with cyclical time encodings (`features`)
//! - **Search**: inclusive candidate grid, first-minimum selection (`search`)
//! - **Result**: non-finite outputs replaced by `0.0` (`result`)
//! - **Runner**: single requests and ordered parallel batches (`runner`)

pub mod builder;
pub mod config;
pub mod conversions;
pub mod error;
pub mod features;
pub mod mocks;
pub mod pred_error;
pub mod reading;
pub mod result;
pub mod runner;
pub mod search;
pub mod util;

pub use builder::{Missing, OptimizerBuilder, Set};
pub use config::{Bounds, Limits, SweepCfg};
pub use error::{BuildError, ChlorineError, PredictionError, Result};
pub use features::{FeatureVector, TimeFeatures, build as build_features};
pub use reading::{Reading, parse_timestamp};
pub use result::{OptimizationResult, finalize};
pub use search::{Candidate, DoseOptimizer, SearchOutcome, candidate_doses, select_first_min};
