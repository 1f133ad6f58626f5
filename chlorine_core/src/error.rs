use thiserror::Error;

/// Why the predictor rejected a feature vector.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PredictionError {
    #[error("dimension mismatch: expected {expected} features, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("non-finite input at column {index}")]
    NonFiniteInput { index: usize },
    #[error("feature schema mismatch: {0}")]
    SchemaMismatch(String),
    #[error("model failure: {0}")]
    Model(String),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChlorineError {
    #[error("invalid timestamp: date {date:?}, time {time:?}")]
    InvalidTimestamp { date: String, time: String },
    #[error("prediction failed: {0}")]
    Prediction(#[from] PredictionError),
    #[error("invalid sweep range: {0}")]
    InvalidRange(String),
    #[error("{field} = {value} is outside [{min}, {max}]")]
    InvalidReading {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing predictor")]
    MissingPredictor,
    #[error("predictor schema mismatch: {0}")]
    SchemaMismatch(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ChlorineError>;
pub use eyre::Report;
