//! Fixed feature column order shared by the feature builder and every predictor.
//!
//! The input scaler is fit on columns in exactly this order. Reordering
//! silently corrupts predictions, so predictors that know their fit-time
//! column names are checked against this list before use.

/// Number of columns in a feature vector.
pub const FEATURE_COUNT: usize = 12;

/// Position of the dose column; the only column the dose sweep overrides.
pub const DOSE_INDEX: usize = 0;

/// Column names in fit order.
pub const FEATURE_SCHEMA: [&str; FEATURE_COUNT] = [
    "dose",
    "flow",
    "orp",
    "turbidity",
    "ph",
    "hour_sin",
    "hour_cos",
    "dow_sin",
    "dow_cos",
    "month_sin",
    "month_cos",
    "year",
];

/// Plant historian column names, position for position with `FEATURE_SCHEMA`.
/// Scalers fit on raw historian exports carry these; both spellings are
/// accepted by `check_schema`.
pub const HISTORIAN_SCHEMA: [&str; FEATURE_COUNT] = [
    "DOSIS_CL",
    "CAUDAL",
    "ORP_IN",
    "TURBIEDAD_IN",
    "PH_IN",
    "hour_sin",
    "hour_cos",
    "dow_sin",
    "dow_cos",
    "month_sin",
    "month_cos",
    "year",
];

/// First disagreement between an artifact's column list and `FEATURE_SCHEMA`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaMismatch {
    /// Column index of the first disagreement (or the shorter length).
    pub index: usize,
    pub expected: Option<&'static str>,
    pub found: Option<String>,
}

impl std::fmt::Display for SchemaMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "feature column {} expected {} but scaler has {}",
            self.index,
            self.expected.unwrap_or("<end>"),
            self.found.as_deref().unwrap_or("<end>")
        )
    }
}

impl std::error::Error for SchemaMismatch {}

/// Compare fit-time column names against `FEATURE_SCHEMA`, position by position.
/// A column may use either its schema name or its `HISTORIAN_SCHEMA` name.
pub fn check_schema<S: AsRef<str>>(names: &[S]) -> Result<(), SchemaMismatch> {
    let n = names.len().max(FEATURE_COUNT);
    for i in 0..n {
        let expected = FEATURE_SCHEMA.get(i).copied();
        let alias = HISTORIAN_SCHEMA.get(i).copied();
        let found = names.get(i).map(AsRef::as_ref);
        if found.is_none() || (found != expected && found != alias) {
            return Err(SchemaMismatch {
                index: i,
                expected,
                found: found.map(str::to_string),
            });
        }
    }
    Ok(())
}
