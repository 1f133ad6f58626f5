//! Human-readable error descriptions and structured JSON error formatting.

use chlorine_core::error::{BuildError, ChlorineError, PredictionError};
use chlorine_model::ModelError;

/// Stable reason names used in JSON output.
pub fn error_reason_name(e: &ChlorineError) -> &'static str {
    match e {
        ChlorineError::InvalidTimestamp { .. } => "InvalidTimestamp",
        ChlorineError::Prediction(_) => "Prediction",
        ChlorineError::InvalidRange(_) => "InvalidRange",
        ChlorineError::InvalidReading { .. } => "InvalidReading",
    }
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(ce) = err.downcast_ref::<ChlorineError>() {
        return match ce {
            ChlorineError::InvalidTimestamp { date, time } => format!(
                "What happened: Could not read the reading's timestamp (date {date:?}, time {time:?}).\nLikely causes: Wrong date order, an impossible calendar day, or a time past 23:59.\nHow to fix: Pass --date as YYYY-MM-DD and --time as HH:MM (or HH:MM:SS)."
            ),
            ChlorineError::InvalidRange(msg) => format!(
                "What happened: The dose sweep is not usable ({msg}).\nLikely causes: dose_min above dose_max, a step of zero or less, or a step so small the sweep is huge.\nHow to fix: Adjust --dose-min/--dose-max/--step or the [sweep] section of the config."
            ),
            ChlorineError::InvalidReading {
                field,
                value,
                min,
                max,
            } => format!(
                "What happened: Reading {field} = {value} is outside the accepted range [{min}, {max}].\nLikely causes: A sensor fault, a unit mix-up, or limits that do not match this plant.\nHow to fix: Check the {field} value, or widen limits.{field} in the config if the range is legitimate."
            ),
            ChlorineError::Prediction(pe) => match pe {
                PredictionError::DimensionMismatch { expected, got } => format!(
                    "What happened: The model expected {expected} features but received {got}.\nLikely causes: Artifacts trained on a different feature set.\nHow to fix: Retrain or re-export the artifacts with the 12-column schema."
                ),
                PredictionError::SchemaMismatch(msg) => format!(
                    "What happened: Feature columns do not match the model ({msg}).\nLikely causes: Artifacts exported with a different column order.\nHow to fix: Re-export scaler_x.json with feature_names in the expected order."
                ),
                other => format!(
                    "What happened: The model could not produce a prediction ({other}).\nLikely causes: Corrupt artifacts or inputs the scaler cannot handle.\nHow to fix: Run `chlorine self-check` and re-run with --log-level=debug."
                ),
            },
        };
    }

    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingPredictor => {
                "What happened: No predictor was provided to the optimizer.\nLikely causes: Model artifacts were not loaded before building.\nHow to fix: Ensure the artifacts load and are passed via with_predictor(...).".to_string()
            }
            BuildError::SchemaMismatch(msg) => format!(
                "What happened: The model's input columns do not match the feature schema ({msg}).\nLikely causes: Artifacts exported with a different column order or count.\nHow to fix: Re-export scaler_x.json with the expected feature_names."
            ),
            BuildError::InvalidConfig(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML.\nHow to fix: Edit the config file, then rerun."
            ),
        };
    }

    if let Some(me) = err.downcast_ref::<ModelError>() {
        return match me {
            ModelError::Io { path, source } => format!(
                "What happened: Could not read model artifact {}.\nLikely causes: Wrong --model-dir or [model] paths, or missing files ({source}).\nHow to fix: Point --model-dir at the directory holding model.json, scaler_x.json and scaler_y.json.",
                path.display()
            ),
            ModelError::Parse { path, source } => format!(
                "What happened: Model artifact {} is not valid ({source}).\nLikely causes: Unsupported kind or a truncated export.\nHow to fix: Re-export the artifact as a JSON parameter dump.",
                path.display()
            ),
            ModelError::Schema(m) => format!(
                "What happened: The input scaler's columns do not match the feature schema ({m}).\nLikely causes: Artifacts exported with a different column order.\nHow to fix: Re-export scaler_x.json with the expected feature_names."
            ),
            other => format!(
                "What happened: Model artifacts are inconsistent ({other}).\nLikely causes: Artifacts from different training runs.\nHow to fix: Export all three artifacts from the same fitted pipeline."
            ),
        };
    }

    // String-based heuristics for errors coming from config or CSV loading
    let msg = err.to_string();
    let lower = msg.to_ascii_lowercase();

    if lower.contains("readings csv must have headers") {
        return "Invalid headers in readings CSV. Expected 'dose,flow,orp,turbidity,ph,date,time'."
            .to_string();
    }

    if lower.contains("invalid configuration") || lower.contains("parse config") {
        let cause = err
            .chain()
            .nth(1)
            .map(|c| format!(" ({c})"))
            .unwrap_or_default();
        return format!(
            "What happened: Configuration is invalid{cause}.\nLikely causes: Out-of-range or mistyped values in the TOML.\nHow to fix: Edit the TOML config and try again."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes per error kind; anything unrecognized returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if let Some(ce) = err.downcast_ref::<ChlorineError>() {
        return match ce {
            ChlorineError::InvalidTimestamp { .. } => 3,
            ChlorineError::InvalidRange(_) => 4,
            ChlorineError::Prediction(_) => 5,
            ChlorineError::InvalidReading { .. } => 6,
        };
    }
    if matches!(
        err.downcast_ref::<BuildError>(),
        Some(BuildError::SchemaMismatch(_))
    ) || matches!(err.downcast_ref::<ModelError>(), Some(ModelError::Schema(_)))
    {
        return 5;
    }
    1
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let reason = match err.downcast_ref::<ChlorineError>() {
        Some(ce) => error_reason_name(ce),
        None if err.downcast_ref::<BuildError>().is_some() => "Build",
        None if err.downcast_ref::<ModelError>().is_some() => "Model",
        None => "Error",
    };
    json!({ "reason": reason, "message": humanize(err), "exit_code": exit_code_for_error(err) })
        .to_string()
}
