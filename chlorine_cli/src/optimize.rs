//! Command implementations: config mapping, artifact loading and output.

use std::path::Path;

use chlorine_config::{Config, ModelCfg};
use chlorine_core::runner::{run_batch, run_with};
use chlorine_core::{
    DoseOptimizer, FeatureVector, Limits, OptimizationResult, Reading, SweepCfg,
};
use chlorine_model::ArtifactPredictor;
use chlorine_traits::FEATURE_COUNT;
use eyre::{WrapErr, bail};
use serde_json::{Value, json};

use crate::cli::{ReadingArgs, SweepArgs};
use crate::error_fmt::{error_reason_name, humanize};

/// Reference reading used by `self-check`.
const PROBE: (f64, f64, i32, f64, f64, &str, &str) =
    (7.0, 10.0, 350, 20.0, 7.5, "2024-03-15", "14:30");

/// Configured sweep with command-line overrides applied.
pub fn effective_sweep(cfg: &chlorine_config::SweepCfg, o: &SweepArgs) -> SweepCfg {
    let base = SweepCfg::from(cfg);
    SweepCfg {
        dose_min: o.dose_min.unwrap_or(base.dose_min),
        dose_max: o.dose_max.unwrap_or(base.dose_max),
        step: o.step.unwrap_or(base.step),
        target: o.target.unwrap_or(base.target),
    }
}

/// Load the three artifacts and wire them into an optimizer.
pub fn build_optimizer(
    cfg: &Config,
    model: &ModelCfg,
) -> eyre::Result<DoseOptimizer<ArtifactPredictor>> {
    let predictor =
        ArtifactPredictor::load(&model.model, &model.input_scaler, &model.output_scaler)
            .wrap_err("load model artifacts")?;
    DoseOptimizer::builder()
        .with_predictor(predictor)
        .with_sweep(SweepCfg::from(&cfg.sweep))
        .build()
}

pub fn result_json(r: &OptimizationResult) -> Value {
    json!({
        "current_dose_prediction": r.predicted_at_current_dose,
        "optimal_dose": r.optimal_dose,
        "optimal_dose_prediction": r.predicted_at_optimal_dose,
        "error": r.error_at_optimal,
    })
}

fn print_result(reading: &Reading, r: &OptimizationResult, json: bool) {
    if json {
        println!("{}", result_json(r));
    } else {
        println!(
            "Predicted residual at current dose {:.2} mg/L: {:.3} mg/L",
            reading.dose, r.predicted_at_current_dose
        );
        println!(
            "Optimal dose: {:.2} mg/L (predicted {:.3} mg/L, |error| {:.3})",
            r.optimal_dose, r.predicted_at_optimal_dose, r.error_at_optimal
        );
    }
}

/// `optimize`: one reading from the command line.
///
/// Timestamp, reading and sweep checks run before any artifact is loaded.
pub fn run_optimize(
    cfg: &Config,
    model: &ModelCfg,
    args: &ReadingArgs,
    overrides: &SweepArgs,
    trace: bool,
    json: bool,
) -> eyre::Result<()> {
    let reading = Reading::from_parts(
        args.dose,
        args.flow,
        args.orp,
        args.turbidity,
        args.ph,
        &args.date,
        &args.time,
    )?;
    reading.validate(&Limits::from(&cfg.limits))?;
    let sweep = effective_sweep(&cfg.sweep, overrides);
    let candidates = sweep.candidate_count()?;
    tracing::debug!(?sweep, candidates, "effective sweep");

    let optimizer = build_optimizer(cfg, model)?;

    let result = if trace {
        let v = FeatureVector::build(&reading);
        let (outcome, candidates) = optimizer.optimize_traced(&v, &sweep)?;
        for c in &candidates {
            if json {
                println!(
                    "{}",
                    json!({ "dose": c.dose, "predicted": c.predicted, "error": c.error })
                );
            } else {
                println!("{:>7.2} {:>9.4} {:>9.4}", c.dose, c.predicted, c.error);
            }
        }
        OptimizationResult::finalize(&outcome)
    } else {
        run_with(&optimizer, &reading, &sweep)?
    };
    print_result(&reading, &result, json);
    Ok(())
}

/// `batch`: every row of a readings CSV, one output line per row.
///
/// Row failures are reported inline; the command fails if any row failed.
pub fn run_batch_cmd(
    cfg: &Config,
    model: &ModelCfg,
    readings: &Path,
    workers: Option<usize>,
    json: bool,
) -> eyre::Result<()> {
    let rows = chlorine_config::load_readings_csv(readings)?;
    let optimizer = build_optimizer(cfg, model)?;
    let workers = workers.unwrap_or(cfg.runner.workers);
    if workers == 0 {
        bail!("--workers must be >= 1");
    }
    let results = run_batch(&optimizer, &rows, &Limits::from(&cfg.limits), workers);

    if !json {
        println!(
            "{:>4}  {:>10}  {:>10} {:>7} {:>10} {:>9}",
            "row", "timestamp", "current", "optimal", "predicted", "error"
        );
    }
    let mut failed = 0usize;
    for (i, (rec, res)) in rows.iter().zip(&results).enumerate() {
        let row = i + 1;
        match (res, json) {
            (Ok(r), true) => {
                let mut line = result_json(r);
                line["row"] = json!(row);
                println!("{line}");
            }
            (Ok(r), false) => println!(
                "{row:>4}  {} {}  {:>10.3} {:>7.2} {:>10.3} {:>9.3}",
                rec.date,
                rec.time,
                r.predicted_at_current_dose,
                r.optimal_dose,
                r.predicted_at_optimal_dose,
                r.error_at_optimal
            ),
            (Err(e), true) => {
                failed += 1;
                println!(
                    "{}",
                    json!({ "row": row, "reason": error_reason_name(e), "message": e.to_string() })
                );
            }
            (Err(e), false) => {
                failed += 1;
                println!("{row:>4}  error: {e}");
            }
        }
    }
    tracing::info!(rows = rows.len(), failed, workers, "batch finished");
    if failed > 0 {
        bail!("{failed} of {} readings failed", rows.len());
    }
    Ok(())
}

/// `self-check`: artifacts load, schema matches, one probe prediction is finite.
pub fn self_check(cfg: &Config, model: &ModelCfg, json: bool) -> eyre::Result<()> {
    let optimizer = build_optimizer(cfg, model)?;
    let (dose, flow, orp, turbidity, ph, date, time) = PROBE;
    let reading = Reading::from_parts(dose, flow, orp, turbidity, ph, date, time)?;
    let probe = optimizer.baseline(&FeatureVector::build(&reading))?;
    if !probe.is_finite() {
        bail!("self-check failed: probe prediction is not finite ({probe})");
    }
    let kind = optimizer.predictor().model_kind();
    if json {
        println!(
            "{}",
            json!({
                "status": "ok",
                "model": kind,
                "features": FEATURE_COUNT,
                "probe_prediction": probe,
            })
        );
    } else {
        println!("OK: {kind} model, {FEATURE_COUNT} features, probe prediction {probe:.3} mg/L");
    }
    Ok(())
}

/// Human or JSON rendering shared with `main` for top-level failures.
pub fn report_failure(err: &eyre::Report, json: bool) {
    if json {
        println!("{}", crate::error_fmt::format_error_json(err));
    } else {
        eprintln!("{}", humanize(err));
    }
}
