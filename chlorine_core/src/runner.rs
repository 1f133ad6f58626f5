//! Request orchestration: reading → features → search → sanitized result.
//!
//! `run_batch` fans rows out to a fixed worker pool over bounded channels.
//! The predictor is shared read-only, so workers need no locking. Results are
//! reassembled in input order.

use chlorine_config::ReadingRecord;
use chlorine_traits::Predictor;
use crossbeam_channel as xch;

use crate::config::{Limits, SweepCfg};
use crate::error::Result;
use crate::features::FeatureVector;
use crate::reading::Reading;
use crate::result::OptimizationResult;
use crate::search::DoseOptimizer;

/// Optimize one reading with the optimizer's configured sweep.
pub fn run<P: Predictor>(
    optimizer: &DoseOptimizer<P>,
    reading: &Reading,
) -> Result<OptimizationResult> {
    run_with(optimizer, reading, optimizer.sweep_cfg())
}

/// Optimize one reading with an explicit sweep (per-request overrides).
pub fn run_with<P: Predictor>(
    optimizer: &DoseOptimizer<P>,
    reading: &Reading,
    sweep: &SweepCfg,
) -> Result<OptimizationResult> {
    let v = FeatureVector::build(reading);
    let outcome =
        optimizer.optimize_with(&v, sweep.dose_min, sweep.dose_max, sweep.step, sweep.target)?;
    Ok(OptimizationResult::finalize(&outcome))
}

/// Parse, range-check and optimize one raw record.
///
/// Timestamp and range errors are reported before the predictor is invoked.
pub fn run_record<P: Predictor>(
    optimizer: &DoseOptimizer<P>,
    record: &ReadingRecord,
    limits: &Limits,
) -> Result<OptimizationResult> {
    let reading = Reading::try_from(record)?;
    reading.validate(limits)?;
    run(optimizer, &reading)
}

/// Optimize every record, one result per row, in input order.
///
/// A failing row does not stop the others. `workers <= 1` runs inline.
pub fn run_batch<P>(
    optimizer: &DoseOptimizer<P>,
    records: &[ReadingRecord],
    limits: &Limits,
    workers: usize,
) -> Vec<Result<OptimizationResult>>
where
    P: Predictor + Send + Sync,
{
    let workers = workers.clamp(1, records.len().max(1));
    if workers == 1 {
        return records
            .iter()
            .map(|r| run_record(optimizer, r, limits))
            .collect();
    }

    let (job_tx, job_rx) = xch::bounded::<(usize, &ReadingRecord)>(workers * 2);
    let (res_tx, res_rx) = xch::unbounded();

    std::thread::scope(|s| {
        for id in 0..workers {
            let job_rx = job_rx.clone();
            let res_tx = res_tx.clone();
            s.spawn(move || {
                for (idx, record) in job_rx {
                    let res = run_record(optimizer, record, limits);
                    if res_tx.send((idx, res)).is_err() {
                        break;
                    }
                }
                tracing::trace!(worker = id, "batch worker exiting");
            });
        }
        drop(res_tx);

        for job in records.iter().enumerate() {
            if job_tx.send(job).is_err() {
                break;
            }
        }
        drop(job_tx);
    });

    let mut slots: Vec<Option<Result<OptimizationResult>>> = vec![None; records.len()];
    for (idx, res) in res_rx {
        slots[idx] = Some(res);
    }
    tracing::debug!(rows = records.len(), workers, "batch complete");
    slots.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::FnPredictor;

    fn record(dose: f64, time: &str) -> ReadingRecord {
        ReadingRecord {
            dose,
            flow: 10.0,
            orp: 350,
            turbidity: 20.0,
            ph: 7.5,
            date: "2024-03-15".into(),
            time: time.into(),
        }
    }

    #[test]
    fn out_of_range_dose_is_rejected() {
        let opt = DoseOptimizer::builder()
            .with_predictor(FnPredictor::new(|d| d))
            .build()
            .unwrap();
        let err = run_record(&opt, &record(12.0, "14:30"), &Limits::default()).unwrap_err();
        assert!(matches!(
            err,
            crate::error::ChlorineError::InvalidReading { field: "dose", .. }
        ));
    }

    #[test]
    fn sequential_and_parallel_batches_agree() {
        let opt = DoseOptimizer::builder()
            .with_predictor(FnPredictor::new(|d| 0.5 + (d - 6.3).abs() * 0.1))
            .build()
            .unwrap();
        let rows: Vec<_> = (0..9).map(|i| record(5.0 + f64::from(i) * 0.5, "08:00")).collect();
        let seq = run_batch(&opt, &rows, &Limits::default(), 1);
        let par = run_batch(&opt, &rows, &Limits::default(), 4);
        assert_eq!(seq, par);
        assert_eq!(par.len(), rows.len());
    }
}
