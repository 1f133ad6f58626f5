use chlorine_config::ReadingRecord;
use chlorine_core::mocks::{CountingPredictor, FailingPredictor, FnPredictor};
use chlorine_core::runner::{run, run_record};
use chlorine_core::{
    ChlorineError, DoseOptimizer, FeatureVector, Limits, PredictionError, Reading, SweepCfg,
};
use rstest::rstest;

fn scenario_reading() -> Reading {
    Reading::from_parts(7.0, 10.0, 350, 20.0, 7.5, "2024-03-15", "14:30").unwrap()
}

fn record(date: &str, time: &str) -> ReadingRecord {
    ReadingRecord {
        dose: 7.0,
        flow: 10.0,
        orp: 350,
        turbidity: 20.0,
        ph: 7.5,
        date: date.into(),
        time: time.into(),
    }
}

#[test]
fn vee_stub_centred_on_setpoint_finds_six_point_three() {
    let opt = DoseOptimizer::builder()
        .with_predictor(FnPredictor::new(|d| 0.5 + (d - 6.3).abs() * 0.1))
        .build()
        .unwrap();
    let r = run(&opt, &scenario_reading()).unwrap();
    assert!((r.optimal_dose - 6.3).abs() < 1e-9, "{r:?}");
    assert!(r.error_at_optimal < 1e-9);
    assert!((r.predicted_at_optimal_dose - 0.5).abs() < 1e-9);
    assert!((r.predicted_at_current_dose - 0.57).abs() < 1e-9);
}

#[test]
fn vee_stub_below_setpoint_settles_on_upper_bound() {
    // |dose - 6.3| * 0.1 never reaches 0.5 inside [4, 9.5]; the largest
    // prediction is at 9.5.
    let opt = DoseOptimizer::builder()
        .with_predictor(FnPredictor::new(|d| (d - 6.3).abs() * 0.1))
        .build()
        .unwrap();
    let r = run(&opt, &scenario_reading()).unwrap();
    assert_eq!(r.optimal_dose, 9.5);
    assert!((r.predicted_at_optimal_dose - 0.32).abs() < 1e-9);
    assert!((r.error_at_optimal - 0.18).abs() < 1e-9);
}

#[test]
fn degenerate_range_makes_exactly_two_calls() {
    let opt = DoseOptimizer::builder()
        .with_predictor(CountingPredictor::new(FnPredictor::new(|d| d * 0.1)))
        .build()
        .unwrap();
    let v = FeatureVector::build(&scenario_reading());
    let out = opt.optimize_with(&v, 5.0, 5.0, 0.05, 0.5).unwrap();
    assert_eq!(out.best.dose, 5.0);
    assert_eq!(out.evaluated, 1);
    assert_eq!(opt.predictor().calls(), 2);
}

#[test]
fn degenerate_range_at_current_dose_matches_baseline() {
    let opt = DoseOptimizer::builder()
        .with_predictor(FnPredictor::new(|d| d * 0.1))
        .build()
        .unwrap();
    let r = Reading::from_parts(5.0, 10.0, 350, 20.0, 7.5, "2024-03-15", "14:30").unwrap();
    let out = opt.optimize_with(&FeatureVector::build(&r), 5.0, 5.0, 0.05, 0.5).unwrap();
    assert_eq!(out.best.dose, 5.0);
    assert_eq!(out.baseline, out.best.predicted);
}

#[test]
fn default_sweep_calls_predictor_once_per_candidate_plus_baseline() {
    let opt = DoseOptimizer::builder()
        .with_predictor(CountingPredictor::new(FnPredictor::new(|d| d * 0.1)))
        .build()
        .unwrap();
    let out = opt.optimize(&FeatureVector::build(&scenario_reading())).unwrap();
    assert_eq!(out.evaluated, 111);
    assert_eq!(opt.predictor().calls(), 112);
}

#[test]
fn traced_search_evaluates_each_candidate_once() {
    let opt = DoseOptimizer::builder()
        .with_predictor(CountingPredictor::new(FnPredictor::new(|d| {
            0.5 + (d - 6.3).abs() * 0.1
        })))
        .build()
        .unwrap();
    let v = FeatureVector::build(&scenario_reading());
    let (out, candidates) = opt.optimize_traced(&v, &SweepCfg::default()).unwrap();
    assert_eq!(candidates.len(), 111);
    assert_eq!(opt.predictor().calls(), 112);

    let plain = opt.optimize(&v).unwrap();
    assert_eq!(out, plain);
}

#[rstest]
#[case("2024-02-30", "14:30")]
#[case("2024-03-15", "24:00")]
#[case("15/03/2024", "14:30")]
#[case("2024-03-15", "")]
fn bad_timestamp_never_reaches_predictor(#[case] date: &str, #[case] time: &str) {
    let opt = DoseOptimizer::builder()
        .with_predictor(CountingPredictor::new(FnPredictor::new(|d| d)))
        .build()
        .unwrap();
    let err = run_record(&opt, &record(date, time), &Limits::default()).unwrap_err();
    assert!(matches!(err, ChlorineError::InvalidTimestamp { .. }), "{err:?}");
    assert_eq!(opt.predictor().calls(), 0);
}

#[rstest]
#[case(9.5, 4.0, 0.05)]
#[case(4.0, 9.5, 0.0)]
#[case(4.0, 9.5, -0.05)]
fn invalid_range_never_reaches_predictor(#[case] lo: f64, #[case] hi: f64, #[case] step: f64) {
    let opt = DoseOptimizer::builder()
        .with_predictor(CountingPredictor::new(FnPredictor::new(|d| d)))
        .build()
        .unwrap();
    let v = FeatureVector::build(&scenario_reading());
    let err = opt.optimize_with(&v, lo, hi, step, 0.5).unwrap_err();
    assert!(matches!(err, ChlorineError::InvalidRange(_)));
    assert_eq!(opt.predictor().calls(), 0);
}

#[test]
fn nan_predictions_are_sanitized() {
    let opt = DoseOptimizer::builder()
        .with_predictor(FnPredictor::new(|_| f64::NAN))
        .build()
        .unwrap();
    let r = run(&opt, &scenario_reading()).unwrap();
    assert_eq!(r.predicted_at_current_dose, 0.0);
    assert_eq!(r.predicted_at_optimal_dose, 0.0);
    assert_eq!(r.error_at_optimal, 0.0);
    // every error is NaN, so the first candidate is kept
    assert_eq!(r.optimal_dose, 4.0);
}

#[test]
fn infinite_predictions_are_sanitized() {
    let opt = DoseOptimizer::builder()
        .with_predictor(FnPredictor::new(|_| f64::INFINITY))
        .build()
        .unwrap();
    let r = run(&opt, &scenario_reading()).unwrap();
    assert!(r.predicted_at_current_dose.is_finite());
    assert_eq!(r.predicted_at_optimal_dose, 0.0);
    assert_eq!(r.error_at_optimal, 0.0);
    assert_eq!(r.optimal_dose, 4.0);
}

#[test]
fn a_single_nan_candidate_is_skipped() {
    // Steeper below 6.3 than above, so 6.35 is the unique runner-up.
    let opt = DoseOptimizer::builder()
        .with_predictor(FnPredictor::new(|d| {
            if (d - 6.3).abs() < 1e-9 {
                f64::NAN
            } else if d > 6.3 {
                0.5 + (d - 6.3)
            } else {
                0.5 + 2.0 * (6.3 - d)
            }
        }))
        .build()
        .unwrap();
    let r = run(&opt, &scenario_reading()).unwrap();
    assert!((r.optimal_dose - 6.35).abs() < 1e-9, "{r:?}");
    assert!((r.error_at_optimal - 0.05).abs() < 1e-9);
}

#[test]
fn predictor_failure_aborts_the_request() {
    let opt = DoseOptimizer::builder()
        .with_predictor(FailingPredictor::new(0.5, 3))
        .build()
        .unwrap();
    let err = run(&opt, &scenario_reading()).unwrap_err();
    match err {
        ChlorineError::Prediction(PredictionError::Model(msg)) => {
            assert!(msg.contains("unavailable"));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

/// Backend that was fit on one column fewer than the schema.
struct ElevenColumnPredictor;

impl chlorine_traits::Predictor for ElevenColumnPredictor {
    fn scale(&self, features: &[f64]) -> Result<Vec<f64>, chlorine_traits::BoxError> {
        Err(Box::new(PredictionError::DimensionMismatch {
            expected: 11,
            got: features.len(),
        }))
    }

    fn predict(&self, _scaled: &[f64]) -> Result<f64, chlorine_traits::BoxError> {
        Ok(0.0)
    }

    fn unscale(&self, scaled: f64) -> Result<f64, chlorine_traits::BoxError> {
        Ok(scaled)
    }
}

#[test]
fn typed_backend_errors_keep_their_variant() {
    let opt = DoseOptimizer::builder()
        .with_predictor(ElevenColumnPredictor)
        .build()
        .unwrap();
    assert_eq!(
        run(&opt, &scenario_reading()).unwrap_err(),
        ChlorineError::Prediction(PredictionError::DimensionMismatch {
            expected: 11,
            got: 12
        })
    );
}

#[test]
fn failing_baseline_is_reported() {
    let opt = DoseOptimizer::builder()
        .with_predictor(FailingPredictor::new(0.5, 0))
        .build()
        .unwrap();
    assert!(matches!(
        run(&opt, &scenario_reading()),
        Err(ChlorineError::Prediction(_))
    ));
}

#[test]
fn per_request_sweep_overrides_configured_one() {
    let opt = DoseOptimizer::builder()
        .with_predictor(FnPredictor::new(|d| d * 0.1))
        .with_sweep(SweepCfg {
            dose_min: 1.0,
            dose_max: 2.0,
            step: 0.5,
            target: 0.5,
        })
        .build()
        .unwrap();
    let narrow = run(&opt, &scenario_reading()).unwrap();
    assert_eq!(narrow.optimal_dose, 2.0);

    let wide = chlorine_core::runner::run_with(&opt, &scenario_reading(), &SweepCfg::default())
        .unwrap();
    assert!((wide.optimal_dose - 5.0).abs() < 1e-9);
}
