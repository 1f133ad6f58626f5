use chlorine_core::mocks::FnPredictor;
use chlorine_core::{DoseOptimizer, FeatureVector, Reading};
use chlorine_model::{Activation, ArtifactPredictor, Regressor, Scaler};
use chlorine_traits::{FEATURE_COUNT, FEATURE_SCHEMA};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn reading() -> FeatureVector {
    let r = Reading::from_parts(7.0, 10.0, 350, 20.0, 7.5, "2024-03-15", "14:30")
        .unwrap_or_else(|e| panic!("bench reading: {e}"));
    FeatureVector::build(&r)
}

// Deterministic pseudo-random weights (xorshift)
fn weights(rows: usize, cols: usize, seed: u32) -> Vec<Vec<f64>> {
    let mut state = seed.max(1);
    let mut next = || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        f64::from(state) / f64::from(u32::MAX) - 0.5
    };
    (0..rows).map(|_| (0..cols).map(|_| next()).collect()).collect()
}

fn mlp_predictor(hidden: usize) -> ArtifactPredictor {
    let names = FEATURE_SCHEMA.iter().map(|s| s.to_string()).collect();
    let input = Scaler::identity(FEATURE_COUNT).with_feature_names(names);
    let model = Regressor::Mlp {
        weights: vec![
            weights(FEATURE_COUNT, hidden, 7),
            weights(hidden, hidden, 11),
            weights(hidden, 1, 13),
        ],
        biases: vec![vec![0.0; hidden], vec![0.0; hidden], vec![0.5]],
        activation: Activation::Relu,
    };
    ArtifactPredictor::new(input, model, Scaler::identity(1))
        .unwrap_or_else(|e| panic!("bench model: {e}"))
}

pub fn bench_sweep(c: &mut Criterion) {
    let v = reading();

    let stub = DoseOptimizer::builder()
        .with_predictor(FnPredictor::new(|d| 0.5 + (d - 6.3).abs() * 0.1))
        .build()
        .unwrap_or_else(|e| panic!("{e}"));
    c.bench_function("optimize_default_sweep_stub", |b| {
        b.iter(|| stub.optimize(black_box(&v)))
    });

    let mlp = DoseOptimizer::builder()
        .with_predictor(mlp_predictor(64))
        .build()
        .unwrap_or_else(|e| panic!("{e}"));
    c.bench_function("optimize_default_sweep_mlp64", |b| {
        b.iter(|| mlp.optimize(black_box(&v)))
    });
}

criterion_group!(benches, bench_sweep);
criterion_main!(benches);
