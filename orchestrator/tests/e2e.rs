use std::num::NonZeroUsize;

use frame::{Column, DataType, Frame, Row, Schema, Value};
use linreg::QrBackend;
use orchestrator::{PREDICTED_COLUMN, configs::TrainConfig, predict, test, train};
use rand::{Rng, SeedableRng, rngs::StdRng};

const INTERCEPT: f64 = 1.5;
const W1: f64 = 2.0;
const W2: f64 = -0.75;

fn schema() -> Schema {
    Schema::new([
        Column::new("x1", DataType::Float64),
        Column::new("x2", DataType::Int32),
        Column::new("y", DataType::Float64),
    ])
    .unwrap()
}

/// Rows of `y = 1.5 + 2 x1 - 0.75 x2 + noise`.
fn rows(rng: &mut StdRng, n: usize, noise: f64) -> Vec<Row> {
    (0..n)
        .map(|_| {
            let x1: f64 = rng.random_range(-5.0..5.0);
            let x2: i64 = rng.random_range(-20..20);
            let e = if noise > 0.0 {
                rng.random_range(-noise..noise)
            } else {
                0.0
            };

            vec![
                Value::Float(x1),
                Value::Int(x2),
                Value::Float(INTERCEPT + W1 * x1 + W2 * x2 as f64 + e),
            ]
        })
        .collect()
}

fn config() -> TrainConfig {
    TrainConfig::new(["x1", "x2"], "y")
}

fn assert_close(a: f64, b: f64, tol: f64) {
    assert!((a - b).abs() < tol, "{a} != {b}");
}

#[test]
fn two_partitions_recover_the_generating_model() {
    let mut rng = StdRng::seed_from_u64(7);
    let frame = Frame::from_rows(schema(), rows(&mut rng, 50, 0.0), 2).unwrap();

    let model = train(&frame, &config()).unwrap();

    assert_eq!(model.weights.len(), 2);
    assert!(model.intercept.is_finite());
    assert!(!model.serialized_model.is_empty());
    assert_close(model.intercept, INTERCEPT, 1e-9);
    assert_close(model.weights[0], W1, 1e-9);
    assert_close(model.weights[1], W2, 1e-9);
    assert_eq!(model.observation_columns, ["x1", "x2"]);
    assert_eq!(model.value_column, "y");
}

#[test]
fn without_intercept_every_coefficient_is_a_weight() {
    let mut rng = StdRng::seed_from_u64(11);
    let frame = Frame::from_rows(schema(), rows(&mut rng, 40, 0.1), 3).unwrap();

    let model = train(&frame, &config().with_fit_intercept(false)).unwrap();

    assert_eq!(model.intercept, 0.0);
    assert_eq!(model.weights.len(), 2);

    let restored = model.restore(&QrBackend::new()).unwrap();
    assert!(!restored.fit_intercept());
    assert_eq!(restored.coefficients(), model.weights.as_slice());
}

#[test]
fn partition_order_does_not_change_the_model() {
    let mut rng = StdRng::seed_from_u64(3);
    let a = rows(&mut rng, 30, 0.5);
    let b = rows(&mut rng, 17, 0.5);

    let ab = Frame::from_partitions(schema(), vec![a.clone(), b.clone()]).unwrap();
    let ba = Frame::from_partitions(schema(), vec![b, a]).unwrap();

    let m1 = train(&ab, &config()).unwrap();
    let m2 = train(&ba, &config()).unwrap();

    assert_close(m1.intercept, m2.intercept, 1e-9);
    for (w1, w2) in m1.weights.iter().zip(&m2.weights) {
        assert_close(*w1, *w2, 1e-9);
    }
}

#[test]
fn partition_count_does_not_change_the_model() {
    let mut rng = StdRng::seed_from_u64(5);
    let rows = rows(&mut rng, 64, 1.0);

    let single = Frame::from_rows(schema(), rows.clone(), 1).unwrap();
    let baseline = train(&single, &config()).unwrap();

    for num_partitions in [2, 5, 64, 70] {
        let frame = Frame::from_rows(schema(), rows.clone(), num_partitions).unwrap();
        let model = train(&frame, &config()).unwrap();

        assert_close(model.intercept, baseline.intercept, 1e-8);
        for (w, b) in model.weights.iter().zip(&baseline.weights) {
            assert_close(*w, *b, 1e-8);
        }
    }
}

#[test]
fn dedicated_thread_pool_trains_the_same_model() {
    let mut rng = StdRng::seed_from_u64(13);
    let frame = Frame::from_rows(schema(), rows(&mut rng, 80, 0.2), 8).unwrap();

    let global = train(&frame, &config()).unwrap();
    let pooled = train(
        &frame,
        &config().with_num_threads(NonZeroUsize::new(2).unwrap()),
    )
    .unwrap();

    assert_close(global.intercept, pooled.intercept, 1e-12);
    assert_eq!(global.weights.len(), pooled.weights.len());
}

#[test]
fn predictions_and_metrics_follow_the_trained_model() {
    let mut rng = StdRng::seed_from_u64(17);
    let frame = Frame::from_rows(schema(), rows(&mut rng, 60, 0.0), 4).unwrap();
    let model = train(&frame, &config()).unwrap();

    let predicted = predict(&frame, &model, None).unwrap();
    assert_eq!(predicted.num_partitions(), 4);
    assert_eq!(predicted.num_rows(), 60);

    let idx = predicted.schema().index_of(PREDICTED_COLUMN).unwrap();
    for row in predicted.rows() {
        let y = row[2].as_f64().unwrap();
        let pred = row[idx].as_f64().unwrap();
        assert_close(pred, y, 1e-8);
    }

    let metrics = test(&frame, &model, None, None).unwrap();
    assert!(metrics.mean_squared_error < 1e-12);
    assert_close(metrics.r2, 1.0, 1e-9);
}

#[test]
fn noisy_data_is_tested_with_positive_error() {
    let mut rng = StdRng::seed_from_u64(19);
    let train_frame = Frame::from_rows(schema(), rows(&mut rng, 200, 1.0), 4).unwrap();
    let test_frame = Frame::from_rows(schema(), rows(&mut rng, 50, 1.0), 2).unwrap();

    let model = train(&train_frame, &config()).unwrap();
    let metrics = test(&test_frame, &model, None, None).unwrap();

    assert!(metrics.mean_squared_error > 0.0);
    // noise is uniform in [-1, 1)
    assert!(metrics.mean_absolute_error < 1.5);
    assert_close(
        metrics.root_mean_squared_error,
        metrics.mean_squared_error.sqrt(),
        1e-12,
    );
    assert!(metrics.r2 > 0.95);
}

fn float_frame(rows: Vec<(f64, f64, f64)>, num_partitions: usize) -> Frame {
    let schema = Schema::new([
        Column::new("x1", DataType::Float64),
        Column::new("x2", DataType::Float64),
        Column::new("y", DataType::Float64),
    ])
    .unwrap();
    let rows = rows
        .into_iter()
        .map(|(x1, x2, y)| vec![Value::Float(x1), Value::Float(x2), Value::Float(y)])
        .collect();

    Frame::from_rows(schema, rows, num_partitions).unwrap()
}

#[test]
fn huge_magnitudes_train_a_finite_model() {
    let rows = (1..=8)
        .map(|k| {
            let x1 = k as f64 * 1e155;
            let x2 = ((k * 3) % 7 + 1) as f64 * 1e155;
            (x1, x2, 2.0 * x1 - x2 + 3.0)
        })
        .collect();

    let model = train(&float_frame(rows, 2), &config()).unwrap();

    assert!(model.intercept.is_finite());
    assert!(model.weights.iter().all(|w| w.is_finite()));
    assert_close(model.weights[0], 2.0, 1e-6);
    assert_close(model.weights[1], -1.0, 1e-6);
}

#[test]
fn features_of_different_scale_are_not_rank_deficient() {
    let rows = (0..40)
        .map(|i| {
            let i = i as f64;
            let x1 = (0.37 * i).sin() * 1e6;
            let x2 = (1.13 * i).cos() * 1e-6;
            (x1, x2, 1.0 + 2e-6 * x1 + 5e5 * x2)
        })
        .collect();

    let model = train(&float_frame(rows, 2), &config()).unwrap();

    assert_close(model.intercept, 1.0, 1e-6);
    assert_close(model.weights[0] / 2e-6, 1.0, 1e-6);
    assert_close(model.weights[1] / 5e5, 1.0, 1e-6);
}

#[test]
fn label_offset_keeps_explained_variance() {
    let rows: Vec<_> = (0..40)
        .map(|i| {
            let x1 = i as f64;
            let x2 = ((i * 7) % 11) as f64;
            let noise = if i % 2 == 0 { 0.5 } else { -0.5 };
            (x1, x2, 1e9 + x1 + x2 + noise)
        })
        .collect();
    let frame = float_frame(rows.clone(), 3);

    let model = train(&frame, &config()).unwrap();
    let metrics = test(&frame, &model, None, None).unwrap();

    let n = rows.len() as f64;
    let mean = rows.iter().map(|r| r.2 - 1e9).sum::<f64>() / n;
    let variance = rows.iter().map(|r| (r.2 - 1e9 - mean).powi(2)).sum::<f64>() / n;

    assert!(variance > 100.0);
    // the fit explains all but the ±0.5 noise
    assert!(metrics.explained_variance > 0.9 * variance);
    assert!(metrics.mean_squared_error < 0.3);
    assert!(metrics.r2 > 0.99);
}
