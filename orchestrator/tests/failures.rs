use std::{
    io,
    sync::atomic::{AtomicUsize, Ordering},
};

use frame::{Column, DataType, Frame, FrameErr, Row, Schema, Value};
use linreg::{
    Backend, LinearModel, LinregErr, NumericTable, PairedTable, PartialResult, QrBackend,
    TrainOptions,
};
use orchestrator::{Stage, TrainError, configs::TrainConfig, train_with};

/// Counts every backend call, delegating to the QR backend.
#[derive(Default)]
struct CountingBackend {
    calls: AtomicUsize,
}

impl CountingBackend {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl Backend for CountingBackend {
    fn train_local(
        &self,
        tables: &PairedTable,
        options: &TrainOptions,
    ) -> linreg::Result<PartialResult> {
        self.hit();
        QrBackend.train_local(tables, options)
    }

    fn merge(
        &self,
        partials: Vec<PartialResult>,
        options: &TrainOptions,
    ) -> linreg::Result<LinearModel> {
        self.hit();
        QrBackend.merge(partials, options)
    }

    fn serialize(&self, model: &LinearModel) -> linreg::Result<Vec<u8>> {
        self.hit();
        QrBackend.serialize(model)
    }

    fn deserialize(&self, bytes: &[u8]) -> linreg::Result<LinearModel> {
        self.hit();
        QrBackend.deserialize(bytes)
    }
}

/// Trains normally but can't write the model anywhere.
struct DiskFullBackend;

impl Backend for DiskFullBackend {
    fn train_local(
        &self,
        tables: &PairedTable,
        options: &TrainOptions,
    ) -> linreg::Result<PartialResult> {
        QrBackend.train_local(tables, options)
    }

    fn merge(
        &self,
        partials: Vec<PartialResult>,
        options: &TrainOptions,
    ) -> linreg::Result<LinearModel> {
        QrBackend.merge(partials, options)
    }

    fn serialize(&self, _model: &LinearModel) -> linreg::Result<Vec<u8>> {
        Err(LinregErr::Io(io::Error::other("disk full")))
    }

    fn deserialize(&self, bytes: &[u8]) -> linreg::Result<LinearModel> {
        QrBackend.deserialize(bytes)
    }
}

/// Ignores the partials and returns a single feature model.
struct OneFeatureBackend;

impl Backend for OneFeatureBackend {
    fn train_local(
        &self,
        tables: &PairedTable,
        options: &TrainOptions,
    ) -> linreg::Result<PartialResult> {
        QrBackend.train_local(tables, options)
    }

    fn merge(
        &self,
        _partials: Vec<PartialResult>,
        options: &TrainOptions,
    ) -> linreg::Result<LinearModel> {
        let features = NumericTable::from_rows(1, vec![0.0, 1.0, 2.0])?;
        let labels = NumericTable::from_rows(1, vec![1.0, 3.0, 5.0])?;
        let partial = PartialResult::compute(&PairedTable::new(features, labels)?, options)?;
        LinearModel::solve(partial)
    }

    fn serialize(&self, model: &LinearModel) -> linreg::Result<Vec<u8>> {
        QrBackend.serialize(model)
    }

    fn deserialize(&self, bytes: &[u8]) -> linreg::Result<LinearModel> {
        QrBackend.deserialize(bytes)
    }
}

fn schema() -> Schema {
    Schema::new([
        Column::new("x1", DataType::Float64),
        Column::new("x2", DataType::Float64),
        Column::new("tag", DataType::Str),
        Column::new("y", DataType::Float64),
    ])
    .unwrap()
}

fn row(x1: f64, x2: f64, y: f64) -> Row {
    vec![
        Value::Float(x1),
        Value::Float(x2),
        Value::Str("t".into()),
        Value::Float(y),
    ]
}

fn frame(num_partitions: usize) -> Frame {
    let rows = (0..12)
        .map(|i| {
            let (x1, x2) = (i as f64, (i * i % 7) as f64);
            row(x1, x2, 1.0 + x1 - 2.0 * x2)
        })
        .collect();

    Frame::from_rows(schema(), rows, num_partitions).unwrap()
}

#[test]
fn missing_feature_column_never_reaches_the_backend() {
    let backend = CountingBackend::default();
    let config = TrainConfig::new(["x1", "x3"], "y");

    let err = train_with(&frame(3), &config, &backend).unwrap_err();

    assert!(matches!(
        err,
        TrainError::Frame(FrameErr::ColumnNotFound { ref name }) if name == "x3"
    ));
    assert_eq!(backend.calls(), 0);
}

#[test]
fn missing_value_column_never_reaches_the_backend() {
    let backend = CountingBackend::default();
    let config = TrainConfig::new(["x1", "x2"], "z");

    let err = train_with(&frame(3), &config, &backend).unwrap_err();

    assert!(matches!(err, TrainError::Frame(FrameErr::ColumnNotFound { .. })));
    assert_eq!(backend.calls(), 0);
}

#[test]
fn non_numeric_column_never_reaches_the_backend() {
    let backend = CountingBackend::default();
    let config = TrainConfig::new(["x1", "tag"], "y");

    let err = train_with(&frame(3), &config, &backend).unwrap_err();

    assert!(matches!(
        err,
        TrainError::Frame(FrameErr::NonNumericColumn { .. })
    ));
    assert_eq!(backend.calls(), 0);
}

#[test]
fn invalid_config_never_reaches_the_backend() {
    let backend = CountingBackend::default();
    let empty: [&str; 0] = [];

    for config in [
        TrainConfig::new(empty, "y"),
        TrainConfig::new(["x1", "x1"], "y"),
        TrainConfig::new(["x1", "y"], "y"),
    ] {
        let err = train_with(&frame(2), &config, &backend).unwrap_err();
        assert!(matches!(err, TrainError::InvalidConfig(_)));
        assert_eq!(err.stage(), Stage::Init);
    }

    assert_eq!(backend.calls(), 0);
}

#[test]
fn successful_training_calls_every_primitive_once_per_partition() {
    let backend = CountingBackend::default();
    let config = TrainConfig::new(["x1", "x2"], "y");

    train_with(&frame(4), &config, &backend).unwrap();

    // 4 local trainings, 1 merge, 1 serialization
    assert_eq!(backend.calls(), 6);
}

#[test]
fn serialization_failure_returns_no_model() {
    let config = TrainConfig::new(["x1", "x2"], "y");

    let err = train_with(&frame(2), &config, &DiskFullBackend).unwrap_err();

    assert!(matches!(err, TrainError::Serialize(_)));
    assert_eq!(err.stage(), Stage::Serialize);
    assert!(err.to_string().contains("disk full"));
}

#[test]
fn local_failure_names_the_partition() {
    let mut rows: Vec<Row> = (0..9).map(|i| row(i as f64, 1.0, i as f64)).collect();
    rows[7] = row(7.0, 1.0, f64::NAN);
    let frame = Frame::from_rows(schema(), rows, 3).unwrap();
    let config = TrainConfig::new(["x1"], "y");

    let err = train_with(&frame, &config, &QrBackend).unwrap_err();

    match err {
        TrainError::Compute {
            stage: Stage::TrainLocal,
            partition: Some(2),
            source: LinregErr::NonFinite { .. },
        } => {}
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn collinear_features_fail_the_merge() {
    let rows = (0..10)
        .map(|i| row(i as f64, 2.0 * i as f64, i as f64 + 0.5))
        .collect();
    let frame = Frame::from_rows(schema(), rows, 2).unwrap();
    let config = TrainConfig::new(["x1", "x2"], "y");

    let err = train_with(&frame, &config, &QrBackend).unwrap_err();

    assert!(matches!(
        err,
        TrainError::Compute {
            stage: Stage::MergeMaster,
            partition: None,
            source: LinregErr::RankDeficient { .. },
        }
    ));
}

#[test]
fn wrongly_sized_model_fails_the_extraction() {
    let config = TrainConfig::new(["x1", "x2"], "y");

    let err = train_with(&frame(2), &config, &OneFeatureBackend).unwrap_err();

    assert!(matches!(err, TrainError::Extract(_)));
    assert_eq!(err.stage(), Stage::ExtractWeights);
}

#[test]
fn null_cells_are_rejected_before_training() {
    let backend = CountingBackend::default();
    let mut rows: Vec<Row> = (0..4).map(|i| row(i as f64, 0.0, 1.0)).collect();
    rows[3][0] = Value::Null;
    let frame = Frame::from_rows(schema(), rows, 2).unwrap();

    let err = train_with(&frame, &TrainConfig::new(["x1"], "y"), &backend).unwrap_err();

    assert!(matches!(
        err,
        TrainError::Frame(FrameErr::NullValue { partition: 1, row: 1, .. })
    ));
    assert_eq!(backend.calls(), 0);
}
