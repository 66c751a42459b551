use frame::{Column, DataType, Frame, Value};
use linreg::{Backend, LinearModel, NumericTable};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    convert::{self, ColumnSelection},
    error::{Stage, TrainError},
    model_data::ModelData,
};

/// The name of the column `predict` appends.
pub const PREDICTED_COLUMN: &str = "predicted_value";

/// Regression quality metrics of a model over a labelled frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RegressionMetrics {
    pub explained_variance: f64,
    pub mean_absolute_error: f64,
    pub mean_squared_error: f64,
    /// `NaN` when every label is the same.
    pub r2: f64,
    pub root_mean_squared_error: f64,
}

/// Running mean and sum of squared deviations, mergeable across partitions.
#[derive(Debug, Clone, Copy, Default)]
struct Moments {
    n: usize,
    mean: f64,
    m2: f64,
}

impl Moments {
    fn observe(&mut self, x: f64) {
        self.n += 1;
        let delta = x - self.mean;
        self.mean += delta / self.n as f64;
        self.m2 += delta * (x - self.mean);
    }

    fn merge(self, other: Self) -> Self {
        if self.n == 0 {
            return other;
        }
        if other.n == 0 {
            return self;
        }

        let (na, nb) = (self.n as f64, other.n as f64);
        let n = na + nb;
        let delta = other.mean - self.mean;

        Self {
            n: self.n + other.n,
            mean: self.mean + delta * nb / n,
            m2: self.m2 + other.m2 + delta * delta * na * nb / n,
        }
    }
}

/// What a partition contributes to the metrics.
#[derive(Debug, Clone, Copy, Default)]
struct ErrorStats {
    labels: Moments,
    preds: Moments,
    sum_abs_err: f64,
    sum_sq_err: f64,
}

impl ErrorStats {
    fn observe(&mut self, y: f64, pred: f64) {
        let err = pred - y;

        self.labels.observe(y);
        self.preds.observe(pred);
        self.sum_abs_err += err.abs();
        self.sum_sq_err += err * err;
    }

    fn merge(self, other: Self) -> Self {
        Self {
            labels: self.labels.merge(other.labels),
            preds: self.preds.merge(other.preds),
            sum_abs_err: self.sum_abs_err + other.sum_abs_err,
            sum_sq_err: self.sum_sq_err + other.sum_sq_err,
        }
    }

    fn metrics(&self) -> RegressionMetrics {
        let n = self.labels.n as f64;

        let ss_tot = self.labels.m2;
        // Σ(ŷ - ȳ)² = Σ(ŷ - mean(ŷ))² + n (mean(ŷ) - ȳ)²
        let shift = self.preds.mean - self.labels.mean;
        let ss_reg = self.preds.m2 + n * shift * shift;
        let mse = self.sum_sq_err / n;

        RegressionMetrics {
            explained_variance: ss_reg / n,
            mean_absolute_error: self.sum_abs_err / n,
            mean_squared_error: mse,
            r2: if ss_tot > 0.0 {
                1.0 - self.sum_sq_err / ss_tot
            } else {
                f64::NAN
            },
            root_mean_squared_error: mse.sqrt(),
        }
    }
}

fn predict_table(
    model: &LinearModel,
    partition: usize,
    table: &NumericTable,
) -> Result<Vec<f64>, TrainError> {
    model
        .predict(table)
        .map(|y| y.to_vec())
        .map_err(|source| TrainError::Compute {
            stage: Stage::Predict,
            partition: Some(partition),
            source,
        })
}

fn resolve_columns<'m>(
    model: &'m ModelData,
    observation_columns: Option<&'m [String]>,
) -> Result<&'m [String], TrainError> {
    let columns = observation_columns.unwrap_or(&model.observation_columns);

    if columns.len() != model.weights.len() {
        return Err(TrainError::InvalidConfig(format!(
            "{} observation column(s) given but the model has {} weight(s)",
            columns.len(),
            model.weights.len()
        )));
    }

    Ok(columns)
}

/// Appends a `predicted_value` column holding the model's prediction for every row.
///
/// # Arguments
/// * `frame` - The frame to predict on.
/// * `model` - A trained model.
/// * `observation_columns` - The feature columns, defaults to the ones the model was trained on.
/// * `backend` - The backend that serialized the model.
///
/// # Returns
/// A new frame, partitioned like `frame`, or the first failure.
pub fn predict_with<B: Backend>(
    frame: &Frame,
    model: &ModelData,
    observation_columns: Option<&[String]>,
    backend: &B,
) -> Result<Frame, TrainError> {
    let columns = resolve_columns(model, observation_columns)?;
    let selection = ColumnSelection::resolve(frame.schema(), columns, None)?;
    let restored = model.restore(backend)?;

    info!("predicting over {} partition(s)", frame.num_partitions());
    let tables = convert::feature_tables(frame, &selection)?;
    let values = tables.try_map(|i, table| {
        let preds = predict_table(&restored, i, &table)?;
        Ok::<_, TrainError>(preds.into_iter().map(Value::Float).collect::<Vec<_>>())
    })?;

    Ok(frame.with_column(Column::new(PREDICTED_COLUMN, DataType::Float64), values)?)
}

/// Computes regression metrics of a model over a labelled frame.
///
/// # Arguments
/// * `frame` - The labelled frame.
/// * `model` - A trained model.
/// * `observation_columns` - The feature columns, defaults to the ones the model was trained on.
/// * `value_column` - The label column, defaults to the one the model was trained on.
/// * `backend` - The backend that serialized the model.
pub fn test_with<B: Backend>(
    frame: &Frame,
    model: &ModelData,
    observation_columns: Option<&[String]>,
    value_column: Option<&str>,
    backend: &B,
) -> Result<RegressionMetrics, TrainError> {
    let columns = resolve_columns(model, observation_columns)?;
    let value_column = value_column.unwrap_or(&model.value_column);
    let selection = ColumnSelection::resolve(frame.schema(), columns, Some(value_column))?;

    if frame.num_rows() == 0 {
        return Err(TrainError::InvalidConfig(
            "can't test a model on an empty frame".into(),
        ));
    }

    let restored = model.restore(backend)?;

    info!("testing over {} partition(s)", frame.num_partitions());
    let tables = convert::paired_tables(frame, &selection)?;
    let stats = tables.try_map(|i, tables| {
        let preds = predict_table(&restored, i, tables.features())?;
        let mut stats = ErrorStats::default();

        for (&y, pred) in tables.labels().column(0).iter().zip(preds) {
            stats.observe(y, pred);
        }

        Ok::<_, TrainError>(stats)
    })?;

    let total = stats
        .collect()
        .into_iter()
        .fold(ErrorStats::default(), ErrorStats::merge);

    Ok(total.metrics())
}
