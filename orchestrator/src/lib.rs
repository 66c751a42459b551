pub mod configs;
mod convert;
pub mod error;
mod evaluation;
mod model_data;
mod session;

use frame::Frame;
use linreg::{Backend, QrBackend};

pub use error::{Stage, TrainError};
pub use evaluation::{PREDICTED_COLUMN, RegressionMetrics, predict_with, test_with};
pub use model_data::{ModelData, split_coefficients};
pub use session::Session;

use crate::configs::TrainConfig;

/// Trains a linear regression model over every partition of `frame` with the QR backend.
///
/// # Errors
/// Returns a `TrainError` naming the stage that failed.
pub fn train(frame: &Frame, config: &TrainConfig) -> Result<ModelData, TrainError> {
    train_with(frame, config, &QrBackend::new())
}

/// Trains a linear regression model over every partition of `frame` with `backend`.
///
/// # Errors
/// Returns a `TrainError` naming the stage that failed.
pub fn train_with<B: Backend>(
    frame: &Frame,
    config: &TrainConfig,
    backend: &B,
) -> Result<ModelData, TrainError> {
    log::info!(
        "training on {} row(s) in {} partition(s)",
        frame.num_rows(),
        frame.num_partitions()
    );
    Session::new(frame, config, backend).run()
}

/// Appends the model's predictions to `frame`, see `predict_with`.
pub fn predict(
    frame: &Frame,
    model: &ModelData,
    observation_columns: Option<&[String]>,
) -> Result<Frame, TrainError> {
    predict_with(frame, model, observation_columns, &QrBackend::new())
}

/// Measures the model over a labelled `frame`, see `test_with`.
pub fn test(
    frame: &Frame,
    model: &ModelData,
    observation_columns: Option<&[String]>,
    value_column: Option<&str>,
) -> Result<RegressionMetrics, TrainError> {
    test_with(
        frame,
        model,
        observation_columns,
        value_column,
        &QrBackend::new(),
    )
}
