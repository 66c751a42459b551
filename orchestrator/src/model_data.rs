use linreg::{Backend, LinearModel};
use serde::{Deserialize, Serialize};

use crate::error::TrainError;

/// The outcome of a training: the serialized model plus its decoded weights and intercept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ModelData {
    pub serialized_model: Vec<u8>,
    /// One weight per observation column, in column order.
    pub weights: Vec<f64>,
    pub intercept: f64,
    pub observation_columns: Vec<String>,
    pub value_column: String,
}

impl ModelData {
    /// Decodes `serialized_model` with the backend that produced it.
    pub fn restore<B: Backend>(&self, backend: &B) -> Result<LinearModel, TrainError> {
        let model = backend
            .deserialize(&self.serialized_model)
            .map_err(TrainError::Restore)?;

        if model.n_features() != self.weights.len() {
            return Err(TrainError::InvalidConfig(format!(
                "the serialized model has {} features but the model data has {} weights",
                model.n_features(),
                self.weights.len()
            )));
        }

        Ok(model)
    }
}

/// Splits a raw coefficient vector into `(weights, intercept)`.
///
/// With an intercept the first coefficient is the intercept and the rest are the
/// weights; without one every coefficient is a weight and the intercept is zero.
///
/// # Arguments
/// * `coefficients` - The coefficients of the final model.
/// * `n_features` - The amount of observation columns trained on.
/// * `fit_intercept` - Whether the model was trained with an intercept.
///
/// # Returns
/// The split or an `Extract` error if the vector doesn't hold exactly one
/// coefficient per feature (plus the intercept).
pub fn split_coefficients(
    coefficients: &[f64],
    n_features: usize,
    fit_intercept: bool,
) -> Result<(Vec<f64>, f64), TrainError> {
    let expected = n_features + usize::from(fit_intercept);

    if coefficients.is_empty() {
        return Err(TrainError::Extract(
            "the model has an empty coefficient vector".into(),
        ));
    }

    if coefficients.len() != expected {
        return Err(TrainError::Extract(format!(
            "the model has {} coefficients, expected {expected}",
            coefficients.len()
        )));
    }

    match coefficients.split_first() {
        Some((&intercept, weights)) if fit_intercept => Ok((weights.to_vec(), intercept)),
        _ => Ok((coefficients.to_vec(), 0.0)),
    }
}
