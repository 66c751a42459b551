use ndarray::{Array1, Array2, ArrayView1, ArrayView2, s};

use crate::{LinregErr, NumericTable, PartialResult, Result, qr};

/// A trained linear regression model.
///
/// The coefficient vector has the intercept first when the model was fitted with
/// one, followed by one weight per feature in feature order.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    n_features: usize,
    fit_intercept: bool,
    n_observations: usize,
    coefficients: Vec<f64>,
    factor: Array2<f64>,
}

impl LinearModel {
    /// Solves the least squares problem summarized by a (merged) partial result.
    ///
    /// # Returns
    /// The model, `RankDeficient` if the observations don't determine every coefficient
    /// or `NonFinite` if a coefficient can't be represented.
    pub fn solve(partial: PartialResult) -> Result<Self> {
        let n_features = partial.n_features();
        let fit_intercept = partial.fit_intercept();
        let n_observations = partial.n_observations();
        let factor = partial.into_factor();

        let k = factor.ncols() - 1;
        let r = factor.slice(s![..k, ..k]);
        let qty = factor.slice(s![..k, k]);
        let coefficients = qr::back_substitute(r, qty)?.to_vec();

        Ok(Self {
            n_features,
            fit_intercept,
            n_observations,
            coefficients,
            factor,
        })
    }

    pub(crate) fn from_parts(
        n_features: usize,
        fit_intercept: bool,
        n_observations: usize,
        coefficients: Vec<f64>,
        factor: Array2<f64>,
    ) -> Result<Self> {
        let k = n_features + usize::from(fit_intercept);

        if coefficients.len() != k {
            return Err(LinregErr::SizeMismatch {
                a: "coefficients",
                b: "features",
                got: coefficients.len(),
                expected: k,
            });
        }

        if factor.dim() != (k + 1, k + 1) {
            return Err(LinregErr::SizeMismatch {
                a: "factor",
                b: "coefficients",
                got: factor.nrows(),
                expected: k + 1,
            });
        }

        Ok(Self {
            n_features,
            fit_intercept,
            n_observations,
            coefficients,
            factor,
        })
    }

    /// Returns the raw coefficient vector, intercept first when fitted.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn fit_intercept(&self) -> bool {
        self.fit_intercept
    }

    pub fn n_observations(&self) -> usize {
        self.n_observations
    }

    pub fn factor(&self) -> ArrayView2<'_, f64> {
        self.factor.view()
    }

    /// Returns the residual sum of squares over the training observations.
    pub fn residual_sum_of_squares(&self) -> f64 {
        let k = self.factor.ncols() - 1;
        self.factor[[k, k]].powi(2)
    }

    fn split(&self) -> (f64, ArrayView1<'_, f64>) {
        let coefficients = ArrayView1::from(self.coefficients.as_slice());

        if self.fit_intercept {
            (coefficients[0], coefficients.slice_move(s![1..]))
        } else {
            (0.0, coefficients)
        }
    }

    /// Predicts one value per row of `features`.
    ///
    /// # Returns
    /// The predictions or a `SizeMismatch` if the column count isn't the model's feature count.
    pub fn predict(&self, features: &NumericTable) -> Result<Array1<f64>> {
        if features.ncols() != self.n_features {
            return Err(LinregErr::SizeMismatch {
                a: "features",
                b: "model features",
                got: features.ncols(),
                expected: self.n_features,
            });
        }

        let (intercept, weights) = self.split();
        Ok(features.view().dot(&weights) + intercept)
    }
}
