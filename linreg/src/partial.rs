use log::debug;
use ndarray::{Array2, ArrayView2, Axis, s};
use serde::{Deserialize, Serialize};

use crate::{LinregErr, PairedTable, Result, qr};

/// Options shared by the local and the master training steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainOptions {
    /// Whether to estimate a constant term besides the per-feature weights.
    pub fit_intercept: bool,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            fit_intercept: true,
        }
    }
}

impl TrainOptions {
    /// Returns the amount of coefficients a model over `n_features` features has.
    pub fn n_coefficients(&self, n_features: usize) -> usize {
        n_features + usize::from(self.fit_intercept)
    }
}

/// The state a partition contributes to the final model.
///
/// Holds the triangular factor `R̃` of the QR decomposition of the partition's
/// augmented matrix `[1 | X | y]` (the ones column only when fitting an intercept).
/// Its top left block is `R`, the top of its last column is `Qᵀy` and its last
/// diagonal entry is the norm of the residual.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialResult {
    n_features: usize,
    fit_intercept: bool,
    n_observations: usize,
    factor: Array2<f64>,
}

fn finite_factor(factor: Array2<f64>) -> Result<Array2<f64>> {
    if factor.iter().all(|x| x.is_finite()) {
        Ok(factor)
    } else {
        Err(LinregErr::NonFinite { what: "factor" })
    }
}

impl PartialResult {
    /// Computes the partial result of a single partition.
    ///
    /// # Arguments
    /// * `tables` - The partition's features and labels.
    /// * `options` - The training options.
    ///
    /// # Returns
    /// The partial result or an error if the tables are empty of columns or hold non finite values.
    pub fn compute(tables: &PairedTable, options: &TrainOptions) -> Result<Self> {
        let features = tables.features();
        let labels = tables.labels();
        let n_features = features.ncols();

        if n_features == 0 {
            return Err(LinregErr::NoColumns);
        }
        if !features.is_finite() {
            return Err(LinregErr::NonFinite { what: "features" });
        }
        if !labels.is_finite() {
            return Err(LinregErr::NonFinite { what: "labels" });
        }

        let offset = usize::from(options.fit_intercept);
        let width = n_features + offset + 1;
        let nrows = tables.nrows();

        let mut augmented = Array2::zeros((nrows, width));
        if options.fit_intercept {
            augmented.column_mut(0).fill(1.0);
        }
        augmented
            .slice_mut(s![.., offset..offset + n_features])
            .assign(&features.view());
        augmented
            .slice_mut(s![.., width - 1..])
            .assign(&labels.view());

        let factor = finite_factor(qr::triangularize(augmented))?;
        debug!(rows = nrows, width = width; "computed partial factor");

        Ok(Self {
            n_features,
            fit_intercept: options.fit_intercept,
            n_observations: nrows,
            factor,
        })
    }

    /// Merges partial results into a single one, as if every row had been in one partition.
    ///
    /// The merge stacks the factors and triangularizes them again; thanks to the
    /// sign normalization the result doesn't depend on the order of `partials`
    /// beyond floating point rounding.
    ///
    /// # Arguments
    /// * `partials` - Every partial result of the training, each exactly once.
    ///
    /// # Returns
    /// The merged partial result or an error if `partials` is empty or inconsistent.
    pub fn merge<I>(partials: I) -> Result<Self>
    where
        I: IntoIterator<Item = PartialResult>,
    {
        let partials: Vec<_> = partials.into_iter().collect();
        let first = partials.first().ok_or(LinregErr::NoPartials)?;
        let (n_features, fit_intercept) = (first.n_features, first.fit_intercept);

        for (index, partial) in partials.iter().enumerate() {
            if partial.n_features != n_features {
                return Err(LinregErr::PartialMismatch {
                    index,
                    got: partial.n_features,
                    expected: n_features,
                });
            }
            if partial.fit_intercept != fit_intercept {
                return Err(LinregErr::InterceptMismatch { index });
            }
        }

        let views: Vec<_> = partials.iter().map(|p| p.factor.view()).collect();
        let stacked = ndarray::concatenate(Axis(0), &views).map_err(|_| {
            LinregErr::SizeMismatch {
                a: "partial factors",
                b: "stacked factor",
                got: views.len(),
                expected: partials.len(),
            }
        })?;

        let n_observations = partials.iter().map(|p| p.n_observations).sum();
        debug!(partials = partials.len(), observations = n_observations; "merging partial factors");

        Ok(Self {
            n_features,
            fit_intercept,
            n_observations,
            factor: finite_factor(qr::triangularize(stacked))?,
        })
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

    pub(crate) fn into_factor(self) -> Array2<f64> {
        self.factor
    }
}
