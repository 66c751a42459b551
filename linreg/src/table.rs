use ndarray::{Array2, ArrayView1, ArrayView2, Axis};

use crate::{LinregErr, Result};

/// A dense, row-major matrix of `f64`, the input format of every training primitive.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericTable {
    data: Array2<f64>,
}

impl NumericTable {
    pub fn new(data: Array2<f64>) -> Self {
        Self { data }
    }

    /// Creates a new `NumericTable` out of a flat row-major buffer.
    ///
    /// # Arguments
    /// * `ncols` - The amount of columns of the table.
    /// * `values` - The cells, row after row.
    ///
    /// # Returns
    /// The table or a `SizeMismatch` if `values` can't be split in rows of `ncols`.
    pub fn from_rows(ncols: usize, values: Vec<f64>) -> Result<Self> {
        if ncols == 0 {
            return Err(LinregErr::NoColumns);
        }

        let rem = values.len() % ncols;
        if rem != 0 {
            return Err(LinregErr::SizeMismatch {
                a: "values",
                b: "rows",
                got: values.len(),
                expected: values.len() + ncols - rem,
            });
        }

        let nrows = values.len() / ncols;
        let data = Array2::from_shape_vec((nrows, ncols), values).map_err(|_| {
            LinregErr::SizeMismatch {
                a: "values",
                b: "shape",
                got: nrows * ncols,
                expected: nrows * ncols,
            }
        })?;

        Ok(Self { data })
    }

    #[inline]
    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    #[inline]
    pub fn ncols(&self) -> usize {
        self.data.ncols()
    }

    #[inline]
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    #[inline]
    pub fn column(&self, j: usize) -> ArrayView1<'_, f64> {
        self.data.column(j)
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.data.iter().all(|x| x.is_finite())
    }

    /// Iterates the rows of the table.
    pub fn rows(&self) -> impl Iterator<Item = ArrayView1<'_, f64>> {
        self.data.axis_iter(Axis(0))
    }
}

/// The features and labels of one data partition, row `i` of one matching row `i` of the other.
#[derive(Debug, Clone, PartialEq)]
pub struct PairedTable {
    features: NumericTable,
    labels: NumericTable,
}

impl PairedTable {
    /// Creates a new `PairedTable`.
    ///
    /// # Arguments
    /// * `features` - The observations, one column per feature.
    /// * `labels` - The single column of values to regress on.
    ///
    /// # Returns
    /// The pair or a `SizeMismatch` if the row counts differ or `labels` isn't one column wide.
    pub fn new(features: NumericTable, labels: NumericTable) -> Result<Self> {
        if labels.ncols() != 1 {
            return Err(LinregErr::SizeMismatch {
                a: "labels",
                b: "label columns",
                got: labels.ncols(),
                expected: 1,
            });
        }

        if features.nrows() != labels.nrows() {
            return Err(LinregErr::SizeMismatch {
                a: "features",
                b: "labels",
                got: features.nrows(),
                expected: labels.nrows(),
            });
        }

        Ok(Self { features, labels })
    }

    pub fn features(&self) -> &NumericTable {
        &self.features
    }

    pub fn labels(&self) -> &NumericTable {
        &self.labels
    }

    pub fn nrows(&self) -> usize {
        self.features.nrows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_is_row_major() {
        let t = NumericTable::from_rows(2, vec![1., 2., 3., 4., 5., 6.]).unwrap();
        assert_eq!(t.nrows(), 3);
        assert_eq!(t.column(1).to_vec(), [2., 4., 6.]);
    }

    #[test]
    fn from_rows_accepts_empty_tables() {
        let t = NumericTable::from_rows(3, vec![]).unwrap();
        assert_eq!((t.nrows(), t.ncols()), (0, 3));
    }

    #[test]
    fn from_rows_rejects_ragged_buffers() {
        assert!(NumericTable::from_rows(2, vec![1., 2., 3.]).is_err());
        assert!(NumericTable::from_rows(0, vec![]).is_err());
    }

    #[test]
    fn paired_table_requires_matching_rows() {
        let x = NumericTable::from_rows(1, vec![1., 2.]).unwrap();
        let y = NumericTable::from_rows(1, vec![1.]).unwrap();
        assert!(PairedTable::new(x, y).is_err());
    }

    #[test]
    fn paired_table_requires_single_label_column() {
        let x = NumericTable::from_rows(1, vec![1., 2.]).unwrap();
        let y = NumericTable::from_rows(2, vec![1., 2.]).unwrap();
        assert!(PairedTable::new(x, y).is_err());
    }
}
