use ndarray::{Array1, Array2, ArrayView1, ArrayView2, s};

use crate::{LinregErr, Result};

/// Pivots smaller than this fraction of their column's norm are treated as zero.
const RANK_RTOL: f64 = 1e-10;

/// Returns the power of two closest below the largest magnitude of `column`.
///
/// Dividing by a power of two is exact, so scaling by it only moves the exponents.
fn column_scale(column: ArrayView1<f64>) -> f64 {
    let max = column.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()));
    if max == 0.0 || !max.is_finite() {
        return 1.0;
    }

    let exp = max.log2().floor().clamp(-1022.0, 1023.0) as i32;
    2.0_f64.powi(exp)
}

/// Euclidean norm of `v` without overflowing on large finite entries.
fn norm(v: ArrayView1<f64>) -> f64 {
    v.iter().fold(0.0_f64, |acc, x| acc.hypot(*x))
}

/// Reduces `a` (m x n) to the `R` factor of its QR decomposition via Householder reflections.
///
/// The returned matrix is always n x n: when `m < n` the missing rows are zero, which
/// keeps `RᵀR = AᵀA` and lets factors of different partitions be stacked together.
/// Rows are sign normalized so that the diagonal is non-negative, making `R` unique
/// for full rank inputs.
///
/// Columns are brought to unit magnitude before the reflections and restored after,
/// so entries close to the limits of `f64` don't overflow halfway.
pub(crate) fn triangularize(mut a: Array2<f64>) -> Array2<f64> {
    let (m, n) = a.dim();
    let steps = m.min(n);

    let scales: Vec<f64> = a.columns().into_iter().map(column_scale).collect();
    for (mut column, &scale) in a.columns_mut().into_iter().zip(&scales) {
        column.mapv_inplace(|x| x / scale);
    }

    for k in 0..steps {
        let col_norm = norm(a.slice(s![k.., k]));
        if col_norm == 0.0 {
            continue;
        }

        let alpha = if a[[k, k]] > 0.0 { -col_norm } else { col_norm };
        let mut v = a.slice(s![k.., k]).to_owned();
        v[0] -= alpha;

        let vtv = v.dot(&v);
        if vtv == 0.0 {
            continue;
        }

        for j in k..n {
            let tau = 2.0 * v.dot(&a.slice(s![k.., j])) / vtv;
            a.slice_mut(s![k.., j]).scaled_add(-tau, &v);
        }
    }

    let mut r = Array2::zeros((n, n));
    for i in 0..steps {
        r.slice_mut(s![i, i..]).assign(&a.slice(s![i, i..]));
    }

    normalize_signs(&mut r);

    for (mut column, &scale) in r.columns_mut().into_iter().zip(&scales) {
        column.mapv_inplace(|x| x * scale);
    }

    r
}

fn normalize_signs(r: &mut Array2<f64>) {
    for i in 0..r.nrows() {
        if r[[i, i]] < 0.0 {
            r.row_mut(i).mapv_inplace(|x| -x);
        }
    }
}

/// Solves the upper triangular system `r x = b`.
///
/// A pivot counts as zero when it is below `RANK_RTOL` times the norm of its column.
///
/// # Returns
/// The solution, `RankDeficient` naming the first (from the bottom) column whose
/// pivot is numerically zero, or `NonFinite` if the system or its solution isn't finite.
pub(crate) fn back_substitute(r: ArrayView2<f64>, b: ArrayView1<f64>) -> Result<Array1<f64>> {
    let n = r.ncols();

    if r.iter().chain(b.iter()).any(|x| !x.is_finite()) {
        return Err(LinregErr::NonFinite { what: "factor" });
    }

    let mut x = Array1::zeros(n);
    for i in (0..n).rev() {
        let pivot = r[[i, i]];
        if pivot.abs() <= RANK_RTOL * norm(r.slice(s![..=i, i])) {
            return Err(LinregErr::RankDeficient { column: i });
        }

        let tail = r.slice(s![i, i + 1..]).dot(&x.slice(s![i + 1..]));
        x[i] = (b[i] - tail) / pivot;

        if !x[i].is_finite() {
            return Err(LinregErr::NonFinite {
                what: "coefficients",
            });
        }
    }

    Ok(x)
}
