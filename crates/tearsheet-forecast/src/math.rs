//! Small dense linear algebra for regression fits.

use crate::error::{ForecastError, Result};
use ndarray::{Array1, Array2};

/// Pivot threshold below which a system is treated as singular.
const PIVOT_EPS: f64 = 1e-10;

/// Solve `a * x = b` by Gaussian elimination with partial pivoting.
///
/// `a` must be square. Returns [`ForecastError::SingularSystem`] when a
/// pivot collapses.
pub fn solve(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>> {
    let n = a.nrows();
    debug_assert_eq!(a.ncols(), n);
    debug_assert_eq!(b.len(), n);

    let mut m = a.clone();
    let mut rhs = b.clone();

    // Scale-relative threshold: collinear columns leave roundoff-sized
    // pivots that are still large in absolute terms.
    let scale = m.iter().fold(0.0_f64, |acc, v| acc.max(v.abs())).max(1.0);
    let tolerance = PIVOT_EPS * scale;

    for col in 0..n {
        // Partial pivot: largest magnitude in the remaining column.
        let mut pivot_row = col;
        let mut pivot_val = m[[col, col]].abs();
        for row in (col + 1)..n {
            let candidate = m[[row, col]].abs();
            if candidate > pivot_val {
                pivot_row = row;
                pivot_val = candidate;
            }
        }
        if !pivot_val.is_finite() || pivot_val < tolerance {
            return Err(ForecastError::SingularSystem);
        }
        if pivot_row != col {
            for k in 0..n {
                let tmp = m[[col, k]];
                m[[col, k]] = m[[pivot_row, k]];
                m[[pivot_row, k]] = tmp;
            }
            rhs.swap(col, pivot_row);
        }

        for row in (col + 1)..n {
            let factor = m[[row, col]] / m[[col, col]];
            for k in col..n {
                m[[row, k]] -= factor * m[[col, k]];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    // Back substitution.
    let mut x = Array1::zeros(n);
    for col in (0..n).rev() {
        let mut acc = rhs[col];
        for k in (col + 1)..n {
            acc -= m[[col, k]] * x[k];
        }
        x[col] = acc / m[[col, col]];
    }

    if x.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::SingularSystem);
    }
    Ok(x)
}

/// Ordinary least squares via the normal equations.
///
/// Columns are equilibrated to unit norm before forming the normal
/// equations so regressors on very different scales (fiscal years next
/// to dollar levels) keep the elimination stable.
pub fn least_squares(x: &Array2<f64>, y: &Array1<f64>) -> Result<Array1<f64>> {
    if x.iter().any(|v| !v.is_finite()) || y.iter().any(|v| !v.is_finite()) {
        return Err(ForecastError::SingularSystem);
    }

    let mut scaled = x.clone();
    let mut norms = Array1::ones(x.ncols());
    for (j, mut col) in scaled.columns_mut().into_iter().enumerate() {
        let norm = col.iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm < PIVOT_EPS {
            return Err(ForecastError::SingularSystem);
        }
        col.mapv_inplace(|v| v / norm);
        norms[j] = norm;
    }

    let xt = scaled.t();
    let xtx = xt.dot(&scaled);
    let xty = xt.dot(y);
    let beta = solve(&xtx, &xty)?;
    Ok(&beta / &norms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_solve_identity() {
        let a = array![[1.0, 0.0], [0.0, 1.0]];
        let b = array![3.0, -4.0];
        let x = solve(&a, &b).unwrap();
        assert_relative_eq!(x[0], 3.0);
        assert_relative_eq!(x[1], -4.0);
    }

    #[test]
    fn test_solve_requires_pivoting() {
        // Zero on the diagonal forces a row swap.
        let a = array![[0.0, 2.0], [3.0, 1.0]];
        let b = array![4.0, 5.0];
        let x = solve(&a, &b).unwrap();
        assert_relative_eq!(x[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_solve_singular() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        let b = array![1.0, 2.0];
        assert!(matches!(
            solve(&a, &b),
            Err(ForecastError::SingularSystem)
        ));
    }

    #[test]
    fn test_least_squares_exact_line() {
        // y = 2t + 1 over t = 0..4
        let x = array![
            [0.0, 1.0],
            [1.0, 1.0],
            [2.0, 1.0],
            [3.0, 1.0],
            [4.0, 1.0]
        ];
        let y = array![1.0, 3.0, 5.0, 7.0, 9.0];
        let beta = least_squares(&x, &y).unwrap();
        assert_relative_eq!(beta[0], 2.0, epsilon = 1e-9);
        assert_relative_eq!(beta[1], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_least_squares_rejects_nan_input() {
        let x = array![[f64::NAN, 1.0], [1.0, 1.0]];
        let y = array![1.0, 2.0];
        assert!(least_squares(&x, &y).is_err());
    }

    #[test]
    fn test_least_squares_collinear_columns() {
        let x = array![[1.0, 2.0], [2.0, 4.0], [3.0, 6.0]];
        let y = array![1.0, 2.0, 3.0];
        assert!(matches!(
            least_squares(&x, &y),
            Err(ForecastError::SingularSystem)
        ));
    }
}
