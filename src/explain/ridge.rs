//! Weighted ridge regression used as the local surrogate model.
//!
//! Closed-form solve of ||W^(1/2)(y - Xβ)||² + α||β||² via Cholesky
//! decomposition. Feature matrices here are small (one column per distinct
//! token of a single review), so the dense solve is plenty.

use ndarray::{Array1, Array2};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RidgeError {
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Invalid alpha value: {0}")]
    InvalidAlpha(f64),

    #[error("Computation error: {0}")]
    Computation(String),
}

/// Result of a weighted ridge fit.
#[derive(Debug, Clone)]
pub struct RidgeFit {
    pub coefficients: Array1<f64>,
    pub intercept: f64,
}

/// Fit β = (X'WX + αI)^(-1) X'Wy with an intercept, where W is a diagonal
/// sample-weight matrix.
pub fn fit_weighted(
    x: &Array2<f64>,
    y: &Array1<f64>,
    weights: &Array1<f64>,
    alpha: f64,
) -> Result<RidgeFit, RidgeError> {
    if alpha < 0.0 {
        return Err(RidgeError::InvalidAlpha(alpha));
    }
    if y.len() != x.nrows() {
        return Err(RidgeError::DimensionMismatch {
            expected: x.nrows(),
            got: y.len(),
        });
    }
    if weights.len() != x.nrows() {
        return Err(RidgeError::DimensionMismatch {
            expected: x.nrows(),
            got: weights.len(),
        });
    }

    let n_features = x.ncols();
    let weight_sum: f64 = weights.sum();
    if weight_sum <= 0.0 {
        return Err(RidgeError::Computation(
            "Sample weights sum to zero".to_string(),
        ));
    }

    // Weighted means for centering, so the intercept absorbs the baseline.
    let mut x_mean = Array1::<f64>::zeros(n_features);
    for (i, row) in x.rows().into_iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            x_mean[j] += weights[i] * value;
        }
    }
    x_mean.mapv_inplace(|v| v / weight_sum);
    let y_mean = weights.dot(y) / weight_sum;

    // Fold sqrt-weights into the centered design so the unweighted normal
    // equations below solve the weighted problem.
    let mut x_scaled = Array2::<f64>::zeros(x.raw_dim());
    let mut y_scaled = Array1::<f64>::zeros(y.len());
    for i in 0..x.nrows() {
        let sw = weights[i].sqrt();
        for j in 0..n_features {
            x_scaled[[i, j]] = sw * (x[[i, j]] - x_mean[j]);
        }
        y_scaled[i] = sw * (y[i] - y_mean);
    }

    let mut xtx = x_scaled.t().dot(&x_scaled);
    for j in 0..n_features {
        xtx[[j, j]] += alpha;
    }
    let xty = x_scaled.t().dot(&y_scaled);

    let coefficients = cholesky_solve(&xtx, &xty)?;
    let intercept = y_mean - x_mean.dot(&coefficients);

    Ok(RidgeFit {
        coefficients,
        intercept,
    })
}

/// Solve A x = b for symmetric positive-definite A.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>, RidgeError> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));

    for i in 0..n {
        for j in 0..=i {
            let mut sum = 0.0;
            for k in 0..j {
                sum += l[[i, k]] * l[[j, k]];
            }

            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 {
                    return Err(RidgeError::Computation(
                        "Matrix not positive definite".to_string(),
                    ));
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // Forward substitution: L z = b
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let mut sum = 0.0;
        for j in 0..i {
            sum += l[[i, j]] * z[j];
        }
        z[i] = (b[i] - sum) / l[[i, i]];
    }

    // Backward substitution: L' x = z
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let mut sum = 0.0;
        for j in (i + 1)..n {
            sum += l[[j, i]] * x[j];
        }
        x[i] = (z[i] - sum) / l[[i, i]];
    }

    Ok(x)
}
