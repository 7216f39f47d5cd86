//! Least squares solvers.
//!
//! Logistic regression is fitted by iteratively reweighted least squares: every
//! Newton step is a small weighted, ridge-penalized regression
//!
//! ```text
//! minimize Σ w_i (z_i - x_i^T β)^2 + λ Σ_{j≥1} β_j^2
//! ```
//!
//! Implementation choices:
//! - Rows are scaled by `sqrt(w_i)` and the penalty is appended as `sqrt(λ)`
//!   identity rows (intercept column excluded), which turns the problem into an
//!   ordinary least squares problem on a tall matrix.
//! - That problem is solved with SVD, which stays robust when columns are
//!   nearly collinear (e.g. a constant feature after standardization).

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Solve a weighted ridge regression. Column 0 of `x` is the unpenalized intercept.
///
/// `weights` must have one entry per row of `x` and be non-negative.
pub fn solve_weighted_ridge(
    x: &DMatrix<f64>,
    z: &DVector<f64>,
    weights: &[f64],
    lambda: f64,
) -> Option<DVector<f64>> {
    let (n, p) = x.shape();
    if weights.len() != n || z.len() != n {
        return None;
    }

    let penalized = if lambda > 0.0 { p.saturating_sub(1) } else { 0 };
    let mut a = DMatrix::<f64>::zeros(n + penalized, p);
    let mut b = DVector::<f64>::zeros(n + penalized);

    for i in 0..n {
        let sw = weights[i].max(0.0).sqrt();
        for j in 0..p {
            a[(i, j)] = sw * x[(i, j)];
        }
        b[i] = sw * z[i];
    }

    let sl = lambda.sqrt();
    for k in 0..penalized {
        a[(n + k, k + 1)] = sl;
    }

    solve_least_squares(&a, &b)
}
