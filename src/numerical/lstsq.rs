//! numerical::lstsq — minimum-norm linear least squares.
//!
//! Purpose
//! -------
//! Solve `min_β ‖y − Aβ‖²` for a dense `n×p` design `A` stored as an
//! `ndarray` matrix, returning the minimum-norm solution when `A` is rank
//! deficient. This is the regression primitive behind both the ordinary
//! residuals used for variance estimation and the weighted residuals used
//! for the partial-correlation statistic.
//!
//! Key behaviors
//! -------------
//! - Copy the `ndarray` design into a `nalgebra::DMatrix` and decompose it
//!   with a thin SVD.
//! - Truncate singular values at `ε · max(n, p) · σ_max`, where `ε` is the
//!   machine epsilon, so collinear or constant columns never raise.
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are finite; callers reject NaNs before regressing.
//! - `design.nrows() == target.len()`; mismatches return
//!   [`NumericalError::DimensionMismatch`].
//!
//! Testing notes
//! -------------
//! - Unit tests cover an exactly determined system, an over-determined
//!   noisy fit against the normal-equations solution, and a rank-deficient
//!   design with duplicated columns (minimum-norm split of the coefficient).
use crate::numerical::errors::{NumericalError, NumericalResult};
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, ArrayView1, ArrayView2};

/// Minimum-norm least-squares coefficients for `design · β ≈ target`.
///
/// Parameters
/// ----------
/// - `design`: `ArrayView2<f64>`
///   `n×p` design matrix, rows are observations and columns predictors.
/// - `target`: `ArrayView1<f64>`
///   Length-`n` response vector.
///
/// Returns
/// -------
/// `NumericalResult<Array1<f64>>`
///   Length-`p` coefficient vector. An empty design (`p = 0`) yields an
///   empty vector and a design without rows yields zeros.
///
/// Errors
/// ------
/// - `NumericalError::DimensionMismatch` when the row count and target
///   length differ.
/// - `NumericalError::Decomposition` if the SVD backend refuses to solve.
///
/// Notes
/// -----
/// - Singular values at or below the cutoff are treated as zero, which
///   matches the `rcond=None` convention of LAPACK-style `lstsq` drivers.
pub fn lstsq(design: ArrayView2<f64>, target: ArrayView1<f64>) -> NumericalResult<Array1<f64>> {
    let (n, p) = design.dim();
    if n != target.len() {
        return Err(NumericalError::DimensionMismatch { rows: n, len: target.len() });
    }
    if p == 0 {
        return Ok(Array1::zeros(0));
    }
    if n == 0 {
        return Ok(Array1::zeros(p));
    }

    let a = DMatrix::<f64>::from_fn(n, p, |i, j| design[[i, j]]);
    let b = DVector::<f64>::from_iterator(n, target.iter().copied());
    let svd = a.svd(true, true);
    let sigma_max = svd.singular_values.iter().copied().fold(0.0_f64, f64::max);
    let cutoff = f64::EPSILON * (n.max(p) as f64) * sigma_max;

    let beta = svd
        .solve(&b, cutoff)
        .map_err(|reason| NumericalError::Decomposition(reason.to_string()))?;
    Ok(beta.iter().copied().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{Array2, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Exact recovery on a square, well-conditioned system.
    // - Agreement with the normal equations on an over-determined fit.
    // - Minimum-norm behavior on a rank-deficient design.
    // - Dimension mismatch reporting.
    // -------------------------------------------------------------------------

    const TOL: f64 = 1e-10;

    #[test]
    // Purpose
    // -------
    // Ensure an exactly determined system is solved exactly.
    //
    // Given
    // -----
    // - A = [[2, 0], [1, 3]], y = A · [1, -2].
    //
    // Expect
    // ------
    // - β = [1, -2] up to tolerance.
    fn lstsq_square_system_recovers_exact_coefficients() {
        // Arrange
        let a = array![[2.0, 0.0], [1.0, 3.0]];
        let y = array![2.0, -5.0];

        // Act
        let beta = lstsq(a.view(), y.view()).unwrap();

        // Assert
        assert_relative_eq!(beta[0], 1.0, epsilon = TOL);
        assert_relative_eq!(beta[1], -2.0, epsilon = TOL);
    }

    #[test]
    // Purpose
    // -------
    // Check the over-determined fit against the closed-form simple
    // regression slope through the origin, β = Σxy / Σx².
    //
    // Given
    // -----
    // - A single predictor x = [1, 2, 3, 4] and y = [1.1, 1.9, 3.2, 3.9].
    //
    // Expect
    // ------
    // - β matches Σxy / Σx².
    fn lstsq_single_predictor_matches_closed_form_slope() {
        // Arrange
        let x = array![1.0, 2.0, 3.0, 4.0];
        let y = array![1.1, 1.9, 3.2, 3.9];
        let a = x.clone().into_shape_with_order((4, 1)).unwrap();

        // Act
        let beta = lstsq(a.view(), y.view()).unwrap();

        // Assert
        let expected = x.dot(&y) / x.dot(&x);
        assert_relative_eq!(beta[0], expected, epsilon = TOL);
    }

    #[test]
    // Purpose
    // -------
    // Verify that a design with two identical columns does not fail and
    // splits the coefficient evenly (minimum-norm solution).
    //
    // Given
    // -----
    // - Columns c1 = c2 = [1, 2, 3] and y = 2 · c1.
    //
    // Expect
    // ------
    // - β ≈ [1, 1] and the fitted values reproduce y.
    fn lstsq_rank_deficient_design_returns_minimum_norm_solution() {
        // Arrange
        let a = array![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0]];
        let y = array![2.0, 4.0, 6.0];

        // Act
        let beta = lstsq(a.view(), y.view()).unwrap();

        // Assert
        assert_relative_eq!(beta[0], 1.0, epsilon = 1e-8);
        assert_relative_eq!(beta[1], 1.0, epsilon = 1e-8);
        let fitted = a.dot(&beta);
        for (f, t) in fitted.iter().zip(y.iter()) {
            assert_relative_eq!(*f, *t, epsilon = 1e-8);
        }
    }

    #[test]
    // Purpose
    // -------
    // Ensure an all-zero design yields zero coefficients instead of an error.
    //
    // Given
    // -----
    // - A 3×2 zero matrix and an arbitrary target.
    //
    // Expect
    // ------
    // - β = [0, 0].
    fn lstsq_zero_design_returns_zero_coefficients() {
        // Arrange
        let a = Array2::<f64>::zeros((3, 2));
        let y = array![1.0, -1.0, 0.5];

        // Act
        let beta = lstsq(a.view(), y.view()).unwrap();

        // Assert
        assert_eq!(beta, array![0.0, 0.0]);
    }

    #[test]
    // Purpose
    // -------
    // Verify that a row/target mismatch is reported, not panicked on.
    //
    // Given
    // -----
    // - A 3×1 design and a length-2 target.
    //
    // Expect
    // ------
    // - `Err(NumericalError::DimensionMismatch { rows: 3, len: 2 })`.
    fn lstsq_dimension_mismatch_returns_error() {
        // Arrange
        let a = array![[1.0], [2.0], [3.0]];
        let y = array![1.0, 2.0];

        // Act
        let result = lstsq(a.view(), y.view());

        // Assert
        assert_eq!(result, Err(NumericalError::DimensionMismatch { rows: 3, len: 2 }));
    }
}
