//! independence_tests::residuals — (weighted) least-squares residualization.
//!
//! Purpose
//! -------
//! Remove the linear influence of the conditioning rows `Z` from one target
//! row of a test array. With per-sample standard deviations `σ_t` the fit is
//! weighted least squares with weights `w_t = 1/σ_t`; unit `σ` reduces it to
//! ordinary least squares.
//!
//! Key behaviors
//! -------------
//! - Optionally standardize every row (population std) before fitting.
//! - Solve `min ‖W Zᵀβ − W y‖` with the minimum-norm SVD solver, so
//!   rank-deficient `Z` is not an error.
//! - Return the *weighted* residual `W (y − Zᵀβ)` and the fitted mean
//!   `Zᵀβ`; without `Z` the residual is `W y`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Rows are `[X, Y, Z…]`; the target row is `0` (X) or `1` (Y) and rows
//!   `2..` are the regressors.
//! - Missing or mis-sized standard deviations degrade to unit weights with a
//!   warning instead of failing.
//!
//! Conventions
//! -----------
//! - A NaN anywhere in the array (before or after standardization) is a
//!   hard [`CITestError::NanInArray`]; non-finite weighted residuals are a
//!   [`CITestError::NonFiniteResidual`].
//! - Warnings are emitted through `tracing`.
use crate::independence_tests::errors::{CITestError, CITestResult};
use crate::numerical::lstsq;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, s};
use tracing::warn;

/// WeightedResiduals — output of [`weighted_residuals`].
///
/// Fields
/// ------
/// - `resid`: `Array1<f64>`
///   Weighted residual `W (y − Zᵀβ)`, or `W y` without conditioning rows.
/// - `mean`: `Option<Array1<f64>>`
///   Fitted (unweighted) mean `Zᵀβ`; `None` without conditioning rows.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedResiduals {
    pub resid: Array1<f64>,
    pub mean: Option<Array1<f64>>,
}

/// Residualize row `target_var` of `array` against rows `2..` by WLS.
///
/// Parameters
/// ----------
/// - `array`: `ArrayView2<f64>`
///   Test array of shape `(dim, T)`.
/// - `target_var`: `usize`
///   Row to residualize, `0` for X or `1` for Y.
/// - `stds`: `Option<ArrayView1<f64>>`
///   Standard deviations of the target's noise, length `T`.
/// - `standardize`: `bool`
///   Center and scale each row before fitting.
/// - `verbosity`: `u8`
///   `> 0` enables the constant-row warning.
///
/// Errors
/// ------
/// - `NanInArray` if the array contains NaN.
/// - `NonFiniteResidual` if weighting produced NaN or ±∞.
/// - `Numerical` if the SVD fails.
pub fn weighted_residuals(
    array: ArrayView2<f64>, target_var: usize, stds: Option<ArrayView1<f64>>, standardize: bool,
    verbosity: u8,
) -> CITestResult<WeightedResiduals> {
    if array.iter().any(|v| v.is_nan()) {
        return Err(CITestError::NanInArray);
    }
    let (dim, n_samples) = array.dim();

    let stds = match stds {
        Some(stds) if stds.len() == n_samples => stds.to_owned(),
        _ => {
            warn!(
                target_var,
                "no usable standard deviations for weighting; assuming homoskedastic noise"
            );
            Array1::ones(n_samples)
        }
    };

    let array = if standardize {
        let standardized = standardize_rows(array, verbosity);
        if standardized.iter().any(|v| v.is_nan()) {
            return Err(CITestError::NanInArray);
        }
        standardized
    } else {
        array.to_owned()
    };

    let weights = stds.mapv(|s| 1.0 / s);
    let target = array.row(target_var);

    let (resid, mean) = if dim > 2 {
        let z = array.slice(s![2.., ..]).reversed_axes();
        let zw = &z * &weights.view().insert_axis(Axis(1));
        let yw = &target * &weights;
        let beta = lstsq(zw.view(), yw.view())?;
        let mean = z.dot(&beta);
        ((&target - &mean) * &weights, Some(mean))
    } else {
        (&target * &weights, None)
    };

    if resid.iter().any(|v| !v.is_finite()) {
        return Err(CITestError::NonFiniteResidual { target_var });
    }
    Ok(WeightedResiduals { resid, mean })
}

/// Center each row and divide by its population std; constant rows are
/// only centered.
fn standardize_rows(array: ArrayView2<f64>, verbosity: u8) -> Array2<f64> {
    let mut out = array.to_owned();
    let mut constant_rows = Vec::new();
    for (i, mut row) in out.axis_iter_mut(Axis(0)).enumerate() {
        let n = row.len() as f64;
        let mean = row.sum() / n;
        row.mapv_inplace(|v| v - mean);
        let std = (row.iter().map(|v| v * v).sum::<f64>() / n).sqrt();
        if std != 0.0 {
            row.mapv_inplace(|v| v / std);
        } else {
            constant_rows.push(i);
        }
    }
    if verbosity > 0 && !constant_rows.is_empty() {
        warn!(?constant_rows, "possibly constant array rows");
    }
    out
}
