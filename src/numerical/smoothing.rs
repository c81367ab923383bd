//! numerical::smoothing — trailing moving averages and sort/unsort helpers.
//!
//! Purpose
//! -------
//! Provide the residual-magnitude smoothing used by the standard-deviation
//! estimators, together with the permutation helpers needed to smooth in a
//! sorted order and map results back to time order.
//!
//! Key behaviors
//! -------------
//! - [`trailing_mean`] computes a box-kernel "valid" convolution divided by
//!   the window: entry `k` is the mean of `values[k..k + w]`.
//! - [`smooth_with_placeholder`] prefixes `w − 1` ones to the trailing mean
//!   so the output keeps the input length; position `t ≥ w − 1` holds the
//!   mean of the `w` most recent values ending at `t`.
//! - [`stable_argsort`] and [`invert_permutation`] implement the
//!   sort → process → unsort pattern.
//!
//! Invariants & assumptions
//! ------------------------
//! - Windows satisfy `1 ≤ w ≤ n`; anything else is an
//!   [`NumericalError::InvalidWindow`].
//! - Sort keys are finite. Ties keep their original relative order.
//!
//! Conventions
//! -----------
//! - The leading ones are a placeholder for positions without a full
//!   window, not an estimate; callers document this where it matters.
use crate::numerical::errors::{NumericalError, NumericalResult};
use ndarray::{Array1, ArrayView1};
use std::cmp::Ordering;

/// Box-kernel trailing mean with "valid" convolution length `n − w + 1`.
pub fn trailing_mean(values: ArrayView1<f64>, window: usize) -> NumericalResult<Array1<f64>> {
    let n = values.len();
    if window == 0 || window > n {
        return Err(NumericalError::InvalidWindow { window, len: n });
    }

    let w = window as f64;
    Ok(values.windows(window).into_iter().map(|win| win.sum() / w).collect())
}

/// Trailing mean padded with `w − 1` leading ones so the length is kept.
///
/// Parameters
/// ----------
/// - `values`: `ArrayView1<f64>`
///   Sequence to smooth (typically absolute residuals).
/// - `window`: `usize`
///   Window length `w`, `1 ≤ w ≤ values.len()`.
///
/// Returns
/// -------
/// `NumericalResult<Array1<f64>>`
///   Vector of length `values.len()` whose first `w − 1` entries are
///   exactly `1.0`.
///
/// Errors
/// ------
/// - `NumericalError::InvalidWindow` if the window is zero or too long.
pub fn smooth_with_placeholder(
    values: ArrayView1<f64>, window: usize,
) -> NumericalResult<Array1<f64>> {
    let smoothed = trailing_mean(values, window)?;
    let mut out = Array1::<f64>::ones(values.len());
    out.slice_mut(ndarray::s![window - 1..]).assign(&smoothed);
    Ok(out)
}

/// Indices that sort `keys` ascending; equal keys keep their input order.
pub fn stable_argsort(keys: ArrayView1<f64>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..keys.len()).collect();
    // `sort_by` is stable, so ties keep their relative order.
    order.sort_by(|&a, &b| keys[a].partial_cmp(&keys[b]).unwrap_or(Ordering::Equal));
    order
}

/// Inverse of a permutation: `inv[perm[i]] = i`.
pub fn invert_permutation(perm: &[usize]) -> Vec<usize> {
    let mut inv = vec![0; perm.len()];
    for (i, &p) in perm.iter().enumerate() {
        inv[p] = i;
    }
    inv
}
