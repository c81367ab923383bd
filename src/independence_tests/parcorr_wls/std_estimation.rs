//! parcorr_wls::std_estimation — per-sample noise standard deviations.
//!
//! Purpose
//! -------
//! Approximate the noise standard deviation of a target row at every sample
//! by smoothing absolute OLS residuals:
//!
//! - *time-dependent*: a trailing window in time order;
//! - *parent-dependent*: a trailing window in the order of a driver
//!   variable's values, mapped back to time order afterwards.
//!
//! Key behaviors
//! -------------
//! - Residuals come from an unweighted, unstandardized regression on the
//!   conditioning rows; without conditioning rows the raw target is used.
//! - The first `w − 1` smoothed positions hold the placeholder `1.0`.
//! - Parent-dependent estimation aligns the driver with the target using
//!   the effective lag `driver.lag + target.lag`: the residual at reference
//!   time `t` pairs with the driver's lag-zero value at time `t − |lag|`.
//!   The earliest `|lag|` residuals are left out of the sorting and get the
//!   placeholder `1.0`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `1 ≤ w`; the sequence being smoothed must hold at least `w` values or
//!   the estimate fails with [`CITestError::WindowTooLarge`].
//! - `time_indices` are the strictly increasing reference times of the
//!   array's columns, so `time_indices[i] ≥ i`.
use crate::data::VarLag;
use crate::independence_tests::errors::{CITestError, CITestResult};
use crate::independence_tests::parcorr_wls::aux_cache::AuxiliaryCache;
use crate::numerical::{invert_permutation, lstsq, smooth_with_placeholder, stable_argsort};
use ndarray::{Array1, ArrayView2, s};

/// Absolute OLS residuals of `target_row` on rows `2..` (or `|target|`).
fn abs_ols_residuals(array: ArrayView2<f64>, target_row: usize) -> CITestResult<Array1<f64>> {
    let target = array.row(target_row);
    if array.nrows() > 2 {
        let z = array.slice(s![2.., ..]).reversed_axes();
        let beta = lstsq(z, target)?;
        Ok((&target - &z.dot(&beta)).mapv(f64::abs))
    } else {
        Ok(target.mapv(f64::abs))
    }
}

/// Time-dependent std estimate of `target_row`, length `T`.
///
/// Errors
/// ------
/// - `InvalidWindowSize` / `WindowTooLarge` if `w` is 0 or exceeds `T`.
pub fn estimate_std_time(
    array: ArrayView2<f64>, target_row: usize, window: usize,
) -> CITestResult<Array1<f64>> {
    let resid = abs_ols_residuals(array, target_row)?;
    Ok(smooth_with_placeholder(resid.view(), window)?)
}

/// Parent-dependent std estimate of `target_row`, length `T`.
///
/// Parameters
/// ----------
/// - `array`: `ArrayView2<f64>`
///   Test array `(dim, T)`.
/// - `time_indices`: `&[usize]`
///   Reference time of each array column.
/// - `target_row`: `usize`
///   `0` for X, `1` for Y.
/// - `target_lag`: `isize`
///   Lag of the target node.
/// - `driver`: [`VarLag`]
///   Variable (and lag) the noise level depends on.
/// - `cache`: `&AuxiliaryCache`
///   Lag-zero driver values by absolute time.
/// - `window`: `usize`
///   Number of nearest neighbours in driver order to average.
///
/// Returns
/// -------
/// `CITestResult<Array1<f64>>`
///   Estimate of length `T`; the first `|driver.lag + target_lag|` entries
///   are `1.0`. Without conditioning rows the time-dependent estimate of
///   `|target|` is returned instead.
///
/// Errors
/// ------
/// - `WindowTooLarge` if fewer than `w` residuals remain after truncation.
/// - `UnpopulatedDriver` if the cache holds no row for the driver.
/// - `MissingDriverValue` if the driver is flagged or masked at a time a
///   kept residual pairs with.
pub fn estimate_std_parent(
    array: ArrayView2<f64>, time_indices: &[usize], target_row: usize, target_lag: isize,
    driver: VarLag, cache: &AuxiliaryCache, window: usize,
) -> CITestResult<Array1<f64>> {
    if array.nrows() <= 2 {
        return estimate_std_time(array, target_row, window);
    }
    if window == 0 {
        return Err(CITestError::InvalidWindowSize { window });
    }

    let n_samples = array.ncols();
    debug_assert_eq!(time_indices.len(), n_samples);
    let resid = abs_ols_residuals(array, target_row)?;
    let shift = (driver.lag + target_lag).unsigned_abs();
    let remaining = n_samples.saturating_sub(shift);
    if remaining < window {
        return Err(CITestError::WindowTooLarge { window, len: remaining });
    }

    let driver_times: Vec<usize> = time_indices[shift..].iter().map(|&t| t - shift).collect();
    let driver_values = cache.driver_values(driver.var, &driver_times)?;
    let truncated = resid.slice(s![shift..]);

    let order = stable_argsort(driver_values.view());
    let sorted: Array1<f64> = order.iter().map(|&i| truncated[i]).collect();
    let smoothed = smooth_with_placeholder(sorted.view(), window)?;
    let rank = invert_permutation(&order);

    let mut std_est = Array1::ones(n_samples);
    for (i, &r) in rank.iter().enumerate() {
        std_est[shift + i] = smoothed[r];
    }
    Ok(std_est)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ArrayOptions, ConstructedArray, CutOff, DataFrame, MaskType};
    use approx::assert_relative_eq;
    use ndarray::{Array2, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The time-dependent estimate with and without conditioning rows.
    // - Parent-dependent smoothing in driver order and the leading ones,
    //   for a lagged driver and for a lagged target.
    // - Driver lookups by reference time when earlier samples were dropped.
    // - The window guards and missing driver values.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify the time-dependent estimate on a two-row array: w − 1 ones
    // followed by trailing means of |target|.
    //
    // Given
    // -----
    // - Target [1, −2, 3, −4, 5], w = 2.
    //
    // Expect
    // ------
    // - [1, 1.5, 2.5, 3.5, 4.5].
    fn estimate_std_time_smooths_absolute_target() {
        // Arrange
        let arr = array![[1.0, -2.0, 3.0, -4.0, 5.0], [0.0, 0.0, 0.0, 0.0, 0.0]];

        // Act
        let est = estimate_std_time(arr.view(), 0, 2).unwrap();

        // Assert
        assert_eq!(est, array![1.0, 1.5, 2.5, 3.5, 4.5]);
    }

    #[test]
    // Purpose
    // -------
    // Check that the linear Z effect is removed before smoothing.
    //
    // Given
    // -----
    // - Y = 3·Z exactly, w = 3.
    //
    // Expect
    // ------
    // - Ones for the first 2 entries, ≈ 0 afterwards.
    fn estimate_std_time_uses_ols_residuals() {
        // Arrange
        let z = array![1.0, 2.0, -1.0, 0.5, 4.0, -2.0];
        let arr = ndarray::stack![ndarray::Axis(0), z.mapv(|v| -v), z.mapv(|v| 3.0 * v), z];

        // Act
        let est = estimate_std_time(arr.view(), 1, 3).unwrap();

        // Assert
        assert_eq!(est.slice(s![..2]).to_vec(), vec![1.0, 1.0]);
        for v in est.slice(s![2..]).iter() {
            assert_relative_eq!(*v, 0.0, epsilon = 1e-10);
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify that the window guard rejects windows longer than the series.
    //
    // Given
    // -----
    // - T = 5, w = 6 and w = 0.
    //
    // Expect
    // ------
    // - `WindowTooLarge { window: 6, len: 5 }` and `InvalidWindowSize`.
    fn estimate_std_time_rejects_invalid_windows() {
        // Arrange
        let arr = Array2::<f64>::ones((2, 5));

        // Act / Assert
        assert_eq!(
            estimate_std_time(arr.view(), 0, 6),
            Err(CITestError::WindowTooLarge { window: 6, len: 5 })
        );
        assert_eq!(
            estimate_std_time(arr.view(), 0, 0),
            Err(CITestError::InvalidWindowSize { window: 0 })
        );
    }

    /// Frame with target column 0, constant column 1 and driver column 2, so
    /// the OLS residuals of the target are `|target − mean|`.
    fn parent_frame(target: &[f64], driver: &[f64]) -> DataFrame {
        DataFrame::new(Array2::from_shape_fn((target.len(), 3), |(t, v)| match v {
            0 => target[t],
            1 => 1.0,
            _ => driver[t],
        }))
        .unwrap()
    }

    /// Array for X = (0, `target_lag`), Y = (2, 0), Z = (1, 0) with the
    /// max-lag cut-off, plus a cache holding driver 2.
    fn build(frame: &DataFrame, target_lag: isize) -> (ConstructedArray, AuxiliaryCache) {
        let (x, y, z) = ([VarLag::new(0, target_lag)], [VarLag::new(2, 0)], [VarLag::new(1, 0)]);
        let opts = ArrayOptions::new(MaskType::default(), CutOff::MaxLag, true);
        let built = frame.construct_array(&x, &y, &z, 1, &opts).unwrap();
        let cache = AuxiliaryCache::build(frame, [2], &opts);
        (built, cache)
    }

    fn assert_estimate(est: &Array1<f64>, expected: &[f64]) {
        assert_eq!(est.len(), expected.len());
        for (got, want) in est.iter().zip(expected) {
            assert_relative_eq!(*got, *want, epsilon = 1e-10);
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify sort → smooth → unsort at lag zero on hand-computed residuals.
    //
    // Given
    // -----
    // - target [1, 2, 4, 9] (mean 4, |resid| [3, 2, 0, 5]),
    //   driver [4, 1, 3, 2], w = 2.
    // - Driver order [1, 3, 2, 0] gives sorted residuals [2, 5, 0, 3] and
    //   smoothed [1, 3.5, 2.5, 1.5].
    //
    // Expect
    // ------
    // - Time order [1.5, 1, 2.5, 3.5].
    fn estimate_std_parent_smooths_in_driver_order() {
        // Arrange
        let frame = parent_frame(&[1.0, 2.0, 4.0, 9.0], &[4.0, 1.0, 3.0, 2.0]);
        let (built, cache) = build(&frame, 0);

        // Act
        let est = estimate_std_parent(
            built.array.view(),
            &built.time_indices,
            0,
            0,
            VarLag::new(2, 0),
            &cache,
            2,
        )
        .unwrap();

        // Assert
        assert_estimate(&est, &[1.5, 1.0, 2.5, 3.5]);
    }

    #[test]
    // Purpose
    // -------
    // Check a lagged driver: residual t pairs with the driver at t − 1, the
    // earliest residual is dropped from sorting and reads 1.
    //
    // Given
    // -----
    // - target [2, 1, 2, 4, 9, 6] (mean 4, |resid| [2, 3, 2, 0, 5, 2]),
    //   driver [4, 1, 3, 2, 5, 0] at lag −1, w = 2.
    // - Truncated residuals [3, 2, 0, 5, 2], driver window [4, 1, 3, 2, 5],
    //   sorted residuals [2, 5, 0, 3, 2], smoothed [1, 3.5, 2.5, 1.5, 2.5].
    //
    // Expect
    // ------
    // - [1, 1.5, 1, 2.5, 3.5, 2.5].
    fn estimate_std_parent_pads_lagged_driver_with_ones() {
        // Arrange
        let frame =
            parent_frame(&[2.0, 1.0, 2.0, 4.0, 9.0, 6.0], &[4.0, 1.0, 3.0, 2.0, 5.0, 0.0]);
        let (built, cache) = build(&frame, 0);

        // Act
        let est = estimate_std_parent(
            built.array.view(),
            &built.time_indices,
            0,
            0,
            VarLag::new(2, -1),
            &cache,
            2,
        )
        .unwrap();

        // Assert
        assert_estimate(&est, &[1.0, 1.5, 1.0, 2.5, 3.5, 2.5]);
    }

    #[test]
    // Purpose
    // -------
    // Check a lagged target with a contemporaneous driver: the effective lag
    // is the target's own, so the residual of X_{t-1} pairs with the driver
    // at t − 1 and the first reference time reads 1.
    //
    // Given
    // -----
    // - T = 7, X = (0, −1), driver (2, 0), w = 2; reference times 1..=6.
    // - target [2, 1, 2, 4, 9, 6, 100]: the X row is target[0..6] =
    //   [2, 1, 2, 4, 9, 6] (mean 4, |resid| [2, 3, 2, 0, 5, 2]).
    // - driver [0, 4, 1, 3, 2, 5, 0]: times 1..=5 read [4, 1, 3, 2, 5].
    //
    // Expect
    // ------
    // - [1, 1.5, 1, 2.5, 3.5, 2.5], as for the lagged-driver case.
    fn estimate_std_parent_aligns_lagged_target_with_driver() {
        // Arrange
        let frame = parent_frame(
            &[2.0, 1.0, 2.0, 4.0, 9.0, 6.0, 100.0],
            &[0.0, 4.0, 1.0, 3.0, 2.0, 5.0, 0.0],
        );
        let (built, cache) = build(&frame, -1);
        assert_eq!(built.time_indices, vec![1, 2, 3, 4, 5, 6]);

        // Act
        let est = estimate_std_parent(
            built.array.view(),
            &built.time_indices,
            0,
            -1,
            VarLag::new(2, 0),
            &cache,
            2,
        )
        .unwrap();

        // Assert
        assert_estimate(&est, &[1.0, 1.5, 1.0, 2.5, 3.5, 2.5]);
    }

    #[test]
    // Purpose
    // -------
    // Verify that dropping a sample from the array does not shift the
    // driver: lookups follow the surviving reference times.
    //
    // Given
    // -----
    // - target [1, 2, 7, 4, 9] with the flag 7 at t = 2, so the array keeps
    //   times [0, 1, 3, 4] and the X row is [1, 2, 4, 9] (|resid| [3, 2, 0, 5]).
    // - driver [4, 1, 8, 3, 2], lag 0, w = 2: times [0, 1, 3, 4] read
    //   [4, 1, 3, 2], the values of the lag-zero case.
    //
    // Expect
    // ------
    // - [1.5, 1, 2.5, 3.5].
    fn estimate_std_parent_reads_driver_at_surviving_times() {
        // Arrange
        let values = Array2::from_shape_fn((5, 3), |(t, v)| match v {
            0 => [1.0, 2.0, 7.0, 4.0, 9.0][t],
            1 => 1.0,
            _ => [4.0, 1.0, 8.0, 3.0, 2.0][t],
        });
        let frame = DataFrame::with_missing_flag(values, 7.0).unwrap();
        let (built, cache) = build(&frame, 0);
        assert_eq!(built.time_indices, vec![0, 1, 3, 4]);

        // Act
        let est = estimate_std_parent(
            built.array.view(),
            &built.time_indices,
            0,
            0,
            VarLag::new(2, 0),
            &cache,
            2,
        )
        .unwrap();

        // Assert
        assert_estimate(&est, &[1.5, 1.0, 2.5, 3.5]);
    }

    #[test]
    // Purpose
    // -------
    // Ensure a driver flagged at a time a residual needs is reported with
    // that time rather than silently shifting the pairing.
    //
    // Given
    // -----
    // - Driver column [4, 1, 3, -9, 5, 0] with missing flag -9; the driver
    //   is not in the array, so the array keeps all six times.
    // - Driver (2, −1) against X = (0, 0): residual t = 4 needs driver t = 3.
    //
    // Expect
    // ------
    // - `MissingDriverValue { var: 2, time: 3 }`.
    fn estimate_std_parent_reports_missing_driver_value() {
        // Arrange
        let values = Array2::from_shape_fn((6, 3), |(t, v)| match v {
            0 => [2.0, 1.0, 2.0, 4.0, 9.0, 6.0][t],
            1 => 1.0,
            _ => [4.0, 1.0, 3.0, -9.0, 5.0, 0.0][t],
        });
        let frame = DataFrame::with_missing_flag(values, -9.0).unwrap();
        let opts = ArrayOptions::new(MaskType::default(), CutOff::MaxLag, true);
        let built = frame
            .construct_array(&[VarLag::new(0, 0)], &[VarLag::new(1, 0)], &[], 0, &opts)
            .unwrap();
        let z_row = Array2::from_elem((1, built.array.ncols()), 0.5);
        let array = ndarray::concatenate![ndarray::Axis(0), built.array, z_row];
        let cache = AuxiliaryCache::build(&frame, [2], &opts);

        // Act
        let err = estimate_std_parent(
            array.view(),
            &built.time_indices,
            0,
            0,
            VarLag::new(2, -1),
            &cache,
            2,
        )
        .unwrap_err();

        // Assert
        assert_eq!(err, CITestError::MissingDriverValue { var: 2, time: 3 });
    }

    #[test]
    // Purpose
    // -------
    // Ensure too few residuals after truncation is reported.
    //
    // Given
    // -----
    // - T = 6, effective lag −1 (target lag 0, driver lag −1), w = 6.
    //
    // Expect
    // ------
    // - `WindowTooLarge { window: 6, len: 5 }`.
    fn estimate_std_parent_rejects_window_after_truncation() {
        // Arrange
        let frame =
            parent_frame(&[2.0, 1.0, 2.0, 4.0, 9.0, 6.0], &[4.0, 1.0, 3.0, 2.0, 5.0, 0.0]);
        let (built, cache) = build(&frame, 0);

        // Act
        let err = estimate_std_parent(
            built.array.view(),
            &built.time_indices,
            0,
            0,
            VarLag::new(2, -1),
            &cache,
            6,
        )
        .unwrap_err();

        // Assert
        assert_eq!(err, CITestError::WindowTooLarge { window: 6, len: 5 });
    }
}
