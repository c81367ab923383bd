//! independence_tests::robust — rank-based marginal transform to normality.
//!
//! Each row of an array is replaced by `Φ⁻¹(u)`, where `u` is the empirical
//! CDF of the row evaluated at each sample. Ties map to the largest rank
//! they share; `u = 1` is clamped below one so that the maximum stays
//! finite.
use crate::independence_tests::errors::{CITestError, CITestResult};
use ndarray::{Array2, ArrayView2, Axis};
use statrs::distribution::{ContinuousCDF, Normal};

const UPPER_CLAMP: f64 = 0.99999999999;

/// Transform every row of `array` to standard-normal marginals.
pub fn trafo_to_normal(array: ArrayView2<f64>) -> CITestResult<Array2<f64>> {
    let normal =
        Normal::new(0.0, 1.0).map_err(|err| CITestError::Distribution(err.to_string()))?;
    let mut out = array.to_owned();

    for mut row in out.axis_iter_mut(Axis(0)) {
        let n = row.len();
        let mut sorted: Vec<f64> = row.to_vec();
        sorted.sort_by(f64::total_cmp);
        for value in row.iter_mut() {
            let rank = sorted.partition_point(|&s| s <= *value);
            let u = (rank as f64 / n as f64).min(UPPER_CLAMP);
            *value = normal.inverse_cdf(u);
        }
    }
    Ok(out)
}
