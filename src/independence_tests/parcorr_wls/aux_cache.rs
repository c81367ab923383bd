//! parcorr_wls::aux_cache — lag-zero driver values keyed by absolute time.
//!
//! Parent-dependent noise estimation sorts residuals by the value of a
//! driver variable. Drivers may be variables that are not part of the
//! tested array, so before each such test the driver columns are copied out
//! of the data frame together with their availability (missing flag and,
//! when `Z` masking is on, the mask). Lookups are by absolute time index,
//! so exclusions elsewhere in the frame never shift the pairing between a
//! residual and its driver value.
use crate::data::{ArrayOptions, DataFrame};
use crate::independence_tests::errors::{CITestError, CITestResult};
use ndarray::{Array1, Array2};
use tracing::debug;

/// AuxiliaryCache — `(N, T)` lag-zero values with availability flags.
///
/// Fields
/// ------
/// - `data`: row `v` holds variable `v` over every time `0..T`; only
///   populated rows are meaningful.
/// - `observed`: `observed[v, t]` is false where the frame flags or masks
///   `data[v, t]`.
/// - `populated`: which rows were copied for this test.
#[derive(Debug, Clone, PartialEq)]
pub struct AuxiliaryCache {
    data: Array2<f64>,
    observed: Array2<bool>,
    populated: Vec<bool>,
}

impl AuxiliaryCache {
    /// Copy the lag-zero columns of `drivers` out of `dataframe`.
    ///
    /// Driver values count as conditioning data, so the mask applies to
    /// them exactly when `opts.mask_type.z` is set. Indices outside the
    /// frame are skipped and later reported as unpopulated.
    pub fn build(
        dataframe: &DataFrame, drivers: impl IntoIterator<Item = usize>, opts: &ArrayOptions,
    ) -> Self {
        let (n_samples, n_vars) = (dataframe.n_samples(), dataframe.n_vars());
        let values = dataframe.values();
        let mut data = Array2::zeros((n_vars, n_samples));
        let mut observed = Array2::from_elem((n_vars, n_samples), false);
        let mut populated = vec![false; n_vars];

        for var in drivers {
            if var >= n_vars || populated[var] {
                continue;
            }
            data.row_mut(var).assign(&values.column(var));
            for t in 0..n_samples {
                observed[[var, t]] = dataframe.is_observed(t, var, opts.mask_type.z);
            }
            populated[var] = true;
        }
        debug!(
            n_samples,
            n_populated = populated.iter().filter(|&&p| p).count(),
            "built auxiliary lag-zero cache"
        );
        AuxiliaryCache { data, observed, populated }
    }

    /// Values of driver `var` at the absolute times in `times`, in order.
    ///
    /// Errors
    /// ------
    /// - `UnpopulatedDriver` if the cache holds no row for `var`.
    /// - `MissingDriverValue` at the first requested time that lies outside
    ///   the frame or where the driver is flagged or masked.
    pub fn driver_values(&self, var: usize, times: &[usize]) -> CITestResult<Array1<f64>> {
        if !self.populated.get(var).copied().unwrap_or(false) {
            return Err(CITestError::UnpopulatedDriver { var });
        }
        times
            .iter()
            .map(|&time| match self.observed.get((var, time)) {
                Some(true) => Ok(self.data[[var, time]]),
                _ => Err(CITestError::MissingDriverValue { var, time }),
            })
            .collect()
    }
}
