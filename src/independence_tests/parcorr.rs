//! independence_tests::parcorr — ordinary partial-correlation test.
//!
//! Purpose
//! -------
//! Test `X ⊥ Y | Z` by correlating the ordinary least-squares residuals of
//! X and Y on Z. This is the homoskedastic baseline of the weighted test
//! and shares its residualizer (with unit weights) and correlation engine.
//!
//! Key behaviors
//! -------------
//! - Rows are standardized before the regressions.
//! - X and Y must each be a single node.
//! - p-values come from the configured [`CorrelationEngine`].
use crate::data::{ArrayOptions, DataFrame, VarLag};
use crate::independence_tests::correlation::{CorrelationEngine, pearson};
use crate::independence_tests::errors::{CITestError, CITestResult};
use crate::independence_tests::residuals::weighted_residuals;
use crate::independence_tests::traits::{CITestOutcome, CondIndTest};
use ndarray::{Array1, ArrayView2};
use tracing::debug;

/// ParCorrOptions — settings of the ordinary partial-correlation test.
///
/// Fields
/// ------
/// - `engine`: [`CorrelationEngine`] (significance method and tail).
/// - `array`: [`ArrayOptions`] (masking, cut-off, overlap removal).
/// - `verbosity`: `u8`, `> 0` enables diagnostic warnings.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParCorrOptions {
    pub engine: CorrelationEngine,
    pub array: ArrayOptions,
    pub verbosity: u8,
}

/// ParCorr — OLS partial correlation on a fixed data frame.
#[derive(Debug, Clone)]
pub struct ParCorr {
    dataframe: DataFrame,
    opts: ParCorrOptions,
}

impl ParCorr {
    pub fn new(dataframe: DataFrame, opts: ParCorrOptions) -> Self {
        ParCorr { dataframe, opts }
    }

    /// Correlation of the OLS residuals of rows 0 and 1 on rows `2..`.
    pub fn dependence_measure(&self, array: ArrayView2<f64>) -> CITestResult<f64> {
        let (x_resid, y_resid) = self.residual_pair(array)?;
        pearson(x_resid.view(), y_resid.view())
    }

    fn residual_pair(&self, array: ArrayView2<f64>) -> CITestResult<(Array1<f64>, Array1<f64>)> {
        let ones = Array1::ones(array.ncols());
        let verbosity = self.opts.verbosity;
        let x = weighted_residuals(array, 0, Some(ones.view()), true, verbosity)?.resid;
        let y = weighted_residuals(array, 1, Some(ones.view()), true, verbosity)?.resid;
        Ok((x, y))
    }
}

impl CondIndTest for ParCorr {
    fn measure_name(&self) -> &'static str {
        "par_corr"
    }

    fn run_test(
        &self, x: &[VarLag], y: &[VarLag], z: &[VarLag], tau_max: usize, alpha: Option<f64>,
    ) -> CITestResult<CITestOutcome> {
        ensure_univariate(x, y)?;
        let built = self.dataframe.construct_array(x, y, z, tau_max, &self.opts.array)?;
        let (x_resid, y_resid) = self.residual_pair(built.array.view())?;
        let value = pearson(x_resid.view(), y_resid.view())?;
        let p_value =
            self.opts.engine.pvalue(value, x_resid.view(), y_resid.view(), built.array.nrows())?;
        debug!(value, p_value, n_samples = built.array.ncols(), "par_corr test");
        Ok(CITestOutcome::new(value, p_value, alpha))
    }
}

/// Reject X or Y lists with more than one node.
pub(crate) fn ensure_univariate(x: &[VarLag], y: &[VarLag]) -> CITestResult<()> {
    if x.len() > 1 || y.len() > 1 {
        return Err(CITestError::MultivariateXY { x_len: x.len(), y_len: y.len() });
    }
    Ok(())
}
