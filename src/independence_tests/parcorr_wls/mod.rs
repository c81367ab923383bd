//! parcorr_wls — partial correlation with weighted least squares.
//!
//! Purpose
//! -------
//! Test `X ⊥ Y | Z` when the noise of X or Y is heteroskedastic. Both
//! variables are regressed on Z by weighted least squares with weights
//! `1/σ_t`, and the weighted residuals are correlated. The `σ_t` come from
//! a ground-truth table or are estimated from smoothed OLS residuals
//! according to the user's expert knowledge.
//!
//! Key behaviors
//! -------------
//! - [`ParCorrWLS::new`] resolves the weight source once: a validated
//!   ground-truth table, or a [`NoiseModelRegistry`] built from
//!   [`ExpertKnowledge`]. The test object never changes afterwards.
//! - [`ParCorrWLS::compute_array`] builds the aligned array and the
//!   `(2, T)` std estimates for X and Y into a [`TestContext`]; every other
//!   operation reads from that context.
//! - Dependence measure, significance and model score optionally run on
//!   rank-normalized data (`robustify`).
//!
//! Invariants & assumptions
//! ------------------------
//! - X and Y are single nodes.
//! - `window_size ≥ 1`.
//! - Ground-truth stds have the data's `(T, N)` shape and are finite and
//!   strictly positive; they are read at the same reference times and lags
//!   as the array, so masking and missing-value removal carry over.
//! - Estimated stds are computed on the untransformed array even when
//!   `robustify` is set.
//!
//! Conventions
//! -----------
//! - Row 0 of `TestContext::stds` belongs to X and row 1 to Y.
//! - Weighted residuals are never standardized in this test.
//! - Shuffle significance permutes the already-weighted x residual; no
//!   second weighting is applied to shuffled statistics.
//!
//! Testing notes
//! -------------
//! - Unit tests check the homoskedastic reduction to ordinary partial
//!   correlation, scale invariance of weights, ground-truth precedence,
//!   the model-score identity and the input guards. The end-to-end
//!   power comparison lives in `tests/integration_parcorr_wls_pipeline.rs`.
pub mod aux_cache;
pub mod noise_model;
pub mod options;
pub mod std_estimation;

pub use self::aux_cache::AuxiliaryCache;
pub use self::noise_model::NoiseModelRegistry;
pub use self::options::{
    ExpertKnowledge, HOMOSKEDASTIC_MARKER, NoiseSource, ParCorrWLSOptions, TIME_DEPENDENT_MARKER,
};

use self::std_estimation::{estimate_std_parent, estimate_std_time};
use crate::data::{ArrayOptions, ConstructedArray, DataFrame, VarLag, XYZ};
use crate::independence_tests::correlation::{
    CorrelationEngine, ShuffleOptions, Significance, pearson,
};
use crate::independence_tests::errors::{CITestError, CITestResult};
use crate::independence_tests::parcorr::ensure_univariate;
use crate::independence_tests::residuals::weighted_residuals;
use crate::independence_tests::robust::trafo_to_normal;
use crate::independence_tests::traits::{CITestOutcome, CondIndTest};
use ndarray::{Array1, Array2};
use std::borrow::Cow;
use tracing::{debug, warn};

/// TestContext — everything one test invocation derives from the data.
///
/// Fields
/// ------
/// - `array`: `Array2<f64>`
///   Aligned `(dim, T)` array, rows X, Y, Z.
/// - `xyz`: `Vec<usize>`
///   Row labels (0 = X, 1 = Y, 2 = Z).
/// - `nodes`: [`XYZ`]
///   Cleaned node lists.
/// - `stds`: `Array2<f64>`
///   `(2, T)` noise standard deviations for X (row 0) and Y (row 1).
#[derive(Debug, Clone, PartialEq)]
pub struct TestContext {
    pub array: Array2<f64>,
    pub xyz: Vec<usize>,
    pub nodes: XYZ,
    pub stds: Array2<f64>,
}

/// Where the weights come from, fixed at construction.
#[derive(Debug, Clone, PartialEq)]
enum WeightSource {
    GroundTruth(Array2<f64>),
    Estimated(NoiseModelRegistry),
}

/// ParCorrWLS — weighted partial-correlation test on a fixed data frame.
///
/// Construct with [`ParCorrWLS::new`]; run through [`CondIndTest::run_test`]
/// or the individual steps ([`compute_array`](Self::compute_array),
/// [`dependence_measure`](Self::dependence_measure),
/// [`significance`](Self::significance)).
#[derive(Debug, Clone)]
pub struct ParCorrWLS {
    dataframe: DataFrame,
    weights: WeightSource,
    window_size: usize,
    robustify: bool,
    engine: CorrelationEngine,
    array_opts: ArrayOptions,
    verbosity: u8,
}

impl ParCorrWLS {
    /// Validate options against `dataframe` and resolve the weight source.
    ///
    /// Errors
    /// ------
    /// - `InvalidWindowSize` if `window_size == 0`.
    /// - `GroundTruthShapeMismatch` / `InvalidGroundTruth` for a bad
    ///   ground-truth table.
    /// - `InvalidExpertKnowledge` for entries outside the data.
    pub fn new(dataframe: DataFrame, opts: ParCorrWLSOptions) -> CITestResult<Self> {
        if opts.window_size == 0 {
            return Err(CITestError::InvalidWindowSize { window: 0 });
        }

        let weights = match opts.gt_std_matrix {
            Some(gt) => {
                validate_ground_truth(&gt, &dataframe)?;
                debug!("ground-truth standard deviations supplied; estimation disabled");
                WeightSource::GroundTruth(gt)
            }
            None => WeightSource::Estimated(NoiseModelRegistry::resolve(
                &opts.expert_knowledge,
                dataframe.n_vars(),
            )?),
        };

        Ok(ParCorrWLS {
            dataframe,
            weights,
            window_size: opts.window_size,
            robustify: opts.robustify,
            engine: opts.engine,
            array_opts: opts.array,
            verbosity: opts.verbosity,
        })
    }

    /// The resolved registry, `None` when ground truth is used.
    pub fn registry(&self) -> Option<&NoiseModelRegistry> {
        match &self.weights {
            WeightSource::Estimated(registry) => Some(registry),
            WeightSource::GroundTruth(_) => None,
        }
    }

    /// Build the aligned array for `X`, `Y`, `Z` and the X/Y std estimates.
    ///
    /// Errors
    /// ------
    /// - `MultivariateXY` if X or Y holds more than one node.
    /// - Wrapped `DataError`s from array construction.
    /// - Estimation errors (`WindowTooLarge`, `UnpopulatedDriver`, ...).
    pub fn compute_array(
        &self, x: &[VarLag], y: &[VarLag], z: &[VarLag], tau_max: usize,
    ) -> CITestResult<TestContext> {
        ensure_univariate(x, y)?;
        let built = self.dataframe.construct_array(x, y, z, tau_max, &self.array_opts)?;
        let stds = self.estimate_stds(&built)?;
        debug!(dim = built.array.nrows(), n_samples = built.array.ncols(), "built test array");
        let ConstructedArray { array, xyz, nodes, .. } = built;
        Ok(TestContext { array, xyz, nodes, stds })
    }

    /// Weighted partial correlation of X and Y given Z.
    pub fn dependence_measure(&self, ctx: &TestContext) -> CITestResult<f64> {
        let (x_resid, y_resid) = self.residual_pair(ctx)?;
        pearson(x_resid.view(), y_resid.view())
    }

    /// p-value of `value` from the configured significance method.
    pub fn significance(&self, ctx: &TestContext, value: f64) -> CITestResult<f64> {
        let (x_resid, y_resid) = self.residual_pair(ctx)?;
        self.engine.pvalue(value, x_resid.view(), y_resid.view(), ctx.array.nrows())
    }

    /// Student's-t p-value of `value` with `T − dim` degrees of freedom.
    pub fn analytic_significance(&self, ctx: &TestContext, value: f64) -> CITestResult<f64> {
        self.engine.analytic_pvalue(value, ctx.array.ncols(), ctx.array.nrows())
    }

    /// Block-shuffle p-value of `value` on the weighted residual pair.
    ///
    /// Uses the engine's shuffle settings, or the defaults when the engine
    /// is configured for analytic significance.
    pub fn shuffle_significance(&self, ctx: &TestContext, value: f64) -> CITestResult<f64> {
        let opts = match self.engine.significance {
            Significance::Shuffle(opts) => opts,
            Significance::Analytic => ShuffleOptions::default(),
        };
        let (x_resid, y_resid) = self.residual_pair(ctx)?;
        self.engine.shuffle_pvalue(value, x_resid.view(), y_resid.view(), &opts)
    }

    /// Information-criterion score of regressing variable `j` on `parents`.
    ///
    /// Returns `T·ln(RSS) + 2p`, plus `(2p² + 2p)/(T − p − 1)` when
    /// `corrected`, where RSS is the sum of squared weighted residuals of
    /// `(j, 0)` and `p = dim − 1`.
    ///
    /// Errors
    /// ------
    /// - Construction and estimation errors as in
    ///   [`compute_array`](Self::compute_array).
    pub fn model_score(
        &self, j: usize, parents: &[VarLag], tau_max: usize, corrected: bool,
    ) -> CITestResult<f64> {
        let target = [VarLag::new(j, 0)];
        let ctx = self.compute_array(&target, &target, parents, tau_max)?;
        let array = self.prepared_array(&ctx.array)?;
        let resid =
            weighted_residuals(array.view(), 1, Some(ctx.stds.row(1)), false, self.verbosity)?
                .resid;

        let rss = resid.dot(&resid);
        let (dim, n_samples) = array.dim();
        let t = n_samples as f64;
        let p = (dim - 1) as f64;
        let mut score = t * rss.ln() + 2.0 * p;
        if corrected {
            score += (2.0 * p * p + 2.0 * p) / (t - p - 1.0);
        }
        debug!(j, rss, score, "model score");
        Ok(score)
    }

    fn residual_pair(&self, ctx: &TestContext) -> CITestResult<(Array1<f64>, Array1<f64>)> {
        let array = self.prepared_array(&ctx.array)?;
        let x = weighted_residuals(array.view(), 0, Some(ctx.stds.row(0)), false, self.verbosity)?;
        let y = weighted_residuals(array.view(), 1, Some(ctx.stds.row(1)), false, self.verbosity)?;
        Ok((x.resid, y.resid))
    }

    fn prepared_array<'a>(&self, array: &'a Array2<f64>) -> CITestResult<Cow<'a, Array2<f64>>> {
        if self.robustify {
            Ok(Cow::Owned(trafo_to_normal(array.view())?))
        } else {
            Ok(Cow::Borrowed(array))
        }
    }

    fn estimate_stds(&self, built: &ConstructedArray) -> CITestResult<Array2<f64>> {
        let n_samples = built.array.ncols();
        let targets = [built.nodes.x[0], built.nodes.y[0]];
        let mut stds = Array2::ones((2, n_samples));

        match &self.weights {
            WeightSource::GroundTruth(gt) => {
                for (row, node) in targets.iter().enumerate() {
                    for (col, &t) in built.time_indices.iter().enumerate() {
                        stds[[row, col]] = gt[[(t as isize + node.lag) as usize, node.var]];
                    }
                }
            }
            WeightSource::Estimated(registry) => {
                let drivers: Vec<usize> = targets
                    .iter()
                    .filter_map(|n| match registry.source(n.var) {
                        NoiseSource::ParentDependent(driver) => Some(driver.var),
                        _ => None,
                    })
                    .collect();
                let cache = (!drivers.is_empty()).then(|| {
                    AuxiliaryCache::build(&self.dataframe, drivers, &self.array_opts)
                });

                for (row, node) in targets.iter().enumerate() {
                    let estimate = match registry.source(node.var) {
                        NoiseSource::Homoskedastic if registry.is_unlisted(node.var) => {
                            warn!(
                                var = node.var,
                                "absent from expert knowledge; assuming homoskedastic noise"
                            );
                            continue;
                        }
                        NoiseSource::Homoskedastic => {
                            debug!(var = node.var, "homoskedastic noise; unit weights");
                            continue;
                        }
                        NoiseSource::TimeDependent => {
                            estimate_std_time(built.array.view(), row, self.window_size)?
                        }
                        NoiseSource::ParentDependent(driver) => {
                            let cache = cache
                                .as_ref()
                                .ok_or(CITestError::UnpopulatedDriver { var: driver.var })?;
                            estimate_std_parent(
                                built.array.view(),
                                &built.time_indices,
                                row,
                                node.lag,
                                driver,
                                cache,
                                self.window_size,
                            )?
                        }
                    };
                    stds.row_mut(row).assign(&estimate);
                }
            }
        }
        Ok(stds)
    }
}

impl CondIndTest for ParCorrWLS {
    fn measure_name(&self) -> &'static str {
        "par_corr_wls"
    }

    fn run_test(
        &self, x: &[VarLag], y: &[VarLag], z: &[VarLag], tau_max: usize, alpha: Option<f64>,
    ) -> CITestResult<CITestOutcome> {
        let ctx = self.compute_array(x, y, z, tau_max)?;
        let (x_resid, y_resid) = self.residual_pair(&ctx)?;
        let value = pearson(x_resid.view(), y_resid.view())?;
        let p_value =
            self.engine.pvalue(value, x_resid.view(), y_resid.view(), ctx.array.nrows())?;
        debug!(value, p_value, n_samples = ctx.array.ncols(), "par_corr_wls test");
        Ok(CITestOutcome::new(value, p_value, alpha))
    }
}

fn validate_ground_truth(gt: &Array2<f64>, dataframe: &DataFrame) -> CITestResult<()> {
    let expected = (dataframe.n_samples(), dataframe.n_vars());
    if gt.dim() != expected {
        return Err(CITestError::GroundTruthShapeMismatch { expected, found: gt.dim() });
    }
    if let Some(((row, col), &value)) =
        gt.indexed_iter().find(|(_, v)| !(v.is_finite() && **v > 0.0))
    {
        return Err(CITestError::InvalidGroundTruth { row, col, value });
    }
    Ok(())
}
