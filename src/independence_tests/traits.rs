//! independence_tests::traits — common surface of conditional-independence tests.
//!
//! Purpose
//! -------
//! Define the value returned by a test run ([`CITestOutcome`]) and the
//! [`CondIndTest`] trait implemented by every test in this subtree, so that
//! discovery algorithms can treat `par_corr` and `par_corr_wls` uniformly.
//!
//! Conventions
//! -----------
//! - Node lists are slices of [`VarLag`]; `tau_max` feeds the cut-off rule
//!   of the data layer.
//! - A test run never mutates the test object; per-call state is local.
use crate::data::nodes::VarLag;
use crate::independence_tests::errors::CITestResult;

/// CITestOutcome — statistic, p-value and optional decision of one test.
///
/// Fields
/// ------
/// - `value`: `f64`
///   Dependence measure (partial correlation in `[-1, 1]`).
/// - `p_value`: `f64`
///   Significance of `value` under the null of conditional independence.
/// - `dependent`: `Option<bool>`
///   `Some(p_value <= alpha)` when a significance level was supplied.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CITestOutcome {
    value: f64,
    p_value: f64,
    dependent: Option<bool>,
}

impl CITestOutcome {
    pub fn new(value: f64, p_value: f64, alpha: Option<f64>) -> Self {
        CITestOutcome { value, p_value, dependent: alpha.map(|a| p_value <= a) }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn p_value(&self) -> f64 {
        self.p_value
    }

    pub fn dependent(&self) -> Option<bool> {
        self.dependent
    }
}

/// CondIndTest — a test of `X ⊥ Y | Z` on lagged nodes of one data set.
pub trait CondIndTest {
    /// Short identifier of the dependence measure, e.g. `"par_corr_wls"`.
    fn measure_name(&self) -> &'static str;

    /// Build the array for `X`, `Y`, `Z`, compute the dependence measure
    /// and its p-value, and decide against `alpha` when given.
    fn run_test(
        &self, x: &[VarLag], y: &[VarLag], z: &[VarLag], tau_max: usize, alpha: Option<f64>,
    ) -> CITestResult<CITestOutcome>;
}
