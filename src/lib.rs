//! rust_independence — conditional-independence tests for causal discovery
//! on heteroskedastic time series, with Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the tests to Python via the `_rust_independence` extension module.
//! When the `python-bindings` feature is enabled, this module defines the
//! Python-facing classes and submodules used by the `rust_independence`
//! package.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`data`, `independence_tests`,
//!   `numerical`) as the public crate surface.
//! - Define the `#[pyclass]` wrapper for the weighted partial-correlation
//!   test and the `#[pymodule]` initializer for `_rust_independence`.
//! - Register the `independence_tests` submodule under `rust_independence`
//!   so that dot-notation imports work as expected.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner modules; this file performs only
//!   FFI glue, argument conversion, and error mapping.
//! - Once Python arguments convert successfully, the invariants documented in
//!   the core modules are assumed to hold.
//!
//! Conventions
//! -----------
//! - Data are `(T, N)` matrices: rows are time steps, columns variables.
//! - Nodes are `(variable, lag)` pairs with `lag ≤ 0`.
//! - Errors from core Rust code are converted to `ValueError` at the PyO3
//!   boundary.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend on [`independence_tests`] directly and
//!   can ignore the PyO3 items guarded by the `python-bindings` feature.
//! - The Python packaging layer imports `_rust_independence` and wraps its
//!   classes in user-facing APIs.
//!
//! Testing notes
//! -------------
//! - Core behavior is covered by unit tests in the inner modules and by the
//!   pipeline tests under `tests/`.

pub mod data;
pub mod independence_tests;
pub mod numerical;
pub mod utils;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    data::DataFrame,
    independence_tests::{CondIndTest, CorrelationEngine, ParCorrWLS, ParCorrWLSOptions},
    utils::{
        extract_alternative, extract_array_options, extract_expert_knowledge, extract_f64_matrix,
        extract_mask, extract_nodes, extract_significance,
    },
};

/// ParCorrWLS — Python-facing wrapper for the weighted partial-correlation
/// test.
///
/// Parameters
/// ----------
/// Constructed from Python via
/// `ParCorrWLS(data, gt_std_matrix=None, expert_knowledge=None, ...)`:
/// - `data`: `(T, N)` array-like of `f64`.
/// - `gt_std_matrix`: optional `(T, N)` array of known noise standard
///   deviations; disables estimation when given.
/// - `expert_knowledge`: `"time-dependent heteroskedasticity"`,
///   `"homoskedasticity"`, or a dict mapping a variable index to a
///   one-element list holding a marker or a `(variable, lag)` driver.
/// - `window_size`: smoothing window for std estimation (default 10).
/// - `robustify`: rank-transform to standard normal before testing.
/// - `significance`: `"analytic"` or `"shuffle_test"`.
/// - `sig_samples`, `sig_blocklength`, `seed`: shuffle-test settings.
/// - `alternative`: `"two-sided"`, `"greater"`, or `"less"`.
/// - `mask`, `mask_type`, `missing_flag`: sample exclusion.
/// - `cut_off`, `remove_overlaps`: array construction settings.
///
/// Fields
/// ------
/// - `inner`: [`ParCorrWLS`]
///   Validated Rust test that every method forwards to.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "ParCorrWLS", module = "rust_independence.independence_tests")]
pub struct PyParCorrWLS {
    inner: ParCorrWLS,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyParCorrWLS {
    #[new]
    #[pyo3(
        text_signature = "(data, /, gt_std_matrix=None, expert_knowledge=None, window_size=10, \
                          robustify=False, significance='analytic', sig_samples=500, \
                          sig_blocklength=None, seed=None, alternative='two-sided', mask=None, \
                          mask_type=None, missing_flag=None, cut_off='2xtau_max', \
                          remove_overlaps=True, verbosity=0)",
        signature = (
            data,
            gt_std_matrix = None,
            expert_knowledge = None,
            window_size = 10,
            robustify = false,
            significance = None,
            sig_samples = None,
            sig_blocklength = None,
            seed = None,
            alternative = None,
            mask = None,
            mask_type = None,
            missing_flag = None,
            cut_off = None,
            remove_overlaps = None,
            verbosity = 0
        )
    )]
    #[allow(clippy::too_many_arguments)]
    pub fn new<'py>(
        data: &Bound<'py, PyAny>, gt_std_matrix: Option<&Bound<'py, PyAny>>,
        expert_knowledge: Option<&Bound<'py, PyAny>>, window_size: usize, robustify: bool,
        significance: Option<&str>, sig_samples: Option<usize>, sig_blocklength: Option<usize>,
        seed: Option<u64>, alternative: Option<&str>, mask: Option<&Bound<'py, PyAny>>,
        mask_type: Option<&str>, missing_flag: Option<f64>, cut_off: Option<&str>,
        remove_overlaps: Option<bool>, verbosity: u8,
    ) -> PyResult<PyParCorrWLS> {
        let values = extract_f64_matrix(data)?;
        let mut dataframe = match missing_flag {
            Some(flag) => DataFrame::with_missing_flag(values, flag)?,
            None => DataFrame::new(values)?,
        };
        if let Some(mask) = mask {
            dataframe = dataframe.with_mask(extract_mask(mask)?)?;
        }

        let opts = ParCorrWLSOptions {
            gt_std_matrix: gt_std_matrix.map(extract_f64_matrix).transpose()?,
            expert_knowledge: extract_expert_knowledge(expert_knowledge)?,
            window_size,
            robustify,
            engine: CorrelationEngine::new(
                extract_significance(significance, sig_samples, sig_blocklength, seed)?,
                extract_alternative(alternative)?,
            ),
            array: extract_array_options(mask_type, cut_off, remove_overlaps)?,
            verbosity,
        };
        Ok(PyParCorrWLS { inner: ParCorrWLS::new(dataframe, opts)? })
    }

    /// Test `X ⊥ Y | Z`; returns `(value, p_value, dependent)` where
    /// `dependent` is `None` unless `alpha` is given.
    #[pyo3(
        text_signature = "($self, x, y, z=None, tau_max=0, alpha=None)",
        signature = (x, y, z = None, tau_max = 0, alpha = None)
    )]
    pub fn run_test<'py>(
        &self, x: &Bound<'py, PyAny>, y: &Bound<'py, PyAny>, z: Option<&Bound<'py, PyAny>>,
        tau_max: usize, alpha: Option<f64>,
    ) -> PyResult<(f64, f64, Option<bool>)> {
        let x = extract_nodes(Some(x))?;
        let y = extract_nodes(Some(y))?;
        let z = extract_nodes(z)?;
        let outcome = self.inner.run_test(&x, &y, &z, tau_max, alpha)?;
        Ok((outcome.value(), outcome.p_value(), outcome.dependent()))
    }

    /// Information-criterion score of regressing variable `j` on `parents`.
    #[pyo3(
        text_signature = "($self, j, parents, tau_max=0, corrected_aic=False)",
        signature = (j, parents, tau_max = 0, corrected_aic = false)
    )]
    pub fn get_model_selection_criterion<'py>(
        &self, j: usize, parents: &Bound<'py, PyAny>, tau_max: usize, corrected_aic: bool,
    ) -> PyResult<f64> {
        let parents = extract_nodes(Some(parents))?;
        Ok(self.inner.model_score(j, &parents, tau_max, corrected_aic)?)
    }

    /// Name of the dependence measure.
    #[getter]
    pub fn measure(&self) -> &'static str {
        self.inner.measure_name()
    }
}

/// _rust_independence — PyO3 module initializer for the Python extension.
///
/// Creates the `independence_tests` submodule, attaches it to the parent
/// module and registers it in `sys.modules` so that
/// `rust_independence.independence_tests` is importable via dotted paths.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_independence<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let independence_tests_mod = PyModule::new(_py, "independence_tests")?;
    independence_tests(_py, m, &independence_tests_mod)?;

    // Manually add submodules into sys.modules to allow for dot notation.
    _py.import("sys")?
        .getattr("modules")?
        .set_item("rust_independence.independence_tests", independence_tests_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn independence_tests<'py>(
    _py: Python, rust_independence: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<PyParCorrWLS>()?;
    rust_independence.add_submodule(m)?;
    Ok(())
}
