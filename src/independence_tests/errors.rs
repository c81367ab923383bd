//! independence_tests::errors — error type for conditional-independence tests.
//!
//! Purpose
//! -------
//! Provide the canonical error enum and result alias for the correlation
//! engine, the weighted residualizer, the standard-deviation estimators and
//! the test orchestrators, plus conversions from the lower-level `data` and
//! `numerical` errors and (optionally) into Python exceptions.
//!
//! Key behaviors
//! -------------
//! - Separate hard input errors (NaN in an array, multivariate X/Y),
//!   configuration errors (malformed expert knowledge, bad window, bad
//!   ground-truth table) and numerical failures.
//! - Wrap [`DataError`] and [`NumericalError`] so `?` works across layers.
//! - Map every variant to `ValueError` at the PyO3 boundary when the
//!   `python-bindings` feature is enabled.
//!
//! Conventions
//! -----------
//! - Recoverable situations (missing weights, constant rows) are *not*
//!   errors; they emit `tracing` warnings and degrade gracefully.
//! - Rank-deficient regressions are never errors.

use crate::data::errors::DataError;
use crate::numerical::errors::NumericalError;
#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type CITestResult<T> = Result<T, CITestError>;

/// CITestError — failures of conditional-independence tests.
///
/// Variants
/// --------
/// - `NanInArray`
///   The input array (or its standardized copy) contains NaN.
/// - `NonFiniteResidual { target_var }`
///   Weighting produced NaN or ±∞ residuals, e.g. from a zero std.
/// - `MultivariateXY { x_len, y_len }`
///   X or Y has more than one node; the weighted test is univariate.
/// - `InvalidExpertKnowledge(reason)`
///   Expert knowledge is neither a known marker nor a well-formed map.
/// - `InvalidWindowSize { window }`
///   The smoothing window is zero.
/// - `WindowTooLarge { window, len }`
///   The sequence to smooth is shorter than the window.
/// - `UnpopulatedDriver { var }`
///   A parent-dependent driver has no lag-zero values in the auxiliary
///   cache.
/// - `MissingDriverValue { var, time }`
///   The driver is missing or masked at a time a residual must be paired
///   with.
/// - `GroundTruthShapeMismatch { expected, found }`
///   The ground-truth std table does not match the data shape.
/// - `InvalidGroundTruth { row, col, value }`
///   A ground-truth std is not finite and strictly positive.
/// - `InsufficientDegreesOfFreedom { n_samples, dim }`
///   `T − dim < 1`, so the Student's-t p-value is undefined.
/// - `DegenerateCorrelation`
///   One residual vector is constant, so Pearson's r is undefined.
/// - `InvalidSignificance(reason)`
///   Significance settings are unusable (e.g. zero shuffle samples).
/// - `Distribution(reason)`
///   A `statrs` distribution could not be constructed.
/// - `Data(DataError)` / `Numerical(NumericalError)`
///   Wrapped lower-level failures.
#[derive(Debug, Clone, PartialEq)]
pub enum CITestError {
    // ---- Input validity ----
    NanInArray,
    NonFiniteResidual { target_var: usize },
    MultivariateXY { x_len: usize, y_len: usize },

    // ---- Configuration ----
    InvalidExpertKnowledge(String),
    InvalidWindowSize { window: usize },
    GroundTruthShapeMismatch { expected: (usize, usize), found: (usize, usize) },
    InvalidGroundTruth { row: usize, col: usize, value: f64 },
    InvalidSignificance(String),

    // ---- Estimation ----
    WindowTooLarge { window: usize, len: usize },
    UnpopulatedDriver { var: usize },
    MissingDriverValue { var: usize, time: usize },

    // ---- Statistic ----
    InsufficientDegreesOfFreedom { n_samples: usize, dim: usize },
    DegenerateCorrelation,
    Distribution(String),

    // ---- Wrapped ----
    Data(DataError),
    Numerical(NumericalError),
}

impl std::error::Error for CITestError {}

impl std::fmt::Display for CITestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CITestError::NanInArray => write!(f, "Array contains NaN values."),
            CITestError::NonFiniteResidual { target_var } => {
                write!(f, "Weighted residuals of row {target_var} contain non-finite values.")
            }
            CITestError::MultivariateXY { x_len, y_len } => write!(
                f,
                "X and Y must be univariate for par_corr_wls, got |X| = {x_len}, |Y| = {y_len}."
            ),
            CITestError::InvalidExpertKnowledge(reason) => {
                write!(f, "Invalid expert knowledge: {reason}")
            }
            CITestError::InvalidWindowSize { window } => {
                write!(f, "Invalid window size {window}. Must be at least 1.")
            }
            CITestError::GroundTruthShapeMismatch { expected, found } => write!(
                f,
                "Ground-truth std table has shape {:?}, expected the data shape {:?}.",
                found, expected
            ),
            CITestError::InvalidGroundTruth { row, col, value } => write!(
                f,
                "Ground-truth std {value} at (t = {row}, var = {col}) must be finite and positive."
            ),
            CITestError::InvalidSignificance(reason) => {
                write!(f, "Invalid significance settings: {reason}")
            }
            CITestError::WindowTooLarge { window, len } => write!(
                f,
                "Window size {window} exceeds the {len} residuals available for smoothing."
            ),
            CITestError::UnpopulatedDriver { var } => write!(
                f,
                "Heteroskedasticity driver {var} has no lag-zero values in the auxiliary data."
            ),
            CITestError::MissingDriverValue { var, time } => write!(
                f,
                "Heteroskedasticity driver {var} is missing at t = {time}, where a residual needs it."
            ),
            CITestError::InsufficientDegreesOfFreedom { n_samples, dim } => write!(
                f,
                "Need more samples than array rows for the t-test, got T = {n_samples}, dim = {dim}."
            ),
            CITestError::DegenerateCorrelation => {
                write!(f, "Correlation undefined: a residual vector has zero variance.")
            }
            CITestError::Distribution(reason) => write!(f, "Distribution error: {reason}"),
            CITestError::Data(err) => write!(f, "{err}"),
            CITestError::Numerical(err) => write!(f, "{err}"),
        }
    }
}

impl From<DataError> for CITestError {
    fn from(err: DataError) -> Self {
        CITestError::Data(err)
    }
}

impl From<NumericalError> for CITestError {
    fn from(err: NumericalError) -> Self {
        match err {
            NumericalError::InvalidWindow { window: 0, .. } => {
                CITestError::InvalidWindowSize { window: 0 }
            }
            NumericalError::InvalidWindow { window, len } => {
                CITestError::WindowTooLarge { window, len }
            }
            other => CITestError::Numerical(other),
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<CITestError> for PyErr {
    fn from(err: CITestError) -> PyErr {
        PyValueError::new_err(format!("CITestError: {err}"))
    }
}
