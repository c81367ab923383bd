//! data::errors — error type for data frames and array construction.
//!
//! Purpose
//! -------
//! Describe every way a [`DataFrame`](crate::data::DataFrame) can be
//! rejected at construction or fail to produce an aligned X/Y/Z array, so
//! that the independence tests can surface these as input errors.
//!
//! Conventions
//! -----------
//! - Variants carry the offending indices or shapes; messages name the
//!   violated constraint.
//! - `From<DataError> for PyErr` maps every variant to `ValueError` when the
//!   `python-bindings` feature is enabled.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type DataResult<T> = Result<T, DataError>;

/// DataError — invalid data or node specifications.
///
/// Variants
/// --------
/// - `EmptyData { rows, cols }`
///   The data matrix has no observations or no variables.
/// - `UnflaggedNaN { row, col }`
///   A NaN was found while no missing-value flag is configured.
/// - `MaskShapeMismatch { expected, found }`
///   Mask and data shapes differ.
/// - `MaskTypeWithoutMask`
///   Masking was requested for some rows but the frame has no mask.
/// - `EmptyXY`
///   X or Y contains no node.
/// - `VariableOutOfRange { var, n_vars }`
///   A node refers to a variable index ≥ N.
/// - `PositiveLag { var, lag }`
///   A node refers to the future (`lag > 0`).
/// - `LagExceedsWindow { var, lag, max_lag }`
///   `|lag|` is larger than the cut-off window, so early samples would read
///   before the start of the series.
/// - `InsufficientSamples { max_lag, n_samples }`
///   The cut-off leaves no time step to build a column from.
/// - `NoValidSamples`
///   Every candidate sample was removed by masking or missing values.
#[derive(Debug, Clone, PartialEq)]
pub enum DataError {
    EmptyData { rows: usize, cols: usize },
    UnflaggedNaN { row: usize, col: usize },
    MaskShapeMismatch { expected: (usize, usize), found: (usize, usize) },
    MaskTypeWithoutMask,
    EmptyXY,
    VariableOutOfRange { var: usize, n_vars: usize },
    PositiveLag { var: usize, lag: isize },
    LagExceedsWindow { var: usize, lag: isize, max_lag: usize },
    InsufficientSamples { max_lag: usize, n_samples: usize },
    NoValidSamples,
}

impl std::error::Error for DataError {}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::EmptyData { rows, cols } => {
                write!(f, "Data must have at least one observation and one variable, got {rows}×{cols}.")
            }
            DataError::UnflaggedNaN { row, col } => write!(
                f,
                "NaN found at (t = {row}, var = {col}); NaNs must be flagged with a missing-value flag."
            ),
            DataError::MaskShapeMismatch { expected, found } => write!(
                f,
                "Mask shape {:?} does not match data shape {:?}.",
                found, expected
            ),
            DataError::MaskTypeWithoutMask => {
                write!(f, "A mask type was requested but the data frame has no mask.")
            }
            DataError::EmptyXY => write!(f, "X and Y must each contain at least one node."),
            DataError::VariableOutOfRange { var, n_vars } => {
                write!(f, "Variable index {var} out of range. Must satisfy 0 ≤ var < {n_vars}.")
            }
            DataError::PositiveLag { var, lag } => {
                write!(f, "Node ({var}, {lag}) has a positive lag. Lags must be ≤ 0.")
            }
            DataError::LagExceedsWindow { var, lag, max_lag } => write!(
                f,
                "Node ({var}, {lag}) reaches further back than the cut-off window of {max_lag} steps."
            ),
            DataError::InsufficientSamples { max_lag, n_samples } => write!(
                f,
                "Cut-off of {max_lag} steps leaves no samples from a series of length {n_samples}."
            ),
            DataError::NoValidSamples => {
                write!(f, "All samples were removed by masking or missing values.")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<DataError> for PyErr {
    fn from(err: DataError) -> PyErr {
        PyValueError::new_err(format!("DataError: {err}"))
    }
}
