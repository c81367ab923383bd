//! data — observed time series and aligned X/Y/Z array construction.
//!
//! Purpose
//! -------
//! Own the observed multivariate series and the procedure that turns node
//! specifications `(var, lag)` into the time-aligned arrays consumed by the
//! independence tests, together with the bookkeeping needed to locate the
//! row of any node.
//!
//! Key behaviors
//! -------------
//! - [`DataFrame`] validates data, masks and missing-value flags once.
//! - [`DataFrame::construct_array`] returns a [`ConstructedArray`] with the
//!   array, row labels and cleaned [`XYZ`] node lists.
//! - [`ArrayOptions`], [`CutOff`] and [`MaskType`] configure the window and
//!   masking policy.
//!
//! Invariants & assumptions
//! ------------------------
//! - Lags are non-positive and bounded by the cut-off window.
//! - Arrays never contain missing values; masked and missing reference
//!   times are removed as whole columns.

pub mod errors;
pub mod frame;
pub mod nodes;

pub use self::errors::{DataError, DataResult};
pub use self::frame::{ConstructedArray, DataFrame};
pub use self::nodes::{ArrayOptions, CutOff, MaskType, VarLag, XYZ};
