//! numerical — least-squares and smoothing kernels shared by the tests.
//!
//! Purpose
//! -------
//! Hold the small, allocation-light numerical building blocks that the
//! independence tests compose: minimum-norm least squares on top of
//! `nalgebra`'s SVD, box-kernel trailing means, and stable sort/unsort
//! permutations.
//!
//! Key behaviors
//! -------------
//! - [`lstsq`] never fails on rank-deficient designs.
//! - [`smooth_with_placeholder`] keeps sequence length by padding the
//!   leading `w − 1` positions with ones.
//! - [`stable_argsort`] / [`invert_permutation`] support smoothing in an
//!   order other than time order.
//!
//! Conventions
//! -----------
//! - Inputs are `ndarray` views; outputs are owned `Array1<f64>` values.
//! - Errors are reported via [`NumericalError`] and converted by callers.

pub mod errors;
pub mod lstsq;
pub mod smoothing;

pub use self::errors::{NumericalError, NumericalResult};
pub use self::lstsq::lstsq;
pub use self::smoothing::{
    invert_permutation, smooth_with_placeholder, stable_argsort, trailing_mean,
};
