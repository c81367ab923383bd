//! numerical::errors — error type for the low-level numerical kernels.
//!
//! Purpose
//! -------
//! Report shape and configuration failures from least-squares solving and
//! residual smoothing without tying the kernels to any particular test
//! statistic. Higher layers convert these into their own error types.
//!
//! Conventions
//! -----------
//! - Messages are phrased in terms of the violated constraint (e.g.
//!   "1 ≤ window ≤ n") and embed the offending values.
//! - Rank deficiency is *not* an error anywhere in this subtree; the
//!   least-squares kernel returns the minimum-norm solution instead.

pub type NumericalResult<T> = Result<T, NumericalError>;

/// NumericalError — failures raised by `numerical` kernels.
///
/// Variants
/// --------
/// - `InvalidWindow { window, len }`
///   The smoothing window is zero or longer than the sequence it is
///   applied to.
/// - `DimensionMismatch { rows, len }`
///   Design matrix rows and target length disagree.
/// - `Decomposition(String)`
///   The SVD backend could not produce a solution (e.g. singular vectors
///   were not computed).
#[derive(Debug, Clone, PartialEq)]
pub enum NumericalError {
    InvalidWindow { window: usize, len: usize },
    DimensionMismatch { rows: usize, len: usize },
    Decomposition(String),
}

impl std::error::Error for NumericalError {}

impl std::fmt::Display for NumericalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NumericalError::InvalidWindow { window, len } => write!(
                f,
                "Invalid smoothing window {window} for a sequence of length {len}. Must satisfy 1 ≤ window ≤ n."
            ),
            NumericalError::DimensionMismatch { rows, len } => write!(
                f,
                "Design matrix has {rows} rows but the target has length {len}."
            ),
            NumericalError::Decomposition(reason) => {
                write!(f, "Least-squares decomposition failed: {reason}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Verify that `InvalidWindow` reports both the window and the length.
    //
    // Given
    // -----
    // - `NumericalError::InvalidWindow { window: 12, len: 7 }`.
    //
    // Expect
    // ------
    // - The `Display` message contains "12" and "7".
    fn numerical_error_invalid_window_includes_payload_in_display() {
        // Arrange
        let err = NumericalError::InvalidWindow { window: 12, len: 7 };

        // Act
        let msg = err.to_string();

        // Assert
        assert!(msg.contains("12") && msg.contains('7'), "Got: {msg}");
    }
}
