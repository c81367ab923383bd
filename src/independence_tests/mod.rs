//! independence_tests — partial-correlation conditional-independence tests.
//!
//! Purpose
//! -------
//! Collect the conditional-independence tests of this crate and their shared
//! machinery: the Pearson correlation engine with analytic and shuffle
//! significance, the (weighted) least-squares residualizer, the rank-based
//! normal transform, and the common [`CondIndTest`] surface.
//!
//! Key behaviors
//! -------------
//! - [`ParCorr`] tests `X ⊥ Y | Z` with ordinary least-squares residuals.
//! - [`ParCorrWLS`] reweights the regressions by estimated or known noise
//!   standard deviations, for heteroskedastic data.
//! - Both report a [`CITestOutcome`] and fail with [`CITestError`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Arrays have X in row 0, Y in row 1 and conditioning rows after that.
//! - Tests are immutable after construction; per-call state (arrays, std
//!   estimates, auxiliary caches) is owned by the call.
//!
//! Conventions
//! -----------
//! - Hard failures are [`CITestError`] values; recoverable oddities (missing
//!   weights, constant rows) are logged through `tracing` and degrade
//!   gracefully.
//! - At the Python boundary every [`CITestError`] becomes a `ValueError`.
//!
//! Downstream usage
//! ----------------
//! ```rust,ignore
//! use rust_independence::data::{DataFrame, VarLag};
//! use rust_independence::independence_tests::{CondIndTest, ParCorrWLS, ParCorrWLSOptions};
//!
//! let test = ParCorrWLS::new(DataFrame::new(values)?, ParCorrWLSOptions::default())?;
//! let outcome = test.run_test(&[VarLag::new(0, -1)], &[VarLag::new(1, 0)], &[], 1, Some(0.05))?;
//! ```
pub mod correlation;
pub mod errors;
pub mod parcorr;
pub mod parcorr_wls;
pub mod residuals;
pub mod robust;
pub mod traits;

pub use self::correlation::{
    Alternative, CorrelationEngine, ShuffleOptions, Significance, pearson,
};
pub use self::errors::{CITestError, CITestResult};
pub use self::parcorr::{ParCorr, ParCorrOptions};
pub use self::parcorr_wls::{
    ExpertKnowledge, NoiseModelRegistry, NoiseSource, ParCorrWLS, ParCorrWLSOptions, TestContext,
};
pub use self::residuals::{WeightedResiduals, weighted_residuals};
pub use self::robust::trafo_to_normal;
pub use self::traits::{CITestOutcome, CondIndTest};
