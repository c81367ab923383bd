//! parcorr_wls::options — configuration of the weighted partial-correlation test.
//!
//! Purpose
//! -------
//! Describe how the noise standard deviations of each variable are obtained
//! ([`ExpertKnowledge`]) and bundle every construction-time setting of
//! [`ParCorrWLS`](super::ParCorrWLS) in [`ParCorrWLSOptions`].
//!
//! Key behaviors
//! -------------
//! - Two global markers are accepted: `"time-dependent heteroskedasticity"`
//!   (every variable is time-dependent) and `"homoskedasticity"` (no
//!   variable is reweighted).
//! - An explicit map assigns one [`NoiseSource`] per variable; variables
//!   absent from the map are homoskedastic.
//! - [`ExpertKnowledge::from_entries`] accepts the list-valued form used at
//!   the Python boundary, where each variable maps to a one-element list.
//!
//! Conventions
//! -----------
//! - Parent drivers are [`VarLag`] nodes with `lag ≤ 0`; range checks against
//!   the data happen when the registry is resolved.
use crate::data::{ArrayOptions, VarLag};
use crate::independence_tests::correlation::CorrelationEngine;
use crate::independence_tests::errors::{CITestError, CITestResult};
use ndarray::Array2;
use std::collections::BTreeMap;

/// Marker selecting time-dependent heteroskedasticity for every variable.
pub const TIME_DEPENDENT_MARKER: &str = "time-dependent heteroskedasticity";
/// Marker declaring every variable homoskedastic.
pub const HOMOSKEDASTIC_MARKER: &str = "homoskedasticity";

/// NoiseSource — what drives the noise level of one variable.
///
/// Variants
/// --------
/// - `Homoskedastic`: constant variance, unit weights.
/// - `TimeDependent`: variance changes smoothly with time.
/// - `ParentDependent(driver)`: variance changes smoothly with the value of
///   the lagged variable `driver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseSource {
    #[default]
    Homoskedastic,
    TimeDependent,
    ParentDependent(VarLag),
}

impl NoiseSource {
    /// Parse a string entry of an explicit map.
    pub fn from_marker(marker: &str) -> CITestResult<Self> {
        match marker {
            TIME_DEPENDENT_MARKER => Ok(NoiseSource::TimeDependent),
            HOMOSKEDASTIC_MARKER => Ok(NoiseSource::Homoskedastic),
            other => Err(CITestError::InvalidExpertKnowledge(format!(
                "unknown heteroskedasticity marker {other:?}"
            ))),
        }
    }
}

/// ExpertKnowledge — user statement about heteroskedasticity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ExpertKnowledge {
    /// Every variable has time-dependent noise.
    #[default]
    TimeDependent,
    /// No variable is reweighted.
    Homoskedastic,
    /// Per-variable sources; absent variables are homoskedastic.
    Explicit(BTreeMap<usize, NoiseSource>),
}

impl ExpertKnowledge {
    /// Parse one of the two global markers.
    pub fn from_marker(marker: &str) -> CITestResult<Self> {
        match marker {
            TIME_DEPENDENT_MARKER => Ok(ExpertKnowledge::TimeDependent),
            HOMOSKEDASTIC_MARKER => Ok(ExpertKnowledge::Homoskedastic),
            other => Err(CITestError::InvalidExpertKnowledge(format!(
                "expected {TIME_DEPENDENT_MARKER:?}, {HOMOSKEDASTIC_MARKER:?} or a map, got {other:?}"
            ))),
        }
    }

    /// Build an explicit map from `(variable, [source])` entries.
    ///
    /// Errors
    /// ------
    /// - `InvalidExpertKnowledge` if a list does not hold exactly one source
    ///   or a variable appears twice.
    pub fn from_entries<I>(entries: I) -> CITestResult<Self>
    where
        I: IntoIterator<Item = (usize, Vec<NoiseSource>)>,
    {
        let mut map = BTreeMap::new();
        for (var, sources) in entries {
            let [source] = sources.as_slice() else {
                return Err(CITestError::InvalidExpertKnowledge(format!(
                    "variable {var} must map to exactly one heteroskedasticity source, got {}",
                    sources.len()
                )));
            };
            if map.insert(var, *source).is_some() {
                return Err(CITestError::InvalidExpertKnowledge(format!(
                    "variable {var} is listed more than once"
                )));
            }
        }
        Ok(ExpertKnowledge::Explicit(map))
    }
}

/// ParCorrWLSOptions — construction-time settings of the weighted test.
///
/// Fields
/// ------
/// - `gt_std_matrix`: `Option<Array2<f64>>`
///   True noise standard deviations, same `(T, N)` shape as the data. When
///   present, estimation is skipped entirely. Default: `None`.
/// - `expert_knowledge`: [`ExpertKnowledge`]
///   Default: [`ExpertKnowledge::TimeDependent`].
/// - `window_size`: `usize`
///   Smoothing window of the std estimators, `≥ 1`. Default: 10.
/// - `robustify`: `bool`
///   Rank-transform rows to normal marginals before residualizing.
///   Default: `false`.
/// - `engine`: [`CorrelationEngine`]
///   Significance method and tail.
/// - `array`: [`ArrayOptions`]
///   Masking, cut-off and overlap policy.
/// - `verbosity`: `u8`
///   `> 0` enables diagnostic warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct ParCorrWLSOptions {
    pub gt_std_matrix: Option<Array2<f64>>,
    pub expert_knowledge: ExpertKnowledge,
    pub window_size: usize,
    pub robustify: bool,
    pub engine: CorrelationEngine,
    pub array: ArrayOptions,
    pub verbosity: u8,
}

impl Default for ParCorrWLSOptions {
    fn default() -> Self {
        ParCorrWLSOptions {
            gt_std_matrix: None,
            expert_knowledge: ExpertKnowledge::default(),
            window_size: 10,
            robustify: false,
            engine: CorrelationEngine::default(),
            array: ArrayOptions::default(),
            verbosity: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Verify marker parsing for both global markers and an unknown string.
    //
    // Given
    // -----
    // - The two markers and "heteroskedastic".
    //
    // Expect
    // ------
    // - TimeDependent, Homoskedastic, and `InvalidExpertKnowledge`.
    fn expert_knowledge_parses_global_markers() {
        // Act / Assert
        assert_eq!(
            ExpertKnowledge::from_marker(TIME_DEPENDENT_MARKER),
            Ok(ExpertKnowledge::TimeDependent)
        );
        assert_eq!(
            ExpertKnowledge::from_marker(HOMOSKEDASTIC_MARKER),
            Ok(ExpertKnowledge::Homoskedastic)
        );
        assert!(matches!(
            ExpertKnowledge::from_marker("heteroskedastic"),
            Err(CITestError::InvalidExpertKnowledge(_))
        ));
    }

    #[test]
    // Purpose
    // -------
    // Check the one-element-list rule of explicit entries.
    //
    // Given
    // -----
    // - {1: [TimeDependent], 2: [Parent((0, -1))]} and {1: []}.
    //
    // Expect
    // ------
    // - An explicit map with both entries; an error for the empty list.
    fn expert_knowledge_from_entries_requires_single_source() {
        // Arrange
        let good = vec![
            (1, vec![NoiseSource::TimeDependent]),
            (2, vec![NoiseSource::ParentDependent(VarLag::new(0, -1))]),
        ];
        let empty = vec![(1, vec![])];

        // Act
        let parsed = ExpertKnowledge::from_entries(good).unwrap();

        // Assert
        let ExpertKnowledge::Explicit(map) = parsed else {
            panic!("expected an explicit map");
        };
        assert_eq!(map.get(&1), Some(&NoiseSource::TimeDependent));
        assert_eq!(map.get(&2), Some(&NoiseSource::ParentDependent(VarLag::new(0, -1))));
        assert!(matches!(
            ExpertKnowledge::from_entries(empty),
            Err(CITestError::InvalidExpertKnowledge(_))
        ));
    }
}
