//! parcorr_wls::noise_model — resolved per-variable heteroskedasticity sources.
//!
//! Purpose
//! -------
//! Turn [`ExpertKnowledge`] into an immutable lookup from variable index to
//! [`NoiseSource`], validated against the number of variables in the data.
//! The registry is resolved once when the test is constructed and never
//! changes afterwards.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every key satisfies `var < N`.
//! - Every parent driver satisfies `var < N` and `lag ≤ 0`.
//! - Variables without an entry are homoskedastic. When the knowledge was
//!   an explicit map, such variables are also reported as unlisted so the
//!   caller can warn about the silent default.
use crate::data::VarLag;
use crate::independence_tests::errors::{CITestError, CITestResult};
use crate::independence_tests::parcorr_wls::options::{ExpertKnowledge, NoiseSource};
use std::collections::{BTreeMap, BTreeSet};

/// NoiseModelRegistry — variable index → noise source.
///
/// `listed` holds the keys of an explicit map, `None` for global markers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NoiseModelRegistry {
    sources: BTreeMap<usize, NoiseSource>,
    listed: Option<BTreeSet<usize>>,
}

impl NoiseModelRegistry {
    /// Expand global markers and validate explicit entries for `n_vars`
    /// variables.
    ///
    /// Errors
    /// ------
    /// - `InvalidExpertKnowledge` for a variable or driver index `≥ n_vars`
    ///   or a driver with positive lag.
    pub fn resolve(knowledge: &ExpertKnowledge, n_vars: usize) -> CITestResult<Self> {
        let (sources, listed) = match knowledge {
            ExpertKnowledge::TimeDependent => {
                ((0..n_vars).map(|var| (var, NoiseSource::TimeDependent)).collect(), None)
            }
            ExpertKnowledge::Homoskedastic => (BTreeMap::new(), None),
            ExpertKnowledge::Explicit(map) => {
                for (&var, source) in map {
                    if var >= n_vars {
                        return Err(CITestError::InvalidExpertKnowledge(format!(
                            "variable {var} out of range for {n_vars} variables"
                        )));
                    }
                    if let NoiseSource::ParentDependent(driver) = source {
                        check_driver(var, driver, n_vars)?;
                    }
                }
                let sources = map
                    .iter()
                    .filter(|(_, source)| **source != NoiseSource::Homoskedastic)
                    .map(|(&var, &source)| (var, source))
                    .collect();
                (sources, Some(map.keys().copied().collect()))
            }
        };
        Ok(NoiseModelRegistry { sources, listed })
    }

    /// Noise source of `var`; homoskedastic when absent.
    pub fn source(&self, var: usize) -> NoiseSource {
        self.sources.get(&var).copied().unwrap_or_default()
    }

    /// Whether `var` fell back to homoskedastic because an explicit map
    /// has no entry for it.
    pub fn is_unlisted(&self, var: usize) -> bool {
        matches!(&self.listed, Some(keys) if !keys.contains(&var))
    }
}

fn check_driver(var: usize, driver: &VarLag, n_vars: usize) -> CITestResult<()> {
    if driver.var >= n_vars {
        return Err(CITestError::InvalidExpertKnowledge(format!(
            "driver ({}, {}) of variable {var} out of range for {n_vars} variables",
            driver.var, driver.lag
        )));
    }
    if driver.lag > 0 {
        return Err(CITestError::InvalidExpertKnowledge(format!(
            "driver ({}, {}) of variable {var} has a positive lag",
            driver.var, driver.lag
        )));
    }
    Ok(())
}
