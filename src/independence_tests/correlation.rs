//! independence_tests::correlation — Pearson correlation and its significance.
//!
//! Purpose
//! -------
//! Provide the correlation engine shared by the partial-correlation tests:
//! Pearson's r between two residual vectors, an analytic Student's-t
//! p-value, and a block-shuffle permutation p-value.
//!
//! Key behaviors
//! -------------
//! - [`pearson`] returns r clamped to `[-1, 1]`.
//! - [`CorrelationEngine::analytic_pvalue`] transforms r to
//!   `t = r·√(df / (1 − r²))` with `df = T − dim` and evaluates the
//!   Student's-t tail selected by [`Alternative`].
//! - [`CorrelationEngine::shuffle_pvalue`] rebuilds the null distribution
//!   by permuting blocks of the x residual and re-correlating with y;
//!   the p-value is `(#{null at least as extreme} + 1) / (samples + 1)`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Residual vectors passed in are already weighted; the engine applies no
//!   further transformation, so shuffled statistics use the same weights as
//!   the observed one.
//! - Shuffling is reproducible: the generator is a `StdRng` seeded from
//!   [`ShuffleOptions::seed`].
//!
//! Conventions
//! -----------
//! - `|r| = 1` yields an analytic p-value of exactly `0`.
//! - A zero-variance residual vector is a [`CITestError::DegenerateCorrelation`].
use crate::independence_tests::errors::{CITestError, CITestResult};
use ndarray::{Array1, ArrayView1, s};
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Tail of the test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alternative {
    #[default]
    TwoSided,
    Greater,
    Less,
}

/// ShuffleOptions — settings of the block-shuffle significance test.
///
/// Fields
/// ------
/// - `sig_samples`: `usize`
///   Number of shuffled statistics in the null distribution. Default: 500.
/// - `sig_blocklength`: `Option<usize>`
///   Block length; `None` shuffles single samples.
/// - `seed`: `u64`
///   Seed of the `StdRng` driving the permutations. Default: 42.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShuffleOptions {
    pub sig_samples: usize,
    pub sig_blocklength: Option<usize>,
    pub seed: u64,
}

impl Default for ShuffleOptions {
    fn default() -> Self {
        ShuffleOptions { sig_samples: 500, sig_blocklength: None, seed: 42 }
    }
}

/// How the p-value of a test run is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Significance {
    #[default]
    Analytic,
    Shuffle(ShuffleOptions),
}

/// CorrelationEngine — significance settings plus the statistic itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CorrelationEngine {
    pub significance: Significance,
    pub alternative: Alternative,
}

impl CorrelationEngine {
    pub fn new(significance: Significance, alternative: Alternative) -> Self {
        CorrelationEngine { significance, alternative }
    }

    /// p-value of `value` using the configured significance method.
    ///
    /// `x_resid` and `y_resid` are the residual vectors `value` was computed
    /// from; `dim` is the number of rows of the originating array.
    pub fn pvalue(
        &self, value: f64, x_resid: ArrayView1<f64>, y_resid: ArrayView1<f64>, dim: usize,
    ) -> CITestResult<f64> {
        match self.significance {
            Significance::Analytic => self.analytic_pvalue(value, x_resid.len(), dim),
            Significance::Shuffle(opts) => self.shuffle_pvalue(value, x_resid, y_resid, &opts),
        }
    }

    /// Student's-t p-value with `T − dim` degrees of freedom.
    ///
    /// Errors
    /// ------
    /// - `InsufficientDegreesOfFreedom` if `T − dim < 1`.
    /// - `Distribution` if `statrs` rejects the parameters.
    pub fn analytic_pvalue(&self, value: f64, n_samples: usize, dim: usize) -> CITestResult<f64> {
        if n_samples <= dim {
            return Err(CITestError::InsufficientDegreesOfFreedom { n_samples, dim });
        }
        if (value.abs() - 1.0).abs() <= f64::MIN_POSITIVE {
            return Ok(0.0);
        }

        let df = (n_samples - dim) as f64;
        let t_stat = value * (df / (1.0 - value * value)).sqrt();
        let dist = StudentsT::new(0.0, 1.0, df)
            .map_err(|err| CITestError::Distribution(err.to_string()))?;

        let p = match self.alternative {
            Alternative::TwoSided => 2.0 * dist.sf(t_stat.abs()),
            Alternative::Greater => dist.sf(t_stat),
            Alternative::Less => dist.cdf(t_stat),
        };
        Ok(p.min(1.0))
    }

    /// Block-shuffle p-value of `value`.
    ///
    /// The x residual is cut into `⌊T / L⌋` blocks of length `L`, the blocks
    /// are permuted, and any leftover tail is reinserted at a random block
    /// boundary. Each permutation is correlated with the unchanged y
    /// residual.
    ///
    /// Errors
    /// ------
    /// - `InvalidSignificance` for zero samples or a block length outside
    ///   `1..=T`.
    /// - `DegenerateCorrelation` if a residual vector is constant.
    pub fn shuffle_pvalue(
        &self, value: f64, x_resid: ArrayView1<f64>, y_resid: ArrayView1<f64>,
        opts: &ShuffleOptions,
    ) -> CITestResult<f64> {
        let null = shuffle_null_distribution(x_resid, y_resid, opts)?;
        let extreme = null
            .iter()
            .filter(|&&stat| match self.alternative {
                Alternative::TwoSided => stat.abs() >= value.abs(),
                Alternative::Greater => stat >= value,
                Alternative::Less => stat <= value,
            })
            .count();
        Ok((extreme + 1) as f64 / (null.len() + 1) as f64)
    }
}

/// Pearson's correlation coefficient, clamped to `[-1, 1]`.
pub fn pearson(x: ArrayView1<f64>, y: ArrayView1<f64>) -> CITestResult<f64> {
    let n = x.len();
    if n == 0 || n != y.len() {
        return Err(CITestError::DegenerateCorrelation);
    }
    let mean_x = x.sum() / n as f64;
    let mean_y = y.sum() / n as f64;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (&a, &b) in x.iter().zip(y.iter()) {
        let (dx, dy) = (a - mean_x, b - mean_y);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    let denom = (sxx * syy).sqrt();
    if denom == 0.0 || !denom.is_finite() {
        return Err(CITestError::DegenerateCorrelation);
    }
    Ok((sxy / denom).clamp(-1.0, 1.0))
}

fn shuffle_null_distribution(
    x_resid: ArrayView1<f64>, y_resid: ArrayView1<f64>, opts: &ShuffleOptions,
) -> CITestResult<Vec<f64>> {
    let n = x_resid.len();
    let block = opts.sig_blocklength.unwrap_or(1);
    if opts.sig_samples == 0 {
        return Err(CITestError::InvalidSignificance("sig_samples must be positive.".into()));
    }
    if block == 0 || block > n {
        return Err(CITestError::InvalidSignificance(format!(
            "sig_blocklength {block} must lie in 1..={n}."
        )));
    }

    let n_blocks = n / block;
    let block_starts: Vec<usize> = (0..n_blocks).map(|k| k * block).collect();
    let tail = x_resid.slice(s![n_blocks * block..]);
    let mut rng = StdRng::seed_from_u64(opts.seed);
    let mut starts = block_starts.clone();
    let mut null = Vec::with_capacity(opts.sig_samples);

    for _ in 0..opts.sig_samples {
        starts.shuffle(&mut rng);
        let mut shuffled: Vec<f64> = Vec::with_capacity(n);
        for &start in &starts {
            shuffled.extend(x_resid.slice(s![start..start + block]).iter());
        }
        if !tail.is_empty() {
            if let Some(&at) = block_starts.choose(&mut rng) {
                shuffled.splice(at..at, tail.iter().copied());
            }
        }
        null.push(pearson(Array1::from(shuffled).view(), y_resid)?);
    }
    Ok(null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Pearson's r on exact linear relations and degenerate input.
    // - Analytic p-values: symmetry of tails, the |r| = 1 shortcut and the
    //   degrees-of-freedom guard.
    // - Shuffle p-values: range, reproducibility, block-length validation.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify r = ±1 for exact linear relations and r = 0 for an orthogonal pair.
    //
    // Given
    // -----
    // - x = [1, 2, 3, 4], y = 2x + 1, y = −x, and z = [1, −1, −1, 1].
    //
    // Expect
    // ------
    // - r(x, 2x + 1) = 1, r(x, −x) = −1, r(x, z) = 0.
    fn pearson_matches_exact_linear_relations() {
        // Arrange
        let x = array![1.0, 2.0, 3.0, 4.0];
        let z = array![1.0, -1.0, -1.0, 1.0];

        // Act / Assert
        assert_relative_eq!(pearson(x.view(), x.mapv(|v| 2.0 * v + 1.0).view()).unwrap(), 1.0);
        assert_relative_eq!(pearson(x.view(), x.mapv(|v| -v).view()).unwrap(), -1.0);
        assert_relative_eq!(pearson(x.view(), z.view()).unwrap(), 0.0, epsilon = 1e-15);
    }

    #[test]
    // Purpose
    // -------
    // Ensure constant input is reported rather than producing NaN.
    //
    // Given
    // -----
    // - x = [1, 1, 1], y = [1, 2, 3].
    //
    // Expect
    // ------
    // - `DegenerateCorrelation`.
    fn pearson_rejects_constant_vector() {
        // Arrange
        let x = array![1.0, 1.0, 1.0];
        let y = array![1.0, 2.0, 3.0];

        // Act / Assert
        assert_eq!(pearson(x.view(), y.view()), Err(CITestError::DegenerateCorrelation));
    }

    #[test]
    // Purpose
    // -------
    // Check the relation between the three tails and the |r| = 1 shortcut.
    //
    // Given
    // -----
    // - r = 0.3, T = 50, dim = 3.
    //
    // Expect
    // ------
    // - two-sided = 2·greater; greater + less = 1; p(r = 1) = 0.
    fn analytic_pvalue_tails_are_consistent() {
        // Arrange
        let two = CorrelationEngine::new(Significance::Analytic, Alternative::TwoSided);
        let greater = CorrelationEngine::new(Significance::Analytic, Alternative::Greater);
        let less = CorrelationEngine::new(Significance::Analytic, Alternative::Less);

        // Act
        let p_two = two.analytic_pvalue(0.3, 50, 3).unwrap();
        let p_greater = greater.analytic_pvalue(0.3, 50, 3).unwrap();
        let p_less = less.analytic_pvalue(0.3, 50, 3).unwrap();

        // Assert
        assert_relative_eq!(p_two, 2.0 * p_greater, epsilon = 1e-12);
        assert_relative_eq!(p_greater + p_less, 1.0, epsilon = 1e-12);
        assert!(p_two > 0.0 && p_two < 0.05, "p = {p_two}");
        assert_eq!(two.analytic_pvalue(1.0, 50, 3).unwrap(), 0.0);
    }

    #[test]
    // Purpose
    // -------
    // Verify the degrees-of-freedom guard.
    //
    // Given
    // -----
    // - T = 3, dim = 3.
    //
    // Expect
    // ------
    // - `InsufficientDegreesOfFreedom { n_samples: 3, dim: 3 }`.
    fn analytic_pvalue_requires_positive_degrees_of_freedom() {
        // Arrange
        let engine = CorrelationEngine::default();

        // Act / Assert
        assert_eq!(
            engine.analytic_pvalue(0.2, 3, 3),
            Err(CITestError::InsufficientDegreesOfFreedom { n_samples: 3, dim: 3 })
        );
    }

    #[test]
    // Purpose
    // -------
    // Check that shuffle p-values are reproducible for a fixed seed, lie in
    // `[1/(B+1), 1]`, and are small for a strongly dependent pair.
    //
    // Given
    // -----
    // - x = sin(t), y = x + small perturbation, T = 40, B = 99, block length 3.
    //
    // Expect
    // ------
    // - Identical p-values for repeated calls; p = 1/100 for the dependent pair.
    fn shuffle_pvalue_is_reproducible_and_bounded() {
        // Arrange
        let x = Array1::from_shape_fn(40, |t| (t as f64 * 0.7).sin());
        let y = Array1::from_shape_fn(40, |t| x[t] + 0.01 * ((t * 7) % 5) as f64);
        let opts = ShuffleOptions { sig_samples: 99, sig_blocklength: Some(3), seed: 7 };
        let engine = CorrelationEngine::new(Significance::Shuffle(opts), Alternative::TwoSided);
        let value = pearson(x.view(), y.view()).unwrap();

        // Act
        let p1 = engine.pvalue(value, x.view(), y.view(), 2).unwrap();
        let p2 = engine.pvalue(value, x.view(), y.view(), 2).unwrap();

        // Assert
        assert_eq!(p1, p2);
        assert_relative_eq!(p1, 1.0 / 100.0);
    }

    #[test]
    // Purpose
    // -------
    // Ensure unusable shuffle settings are rejected.
    //
    // Given
    // -----
    // - T = 5 with block length 6, and zero samples.
    //
    // Expect
    // ------
    // - `InvalidSignificance` for both.
    fn shuffle_pvalue_rejects_invalid_settings() {
        // Arrange
        let x = array![1.0, 2.0, 3.0, 4.0, 5.0];
        let engine = CorrelationEngine::default();
        let long = ShuffleOptions { sig_samples: 10, sig_blocklength: Some(6), seed: 0 };
        let empty = ShuffleOptions { sig_samples: 0, sig_blocklength: None, seed: 0 };

        // Act / Assert
        assert!(matches!(
            engine.shuffle_pvalue(0.5, x.view(), x.view(), &long),
            Err(CITestError::InvalidSignificance(_))
        ));
        assert!(matches!(
            engine.shuffle_pvalue(0.5, x.view(), x.view(), &empty),
            Err(CITestError::InvalidSignificance(_))
        ));
    }
}
