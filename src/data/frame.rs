//! data::frame — multivariate time series and aligned X/Y/Z arrays.
//!
//! Purpose
//! -------
//! Store an observed multivariate time series and cut time-aligned arrays
//! out of it for conditional-independence testing. Each requested node
//! `(var, lag)` becomes one row; each retained reference time `t` becomes
//! one column holding `data[t + lag, var]`.
//!
//! Key behaviors
//! -------------
//! - Validate the raw `(T, N)` matrix, optional boolean mask and optional
//!   missing-value flag once, at construction.
//! - Clean node lists: duplicates are removed inside X, Y and Z, and with
//!   `remove_overlaps` Z nodes already present in X or Y are dropped.
//! - Discard the leading window selected by [`CutOff`] and every reference
//!   time at which a used value is missing or masked.
//! - Return the array together with the row labels and the cleaned node
//!   lists, so callers can locate the row of any node.
//!
//! Invariants & assumptions
//! ------------------------
//! - Data contain no NaN unless a missing-value flag is configured; NaN
//!   flags match NaN entries.
//! - Every node satisfies `var < N`, `lag ≤ 0` and `|lag| ≤ max_lag`.
//! - The returned array has at least one column.
//!
//! Conventions
//! -----------
//! - Raw data are stored time-major, `(T, N)`; arrays are variable-major,
//!   `(dim, n_samples)`.
//! - Row order is X nodes, then Y nodes, then Z nodes.
//!
//! Testing notes
//! -------------
//! - Unit tests cover lag alignment, cut-off policies, node cleaning,
//!   masking, missing-value removal and every validation branch.
use crate::data::errors::{DataError, DataResult};
use crate::data::nodes::{ArrayOptions, VarLag, XYZ};
use ndarray::{Array2, ArrayView2};

/// DataFrame — an observed `(T, N)` multivariate time series.
///
/// Fields
/// ------
/// - `values`: `Array2<f64>`
///   Observations, rows are time steps and columns variables.
/// - `mask`: `Option<Array2<bool>>`
///   Optional mask of the same shape; `true` marks a masked sample.
/// - `missing_flag`: `Option<f64>`
///   Value marking missing observations (may be NaN).
///
/// Invariants
/// ----------
/// - `values` is non-empty; NaNs only appear when `missing_flag` is set.
/// - `mask`, when present, has the same shape as `values`.
#[derive(Debug, Clone, PartialEq)]
pub struct DataFrame {
    values: Array2<f64>,
    mask: Option<Array2<bool>>,
    missing_flag: Option<f64>,
}

/// ConstructedArray — an aligned array plus its bookkeeping.
///
/// Fields
/// ------
/// - `array`: `Array2<f64>`
///   `(dim, n_samples)` matrix, rows in X, Y, Z order.
/// - `xyz`: `Vec<usize>`
///   Row labels, `0` for X, `1` for Y, `2` for Z.
/// - `nodes`: [`XYZ`]
///   Cleaned node lists; the `k`-th labelled node owns row `k`.
/// - `time_indices`: `Vec<usize>`
///   Reference time of each column; column `j` of the row for `(var, lag)`
///   holds `data[time_indices[j] + lag, var]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructedArray {
    pub array: Array2<f64>,
    pub xyz: Vec<usize>,
    pub nodes: XYZ,
    pub time_indices: Vec<usize>,
}

impl DataFrame {
    /// Wrap a `(T, N)` matrix of observations.
    ///
    /// Errors
    /// ------
    /// - `DataError::EmptyData` if `T == 0` or `N == 0`.
    /// - `DataError::UnflaggedNaN` at the first NaN entry.
    pub fn new(values: Array2<f64>) -> DataResult<Self> {
        let frame = DataFrame { values, mask: None, missing_flag: None };
        frame.validate()?;
        Ok(frame)
    }

    /// Attach a mask of the same shape as the data.
    pub fn with_mask(mut self, mask: Array2<bool>) -> DataResult<Self> {
        if mask.dim() != self.values.dim() {
            return Err(DataError::MaskShapeMismatch {
                expected: self.values.dim(),
                found: mask.dim(),
            });
        }
        self.mask = Some(mask);
        Ok(self)
    }

    /// Wrap observations in which `flag` (possibly NaN) marks missing values.
    pub fn with_missing_flag(values: Array2<f64>, flag: f64) -> DataResult<Self> {
        let frame = DataFrame { values, mask: None, missing_flag: Some(flag) };
        frame.validate()?;
        Ok(frame)
    }

    /// Number of variables `N`.
    pub fn n_vars(&self) -> usize {
        self.values.ncols()
    }

    /// Number of time steps `T`.
    pub fn n_samples(&self) -> usize {
        self.values.nrows()
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    fn validate(&self) -> DataResult<()> {
        let (rows, cols) = self.values.dim();
        if rows == 0 || cols == 0 {
            return Err(DataError::EmptyData { rows, cols });
        }
        let nan_flagged = matches!(self.missing_flag, Some(flag) if flag.is_nan());
        if !nan_flagged {
            if let Some(((row, col), _)) = self.values.indexed_iter().find(|(_, v)| v.is_nan()) {
                return Err(DataError::UnflaggedNaN { row, col });
            }
        }
        Ok(())
    }

    /// Whether `data[t, var]` is present and, when `apply_mask`, unmasked.
    pub fn is_observed(&self, t: usize, var: usize, apply_mask: bool) -> bool {
        if self.is_missing(self.values[[t, var]]) {
            return false;
        }
        match &self.mask {
            Some(mask) if apply_mask => !mask[[t, var]],
            _ => true,
        }
    }

    fn is_missing(&self, value: f64) -> bool {
        match self.missing_flag {
            Some(flag) if flag.is_nan() => value.is_nan(),
            Some(flag) => value == flag,
            None => false,
        }
    }

    /// Build the aligned array for nodes `X`, `Y`, `Z`.
    ///
    /// Parameters
    /// ----------
    /// - `x`, `y`: `&[VarLag]`
    ///   Tested nodes; each list must be non-empty.
    /// - `z`: `&[VarLag]`
    ///   Conditioning nodes (may be empty).
    /// - `tau_max`: `usize`
    ///   Maximum lag of the surrounding analysis; feeds the cut-off rule.
    /// - `opts`: `&ArrayOptions`
    ///   Masking, cut-off and overlap policy.
    ///
    /// Returns
    /// -------
    /// `DataResult<ConstructedArray>`
    ///   Array of shape `(dim, n)` where `n` counts the reference times in
    ///   `[max_lag, T)` that survive masking and missing-value removal.
    ///
    /// Errors
    /// ------
    /// - `EmptyXY`, `VariableOutOfRange`, `PositiveLag`, `LagExceedsWindow`
    ///   for malformed nodes.
    /// - `MaskTypeWithoutMask` if masking is requested without a mask.
    /// - `InsufficientSamples` if `max_lag ≥ T`; `NoValidSamples` if every
    ///   reference time was removed.
    pub fn construct_array(
        &self, x: &[VarLag], y: &[VarLag], z: &[VarLag], tau_max: usize, opts: &ArrayOptions,
    ) -> DataResult<ConstructedArray> {
        let nodes = self.clean_nodes(x, y, z, opts.remove_overlaps);
        let max_lag = opts.cut_off.max_lag(tau_max, &nodes);
        self.check_nodes(&nodes, max_lag)?;
        if !opts.mask_type.is_none() && self.mask.is_none() {
            return Err(DataError::MaskTypeWithoutMask);
        }

        let n_samples = self.n_samples();
        if max_lag >= n_samples {
            return Err(DataError::InsufficientSamples { max_lag, n_samples });
        }

        let labelled: Vec<(usize, VarLag)> = nodes.labelled_nodes().collect();
        let source_row = |t: usize, node: &VarLag| (t as isize + node.lag) as usize;

        let kept: Vec<usize> = (max_lag..n_samples)
            .filter(|&t| {
                labelled.iter().all(|(label, node)| {
                    let apply_mask = opts.mask_type.applies_to(*label);
                    self.is_observed(source_row(t, node), node.var, apply_mask)
                })
            })
            .collect();
        if kept.is_empty() {
            return Err(DataError::NoValidSamples);
        }

        let array = Array2::from_shape_fn((labelled.len(), kept.len()), |(i, j)| {
            let node = &labelled[i].1;
            self.values[[source_row(kept[j], node), node.var]]
        });
        let xyz = labelled.iter().map(|(label, _)| *label).collect();

        Ok(ConstructedArray { array, xyz, nodes, time_indices: kept })
    }

    fn clean_nodes(&self, x: &[VarLag], y: &[VarLag], z: &[VarLag], remove_overlaps: bool) -> XYZ {
        let x = unique_in_order(x);
        let y = unique_in_order(y);
        let mut z = unique_in_order(z);
        if remove_overlaps {
            z.retain(|node| !x.contains(node) && !y.contains(node));
        }
        XYZ { x, y, z }
    }

    fn check_nodes(&self, nodes: &XYZ, max_lag: usize) -> DataResult<()> {
        if nodes.x.is_empty() || nodes.y.is_empty() {
            return Err(DataError::EmptyXY);
        }
        let n_vars = self.n_vars();
        for (_, VarLag { var, lag }) in nodes.labelled_nodes() {
            if var >= n_vars {
                return Err(DataError::VariableOutOfRange { var, n_vars });
            }
            if lag > 0 {
                return Err(DataError::PositiveLag { var, lag });
            }
            if lag.unsigned_abs() > max_lag {
                return Err(DataError::LagExceedsWindow { var, lag, max_lag });
            }
        }
        Ok(())
    }
}

fn unique_in_order(nodes: &[VarLag]) -> Vec<VarLag> {
    let mut out: Vec<VarLag> = Vec::with_capacity(nodes.len());
    for node in nodes {
        if !out.contains(node) {
            out.push(*node);
        }
    }
    out
}
