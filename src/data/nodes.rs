//! data::nodes — variable references, node lists, and array options.
//!
//! Purpose
//! -------
//! Name lagged variables and bundle the settings that control how an
//! aligned X/Y/Z array is cut out of a [`DataFrame`](crate::data::DataFrame).
//!
//! Key behaviors
//! -------------
//! - [`VarLag`] identifies a variable index and a non-positive lag relative
//!   to the test's reference time.
//! - [`XYZ`] holds the cleaned node lists in row order (X rows, then Y rows,
//!   then Z rows) and can be walked as one sequence.
//! - [`CutOff`] selects how many leading time steps are discarded.
//! - [`MaskType`] selects which row groups honour the data mask.
//! - [`ArrayOptions`] bundles cut-off, masking and overlap removal.
//!
//! Conventions
//! -----------
//! - Lags are `isize` and must be `≤ 0`; `(3, -2)` reads variable 3 two
//!   steps before the reference time.
//! - Row labels are `0` for X, `1` for Y and `2` for Z.

/// A lagged variable `(var, lag)` with `lag ≤ 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarLag {
    /// Column index of the variable in the data frame.
    pub var: usize,
    /// Non-positive lag relative to the reference time.
    pub lag: isize,
}

impl VarLag {
    pub fn new(var: usize, lag: isize) -> Self {
        VarLag { var, lag }
    }
}

impl From<(usize, isize)> for VarLag {
    fn from((var, lag): (usize, isize)) -> Self {
        VarLag { var, lag }
    }
}

/// XYZ — cleaned node lists used to build an array, in row order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XYZ {
    pub x: Vec<VarLag>,
    pub y: Vec<VarLag>,
    pub z: Vec<VarLag>,
}

impl XYZ {
    /// All nodes in row order, paired with their row label (0, 1 or 2).
    pub fn labelled_nodes(&self) -> impl Iterator<Item = (usize, VarLag)> + '_ {
        self.x
            .iter()
            .map(|&n| (0, n))
            .chain(self.y.iter().map(|&n| (1, n)))
            .chain(self.z.iter().map(|&n| (2, n)))
    }

    /// Number of rows the array built from these nodes has.
    pub fn dim(&self) -> usize {
        self.x.len() + self.y.len() + self.z.len()
    }

    /// Largest `|lag|` over all nodes, `0` if there are none.
    pub fn max_abs_lag(&self) -> usize {
        self.labelled_nodes().map(|(_, n)| n.lag.unsigned_abs()).max().unwrap_or(0)
    }
}

/// CutOff — how many leading time steps to drop before building columns.
///
/// Variants
/// --------
/// - `TwoTauMax`: drop `2·tau_max` steps. Keeps sample sizes identical
///   across all tests run with the same `tau_max`, including the wider
///   windows used by lagged conditioning sets.
/// - `TauMax`: drop `tau_max` steps.
/// - `MaxLag`: drop the largest `|lag|` among the requested nodes.
/// - `MaxLagOrTauMax`: drop `max(tau_max, max |lag|)` steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CutOff {
    #[default]
    TwoTauMax,
    TauMax,
    MaxLag,
    MaxLagOrTauMax,
}

impl CutOff {
    /// Number of leading time steps excluded for the given nodes.
    pub fn max_lag(&self, tau_max: usize, nodes: &XYZ) -> usize {
        match self {
            CutOff::TwoTauMax => 2 * tau_max,
            CutOff::TauMax => tau_max,
            CutOff::MaxLag => nodes.max_abs_lag(),
            CutOff::MaxLagOrTauMax => tau_max.max(nodes.max_abs_lag()),
        }
    }
}

/// MaskType — which row groups drop samples flagged in the data mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MaskType {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

impl MaskType {
    /// Mask every row group.
    pub fn all() -> Self {
        MaskType { x: true, y: true, z: true }
    }

    pub fn is_none(&self) -> bool {
        !(self.x || self.y || self.z)
    }

    /// Whether rows with the given label (0 = X, 1 = Y, 2 = Z) are masked.
    pub fn applies_to(&self, label: usize) -> bool {
        match label {
            0 => self.x,
            1 => self.y,
            _ => self.z,
        }
    }
}

/// ArrayOptions — construction-time settings for aligned arrays.
///
/// Fields
/// ------
/// - `mask_type`: [`MaskType`]
///   Row groups whose masked samples are removed. Default: none.
/// - `cut_off`: [`CutOff`]
///   Leading-window policy. Default: [`CutOff::TwoTauMax`].
/// - `remove_overlaps`: `bool`
///   Drop Z nodes that already appear in X or Y. Default: `true`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrayOptions {
    pub mask_type: MaskType,
    pub cut_off: CutOff,
    pub remove_overlaps: bool,
}

impl ArrayOptions {
    pub fn new(mask_type: MaskType, cut_off: CutOff, remove_overlaps: bool) -> Self {
        ArrayOptions { mask_type, cut_off, remove_overlaps }
    }
}

impl Default for ArrayOptions {
    fn default() -> Self {
        ArrayOptions { mask_type: MaskType::default(), cut_off: CutOff::default(), remove_overlaps: true }
    }
}
