//! utils — conversion helpers for the PyO3 binding layer.
//!
//! Every function here turns loosely typed Python arguments (numpy arrays,
//! pandas frames, lists, dicts, option strings) into the strongly typed
//! values used by the core modules, reporting bad input as `ValueError` or
//! `TypeError`.
#[cfg(feature = "python-bindings")]
use ndarray::Array2;

#[cfg(feature = "python-bindings")]
use numpy::PyReadonlyArray2;

#[cfg(feature = "python-bindings")]
use pyo3::{
    exceptions::{PyTypeError, PyValueError},
    prelude::*,
    types::{PyAny, PyDict},
};

#[cfg(feature = "python-bindings")]
use crate::{
    data::{ArrayOptions, CutOff, MaskType, VarLag},
    independence_tests::{
        Alternative, ExpertKnowledge, NoiseSource, ShuffleOptions, Significance,
    },
};

/// Extract a 2-D `f64` matrix from a numpy array, a pandas DataFrame, or a
/// rectangular sequence of sequences.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_matrix<'py>(raw: &Bound<'py, PyAny>) -> PyResult<Array2<f64>> {
    if let Ok(arr) = raw.extract::<PyReadonlyArray2<f64>>() {
        return Ok(arr.as_array().to_owned());
    }

    if let Ok(obj) = raw.call_method("to_numpy", (), None) {
        if let Ok(arr) = obj.extract::<PyReadonlyArray2<f64>>() {
            return Ok(arr.as_array().to_owned());
        }
    }

    let rows: Vec<Vec<f64>> = raw.extract().map_err(|_| {
        PyTypeError::new_err(
            "expected a 2-D numpy.ndarray, pandas.DataFrame, or sequence of float64 rows",
        )
    })?;
    let n_cols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|r| r.len() != n_cols) {
        return Err(PyValueError::new_err("all rows must have the same length"));
    }
    let n_rows = rows.len();
    Array2::from_shape_vec((n_rows, n_cols), rows.into_iter().flatten().collect())
        .map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Extract a 2-D boolean mask; `true` marks a sample as masked.
#[cfg(feature = "python-bindings")]
pub fn extract_mask<'py>(raw: &Bound<'py, PyAny>) -> PyResult<Array2<bool>> {
    let arr = raw
        .extract::<PyReadonlyArray2<bool>>()
        .map_err(|_| PyTypeError::new_err("mask must be a 2-D numpy.ndarray of bool"))?;
    Ok(arr.as_array().to_owned())
}

/// Extract a node list `[(var, lag), ...]`; `None` yields an empty list.
#[cfg(feature = "python-bindings")]
pub fn extract_nodes<'py>(raw: Option<&Bound<'py, PyAny>>) -> PyResult<Vec<VarLag>> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    if raw.is_none() {
        return Ok(Vec::new());
    }
    let pairs: Vec<(usize, isize)> = raw.extract().map_err(|_| {
        PyTypeError::new_err("nodes must be a list of (variable, lag) tuples of integers")
    })?;
    Ok(pairs.into_iter().map(VarLag::from).collect())
}

/// Extract expert knowledge from a marker string or a
/// `dict[int, list[str | tuple[int, int]]]`.
#[cfg(feature = "python-bindings")]
pub fn extract_expert_knowledge<'py>(
    raw: Option<&Bound<'py, PyAny>>,
) -> PyResult<ExpertKnowledge> {
    let Some(raw) = raw else {
        return Ok(ExpertKnowledge::default());
    };
    if let Ok(marker) = raw.extract::<String>() {
        return Ok(ExpertKnowledge::from_marker(&marker)?);
    }

    let dict = raw.downcast::<PyDict>().map_err(|_| {
        PyTypeError::new_err("expert_knowledge must be a marker string or a dict")
    })?;
    let mut entries = Vec::with_capacity(dict.len());
    for (key, value) in dict.iter() {
        let var: usize = key
            .extract()
            .map_err(|_| PyTypeError::new_err("expert_knowledge keys must be variable indices"))?;
        let items: Vec<Bound<'py, PyAny>> = value.extract().map_err(|_| {
            PyTypeError::new_err(format!("expert_knowledge[{var}] must be a list"))
        })?;
        let mut sources = Vec::with_capacity(items.len());
        for item in items {
            let source = if let Ok(marker) = item.extract::<String>() {
                NoiseSource::from_marker(&marker)?
            } else {
                let driver: (usize, isize) = item.extract().map_err(|_| {
                    PyTypeError::new_err(format!(
                        "expert_knowledge[{var}] entries must be a marker or a (variable, lag) tuple"
                    ))
                })?;
                NoiseSource::ParentDependent(VarLag::from(driver))
            };
            sources.push(source);
        }
        entries.push((var, sources));
    }
    Ok(ExpertKnowledge::from_entries(entries)?)
}

/// Build the significance setting from its Python keyword arguments.
#[cfg(feature = "python-bindings")]
pub fn extract_significance(
    significance: Option<&str>, sig_samples: Option<usize>, sig_blocklength: Option<usize>,
    seed: Option<u64>,
) -> PyResult<Significance> {
    match significance.unwrap_or("analytic").to_lowercase().as_str() {
        "analytic" => Ok(Significance::Analytic),
        "shuffle_test" | "shuffle" => {
            let defaults = ShuffleOptions::default();
            Ok(Significance::Shuffle(ShuffleOptions {
                sig_samples: sig_samples.unwrap_or(defaults.sig_samples),
                sig_blocklength,
                seed: seed.unwrap_or(defaults.seed),
            }))
        }
        other => Err(PyValueError::new_err(format!(
            "invalid significance {other:?} (expected 'analytic' or 'shuffle_test')"
        ))),
    }
}

#[cfg(feature = "python-bindings")]
pub fn extract_alternative(alternative: Option<&str>) -> PyResult<Alternative> {
    match alternative.unwrap_or("two-sided").to_lowercase().as_str() {
        "two-sided" | "two_sided" => Ok(Alternative::TwoSided),
        "greater" => Ok(Alternative::Greater),
        "less" => Ok(Alternative::Less),
        other => Err(PyValueError::new_err(format!(
            "invalid alternative {other:?} (expected 'two-sided', 'greater', or 'less')"
        ))),
    }
}

/// Build array options from a mask-type string (any of `x`, `y`, `z`) and a
/// cut-off name.
#[cfg(feature = "python-bindings")]
pub fn extract_array_options(
    mask_type: Option<&str>, cut_off: Option<&str>, remove_overlaps: Option<bool>,
) -> PyResult<ArrayOptions> {
    let mut mask = MaskType::default();
    for c in mask_type.unwrap_or("").chars() {
        match c {
            'x' => mask.x = true,
            'y' => mask.y = true,
            'z' => mask.z = true,
            other => {
                return Err(PyValueError::new_err(format!(
                    "invalid mask_type character {other:?} (expected any of 'x', 'y', 'z')"
                )));
            }
        }
    }
    let cut_off = match cut_off.unwrap_or("2xtau_max") {
        "2xtau_max" => CutOff::TwoTauMax,
        "tau_max" => CutOff::TauMax,
        "max_lag" => CutOff::MaxLag,
        "max_lag_or_tau_max" => CutOff::MaxLagOrTauMax,
        other => {
            return Err(PyValueError::new_err(format!(
                "invalid cut_off {other:?} (expected '2xtau_max', 'tau_max', 'max_lag', or \
                 'max_lag_or_tau_max')"
            )));
        }
    };
    Ok(ArrayOptions::new(mask, cut_off, remove_overlaps.unwrap_or(true)))
}
