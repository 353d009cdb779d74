use edchm_core::{Forcing, ModelError, Resolution};
use ndarray::Array2;
use numpy::{PyReadonlyArray1, PyReadonlyArray2};
use pyo3::exceptions::{PyIOError, PyKeyError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;

/// Map a core error onto the matching Python exception.
pub fn to_py_err(err: ModelError) -> PyErr {
    match err {
        ModelError::Io { .. } => PyIOError::new_err(err.to_string()),
        _ => PyValueError::new_err(err.to_string()),
    }
}

/// Validate that a numpy array is C-contiguous and return its slice.
pub fn contiguous_slice<'py>(arr: &'py PyReadonlyArray1<'py, f64>) -> PyResult<&'py [f64]> {
    arr.as_slice()
        .map_err(|_| PyValueError::new_err("array must be C-contiguous"))
}

/// Copy a 2-D numpy array (any layout) into an owned matrix.
pub fn matrix(arr: &PyReadonlyArray2<'_, f64>) -> Array2<f64> {
    arr.as_array().to_owned()
}

/// Build validated forcing from `[n_time, n_spat]` numpy matrices.
pub fn forcing(
    precip: &PyReadonlyArray2<'_, f64>,
    pet: &PyReadonlyArray2<'_, f64>,
    temp: Option<&PyReadonlyArray2<'_, f64>>,
    resolution: &str,
) -> PyResult<Forcing> {
    let resolution: Resolution = resolution.parse().map_err(to_py_err)?;
    Forcing::new(matrix(precip), matrix(pet), temp.map(matrix), resolution).map_err(to_py_err)
}

/// Fetch a required per-unit parameter vector from a dict.
pub fn required_vec(params: &Bound<'_, PyDict>, name: &str) -> PyResult<Vec<f64>> {
    match params.get_item(name)? {
        Some(value) => value
            .extract::<Vec<f64>>()
            .map_err(|_| PyValueError::new_err(format!("{name} must be a sequence of floats"))),
        None => Err(PyKeyError::new_err(format!("missing parameter '{name}'"))),
    }
}
