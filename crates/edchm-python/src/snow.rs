use numpy::{PyArray2, PyReadonlyArray2};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use edchm_core::snow::{self, SnowParameters};
use edchm_core::StepFluxes;

use crate::convert::{forcing, required_vec, to_py_err};
use crate::mini::{mini_params, stores};

/// Mini keys plus `snow_ice_mm`, `atmos_thr_ts`, `snow_fac_f`, `snow_fac_tmelt`.
fn snow_params(params: &Bound<'_, PyDict>) -> PyResult<SnowParameters> {
    Ok(SnowParameters {
        base: mini_params(params)?,
        snow_ice_mm: required_vec(params, "snow_ice_mm")?,
        atmos_thr_ts: required_vec(params, "atmos_thr_ts")?,
        snow_fac_f: required_vec(params, "snow_fac_f")?,
        snow_fac_tmelt: required_vec(params, "snow_fac_tmelt")?,
    })
}

#[pyfunction]
#[pyo3(signature = (params, precip, pet, temp, resolution="daily"))]
fn snow_run<'py>(
    py: Python<'py>,
    params: &Bound<'py, PyDict>,
    precip: PyReadonlyArray2<'py, f64>,
    pet: PyReadonlyArray2<'py, f64>,
    temp: PyReadonlyArray2<'py, f64>,
    resolution: &str,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let p = snow_params(params)?;
    let f = forcing(&precip, &pet, Some(&temp), resolution)?;
    let q = snow::run(&p, &f).map_err(to_py_err)?;
    Ok(PyArray2::from_owned_array(py, q))
}

#[pyfunction]
#[pyo3(signature = (params, precip, pet, temp, resolution="daily", initial_state=None))]
fn snow_simulate<'py>(
    py: Python<'py>,
    params: &Bound<'py, PyDict>,
    precip: PyReadonlyArray2<'py, f64>,
    pet: PyReadonlyArray2<'py, f64>,
    temp: PyReadonlyArray2<'py, f64>,
    resolution: &str,
    initial_state: Option<PyReadonlyArray2<'py, f64>>,
) -> PyResult<Bound<'py, PyDict>> {
    let p = snow_params(params)?;
    let f = forcing(&precip, &pet, Some(&temp), resolution)?;
    let initial = stores(initial_state.as_ref())?;
    let out = snow::simulate(&p, &f, initial.as_ref()).map_err(to_py_err)?;

    let dict = trajectory_to_dict!(py, out.fluxes, StepFluxes);
    dict.set_item("streamflow", PyArray2::from_owned_array(py, out.streamflow))?;
    dict.set_item("final_state", PyArray2::from_owned_array(py, out.final_state.to_matrix()))?;
    Ok(dict)
}

pub fn register(parent: &Bound<'_, PyModule>) -> PyResult<()> {
    let py = parent.py();
    let m = PyModule::new(py, "snow")?;
    m.add_function(wrap_pyfunction!(snow_run, &m)?)?;
    m.add_function(wrap_pyfunction!(snow_simulate, &m)?)?;
    parent.add_submodule(&m)?;
    Ok(())
}
