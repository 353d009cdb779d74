use numpy::{PyArray2, PyReadonlyArray2};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use edchm_core::mini::{self, MiniParameters};
use edchm_core::{StepFluxes, Stores};

use crate::convert::{forcing, matrix, to_py_err};

pub(crate) fn mini_params(params: &Bound<'_, PyDict>) -> PyResult<MiniParameters> {
    Ok(params_from_dict!(params, MiniParameters {
        ground_capacity_mm, ground_water_mm, land_impermeable_frac,
        soil_capacity_mm, soil_potential_percola_mm, soil_water_mm,
        land_response_time_ts, ground_response_time_ts, baseflow_grf_gamma,
        land_kel_k, evatrans_ubc_gamma, infilt_ubc_p0agen, percola_arn_k,
        percola_arn_thresh,
    }))
}

/// Stores from a `[4, n_spat]` matrix: soil, ground, snow, interception.
pub(crate) fn stores(state: Option<&PyReadonlyArray2<'_, f64>>) -> PyResult<Option<Stores>> {
    state
        .map(|s| Stores::from_matrix(&matrix(s)).map_err(to_py_err))
        .transpose()
}

#[pyfunction]
#[pyo3(signature = (params, precip, pet, resolution="daily"))]
fn mini_run<'py>(
    py: Python<'py>,
    params: &Bound<'py, PyDict>,
    precip: PyReadonlyArray2<'py, f64>,
    pet: PyReadonlyArray2<'py, f64>,
    resolution: &str,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let p = mini_params(params)?;
    let f = forcing(&precip, &pet, None, resolution)?;
    let q = mini::run(&p, &f).map_err(to_py_err)?;
    Ok(PyArray2::from_owned_array(py, q))
}

#[pyfunction]
#[pyo3(signature = (params, precip, pet, resolution="daily", initial_state=None))]
fn mini_simulate<'py>(
    py: Python<'py>,
    params: &Bound<'py, PyDict>,
    precip: PyReadonlyArray2<'py, f64>,
    pet: PyReadonlyArray2<'py, f64>,
    resolution: &str,
    initial_state: Option<PyReadonlyArray2<'py, f64>>,
) -> PyResult<Bound<'py, PyDict>> {
    let p = mini_params(params)?;
    let f = forcing(&precip, &pet, None, resolution)?;
    let initial = stores(initial_state.as_ref())?;
    let out = mini::simulate(&p, &f, initial.as_ref()).map_err(to_py_err)?;

    let dict = trajectory_to_dict!(py, out.fluxes, StepFluxes);
    dict.set_item("streamflow", PyArray2::from_owned_array(py, out.streamflow))?;
    dict.set_item("final_state", PyArray2::from_owned_array(py, out.final_state.to_matrix()))?;
    Ok(dict)
}

pub fn register(parent: &Bound<'_, PyModule>) -> PyResult<()> {
    let py = parent.py();
    let m = PyModule::new(py, "mini")?;
    m.add_function(wrap_pyfunction!(mini_run, &m)?)?;
    m.add_function(wrap_pyfunction!(mini_simulate, &m)?)?;
    parent.add_submodule(&m)?;
    Ok(())
}
