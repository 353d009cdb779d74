use numpy::{PyArray2, PyReadonlyArray2};
use pyo3::prelude::*;
use pyo3::types::PyDict;

use edchm_core::gr4j::{self, Gr4jFluxes, Gr4jParameters, Gr4jState};

use crate::convert::{forcing, matrix, to_py_err};

/// Parameters from a `[4, n_spat]` matrix with rows X1..X4.
fn gr4j_params(params: &PyReadonlyArray2<'_, f64>) -> PyResult<Gr4jParameters> {
    let rows: Vec<Vec<f64>> = params.as_array().rows().into_iter().map(|r| r.to_vec()).collect();
    let p = Gr4jParameters::from_rows(&rows).map_err(to_py_err)?;
    p.validate().map_err(to_py_err)?;
    Ok(p)
}

fn gr4j_state(params: &Gr4jParameters, state: Option<&PyReadonlyArray2<'_, f64>>) -> PyResult<Option<Gr4jState>> {
    state
        .map(|s| Gr4jState::from_matrix(params, &matrix(s)))
        .transpose()
        .map_err(to_py_err)
}

#[pyfunction]
#[pyo3(signature = (params, precip, pet, resolution="daily"))]
fn gr4j_run<'py>(
    py: Python<'py>,
    params: PyReadonlyArray2<'py, f64>,
    precip: PyReadonlyArray2<'py, f64>,
    pet: PyReadonlyArray2<'py, f64>,
    resolution: &str,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let p = gr4j_params(&params)?;
    let f = forcing(&precip, &pet, None, resolution)?;
    let q = gr4j::run(&p, &f).map_err(to_py_err)?;
    Ok(PyArray2::from_owned_array(py, q))
}

#[pyfunction]
#[pyo3(signature = (params, precip, pet, resolution="daily", initial_state=None))]
fn gr4j_simulate<'py>(
    py: Python<'py>,
    params: PyReadonlyArray2<'py, f64>,
    precip: PyReadonlyArray2<'py, f64>,
    pet: PyReadonlyArray2<'py, f64>,
    resolution: &str,
    initial_state: Option<PyReadonlyArray2<'py, f64>>,
) -> PyResult<Bound<'py, PyDict>> {
    let p = gr4j_params(&params)?;
    let f = forcing(&precip, &pet, None, resolution)?;
    let initial = gr4j_state(&p, initial_state.as_ref())?;
    let out = gr4j::simulate(&p, &f, initial.as_ref()).map_err(to_py_err)?;

    let dict = trajectory_to_dict!(py, out.fluxes, Gr4jFluxes);
    dict.set_item("final_state", PyArray2::from_owned_array(py, out.final_state.to_matrix()))?;
    Ok(dict)
}

pub fn register(parent: &Bound<'_, PyModule>) -> PyResult<()> {
    let py = parent.py();
    let m = PyModule::new(py, "gr4j")?;
    m.add_function(wrap_pyfunction!(gr4j_run, &m)?)?;
    m.add_function(wrap_pyfunction!(gr4j_simulate, &m)?)?;
    parent.add_submodule(&m)?;
    Ok(())
}
