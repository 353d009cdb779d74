use ndarray::array;
use numpy::{PyArray1, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use edchm_core::iuh::{IuhMethod, Kernel};
use edchm_core::routing;

use crate::convert::{contiguous_slice, to_py_err};

/// `shape` is Kelly's `k` or Nash's `n`; the other methods ignore it.
fn method(name: &str, response_time: f64, shape: Option<f64>) -> PyResult<IuhMethod> {
    let response_time = array![response_time];
    let shape_param = |what: &str| {
        shape
            .map(|v| array![v])
            .ok_or_else(|| PyValueError::new_err(format!("{name} needs `shape` ({what})")))
    };
    Ok(match name.to_ascii_lowercase().as_str() {
        "gr4j1" => IuhMethod::Gr4j1 { response_time },
        "gr4j2" => IuhMethod::Gr4j2 { response_time },
        "kelly" => IuhMethod::Kelly { response_time, k: shape_param("k")? },
        "nash" => IuhMethod::Nash { response_time, n: shape_param("n")? },
        "clark" => IuhMethod::Clark { response_time },
        "triangular" => IuhMethod::Triangular { response_time },
        other => return Err(PyValueError::new_err(format!("unknown IUH method '{other}'"))),
    })
}

fn kernel(weights: &PyReadonlyArray1<'_, f64>) -> PyResult<Kernel> {
    Kernel::new(contiguous_slice(weights)?.to_vec()).map_err(to_py_err)
}

#[pyfunction]
#[pyo3(signature = (method_name, response_time, shape=None))]
fn iuh_kernel<'py>(
    py: Python<'py>,
    method_name: &str,
    response_time: f64,
    shape: Option<f64>,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let m = method(method_name, response_time, shape)?;
    m.validate(1).map_err(to_py_err)?;
    let k = m.kernel(0).map_err(to_py_err)?;
    Ok(PyArray1::from_slice(py, k.weights()))
}

#[pyfunction]
fn convolve<'py>(
    py: Python<'py>,
    input: PyReadonlyArray1<'py, f64>,
    weights: PyReadonlyArray1<'py, f64>,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    let k = kernel(&weights)?;
    let out = routing::convolve(contiguous_slice(&input)?, &k);
    Ok(PyArray1::from_vec(py, out))
}

#[pyfunction]
fn route_channels<'py>(
    py: Python<'py>,
    inputs: Vec<PyReadonlyArray1<'py, f64>>,
    kernels: Vec<PyReadonlyArray1<'py, f64>>,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    if inputs.len() != kernels.len() {
        return Err(PyValueError::new_err(format!(
            "got {} inputs but {} kernels",
            inputs.len(),
            kernels.len()
        )));
    }
    let kernels = kernels.iter().map(kernel).collect::<PyResult<Vec<_>>>()?;
    let slices = inputs.iter().map(|a| contiguous_slice(a)).collect::<PyResult<Vec<_>>>()?;
    let channels: Vec<(&[f64], &Kernel)> = slices.into_iter().zip(&kernels).collect();
    let out = routing::route_channels(&channels).map_err(to_py_err)?;
    Ok(PyArray1::from_vec(py, out))
}

pub fn register(parent: &Bound<'_, PyModule>) -> PyResult<()> {
    let py = parent.py();
    let m = PyModule::new(py, "iuh")?;
    m.add_function(wrap_pyfunction!(iuh_kernel, &m)?)?;
    m.add_function(wrap_pyfunction!(convolve, &m)?)?;
    m.add_function(wrap_pyfunction!(route_channels, &m)?)?;
    parent.add_submodule(&m)?;
    Ok(())
}
