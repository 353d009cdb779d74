/// Up-front validation helpers for per-unit parameter vectors.
///
/// Every check names the offending entry as `name[unit]` so a failing
/// configuration points at the exact value.
use ndarray::Array1;

use crate::error::{ModelError, ModelResult};

pub(crate) fn check_len(name: &str, values: &Array1<f64>, n_spat: usize) -> ModelResult<()> {
    if values.len() != n_spat {
        return Err(ModelError::dimension_mismatch(name, n_spat, values.len()));
    }
    Ok(())
}

fn check_each(
    name: &str,
    values: &Array1<f64>,
    reason: &'static str,
    ok: impl Fn(f64) -> bool,
) -> ModelResult<()> {
    match values.iter().position(|&v| !ok(v)) {
        Some(j) => Err(ModelError::invalid_parameter(
            format!("{name}[{j}]"),
            values[j],
            reason,
        )),
        None => Ok(()),
    }
}

/// Finite and strictly positive.
pub(crate) fn check_positive(name: &str, values: &Array1<f64>) -> ModelResult<()> {
    check_each(name, values, "must be finite and > 0", |v| v.is_finite() && v > 0.0)
}

pub(crate) fn check_non_negative(name: &str, values: &Array1<f64>) -> ModelResult<()> {
    check_each(name, values, "must be finite and >= 0", |v| v.is_finite() && v >= 0.0)
}

pub(crate) fn check_finite(name: &str, values: &Array1<f64>) -> ModelResult<()> {
    check_each(name, values, "must be finite", f64::is_finite)
}

/// Closed interval `[0, 1]`.
pub(crate) fn check_fraction(name: &str, values: &Array1<f64>) -> ModelResult<()> {
    check_each(name, values, "must lie in [0, 1]", |v| (0.0..=1.0).contains(&v))
}

/// Half-open interval `[0, 1)`; used for storage thresholds that divide by `1 - thresh`.
pub(crate) fn check_threshold(name: &str, values: &Array1<f64>) -> ModelResult<()> {
    check_each(name, values, "must lie in [0, 1)", |v| (0.0..1.0).contains(&v))
}

/// Length plus a domain check in one call, the common case for flux parameters.
pub(crate) fn check_param(
    name: &str,
    values: &Array1<f64>,
    n_spat: usize,
    domain: fn(&str, &Array1<f64>) -> ModelResult<()>,
) -> ModelResult<()> {
    check_len(name, values, n_spat)?;
    domain(name, values)
}

/// A single scalar that must be finite and > 0.
pub(crate) fn check_positive_value(name: &str, value: f64) -> ModelResult<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ModelError::invalid_parameter(name, value, "must be finite and > 0"));
    }
    Ok(())
}
