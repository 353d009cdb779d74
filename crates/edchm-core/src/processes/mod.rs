//! Flux formula library.
//!
//! One enum per process family. A variant carries its own parameter
//! vectors (one entry per spatial unit) and every evaluation returns a flux
//! vector clipped to what the donor store can supply and, where relevant,
//! what the receiving store can accept.
//!
//! Family signatures:
//! - infiltration: `(land_water, soil_water, soil_capacity)`
//! - actual evapotranspiration: `(pet, water, capacity)`
//! - percolation / interflow: `(soil_water, soil_capacity)`
//! - baseflow / lateral: `(ground_water, ground_capacity)`
//! - capillary rise: `(ground_water, soil_water, soil_capacity)`
//! - snowfall partition: `(precipitation, temperature)`
//! - snowmelt: `(snow_ice, temperature, time_step_h)`
//! - interception: `(precipitation, intercept_water, intercept_capacity)`

pub mod baseflow;
pub mod capirise;
pub(crate) mod curves;
pub mod evatrans;
pub mod infiltration;
pub mod interception;
pub mod interflow;
pub mod lateral;
pub mod percolation;
pub mod snow;

pub use baseflow::BaseflowMethod;
pub use capirise::CapiriseMethod;
pub use evatrans::EvatransMethod;
pub use infiltration::InfiltrationMethod;
pub use interception::InterceptionMethod;
pub use interflow::InterflowMethod;
pub use lateral::LateralMethod;
pub use percolation::PercolationMethod;
pub use snow::{SnowfallMethod, SnowmeltMethod};

use ndarray::Array1;

use crate::error::{ModelError, ModelResult};

/// Round-off below this magnitude [mm] on a depleting flux is snapped to zero.
pub const FLUX_TOLERANCE: f64 = 1e-9;

/// Accept a one-directional flux: finite, and non-negative up to round-off.
pub(crate) fn checked_depletion(
    flux: Array1<f64>,
    process: &'static str,
    timestep: usize,
) -> ModelResult<Array1<f64>> {
    for (unit, &value) in flux.iter().enumerate() {
        if !value.is_finite() || value < -FLUX_TOLERANCE {
            return Err(ModelError::InvalidFlux {
                process,
                timestep,
                unit,
                value,
            });
        }
    }
    Ok(flux.mapv_into(|v| v.max(0.0)))
}

/// Accept a signed exchange flux: finite only.
pub(crate) fn checked_exchange(
    flux: Array1<f64>,
    process: &'static str,
    timestep: usize,
) -> ModelResult<Array1<f64>> {
    match flux.iter().position(|v| !v.is_finite()) {
        Some(unit) => Err(ModelError::InvalidFlux {
            process,
            timestep,
            unit,
            value: flux[unit],
        }),
        None => Ok(flux),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn depletion_snaps_round_off() {
        let out = checked_depletion(array![1.0, -1e-12], "percolation", 0).unwrap();
        assert_eq!(out, array![1.0, 0.0]);
    }

    #[test]
    fn depletion_rejects_negative() {
        let err = checked_depletion(array![1.0, -0.5], "percolation", 7).unwrap_err();
        match err {
            ModelError::InvalidFlux {
                process,
                timestep,
                unit,
                ..
            } => {
                assert_eq!(process, "percolation");
                assert_eq!(timestep, 7);
                assert_eq!(unit, 1);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn depletion_rejects_nan() {
        assert!(checked_depletion(array![f64::NAN], "baseflow", 0).is_err());
    }

    #[test]
    fn exchange_keeps_sign() {
        let out = checked_exchange(array![-2.0, 3.0], "lateral", 0).unwrap();
        assert_eq!(out, array![-2.0, 3.0]);
        assert!(checked_exchange(array![f64::INFINITY], "lateral", 0).is_err());
    }
}
