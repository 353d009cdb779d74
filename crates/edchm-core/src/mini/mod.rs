/// Mini assembly: the smallest complete structure.
///
/// Six processes: UBC evapotranspiration, UBC infiltration, Arno
/// percolation, GR4J-fix baseflow, a Kelly IUH for land runoff and a GR4J1
/// IUH for baseflow.
pub mod params;

pub use params::MiniParameters;

use ndarray::Array2;

use crate::assembly::{Assembly, Channel, Routing};
use crate::error::ModelResult;
use crate::fluxes::{FullOutput, StepFluxesTrajectory};
use crate::forcing::Forcing;
use crate::integrator::ProcessChain;
use crate::iuh::IuhMethod;
use crate::processes::{BaseflowMethod, EvatransMethod, InfiltrationMethod, PercolationMethod};
use crate::state::{Capacities, Stores};
use crate::traits::HydrologicalModel;
use params::column;

pub const NAME: &str = "mini";

impl MiniParameters {
    pub(crate) fn process_chain(&self) -> ProcessChain {
        ProcessChain::new(
            EvatransMethod::Ubc {
                gamma: column(&self.evatrans_ubc_gamma),
            },
            InfiltrationMethod::Ubc {
                impermeable_frac: column(&self.land_impermeable_frac),
                p0agen: column(&self.infilt_ubc_p0agen),
            },
            PercolationMethod::Arno {
                potential: column(&self.soil_potential_percola_mm),
                thresh: column(&self.percola_arn_thresh),
                k: column(&self.percola_arn_k),
            },
            BaseflowMethod::Gr4jFix {
                gamma: column(&self.baseflow_grf_gamma),
            },
        )
    }

    pub(crate) fn routing(&self) -> Routing {
        Routing::new()
            .with_channel(
                Channel::Runoff,
                IuhMethod::Kelly {
                    response_time: column(&self.land_response_time_ts),
                    k: column(&self.land_kel_k),
                },
            )
            .with_channel(
                Channel::Baseflow,
                IuhMethod::Gr4j1 {
                    response_time: column(&self.ground_response_time_ts),
                },
            )
    }

    pub(crate) fn capacities(&self) -> ModelResult<Capacities> {
        Capacities::new(column(&self.soil_capacity_mm), column(&self.ground_capacity_mm))
    }

    pub(crate) fn stores(&self) -> Stores {
        Stores::new(column(&self.soil_water_mm), column(&self.ground_water_mm))
    }

    /// Wire the parameters into a validated [`Assembly`].
    pub fn assemble(&self) -> ModelResult<Assembly> {
        self.check_lengths()?;
        Assembly::new(
            NAME,
            self.process_chain(),
            self.routing(),
            self.capacities()?,
            self.stores(),
        )
    }
}

/// Routed streamflow `[n_time, n_spat]`.
pub fn run(params: &MiniParameters, forcing: &Forcing) -> ModelResult<Array2<f64>> {
    params.assemble()?.run(forcing, None)
}

/// Trajectories, routed streamflow and final stores.
pub fn simulate(
    params: &MiniParameters,
    forcing: &Forcing,
    initial: Option<&Stores>,
) -> ModelResult<FullOutput<StepFluxesTrajectory, Stores>> {
    params.assemble()?.simulate(forcing, initial)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::forcing::Resolution;

    fn forcing(n_time: usize, n_spat: usize) -> Forcing {
        let p = Array2::from_shape_fn((n_time, n_spat), |(t, _)| match t % 7 {
            0 => 25.0,
            3 => 8.0,
            _ => 0.0,
        });
        let pet = Array2::from_elem((n_time, n_spat), 2.0);
        Forcing::new(p, pet, None, Resolution::Daily).unwrap()
    }

    #[test]
    fn run_produces_finite_non_negative_streamflow() {
        let q = run(&MiniParameters::uniform(2), &forcing(60, 2)).unwrap();
        assert_eq!(q.dim(), (60, 2));
        assert!(q.iter().all(|v| v.is_finite() && *v >= 0.0));
        assert!(q.sum() > 0.0);
    }

    #[test]
    fn stores_stay_within_capacity() {
        let params = MiniParameters::uniform(1);
        let out = simulate(&params, &forcing(90, 1), None).unwrap();
        assert!(out.fluxes.soil_water.iter().all(|&w| (0.0..=200.0).contains(&w)));
        assert!(out.fluxes.ground_water.iter().all(|&w| (0.0..=100.0).contains(&w)));
    }

    #[test]
    fn identical_units_give_identical_columns() {
        let q = run(&MiniParameters::uniform(3), &forcing(30, 3)).unwrap();
        for t in 0..30 {
            assert_eq!(q[[t, 0]], q[[t, 2]]);
        }
    }

    #[test]
    fn zero_response_time_rejected_before_running() {
        let mut params = MiniParameters::uniform(2);
        params.land_response_time_ts[1] = 0.0;
        let err = run(&params, &forcing(5, 2)).unwrap_err();
        assert!(matches!(err, ModelError::InvalidParameter { .. }));
    }

    #[test]
    fn initial_soil_above_capacity_rejected() {
        let mut params = MiniParameters::uniform(1);
        params.soil_water_mm[0] = 250.0;
        assert!(params.assemble().is_err());
    }
}
