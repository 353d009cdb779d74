/// Snow assembly: the mini structure plus a snow routine.
///
/// Precipitation is split into snow and rain by a temperature threshold and
/// the snowpack melts with a degree-hour factor, so temperature forcing is
/// required.
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::assembly::Assembly;
use crate::error::ModelResult;
use crate::fluxes::{FullOutput, StepFluxesTrajectory};
use crate::forcing::Forcing;
use crate::mini::params::column;
use crate::mini::MiniParameters;
use crate::processes::{SnowfallMethod, SnowmeltMethod};
use crate::state::Stores;
use crate::traits::HydrologicalModel;

pub const NAME: &str = "snow";

/// Mini parameters plus the snow routine, one value per spatial unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnowParameters {
    #[serde(flatten)]
    pub base: MiniParameters,
    /// Initial snowpack [mm].
    pub snow_ice_mm: Vec<f64>,
    /// All precipitation is snow at or below this temperature [°C].
    pub atmos_thr_ts: Vec<f64>,
    /// Melt factor [mm / (°C h)].
    pub snow_fac_f: Vec<f64>,
    /// Melt starts above this temperature [°C].
    pub snow_fac_tmelt: Vec<f64>,
}

impl SnowParameters {
    pub fn uniform(n_spat: usize) -> Self {
        Self {
            base: MiniParameters::uniform(n_spat),
            snow_ice_mm: vec![0.0; n_spat],
            atmos_thr_ts: vec![0.0; n_spat],
            snow_fac_f: vec![0.12; n_spat],
            snow_fac_tmelt: vec![0.0; n_spat],
        }
    }

    pub fn n_spat(&self) -> usize {
        self.base.n_spat()
    }

    pub fn assemble(&self) -> ModelResult<Assembly> {
        self.base.check_lengths()?;
        let chain = self.base.process_chain().with_snow(
            SnowfallMethod::ThresholdT {
                thresh_t: column(&self.atmos_thr_ts),
            },
            SnowmeltMethod::Factor {
                factor: column(&self.snow_fac_f),
                t_melt: column(&self.snow_fac_tmelt),
            },
        );
        let stores = self.base.stores().with_snow_ice(column(&self.snow_ice_mm));
        Assembly::new(NAME, chain, self.base.routing(), self.base.capacities()?, stores)
    }
}

/// Routed streamflow `[n_time, n_spat]`.
pub fn run(params: &SnowParameters, forcing: &Forcing) -> ModelResult<Array2<f64>> {
    params.assemble()?.run(forcing, None)
}

/// Trajectories, routed streamflow and final stores.
pub fn simulate(
    params: &SnowParameters,
    forcing: &Forcing,
    initial: Option<&Stores>,
) -> ModelResult<FullOutput<StepFluxesTrajectory, Stores>> {
    params.assemble()?.simulate(forcing, initial)
}
