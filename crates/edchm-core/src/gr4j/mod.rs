/// GR4J — Génie Rural à 4 paramètres Journalier.
///
/// A lumped conceptual rainfall-runoff model with 4 parameters, 2 stores,
/// and unit hydrograph routing, assembled from the shared GR4J flux
/// formulas and S-curve kernels. Routing runs inside the time loop, so the
/// state carries the unit hydrograph buffers and a final state resumes a
/// run exactly.
pub mod constants;
pub mod fluxes;
pub mod params;
pub mod run;
pub mod state;

pub use fluxes::{Gr4jFluxes, Gr4jTrajectory};
pub use params::Gr4jParameters;
pub use run::{Gr4j, Gr4jKernels};
pub use state::Gr4jState;

use ndarray::Array2;

use crate::error::ModelResult;
use crate::fluxes::FullOutput;
use crate::forcing::Forcing;
use crate::traits::HydrologicalModel;

/// Routed streamflow `[n_time, n_spat]`.
pub fn run(params: &Gr4jParameters, forcing: &Forcing) -> ModelResult<Array2<f64>> {
    Gr4j::new(params.clone())?.run(forcing, None)
}

/// Trajectories, streamflow and final state.
pub fn simulate(
    params: &Gr4jParameters,
    forcing: &Forcing,
    initial: Option<&Gr4jState>,
) -> ModelResult<FullOutput<Gr4jTrajectory, Gr4jState>> {
    Gr4j::new(params.clone())?.simulate(forcing, initial)
}
