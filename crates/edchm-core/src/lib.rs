/// edchm — lumped conceptual hydrological models in Rust.
///
/// A water-balance integrator over interchangeable flux methods, instantaneous
/// unit hydrograph synthesis and convolution routing, with three ready-made
/// assemblies (`mini`, `snow`, `gr4j`) built from the same pieces.
pub(crate) mod checks;
pub mod assembly;
pub mod config;
pub mod error;
pub mod fluxes;
pub mod forcing;
pub mod gr4j;
pub mod integrator;
pub mod iuh;
pub mod mini;
pub mod processes;
pub mod routing;
pub mod snow;
pub mod state;
pub mod traits;
pub mod vecmath;

pub use assembly::{Assembly, Channel, Routing};
pub use config::{ModelConfig, RunSummary, SimulationConfig};
pub use error::{ModelError, ModelResult};
pub use fluxes::{FullOutput, StepFluxes, StepFluxesTrajectory};
pub use forcing::{Forcing, ForcingRow, Resolution};
pub use gr4j::{Gr4j, Gr4jParameters, Gr4jState};
pub use integrator::ProcessChain;
pub use iuh::{IuhMethod, Kernel};
pub use mini::MiniParameters;
pub use snow::SnowParameters;
pub use state::{Capacities, Stores};
pub use traits::{HydrologicalModel, TrajectoryOps};
