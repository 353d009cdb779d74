/// GR4J per-timestep fluxes [mm], one value per spatial unit.
use edchm_macros::Trajectory;
use ndarray::Array1;

#[derive(Debug, Clone, PartialEq, Trajectory)]
#[trajectory(name = "Gr4jTrajectory")]
pub struct Gr4jFluxes {
    pub precipitation: Array1<f64>,
    pub potential_evatrans: Array1<f64>,
    /// Pn
    pub net_rainfall: Array1<f64>,
    /// En
    pub net_evatrans: Array1<f64>,
    /// Ps
    pub storage_infiltration: Array1<f64>,
    /// Es
    pub storage_evatrans: Array1<f64>,
    pub actual_evatrans: Array1<f64>,
    pub percolation: Array1<f64>,
    /// Pr
    pub effective_rainfall: Array1<f64>,
    pub q9: Array1<f64>,
    pub q1: Array1<f64>,
    /// F, signed
    pub exchange: Array1<f64>,
    /// Qr
    pub routing_flow: Array1<f64>,
    /// Qd
    pub direct_flow: Array1<f64>,
    pub streamflow: Array1<f64>,
    pub production_store: Array1<f64>,
    pub routing_store: Array1<f64>,
}

crate::traits::impl_trajectory_ops!(Gr4jFluxes, Gr4jTrajectory);
