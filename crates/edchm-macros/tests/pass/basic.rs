use edchm_macros::Trajectory;
use ndarray::{array, Array1};

#[derive(Debug, Clone, Trajectory)]
pub struct TestFluxes {
    pub evatrans: Array1<f64>,
    pub runoff: Array1<f64>,
    pub baseflow: ndarray::Array1<f64>,
}

fn main() {
    let f = TestFluxes {
        evatrans: array![1.0, 2.0],
        runoff: array![3.0, 4.0],
        baseflow: array![5.0, 6.0],
    };
    let mut traj = TestFluxesTrajectory::zeros(3, 2);
    traj.record(1, &f);
    assert_eq!(traj.n_time(), 3);
    assert_eq!(traj.n_spat(), 2);
    assert!(!traj.is_empty());
    assert_eq!(traj.runoff[[1, 1]], 4.0);
    assert_eq!(traj.runoff[[0, 1]], 0.0);
    assert_eq!(traj.field("baseflow").map(|m| m[[1, 0]]), Some(5.0));
    assert!(traj.field("streamflow").is_none());
    assert_eq!(TestFluxes::field_names(), &["evatrans", "runoff", "baseflow"]);
}
