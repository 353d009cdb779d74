use edchm_macros::Trajectory;
use ndarray::{array, Array1};

#[derive(Debug, Clone, Trajectory)]
#[trajectory(name = "SnowHistory")]
pub struct SnowFluxes {
    pub snow_melt: Array1<f64>,
    pub snow_ice: Array1<f64>,
}

fn main() {
    let f = SnowFluxes {
        snow_melt: array![1.5],
        snow_ice: array![50.0],
    };
    let mut history = SnowHistory::zeros(4, 1);
    history.record(3, &f);
    assert_eq!(history.n_time(), 4);
    assert_eq!(history.snow_ice[[3, 0]], 50.0);
    assert_eq!(SnowFluxes::field_names(), &["snow_melt", "snow_ice"]);
}
