/// Per-timestep outputs of the generic water-balance integrator.
use edchm_macros::Trajectory;
use ndarray::{Array1, Array2};

/// Every flux [mm] moved in one timestep, plus the stores after the step.
///
/// Fields hold one value per spatial unit. `lateral` is signed: positive
/// adds water to the groundwater store.
#[derive(Debug, Clone, PartialEq, Trajectory)]
pub struct StepFluxes {
    pub precipitation: Array1<f64>,
    pub rainfall: Array1<f64>,
    pub snowfall: Array1<f64>,
    pub snow_melt: Array1<f64>,
    pub intercepted: Array1<f64>,
    pub intercept_evatrans: Array1<f64>,
    pub evatrans: Array1<f64>,
    pub infiltration: Array1<f64>,
    pub runoff: Array1<f64>,
    pub interflow: Array1<f64>,
    pub percolation: Array1<f64>,
    pub capirise: Array1<f64>,
    pub lateral: Array1<f64>,
    pub overflow: Array1<f64>,
    pub baseflow: Array1<f64>,
    pub snow_ice: Array1<f64>,
    pub intercept_water: Array1<f64>,
    pub soil_water: Array1<f64>,
    pub ground_water: Array1<f64>,
}

impl StepFluxes {
    /// Total evapotranspiration, interception included.
    pub fn total_evatrans(&self) -> Array1<f64> {
        &self.evatrans + &self.intercept_evatrans
    }
}

/// Result of a full simulation: trajectories, routed streamflow and the
/// state to resume from.
#[derive(Debug, Clone)]
pub struct FullOutput<T, S> {
    pub fluxes: T,
    /// Routed streamflow [mm], `[n_time, n_spat]`.
    pub streamflow: Array2<f64>,
    pub final_state: S,
}

impl<T, S> FullOutput<T, S> {
    pub fn n_time(&self) -> usize {
        self.streamflow.nrows()
    }

    pub fn n_spat(&self) -> usize {
        self.streamflow.ncols()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn fluxes(v: f64) -> StepFluxes {
        let a = array![v, 2.0 * v];
        StepFluxes {
            precipitation: a.clone(),
            rainfall: a.clone(),
            snowfall: a.clone(),
            snow_melt: a.clone(),
            intercepted: a.clone(),
            intercept_evatrans: a.clone(),
            evatrans: a.clone(),
            infiltration: a.clone(),
            runoff: a.clone(),
            interflow: a.clone(),
            percolation: a.clone(),
            capirise: a.clone(),
            lateral: a.clone(),
            overflow: a.clone(),
            baseflow: a.clone(),
            snow_ice: a.clone(),
            intercept_water: a.clone(),
            soil_water: a.clone(),
            ground_water: a,
        }
    }

    #[test]
    fn trajectory_records_rows() {
        let mut traj = StepFluxesTrajectory::zeros(3, 2);
        traj.record(0, &fluxes(1.0));
        traj.record(2, &fluxes(3.0));
        assert_eq!(traj.n_time(), 3);
        assert_eq!(traj.soil_water.column(1).to_vec(), vec![2.0, 0.0, 6.0]);
        assert!(traj.field("baseflow").is_some());
    }

    #[test]
    fn field_names_cover_all_fluxes() {
        let names = StepFluxes::field_names();
        assert_eq!(names.len(), 19);
        assert!(names.contains(&"overflow"));
    }

    #[test]
    fn total_evatrans_adds_interception() {
        let f = fluxes(1.5);
        assert_eq!(f.total_evatrans(), array![3.0, 6.0]);
    }
}
