/// Parameters of the mini assembly, one value per spatial unit.
///
/// Stores and capacities:
/// - `soil_capacity_mm`, `soil_water_mm`: soil store size and initial content
/// - `ground_capacity_mm`, `ground_water_mm`: groundwater store size and initial content
///
/// Flux parameters:
/// - `evatrans_ubc_gamma`: UBC evapotranspiration shape
/// - `land_impermeable_frac`, `infilt_ubc_p0agen`: UBC infiltration
/// - `soil_potential_percola_mm`, `percola_arn_thresh`, `percola_arn_k`: Arno percolation
/// - `baseflow_grf_gamma`: GR4J-fix baseflow exponent
///
/// Routing:
/// - `land_response_time_ts`, `land_kel_k`: Kelly IUH for runoff
/// - `ground_response_time_ts`: GR4J1 IUH for baseflow
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::checks::check_len;
use crate::error::ModelResult;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiniParameters {
    pub ground_capacity_mm: Vec<f64>,
    pub ground_water_mm: Vec<f64>,
    pub land_impermeable_frac: Vec<f64>,
    pub soil_capacity_mm: Vec<f64>,
    pub soil_potential_percola_mm: Vec<f64>,
    pub soil_water_mm: Vec<f64>,
    pub land_response_time_ts: Vec<f64>,
    pub ground_response_time_ts: Vec<f64>,
    pub baseflow_grf_gamma: Vec<f64>,
    pub land_kel_k: Vec<f64>,
    pub evatrans_ubc_gamma: Vec<f64>,
    pub infilt_ubc_p0agen: Vec<f64>,
    pub percola_arn_k: Vec<f64>,
    pub percola_arn_thresh: Vec<f64>,
}

impl MiniParameters {
    /// Same parameters for `n_spat` identical spatial units.
    pub fn uniform(n_spat: usize) -> Self {
        let v = |x: f64| vec![x; n_spat];
        Self {
            ground_capacity_mm: v(100.0),
            ground_water_mm: v(20.0),
            land_impermeable_frac: v(0.1),
            soil_capacity_mm: v(200.0),
            soil_potential_percola_mm: v(5.0),
            soil_water_mm: v(80.0),
            land_response_time_ts: v(2.0),
            ground_response_time_ts: v(8.0),
            baseflow_grf_gamma: v(4.0),
            land_kel_k: v(1.5),
            evatrans_ubc_gamma: v(0.6),
            infilt_ubc_p0agen: v(0.4),
            percola_arn_k: v(0.1),
            percola_arn_thresh: v(0.5),
        }
    }

    pub fn n_spat(&self) -> usize {
        self.soil_capacity_mm.len()
    }

    /// `(name, values)` for every vector, in declaration order.
    pub fn named_vectors(&self) -> [(&'static str, &[f64]); 14] {
        [
            ("ground_capacity_mm", self.ground_capacity_mm.as_slice()),
            ("ground_water_mm", self.ground_water_mm.as_slice()),
            ("land_impermeable_frac", self.land_impermeable_frac.as_slice()),
            ("soil_capacity_mm", self.soil_capacity_mm.as_slice()),
            ("soil_potential_percola_mm", self.soil_potential_percola_mm.as_slice()),
            ("soil_water_mm", self.soil_water_mm.as_slice()),
            ("land_response_time_ts", self.land_response_time_ts.as_slice()),
            ("ground_response_time_ts", self.ground_response_time_ts.as_slice()),
            ("baseflow_grf_gamma", self.baseflow_grf_gamma.as_slice()),
            ("land_kel_k", self.land_kel_k.as_slice()),
            ("evatrans_ubc_gamma", self.evatrans_ubc_gamma.as_slice()),
            ("infilt_ubc_p0agen", self.infilt_ubc_p0agen.as_slice()),
            ("percola_arn_k", self.percola_arn_k.as_slice()),
            ("percola_arn_thresh", self.percola_arn_thresh.as_slice()),
        ]
    }

    /// Every vector must have one entry per spatial unit.
    pub fn check_lengths(&self) -> ModelResult<()> {
        let n = self.n_spat();
        for (name, values) in self.named_vectors() {
            check_len(name, &column(values), n)?;
        }
        Ok(())
    }
}

pub(crate) fn column(values: &[f64]) -> Array1<f64> {
    Array1::from(values.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_has_requested_units() {
        let p = MiniParameters::uniform(4);
        assert_eq!(p.n_spat(), 4);
        assert!(p.check_lengths().is_ok());
    }

    #[test]
    fn short_vector_is_reported_by_name() {
        let mut p = MiniParameters::uniform(3);
        p.land_kel_k.pop();
        let err = p.check_lengths().unwrap_err().to_string();
        assert!(err.contains("land_kel_k"), "{err}");
    }

    #[test]
    fn json_round_trip_keeps_values() {
        let p = MiniParameters::uniform(2);
        let json = serde_json::to_string(&p).unwrap();
        let back: MiniParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }
}
