/// Capillary rise from the groundwater store back into the soil.
///
/// Every method is clipped to `min(ground_water, soil deficit)`, where the
/// deficit of the field-capacity variants is measured against
/// `capacity * (1 - field_capacity_frac)`.
use ndarray::{Array1, Zip};

use crate::checks::{check_fraction, check_non_negative, check_param, check_threshold};
use crate::error::ModelResult;
use crate::vecmath::{minimum, positive_part, vecpow};

#[derive(Debug, Clone, PartialEq)]
pub enum CapiriseMethod {
    /// HBV: potential rise scaled by the relative soil deficit.
    Hbv { potential: Array1<f64> },
    /// HBV with the deficit measured below field capacity.
    HbvFix {
        field_capacity_frac: Array1<f64>,
        potential: Array1<f64>,
    },
    AcceptRatio {
        field_capacity_frac: Array1<f64>,
        k: Array1<f64>,
    },
    AcceptPow {
        field_capacity_frac: Array1<f64>,
        k: Array1<f64>,
        gamma: Array1<f64>,
    },
}

impl CapiriseMethod {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hbv { .. } => "capirise_HBV",
            Self::HbvFix { .. } => "capirise_HBVfix",
            Self::AcceptRatio { .. } => "capirise_AcceptRatio",
            Self::AcceptPow { .. } => "capirise_AcceptPow",
        }
    }

    pub fn validate(&self, n_spat: usize) -> ModelResult<()> {
        match self {
            Self::Hbv { potential } => {
                check_param("soil_potentialCapirise_mm", potential, n_spat, check_non_negative)
            }
            Self::HbvFix {
                field_capacity_frac,
                potential,
            } => {
                check_param("soil_fieldCapacityPerc_1", field_capacity_frac, n_spat, check_fraction)?;
                check_param("soil_potentialCapirise_mm", potential, n_spat, check_non_negative)
            }
            Self::AcceptRatio { field_capacity_frac, k } => {
                check_param("soil_fieldCapacityPerc_1", field_capacity_frac, n_spat, check_fraction)?;
                check_param("param_capirise_acr_k", k, n_spat, check_fraction)
            }
            Self::AcceptPow {
                field_capacity_frac,
                k,
                gamma,
            } => {
                check_param("soil_fieldCapacityPerc_1", field_capacity_frac, n_spat, check_threshold)?;
                check_param("param_capirise_acp_k", k, n_spat, check_fraction)?;
                check_param("param_capirise_acp_gamma", gamma, n_spat, check_non_negative)
            }
        }
    }

    /// Capillary rise [mm] for one timestep.
    pub fn flux(
        &self,
        ground_water: &Array1<f64>,
        soil_water: &Array1<f64>,
        soil_capacity: &Array1<f64>,
    ) -> Array1<f64> {
        let (rise, deficit) = match self {
            Self::Hbv { potential } => {
                let deficit = positive_part(&(soil_capacity - soil_water));
                (potential * &(&deficit / soil_capacity), deficit)
            }
            Self::HbvFix {
                field_capacity_frac,
                potential,
            } => {
                let deficit = below_field_capacity(soil_water, soil_capacity, field_capacity_frac);
                (potential * &(&deficit / soil_capacity), deficit)
            }
            Self::AcceptRatio { field_capacity_frac, k } => {
                let deficit = below_field_capacity(soil_water, soil_capacity, field_capacity_frac);
                (k * &deficit, deficit)
            }
            Self::AcceptPow {
                field_capacity_frac,
                k,
                gamma,
            } => {
                let deficit = below_field_capacity(soil_water, soil_capacity, field_capacity_frac);
                let reference = soil_capacity * &(1.0 - field_capacity_frac);
                let k = k * &vecpow(&(&deficit / &reference), gamma);
                (positive_part(&(k * &deficit)), deficit)
            }
        };

        let limit = minimum(&deficit, ground_water);
        minimum(&rise, &limit)
    }
}

fn below_field_capacity(
    soil_water: &Array1<f64>,
    soil_capacity: &Array1<f64>,
    field_capacity_frac: &Array1<f64>,
) -> Array1<f64> {
    Zip::from(soil_water)
        .and(soil_capacity)
        .and(field_capacity_frac)
        .map_collect(|&w, &c, &fc| (c * (1.0 - fc) - w).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn hbv_scales_with_deficit() {
        let m = CapiriseMethod::Hbv {
            potential: array![2.0],
        };
        let out = m.flux(&array![50.0], &array![50.0], &array![100.0]);
        assert_relative_eq!(out[0], 1.0);
    }

    #[test]
    fn limited_by_ground_water() {
        let m = CapiriseMethod::Hbv {
            potential: array![10.0],
        };
        let out = m.flux(&array![0.5], &array![0.0], &array![100.0]);
        assert_relative_eq!(out[0], 0.5);
    }

    #[test]
    fn no_rise_above_field_capacity() {
        let m = CapiriseMethod::AcceptRatio {
            field_capacity_frac: array![0.4],
            k: array![0.5],
        };
        let out = m.flux(&array![50.0], &array![70.0], &array![100.0]);
        assert_eq!(out[0], 0.0);
    }

    #[test]
    fn accept_pow_fills_toward_field_capacity() {
        let m = CapiriseMethod::AcceptPow {
            field_capacity_frac: array![0.4],
            k: array![1.0],
            gamma: array![1.0],
        };
        // deficit = 60 - 30 = 30, relative = 0.5 -> 15
        let out = m.flux(&array![50.0], &array![30.0], &array![100.0]);
        assert_relative_eq!(out[0], 15.0, epsilon = 1e-12);
    }
}
