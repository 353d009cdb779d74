/// Interflow: lateral subsurface drainage out of the soil store into its
/// own routing channel. Every method is capped at the soil water.
use ndarray::{Array1, Zip};

use super::curves;
use crate::checks::{check_fraction, check_non_negative, check_param, check_positive, check_threshold};
use crate::error::ModelResult;
use crate::vecmath::{minimum, vecpow};

#[derive(Debug, Clone, PartialEq)]
pub enum InterflowMethod {
    Gr4jFix { k: Array1<f64>, gamma: Array1<f64> },
    MaxPow {
        potential: Array1<f64>,
        gamma: Array1<f64>,
    },
    ThreshPow {
        potential: Array1<f64>,
        thresh: Array1<f64>,
        gamma: Array1<f64>,
    },
    Arno {
        potential: Array1<f64>,
        thresh: Array1<f64>,
        k: Array1<f64>,
    },
    BevenWood {
        field_capacity_frac: Array1<f64>,
        potential: Array1<f64>,
    },
    /// `k * ceil(w)^gamma`, independent of capacity.
    SupplyPow0 { k: Array1<f64>, gamma: Array1<f64> },
    SupplyPow { k: Array1<f64>, gamma: Array1<f64> },
    SupplyRatio { k: Array1<f64> },
}

impl InterflowMethod {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gr4jFix { .. } => "inteflow_GR4Jfix",
            Self::MaxPow { .. } => "inteflow_MaxPow",
            Self::ThreshPow { .. } => "inteflow_ThreshPow",
            Self::Arno { .. } => "inteflow_Arno",
            Self::BevenWood { .. } => "inteflow_BevenWood",
            Self::SupplyPow0 { .. } => "inteflow_SupplyPow0",
            Self::SupplyPow { .. } => "inteflow_SupplyPow",
            Self::SupplyRatio { .. } => "inteflow_SupplyRatio",
        }
    }

    pub fn validate(&self, n_spat: usize) -> ModelResult<()> {
        match self {
            Self::Gr4jFix { k, gamma } => {
                check_param("param_inteflow_grf_k", k, n_spat, check_positive)?;
                check_param("param_inteflow_grf_gamma", gamma, n_spat, check_positive)
            }
            Self::MaxPow { potential, gamma } => {
                check_param("soil_potentialInteflow_mm", potential, n_spat, check_non_negative)?;
                check_param("param_inteflow_map_gamma", gamma, n_spat, check_non_negative)
            }
            Self::ThreshPow {
                potential,
                thresh,
                gamma,
            } => {
                check_param("soil_potentialInteflow_mm", potential, n_spat, check_non_negative)?;
                check_param("param_inteflow_thp_thresh", thresh, n_spat, check_threshold)?;
                check_param("param_inteflow_thp_gamma", gamma, n_spat, check_non_negative)
            }
            Self::Arno { potential, thresh, k } => {
                check_param("soil_potentialInteflow_mm", potential, n_spat, check_non_negative)?;
                check_param("param_inteflow_arn_thresh", thresh, n_spat, check_threshold)?;
                check_param("param_inteflow_arn_k", k, n_spat, check_fraction)
            }
            Self::BevenWood {
                field_capacity_frac,
                potential,
            } => {
                check_param("soil_fieldCapacityPerc_1", field_capacity_frac, n_spat, check_fraction)?;
                check_param("soil_potentialInteflow_mm", potential, n_spat, check_non_negative)
            }
            Self::SupplyPow0 { k, gamma } => {
                check_param("param_inteflow_sp0_k", k, n_spat, check_non_negative)?;
                check_param("param_inteflow_sp0_gamma", gamma, n_spat, check_non_negative)
            }
            Self::SupplyPow { k, gamma } => {
                check_param("param_inteflow_sup_k", k, n_spat, check_fraction)?;
                check_param("param_inteflow_sup_gamma", gamma, n_spat, check_non_negative)
            }
            Self::SupplyRatio { k } => check_param("param_inteflow_sur_k", k, n_spat, check_fraction),
        }
    }

    /// Interflow [mm] for one timestep.
    pub fn flux(&self, soil_water: &Array1<f64>, soil_capacity: &Array1<f64>) -> Array1<f64> {
        let inteflow = match self {
            Self::Gr4jFix { k, gamma } => curves::gr4j_fix(soil_water, soil_capacity, k, gamma),
            Self::MaxPow { potential, gamma } => curves::max_pow(soil_water, soil_capacity, potential, gamma),
            Self::ThreshPow {
                potential,
                thresh,
                gamma,
            } => curves::thresh_pow(soil_water, soil_capacity, potential, thresh, gamma),
            Self::Arno { potential, thresh, k } => {
                let drained = curves::arno(soil_water, soil_capacity, potential, thresh, k);
                minimum(&drained, potential)
            }
            Self::BevenWood {
                field_capacity_frac,
                potential,
            } => {
                let available = Zip::from(soil_water)
                    .and(soil_capacity)
                    .and(field_capacity_frac)
                    .map_collect(|&w, &c, &fc| (w - c * (1.0 - fc)).max(0.0));
                // The deficit is floored at the water itself so the ratio stays <= 1.
                let flux = Zip::from(soil_water)
                    .and(soil_capacity)
                    .and(potential)
                    .map_collect(|&w, &c, &p| {
                        let deficit = (c - w).max(w);
                        if deficit > 0.0 {
                            w / deficit * p
                        } else {
                            0.0
                        }
                    });
                minimum(&flux, &available)
            }
            Self::SupplyPow0 { k, gamma } => k * &vecpow(&soil_water.mapv(f64::ceil), gamma),
            Self::SupplyPow { k, gamma } => curves::supply_pow(soil_water, soil_capacity, k, gamma),
            Self::SupplyRatio { k } => k * soil_water,
        };

        minimum(&inteflow, soil_water)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn supply_ratio_share_of_soil() {
        let m = InterflowMethod::SupplyRatio { k: array![0.1] };
        let out = m.flux(&array![40.0], &array![100.0]);
        assert_relative_eq!(out[0], 4.0);
    }

    #[test]
    fn beven_wood_only_above_field_capacity() {
        let m = InterflowMethod::BevenWood {
            field_capacity_frac: array![0.3],
            potential: array![5.0],
        };
        let dry = m.flux(&array![50.0], &array![100.0]);
        assert_eq!(dry[0], 0.0);
        let wet = m.flux(&array![90.0], &array![100.0]);
        // available 20, ratio 90/90 = 1 -> potential 5
        assert_relative_eq!(wet[0], 5.0);
    }

    #[test]
    fn supply_pow0_capped_at_water() {
        let m = InterflowMethod::SupplyPow0 {
            k: array![2.0],
            gamma: array![2.0],
        };
        let out = m.flux(&array![0.5], &array![100.0]);
        assert_relative_eq!(out[0], 0.5);
    }

    #[test]
    fn gr4j_fix_bounded_by_water() {
        let m = InterflowMethod::Gr4jFix {
            k: array![5.0],
            gamma: array![2.0],
        };
        let out = m.flux(&array![100.0], &array![100.0]);
        assert!(out[0] < 100.0 && out[0] > 0.0);
    }
}
