/// Percolation from the soil store to the groundwater store.
///
/// Every method is capped at the soil water.
use ndarray::Array1;

use super::curves;
use crate::checks::{check_fraction, check_non_negative, check_param, check_positive, check_threshold};
use crate::error::ModelResult;
use crate::vecmath::minimum;

/// GR4J percolation coefficient, `4/9` (airGR uses `(9/4)^4` in the denominator).
pub const GR4J_PERC_COEF: f64 = 4.0 / 9.0;

#[derive(Debug, Clone, PartialEq)]
pub enum PercolationMethod {
    /// GR4J: `w * (1 - (1 + (4/9 * w/c)^4)^-0.25)`.
    Gr4j,
    /// GR4J shape with a free coefficient in place of 4/9.
    Gr4jFix { k: Array1<f64> },
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
    SupplyPow { k: Array1<f64>, gamma: Array1<f64> },
    SupplyRatio { k: Array1<f64> },
}

impl PercolationMethod {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gr4j => "percola_GR4J",
            Self::Gr4jFix { .. } => "percola_GR4Jfix",
            Self::MaxPow { .. } => "percola_MaxPow",
            Self::ThreshPow { .. } => "percola_ThreshPow",
            Self::Arno { .. } => "percola_Arno",
            Self::BevenWood { .. } => "percola_BevenWood",
            Self::SupplyPow { .. } => "percola_SupplyPow",
            Self::SupplyRatio { .. } => "percola_SupplyRatio",
        }
    }

    pub fn validate(&self, n_spat: usize) -> ModelResult<()> {
        match self {
            Self::Gr4j => Ok(()),
            Self::Gr4jFix { k } => check_param("param_percola_grf_k", k, n_spat, check_positive),
            Self::MaxPow { potential, gamma } => {
                check_param("soil_potentialPercola_mm", potential, n_spat, check_non_negative)?;
                check_param("param_percola_map_gamma", gamma, n_spat, check_non_negative)
            }
            Self::ThreshPow {
                potential,
                thresh,
                gamma,
            } => {
                check_param("soil_potentialPercola_mm", potential, n_spat, check_non_negative)?;
                check_param("param_percola_thp_thresh", thresh, n_spat, check_threshold)?;
                check_param("param_percola_thp_gamma", gamma, n_spat, check_non_negative)
            }
            Self::Arno { potential, thresh, k } => {
                check_param("soil_potentialPercola_mm", potential, n_spat, check_non_negative)?;
                check_param("param_percola_arn_thresh", thresh, n_spat, check_threshold)?;
                check_param("param_percola_arn_k", k, n_spat, check_fraction)
            }
            Self::BevenWood {
                field_capacity_frac,
                potential,
            } => {
                check_param("soil_fieldCapacityPerc_1", field_capacity_frac, n_spat, check_fraction)?;
                check_param("soil_potentialPercola_mm", potential, n_spat, check_non_negative)
            }
            Self::SupplyPow { k, gamma } => {
                check_param("param_percola_sup_k", k, n_spat, check_fraction)?;
                check_param("param_percola_sup_gamma", gamma, n_spat, check_non_negative)
            }
            Self::SupplyRatio { k } => check_param("param_percola_sur_k", k, n_spat, check_fraction),
        }
    }

    /// Percolation [mm] for one timestep.
    pub fn flux(&self, soil_water: &Array1<f64>, soil_capacity: &Array1<f64>) -> Array1<f64> {
        let percola = match self {
            Self::Gr4j => curves::gr4j_fixed(soil_water, soil_capacity, GR4J_PERC_COEF, 4.0),
            Self::Gr4jFix { k } => {
                let gamma = Array1::from_elem(soil_water.len(), 4.0);
                curves::gr4j_fix(soil_water, soil_capacity, k, &gamma)
            }
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
                let (flux, available) =
                    curves::beven_wood(soil_water, soil_capacity, field_capacity_frac, potential);
                minimum(&flux, &available)
            }
            Self::SupplyPow { k, gamma } => curves::supply_pow(soil_water, soil_capacity, k, gamma),
            Self::SupplyRatio { k } => k * soil_water,
        };

        minimum(&percola, soil_water)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn all_methods() -> Vec<PercolationMethod> {
        use PercolationMethod::*;
        vec![
            Gr4j,
            Gr4jFix { k: array![0.6] },
            MaxPow {
                potential: array![20.0],
                gamma: array![1.5],
            },
            ThreshPow {
                potential: array![20.0],
                thresh: array![0.2],
                gamma: array![1.5],
            },
            Arno {
                potential: array![20.0],
                thresh: array![0.6],
                k: array![0.1],
            },
            BevenWood {
                field_capacity_frac: array![0.4],
                potential: array![20.0],
            },
            SupplyPow {
                k: array![0.9],
                gamma: array![0.5],
            },
            SupplyRatio { k: array![0.9] },
        ]
    }

    #[test]
    fn gr4j_half_full_store() {
        let out = PercolationMethod::Gr4j.flux(&array![150.0], &array![300.0]);
        let expected = 150.0 * (1.0 - (1.0 + (4.0f64 / 9.0 * 0.5).powi(4)).powf(-0.25));
        assert_relative_eq!(out[0], expected, epsilon = 1e-12);
    }

    #[test]
    fn never_exceeds_soil_water() {
        for m in all_methods() {
            for w in [0.0, 3.0, 60.0, 99.0, 100.0] {
                let out = m.flux(&array![w], &array![100.0]);
                assert!(out[0] <= w + 1e-12, "{} drained {} from {}", m.name(), out[0], w);
                assert!(out[0] >= 0.0, "{} negative", m.name());
            }
        }
    }

    #[test]
    fn arno_capped_at_potential() {
        let m = PercolationMethod::Arno {
            potential: array![2.0],
            thresh: array![0.1],
            k: array![0.0],
        };
        let out = m.flux(&array![100.0], &array![100.0]);
        assert_relative_eq!(out[0], 2.0);
    }

    #[test]
    fn arno_linear_below_threshold() {
        let m = PercolationMethod::Arno {
            potential: array![10.0],
            thresh: array![0.5],
            k: array![0.2],
        };
        let out = m.flux(&array![20.0], &array![100.0]);
        assert_relative_eq!(out[0], 0.2 * 10.0 / 100.0 * 20.0, epsilon = 1e-12);
    }

    #[test]
    fn validate_rejects_threshold_of_one() {
        let m = PercolationMethod::ThreshPow {
            potential: array![1.0],
            thresh: array![1.0],
            gamma: array![1.0],
        };
        assert!(m.validate(1).is_err());
    }
}
