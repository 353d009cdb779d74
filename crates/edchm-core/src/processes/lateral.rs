/// Lateral exchange with neighbouring catchments, applied to the ground store.
///
/// Signed: positive adds water, negative removes it. Every method is
/// clipped to `[-ground_water, ground_capacity - ground_water]`.
use ndarray::{Array1, Zip};

use super::curves;
use crate::checks::{check_finite, check_fraction, check_non_negative, check_param, check_threshold};
use crate::error::ModelResult;
use crate::vecmath::{clamp, vecpow};

/// Exponent of the GR4J exchange term `x2 * (R/X3)^3.5`.
pub const GR4J_EXCHANGE_EXPONENT: f64 = 3.5;

#[derive(Debug, Clone, PartialEq)]
pub enum LateralMethod {
    SupplyPow { k: Array1<f64>, gamma: Array1<f64> },
    SupplyRatio { k: Array1<f64> },
    /// GR4J groundwater exchange with potential `x2`.
    Gr4j { potential: Array1<f64> },
    Gr4jFix {
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
}

impl LateralMethod {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SupplyPow { .. } => "lateral_SupplyPow",
            Self::SupplyRatio { .. } => "lateral_SupplyRatio",
            Self::Gr4j { .. } => "lateral_GR4J",
            Self::Gr4jFix { .. } => "lateral_GR4Jfix",
            Self::ThreshPow { .. } => "lateral_ThreshPow",
            Self::Arno { .. } => "lateral_Arno",
        }
    }

    pub fn validate(&self, n_spat: usize) -> ModelResult<()> {
        match self {
            Self::SupplyPow { k, gamma } => {
                check_param("param_lateral_sup_k", k, n_spat, check_finite)?;
                check_param("param_lateral_sup_gamma", gamma, n_spat, check_non_negative)
            }
            Self::SupplyRatio { k } => check_param("param_lateral_sur_k", k, n_spat, check_finite),
            Self::Gr4j { potential } => check_param("ground_potentialLateral_mm", potential, n_spat, check_finite),
            Self::Gr4jFix { potential, gamma } => {
                check_param("ground_potentialLateral_mm", potential, n_spat, check_finite)?;
                check_param("param_lateral_grf_gamma", gamma, n_spat, check_non_negative)
            }
            Self::ThreshPow {
                potential,
                thresh,
                gamma,
            } => {
                check_param("ground_potentialLateral_mm", potential, n_spat, check_finite)?;
                check_param("param_lateral_thp_thresh", thresh, n_spat, check_threshold)?;
                check_param("param_lateral_thp_gamma", gamma, n_spat, check_non_negative)
            }
            Self::Arno { potential, thresh, k } => {
                check_param("ground_potentialLateral_mm", potential, n_spat, check_finite)?;
                check_param("param_lateral_arn_thresh", thresh, n_spat, check_threshold)?;
                check_param("param_lateral_arn_k", k, n_spat, check_fraction)
            }
        }
    }

    /// Signed exchange [mm] for one timestep.
    pub fn flux(&self, ground_water: &Array1<f64>, ground_capacity: &Array1<f64>) -> Array1<f64> {
        let exchange = match self {
            Self::SupplyPow { k, gamma } => curves::supply_pow(ground_water, ground_capacity, k, gamma),
            Self::SupplyRatio { k } => k * ground_water,
            Self::Gr4j { potential } => {
                let fill = (ground_water / ground_capacity).mapv(|r| r.powf(GR4J_EXCHANGE_EXPONENT));
                potential * &fill
            }
            Self::Gr4jFix { potential, gamma } => {
                potential * &vecpow(&(ground_water / ground_capacity), gamma)
            }
            Self::ThreshPow {
                potential,
                thresh,
                gamma,
            } => curves::thresh_pow(ground_water, ground_capacity, potential, thresh, gamma),
            Self::Arno { potential, thresh, k } => {
                let raw = curves::arno(ground_water, ground_capacity, potential, thresh, k);
                // Bounded by the potential in whichever direction it points.
                Zip::from(&raw).and(potential).map_collect(|&x, &p| {
                    if p >= 0.0 {
                        x.min(p)
                    } else {
                        x.max(p)
                    }
                })
            }
        };

        let lower = -ground_water;
        let upper = ground_capacity - ground_water;
        clamp(&exchange, &lower, &upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn gr4j_exchange_formula() {
        let m = LateralMethod::Gr4j {
            potential: array![-1.5],
        };
        let out = m.flux(&array![45.0], &array![90.0]);
        assert_relative_eq!(out[0], -1.5 * 0.5f64.powf(3.5), epsilon = 1e-12);
    }

    #[test]
    fn loss_clipped_to_store() {
        let m = LateralMethod::SupplyRatio { k: array![-3.0] };
        let out = m.flux(&array![10.0], &array![90.0]);
        assert_relative_eq!(out[0], -10.0);
    }

    #[test]
    fn gain_clipped_to_free_space() {
        let m = LateralMethod::Gr4j {
            potential: array![50.0],
        };
        let out = m.flux(&array![85.0], &array![90.0]);
        assert_relative_eq!(out[0], 5.0);
    }

    #[test]
    fn arno_negative_potential_bounded() {
        let m = LateralMethod::Arno {
            potential: array![-2.0],
            thresh: array![0.2],
            k: array![0.5],
        };
        let out = m.flux(&array![90.0], &array![90.0]);
        assert!(out[0] >= -2.0 - 1e-12 && out[0] <= 0.0);
    }
}
