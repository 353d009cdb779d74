/// Infiltration from ponded land water into the soil store.
///
/// Every method is clipped to `min(land_water, soil_capacity - soil_water)`,
/// so infiltration never exceeds the supply nor overfills the soil.
use ndarray::{Array1, Zip};

use crate::checks::{check_fraction, check_non_negative, check_param, check_positive};
use crate::error::ModelResult;
use crate::vecmath::{minimum, vecpow, vecpow10};

/// Maximum `P/X1` argument to tanh in the GR4J production store.
pub const MAX_TANH_ARG: f64 = 13.0;

#[derive(Debug, Clone, PartialEq)]
pub enum InfiltrationMethod {
    /// GR4J production-store filling.
    Gr4j,
    /// UBC watershed model: an impermeable fraction sheds water, more so as
    /// the soil deficit shrinks relative to `p0agen`.
    Ubc {
        impermeable_frac: Array1<f64>,
        p0agen: Array1<f64>,
    },
    /// Fixed share of the supply.
    SupplyRatio { k: Array1<f64> },
    /// Fixed share of the soil deficit.
    AcceptRatio { k: Array1<f64> },
    /// Power law of the (rounded-up) supply.
    SupplyPow { k: Array1<f64>, gamma: Array1<f64> },
    /// Power law of the relative deficit.
    AcceptPow { k: Array1<f64>, gamma: Array1<f64> },
    /// HBV soil routine: the wetter the soil, the less infiltrates.
    Hbv { beta: Array1<f64> },
    /// Xinanjiang tension-water curve.
    Xaj { b: Array1<f64> },
    /// VIC variable infiltration capacity curve.
    Vic { b: Array1<f64> },
}

impl InfiltrationMethod {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gr4j => "infilt_GR4J",
            Self::Ubc { .. } => "infilt_UBC",
            Self::SupplyRatio { .. } => "infilt_SupplyRatio",
            Self::AcceptRatio { .. } => "infilt_AcceptRatio",
            Self::SupplyPow { .. } => "infilt_SupplyPow",
            Self::AcceptPow { .. } => "infilt_AcceptPow",
            Self::Hbv { .. } => "infilt_HBV",
            Self::Xaj { .. } => "infilt_XAJ",
            Self::Vic { .. } => "infilt_VIC",
        }
    }

    pub fn validate(&self, n_spat: usize) -> ModelResult<()> {
        match self {
            Self::Gr4j => Ok(()),
            Self::Ubc {
                impermeable_frac,
                p0agen,
            } => {
                check_param("land_impermeableFrac_1", impermeable_frac, n_spat, check_fraction)?;
                check_param("param_infilt_ubc_P0AGEN", p0agen, n_spat, check_positive)
            }
            Self::SupplyRatio { k } => check_param("param_infilt_sur_k", k, n_spat, check_fraction),
            Self::AcceptRatio { k } => check_param("param_infilt_acr_k", k, n_spat, check_fraction),
            Self::SupplyPow { k, gamma } => {
                check_param("param_infilt_sup_k", k, n_spat, check_fraction)?;
                check_param("param_infilt_sup_gamma", gamma, n_spat, check_non_negative)
            }
            Self::AcceptPow { k, gamma } => {
                check_param("param_infilt_acp_k", k, n_spat, check_fraction)?;
                check_param("param_infilt_acp_gamma", gamma, n_spat, check_non_negative)
            }
            Self::Hbv { beta } => check_param("param_infilt_hbv_beta", beta, n_spat, check_positive),
            Self::Xaj { b } => check_param("param_infilt_xaj_B", b, n_spat, check_positive),
            Self::Vic { b } => check_param("param_infilt_vic_B", b, n_spat, check_positive),
        }
    }

    /// Infiltration [mm] for one timestep.
    pub fn flux(
        &self,
        land_water: &Array1<f64>,
        soil_water: &Array1<f64>,
        soil_capacity: &Array1<f64>,
    ) -> Array1<f64> {
        let soil_diff = soil_capacity - soil_water;
        let limit = minimum(&soil_diff, land_water);

        let infilt = match self {
            Self::Gr4j => Zip::from(land_water)
                .and(soil_water)
                .and(soil_capacity)
                .map_collect(|&p, &w, &c| {
                    let s = w / c;
                    let tanh_p = (p / c).min(MAX_TANH_ARG).tanh();
                    c * (1.0 - s * s) * tanh_p / (1.0 + s * tanh_p)
                }),
            Self::Ubc {
                impermeable_frac,
                p0agen,
            } => {
                let shed = vecpow10(&(-&soil_diff / &(soil_capacity * p0agen)));
                land_water * &(1.0 - &(impermeable_frac * &shed))
            }
            Self::SupplyRatio { k } => k * land_water,
            Self::AcceptRatio { k } => k * &soil_diff,
            Self::SupplyPow { k, gamma } => {
                let supplied = k * &vecpow(&land_water.mapv(f64::ceil), gamma);
                minimum(&supplied, land_water)
            }
            Self::AcceptPow { k, gamma } => {
                let k = k * &vecpow(&(&soil_diff / soil_capacity), gamma);
                k * &soil_diff
            }
            Self::Hbv { beta } => {
                let wet = vecpow(&(soil_water / soil_capacity), beta);
                land_water * &(1.0 - &wet)
            }
            Self::Xaj { b } => Zip::from(land_water)
                .and(soil_water)
                .and(soil_capacity)
                .and(b)
                .map_collect(|&p, &w, &c, &b| xaj(p, w, c, b)),
            Self::Vic { b } => Zip::from(land_water)
                .and(soil_water)
                .and(soil_capacity)
                .and(b)
                .map_collect(|&p, &w, &c, &b| vic(p, w, c, b)),
        };

        minimum(&infilt, &limit)
    }
}

fn xaj(land: f64, water: f64, capacity: f64, b: f64) -> f64 {
    let mm = capacity * (b + 1.0);
    let au = mm * (1.0 - (1.0 - water / capacity).max(0.0).powf(1.0 / b));
    let after = ((mm - au - land) / mm).max(0.0);
    let before = (mm - au) / mm;
    -mm * (after.powf(b + 1.0) - before.powf(b + 1.0)) / (b + 1.0)
}

fn vic(land: f64, water: f64, capacity: f64, b: f64) -> f64 {
    let i_m = capacity * (b + 1.0);
    let i_0 = i_m * (1.0 - (1.0 - water / capacity).max(0.0).powf(1.0 / (b + 1.0)));
    let diff = capacity - water;
    if i_0 + land > i_m {
        diff
    } else {
        diff - capacity * (1.0 - (i_0 + land) / i_m).powf(b + 1.0)
    }
}
