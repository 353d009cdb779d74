/// Snow routine: precipitation partition and snowpack melt.
use ndarray::{Array1, ArrayView1, Zip};

use crate::checks::{check_finite, check_non_negative, check_param, check_positive};
use crate::error::ModelResult;
use crate::vecmath::minimum;

/// How much of the precipitation falls as snow.
#[derive(Debug, Clone, PartialEq)]
pub enum SnowfallMethod {
    /// Everything is snow at or below `thresh_t` [°C], nothing above.
    ThresholdT { thresh_t: Array1<f64> },
    /// UBC: all snow at or below 0 °C, none above `a0form`, linear between.
    Ubc { a0form: Array1<f64> },
}

impl SnowfallMethod {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ThresholdT { .. } => "atmosSnow_ThresholdT",
            Self::Ubc { .. } => "atmosSnow_UBC",
        }
    }

    pub fn validate(&self, n_spat: usize) -> ModelResult<()> {
        match self {
            Self::ThresholdT { thresh_t } => check_param("param_atmos_thr_Ts", thresh_t, n_spat, check_finite),
            Self::Ubc { a0form } => check_param("param_atmos_ubc_A0FORM", a0form, n_spat, check_positive),
        }
    }

    /// Snowfall [mm]; never exceeds the precipitation.
    pub fn snowfall(&self, precipitation: ArrayView1<'_, f64>, temperature: ArrayView1<'_, f64>) -> Array1<f64> {
        match self {
            Self::ThresholdT { thresh_t } => Zip::from(precipitation)
                .and(temperature)
                .and(thresh_t)
                .map_collect(|&p, &t, &ts| if t > ts { 0.0 } else { p }),
            Self::Ubc { a0form } => Zip::from(precipitation)
                .and(temperature)
                .and(a0form)
                .map_collect(|&p, &t, &a0| {
                    if t <= 0.0 {
                        p
                    } else if t > a0 {
                        0.0
                    } else {
                        (1.0 - t / a0) * p
                    }
                }),
        }
    }
}

/// How fast the snowpack melts.
#[derive(Debug, Clone, PartialEq)]
pub enum SnowmeltMethod {
    /// Degree-hour factor: `f * time_step_h * max(T - t_melt, 0)` [mm].
    Factor {
        factor: Array1<f64>,
        t_melt: Array1<f64>,
    },
}

impl SnowmeltMethod {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Factor { .. } => "snowMelt_Factor",
        }
    }

    pub fn validate(&self, n_spat: usize) -> ModelResult<()> {
        match self {
            Self::Factor { factor, t_melt } => {
                check_param("param_snow_fac_f", factor, n_spat, check_non_negative)?;
                check_param("param_snow_fac_Tmelt", t_melt, n_spat, check_finite)
            }
        }
    }

    /// Melt [mm] over a timestep of `time_step_h` hours, capped at the snowpack.
    pub fn melt(
        &self,
        snow_ice: &Array1<f64>,
        temperature: ArrayView1<'_, f64>,
        time_step_h: f64,
    ) -> Array1<f64> {
        let potential = match self {
            Self::Factor { factor, t_melt } => Zip::from(temperature)
                .and(factor)
                .and(t_melt)
                .map_collect(|&t, &f, &tm| f * time_step_h * (t - tm).max(0.0)),
        };
        minimum(&potential, snow_ice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn threshold_partition() {
        let m = SnowfallMethod::ThresholdT {
            thresh_t: array![0.0, 0.0, 0.0],
        };
        let p = array![5.0, 5.0, 5.0];
        let t = array![-2.0, 0.0, 1.5];
        let snow = m.snowfall(p.view(), t.view());
        assert_eq!(snow, array![5.0, 5.0, 0.0]);
    }

    #[test]
    fn ubc_partition_is_linear_between_bounds() {
        let m = SnowfallMethod::Ubc {
            a0form: array![2.0, 2.0, 2.0],
        };
        let p = array![4.0, 4.0, 4.0];
        let t = array![-1.0, 1.0, 3.0];
        let snow = m.snowfall(p.view(), t.view());
        assert_eq!(snow, array![4.0, 2.0, 0.0]);
    }

    #[test]
    fn factor_melt_scales_with_time_step() {
        let m = SnowmeltMethod::Factor {
            factor: array![0.1],
            t_melt: array![0.0],
        };
        let t = array![3.0];
        let hourly = m.melt(&array![100.0], t.view(), 1.0);
        let daily = m.melt(&array![100.0], t.view(), 24.0);
        assert_relative_eq!(hourly[0], 0.3, epsilon = 1e-12);
        assert_relative_eq!(daily[0], 7.2, epsilon = 1e-12);
    }

    #[test]
    fn melt_capped_at_snowpack() {
        let m = SnowmeltMethod::Factor {
            factor: array![1.0],
            t_melt: array![0.0],
        };
        let out = m.melt(&array![2.0], array![10.0].view(), 24.0);
        assert_eq!(out[0], 2.0);
    }

    #[test]
    fn no_melt_below_threshold() {
        let m = SnowmeltMethod::Factor {
            factor: array![1.0],
            t_melt: array![1.0],
        };
        let out = m.melt(&array![20.0], array![0.5].view(), 24.0);
        assert_eq!(out[0], 0.0);
    }
}
