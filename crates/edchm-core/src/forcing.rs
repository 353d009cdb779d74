/// Atmospheric forcing matrices and their temporal resolution.
use std::str::FromStr;

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Temporal resolution of forcing data.
///
/// Ordered from finest to coarsest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    Hourly,
    #[default]
    Daily,
    Monthly,
    Annual,
}

impl Resolution {
    /// Average number of days per timestep.
    pub fn days_per_timestep(self) -> f64 {
        match self {
            Resolution::Hourly => 1.0 / 24.0,
            Resolution::Daily => 1.0,
            Resolution::Monthly => 30.4375,
            Resolution::Annual => 365.25,
        }
    }

    /// Hours per timestep, the factor degree-hour melt rates are scaled by.
    pub fn hours_per_timestep(self) -> f64 {
        self.days_per_timestep() * 24.0
    }
}

impl FromStr for Resolution {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hourly" => Ok(Resolution::Hourly),
            "daily" => Ok(Resolution::Daily),
            "monthly" => Ok(Resolution::Monthly),
            "annual" => Ok(Resolution::Annual),
            other => Err(ModelError::Config {
                message: format!("unknown resolution '{other}'"),
            }),
        }
    }
}

/// Validated atmospheric forcing, `[n_time, n_spat]` per series.
///
/// Temperature is only required by assemblies with a snow routine.
#[derive(Debug, Clone)]
pub struct Forcing {
    pub precipitation: Array2<f64>,
    pub potential_evatrans: Array2<f64>,
    pub temperature: Option<Array2<f64>>,
    pub resolution: Resolution,
}

/// One timestep of forcing, one entry per spatial unit.
#[derive(Debug, Clone, Copy)]
pub struct ForcingRow<'a> {
    pub precipitation: ArrayView1<'a, f64>,
    pub potential_evatrans: ArrayView1<'a, f64>,
    pub temperature: Option<ArrayView1<'a, f64>>,
}

impl Forcing {
    /// Create new Forcing with validation.
    ///
    /// Validates:
    /// - at least one timestep and one spatial unit
    /// - all series share the precipitation shape
    /// - every value finite; precipitation and PET are non-negative
    pub fn new(
        precipitation: Array2<f64>,
        potential_evatrans: Array2<f64>,
        temperature: Option<Array2<f64>>,
        resolution: Resolution,
    ) -> ModelResult<Self> {
        let (n_time, n_spat) = precipitation.dim();
        if n_time == 0 {
            return Err(ModelError::dimension_mismatch("atmos_precipitation_mm rows", 1, 0));
        }
        if n_spat == 0 {
            return Err(ModelError::dimension_mismatch("atmos_precipitation_mm columns", 1, 0));
        }
        check_shape("atmos_potential_evatrans_mm", &potential_evatrans, n_time, n_spat)?;
        if let Some(temp) = &temperature {
            check_shape("atmos_temperature_Cel", temp, n_time, n_spat)?;
        }

        check_values("atmos_precipitation_mm", &precipitation, true)?;
        check_values("atmos_potential_evatrans_mm", &potential_evatrans, true)?;
        if let Some(temp) = &temperature {
            check_values("atmos_temperature_Cel", temp, false)?;
        }

        Ok(Self {
            precipitation,
            potential_evatrans,
            temperature,
            resolution,
        })
    }

    /// Number of timesteps.
    pub fn n_time(&self) -> usize {
        self.precipitation.nrows()
    }

    /// Number of spatial units.
    pub fn n_spat(&self) -> usize {
        self.precipitation.ncols()
    }

    pub fn time_step_h(&self) -> f64 {
        self.resolution.hours_per_timestep()
    }

    pub fn row(&self, t: usize) -> ForcingRow<'_> {
        ForcingRow {
            precipitation: self.precipitation.row(t),
            potential_evatrans: self.potential_evatrans.row(t),
            temperature: self.temperature.as_ref().map(|temp| temp.row(t)),
        }
    }
}

fn check_shape(name: &str, series: &Array2<f64>, n_time: usize, n_spat: usize) -> ModelResult<()> {
    if series.nrows() != n_time {
        return Err(ModelError::dimension_mismatch(format!("{name} rows"), n_time, series.nrows()));
    }
    if series.ncols() != n_spat {
        return Err(ModelError::dimension_mismatch(
            format!("{name} columns"),
            n_spat,
            series.ncols(),
        ));
    }
    Ok(())
}

fn check_values(name: &str, series: &Array2<f64>, non_negative: bool) -> ModelResult<()> {
    for ((t, j), &v) in series.indexed_iter() {
        if !v.is_finite() {
            return Err(ModelError::invalid_parameter(format!("{name}[{t}, {j}]"), v, "must be finite"));
        }
        if non_negative && v < 0.0 {
            return Err(ModelError::invalid_parameter(
                format!("{name}[{t}, {j}]"),
                v,
                "must be >= 0",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -- Resolution --

    #[test]
    fn resolution_ordering() {
        assert!(Resolution::Hourly < Resolution::Daily);
        assert!(Resolution::Daily < Resolution::Monthly);
        assert!(Resolution::Monthly < Resolution::Annual);
    }

    #[test]
    fn resolution_hours_per_timestep() {
        assert_eq!(Resolution::Hourly.hours_per_timestep(), 1.0);
        assert_eq!(Resolution::Daily.hours_per_timestep(), 24.0);
        assert_eq!(Resolution::Monthly.hours_per_timestep(), 730.5);
    }

    #[test]
    fn resolution_from_json() {
        let r: Resolution = serde_json::from_str("\"hourly\"").unwrap();
        assert_eq!(r, Resolution::Hourly);
    }

    #[test]
    fn resolution_from_str() {
        assert_eq!("Monthly".parse::<Resolution>().unwrap(), Resolution::Monthly);
        assert!("weekly".parse::<Resolution>().is_err());
    }

    // -- Forcing valid construction --

    #[test]
    fn valid_forcing() {
        let f = Forcing::new(
            array![[10.0, 0.0], [5.0, 2.0], [0.0, 0.0]],
            array![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0]],
            None,
            Resolution::Daily,
        )
        .unwrap();
        assert_eq!(f.n_time(), 3);
        assert_eq!(f.n_spat(), 2);
        assert_eq!(f.row(1).precipitation[1], 2.0);
        assert!(f.row(1).temperature.is_none());
    }

    // -- Validation --

    #[test]
    fn rejects_shape_mismatch() {
        let err = Forcing::new(
            array![[10.0, 0.0], [5.0, 2.0]],
            array![[1.0], [2.0]],
            None,
            Resolution::Daily,
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::DimensionMismatch { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn rejects_temperature_shape_mismatch() {
        let err = Forcing::new(
            array![[10.0], [5.0]],
            array![[1.0], [2.0]],
            Some(array![[1.0]]),
            Resolution::Daily,
        )
        .unwrap_err();
        assert!(err.to_string().contains("atmos_temperature_Cel"));
    }

    #[test]
    fn rejects_empty() {
        let empty = Array2::<f64>::zeros((0, 2));
        assert!(Forcing::new(empty.clone(), empty, None, Resolution::Daily).is_err());
    }

    #[test]
    fn rejects_nan_in_precipitation() {
        let err = Forcing::new(
            array![[10.0], [f64::NAN]],
            array![[1.0], [2.0]],
            None,
            Resolution::Daily,
        )
        .unwrap_err();
        assert!(err.to_string().contains("atmos_precipitation_mm[1, 0]"));
    }

    #[test]
    fn rejects_infinite_precipitation() {
        let mut p = Array2::from_elem((5, 1), 4.0);
        p[[1, 0]] = f64::INFINITY;
        let err = Forcing::new(p, Array2::from_elem((5, 1), 1.0), None, Resolution::Daily).unwrap_err();
        assert!(matches!(err, ModelError::InvalidParameter { .. }));
        assert!(err.to_string().contains("atmos_precipitation_mm[1, 0]"), "{err}");
    }

    #[test]
    fn rejects_infinite_temperature() {
        let err = Forcing::new(
            array![[1.0]],
            array![[1.0]],
            Some(array![[f64::NEG_INFINITY]]),
            Resolution::Daily,
        )
        .unwrap_err();
        assert!(err.to_string().contains("atmos_temperature_Cel[0, 0]"), "{err}");
    }

    #[test]
    fn rejects_negative_pet() {
        assert!(Forcing::new(
            array![[10.0], [1.0]],
            array![[1.0], [-2.0]],
            None,
            Resolution::Daily,
        )
        .is_err());
    }

    #[test]
    fn negative_temperature_is_fine() {
        assert!(Forcing::new(
            array![[10.0]],
            array![[1.0]],
            Some(array![[-12.0]]),
            Resolution::Daily,
        )
        .is_ok());
    }
}
