/// JSON run configuration.
///
/// ```json
/// {
///   "model": "mini",
///   "soil_capacity_mm": [200.0], "...": "...",
///   "resolution": "daily",
///   "forcing": {
///     "precipitation": [[10.0], [0.0]],
///     "potential_evatrans": [[2.0], [2.0]]
///   }
/// }
/// ```
///
/// Forcing matrices are row-major: one row per timestep, one column per
/// spatial unit.
use std::fs;
use std::path::Path;

use log::debug;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::forcing::{Forcing, Resolution};
use crate::gr4j::{self, Gr4jParameters};
use crate::mini::{self, MiniParameters};
use crate::snow::{self, SnowParameters};

/// Which assembly to run, with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ModelConfig {
    Mini(MiniParameters),
    Snow(SnowParameters),
    Gr4j(Gr4jParameters),
}

impl ModelConfig {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mini(_) => mini::NAME,
            Self::Snow(_) => snow::NAME,
            Self::Gr4j(_) => "gr4j",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForcingConfig {
    pub precipitation: Vec<Vec<f64>>,
    pub potential_evatrans: Vec<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Vec<Vec<f64>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(flatten)]
    pub model: ModelConfig,
    #[serde(default)]
    pub resolution: Resolution,
    pub forcing: ForcingConfig,
}

/// Water-balance totals over a run, per spatial unit [mm].
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub model: &'static str,
    pub n_time: usize,
    pub n_spat: usize,
    pub streamflow: Array2<f64>,
    pub precipitation_total: Vec<f64>,
    pub evatrans_total: Vec<f64>,
    pub streamflow_total: Vec<f64>,
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> ModelResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> ModelResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("loaded configuration from {}", path.display());
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> ModelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Validated forcing matrices.
    pub fn forcing(&self) -> ModelResult<Forcing> {
        let precipitation = matrix("atmos_precipitation_mm", &self.forcing.precipitation)?;
        let potential_evatrans = matrix("atmos_potential_evatrans_mm", &self.forcing.potential_evatrans)?;
        let temperature = self
            .forcing
            .temperature
            .as_ref()
            .map(|rows| matrix("atmos_temperature_Cel", rows))
            .transpose()?;
        Forcing::new(precipitation, potential_evatrans, temperature, self.resolution)
    }

    /// Routed streamflow `[n_time, n_spat]`.
    pub fn run(&self) -> ModelResult<Array2<f64>> {
        let forcing = self.forcing()?;
        match &self.model {
            ModelConfig::Mini(p) => mini::run(p, &forcing),
            ModelConfig::Snow(p) => snow::run(p, &forcing),
            ModelConfig::Gr4j(p) => gr4j::run(p, &forcing),
        }
    }

    /// Streamflow plus per-unit water-balance totals.
    pub fn run_full(&self) -> ModelResult<RunSummary> {
        let forcing = self.forcing()?;
        let (streamflow, evatrans) = match &self.model {
            ModelConfig::Mini(p) => {
                let out = mini::simulate(p, &forcing, None)?;
                let et = &out.fluxes.evatrans + &out.fluxes.intercept_evatrans;
                (out.streamflow, et)
            }
            ModelConfig::Snow(p) => {
                let out = snow::simulate(p, &forcing, None)?;
                let et = &out.fluxes.evatrans + &out.fluxes.intercept_evatrans;
                (out.streamflow, et)
            }
            ModelConfig::Gr4j(p) => {
                let out = gr4j::simulate(p, &forcing, None)?;
                (out.streamflow, out.fluxes.actual_evatrans)
            }
        };
        let column_sums = |m: &Array2<f64>| m.columns().into_iter().map(|c| c.sum()).collect::<Vec<_>>();
        Ok(RunSummary {
            model: self.model.name(),
            n_time: forcing.n_time(),
            n_spat: forcing.n_spat(),
            precipitation_total: column_sums(&forcing.precipitation),
            evatrans_total: column_sums(&evatrans),
            streamflow_total: column_sums(&streamflow),
            streamflow,
        })
    }
}

fn matrix(name: &str, rows: &[Vec<f64>]) -> ModelResult<Array2<f64>> {
    let n_time = rows.len();
    let n_spat = rows.first().map_or(0, Vec::len);
    if let Some((t, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_spat) {
        return Err(ModelError::dimension_mismatch(format!("{name} row {t}"), n_spat, row.len()));
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    Array2::from_shape_vec((n_time, n_spat), flat).map_err(|e| ModelError::Config {
        message: format!("{name}: {e}"),
    })
}
