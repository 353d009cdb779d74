/// GR4J calibrated parameters, one value per spatial unit.
///
/// Four parameters that define model behavior:
/// - `x1`: Production store capacity [mm]
/// - `x2`: Intercatchment exchange coefficient [mm/timestep]
/// - `x3`: Routing store capacity [mm]
/// - `x4`: Unit hydrograph time constant [timesteps]
///
/// Initial production and routing store levels default to 30% of X1 and
/// 50% of X3.
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use super::constants::{INITIAL_PRODUCTION_FRAC, INITIAL_ROUTING_FRAC, N_PARAMS, PARAM_NAMES};
use crate::checks::{check_finite, check_len, check_positive};
use crate::error::{ModelError, ModelResult};
use crate::iuh::{horizon, MAX_HORIZON};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gr4jParameters {
    pub x1: Vec<f64>,
    pub x2: Vec<f64>,
    pub x3: Vec<f64>,
    pub x4: Vec<f64>,
    /// Initial production store level S [mm].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_store_mm: Option<Vec<f64>>,
    /// Initial routing store level R [mm].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_store_mm: Option<Vec<f64>>,
}

impl Gr4jParameters {
    /// Create new Parameters with default initial stores.
    pub fn new(x1: Vec<f64>, x2: Vec<f64>, x3: Vec<f64>, x4: Vec<f64>) -> Self {
        Self {
            x1,
            x2,
            x3,
            x4,
            production_store_mm: None,
            routing_store_mm: None,
        }
    }

    /// Same four parameters for `n_spat` units.
    pub fn uniform(n_spat: usize, x1: f64, x2: f64, x3: f64, x4: f64) -> Self {
        Self::new(vec![x1; n_spat], vec![x2; n_spat], vec![x3; n_spat], vec![x4; n_spat])
    }

    pub fn with_initial_stores(mut self, production: Vec<f64>, routing: Vec<f64>) -> Self {
        self.production_store_mm = Some(production);
        self.routing_store_mm = Some(routing);
        self
    }

    /// Parameters from a `[4, n_spat]` matrix, rows ordered x1..x4.
    pub fn from_rows(rows: &[Vec<f64>]) -> ModelResult<Self> {
        if rows.len() != N_PARAMS {
            return Err(ModelError::dimension_mismatch("GR4J parameter rows", N_PARAMS, rows.len()));
        }
        Ok(Self::new(rows[0].clone(), rows[1].clone(), rows[2].clone(), rows[3].clone()))
    }

    pub fn n_spat(&self) -> usize {
        self.x1.len()
    }

    pub fn x1(&self) -> Array1<f64> {
        Array1::from(self.x1.clone())
    }

    pub fn x2(&self) -> Array1<f64> {
        Array1::from(self.x2.clone())
    }

    pub fn x3(&self) -> Array1<f64> {
        Array1::from(self.x3.clone())
    }

    pub fn x4(&self) -> Array1<f64> {
        Array1::from(self.x4.clone())
    }

    pub fn initial_production_store(&self) -> Array1<f64> {
        match &self.production_store_mm {
            Some(s) => Array1::from(s.clone()),
            None => self.x1() * INITIAL_PRODUCTION_FRAC,
        }
    }

    pub fn initial_routing_store(&self) -> Array1<f64> {
        match &self.routing_store_mm {
            Some(r) => Array1::from(r.clone()),
            None => self.x3() * INITIAL_ROUTING_FRAC,
        }
    }

    /// Domains: X1, X3, X4 > 0, X2 finite, all of length `n_spat`.
    pub fn validate(&self) -> ModelResult<()> {
        let n = self.n_spat();
        let rows = [self.x1(), self.x2(), self.x3(), self.x4()];
        for (name, values) in PARAM_NAMES.iter().zip(&rows) {
            check_len(name, values, n)?;
        }
        check_positive(PARAM_NAMES[0], &rows[0])?;
        check_finite(PARAM_NAMES[1], &rows[1])?;
        check_positive(PARAM_NAMES[2], &rows[2])?;
        check_positive(PARAM_NAMES[3], &rows[3])?;
        for (j, &x4) in self.x4.iter().enumerate() {
            horizon(&format!("{}[{j}]", PARAM_NAMES[3]), x4, 2.0 * x4)?;
        }
        Ok(())
    }

    /// Longest UH1 across units, `ceil(max X4)`, at most [`MAX_HORIZON`].
    pub fn uh1_len(&self) -> usize {
        buffer_len(max_of(&self.x4))
    }

    /// Longest UH2 across units, `ceil(2 max X4)`, at most [`MAX_HORIZON`].
    pub fn uh2_len(&self) -> usize {
        buffer_len(2.0 * max_of(&self.x4))
    }
}

fn buffer_len(t_max: f64) -> usize {
    (t_max.min(MAX_HORIZON as f64).ceil() as usize).max(1)
}

fn max_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_params() -> Gr4jParameters {
        Gr4jParameters::new(vec![350.0, 200.0], vec![0.0, -1.0], vec![90.0, 60.0], vec![1.7, 3.2])
    }

    #[test]
    fn valid_parameters() {
        let p = test_params();
        assert!(p.validate().is_ok());
        assert_eq!(p.n_spat(), 2);
    }

    #[test]
    fn default_initial_stores() {
        let p = test_params();
        assert_eq!(p.initial_production_store().to_vec(), vec![105.0, 60.0]);
        assert_eq!(p.initial_routing_store().to_vec(), vec![45.0, 30.0]);
    }

    #[test]
    fn explicit_initial_stores() {
        let p = test_params().with_initial_stores(vec![10.0, 20.0], vec![5.0, 6.0]);
        assert_eq!(p.initial_production_store().to_vec(), vec![10.0, 20.0]);
        assert_eq!(p.initial_routing_store().to_vec(), vec![5.0, 6.0]);
    }

    #[test]
    fn uh_lengths_follow_largest_x4() {
        let p = test_params();
        assert_eq!(p.uh1_len(), 4);
        assert_eq!(p.uh2_len(), 7);
    }

    #[test]
    fn rejects_x4_beyond_kernel_horizon() {
        let mut p = test_params();
        p.x4[0] = 1e18;
        let err = p.validate().unwrap_err().to_string();
        assert!(err.contains("x4[0]"), "{err}");
        assert_eq!(p.uh2_len(), MAX_HORIZON);
    }

    #[test]
    fn rejects_zero_x1() {
        let mut p = test_params();
        p.x1[1] = 0.0;
        let err = p.validate().unwrap_err().to_string();
        assert!(err.contains("x1[1]"), "{err}");
    }

    #[test]
    fn rejects_ragged_vectors() {
        let mut p = test_params();
        p.x4.push(1.0);
        assert!(matches!(p.validate(), Err(ModelError::DimensionMismatch { .. })));
    }

    #[test]
    fn from_rows_wrong_count() {
        assert!(Gr4jParameters::from_rows(&[vec![1.0], vec![0.0]]).is_err());
    }
}
