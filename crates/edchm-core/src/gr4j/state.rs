/// GR4J model state variables.
///
/// Mutable state that evolves during simulation. Contains two stores and
/// the unit hydrograph pending buffers, per spatial unit:
/// - `production_store`: S, soil moisture store level [mm]
/// - `routing_store`: R, groundwater/routing store level [mm]
/// - `uh1_pending`: water scheduled to leave UH1, `ceil(max X4)` per unit
/// - `uh2_pending`: water scheduled to leave UH2, `ceil(2 max X4)` per unit
use ndarray::{Array1, Array2};

use super::constants::STORE_ROWS;
use super::params::Gr4jParameters;
use crate::checks::{check_len, check_non_negative};
use crate::error::{ModelError, ModelResult};

#[derive(Debug, Clone, PartialEq)]
pub struct Gr4jState {
    pub production_store: Array1<f64>,
    pub routing_store: Array1<f64>,
    pub uh1_pending: Vec<Vec<f64>>,
    pub uh2_pending: Vec<Vec<f64>>,
}

impl Gr4jState {
    /// Initial stores from the parameters, empty unit hydrographs.
    pub fn initialize(params: &Gr4jParameters) -> Self {
        let n = params.n_spat();
        Self {
            production_store: params.initial_production_store(),
            routing_store: params.initial_routing_store(),
            uh1_pending: vec![vec![0.0; params.uh1_len()]; n],
            uh2_pending: vec![vec![0.0; params.uh2_len()]; n],
        }
    }

    pub fn n_spat(&self) -> usize {
        self.production_store.len()
    }

    /// Check shapes and `0 <= S <= X1`, `0 <= R <= X3`.
    pub fn validate(&self, params: &Gr4jParameters) -> ModelResult<()> {
        let n = params.n_spat();
        check_len("production_store_mm", &self.production_store, n)?;
        check_len("routing_store_mm", &self.routing_store, n)?;
        check_within("production_store_mm", &self.production_store, &params.x1())?;
        check_within("routing_store_mm", &self.routing_store, &params.x3())?;
        check_buffers("uh1_pending", &self.uh1_pending, n, params.uh1_len())?;
        check_buffers("uh2_pending", &self.uh2_pending, n, params.uh2_len())
    }

    /// Water still travelling through the unit hydrographs, per unit.
    pub fn in_transit(&self) -> Array1<f64> {
        self.uh1_pending
            .iter()
            .zip(&self.uh2_pending)
            .map(|(a, b)| a.iter().sum::<f64>() + b.iter().sum::<f64>())
            .collect()
    }

    /// Stack into a matrix with one column per unit.
    ///
    /// Rows: production store, routing store, UH1 buffer, UH2 buffer.
    pub fn to_matrix(&self) -> Array2<f64> {
        let n1 = self.uh1_pending.first().map_or(0, Vec::len);
        let n2 = self.uh2_pending.first().map_or(0, Vec::len);
        let mut m = Array2::zeros((STORE_ROWS + n1 + n2, self.n_spat()));
        for j in 0..self.n_spat() {
            m[[0, j]] = self.production_store[j];
            m[[1, j]] = self.routing_store[j];
            for (k, &v) in self.uh1_pending[j].iter().enumerate() {
                m[[STORE_ROWS + k, j]] = v;
            }
            for (k, &v) in self.uh2_pending[j].iter().enumerate() {
                m[[STORE_ROWS + n1 + k, j]] = v;
            }
        }
        m
    }

    /// Rebuild from [`Gr4jState::to_matrix`]; the buffer lengths come from the parameters.
    pub fn from_matrix(params: &Gr4jParameters, matrix: &Array2<f64>) -> ModelResult<Self> {
        let (n1, n2) = (params.uh1_len(), params.uh2_len());
        let rows = STORE_ROWS + n1 + n2;
        if matrix.nrows() != rows {
            return Err(ModelError::dimension_mismatch("GR4J state rows", rows, matrix.nrows()));
        }
        if matrix.ncols() != params.n_spat() {
            return Err(ModelError::dimension_mismatch(
                "GR4J state columns",
                params.n_spat(),
                matrix.ncols(),
            ));
        }
        let buffer = |start: usize, len: usize| -> Vec<Vec<f64>> {
            matrix
                .columns()
                .into_iter()
                .map(|col| col.iter().skip(start).take(len).copied().collect())
                .collect()
        };
        let state = Self {
            production_store: matrix.row(0).to_owned(),
            routing_store: matrix.row(1).to_owned(),
            uh1_pending: buffer(STORE_ROWS, n1),
            uh2_pending: buffer(STORE_ROWS + n1, n2),
        };
        state.validate(params)?;
        Ok(state)
    }
}

fn check_within(name: &str, water: &Array1<f64>, capacity: &Array1<f64>) -> ModelResult<()> {
    for (j, (&w, &c)) in water.iter().zip(capacity).enumerate() {
        if !(w.is_finite() && (0.0..=c).contains(&w)) {
            return Err(ModelError::invalid_parameter(
                format!("{name}[{j}]"),
                w,
                "must lie in [0, capacity]",
            ));
        }
    }
    Ok(())
}

fn check_buffers(name: &str, buffers: &[Vec<f64>], n_spat: usize, len: usize) -> ModelResult<()> {
    if buffers.len() != n_spat {
        return Err(ModelError::dimension_mismatch(name, n_spat, buffers.len()));
    }
    for (j, b) in buffers.iter().enumerate() {
        let values = Array1::from(b.clone());
        check_len(&format!("{name}[{j}]"), &values, len)?;
        check_non_negative(&format!("{name}[{j}]"), &values)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_params() -> Gr4jParameters {
        Gr4jParameters::new(vec![350.0, 300.0], vec![0.0, 0.5], vec![90.0, 80.0], vec![1.7, 2.5])
    }

    #[test]
    fn initialize_production_store() {
        let s = Gr4jState::initialize(&test_params());
        assert_eq!(s.production_store.to_vec(), vec![0.3 * 350.0, 0.3 * 300.0]);
    }

    #[test]
    fn initialize_routing_store() {
        let s = Gr4jState::initialize(&test_params());
        assert_eq!(s.routing_store.to_vec(), vec![45.0, 40.0]);
    }

    #[test]
    fn initialize_uh_states_zero() {
        let s = Gr4jState::initialize(&test_params());
        assert_eq!(s.uh1_pending[0].len(), 3);
        assert_eq!(s.uh2_pending[1].len(), 5);
        assert!(s.uh1_pending.iter().flatten().all(|&v| v == 0.0));
        assert_eq!(s.in_transit().to_vec(), vec![0.0, 0.0]);
    }

    #[test]
    fn roundtrip_matrix_conversion() {
        let p = test_params();
        let mut s = Gr4jState::initialize(&p);
        s.uh1_pending[1][2] = 3.5;
        s.uh2_pending[0][4] = 1.25;
        let m = s.to_matrix();
        assert_eq!(m.dim(), (2 + 3 + 5, 2));
        let back = Gr4jState::from_matrix(&p, &m).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn from_matrix_wrong_rows() {
        let p = test_params();
        let m = Array2::zeros((4, 2));
        assert!(Gr4jState::from_matrix(&p, &m).is_err());
    }

    #[test]
    fn validate_rejects_overfull_store() {
        let p = test_params();
        let mut s = Gr4jState::initialize(&p);
        s.routing_store[0] = 95.0;
        let err = s.validate(&p).unwrap_err().to_string();
        assert!(err.contains("routing_store_mm[0]"), "{err}");
    }
}
