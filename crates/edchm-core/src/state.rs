/// Per-unit storages and their capacities.
///
/// Capacities are fixed for a run; stores evolve every timestep and are
/// what a run hands back as its final state. Each vector holds one entry
/// per spatial unit.
use ndarray::{stack, Array1, Array2, Axis};

use crate::checks::{check_len, check_non_negative, check_positive};
use crate::error::{ModelError, ModelResult};

/// Number of rows in the matrix representation of [`Stores`].
pub const STORE_ROWS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct Capacities {
    /// Soil (root zone) capacity [mm].
    pub soil: Array1<f64>,
    /// Groundwater store capacity [mm].
    pub ground: Array1<f64>,
    /// Canopy interception capacity [mm]; zero when the assembly has no interception.
    pub intercept: Array1<f64>,
}

impl Capacities {
    /// Soil and ground capacities must be strictly positive and of equal length.
    pub fn new(soil: Array1<f64>, ground: Array1<f64>) -> ModelResult<Self> {
        check_positive("soil_capacity_mm", &soil)?;
        check_len("ground_capacity_mm", &ground, soil.len())?;
        check_positive("ground_capacity_mm", &ground)?;
        let intercept = Array1::zeros(soil.len());
        Ok(Self {
            soil,
            ground,
            intercept,
        })
    }

    pub fn with_interception(mut self, intercept: Array1<f64>) -> ModelResult<Self> {
        check_len("intercept_capacity_mm", &intercept, self.n_spat())?;
        check_non_negative("intercept_capacity_mm", &intercept)?;
        self.intercept = intercept;
        Ok(self)
    }

    pub fn n_spat(&self) -> usize {
        self.soil.len()
    }
}

/// Water held in each store.
#[derive(Debug, Clone, PartialEq)]
pub struct Stores {
    pub soil_water: Array1<f64>,
    pub ground_water: Array1<f64>,
    pub snow_ice: Array1<f64>,
    pub intercept_water: Array1<f64>,
}

impl Stores {
    /// Soil and ground storages; snowpack and interception start empty.
    pub fn new(soil_water: Array1<f64>, ground_water: Array1<f64>) -> Self {
        let n = soil_water.len();
        Self {
            soil_water,
            ground_water,
            snow_ice: Array1::zeros(n),
            intercept_water: Array1::zeros(n),
        }
    }

    pub fn with_snow_ice(mut self, snow_ice: Array1<f64>) -> Self {
        self.snow_ice = snow_ice;
        self
    }

    pub fn with_intercept_water(mut self, intercept_water: Array1<f64>) -> Self {
        self.intercept_water = intercept_water;
        self
    }

    pub fn n_spat(&self) -> usize {
        self.soil_water.len()
    }

    /// Check lengths against the capacities and `0 <= water <= capacity`.
    pub fn validate(&self, capacities: &Capacities) -> ModelResult<()> {
        let n = capacities.n_spat();
        check_len("soil_water_mm", &self.soil_water, n)?;
        check_len("ground_water_mm", &self.ground_water, n)?;
        check_len("snow_ice_mm", &self.snow_ice, n)?;
        check_len("intercept_water_mm", &self.intercept_water, n)?;
        check_non_negative("snow_ice_mm", &self.snow_ice)?;
        check_within("soil_water_mm", &self.soil_water, &capacities.soil)?;
        check_within("ground_water_mm", &self.ground_water, &capacities.ground)?;
        check_within("intercept_water_mm", &self.intercept_water, &capacities.intercept)
    }

    /// Total water held per unit.
    pub fn total_water(&self) -> Array1<f64> {
        &self.soil_water + &self.ground_water + &self.snow_ice + &self.intercept_water
    }

    /// Stack into a `[4, n_spat]` matrix: soil, ground, snow, interception.
    pub fn to_matrix(&self) -> Array2<f64> {
        // Rows share one length, so stacking cannot fail.
        stack(
            Axis(0),
            &[
                self.soil_water.view(),
                self.ground_water.view(),
                self.snow_ice.view(),
                self.intercept_water.view(),
            ],
        )
        .unwrap_or_else(|_| Array2::zeros((STORE_ROWS, 0)))
    }

    pub fn from_matrix(matrix: &Array2<f64>) -> ModelResult<Self> {
        if matrix.nrows() != STORE_ROWS {
            return Err(ModelError::dimension_mismatch("state rows", STORE_ROWS, matrix.nrows()));
        }
        Ok(Self {
            soil_water: matrix.row(0).to_owned(),
            ground_water: matrix.row(1).to_owned(),
            snow_ice: matrix.row(2).to_owned(),
            intercept_water: matrix.row(3).to_owned(),
        })
    }
}

fn check_within(name: &str, water: &Array1<f64>, capacity: &Array1<f64>) -> ModelResult<()> {
    for (j, (&w, &c)) in water.iter().zip(capacity).enumerate() {
        if !(w.is_finite() && w >= 0.0 && w <= c) {
            return Err(ModelError::invalid_parameter(
                format!("{name}[{j}]"),
                w,
                "must lie in [0, capacity]",
            ));
        }
    }
    Ok(())
}
