/// Canopy interception of rainfall.
use ndarray::Array1;

use crate::vecmath::{minimum, positive_part};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptionMethod {
    /// Fill whatever interception capacity is left.
    Full,
}

impl InterceptionMethod {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Full => "intercep_Full",
        }
    }

    /// Intercepted water [mm], at most the rain and at most the free capacity.
    pub fn flux(
        &self,
        rain: &Array1<f64>,
        intercept_water: &Array1<f64>,
        intercept_capacity: &Array1<f64>,
    ) -> Array1<f64> {
        match self {
            Self::Full => {
                let free = positive_part(&(intercept_capacity - intercept_water));
                minimum(&free, rain)
            }
        }
    }
}
