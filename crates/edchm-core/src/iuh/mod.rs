/// Instantaneous unit hydrographs (IUH).
///
/// Every method turns a response time (and optionally a shape parameter)
/// into a discrete, causal, mass-conserving kernel that the routing module
/// convolves with a flux series.
pub mod density;
pub mod scurve;
pub mod triangular;

use log::{debug, trace};
use ndarray::Array1;
use rayon::prelude::*;

use crate::checks::{check_param, check_positive};
use crate::error::{ModelError, ModelResult};

/// Density samples averaged into one kernel ordinate.
pub const SUBSAMPLES: usize = 20;

/// Tolerance on `sum(weights) == 1` for user-supplied kernels.
pub const KERNEL_SUM_TOLERANCE: f64 = 1e-6;

/// Longest kernel any method will synthesize [timesteps].
pub const MAX_HORIZON: usize = 100_000;

/// `ceil(t_max)` ordinates, at least one.
///
/// `name`/`value` identify the parameter that produced `t_max`.
pub(crate) fn horizon(name: &str, value: f64, t_max: f64) -> ModelResult<usize> {
    if !(t_max <= MAX_HORIZON as f64) {
        return Err(ModelError::invalid_parameter(
            name,
            value,
            "kernel horizon exceeds MAX_HORIZON timesteps",
        ));
    }
    Ok((t_max.ceil() as usize).max(1))
}

/// Discrete unit hydrograph: non-negative ordinates summing to one.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    weights: Vec<f64>,
}

impl Kernel {
    /// Wrap ordinates produced by one of the IUH builders.
    pub(crate) fn from_weights(weights: Vec<f64>) -> Self {
        debug_assert!(!weights.is_empty());
        Self { weights }
    }

    /// Build a kernel from arbitrary ordinates, checking they form a unit hydrograph.
    pub fn new(weights: Vec<f64>) -> ModelResult<Self> {
        if weights.is_empty() {
            return Err(ModelError::Config {
                message: "unit hydrograph must have at least one ordinate".to_string(),
            });
        }
        if let Some(j) = weights.iter().position(|w| !(w.is_finite() && *w >= 0.0)) {
            return Err(ModelError::invalid_parameter(
                format!("kernel[{j}]"),
                weights[j],
                "must be finite and >= 0",
            ));
        }
        let total: f64 = weights.iter().sum();
        if (total - 1.0).abs() > KERNEL_SUM_TOLERANCE {
            return Err(ModelError::invalid_parameter(
                "kernel_sum",
                total,
                "ordinates must sum to 1",
            ));
        }
        Ok(Self { weights })
    }

    /// The identity kernel: everything leaves in the same timestep.
    pub fn impulse() -> Self {
        Self { weights: vec![1.0] }
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Clip tiny negative round-off and rescale to unit mass.
pub(crate) fn normalize(mut weights: Vec<f64>) -> Vec<f64> {
    for w in weights.iter_mut() {
        *w = w.max(0.0);
    }
    let total: f64 = weights.iter().sum();
    if total > 0.0 && total.is_finite() {
        for w in weights.iter_mut() {
            *w /= total;
        }
    } else {
        // Degenerate density on this grid: route everything in one step.
        weights.iter_mut().for_each(|w| *w = 0.0);
        if let Some(first) = weights.first_mut() {
            *first = 1.0;
        }
    }
    weights
}

/// IUH family with per-unit parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum IuhMethod {
    Gr4j1 { response_time: Array1<f64> },
    Gr4j2 { response_time: Array1<f64> },
    Kelly { response_time: Array1<f64>, k: Array1<f64> },
    Nash { response_time: Array1<f64>, n: Array1<f64> },
    Clark { response_time: Array1<f64> },
    Triangular { response_time: Array1<f64> },
}

impl IuhMethod {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gr4j1 { .. } => "iuh_GR4J1",
            Self::Gr4j2 { .. } => "iuh_GR4J2",
            Self::Kelly { .. } => "iuh_Kelly",
            Self::Nash { .. } => "iuh_Nash",
            Self::Clark { .. } => "iuh_Clark",
            Self::Triangular { .. } => "iuh_Triangular",
        }
    }

    fn response_time(&self) -> &Array1<f64> {
        match self {
            Self::Gr4j1 { response_time }
            | Self::Gr4j2 { response_time }
            | Self::Kelly { response_time, .. }
            | Self::Nash { response_time, .. }
            | Self::Clark { response_time }
            | Self::Triangular { response_time } => response_time,
        }
    }

    pub fn n_spat(&self) -> usize {
        self.response_time().len()
    }

    pub fn validate(&self, n_spat: usize) -> ModelResult<()> {
        check_param("confluen_responseTime_TS", self.response_time(), n_spat, check_positive)?;
        match self {
            Self::Kelly { k, .. } => check_param("param_confluen_kel_k", k, n_spat, check_positive),
            Self::Nash { n, .. } => check_param("param_confluen_nas_n", n, n_spat, check_positive),
            _ => Ok(()),
        }
    }

    /// Kernel for spatial unit `unit`.
    pub fn kernel(&self, unit: usize) -> ModelResult<Kernel> {
        let t_r = self.response_time()[unit];
        match self {
            Self::Gr4j1 { .. } => scurve::gr4j1(t_r),
            Self::Gr4j2 { .. } => scurve::gr4j2(t_r),
            Self::Kelly { k, .. } => density::kelly(t_r, k[unit]),
            Self::Nash { n, .. } => density::nash(t_r, n[unit]),
            Self::Clark { .. } => density::clark(t_r),
            Self::Triangular { .. } => triangular::triangular(t_r),
        }
    }

    /// Kernels for every spatial unit, synthesized in parallel.
    pub fn kernels(&self) -> ModelResult<Vec<Kernel>> {
        let n_spat = self.n_spat();
        self.validate(n_spat)?;
        let kernels = (0..n_spat)
            .into_par_iter()
            .map(|unit| self.kernel(unit))
            .collect::<ModelResult<Vec<_>>>()?;
        debug!("{}: built {} kernels", self.name(), kernels.len());
        for (unit, k) in kernels.iter().enumerate() {
            trace!("{} unit {unit}: {} ordinates", self.name(), k.len());
        }
        Ok(kernels)
    }
}
