//! Error types shared by every edchm module.
//!
//! Configuration problems (bad parameters, mismatched array shapes, missing
//! forcing) are detected before the first timestep. A flux formula that
//! produces a non-finite or negative depleting value mid-run is reported as
//! [`ModelError::InvalidFlux`] and aborts the simulation.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used across the crate.
pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Error, Debug)]
pub enum ModelError {
    /// A parameter or state value lies outside its mathematical domain.
    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: String,
        value: f64,
        reason: &'static str,
    },

    /// Two arrays that must agree on a dimension do not.
    #[error("dimension mismatch for {name}: expected {expected}, got {actual}")]
    DimensionMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// A process needs a forcing series that was not supplied.
    #[error("missing forcing series {name}")]
    MissingForcing { name: &'static str },

    /// A flux formula produced NaN/inf, or a depleting flux stayed negative
    /// after clipping.
    #[error("invalid {process} flux {value} at timestep {timestep}, spatial unit {unit}")]
    InvalidFlux {
        process: &'static str,
        timestep: usize,
        unit: usize,
        value: f64,
    },

    /// Malformed run configuration.
    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ModelError {
    pub fn invalid_parameter(name: impl Into<String>, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            value,
            reason,
        }
    }

    pub fn dimension_mismatch(name: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            name: name.into(),
            expected,
            actual,
        }
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config {
            message: err.to_string(),
        }
    }
}
