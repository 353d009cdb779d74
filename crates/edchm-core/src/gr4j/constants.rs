//! GR4J numerical constants.
//!
//! Centralises the fixed values of the GR4J structure (Perrin et al., 2003).

// -- Routing split fractions --

/// Fraction of effective rainfall routed through UH1 to the routing store.
pub const B: f64 = 0.9;

// -- Numerical safeguards --

/// Net rainfall and net PET are capped at this multiple of X1 before they
/// enter the production store.
pub const NET_CAP_FACTOR: f64 = 13.0;

// -- Initial state --

/// Default production store level as a fraction of X1.
pub const INITIAL_PRODUCTION_FRAC: f64 = 0.3;

/// Default routing store level as a fraction of X3.
pub const INITIAL_ROUTING_FRAC: f64 = 0.5;

// -- Model contract constants --

/// Parameter names in order.
pub const PARAM_NAMES: &[&str] = &["x1", "x2", "x3", "x4"];

/// Number of parameters.
pub const N_PARAMS: usize = 4;

/// Rows of the state matrix before the unit hydrograph buffers.
pub const STORE_ROWS: usize = 2;
