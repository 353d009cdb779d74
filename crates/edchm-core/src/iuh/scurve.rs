/// GR4J unit hydrographs derived from S-curves.
///
/// The kernel is the first difference of a cumulative S-curve sampled at
/// integer timesteps. GR4J1 is the fast hydrograph (base time `t_r`),
/// GR4J2 the slow symmetric one (base time `2 t_r`).
use super::{horizon, Kernel};
use crate::checks::check_positive_value;
use crate::error::ModelResult;

/// S-curve exponent.
pub const D: f64 = 2.5;

/// Cumulative GR4J1 S-curve at time `i`.
fn ss1(i: f64, t_r: f64) -> f64 {
    if i <= 0.0 {
        0.0
    } else if i < t_r {
        (i / t_r).powf(D)
    } else {
        1.0
    }
}

/// Cumulative GR4J2 S-curve at time `i`.
fn ss2(i: f64, t_r: f64) -> f64 {
    if i <= 0.0 {
        0.0
    } else if i <= t_r {
        0.5 * (i / t_r).powf(D)
    } else if i < 2.0 * t_r {
        1.0 - 0.5 * (2.0 - i / t_r).powf(D)
    } else {
        1.0
    }
}

/// Differences of an S-curve over `1..=t_max`, the final value forced to 1.
fn differentiate(t_max: usize, t_r: f64, curve: fn(f64, f64) -> f64) -> Vec<f64> {
    (1..=t_max)
        .map(|i| {
            let upper = if i == t_max { 1.0 } else { curve(i as f64, t_r) };
            upper - curve((i - 1) as f64, t_r)
        })
        .collect()
}

/// Fast GR4J unit hydrograph, `ceil(t_r)` ordinates.
pub fn gr4j1(t_r: f64) -> ModelResult<Kernel> {
    check_positive_value("confluen_responseTime_TS", t_r)?;
    let t_max = horizon("confluen_responseTime_TS", t_r, t_r)?;
    Ok(Kernel::from_weights(differentiate(t_max, t_r, ss1)))
}

/// Slow GR4J unit hydrograph, `ceil(2 t_r)` ordinates.
pub fn gr4j2(t_r: f64) -> ModelResult<Kernel> {
    check_positive_value("confluen_responseTime_TS", t_r)?;
    let t_max = horizon("confluen_responseTime_TS", t_r, 2.0 * t_r)?;
    Ok(Kernel::from_weights(differentiate(t_max, t_r, ss2)))
}
