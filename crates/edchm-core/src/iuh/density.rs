/// Unit hydrographs integrated from a continuous response density.
///
/// The density is sampled at `SUBSAMPLES` points per timestep, each block of
/// samples is averaged into one ordinate, and the ordinates are renormalized
/// so the truncated tail does not leak mass.
use super::{horizon, normalize, Kernel, SUBSAMPLES};
use crate::checks::check_positive_value;
use crate::error::ModelResult;

/// Tail mass left out of the Kelly kernel horizon.
pub const KELLY_TAIL: f64 = 0.002;

/// Tail mass left out of the Clark kernel horizon.
pub const CLARK_TAIL: f64 = 0.005;

fn block_average(t_max: usize, density: impl Fn(f64) -> f64) -> Vec<f64> {
    let step = 1.0 / SUBSAMPLES as f64;
    (0..t_max)
        .map(|block| {
            let total: f64 = (1..=SUBSAMPLES)
                .map(|s| density((block * SUBSAMPLES + s) as f64 * step))
                .sum();
            total / SUBSAMPLES as f64
        })
        .collect()
}

/// Kelly (1966) triangular-inflow linear reservoir.
///
/// `t_r` is the reservoir constant, the concentration time is `k * t_r`.
pub fn kelly(t_r: f64, k: f64) -> ModelResult<Kernel> {
    check_positive_value("confluen_responseTime_TS", t_r)?;
    check_positive_value("param_confluen_kel_k", k)?;

    let tc = t_r * k;
    let tc2 = tc * tc;
    let half_growth = (tc / t_r * 0.5).exp();
    let c_rising = 4.0 * t_r / tc2 * (1.0 - 2.0 * half_growth);
    let c_recession = 4.0 * t_r / tc2 * (1.0 - 2.0 * half_growth + (tc / t_r).exp());
    let tail = -t_r * (KELLY_TAIL / c_recession).ln();
    let t_max = horizon("confluen_responseTime_TS", t_r, tc.max(tail))?;

    let weights = block_average(t_max, |t| {
        let decay = (-t / t_r).exp();
        if t > tc {
            c_recession * decay
        } else if t > tc * 0.5 {
            c_rising * decay - 4.0 / tc2 * (t - t_r - tc)
        } else {
            4.0 / tc2 * (t + t_r * (decay - 1.0))
        }
    });
    Ok(Kernel::from_weights(normalize(weights)))
}

/// Nash cascade of `n` linear reservoirs with constant `t_r`.
///
/// The gamma density's `1/Gamma(n)` factor cancels in the renormalization.
pub fn nash(t_r: f64, n: f64) -> ModelResult<Kernel> {
    check_positive_value("confluen_responseTime_TS", t_r)?;
    check_positive_value("param_confluen_nas_n", n)?;

    let t_max = horizon("param_confluen_nas_n", n, n.max(4.0) * 3.0 * t_r)?;
    let weights = block_average(t_max, |t| {
        let x = t / t_r;
        x.powf(n - 1.0) * (-x).exp() / t_r
    });
    Ok(Kernel::from_weights(normalize(weights)))
}

/// Clark single linear reservoir, `exp(-t/t_r) / t_r`.
pub fn clark(t_r: f64) -> ModelResult<Kernel> {
    check_positive_value("confluen_responseTime_TS", t_r)?;

    let t_max = horizon("confluen_responseTime_TS", t_r, -t_r * CLARK_TAIL.ln())?;
    let weights = block_average(t_max, |t| (-t / t_r).exp() / t_r);
    Ok(Kernel::from_weights(normalize(weights)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn check_normalized(k: &Kernel) {
        let sum: f64 = k.weights().iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
        assert!(k.weights().iter().all(|&v| v >= 0.0 && v.is_finite()));
    }

    // -- Kelly --

    #[test]
    fn kelly_normalized() {
        for (t_r, k) in [(1.0, 1.0), (2.5, 0.8), (6.0, 2.0), (0.3, 4.0)] {
            check_normalized(&kelly(t_r, k).unwrap());
        }
    }

    #[test]
    fn kelly_horizon_covers_concentration_time() {
        let kernel = kelly(2.0, 3.0).unwrap();
        assert!(kernel.len() >= 6);
    }

    #[test]
    fn kelly_rejects_non_positive_k() {
        assert!(kelly(2.0, 0.0).is_err());
    }

    // -- Nash --

    #[test]
    fn nash_normalized() {
        for (t_r, n) in [(1.0, 1.0), (2.0, 3.0), (0.5, 0.7), (3.0, 6.0)] {
            check_normalized(&nash(t_r, n).unwrap());
        }
    }

    #[test]
    fn nash_horizon() {
        assert_eq!(nash(2.0, 3.0).unwrap().len(), 24);
        assert_eq!(nash(1.0, 5.0).unwrap().len(), 15);
    }

    #[test]
    fn nash_peak_moves_later_with_more_reservoirs() {
        let argmax = |k: &Kernel| {
            k.weights()
                .iter()
                .enumerate()
                .fold((0, f64::MIN), |acc, (i, &v)| if v > acc.1 { (i, v) } else { acc })
                .0
        };
        let few = nash(2.0, 2.0).unwrap();
        let many = nash(2.0, 6.0).unwrap();
        assert!(argmax(&many) > argmax(&few));
    }

    #[test]
    fn nash_rejects_zero_shape() {
        assert!(nash(2.0, 0.0).is_err());
    }

    // -- Clark --

    #[test]
    fn clark_normalized_and_decreasing() {
        let k = clark(3.0).unwrap();
        check_normalized(&k);
        let w = k.weights();
        assert!(w.windows(2).all(|p| p[0] > p[1]));
    }

    #[test]
    fn clark_horizon_leaves_small_tail() {
        // ceil(-3 ln 0.005) = ceil(15.89) = 16
        assert_eq!(clark(3.0).unwrap().len(), 16);
        assert_eq!(clark(0.1).unwrap().len(), 1);
    }
}
