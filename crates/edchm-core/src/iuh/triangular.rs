/// Symmetric triangular unit hydrograph with base `t_r` (HBV MAXBAS).
use super::{horizon, normalize, Kernel};
use crate::checks::check_positive_value;
use crate::error::ModelResult;

/// Ordinates are the exact integral of the triangle over each timestep,
/// so fractional base lengths are supported.
pub fn triangular(t_r: f64) -> ModelResult<Kernel> {
    check_positive_value("confluen_responseTime_TS", t_r)?;

    let n = horizon("confluen_responseTime_TS", t_r, t_r)?;
    let half = t_r / 2.0;
    let base2 = t_r * t_r;

    let weights = (0..n)
        .map(|i| {
            let t_start = i as f64;
            let t_end = ((i + 1) as f64).min(t_r);
            if t_end <= t_start {
                return 0.0;
            }

            let mut w = 0.0;
            // Rising limb
            if t_start < half {
                let rise_end = t_end.min(half);
                w += (rise_end * rise_end - t_start * t_start) / base2;
            }
            // Falling limb
            if t_end > half {
                let fall_start = t_start.max(half);
                w += 2.0 * (t_end - fall_start) / t_r - (t_end * t_end - fall_start * fall_start) / base2;
            }
            w
        })
        .collect();

    Ok(Kernel::from_weights(normalize(weights)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_approx(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() < tol,
            "expected {expected} +/- {tol}, got {actual}"
        );
    }

    #[test]
    fn weights_sum_to_one() {
        for t_r in [1.0, 2.0, 2.5, 3.0, 5.5, 7.0] {
            let total: f64 = triangular(t_r).unwrap().weights().iter().sum();
            assert_approx(total, 1.0, 1e-10);
        }
    }

    #[test]
    fn weights_length() {
        assert_eq!(triangular(1.0).unwrap().len(), 1);
        assert_eq!(triangular(2.5).unwrap().len(), 3);
        assert_eq!(triangular(7.0).unwrap().len(), 7);
    }

    #[test]
    fn integer_base_symmetric() {
        let k = triangular(4.0).unwrap();
        let w = k.weights();
        assert_approx(w[0], w[3], 1e-10);
        assert_approx(w[1], w[2], 1e-10);
        assert_approx(w[0], 0.125, 1e-12);
    }

    #[test]
    fn rejects_zero_base() {
        assert!(triangular(0.0).is_err());
    }
}
