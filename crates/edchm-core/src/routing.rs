/// Convolution routing of emitted fluxes through unit hydrographs.
///
/// All forms share the same causal, truncated convention: routed output at
/// timestep `i` only sees emissions at `i` and earlier, and water emitted
/// before the first timestep is not represented.
use log::warn;
use ndarray::{Array2, ArrayView2, Axis};
use rayon::prelude::*;

use crate::error::{ModelError, ModelResult};
use crate::iuh::Kernel;
use crate::vecmath::{reset, sum_product};

/// Causal convolution `y[i] = Σ_j x[i - j] * u[j]`, output length `x.len()`.
pub fn convolve(input: &[f64], kernel: &Kernel) -> Vec<f64> {
    // Reversed ordinates line up with an ascending input window:
    // x[i-lags+1..=i] against u[lags-1], ..., u[0].
    let reversed: Vec<f64> = kernel.weights().iter().rev().copied().collect();
    let m = reversed.len();
    (0..input.len())
        .map(|i| {
            let lags = (i + 1).min(m);
            sum_product(&input[i + 1 - lags..=i], &reversed[m - lags..])
        })
        .collect()
}

/// Route several emission channels and sum their outputs.
///
/// Every channel must have the same length.
pub fn route_channels(channels: &[(&[f64], &Kernel)]) -> ModelResult<Vec<f64>> {
    let n = match channels.first() {
        Some((x, _)) => x.len(),
        None => return Ok(Vec::new()),
    };
    let mut routed = vec![0.0; n];
    for (c, (input, kernel)) in channels.iter().enumerate() {
        if input.len() != n {
            return Err(ModelError::dimension_mismatch(
                format!("routing channel {c}"),
                n,
                input.len(),
            ));
        }
        for (r, y) in routed.iter_mut().zip(convolve(input, kernel)) {
            *r += y;
        }
    }
    Ok(routed)
}

/// Route `[n_time, n_spat]` emission matrices, unit by unit in parallel.
///
/// `kernels[c][j]` is the kernel of channel `c` for spatial unit `j`.
pub fn route_matrix(channels: &[ArrayView2<'_, f64>], kernels: &[Vec<Kernel>]) -> ModelResult<Array2<f64>> {
    let Some(first) = channels.first() else {
        return Err(ModelError::Config {
            message: "routing needs at least one channel".to_string(),
        });
    };
    let (n_time, n_spat) = first.dim();
    if kernels.len() != channels.len() {
        return Err(ModelError::dimension_mismatch("routing kernels", channels.len(), kernels.len()));
    }
    for (c, (emission, ks)) in channels.iter().zip(kernels).enumerate() {
        if emission.nrows() != n_time {
            return Err(ModelError::dimension_mismatch(format!("routing channel {c} rows"), n_time, emission.nrows()));
        }
        if emission.ncols() != n_spat {
            return Err(ModelError::dimension_mismatch(format!("routing channel {c} columns"), n_spat, emission.ncols()));
        }
        if ks.len() != n_spat {
            return Err(ModelError::dimension_mismatch(format!("routing channel {c} kernels"), n_spat, ks.len()));
        }
        if let Some(longest) = ks.iter().map(Kernel::len).max() {
            if longest > n_time {
                warn!("routing channel {c}: kernel horizon {longest} exceeds {n_time} timesteps");
            }
        }
    }

    let columns = (0..n_spat)
        .into_par_iter()
        .map(|j| {
            let series: Vec<Vec<f64>> = channels.iter().map(|e| e.column(j).to_vec()).collect();
            let pairs: Vec<(&[f64], &Kernel)> = series
                .iter()
                .zip(kernels)
                .map(|(x, ks)| (x.as_slice(), &ks[j]))
                .collect();
            route_channels(&pairs)
        })
        .collect::<ModelResult<Vec<_>>>()?;

    let mut routed = Array2::zeros((n_time, n_spat));
    for (mut column, values) in routed.axis_iter_mut(Axis(1)).zip(columns) {
        for (dst, v) in column.iter_mut().zip(values) {
            *dst = v;
        }
    }
    Ok(routed)
}

/// Streaming convolution for one timestep.
///
/// `pending[k]` holds water already scheduled to leave `k` steps from now.
/// The new input is spread over the kernel, the current step's share is
/// returned and the buffer shifts forward. `pending` must be at least as
/// long as `ordinates`.
pub fn convolve_step(pending: &mut [f64], ordinates: &[f64], input: f64) -> f64 {
    debug_assert!(pending.len() >= ordinates.len());
    for (p, u) in pending.iter_mut().zip(ordinates) {
        *p += u * input;
    }
    let output = pending[0];
    pending.rotate_left(1);
    let tail = pending.len() - 1;
    reset(&mut pending[tail..]);
    output
}

/// Water still in transit in a pending buffer.
pub fn in_transit(pending: &[f64]) -> f64 {
    pending.iter().sum()
}
