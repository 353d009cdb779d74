/// Elementwise helpers over the spatial-unit dimension.
///
/// Flux formulas are written as whole-vector expressions; these fill the
/// gaps `ndarray` arithmetic leaves (vector exponents, base-10 powers,
/// pairwise minimum) plus the weighted sum and zero-fill slice primitives
/// the convolution router is built on.
use ndarray::{Array1, Zip};

/// `base[i].powf(exp[i])`.
pub fn vecpow(base: &Array1<f64>, exp: &Array1<f64>) -> Array1<f64> {
    Zip::from(base).and(exp).map_collect(|&b, &e| b.powf(e))
}

/// `10^exp[i]`.
pub fn vecpow10(exp: &Array1<f64>) -> Array1<f64> {
    exp.mapv(|e| 10f64.powf(e))
}

/// Weighted sum `Σ lhs[i] * rhs[i]` over the shorter of the two slices.
pub fn sum_product(lhs: &[f64], rhs: &[f64]) -> f64 {
    lhs.iter().zip(rhs).map(|(a, b)| a * b).sum()
}

/// Fill with zeros.
pub fn reset(x: &mut [f64]) {
    x.fill(0.0);
}

pub fn minimum(a: &Array1<f64>, b: &Array1<f64>) -> Array1<f64> {
    Zip::from(a).and(b).map_collect(|&x, &y| x.min(y))
}

/// `max(x, 0)`.
pub fn positive_part(x: &Array1<f64>) -> Array1<f64> {
    x.mapv(|v| v.max(0.0))
}

/// Clamp each value into `[lower[i], upper[i]]`.
pub fn clamp(x: &Array1<f64>, lower: &Array1<f64>, upper: &Array1<f64>) -> Array1<f64> {
    Zip::from(x)
        .and(lower)
        .and(upper)
        .map_collect(|&v, &lo, &hi| v.max(lo).min(hi))
}

/// Pick `if_true[i]` where `cond[i]` holds, `if_false[i]` otherwise.
pub fn select(cond: &Array1<bool>, if_true: &Array1<f64>, if_false: &Array1<f64>) -> Array1<f64> {
    Zip::from(cond)
        .and(if_true)
        .and(if_false)
        .map_collect(|&c, &t, &f| if c { t } else { f })
}
