/// Storage-outflow curves shared by percolation, interflow, baseflow and
/// lateral exchange.
///
/// Each takes the store content and its capacity and returns the
/// unclipped outflow; the calling family applies its own limits.
use ndarray::{Array1, Zip};

/// `w * (1 - (1 + (k*w/c)^g)^(-1/g))`, the GR4J drainage shape.
pub(crate) fn gr4j_fix(
    water: &Array1<f64>,
    capacity: &Array1<f64>,
    k: &Array1<f64>,
    gamma: &Array1<f64>,
) -> Array1<f64> {
    Zip::from(water)
        .and(capacity)
        .and(k)
        .and(gamma)
        .map_collect(|&w, &c, &k, &g| w * (1.0 - (1.0 + (k * w / c).powf(g)).powf(-1.0 / g)))
}

/// Same shape with scalar coefficients.
pub(crate) fn gr4j_fixed(water: &Array1<f64>, capacity: &Array1<f64>, k: f64, gamma: f64) -> Array1<f64> {
    Zip::from(water)
        .and(capacity)
        .map_collect(|&w, &c| w * (1.0 - (1.0 + (k * w / c).powf(gamma)).powf(-1.0 / gamma)))
}

/// `potential * (w/c)^gamma`.
pub(crate) fn max_pow(
    water: &Array1<f64>,
    capacity: &Array1<f64>,
    potential: &Array1<f64>,
    gamma: &Array1<f64>,
) -> Array1<f64> {
    Zip::from(water)
        .and(capacity)
        .and(potential)
        .and(gamma)
        .map_collect(|&w, &c, &p, &g| p * (w / c).powf(g))
}

/// Zero below `thresh * c`, then a power law reaching `potential` at capacity.
pub(crate) fn thresh_pow(
    water: &Array1<f64>,
    capacity: &Array1<f64>,
    potential: &Array1<f64>,
    thresh: &Array1<f64>,
    gamma: &Array1<f64>,
) -> Array1<f64> {
    Zip::from(water)
        .and(capacity)
        .and(potential)
        .and(thresh)
        .and(gamma)
        .map_collect(|&w, &c, &p, &th, &g| {
            let excess = (w / c - th).max(0.0);
            p * (excess / (1.0 - th)).powf(g)
        })
}

/// Arno two-regime drainage: linear below `thresh * c`, linear plus a
/// quadratic excess term above it.
pub(crate) fn arno(
    water: &Array1<f64>,
    capacity: &Array1<f64>,
    potential: &Array1<f64>,
    thresh: &Array1<f64>,
    k: &Array1<f64>,
) -> Array1<f64> {
    Zip::from(water)
        .and(capacity)
        .and(potential)
        .and(thresh)
        .and(k)
        .map_collect(|&w, &c, &p, &th, &k| {
            let ws = c * th;
            let linear = k * p / c * w;
            if w < ws {
                linear
            } else {
                let excess = (w - ws) / (c - ws);
                linear + p * (1.0 - k) * excess * excess
            }
        })
}

/// `k * (w/c)^gamma * w`.
pub(crate) fn supply_pow(
    water: &Array1<f64>,
    capacity: &Array1<f64>,
    k: &Array1<f64>,
    gamma: &Array1<f64>,
) -> Array1<f64> {
    Zip::from(water)
        .and(capacity)
        .and(k)
        .and(gamma)
        .map_collect(|&w, &c, &k, &g| k * (w / c).powf(g) * w)
}

/// Beven-Wood drainage from the water above field capacity.
///
/// Returns `(flux, available)`; the flux still needs clipping to `available`.
pub(crate) fn beven_wood(
    water: &Array1<f64>,
    capacity: &Array1<f64>,
    field_capacity_frac: &Array1<f64>,
    potential: &Array1<f64>,
) -> (Array1<f64>, Array1<f64>) {
    let available = Zip::from(water)
        .and(capacity)
        .and(field_capacity_frac)
        .map_collect(|&w, &c, &fc| (w - c * (1.0 - fc)).max(0.0));
    let flux = Zip::from(water)
        .and(capacity)
        .and(potential)
        .map_collect(|&w, &c, &p| {
            let deficit = c - w;
            let k = if deficit < 1.0 { w } else { w / deficit };
            k * p
        });
    (flux, available)
}
