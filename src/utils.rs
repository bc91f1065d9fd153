//! Convenience helpers for writing problem callbacks

use std::f64::consts::TAU;

use rand::RngExt as _;

/// Convex combination with `f_interp` weighting the *previous* value, the
/// smoothing convention the engine documents: 0 keeps `new`, 1 keeps `prev`.
pub fn lerp(new: f64, prev: f64, f_interp: f64) -> f64 {
    (1.0 - f_interp) * new + f_interp * prev
}

/// Arithmetic mean. `values` must be non-empty.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation around a precomputed mean.
/// `values` must be non-empty.
pub fn std_dev(values: &[f64], mean: f64) -> f64 {
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Draw from `Normal(mean, std)` via the Box-Muller transform.
pub fn draw_normal<R: rand::Rng + ?Sized>(mean: f64, std: f64, rng: &mut R) -> f64 {
    let u1: f64 = rng.random();
    let u2: f64 = rng.random();
    // 1 - u1 keeps the argument of ln strictly positive
    let r = (-2.0 * (1.0 - u1).ln()).sqrt();
    mean + std * r * (TAU * u2).cos()
}

/// Draw `true` with probability `p`.
pub fn draw_bernoulli<R: rand::Rng + ?Sized>(p: f64, rng: &mut R) -> bool {
    rng.random::<f64>() < p
}
