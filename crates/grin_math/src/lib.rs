// Re-export glam for convenience
pub use glam::*;

// GRIN math types (f64 throughout; field radii and step sizes are f64)
mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;

/// Floor applied to denominators that must never be evaluated at zero.
pub const EPSILON: f64 = 1e-6;

/// Returns `value` if its magnitude is at least `floor`, otherwise `floor`
/// carrying the sign of `value` (positive for zero).
#[inline]
pub fn floor_magnitude(value: f64, floor: f64) -> f64 {
    if value.abs() >= floor {
        value
    } else if value < 0.0 {
        -floor
    } else {
        floor
    }
}
