use crate::DVec3;

/// A ray entering a GRIN field: a start point and an initial direction.
///
/// The direction does not need to be normalized; integrators normalize it
/// before the first step.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    pub direction: DVec3,
}

impl Ray {
    /// Create a new ray.
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self { origin, direction }
    }

    /// Returns the ray with a unit-length direction, or `None` when the
    /// direction is zero or non-finite.
    pub fn normalized(&self) -> Option<Ray> {
        self.direction
            .try_normalize()
            .map(|direction| Ray::new(self.origin, direction))
    }
}
