//! Bounding volumes that end path integration when a ray leaves them.

use grin_core::{GrinField, ProfileKind};
use grin_math::{Aabb, DVec3};

/// A closed region of space. Integration stops once the ray is outside.
pub trait Boundary: Send + Sync {
    /// Returns true if the point lies inside or on the boundary.
    fn contains(&self, point: DVec3) -> bool;
}

/// A sphere boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereBoundary {
    pub center: DVec3,
    pub radius: f64,
}

impl SphereBoundary {
    /// Create a new sphere boundary.
    pub fn new(center: DVec3, radius: f64) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    /// The smallest sphere enclosing the field's graded region.
    ///
    /// Beyond it the index is uniform and rays travel straight.
    pub fn around(field: &GrinField) -> Self {
        let radius = match field.profile() {
            ProfileKind::Radial => field.r_outer() * field.stretch().max_element(),
            _ => field.r_outer(),
        };
        Self::new(field.center(), radius)
    }
}

impl Boundary for SphereBoundary {
    fn contains(&self, point: DVec3) -> bool {
        (point - self.center).length_squared() <= self.radius * self.radius
    }
}

impl Boundary for Aabb {
    fn contains(&self, point: DVec3) -> bool {
        Aabb::contains(self, point)
    }
}
