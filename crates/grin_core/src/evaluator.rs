//! Refractive index and gradient evaluation.
//!
//! Index values are computed per axis: each axis has its own end indices
//! and gamma, while the radial coordinate is shared. The gradient is
//! analytic, derived from the same closed form as the index.

use glam::DVec3;
use grin_math::{Interval, EPSILON};

use crate::field::GrinField;

/// Index of refraction and its spatial gradient at a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexSample {
    /// Per-axis refractive index
    pub ior: DVec3,
    /// Gradient of the index, sign-flipped when the field's polarity is inverted
    pub gradient: DVec3,
}

impl IndexSample {
    /// Effective index seen by a ray travelling along unit `direction`.
    ///
    /// Weights each axis index by the squared direction component, so an
    /// isotropic field returns its scalar index for any direction.
    #[inline]
    pub fn directional_index(&self, direction: DVec3) -> f64 {
        (direction * direction).dot(self.ior)
    }
}

/// Index of refraction and its derivative with respect to radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialSample {
    /// Per-axis refractive index
    pub ior: DVec3,
    /// d(ior)/dr per axis, sign-flipped when the field's polarity is inverted
    pub slope: DVec3,
}

impl GrinField {
    /// Evaluate the field at a position in the field's parent space.
    pub fn index_at(&self, position: DVec3) -> IndexSample {
        let local = position - self.center();
        let (r, dr_dx) = self.radial_coordinate(local);
        let (ior, slope) = self.profile_at(r);

        let gradient = if slope == DVec3::ZERO {
            DVec3::ZERO
        } else {
            slope * dr_dx * self.polarity_sign()
        };

        IndexSample { ior, gradient }
    }

    /// Evaluate the field at a scalar radius from the center.
    ///
    /// Negative radii are treated as their magnitude.
    pub fn index_at_radius(&self, r: f64) -> RadialSample {
        let (ior, slope) = self.profile_at(r.abs());
        RadialSample {
            ior,
            slope: slope * self.polarity_sign(),
        }
    }

    /// Radius of a local-space point and the gradient of that radius.
    ///
    /// The radial profile measures distance in stretched coordinates.
    fn radial_coordinate(&self, local: DVec3) -> (f64, DVec3) {
        if self.profile().has_inner_split() {
            let r = local.length();
            if r > 0.0 {
                (r, local / r)
            } else {
                (0.0, DVec3::ZERO)
            }
        } else {
            let stretch = self.stretch();
            let scaled = local / stretch;
            let r = scaled.length();
            if r > 0.0 {
                (r, scaled / (stretch * r))
            } else {
                (0.0, DVec3::ZERO)
            }
        }
    }

    /// Index and unsigned d(ior)/dr at radius `r >= 0`.
    fn profile_at(&self, r: f64) -> (DVec3, DVec3) {
        let inner = self.ior_inner();
        let outer = self.ior_outer();

        if r >= self.r_outer() {
            return (outer, DVec3::ZERO);
        }

        let (t, dt_dr) = if self.profile().has_inner_split() {
            if r < self.r_inner() {
                return (inner, DVec3::ZERO);
            }
            let span = self.band_width();
            (Interval::UNIT.clamp((r - self.r_inner()) / span), 1.0 / span)
        } else {
            let span = self.r_outer().max(EPSILON);
            (Interval::UNIT.clamp(r / span), 1.0 / span)
        };

        let gamma = self.gamma();
        let mut ior = DVec3::ZERO;
        let mut slope = DVec3::ZERO;
        for axis in 0..3 {
            let delta = outer[axis] - inner[axis];
            if delta == 0.0 {
                ior[axis] = inner[axis];
                continue;
            }
            let (shaped, dshaped) = self.profile().shape(t, gamma[axis]);
            let bounds = Interval::spanning(inner[axis], outer[axis]);
            ior[axis] = bounds.clamp(inner[axis] + delta * shaped);
            slope[axis] = delta * dshaped * dt_dr;
        }

        (ior, slope)
    }
}
