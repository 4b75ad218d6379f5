//! Validated GRIN field parameters.
//!
//! A [`GrinField`] is immutable once built. Editing a parameter means going
//! back through [`GrinField::to_builder`] and building a new field, so every
//! field a renderer sees has passed validation.

use glam::DVec3;
use grin_math::{Interval, EPSILON};
use serde::{Deserialize, Serialize};

use crate::error::{GrinError, GrinResult};
use crate::profile::ProfileKind;

/// Smallest step count the integrator accepts.
pub const MIN_STEP_LIMIT: u32 = 3;

/// Curvature strength used when advanced controls are off.
pub const SIMPLE_MODE_BETA: f64 = 2.0;

/// Gamma used when advanced controls are off.
pub const SIMPLE_MODE_GAMMA: f64 = 1.0;

/// An immutable, validated gradient-index field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrinField {
    ior_inner: DVec3,
    ior_outer: DVec3,
    r_inner: f64,
    r_outer: f64,
    center: DVec3,
    profile: ProfileKind,
    beta: f64,
    gamma: DVec3,
    stretch: DVec3,
    step_size: f64,
    step_limit: u32,
    invert_polarity: bool,
}

impl GrinField {
    /// Start a builder with default parameters.
    pub fn builder() -> GrinFieldBuilder {
        GrinFieldBuilder::new()
    }

    /// Copy this field's parameters into a builder for editing.
    pub fn to_builder(&self) -> GrinFieldBuilder {
        GrinFieldBuilder {
            ior_inner: self.ior_inner,
            ior_outer: self.ior_outer,
            r_inner: self.r_inner,
            r_outer: self.r_outer,
            center: self.center,
            profile: self.profile,
            beta: self.beta,
            gamma: self.gamma,
            stretch: self.stretch,
            step_size: self.step_size,
            step_limit: self.step_limit,
            invert_polarity: self.invert_polarity,
        }
    }

    pub fn ior_inner(&self) -> DVec3 {
        self.ior_inner
    }

    pub fn ior_outer(&self) -> DVec3 {
        self.ior_outer
    }

    pub fn r_inner(&self) -> f64 {
        self.r_inner
    }

    pub fn r_outer(&self) -> f64 {
        self.r_outer
    }

    pub fn center(&self) -> DVec3 {
        self.center
    }

    pub fn profile(&self) -> ProfileKind {
        self.profile
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn gamma(&self) -> DVec3 {
        self.gamma
    }

    pub fn stretch(&self) -> DVec3 {
        self.stretch
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    pub fn step_limit(&self) -> u32 {
        self.step_limit
    }

    pub fn invert_polarity(&self) -> bool {
        self.invert_polarity
    }

    /// Width of the graded band, floored so it can be used as a divisor.
    pub fn band_width(&self) -> f64 {
        (self.r_outer - self.r_inner).max(EPSILON)
    }

    /// +1 for normal polarity, -1 when inverted.
    pub fn polarity_sign(&self) -> f64 {
        if self.invert_polarity {
            -1.0
        } else {
            1.0
        }
    }

    /// True when both end indices are identical, i.e. the field is uniform.
    pub fn is_uniform(&self) -> bool {
        self.ior_inner == self.ior_outer
    }

    /// True when every axis shares the same IOR and gamma.
    pub fn is_isotropic(&self) -> bool {
        let same = |v: DVec3| v.x == v.y && v.y == v.z;
        same(self.ior_inner) && same(self.ior_outer) && same(self.gamma)
    }

    /// Smallest interval containing every IOR value the field can produce.
    pub fn ior_range(&self) -> Interval {
        let lo = self.ior_inner.min(self.ior_outer).min_element();
        let hi = self.ior_inner.max(self.ior_outer).max_element();
        Interval::new(lo, hi)
    }
}

/// Builder for [`GrinField`], holding the raw (unvalidated) parameters.
///
/// Defaults follow the GRIN volume node: a flat field of index 1.0 over
/// radii 0..10 with a linear power profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrinFieldBuilder {
    pub ior_inner: DVec3,
    pub ior_outer: DVec3,
    pub r_inner: f64,
    pub r_outer: f64,
    pub center: DVec3,
    pub profile: ProfileKind,
    pub beta: f64,
    pub gamma: DVec3,
    pub stretch: DVec3,
    pub step_size: f64,
    pub step_limit: u32,
    pub invert_polarity: bool,
}

impl Default for GrinFieldBuilder {
    fn default() -> Self {
        Self {
            ior_inner: DVec3::ONE,
            ior_outer: DVec3::ONE,
            r_inner: 0.0,
            r_outer: 10.0,
            center: DVec3::ZERO,
            profile: ProfileKind::Power,
            beta: SIMPLE_MODE_BETA,
            gamma: DVec3::splat(SIMPLE_MODE_GAMMA),
            stretch: DVec3::ONE,
            step_size: 0.01,
            step_limit: 100,
            invert_polarity: false,
        }
    }
}

impl GrinFieldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set scalar inner/outer indices, broadcast across all axes.
    pub fn with_ior(mut self, inner: f64, outer: f64) -> Self {
        self.ior_inner = DVec3::splat(inner);
        self.ior_outer = DVec3::splat(outer);
        self
    }

    /// Set per-axis inner/outer indices.
    pub fn with_ior_per_axis(mut self, inner: DVec3, outer: DVec3) -> Self {
        self.ior_inner = inner;
        self.ior_outer = outer;
        self
    }

    pub fn with_radii(mut self, inner: f64, outer: f64) -> Self {
        self.r_inner = inner;
        self.r_outer = outer;
        self
    }

    pub fn with_center(mut self, center: DVec3) -> Self {
        self.center = center;
        self
    }

    pub fn with_profile(mut self, profile: ProfileKind) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    /// Use one gamma for all three axes.
    pub fn with_uniform_gamma(mut self, gamma: f64) -> Self {
        self.gamma = DVec3::splat(gamma);
        self
    }

    /// Use a separate gamma per axis.
    pub fn with_gamma(mut self, gamma: DVec3) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_stretch(mut self, stretch: DVec3) -> Self {
        self.stretch = stretch;
        self
    }

    /// Set RK4 step length and maximum step count.
    pub fn with_steps(mut self, step_size: f64, step_limit: u32) -> Self {
        self.step_size = step_size;
        self.step_limit = step_limit;
        self
    }

    pub fn with_invert_polarity(mut self, invert: bool) -> Self {
        self.invert_polarity = invert;
        self
    }

    /// Pin beta and gamma to the fixed values used without advanced controls.
    pub fn simple_mode(mut self) -> Self {
        self.beta = SIMPLE_MODE_BETA;
        self.gamma = DVec3::splat(SIMPLE_MODE_GAMMA);
        self
    }

    /// Validate the parameters and build an immutable field.
    pub fn build(self) -> GrinResult<GrinField> {
        self.validate()?;

        let field = GrinField {
            ior_inner: self.ior_inner,
            ior_outer: self.ior_outer,
            r_inner: self.r_inner,
            r_outer: self.r_outer,
            center: self.center,
            profile: self.profile,
            beta: self.beta,
            gamma: self.gamma,
            stretch: self.stretch,
            step_size: self.step_size,
            step_limit: self.step_limit,
            invert_polarity: self.invert_polarity,
        };

        log::debug!(
            "Built GRIN field: {} profile, r {}..{}, ior {:?} -> {:?}, beta {}, gamma {:?} ({}{})",
            field.profile,
            field.r_inner,
            field.r_outer,
            field.ior_inner,
            field.ior_outer,
            field.beta,
            field.gamma,
            if field.is_isotropic() { "isotropic" } else { "anisotropic" },
            if field.is_uniform() { ", uniform" } else { "" }
        );

        Ok(field)
    }

    fn validate(&self) -> GrinResult<()> {
        let vectors = [
            ("ior_inner", self.ior_inner),
            ("ior_outer", self.ior_outer),
            ("center", self.center),
            ("gamma", self.gamma),
            ("stretch", self.stretch),
        ];
        for (name, v) in vectors {
            if !v.is_finite() {
                return Err(GrinError::NonFinite(name));
            }
        }
        let scalars = [
            ("r_inner", self.r_inner),
            ("r_outer", self.r_outer),
            ("beta", self.beta),
            ("step_size", self.step_size),
        ];
        for (name, x) in scalars {
            if !x.is_finite() {
                return Err(GrinError::NonFinite(name));
            }
        }

        if self.r_inner < 0.0 {
            return Err(GrinError::NegativeInnerRadius(self.r_inner));
        }
        if self.r_outer <= self.r_inner {
            return Err(GrinError::InvalidRadii {
                inner: self.r_inner,
                outer: self.r_outer,
            });
        }
        if self.step_size <= 0.0 {
            return Err(GrinError::NonPositiveStepSize(self.step_size));
        }
        if self.step_limit < MIN_STEP_LIMIT {
            return Err(GrinError::StepLimitTooSmall {
                got: self.step_limit,
                min: MIN_STEP_LIMIT,
            });
        }

        for (param, v) in [("ior_inner", self.ior_inner), ("ior_outer", self.ior_outer)] {
            let lowest = v.min_element();
            if lowest <= 0.0 {
                return Err(GrinError::NonPositiveIor { param, value: lowest });
            }
        }
        let lowest_gamma = self.gamma.min_element();
        if lowest_gamma < 0.0 {
            return Err(GrinError::NegativeGamma(lowest_gamma));
        }
        let lowest_stretch = self.stretch.min_element();
        if lowest_stretch <= 0.0 {
            return Err(GrinError::NonPositiveStretch(lowest_stretch));
        }

        Ok(())
    }
}
