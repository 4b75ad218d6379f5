//! RK4 curved-ray integration through a GRIN field.
//!
//! Integrates the ray equation with arclength `s` as the parameter:
//!
//! ```text
//! dx/ds = d
//! dd/ds = beta * (g - (g . d) d) / n
//! ```
//!
//! where `g` is the index gradient (sign-flipped for inverted polarity) and
//! `n` is the directional index along `d`. The direction is renormalized
//! after every step.

use std::sync::Arc;

use grin_core::GrinField;
use grin_math::{DVec3, Ray, EPSILON};

use crate::boundary::{Boundary, SphereBoundary};

/// Direction norms below this after a step are treated as a singularity.
pub const DEFAULT_DEGENERATE_EPSILON: f64 = 1e-9;

/// Why an integration stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    /// The field's step limit was reached inside the boundary
    StepLimitReached,
    /// The ray left the bounding volume
    Exited,
    /// The direction collapsed or the state became non-finite
    Degenerate,
}

/// One recorded point along an integrated path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathVertex {
    pub position: DVec3,
    /// Unit direction at this point
    pub direction: DVec3,
}

/// Mutable state of a single ray while it is being integrated.
#[derive(Debug, Clone, PartialEq)]
pub struct RayPathState {
    pub position: DVec3,
    pub direction: DVec3,
    pub step_index: u32,
    /// Recorded vertices, starting with the entry point; empty when not recording
    pub path: Vec<PathVertex>,
    recording: bool,
}

impl RayPathState {
    /// Start a path at `position` heading along unit `direction`.
    pub fn new(position: DVec3, direction: DVec3, recording: bool) -> Self {
        let mut state = Self {
            position,
            direction,
            step_index: 0,
            path: Vec::new(),
            recording,
        };
        state.record();
        state
    }

    /// Move to the next step.
    pub fn advance(&mut self, position: DVec3, direction: DVec3) {
        self.position = position;
        self.direction = direction;
        self.step_index += 1;
        self.record();
    }

    /// Consume the state into a terminal outcome.
    pub fn finish(self, termination: Termination) -> TerminalOutcome {
        TerminalOutcome {
            termination,
            position: self.position,
            direction: self.direction,
            steps: self.step_index,
            path: self.path,
        }
    }

    fn record(&mut self) {
        if self.recording {
            self.path.push(PathVertex {
                position: self.position,
                direction: self.direction,
            });
        }
    }
}

/// Result of integrating one ray.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalOutcome {
    pub termination: Termination,
    /// Last valid position
    pub position: DVec3,
    /// Last valid direction (unit unless the ray was degenerate from the start)
    pub direction: DVec3,
    /// Number of completed steps
    pub steps: u32,
    /// Recorded path, empty unless recording was enabled
    pub path: Vec<PathVertex>,
}

impl TerminalOutcome {
    /// Arclength travelled, `steps * step_size`.
    pub fn distance(&self, field: &GrinField) -> f64 {
        f64::from(self.steps) * field.step_size()
    }

    /// The outgoing ray at the terminal point.
    pub fn exit_ray(&self) -> Ray {
        Ray::new(self.position, self.direction)
    }
}

/// Fourth-order Runge-Kutta path stepper.
///
/// Step length and step limit come from the field; the stepper holds the
/// caller's choices about where to stop and what to record.
#[derive(Clone)]
pub struct Rk4Stepper {
    /// Bounding volume; `None` uses the sphere around the field's graded region
    boundary: Option<Arc<dyn Boundary>>,
    /// Whether to record every step in the outcome's path
    record_path: bool,
    /// Direction norm below which a step is degenerate
    degenerate_epsilon: f64,
}

impl Default for Rk4Stepper {
    fn default() -> Self {
        Self {
            boundary: None,
            record_path: false,
            degenerate_epsilon: DEFAULT_DEGENERATE_EPSILON,
        }
    }
}

impl Rk4Stepper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop integration when the ray leaves `boundary`.
    ///
    /// Without one, the sphere around the field's graded region is used. The
    /// boundary is only tested after a step, so a ray starting outside it
    /// takes one straight step and then reports [`Termination::Exited`].
    pub fn with_boundary(mut self, boundary: impl Boundary + 'static) -> Self {
        self.boundary = Some(Arc::new(boundary));
        self
    }

    /// Record every step in the outcome's path.
    pub fn with_path_recording(mut self, record: bool) -> Self {
        self.record_path = record;
        self
    }

    /// Treat a step whose direction norm falls below `epsilon` as degenerate.
    pub fn with_degenerate_epsilon(mut self, epsilon: f64) -> Self {
        self.degenerate_epsilon = epsilon;
        self
    }

    /// Integrate a ray starting at `start` along `initial_direction`.
    ///
    /// See [`Rk4Stepper::integrate_ray`].
    pub fn integrate(
        &self,
        field: &GrinField,
        start: DVec3,
        initial_direction: DVec3,
    ) -> TerminalOutcome {
        self.integrate_ray(field, &Ray::new(start, initial_direction))
    }

    /// Integrate a [`Ray`] through the field.
    ///
    /// The direction is normalized first; a zero or non-finite direction is
    /// reported as [`Termination::Degenerate`] with no steps taken. The
    /// boundary is tested after each step, never before the first, so a ray
    /// starting outside it exits after one step.
    pub fn integrate_ray(&self, field: &GrinField, ray: &Ray) -> TerminalOutcome {
        let Some(ray_unit) = ray.normalized() else {
            let state = RayPathState::new(ray.origin, ray.direction, self.record_path);
            return self.terminate(field, state, Termination::Degenerate);
        };

        let fallback;
        let boundary: &dyn Boundary = match &self.boundary {
            Some(boundary) => boundary.as_ref(),
            None => {
                fallback = SphereBoundary::around(field);
                &fallback
            }
        };

        let h = field.step_size();
        let mut state = RayPathState::new(ray_unit.origin, ray_unit.direction, self.record_path);

        loop {
            if state.step_index >= field.step_limit() {
                return self.terminate(field, state, Termination::StepLimitReached);
            }

            match self.step(field, state.position, state.direction, h) {
                Some((position, direction)) => state.advance(position, direction),
                None => return self.terminate(field, state, Termination::Degenerate),
            }

            if !boundary.contains(state.position) {
                return self.terminate(field, state, Termination::Exited);
            }
        }
    }

    /// Advance one RK4 step of length `h`.
    ///
    /// Returns `None` when the new direction collapses or the state is not finite.
    fn step(&self, field: &GrinField, x: DVec3, d: DVec3, h: f64) -> Option<(DVec3, DVec3)> {
        let (k1x, k1d) = ray_derivative(field, x, d);
        let (k2x, k2d) = ray_derivative(field, x + 0.5 * h * k1x, d + 0.5 * h * k1d);
        let (k3x, k3d) = ray_derivative(field, x + 0.5 * h * k2x, d + 0.5 * h * k2d);
        let (k4x, k4d) = ray_derivative(field, x + h * k3x, d + h * k3d);

        let position = x + (h / 6.0) * (k1x + 2.0 * k2x + 2.0 * k3x + k4x);
        let direction = d + (h / 6.0) * (k1d + 2.0 * k2d + 2.0 * k3d + k4d);

        let norm = direction.length();
        if !position.is_finite() || !norm.is_finite() || norm < self.degenerate_epsilon {
            return None;
        }
        Some((position, direction / norm))
    }

    fn terminate(
        &self,
        field: &GrinField,
        state: RayPathState,
        termination: Termination,
    ) -> TerminalOutcome {
        let outcome = state.finish(termination);
        log::trace!(
            "Ray terminated ({:?}) after {} steps ({:.4} units) at {:?}",
            outcome.termination,
            outcome.steps,
            outcome.distance(field),
            outcome.position
        );
        outcome
    }
}

/// Right-hand side of the ray equation at `(x, d)`: returns `(dx/ds, dd/ds)`.
pub fn ray_derivative(field: &GrinField, x: DVec3, d: DVec3) -> (DVec3, DVec3) {
    if field.is_uniform() {
        return (d, DVec3::ZERO);
    }
    let sample = field.index_at(x);
    let g = sample.gradient;
    if g == DVec3::ZERO {
        return (d, DVec3::ZERO);
    }
    let n = sample.directional_index(d).max(EPSILON);
    let bend = field.beta() * (g - g.dot(d) * d) / n;
    (d, bend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use grin_core::ProfileKind;
    use grin_math::Aabb;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn lens_field() -> GrinField {
        // Index falls off with radius, so rays bend toward the center
        GrinField::builder()
            .with_radii(0.0, 10.0)
            .with_ior(1.6, 1.0)
            .with_uniform_gamma(2.0)
            .with_beta(1.0)
            .with_steps(0.05, 1000)
            .build()
            .unwrap()
    }

    #[test]
    fn test_uniform_field_travels_straight() {
        let field = GrinField::builder()
            .with_radii(0.0, 1.0)
            .with_ior(1.5, 1.5)
            .with_steps(0.3, 100)
            .build()
            .unwrap();

        let outcome = Rk4Stepper::new().integrate(&field, DVec3::ZERO, DVec3::new(2.0, 0.0, 0.0));

        assert_eq!(outcome.termination, Termination::Exited);
        assert_eq!(outcome.steps, 4);
        assert!((outcome.position.x - 1.2).abs() < 1e-9);
        assert_eq!(outcome.position.y, 0.0);
        assert_eq!(outcome.position.z, 0.0);
        assert_eq!(outcome.direction, DVec3::X);
        assert!((outcome.distance(&field) - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_step_limit() {
        let field = GrinField::builder().with_steps(0.1, 7).build().unwrap();
        let stepper = Rk4Stepper::new()
            .with_boundary(Aabb::UNIVERSE)
            .with_path_recording(true);

        let outcome = stepper.integrate(&field, DVec3::ZERO, DVec3::Y);
        assert_eq!(outcome.termination, Termination::StepLimitReached);
        assert_eq!(outcome.steps, 7);
        // Entry point plus one vertex per step
        assert_eq!(outcome.path.len(), 8);
        assert_eq!(outcome.path[0].position, DVec3::ZERO);
        assert_eq!(outcome.path[7].position, outcome.position);
    }

    #[test]
    fn test_path_not_recorded_by_default() {
        let field = GrinField::builder().build().unwrap();
        let outcome = Rk4Stepper::new().integrate(&field, DVec3::ZERO, DVec3::Z);
        assert!(outcome.path.is_empty());
        assert_eq!(outcome.termination, Termination::StepLimitReached);
    }

    #[test]
    fn test_zero_direction_is_degenerate() {
        let field = lens_field();
        let outcome = Rk4Stepper::new().integrate(&field, DVec3::ONE, DVec3::ZERO);
        assert_eq!(outcome.termination, Termination::Degenerate);
        assert_eq!(outcome.steps, 0);
        assert_eq!(outcome.position, DVec3::ONE);
    }

    #[test]
    fn test_non_finite_start_is_degenerate() {
        let field = lens_field();
        let outcome = Rk4Stepper::new().integrate(&field, DVec3::splat(f64::NAN), DVec3::X);
        assert_eq!(outcome.termination, Termination::Degenerate);
        assert_eq!(outcome.steps, 0);
    }

    #[test]
    fn test_ray_derivative() {
        let uniform = GrinField::builder().with_ior(1.4, 1.4).build().unwrap();
        let d = DVec3::new(0.6, 0.8, 0.0);
        assert_eq!(ray_derivative(&uniform, DVec3::new(3.0, 0.0, 0.0), d), (d, DVec3::ZERO));

        // Bending is perpendicular to the direction
        let (dx, dd) = ray_derivative(&lens_field(), DVec3::new(0.0, 4.0, 0.0), DVec3::Z);
        assert_eq!(dx, DVec3::Z);
        assert!(dd.y < 0.0);
        assert!(dd.dot(DVec3::Z).abs() < 1e-12);
    }

    #[test]
    fn test_collapsed_direction_keeps_last_valid_state() {
        let field = lens_field();
        // Every unit direction is below this norm, so the first step collapses
        let stepper = Rk4Stepper::new()
            .with_degenerate_epsilon(2.0)
            .with_path_recording(true);
        let start = DVec3::new(0.0, 2.0, -9.0);

        let outcome = stepper.integrate(&field, start, DVec3::new(0.0, 0.0, 3.0));
        assert_eq!(outcome.termination, Termination::Degenerate);
        assert_eq!(outcome.steps, 0);
        assert_eq!(outcome.position, start);
        assert_eq!(outcome.direction, DVec3::Z);
        assert_eq!(outcome.path.len(), 1);
    }

    #[test]
    fn test_start_outside_default_boundary_exits_after_one_step() {
        let field = GrinField::builder()
            .with_radii(0.0, 5.0)
            .with_ior(1.5, 1.0)
            .with_steps(0.05, 1000)
            .build()
            .unwrap();
        let start = DVec3::new(0.0, 1.0, -8.0);

        let outcome = Rk4Stepper::new().integrate(&field, start, DVec3::Z);
        assert_eq!(outcome.termination, Termination::Exited);
        assert_eq!(outcome.steps, 1);
        // Outside the graded region the step is straight
        assert!((outcome.position - (start + 0.05 * DVec3::Z)).length() < 1e-12);
        assert_eq!(outcome.direction, DVec3::Z);

        // A boundary that encloses the start lets the ray reach the field
        let enclosing = Rk4Stepper::new().with_boundary(Aabb::centered(DVec3::ZERO, 9.0));
        let traced = enclosing.integrate(&field, start, DVec3::Z);
        assert_eq!(traced.termination, Termination::Exited);
        assert!(traced.steps > 300);
        assert!(traced.direction.y < 0.0);
    }

    #[test]
    fn test_lens_bends_toward_axis() {
        let field = lens_field();
        let outcome = Rk4Stepper::new().integrate(&field, DVec3::new(0.0, 2.0, -9.0), DVec3::Z);

        assert_eq!(outcome.termination, Termination::Exited);
        assert!(outcome.direction.y < 0.0, "direction {:?}", outcome.direction);
        // Bending stays in the plane of incidence
        assert!(outcome.position.x.abs() < 1e-12);
    }

    #[test]
    fn test_rising_index_bends_outward() {
        let field = lens_field()
            .to_builder()
            .with_ior(1.0, 1.6)
            .build()
            .unwrap();
        let outcome = Rk4Stepper::new().integrate(&field, DVec3::new(0.0, 2.0, -9.0), DVec3::Z);
        assert!(outcome.direction.y > 0.0);
    }

    #[test]
    fn test_inverted_polarity_mirrors_curvature() {
        let field = GrinField::builder()
            .with_radii(0.0, 10.0)
            .with_ior(1.0, 1.5)
            .with_steps(0.05, 20)
            .build()
            .unwrap();
        let inverted = field.to_builder().with_invert_polarity(true).build().unwrap();

        // Start where the gradient is perpendicular to the ray
        let start = DVec3::new(0.0, 3.0, 0.0);
        let stepper = Rk4Stepper::new().with_path_recording(true);
        let normal = stepper.integrate(&field, start, DVec3::Z);
        let mirrored = stepper.integrate(&inverted, start, DVec3::Z);

        assert_eq!(normal.steps, mirrored.steps);
        for (a, b) in normal.path.iter().zip(&mirrored.path).skip(1) {
            let dy_a = a.position.y - start.y;
            let dy_b = b.position.y - start.y;
            assert!(dy_a > 0.0 && dy_b < 0.0, "dy {dy_a} vs {dy_b}");
            assert!((dy_a + dy_b).abs() < 0.05 * dy_a.abs());

            assert!(a.direction.y > 0.0 && b.direction.y < 0.0);
            assert!((a.direction.y + b.direction.y).abs() < 0.05 * a.direction.y.abs());
        }
    }

    #[test]
    fn test_random_rays_keep_unit_direction_and_terminate() {
        let field = GrinField::builder()
            .with_radii(0.5, 3.0)
            .with_ior_per_axis(DVec3::new(1.8, 1.2, 1.5), DVec3::new(1.0, 1.6, 1.1))
            .with_gamma(DVec3::new(0.5, 1.5, 3.0))
            .with_profile(ProfileKind::Exponential)
            .with_beta(4.0)
            .with_steps(0.02, 150)
            .build()
            .unwrap();
        let stepper = Rk4Stepper::new().with_path_recording(true);
        let mut rng = StdRng::seed_from_u64(1234);

        for _ in 0..100 {
            let start = DVec3::new(
                rng.gen_range(-2.0..2.0),
                rng.gen_range(-2.0..2.0),
                rng.gen_range(-2.0..2.0),
            );
            let dir = DVec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            let outcome = stepper.integrate(&field, start, dir);

            assert!(outcome.steps <= field.step_limit());
            assert_eq!(outcome.path.len() as u32, outcome.steps + 1);
            for vertex in &outcome.path {
                assert!((vertex.direction.length() - 1.0).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let field = lens_field();
        let stepper = Rk4Stepper::new().with_path_recording(true);
        let start = DVec3::new(1.0, -2.0, -8.0);
        let dir = DVec3::new(0.1, 0.2, 1.0);
        assert_eq!(stepper.integrate(&field, start, dir), stepper.integrate(&field, start, dir));
    }

    #[test]
    fn test_converges_with_step_size() {
        // Same arclength at two step sizes; a 4th-order method barely moves
        let coarse = lens_field().to_builder().with_steps(0.2, 40).build().unwrap();
        let fine = lens_field().to_builder().with_steps(0.1, 80).build().unwrap();
        let stepper = Rk4Stepper::new().with_boundary(Aabb::centered(DVec3::ZERO, 100.0));

        let start = DVec3::new(0.0, 3.0, -4.0);
        let a = stepper.integrate(&coarse, start, DVec3::Z);
        let b = stepper.integrate(&fine, start, DVec3::Z);

        assert_eq!(a.termination, Termination::StepLimitReached);
        assert_eq!(b.termination, Termination::StepLimitReached);
        assert!((a.position - b.position).length() < 1e-4);
    }
}
