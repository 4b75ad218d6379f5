//! Parallel integration of many independent rays.
//!
//! Rays share only the immutable field and stepper, so they are spread
//! across rayon's thread pool with no locking.

use grin_core::GrinField;
use grin_math::{DVec3, Ray};
use rayon::prelude::*;

use crate::stepper::{Rk4Stepper, TerminalOutcome, Termination};

/// Counts of how a batch of rays terminated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub exited: usize,
    pub step_limited: usize,
    pub degenerate: usize,
    /// Sum of steps over all rays
    pub total_steps: u64,
}

impl BatchSummary {
    /// Tally a set of outcomes.
    pub fn from_outcomes(outcomes: &[TerminalOutcome]) -> Self {
        outcomes.iter().fold(Self::default(), |mut summary, outcome| {
            match outcome.termination {
                Termination::Exited => summary.exited += 1,
                Termination::StepLimitReached => summary.step_limited += 1,
                Termination::Degenerate => summary.degenerate += 1,
            }
            summary.total_steps += u64::from(outcome.steps);
            summary
        })
    }

    /// Total number of rays.
    pub fn ray_count(&self) -> usize {
        self.exited + self.step_limited + self.degenerate
    }
}

impl Rk4Stepper {
    /// Integrate every ray in parallel. Outcomes are in input order.
    pub fn integrate_batch(&self, field: &GrinField, rays: &[Ray]) -> Vec<TerminalOutcome> {
        let outcomes: Vec<TerminalOutcome> = rays
            .par_iter()
            .map(|ray| self.integrate_ray(field, ray))
            .collect();

        let summary = BatchSummary::from_outcomes(&outcomes);
        log::debug!(
            "Integrated {} rays: {} exited, {} hit step limit, {} degenerate ({} steps total)",
            summary.ray_count(),
            summary.exited,
            summary.step_limited,
            summary.degenerate,
            summary.total_steps
        );
        if summary.degenerate > 0 {
            log::warn!(
                "{} of {} rays hit a degenerate direction",
                summary.degenerate,
                summary.ray_count()
            );
        }

        outcomes
    }
}

/// A sheet of parallel rays along `direction`, spread along `spread` over
/// `-half_width..=half_width` about `origin`.
pub fn parallel_rays(
    origin: DVec3,
    direction: DVec3,
    spread: DVec3,
    half_width: f64,
    count: usize,
) -> Vec<Ray> {
    let last = count.saturating_sub(1).max(1) as f64;
    (0..count)
        .map(|i| {
            let offset = if count == 1 {
                0.0
            } else {
                -half_width + 2.0 * half_width * i as f64 / last
            };
            Ray::new(origin + spread * offset, direction)
        })
        .collect()
}
