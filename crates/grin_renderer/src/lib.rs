//! GRIN Renderer - curved-ray integration through gradient-index fields
//!
//! Traces rays through a [`GrinField`] with a fixed-step fourth-order
//! Runge-Kutta integrator, in parallel over batches, and rasterizes the
//! field's IOR curve for preview display.

mod batch;
mod boundary;
mod preview;
mod stepper;

pub use batch::{parallel_rays, BatchSummary};
pub use boundary::{Boundary, SphereBoundary};
pub use preview::PreviewImage;
pub use stepper::{
    ray_derivative, PathVertex, RayPathState, Rk4Stepper, TerminalOutcome, Termination,
    DEFAULT_DEGENERATE_EPSILON,
};

/// Re-export field types from grin_core
pub use grin_core::{GrinError, GrinField, GrinFieldBuilder, GrinResult, ProfileKind};

/// Re-export DVec3 and common math types from grin_math
pub use grin_math::{Aabb, DVec3, Ray};
