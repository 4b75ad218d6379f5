//! GRIN Core - gradient-index field parameters and evaluation.
//!
//! This crate provides:
//!
//! - **Field parameters**: `GrinField` (immutable, validated) and its builder
//! - **Profile evaluation**: refractive index and analytic gradient at a
//!   position or radius
//! - **Engine export**: flat `grin.*` property maps, both directions
//! - **Preview curves**: sampled IOR-versus-radius sweeps
//!
//! # Example
//!
//! ```
//! use grin_core::{GrinField, ProfileKind};
//!
//! let field = GrinField::builder()
//!     .with_radii(0.0, 10.0)
//!     .with_ior(1.0, 2.0)
//!     .with_profile(ProfileKind::Power)
//!     .with_uniform_gamma(2.0)
//!     .build()?;
//!
//! let sample = field.index_at_radius(5.0);
//! assert!((sample.ior.x - 1.25).abs() < 1e-12);
//! # Ok::<(), grin_core::GrinError>(())
//! ```

pub mod error;
pub mod evaluator;
pub mod export;
pub mod field;
pub mod preview;
pub mod profile;

// Re-export commonly used types
pub use error::{GrinError, GrinResult};
pub use evaluator::{IndexSample, RadialSample};
pub use export::{PropertyMap, PropertyValue};
pub use field::{GrinField, GrinFieldBuilder};
pub use preview::{sample_curve, CurveSample, DEFAULT_PREVIEW_SAMPLES};
pub use profile::ProfileKind;
