//! Sampled IOR curves for preview display.

use glam::DVec3;

use crate::field::GrinField;

/// Number of radius samples used by the node preview.
pub const DEFAULT_PREVIEW_SAMPLES: usize = 64;

/// One point on the IOR-versus-radius curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveSample {
    pub radius: f64,
    pub ior: DVec3,
}

/// Sweep `samples` radii evenly over `0..=r_outer` and evaluate the field.
pub fn sample_curve(field: &GrinField, samples: usize) -> Vec<CurveSample> {
    let last = samples.saturating_sub(1).max(1) as f64;
    (0..samples)
        .map(|i| {
            let radius = i as f64 / last * field.r_outer();
            CurveSample {
                radius,
                ior: field.index_at_radius(radius).ior,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ProfileKind;

    #[test]
    fn test_sweep_covers_full_radius() {
        let field = GrinField::builder()
            .with_radii(2.0, 8.0)
            .with_ior(1.0, 1.6)
            .build()
            .unwrap();

        let curve = sample_curve(&field, DEFAULT_PREVIEW_SAMPLES);
        assert_eq!(curve.len(), 64);
        assert_eq!(curve[0].radius, 0.0);
        assert_eq!(curve[63].radius, 8.0);

        // Flat inside the inner radius, outer value at the end
        assert_eq!(curve[0].ior, DVec3::ONE);
        assert_eq!(curve[63].ior, DVec3::splat(1.6));
    }

    #[test]
    fn test_sweep_small_counts() {
        let field = GrinField::builder().with_profile(ProfileKind::Radial).build().unwrap();
        assert!(sample_curve(&field, 0).is_empty());

        let single = sample_curve(&field, 1);
        assert_eq!(single.len(), 1);
        assert_eq!(single[0].radius, 0.0);
    }
}
