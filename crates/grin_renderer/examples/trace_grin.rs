//! GRIN lens example.
//!
//! Traces a fan of parallel rays through a spherical gradient-index lens,
//! prints where each one leaves, then dumps the field's engine properties
//! and an ASCII plot of its IOR curve.
//!
//! Run with `RUST_LOG=debug` to see field and batch logging.

use grin_renderer::{
    parallel_rays, BatchSummary, DVec3, GrinField, PreviewImage, ProfileKind, Rk4Stepper,
};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("GRIN Ray Tracer - Lens Example");
    println!("==============================");

    let field = GrinField::builder()
        .with_radii(0.5, 5.0)
        .with_ior(1.8, 1.0)
        .with_profile(ProfileKind::Power)
        .with_uniform_gamma(1.5)
        .with_beta(1.0)
        .with_steps(0.02, 2000)
        .build()?;

    let rays = parallel_rays(DVec3::new(0.0, 0.0, -4.9), DVec3::Z, DVec3::Y, 3.0, 13);
    let stepper = Rk4Stepper::new();

    let start = std::time::Instant::now();
    let outcomes = stepper.integrate_batch(&field, &rays);
    println!("Traced {} rays in {:?}", rays.len(), start.elapsed());

    for (ray, outcome) in rays.iter().zip(&outcomes) {
        let exit = outcome.exit_ray();
        println!(
            "  y0 = {:+.2}  {:?} after {:4} steps ({:.2} units)  \
             exit ({:+.3}, {:+.3}, {:+.3})  dir ({:+.3}, {:+.3}, {:+.3})",
            ray.origin.y,
            outcome.termination,
            outcome.steps,
            outcome.distance(&field),
            exit.origin.x,
            exit.origin.y,
            exit.origin.z,
            exit.direction.x,
            exit.direction.y,
            exit.direction.z,
        );
    }

    let summary = BatchSummary::from_outcomes(&outcomes);
    println!(
        "{} exited, {} hit the step limit, {} degenerate",
        summary.exited, summary.step_limited, summary.degenerate
    );

    println!();
    println!("Engine properties:");
    println!("{}", serde_json::to_string_pretty(&field.to_properties())?);

    println!();
    println!("IOR curve (center left, outer radius right):");
    let preview = PreviewImage::render(&field, 48, 12);
    for y in 0..preview.height {
        let line: String = (0..preview.width)
            .map(|x| if preview.get(x, y).w > 0.0 { '*' } else { '.' })
            .collect();
        println!("  {line}");
    }

    Ok(())
}
