use crate::{DVec3, Interval};

/// Axis-aligned bounding box, used as a caller-defined bounding volume for
/// path integration.
///
/// An AABB is defined by three intervals (one per axis) that bound a 3D volume.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub x: Interval,
    pub y: Interval,
    pub z: Interval,
}

impl Aabb {
    /// Create a new AABB from three intervals.
    pub fn new(x: Interval, y: Interval, z: Interval) -> Self {
        let mut aabb = Self { x, y, z };
        aabb.pad_to_minimums();
        aabb
    }

    /// Create an AABB from two corner points.
    pub fn from_points(a: DVec3, b: DVec3) -> Self {
        Self::new(
            Interval::spanning(a.x, b.x),
            Interval::spanning(a.y, b.y),
            Interval::spanning(a.z, b.z),
        )
    }

    /// Create a cube centered on `center` with the given half extent.
    pub fn centered(center: DVec3, half_extent: f64) -> Self {
        let h = DVec3::splat(half_extent.abs());
        Self::from_points(center - h, center + h)
    }

    /// Returns true if the point lies inside or on the box.
    pub fn contains(&self, p: DVec3) -> bool {
        self.x.contains(p.x) && self.y.contains(p.y) && self.z.contains(p.z)
    }

    /// Pad intervals to avoid zero-width AABBs (degenerate cases).
    fn pad_to_minimums(&mut self) {
        let delta = 0.0001;
        if self.x.size() < delta {
            self.x = self.x.expand(delta);
        }
        if self.y.size() < delta {
            self.y = self.y.expand(delta);
        }
        if self.z.size() < delta {
            self.z = self.z.expand(delta);
        }
    }

    pub const UNIVERSE: Aabb = Aabb {
        x: Interval::UNIVERSE,
        y: Interval::UNIVERSE,
        z: Interval::UNIVERSE,
    };
}
