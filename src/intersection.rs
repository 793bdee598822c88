// src/intersection.rs

use glam::Vec3;

/// Bounding circle of a room, used as the overlap proxy during placement.
///
/// Coarser than an exact polygon test: two circles that overlap may belong to
/// polygons that do not.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingCircle {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingCircle {
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Centers closer than the sum of radii. Touching circles do not intersect.
    #[inline(always)]
    pub fn intersects(&self, other: &BoundingCircle) -> bool {
        self.center.distance(other.center) < self.radius + other.radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_circles_intersect() {
        let a = BoundingCircle::new(Vec3::ZERO, 2.0);
        let b = BoundingCircle::new(Vec3::new(3.0, 0.0, 0.0), 2.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn tangent_circles_do_not_intersect() {
        let a = BoundingCircle::new(Vec3::ZERO, 1.5);
        let b = BoundingCircle::new(Vec3::new(0.0, 0.0, 4.0), 2.5);
        assert!(!a.intersects(&b));
    }

    #[test]
    fn height_difference_counts() {
        let a = BoundingCircle::new(Vec3::ZERO, 1.0);
        let b = BoundingCircle::new(Vec3::new(1.0, 5.0, 0.0), 1.0);
        assert!(!a.intersects(&b));
    }
}
