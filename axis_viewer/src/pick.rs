//! Ray picking seam. The host renderer owns the actual intersection query;
//! the drag controllers only consume its results.

use glam::DVec3;

/// Pointer ray in render-space world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    /// Unit direction.
    pub direction: DVec3,
}

impl Ray {
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn point_at(&self, distance: f64) -> DVec3 {
        self.origin + self.direction * distance
    }
}

/// One mesh intersection reported by the host renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    /// Body owning the intersected mesh. Body 0 is the ground/world body.
    pub body_id: i32,
    pub distance: f64,
}

/// The host renderer's ray-intersection query. Hits are returned nearest
/// first.
pub trait RayCaster {
    fn intersect(&self, ray: &Ray) -> Vec<PickHit>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_at_walks_the_normalized_direction() {
        let ray = Ray::new(DVec3::new(1.0, 0.0, 0.0), DVec3::new(0.0, 3.0, 0.0));
        assert_eq!(ray.point_at(2.0), DVec3::new(1.0, 2.0, 0.0));
    }
}
