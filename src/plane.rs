//! Infinite plane primitive.
//!
//! Planes model ground and flat receivers. The plane is two-sided: a hit
//! from either side is reported with the normal facing the ray.

use glam::Vec3A;

use crate::hittable::{Hit, Hittable};
use crate::interval::Interval;
use crate::material::SurfaceKind;
use crate::ray::Ray;

/// Plane through `point` with unit `normal`.
#[derive(Debug, Clone)]
pub struct Plane {
    /// Any point on the plane.
    pub point: Vec3A,
    /// Unit normal, normalized in the constructor.
    pub normal: Vec3A,
    /// How the tracer treats hits on this plane.
    pub surface: SurfaceKind,
    /// Intersection layer.
    pub layer: u8,
}

impl Plane {
    /// Create a plane on layer 0.
    pub fn new(point: Vec3A, normal: Vec3A, surface: SurfaceKind) -> Self {
        Self {
            point,
            normal: normal.normalize(),
            surface,
            layer: 0,
        }
    }

    /// Move the plane to another intersection layer.
    pub fn on_layer(mut self, layer: u8) -> Self {
        self.layer = layer;
        self
    }
}

impl Hittable for Plane {
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<Hit> {
        let denom = r.direction.dot(self.normal);
        // Parallel rays never hit
        if denom.abs() < 1e-8 {
            return None;
        }

        let t = (self.point - r.origin).dot(self.normal) / denom;
        if !ray_t.accepts(t) {
            return None;
        }

        Some(Hit::new(r, t, self.normal, self.surface))
    }

    fn layer(&self) -> u8 {
        self.layer
    }
}
