//! Sphere primitive for ray tracing.
//!
//! Implements ray-sphere intersection using the optimized quadratic formula.
//! Spheres are the usual stand-in for foliage volumes (tree crowns).

use glam::Vec3A;

use crate::hittable::{Hit, Hittable};
use crate::interval::Interval;
use crate::material::SurfaceKind;
use crate::ray::Ray;

/// Sphere primitive defined by center, radius, and surface kind.
#[derive(Debug, Clone)]
pub struct Sphere {
    /// Center point of the sphere in world coordinates.
    pub center: Vec3A,

    /// Radius of the sphere (always non-negative).
    ///
    /// Negative radius values are clamped to 0.0 in the constructor.
    pub radius: f32,

    /// How the tracer treats hits on this sphere.
    pub surface: SurfaceKind,

    /// Intersection layer.
    pub layer: u8,
}

impl Sphere {
    /// Create a new sphere on layer 0.
    ///
    /// Negative radius values are clamped to 0.0.
    pub fn new(center: Vec3A, radius: f32, surface: SurfaceKind) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
            surface,
            layer: 0,
        }
    }

    /// Move the sphere to another intersection layer.
    pub fn on_layer(mut self, layer: u8) -> Self {
        self.layer = layer;
        self
    }
}

impl Hittable for Sphere {
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<Hit> {
        // Vector from ray origin to sphere center
        let oc = self.center - r.origin;

        let a = r.direction.length_squared();
        let h = r.direction.dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return None;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root that lies in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.accepts(root) {
            root = (h + sqrtd) / a;
            if !ray_t.accepts(root) {
                return None;
            }
        }

        let outward_normal = (r.at(root) - self.center) / self.radius;
        Some(Hit::new(r, root, outward_normal, self.surface))
    }

    fn layer(&self) -> u8 {
        self.layer
    }
}
