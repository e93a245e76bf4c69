//! Axis-aligned box primitive.
//!
//! Boxes stand in for buildings and receiver volumes. Intersection uses the
//! slab method; the reported normal is the face normal of the slab that
//! produced the hit.

use glam::Vec3A;

use crate::hittable::{Hit, Hittable};
use crate::interval::Interval;
use crate::material::SurfaceKind;
use crate::ray::Ray;

/// Axis-aligned box between `min` and `max` corners.
#[derive(Debug, Clone)]
pub struct Cuboid {
    /// Corner with the smallest coordinates.
    pub min: Vec3A,
    /// Corner with the largest coordinates.
    pub max: Vec3A,
    /// How the tracer treats hits on this box.
    pub surface: SurfaceKind,
    /// Intersection layer.
    pub layer: u8,
}

impl Cuboid {
    /// Create a box from two opposite corners, in any order, on layer 0.
    pub fn new(a: Vec3A, b: Vec3A, surface: SurfaceKind) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
            surface,
            layer: 0,
        }
    }

    /// Box centered on `center` with full extents `size`.
    pub fn centered(center: Vec3A, size: Vec3A, surface: SurfaceKind) -> Self {
        let half = size.abs() * 0.5;
        Self::new(center - half, center + half, surface)
    }

    /// Move the box to another intersection layer.
    pub fn on_layer(mut self, layer: u8) -> Self {
        self.layer = layer;
        self
    }

    fn axis_normal(axis: usize) -> Vec3A {
        match axis {
            0 => Vec3A::X,
            1 => Vec3A::Y,
            _ => Vec3A::Z,
        }
    }
}

impl Hittable for Cuboid {
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<Hit> {
        let inv = r.direction.recip();
        let t0 = (self.min - r.origin) * inv;
        let t1 = (self.max - r.origin) * inv;
        let near = t0.min(t1);
        let far = t0.max(t1);

        // Entry is the latest slab entry, exit the earliest slab exit
        let (mut t_enter, mut enter_axis) = (f32::NEG_INFINITY, 0);
        let (mut t_exit, mut exit_axis) = (f32::INFINITY, 0);
        for axis in 0..3 {
            // NaN from a zero direction component on a slab boundary is skipped
            if near[axis] > t_enter {
                t_enter = near[axis];
                enter_axis = axis;
            }
            if far[axis] < t_exit {
                t_exit = far[axis];
                exit_axis = axis;
            }
        }
        if t_enter > t_exit {
            return None;
        }

        let (t, axis) = if ray_t.accepts(t_enter) {
            (t_enter, enter_axis)
        } else if ray_t.accepts(t_exit) {
            (t_exit, exit_axis)
        } else {
            return None;
        };

        // Outward normal of the face on `axis` that contains the hit point
        let center = (self.min + self.max) * 0.5;
        let n = Self::axis_normal(axis);
        let outward_normal = if (r.at(t) - center).dot(n) >= 0.0 { n } else { -n };
        Some(Hit::new(r, t, outward_normal, self.surface))
    }

    fn layer(&self) -> u8 {
        self.layer
    }
}
