//! Ray-object intersection system.
//!
//! Defines the [`Hittable`] trait for geometric primitives, the [`Hit`]
//! record they produce and the [`SceneOracle`] query the tracer consumes.
//! [`Scene`] is a linear-search oracle over boxed primitives, enough for
//! synthetic scenes and tests; any acceleration structure can stand in by
//! implementing [`SceneOracle`].

use glam::Vec3A;

use crate::interval::Interval;
use crate::material::{LayerMask, SurfaceKind};
use crate::ray::Ray;

/// Ray-object intersection information.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Point where the ray intersects the object
    pub point: Vec3A,
    /// Surface normal at the intersection point (unit vector, against the ray)
    pub normal: Vec3A,
    /// Distance along the ray to the intersection point
    pub distance: f32,
    /// True if ray hits the front face, false if hits the back face
    pub front_face: bool,
    /// Material category of the struck surface
    pub surface: SurfaceKind,
}

impl Hit {
    /// Build a hit at parameter `t` along `r`, orienting `outward_normal`
    /// against the incident ray.
    pub fn new(r: &Ray, t: f32, outward_normal: Vec3A, surface: SurfaceKind) -> Self {
        // Front face when ray and outward normal point in opposite directions
        let front_face = r.direction.dot(outward_normal) < 0.0;
        Self {
            point: r.at(t),
            normal: if front_face {
                outward_normal
            } else {
                -outward_normal
            },
            distance: t,
            front_face,
            surface,
        }
    }
}

/// Trait for objects that can be intersected by rays.
///
/// Must be thread-safe (Sync + Send) so a scene can be queried from the
/// parallel driver.
pub trait Hittable: Sync + Send {
    /// Closest intersection whose distance is accepted by `ray_t`.
    fn hit(&self, r: &Ray, ray_t: Interval) -> Option<Hit>;

    /// Intersection layer the object lives on.
    fn layer(&self) -> u8 {
        0
    }
}

/// Read-only ray-cast query against a scene.
///
/// Implementations return `None` when nothing is hit within `max_distance`
/// (a hit exactly at `max_distance` counts) and must orient the returned normal to face the side the ray struck.
/// Queries may run concurrently.
pub trait SceneOracle: Sync {
    /// Cast `ray` (unit direction) and report the closest hit on a layer
    /// included in `mask`.
    fn cast_ray(&self, ray: &Ray, max_distance: f32, mask: LayerMask) -> Option<Hit>;
}

/// Default lower bound on accepted hit distances.
pub const DEFAULT_MIN_HIT_DISTANCE: f32 = 1e-4;

/// Collection of objects forming a scene.
///
/// Uses linear search for intersection testing.
pub struct Scene {
    /// Vector of boxed hittable objects
    pub objects: Vec<Box<dyn Hittable>>,
    min_hit_distance: f32,
}

impl Scene {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            min_hit_distance: DEFAULT_MIN_HIT_DISTANCE,
        }
    }

    /// Set the smallest hit distance a query accepts.
    ///
    /// Rays restart on the surface they just hit; hits closer than this are
    /// treated as self-intersections and skipped.
    pub fn with_min_hit_distance(mut self, min_hit_distance: f32) -> Self {
        self.min_hit_distance = min_hit_distance;
        self
    }

    /// Add an object to the scene.
    pub fn add(&mut self, object: Box<dyn Hittable>) {
        self.objects.push(object);
    }

    /// Number of objects in the scene.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// True if the scene holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneOracle for Scene {
    fn cast_ray(&self, ray: &Ray, max_distance: f32, mask: LayerMask) -> Option<Hit> {
        let mut closest: Option<Hit> = None;
        let mut ray_t = Interval::new(self.min_hit_distance, max_distance);

        for object in self.objects.iter().filter(|o| mask.includes(o.layer())) {
            if let Some(hit) = object.hit(ray, ray_t) {
                ray_t = ray_t.with_max(hit.distance);
                closest = Some(hit);
            }
        }

        closest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plane::Plane;
    use crate::sphere::Sphere;

    fn two_walls() -> Scene {
        let mut scene = Scene::new();
        scene.add(Box::new(Plane::new(
            Vec3A::new(0.0, 0.0, 5.0),
            Vec3A::Z,
            SurfaceKind::Opaque { tag: 'w' },
        )));
        scene.add(Box::new(
            Plane::new(Vec3A::new(0.0, 0.0, 2.0), Vec3A::Z, SurfaceKind::Ground).on_layer(2),
        ));
        scene
    }

    #[test]
    fn closest_hit_wins() {
        let scene = two_walls();
        let hit = scene
            .cast_ray(&Ray::new(Vec3A::ZERO, Vec3A::Z), 100.0, LayerMask::ALL)
            .unwrap();
        assert_eq!(hit.surface, SurfaceKind::Ground);
        assert_eq!(hit.distance, 2.0);
        assert_eq!(hit.normal, -Vec3A::Z);
        assert!(!hit.front_face);
    }

    #[test]
    fn mask_hides_layers() {
        let scene = two_walls();
        let hit = scene
            .cast_ray(
                &Ray::new(Vec3A::ZERO, Vec3A::Z),
                100.0,
                LayerMask::from_layers(&[0]),
            )
            .unwrap();
        assert_eq!(hit.surface, SurfaceKind::Opaque { tag: 'w' });
    }

    #[test]
    fn max_distance_bounds_query() {
        let scene = two_walls();
        assert!(scene
            .cast_ray(&Ray::new(Vec3A::ZERO, Vec3A::Z), 1.5, LayerMask::ALL)
            .is_none());
        assert!(scene
            .cast_ray(&Ray::new(Vec3A::ZERO, -Vec3A::Z), 100.0, LayerMask::ALL)
            .is_none());
    }

    #[test]
    fn hit_at_max_distance_counts() {
        let scene = two_walls();
        let ray = Ray::new(Vec3A::ZERO, Vec3A::Z);
        let hit = scene.cast_ray(&ray, 2.0, LayerMask::ALL).unwrap();
        assert_eq!(hit.distance, 2.0);
        assert!(scene.cast_ray(&ray, 1.999, LayerMask::ALL).is_none());
    }

    #[test]
    fn starting_on_a_surface_skips_it() {
        let mut scene = Scene::new();
        scene.add(Box::new(Sphere::new(Vec3A::ZERO, 1.0, SurfaceKind::Foliage)));
        // Ray starts on the sphere surface heading inward: only the far side counts.
        let hit = scene
            .cast_ray(
                &Ray::new(Vec3A::new(0.0, 0.0, -1.0), Vec3A::Z),
                100.0,
                LayerMask::ALL,
            )
            .unwrap();
        assert!((hit.distance - 2.0).abs() < 1e-5);
        assert!(!hit.front_face);
    }
}
