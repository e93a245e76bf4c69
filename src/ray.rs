//! Ray representation and recorded ray paths.
//!
//! A ray is defined as r(t) = origin + t * direction. Every successful scene
//! intersection along a traced ray produces one immutable [`RaySegment`]; the
//! segments of a single ray form a [`RayPath`].

use glam::Vec3A;

/// Ray in 3D space defined by origin and direction.
///
/// Mathematical representation: r(t) = origin + t * direction
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Starting point of the ray in world coordinates.
    ///
    /// The transmitter position for the first hop, a surface point for
    /// every later hop.
    pub origin: Vec3A,

    /// Direction vector of the ray.
    ///
    /// Traced rays always carry a unit vector so that `t` equals travelled
    /// distance.
    pub direction: Vec3A,
}

impl Ray {
    /// Create a new ray with origin and direction.
    pub fn new(origin: Vec3A, direction: Vec3A) -> Self {
        Self { origin, direction }
    }

    /// Compute a point at parameter t along the ray.
    ///
    /// Returns r(t) = origin + t * direction.
    pub fn at(&self, t: f32) -> Vec3A {
        self.origin + t * self.direction
    }
}

/// One hop of a traced ray, from its origin to the surface it struck.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaySegment {
    /// Where this hop started.
    pub origin: Vec3A,
    /// Unit direction of travel for this hop.
    pub direction: Vec3A,
    /// Intersection point on the struck surface.
    pub hit_point: Vec3A,
    /// Unit surface normal at the hit, facing the incoming ray.
    pub hit_normal: Vec3A,
    /// Distance travelled from the transmitter up to and including this hop.
    pub total_distance: f32,
    /// Length of this hop alone.
    pub ray_distance: f32,
    /// Single-character tag of the struck surface.
    pub hit_tag: char,
}

/// Ordered segments of one traced ray.
///
/// Built incrementally by the tracer and cleared between rays so the
/// allocation is reused.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RayPath {
    segments: Vec<RaySegment>,
}

impl RayPath {
    /// Create an empty path.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty path with room for `capacity` segments.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            segments: Vec::with_capacity(capacity),
        }
    }

    /// Drop all segments, keeping the allocation.
    pub fn clear(&mut self) {
        self.segments.clear();
    }

    /// Append a segment.
    pub fn push(&mut self, segment: RaySegment) {
        self.segments.push(segment);
    }

    /// Recorded segments in travel order.
    pub fn segments(&self) -> &[RaySegment] {
        &self.segments
    }

    /// Most recent segment, if any.
    pub fn last(&self) -> Option<&RaySegment> {
        self.segments.last()
    }

    /// Number of recorded segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True when no segment has been recorded.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Total distance travelled along the path, zero when empty.
    pub fn total_distance(&self) -> f32 {
        self.last().map_or(0.0, |s| s.total_distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(total: f32, length: f32) -> RaySegment {
        RaySegment {
            origin: Vec3A::ZERO,
            direction: Vec3A::Z,
            hit_point: Vec3A::new(0.0, 0.0, length),
            hit_normal: -Vec3A::Z,
            total_distance: total,
            ray_distance: length,
            hit_tag: 'w',
        }
    }

    #[test]
    fn ray_at_walks_along_direction() {
        let r = Ray::new(Vec3A::new(1.0, 2.0, 3.0), Vec3A::X);
        assert_eq!(r.at(2.5), Vec3A::new(3.5, 2.0, 3.0));
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut path = RayPath::with_capacity(8);
        path.push(segment(1.0, 1.0));
        path.push(segment(3.0, 2.0));
        assert_eq!(path.len(), 2);
        assert_eq!(path.total_distance(), 3.0);

        let capacity = path.segments.capacity();
        path.clear();
        assert!(path.is_empty());
        assert_eq!(path.total_distance(), 0.0);
        assert_eq!(path.segments.capacity(), capacity);
    }
}
