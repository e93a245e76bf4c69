//! Per-hit bounce state machine.
//!
//! Each scene hit is classified against the ray's current medium:
//!
//! | surface  | in air     | in foliage |
//! |----------|------------|------------|
//! | receiver | success    | absorbed   |
//! | ground   | reflect    | absorbed   |
//! | foliage  | refract    | refract    |
//! | other    | reflect    | reflect    |
//!
//! A segment is produced for every hit, terminal or not. Refraction toggles
//! the medium and is free; reflection spends one unit of the bounce budget.

use glam::Vec3A;

use crate::hittable::Hit;
use crate::material::SurfaceKind;
use crate::ray::{Ray, RaySegment};
use crate::refraction::{face_against, reflect, refract};

/// Relative permittivity of air.
pub const AIR_PERMITTIVITY: f32 = 1.0;

/// Medium the ray currently travels through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Medium {
    /// Open air.
    #[default]
    InAir,
    /// Inside a foliage volume.
    InFoliage,
}

impl Medium {
    /// The medium on the other side of a foliage boundary.
    pub fn toggled(self) -> Self {
        match self {
            Medium::InAir => Medium::InFoliage,
            Medium::InFoliage => Medium::InAir,
        }
    }
}

/// Foliage parameters needed to refract at a foliage boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoliageOptics {
    /// Relative permittivity of foliage.
    pub permittivity: f32,
    /// Distance the refracted ray is pushed past the boundary.
    pub offset: f32,
}

/// Mutable state of one ray between scene queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceState {
    /// Where the next query starts.
    pub origin: Vec3A,
    /// Unit direction of the next query.
    pub direction: Vec3A,
    /// Distance travelled so far.
    pub total_distance: f32,
    /// Current medium.
    pub medium: Medium,
    /// Scene queries left before the ray times out.
    pub remaining_queries: u32,
    /// Foliage boundaries crossed so far.
    pub foliage_crossings: u32,
}

impl TraceState {
    /// Fresh state for a ray leaving `origin` in `direction` through air.
    ///
    /// The ray may reflect `number_of_reflections` times, so it gets one
    /// more scene query than that.
    pub fn new(origin: Vec3A, direction: Vec3A, number_of_reflections: u32) -> Self {
        Self {
            origin,
            direction,
            total_distance: 0.0,
            medium: Medium::InAir,
            remaining_queries: number_of_reflections.saturating_add(1),
            foliage_crossings: 0,
        }
    }

    /// Ray for the next scene query.
    pub fn ray(&self) -> Ray {
        Ray::new(self.origin, self.direction)
    }

    /// True while the ray is inside a foliage volume.
    pub fn in_foliage(&self) -> bool {
        self.medium == Medium::InFoliage
    }
}

/// Why a ray was absorbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Absorption {
    /// Reached the receiver while still inside foliage.
    ReceiverInFoliage,
    /// Struck the ground while inside foliage.
    GroundInFoliage,
}

/// Result of classifying one hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BounceOutcome {
    /// Reached the receiver through air. The path is committed.
    Success,
    /// Lost. The path is discarded.
    Absorbed(Absorption),
    /// Crossed a foliage boundary; continue with the new state.
    Refract(TraceState),
    /// Bounced off an opaque surface; continue with the new state.
    Reflect(TraceState),
}

impl BounceOutcome {
    /// True for success and absorption.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BounceOutcome::Success | BounceOutcome::Absorbed(_))
    }
}

/// A classified hit: the segment it produced and what happens next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    /// Segment from the state's origin to the hit.
    pub segment: RaySegment,
    /// Transition taken.
    pub outcome: BounceOutcome,
}

/// Classify `hit`, struck by the ray described by `state`.
pub fn classify(state: &TraceState, hit: &Hit, foliage: &FoliageOptics) -> Classification {
    let total_distance = state.total_distance + hit.distance;
    let segment = RaySegment {
        origin: state.origin,
        direction: state.direction,
        hit_point: hit.point,
        hit_normal: hit.normal,
        total_distance,
        ray_distance: hit.distance,
        hit_tag: hit.surface.tag(),
    };

    let outcome = match (hit.surface, state.medium) {
        (SurfaceKind::Receiver, Medium::InAir) => BounceOutcome::Success,
        (SurfaceKind::Receiver, Medium::InFoliage) => {
            BounceOutcome::Absorbed(Absorption::ReceiverInFoliage)
        }
        (SurfaceKind::Ground, Medium::InFoliage) => {
            BounceOutcome::Absorbed(Absorption::GroundInFoliage)
        }
        (SurfaceKind::Foliage, medium) => {
            let (eps_in, eps_out) = match medium {
                Medium::InAir => (foliage.permittivity, AIR_PERMITTIVITY),
                Medium::InFoliage => (AIR_PERMITTIVITY, foliage.permittivity),
            };
            let normal = face_against(hit.normal, state.direction);
            let direction = refract(state.direction, normal, eps_in, eps_out);
            BounceOutcome::Refract(TraceState {
                origin: hit.point + direction * foliage.offset,
                direction,
                total_distance,
                medium: medium.toggled(),
                remaining_queries: state.remaining_queries,
                foliage_crossings: state.foliage_crossings + 1,
            })
        }
        (SurfaceKind::Ground | SurfaceKind::Opaque { .. }, _) => {
            BounceOutcome::Reflect(TraceState {
                origin: hit.point,
                direction: reflect(state.direction, hit.normal),
                total_distance,
                medium: state.medium,
                remaining_queries: state.remaining_queries.saturating_sub(1),
                foliage_crossings: state.foliage_crossings,
            })
        }
    };

    Classification { segment, outcome }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const OPTICS: FoliageOptics = FoliageOptics {
        permittivity: 1.5,
        offset: 0.01,
    };

    fn hit_at(distance: f32, surface: SurfaceKind) -> Hit {
        Hit {
            point: Vec3A::new(0.0, 0.0, distance),
            normal: -Vec3A::Z,
            distance,
            front_face: true,
            surface,
        }
    }

    fn state(medium: Medium) -> TraceState {
        TraceState {
            medium,
            ..TraceState::new(Vec3A::ZERO, Vec3A::Z, 3)
        }
    }

    #[test]
    fn new_state_has_one_query_per_reflection_plus_one() {
        let s = TraceState::new(Vec3A::ZERO, Vec3A::Z, 3);
        assert_eq!(s.remaining_queries, 4);
        assert_eq!(s.medium, Medium::InAir);
        assert_eq!(s.total_distance, 0.0);
    }

    #[test]
    fn receiver_in_air_succeeds() {
        let c = classify(&state(Medium::InAir), &hit_at(10.0, SurfaceKind::Receiver), &OPTICS);
        assert_eq!(c.outcome, BounceOutcome::Success);
        assert_eq!(c.segment.hit_tag, 'r');
        assert_eq!(c.segment.ray_distance, 10.0);
        assert_eq!(c.segment.total_distance, 10.0);
    }

    #[test]
    fn receiver_in_foliage_is_absorbed() {
        let c = classify(&state(Medium::InFoliage), &hit_at(2.0, SurfaceKind::Receiver), &OPTICS);
        assert_eq!(c.outcome, BounceOutcome::Absorbed(Absorption::ReceiverInFoliage));
        assert!(c.outcome.is_terminal());
        // The segment is still produced
        assert_eq!(c.segment.hit_tag, 'r');
    }

    #[test]
    fn ground_absorbs_only_inside_foliage() {
        let inside = classify(&state(Medium::InFoliage), &hit_at(1.0, SurfaceKind::Ground), &OPTICS);
        assert_eq!(inside.outcome, BounceOutcome::Absorbed(Absorption::GroundInFoliage));

        let outside = classify(&state(Medium::InAir), &hit_at(1.0, SurfaceKind::Ground), &OPTICS);
        match outside.outcome {
            BounceOutcome::Reflect(next) => {
                assert_eq!(next.direction, -Vec3A::Z);
                assert_eq!(next.remaining_queries, 3);
            }
            other => panic!("expected reflection, got {other:?}"),
        }
    }

    #[test]
    fn opaque_reflects_and_spends_budget() {
        let mut s = state(Medium::InAir);
        s.total_distance = 4.0;
        let c = classify(&s, &hit_at(3.0, SurfaceKind::Opaque { tag: 'w' }), &OPTICS);
        let BounceOutcome::Reflect(next) = c.outcome else {
            panic!("expected reflection");
        };
        assert_eq!(next.origin, Vec3A::new(0.0, 0.0, 3.0));
        assert_eq!(next.direction, -Vec3A::Z);
        assert_eq!(next.total_distance, 7.0);
        assert_eq!(next.remaining_queries, s.remaining_queries - 1);
        assert_eq!(c.segment.total_distance, 7.0);
        assert_eq!(c.segment.ray_distance, 3.0);
        assert_eq!(c.segment.hit_tag, 'w');
    }

    #[test]
    fn foliage_refracts_for_free_and_toggles_medium() {
        let s = state(Medium::InAir);
        let c = classify(&s, &hit_at(2.0, SurfaceKind::Foliage), &OPTICS);
        let BounceOutcome::Refract(next) = c.outcome else {
            panic!("expected refraction");
        };
        assert_eq!(next.medium, Medium::InFoliage);
        assert_eq!(next.remaining_queries, s.remaining_queries);
        assert_eq!(next.foliage_crossings, 1);
        assert_eq!(next.total_distance, 2.0);
        // Normal incidence: straight through, pushed past the boundary
        assert_abs_diff_eq!(next.direction.z, 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(next.origin.z, 2.01, epsilon = 1e-6);

        let back = classify(&next, &hit_at(1.0, SurfaceKind::Foliage), &OPTICS);
        let BounceOutcome::Refract(after) = back.outcome else {
            panic!("expected refraction");
        };
        assert_eq!(after.medium, Medium::InAir);
        assert_eq!(after.foliage_crossings, 2);
    }

    #[test]
    fn foliage_refraction_handles_normal_facing_along_ray() {
        let mut hit = hit_at(2.0, SurfaceKind::Foliage);
        hit.normal = Vec3A::Z;
        let d = Vec3A::new(0.2, 0.0, 1.0).normalize();
        let s = TraceState::new(Vec3A::ZERO, d, 1);
        let BounceOutcome::Refract(next) = classify(&s, &hit, &OPTICS).outcome else {
            panic!("expected refraction");
        };
        // Keeps travelling forward through the boundary
        assert!(next.direction.z > 0.0);
        assert_abs_diff_eq!(next.direction.length(), 1.0, epsilon = 1e-5);
    }
}
