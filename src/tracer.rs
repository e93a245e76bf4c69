//! Single-ray bounce loop.
//!
//! [`PathTracer`] repeatedly queries the scene from the ray's current state,
//! hands each hit to [`classify`] and appends the resulting segment to the
//! path until the ray succeeds, is absorbed, escapes the scene or runs out
//! of budget. Only a success leaves the path meaningful; every other outcome
//! is an ordinary non-event and the caller simply ignores the path.

use glam::Vec3A;
use log::trace;

use crate::classifier::{Absorption, BounceOutcome, FoliageOptics, TraceState, classify};
use crate::config::SimulationConfig;
use crate::hittable::SceneOracle;
use crate::ray::RayPath;

/// How a traced ray ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceOutcome {
    /// Reached the receiver through air; the path should be recorded.
    Committed,
    /// Absorbed inside foliage.
    Absorbed(Absorption),
    /// A query found nothing within the maximum ray distance.
    Escaped,
    /// Bounce budget or foliage crossing limit used up.
    Exhausted,
}

impl TraceOutcome {
    /// True if the path reached the receiver.
    pub fn is_committed(&self) -> bool {
        matches!(self, TraceOutcome::Committed)
    }
}

/// Traces rays through a scene under one configuration.
pub struct PathTracer<'a, O: SceneOracle + ?Sized> {
    scene: &'a O,
    config: &'a SimulationConfig,
    foliage: FoliageOptics,
}

impl<'a, O: SceneOracle + ?Sized> PathTracer<'a, O> {
    /// Create a tracer over `scene`.
    pub fn new(scene: &'a O, config: &'a SimulationConfig) -> Self {
        Self {
            scene,
            config,
            foliage: FoliageOptics {
                permittivity: config.foliage_permittivity,
                offset: config.foliage_offset,
            },
        }
    }

    /// Trace one ray from `origin` along unit `direction`, writing its
    /// segments into `path`.
    ///
    /// `path` is cleared first. Its contents are only meaningful when the
    /// result is [`TraceOutcome::Committed`].
    pub fn trace_into(&self, origin: Vec3A, direction: Vec3A, path: &mut RayPath) -> TraceOutcome {
        path.clear();
        let mut state = TraceState::new(origin, direction, self.config.number_of_reflections);

        while state.remaining_queries > 0 {
            let Some(hit) = self.scene.cast_ray(
                &state.ray(),
                self.config.max_ray_distance,
                self.config.layer_mask,
            ) else {
                trace!("ray escaped after {} segments", path.len());
                return TraceOutcome::Escaped;
            };

            let classification = classify(&state, &hit, &self.foliage);
            path.push(classification.segment);

            match classification.outcome {
                BounceOutcome::Success => return TraceOutcome::Committed,
                BounceOutcome::Absorbed(cause) => {
                    trace!("ray absorbed ({cause:?}) after {} segments", path.len());
                    return TraceOutcome::Absorbed(cause);
                }
                BounceOutcome::Refract(next) => {
                    if next.foliage_crossings > self.config.max_foliage_crossings {
                        trace!("ray trapped in foliage after {} crossings", next.foliage_crossings);
                        return TraceOutcome::Exhausted;
                    }
                    state = next;
                }
                BounceOutcome::Reflect(next) => state = next,
            }
        }

        TraceOutcome::Exhausted
    }

    /// Trace one ray into a fresh path.
    ///
    /// Returns whether the path was committed along with the path itself.
    pub fn trace(&self, origin: Vec3A, direction: Vec3A) -> (bool, RayPath) {
        let mut path = RayPath::with_capacity(self.config.number_of_reflections as usize + 1);
        let committed = self.trace_into(origin, direction, &mut path).is_committed();
        (committed, path)
    }
}
