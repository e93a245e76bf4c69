//! Simulation driver.
//!
//! Casts the configured number of rays from the transmitter, each in a
//! direction drawn beforehand from a [`DirectionSampler`], and forwards every
//! committed path to a [`PathRecorder`]. Rays are independent, so they can
//! be traced on the rayon pool; committed paths are then recorded in ray
//! order, which keeps the output identical to a sequential run.

use std::time::{Duration, Instant};

use glam::Vec3A;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use rayon::prelude::*;

use crate::classifier::Absorption;
use crate::config::SimulationConfig;
use crate::error::Result;
use crate::hittable::SceneOracle;
use crate::random::DirectionSampler;
use crate::ray::RayPath;
use crate::recorder::PathRecorder;
use crate::tracer::{PathTracer, TraceOutcome};

/// Tally of how traced rays ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    /// Rays that reached the receiver.
    pub committed: usize,
    /// Rays that hit the receiver from inside foliage.
    pub absorbed_at_receiver: usize,
    /// Rays that hit the ground from inside foliage.
    pub absorbed_by_ground: usize,
    /// Rays that left the scene.
    pub escaped: usize,
    /// Rays that ran out of bounces.
    pub exhausted: usize,
}

impl OutcomeCounts {
    fn add(&mut self, outcome: TraceOutcome) {
        match outcome {
            TraceOutcome::Committed => self.committed += 1,
            TraceOutcome::Absorbed(Absorption::ReceiverInFoliage) => self.absorbed_at_receiver += 1,
            TraceOutcome::Absorbed(Absorption::GroundInFoliage) => self.absorbed_by_ground += 1,
            TraceOutcome::Escaped => self.escaped += 1,
            TraceOutcome::Exhausted => self.exhausted += 1,
        }
    }

    /// Total rays counted.
    pub fn total(&self) -> usize {
        self.committed
            + self.absorbed_at_receiver
            + self.absorbed_by_ground
            + self.escaped
            + self.exhausted
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    /// Rays that reached the receiver and were recorded.
    pub hit_count: usize,
    /// Rays traced.
    pub rays_traced: usize,
    /// Breakdown by outcome.
    pub outcomes: OutcomeCounts,
    /// Wall-clock tracing time, recording included.
    pub elapsed: Duration,
}

/// Runs the ray budget of one configuration against a scene.
pub struct Simulation<'a, O: SceneOracle + ?Sized> {
    scene: &'a O,
    config: &'a SimulationConfig,
}

impl<'a, O: SceneOracle + ?Sized> Simulation<'a, O> {
    /// Create a driver over `scene`.
    pub fn new(scene: &'a O, config: &'a SimulationConfig) -> Self {
        Self { scene, config }
    }

    /// Trace `config.number_of_rays` rays from `transmitter`.
    ///
    /// All directions are drawn from `sampler` before the first ray is
    /// traced. Committed paths reach `recorder` with increasing indices
    /// starting at 0, and the recorder is flushed once tracing is done.
    pub fn run(
        &self,
        transmitter: Vec3A,
        sampler: &mut dyn DirectionSampler,
        recorder: &mut dyn PathRecorder,
    ) -> Result<SimulationResult> {
        let directions = sampler.sample_batch(self.config.number_of_rays);

        info!(
            "Tracing {} rays from {:?} ({} reflections max, {})",
            directions.len(),
            transmitter,
            self.config.number_of_reflections,
            if self.config.parallel {
                format!("{} threads", rayon::current_num_threads())
            } else {
                "sequential".to_string()
            }
        );
        let start = Instant::now();
        let pb = self.progress_bar(directions.len());

        let outcomes = if self.config.parallel {
            self.trace_parallel(transmitter, &directions, recorder, &pb)?
        } else {
            self.trace_sequential(transmitter, &directions, recorder, &pb)?
        };

        pb.finish();
        recorder.flush()?;
        let elapsed = start.elapsed();
        info!(
            "Traced {} rays in {:.2?}: {} hits",
            directions.len(),
            elapsed,
            outcomes.committed
        );
        debug!("Outcomes: {outcomes:?}");

        Ok(SimulationResult {
            hit_count: outcomes.committed,
            rays_traced: directions.len(),
            outcomes,
            elapsed,
        })
    }

    fn progress_bar(&self, len: usize) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(len as u64);
        if let Ok(style) = ProgressStyle::default_bar().template("{bar:40} {pos}/{len} ETA: {eta}") {
            pb.set_style(style);
        }
        pb
    }

    fn path_capacity(&self) -> usize {
        self.config.number_of_reflections as usize + 1
    }

    fn trace_sequential(
        &self,
        transmitter: Vec3A,
        directions: &[Vec3A],
        recorder: &mut dyn PathRecorder,
        pb: &ProgressBar,
    ) -> Result<OutcomeCounts> {
        let tracer = PathTracer::new(self.scene, self.config);
        let mut path = RayPath::with_capacity(self.path_capacity());
        let mut counts = OutcomeCounts::default();

        for &direction in directions {
            let outcome = tracer.trace_into(transmitter, direction, &mut path);
            if outcome.is_committed() {
                recorder.record(counts.committed, &path)?;
            }
            counts.add(outcome);
            pb.inc(1);
        }

        Ok(counts)
    }

    fn trace_parallel(
        &self,
        transmitter: Vec3A,
        directions: &[Vec3A],
        recorder: &mut dyn PathRecorder,
        pb: &ProgressBar,
    ) -> Result<OutcomeCounts> {
        let tracer = PathTracer::new(self.scene, self.config);
        let capacity = self.path_capacity();

        // Each worker reuses one path buffer; only committed paths are copied out
        let traced: Vec<(TraceOutcome, Option<RayPath>)> = directions
            .par_iter()
            .map_init(
                || RayPath::with_capacity(capacity),
                |path, &direction| {
                    let outcome = tracer.trace_into(transmitter, direction, path);
                    pb.inc(1);
                    (outcome, outcome.is_committed().then(|| path.clone()))
                },
            )
            .collect();

        let mut counts = OutcomeCounts::default();
        for (outcome, path) in traced {
            if let Some(path) = path {
                recorder.record(counts.committed, &path)?;
            }
            counts.add(outcome);
        }

        Ok(counts)
    }
}

/// Trace the configured rays against `scene` and return the hit count.
///
/// Directions come from a ChaCha20 sampler seeded with `config.seed`.
pub fn run<O: SceneOracle + ?Sized>(
    scene: &O,
    config: &SimulationConfig,
    transmitter: Vec3A,
    recorder: &mut dyn PathRecorder,
) -> Result<usize> {
    let mut sampler = crate::random::ChaChaSampler::new(config.seed);
    let result = Simulation::new(scene, config).run(transmitter, &mut sampler, recorder)?;
    Ok(result.hit_count)
}
