//! Foliage-aware signal path tracer
//!
//! Casts stochastic rays from a transmitter, reflects them off opaque
//! surfaces and refracts them through foliage volumes, and records every hop
//! of each ray that reaches the receiver.

#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod classifier;
pub mod config;
pub mod cuboid;
pub mod error;
pub mod hittable;
pub mod interval;
pub mod material;
pub mod plane;
pub mod random;
pub mod ray;
pub mod recorder;
pub mod refraction;
pub mod simulation;
pub mod sphere;
pub mod tracer;

pub use config::{ConfigFile, SimulationConfig};
pub use error::{Error, Result};
pub use hittable::{Hit, Hittable, Scene, SceneOracle};
pub use material::{LayerMask, SurfaceKind};
pub use ray::{Ray, RayPath, RaySegment};
pub use simulation::{Simulation, SimulationResult};
pub use tracer::{PathTracer, TraceOutcome};
