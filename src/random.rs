//! Random direction sampling.
//!
//! Provides uniform sampling on the unit sphere with a ChaCha20 PRNG,
//! seeded explicitly for reproducible runs or from the thread RNG.

use glam::Vec3A;
use rand::{Rng, SeedableRng, rng};
use rand_chacha::ChaCha20Rng;

/// Source of unit directions, uniform over the sphere.
pub trait DirectionSampler {
    /// Draw one unit direction.
    fn sample_unit_sphere(&mut self) -> Vec3A;

    /// Draw `count` independent directions.
    fn sample_batch(&mut self, count: usize) -> Vec<Vec3A> {
        (0..count).map(|_| self.sample_unit_sphere()).collect()
    }
}

/// Map two uniform numbers in [0, 1) to a point on the unit sphere.
///
/// Uniform azimuth plus uniform cosine of the polar angle gives an
/// area-uniform distribution.
fn unit_vector_from(u: f32, v: f32) -> Vec3A {
    // Generate uniform θ in [0, 2π)
    let theta = 2.0 * std::f32::consts::PI * u;

    // Generate uniform cos(φ) in [-1, 1] for proper sphere distribution
    let cos_phi = 2.0 * v - 1.0;
    let sin_phi = (1.0 - cos_phi * cos_phi).max(0.0).sqrt();

    Vec3A::new(sin_phi * theta.cos(), sin_phi * theta.sin(), cos_phi)
}

/// Seedable sphere sampler backed by ChaCha20.
#[derive(Debug, Clone)]
pub struct ChaChaSampler {
    rng: ChaCha20Rng,
}

impl ChaChaSampler {
    /// Sampler with a fixed seed; equal seeds give equal sequences.
    pub fn seed_from_u64(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
        }
    }

    /// Sampler seeded from the thread RNG.
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha20Rng::from_rng(&mut rng()),
        }
    }

    /// Seeded when `seed` is set, random otherwise.
    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seed_from_u64)
    }
}

impl DirectionSampler for ChaChaSampler {
    fn sample_unit_sphere(&mut self) -> Vec3A {
        let u = self.rng.random::<f32>();
        let v = self.rng.random::<f32>();
        unit_vector_from(u, v)
    }
}
