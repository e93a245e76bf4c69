//! Interval arithmetic for ray parameter ranges.
//!
//! Scene queries accept hits whose distance lies in the half-open interval
//! `(min, max]`: `min` keeps a ray from re-hitting the surface it starts on,
//! `max` is the configured maximum ray distance and is itself reachable.

/// Interval (min, max] for hit distance checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    /// Minimum value of the interval
    pub min: f32,
    /// Maximum value of the interval
    pub max: f32,
}

impl Interval {
    /// Create a new interval with given min and max values
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Check if a hit at distance `x` is accepted: above `min`, at most `max`
    pub fn accepts(&self, x: f32) -> bool {
        self.min < x && x <= self.max
    }

    /// Same interval with `max` replaced, used to narrow the search to the
    /// closest hit found so far.
    pub fn with_max(self, max: f32) -> Self {
        Self { max, ..self }
    }
}
