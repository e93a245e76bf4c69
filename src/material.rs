//! Surface materials for signal propagation.
//!
//! Every scene object carries a [`SurfaceKind`] that decides how the tracer
//! treats a hit: the receiver ends the ray, foliage refracts it, every other
//! surface is an opaque reflector. Each kind reports a single-character tag
//! that ends up in the recorded path.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Tag recorded for receiver hits.
pub const RECEIVER_TAG: char = 'r';
/// Tag recorded for ground hits.
pub const GROUND_TAG: char = 'g';
/// Tag recorded for foliage hits.
pub const FOLIAGE_TAG: char = 'f';
/// Tags that only the dedicated surface kinds may record.
pub const RESERVED_TAGS: [char; 3] = [RECEIVER_TAG, GROUND_TAG, FOLIAGE_TAG];
/// Tag of an opaque surface whose name yields no usable character.
pub const FALLBACK_TAG: char = 'u';

/// Material category of a scene surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceKind {
    /// The receiving antenna. Ends the ray.
    Receiver,
    /// Terrain. Reflects in air, absorbs inside foliage.
    Ground,
    /// Boundary of a refractive foliage volume.
    Foliage,
    /// Any other opaque reflector, identified by its tag.
    Opaque {
        /// Single-character tag written to the recorded path.
        tag: char,
    },
}

impl SurfaceKind {
    /// Build a surface kind from a scene tag name.
    ///
    /// `"receiver"`, `"ground"` and `"foliage"` map to their dedicated
    /// kinds. Anything else is opaque and tagged with the first alphanumeric
    /// character of its name that is not a reserved tag, so `"roof"` records
    /// `'o'` and never reads as a receiver hit. Names with no such character
    /// get [`FALLBACK_TAG`].
    pub fn from_tag(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "receiver" => SurfaceKind::Receiver,
            "ground" => SurfaceKind::Ground,
            "foliage" => SurfaceKind::Foliage,
            other => SurfaceKind::Opaque {
                tag: other
                    .chars()
                    .find(|c| c.is_alphanumeric() && !RESERVED_TAGS.contains(c))
                    .unwrap_or(FALLBACK_TAG),
            },
        }
    }

    /// Opaque surface with an explicit tag; `None` if the tag is reserved.
    pub fn opaque(tag: char) -> Option<Self> {
        (!RESERVED_TAGS.contains(&tag.to_ascii_lowercase())).then_some(SurfaceKind::Opaque { tag })
    }

    /// True for receiver, ground and foliage, whose tags are fixed.
    pub fn is_dedicated(&self) -> bool {
        !matches!(self, SurfaceKind::Opaque { .. })
    }

    /// Single-character tag recorded for hits on this surface.
    pub fn tag(&self) -> char {
        match self {
            SurfaceKind::Receiver => RECEIVER_TAG,
            SurfaceKind::Ground => GROUND_TAG,
            SurfaceKind::Foliage => FOLIAGE_TAG,
            SurfaceKind::Opaque { tag } => *tag,
        }
    }
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceKind::Receiver => write!(f, "receiver"),
            SurfaceKind::Ground => write!(f, "ground"),
            SurfaceKind::Foliage => write!(f, "foliage"),
            SurfaceKind::Opaque { tag } => write!(f, "opaque({tag})"),
        }
    }
}

/// Bit set of intersection layers a scene query may hit.
///
/// Objects live on one of 32 layers; a query only sees objects whose layer
/// bit is set in the mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Every layer.
    pub const ALL: LayerMask = LayerMask(u32::MAX);
    /// No layer at all.
    pub const NONE: LayerMask = LayerMask(0);

    /// Mask containing the given layers only.
    ///
    /// Layers outside 0..32 are ignored.
    pub fn from_layers(layers: &[u8]) -> Self {
        LayerMask(
            layers
                .iter()
                .filter(|&&l| l < 32)
                .fold(0, |bits, &l| bits | (1 << l)),
        )
    }

    /// True if objects on `layer` are visible to the query.
    pub fn includes(&self, layer: u8) -> bool {
        layer < 32 && self.0 & (1 << layer) != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        LayerMask::ALL
    }
}
