//! Run configuration.
//!
//! [`SimulationConfig`] holds the read-only parameters of one run. The
//! binary loads it, together with the transmitter position and a scene
//! description, from a TOML file:
//!
//! ```toml
//! transmitter = [0.0, 2.0, 0.0]
//! output = "output/ray_traces.csv"
//!
//! [simulation]
//! number_of_rays = 50000
//! number_of_reflections = 4
//! foliage_permittivity = 1.5
//!
//! [[scene.objects]]
//! shape = "plane"
//! point = [0.0, 0.0, 0.0]
//! normal = [0.0, 1.0, 0.0]
//! surface = "ground"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec3A;
use log::{debug, info, warn};
use serde::Deserialize;

use crate::cuboid::Cuboid;
use crate::error::{Error, Result};
use crate::hittable::{DEFAULT_MIN_HIT_DISTANCE, Scene};
use crate::material::{LayerMask, SurfaceKind};
use crate::plane::Plane;
use crate::sphere::Sphere;

/// Parameters of one simulation run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Longest distance a single scene query looks ahead.
    pub max_ray_distance: f32,
    /// Reflections allowed per ray; foliage crossings are not counted.
    pub number_of_reflections: u32,
    /// Rays cast from the transmitter.
    pub number_of_rays: usize,
    /// Distance a refracted ray is pushed past a foliage boundary.
    pub foliage_offset: f32,
    /// Relative permittivity of foliage.
    pub foliage_permittivity: f32,
    /// Layers visible to scene queries.
    pub layer_mask: LayerMask,
    /// Hits closer than this to a query origin are ignored.
    pub min_hit_distance: f32,
    /// Foliage boundaries a ray may cross before it is dropped.
    pub max_foliage_crossings: u32,
    /// Seed for direction sampling; random when unset.
    pub seed: Option<u64>,
    /// Trace rays on the rayon thread pool.
    pub parallel: bool,
    /// Show a progress bar while tracing.
    pub show_progress: bool,
}

impl SimulationConfig {
    /// Configuration with default values.
    pub fn new() -> Self {
        Self {
            max_ray_distance: 1000.0,
            number_of_reflections: 5,
            number_of_rays: 10_000,
            foliage_offset: 0.01,
            foliage_permittivity: 1.5,
            layer_mask: LayerMask::ALL,
            min_hit_distance: DEFAULT_MIN_HIT_DISTANCE,
            max_foliage_crossings: 64,
            seed: None,
            parallel: true,
            show_progress: true,
        }
    }

    /// Reject values the tracer cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.max_ray_distance > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "max_ray_distance must be positive, got {}",
                self.max_ray_distance
            )));
        }
        if self.number_of_rays == 0 {
            return Err(Error::InvalidConfig("number_of_rays must be at least 1".into()));
        }
        if !(self.foliage_permittivity > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "foliage_permittivity must be positive, got {}",
                self.foliage_permittivity
            )));
        }
        if !(self.foliage_offset >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "foliage_offset must not be negative, got {}",
                self.foliage_offset
            )));
        }
        if !(self.min_hit_distance >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "min_hit_distance must not be negative, got {}",
                self.min_hit_distance
            )));
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// One scene object as written in the config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "shape", rename_all = "lowercase")]
pub enum ObjectDescription {
    /// Sphere volume.
    Sphere {
        /// Center point.
        center: [f32; 3],
        /// Radius.
        radius: f32,
        /// Surface name (`receiver`, `ground`, `foliage` or any other tag).
        surface: String,
        /// Tag recorded for hits on an opaque surface; derived from
        /// `surface` when unset.
        #[serde(default)]
        tag: Option<char>,
        /// Intersection layer.
        #[serde(default)]
        layer: u8,
    },
    /// Infinite plane.
    Plane {
        /// Any point on the plane.
        point: [f32; 3],
        /// Plane normal.
        normal: [f32; 3],
        /// Surface name.
        surface: String,
        /// Tag recorded for hits on an opaque surface; derived from
        /// `surface` when unset.
        #[serde(default)]
        tag: Option<char>,
        /// Intersection layer.
        #[serde(default)]
        layer: u8,
    },
    /// Axis-aligned box.
    Cuboid {
        /// One corner.
        min: [f32; 3],
        /// Opposite corner.
        max: [f32; 3],
        /// Surface name.
        surface: String,
        /// Tag recorded for hits on an opaque surface; derived from
        /// `surface` when unset.
        #[serde(default)]
        tag: Option<char>,
        /// Intersection layer.
        #[serde(default)]
        layer: u8,
    },
}

/// Scene objects from the config file.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SceneDescription {
    /// Objects in the scene.
    pub objects: Vec<ObjectDescription>,
}

impl SceneDescription {
    /// Small scene with every surface kind: ground, a building, a tree crown
    /// and a receiver box behind it.
    pub fn demo() -> Self {
        let surface = |s: &str| s.to_string();
        Self {
            objects: vec![
                ObjectDescription::Plane {
                    point: [0.0, 0.0, 0.0],
                    normal: [0.0, 1.0, 0.0],
                    surface: surface("ground"),
                    tag: None,
                    layer: 0,
                },
                ObjectDescription::Cuboid {
                    min: [-20.0, 0.0, 15.0],
                    max: [20.0, 12.0, 25.0],
                    surface: surface("building"),
                    tag: None,
                    layer: 0,
                },
                ObjectDescription::Sphere {
                    center: [6.0, 5.0, 6.0],
                    radius: 3.0,
                    surface: surface("foliage"),
                    tag: None,
                    layer: 0,
                },
                ObjectDescription::Cuboid {
                    min: [9.0, 0.5, 9.0],
                    max: [11.0, 2.5, 11.0],
                    surface: surface("receiver"),
                    tag: None,
                    layer: 0,
                },
            ],
        }
    }

    /// Build a queryable scene.
    ///
    /// Fails when an object asks for a tag reserved for receiver, ground or
    /// foliage hits, or gives a dedicated surface a different tag.
    pub fn build(&self, min_hit_distance: f32) -> Result<Scene> {
        let mut scene = Scene::new().with_min_hit_distance(min_hit_distance);
        for (index, object) in self.objects.iter().enumerate() {
            let surface = object.surface_kind(index)?;
            match object {
                ObjectDescription::Sphere { center, radius, layer, .. } => {
                    scene.add(Box::new(
                        Sphere::new(Vec3A::from_array(*center), *radius, surface).on_layer(*layer),
                    ));
                }
                ObjectDescription::Plane { point, normal, layer, .. } => {
                    scene.add(Box::new(
                        Plane::new(Vec3A::from_array(*point), Vec3A::from_array(*normal), surface)
                            .on_layer(*layer),
                    ));
                }
                ObjectDescription::Cuboid { min, max, layer, .. } => {
                    scene.add(Box::new(
                        Cuboid::new(Vec3A::from_array(*min), Vec3A::from_array(*max), surface)
                            .on_layer(*layer),
                    ));
                }
            }
        }
        debug!("Built scene with {} objects", scene.len());
        Ok(scene)
    }

    /// True if some object is tagged as the receiver.
    pub fn has_receiver(&self) -> bool {
        self.objects
            .iter()
            .any(|o| SurfaceKind::from_tag(o.surface_name()) == SurfaceKind::Receiver)
    }
}

impl ObjectDescription {
    fn surface_name(&self) -> &str {
        match self {
            ObjectDescription::Sphere { surface, .. }
            | ObjectDescription::Plane { surface, .. }
            | ObjectDescription::Cuboid { surface, .. } => surface,
        }
    }

    fn explicit_tag(&self) -> Option<char> {
        match self {
            ObjectDescription::Sphere { tag, .. }
            | ObjectDescription::Plane { tag, .. }
            | ObjectDescription::Cuboid { tag, .. } => *tag,
        }
    }

    /// Surface kind of the object, honouring an explicit tag.
    fn surface_kind(&self, index: usize) -> Result<SurfaceKind> {
        let name = self.surface_name();
        let derived = SurfaceKind::from_tag(name);
        match self.explicit_tag() {
            None => {
                if !derived.is_dedicated() && !name.to_ascii_lowercase().starts_with(derived.tag()) {
                    warn!(
                        "Object {index}: surface \"{name}\" records tag '{}'; set `tag` to choose another",
                        derived.tag()
                    );
                }
                Ok(derived)
            }
            Some(tag) if derived.is_dedicated() => {
                if tag == derived.tag() {
                    Ok(derived)
                } else {
                    Err(Error::InvalidConfig(format!(
                        "object {index}: {derived} surfaces always record '{}', got tag '{tag}'",
                        derived.tag()
                    )))
                }
            }
            Some(tag) => SurfaceKind::opaque(tag).ok_or_else(|| {
                Error::InvalidConfig(format!(
                    "object {index}: tag '{tag}' on surface \"{name}\" is reserved for receiver, ground and foliage hits"
                ))
            }),
        }
    }
}

/// Contents of a configuration file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Transmitter position.
    pub transmitter: [f32; 3],
    /// CSV file for recorded paths.
    pub output: PathBuf,
    /// Simulation parameters.
    pub simulation: SimulationConfig,
    /// Scene objects; the demo scene when the file lists none.
    pub scene: SceneDescription,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            transmitter: [0.0, 2.0, 0.0],
            output: PathBuf::from("output/ray_traces.csv"),
            simulation: SimulationConfig::default(),
            scene: SceneDescription::default(),
        }
    }
}

impl ConfigFile {
    /// Parse a configuration from TOML text.
    ///
    /// `path` is only used in error messages.
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let mut config: ConfigFile = toml::from_str(text).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })?;
        if config.scene.objects.is_empty() {
            config.scene = SceneDescription::demo();
        }
        Ok(config)
    }

    /// Load a configuration file.
    ///
    /// A missing file is an error unless `allow_missing` is set, in which
    /// case the defaults with the demo scene are returned.
    pub fn load(path: &Path, allow_missing: bool) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(text) => {
                info!("Loading configuration from {}", path.display());
                Self::parse(&text, path)
            }
            Err(e) if allow_missing && e.kind() == std::io::ErrorKind::NotFound => {
                info!("No configuration at {}, using defaults", path.display());
                Ok(Self {
                    scene: SceneDescription::demo(),
                    ..Self::default()
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Transmitter position as a vector.
    pub fn transmitter(&self) -> Vec3A {
        Vec3A::from_array(self.transmitter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::SceneOracle;
    use crate::ray::Ray;

    #[test]
    fn test_config_defaults() {
        let config = SimulationConfig::new();
        assert_eq!(config.number_of_reflections, 5);
        assert_eq!(config.number_of_rays, 10_000);
        assert_eq!(config.layer_mask, LayerMask::ALL);
        assert!((config.foliage_permittivity - 1.5).abs() < 1e-6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            SimulationConfig { max_ray_distance: 0.0, ..SimulationConfig::new() },
            SimulationConfig { number_of_rays: 0, ..SimulationConfig::new() },
            SimulationConfig { foliage_permittivity: -1.0, ..SimulationConfig::new() },
            SimulationConfig { foliage_offset: f32::NAN, ..SimulationConfig::new() },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_parse_file() {
        let text = r#"
            transmitter = [1.0, 2.0, 3.0]
            output = "out.csv"

            [simulation]
            number_of_rays = 42
            number_of_reflections = 2
            layer_mask = 5
            seed = 7

            [[scene.objects]]
            shape = "sphere"
            center = [0.0, 0.0, 5.0]
            radius = 1.0
            surface = "foliage"
            layer = 2

            [[scene.objects]]
            shape = "plane"
            point = [0.0, 0.0, 10.0]
            normal = [0.0, 0.0, 1.0]
            surface = "receiver"
        "#;
        let config = ConfigFile::parse(text, Path::new("test.toml")).unwrap();
        assert_eq!(config.transmitter(), Vec3A::new(1.0, 2.0, 3.0));
        assert_eq!(config.output, PathBuf::from("out.csv"));
        assert_eq!(config.simulation.number_of_rays, 42);
        assert_eq!(config.simulation.number_of_reflections, 2);
        assert_eq!(config.simulation.layer_mask, LayerMask(5));
        assert_eq!(config.simulation.seed, Some(7));
        // Unspecified fields keep their defaults
        assert_eq!(config.simulation.max_ray_distance, 1000.0);
        assert_eq!(config.scene.objects.len(), 2);
        assert!(config.scene.has_receiver());
        assert_eq!(config.scene.build(1e-4).unwrap().len(), 2);
    }

    #[test]
    fn test_opaque_tags() {
        let text = r#"
            [[scene.objects]]
            shape = "plane"
            point = [0.0, 0.0, 0.0]
            normal = [0.0, 1.0, 0.0]
            surface = "roof"

            [[scene.objects]]
            shape = "cuboid"
            min = [0.0, 0.0, 0.0]
            max = [1.0, 1.0, 1.0]
            surface = "road"
            tag = "a"
        "#;
        let config = ConfigFile::parse(text, Path::new("tags.toml")).unwrap();
        let scene = config.scene.build(1e-4).unwrap();
        assert_eq!(scene.len(), 2);
        assert!(!config.scene.has_receiver());

        // The roof is hit from above; it must not read as the receiver
        let hit = scene
            .cast_ray(&Ray::new(Vec3A::new(5.0, 3.0, 5.0), -Vec3A::Y), 10.0, LayerMask::ALL)
            .unwrap();
        assert_eq!(hit.surface.tag(), 'o');
        let hit = scene
            .cast_ray(&Ray::new(Vec3A::new(0.5, 3.0, 0.5), -Vec3A::Y), 10.0, LayerMask::ALL)
            .unwrap();
        assert_eq!(hit.surface.tag(), 'a');
    }

    #[test]
    fn test_reserved_tags_rejected() {
        for (surface, tag) in [("roof", 'r'), ("glass", 'g'), ("fence", 'f'), ("receiver", 'x')] {
            let description = SceneDescription {
                objects: vec![ObjectDescription::Sphere {
                    center: [0.0, 0.0, 0.0],
                    radius: 1.0,
                    surface: surface.to_string(),
                    tag: Some(tag),
                    layer: 0,
                }],
            };
            assert!(
                matches!(description.build(1e-4), Err(Error::InvalidConfig(_))),
                "{surface} with tag {tag} was accepted"
            );
        }

        let foliage = SceneDescription {
            objects: vec![ObjectDescription::Sphere {
                center: [0.0, 0.0, 0.0],
                radius: 1.0,
                surface: "foliage".to_string(),
                tag: Some('f'),
                layer: 0,
            }],
        };
        assert!(foliage.build(1e-4).is_ok());
    }

    #[test]
    fn test_empty_scene_falls_back_to_demo() {
        let config = ConfigFile::parse("[simulation]\nnumber_of_rays = 10\n", Path::new("x.toml")).unwrap();
        assert_eq!(config.scene, SceneDescription::demo());
        assert!(config.scene.has_receiver());
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = ConfigFile::parse("[simulation]\nnumber_of_rays = \"many\"\n", Path::new("bad.toml"))
            .unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("none.toml");
        assert!(ConfigFile::load(&path, true).is_ok());
        assert!(matches!(ConfigFile::load(&path, false), Err(Error::Io(_))));
    }
}
