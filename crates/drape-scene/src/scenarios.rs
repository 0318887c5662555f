//! Scene descriptions and built-in presets.
//!
//! Two presets for quick inspection and regression runs:
//! 1. **Hanging sheet**: Horizontal sheet pinned at two corners swings down
//! 2. **Sphere drape**: Free sheet falls onto a sphere

use std::path::Path;

use drape_math::DVec3;
use drape_solver::{ClothConfig, CollisionProbe, PinPolicy};
use drape_types::constants::{DEFAULT_DT, DEFAULT_MAX_HALVINGS, GRAVITY};
use drape_types::{DrapeError, DrapeResult};
use serde::{Deserialize, Serialize};

/// Upper bound on `max_halvings`.
const HALVING_LIMIT: u32 = 20;

/// A sphere probe moving at constant velocity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Center at `t = 0`.
    pub center: [f64; 3],
    pub radius: f64,
    /// Linear velocity of the center (m/s).
    #[serde(default)]
    pub velocity: [f64; 3],
}

impl ProbeConfig {
    /// A probe that stays put.
    pub fn fixed(center: [f64; 3], radius: f64) -> Self {
        Self {
            center,
            radius,
            velocity: [0.0; 3],
        }
    }

    /// Probe placement at simulation time `t`.
    pub fn at(&self, t: f64) -> CollisionProbe {
        let center = DVec3::from_array(self.center) + DVec3::from_array(self.velocity) * t;
        CollisionProbe::new(center, self.radius)
    }
}

/// A complete, runnable scene.
///
/// Scalar fields come first so the struct serializes to valid TOML
/// (plain keys before tables).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// Tick length (seconds).
    #[serde(default = "default_dt")]
    pub dt: f64,
    /// Number of ticks to run.
    pub steps: u32,
    #[serde(default = "default_gravity")]
    pub gravity: [f64; 3],
    /// How many times a failed tick may be split in half before giving up.
    #[serde(default = "default_max_halvings")]
    pub max_halvings: u32,
    /// Frame callback period in ticks.
    #[serde(default = "default_export_every")]
    pub export_every: u32,
    pub cloth: ClothConfig,
    #[serde(default)]
    pub probes: Vec<ProbeConfig>,
}

fn default_name() -> String {
    "scene".to_string()
}

fn default_dt() -> f64 {
    DEFAULT_DT
}

fn default_gravity() -> [f64; 3] {
    [0.0, -GRAVITY, 0.0]
}

fn default_max_halvings() -> u32 {
    DEFAULT_MAX_HALVINGS
}

fn default_export_every() -> u32 {
    1
}

impl SceneConfig {
    /// A scene with default timing and gravity and no probes.
    pub fn new(cloth: ClothConfig, steps: u32) -> Self {
        Self {
            name: default_name(),
            dt: DEFAULT_DT,
            steps,
            gravity: default_gravity(),
            max_halvings: DEFAULT_MAX_HALVINGS,
            export_every: 1,
            cloth,
            probes: Vec::new(),
        }
    }

    pub fn with_probe(mut self, probe: ProbeConfig) -> Self {
        self.probes.push(probe);
        self
    }

    pub fn gravity_vector(&self) -> DVec3 {
        DVec3::from_array(self.gravity)
    }

    /// All probes placed at simulation time `t`.
    pub fn probes_at(&self, t: f64) -> Vec<CollisionProbe> {
        self.probes.iter().map(|p| p.at(t)).collect()
    }

    /// Checks timing, gravity, probes, and the cloth itself.
    pub fn validate(&self) -> DrapeResult<()> {
        if !(self.dt > 0.0 && self.dt.is_finite()) {
            return Err(DrapeError::InvalidConfig(format!(
                "dt must be > 0 (got {})",
                self.dt
            )));
        }
        if self.gravity.iter().any(|g| !g.is_finite()) {
            return Err(DrapeError::InvalidConfig(format!(
                "gravity {:?} is not finite",
                self.gravity
            )));
        }
        if self.export_every == 0 {
            return Err(DrapeError::InvalidConfig(
                "export_every must be >= 1".into(),
            ));
        }
        if self.max_halvings > HALVING_LIMIT {
            return Err(DrapeError::InvalidConfig(format!(
                "max_halvings must be <= {HALVING_LIMIT} (got {})",
                self.max_halvings
            )));
        }
        for (i, probe) in self.probes.iter().enumerate() {
            if probe.velocity.iter().any(|v| !v.is_finite()) {
                return Err(DrapeError::InvalidConfig(format!(
                    "probe {i}: velocity is not finite"
                )));
            }
            probe.at(0.0).validate().map_err(|e| {
                DrapeError::InvalidConfig(format!("probe {i}: {e}"))
            })?;
        }
        self.cloth.validate()?;
        Ok(())
    }

    /// Parses and validates a scene from TOML text.
    pub fn from_toml_str(text: &str) -> DrapeResult<Self> {
        let scene: SceneConfig = toml::from_str(text)
            .map_err(|e| DrapeError::Serialization(format!("TOML parse failed: {e}")))?;
        scene.validate()?;
        Ok(scene)
    }

    /// Reads, parses, and validates a scene file.
    pub fn load(path: impl AsRef<Path>) -> DrapeResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> DrapeResult<String> {
        toml::to_string(self)
            .map_err(|e| DrapeError::Serialization(format!("TOML serialization failed: {e}")))
    }
}

/// Which built-in scene to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenePreset {
    /// Sheet pinned at two corners, swinging under gravity.
    HangingSheet,
    /// Free sheet falling onto a sphere.
    SphereDrape,
}

impl ScenePreset {
    pub fn all() -> &'static [ScenePreset] {
        &[ScenePreset::HangingSheet, ScenePreset::SphereDrape]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScenePreset::HangingSheet => "hanging_sheet",
            ScenePreset::SphereDrape => "sphere_drape",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|p| p.name() == name)
    }

    pub fn build(&self) -> SceneConfig {
        match self {
            ScenePreset::HangingSheet => SceneConfig::hanging_sheet(),
            ScenePreset::SphereDrape => SceneConfig::sphere_drape(),
        }
    }
}

impl SceneConfig {
    /// A 1m × 1m sheet at 12×12 resolution, held at y = 1.5 by the two
    /// corners of its first row. Two seconds at 60 fps.
    pub fn hanging_sheet() -> Self {
        let cloth = ClothConfig::new(
            12,
            12,
            [
                [-0.5, 1.5, 0.0],
                [0.5, 1.5, 0.0],
                [-0.5, 1.5, 1.0],
                [0.5, 1.5, 1.0],
            ],
            0.5,
            2.0e2,
        )
        .with_pins(PinPolicy::TopCorners);

        Self {
            name: ScenePreset::HangingSheet.name().to_string(),
            ..Self::new(cloth, 120)
        }
    }

    /// A free 1.2m × 1.2m sheet at 12×12 resolution dropped from y = 1.0
    /// onto a 0.35m sphere. Three seconds at 60 fps.
    pub fn sphere_drape() -> Self {
        let cloth = ClothConfig::new(
            12,
            12,
            [
                [-0.6, 1.0, -0.6],
                [0.6, 1.0, -0.6],
                [-0.6, 1.0, 0.6],
                [0.6, 1.0, 0.6],
            ],
            0.5,
            2.0e2,
        )
        .with_pins(PinPolicy::None);

        Self {
            name: ScenePreset::SphereDrape.name().to_string(),
            ..Self::new(cloth, 180)
        }
        .with_probe(ProbeConfig::fixed([0.0, 0.5, 0.0], 0.35))
    }
}
