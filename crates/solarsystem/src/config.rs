//! Generator settings. Loaded from config.ron at startup.

use std::path::{Path, PathBuf};

use procgen::{
    BiomeParams, NoiseKind, NoiseParams, PlanetConfig, SystemSettings, MAX_SUBDIVISIONS, PLANET_SLOT_COUNT,
};
use serde::{Deserialize, Serialize};

/// Noise field names as written in `config.ron`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NoiseSetting {
    Coherent,
    #[default]
    SimplexLike,
    UniformRandom,
}

impl From<NoiseSetting> for NoiseKind {
    fn from(setting: NoiseSetting) -> Self {
        match setting {
            NoiseSetting::Coherent => NoiseKind::Coherent,
            NoiseSetting::SimplexLike => NoiseKind::SimplexLike,
            NoiseSetting::UniformRandom => NoiseKind::UniformRandom,
        }
    }
}

/// Persistent generator settings. Loaded from `config.ron` in the current directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Master seed. A fresh one is drawn from entropy when unset.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Planets around the sun, 0 to 9.
    #[serde(default = "default_planet_count")]
    pub planet_count: usize,
    /// Icosphere subdivision passes, 0 to 3.
    #[serde(default = "default_subdivisions")]
    pub subdivisions: u32,
    #[serde(default = "default_octaves")]
    pub octaves: u32,
    #[serde(default = "default_one")]
    pub frequency: f64,
    #[serde(default = "default_one")]
    pub amplitude: f64,
    #[serde(default)]
    pub noise: NoiseSetting,
    /// Voronoi sites per planet.
    #[serde(default = "default_site_count")]
    pub site_count: usize,
    /// Vertices this close to the centre or closer are sea.
    #[serde(default = "default_water_depth")]
    pub water_depth: f32,
    /// Tree grammar descriptor. The built-in rules are used when unset.
    #[serde(default)]
    pub rule_file: Option<PathBuf>,
    /// OBJ mesh for planet rings. No rings when unset.
    #[serde(default)]
    pub ring_asset: Option<PathBuf>,
    /// Overrides the grammar's own generation count.
    #[serde(default)]
    pub tree_generations: Option<u32>,
    /// Write every generated mesh here as OBJ.
    #[serde(default)]
    pub export_dir: Option<PathBuf>,
}

fn default_planet_count() -> usize {
    5
}
fn default_subdivisions() -> u32 {
    1
}
fn default_octaves() -> u32 {
    4
}
fn default_one() -> f64 {
    1.0
}
fn default_site_count() -> usize {
    5
}
fn default_water_depth() -> f32 {
    1.05
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            seed: None,
            planet_count: default_planet_count(),
            subdivisions: default_subdivisions(),
            octaves: default_octaves(),
            frequency: default_one(),
            amplitude: default_one(),
            noise: NoiseSetting::default(),
            site_count: default_site_count(),
            water_depth: default_water_depth(),
            rule_file: None,
            ring_asset: None,
            tree_generations: None,
            export_dir: None,
        }
    }
}

impl SystemConfig {
    /// Load config from `config.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if let Ok(data) = std::fs::read_to_string(path) {
            match ron::from_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }

    /// Settings for [`procgen::SolarSystem::generate`], with counts clamped to what the generator supports.
    pub fn system_settings(&self) -> SystemSettings {
        let planet_count = self.planet_count.min(PLANET_SLOT_COUNT);
        let subdivisions = self.subdivisions.min(MAX_SUBDIVISIONS);
        if planet_count != self.planet_count || subdivisions != self.subdivisions {
            log::warn!(
                "Clamped planet_count {} -> {}, subdivisions {} -> {}",
                self.planet_count,
                planet_count,
                self.subdivisions,
                subdivisions
            );
        }

        SystemSettings {
            planet_count,
            template: PlanetConfig {
                subdivisions,
                noise: NoiseParams {
                    kind: self.noise.into(),
                    octaves: self.octaves,
                    frequency: self.frequency,
                    amplitude: self.amplitude,
                    ..Default::default()
                },
                biomes: BiomeParams {
                    site_count: self.site_count.max(1),
                    water_depth: self.water_depth,
                    ..Default::default()
                },
                ring_asset: self.ring_asset.clone(),
                ..Default::default()
            },
        }
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("config.ron")
}
