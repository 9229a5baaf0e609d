//! Planet assembly: icosphere -> terrain -> biomes -> decorations.
//!
//! **Replayability:** every random draw comes from the RNG passed to
//! [`Planet::generate`], so a seeded `StdRng` rebuilds the same planet down to
//! the last colour. A finished [`Planet`] is an immutable value; regenerating
//! builds a fresh one from the base icosahedron and the caller swaps it in.

use std::path::PathBuf;
use std::time::Duration;

use engine_core::{Mat4, MeshData, Stopwatch, Transform};
use glam::Vec3;
use rand::Rng;

use crate::asset::MeshSource;
use crate::biome::{classify, jitter_color, Biome, BiomeMap, BiomeParams, Palette};
use crate::icosphere::{IcoSphere, VertexIndex, MAX_SUBDIVISIONS};
use crate::terrain::{displace, NoiseParams};

/// Moon size relative to the planet mesh.
pub const MOON_SCALE: f32 = 0.2;
/// Moon offset from the planet's location.
pub const MOON_OFFSET: Vec3 = Vec3::new(0.0, 0.5, 1.25);

const MOON_COLOR: Vec3 = Vec3::new(0.6, 0.6, 0.62);
const RING_COLOR: Vec3 = Vec3::new(0.78, 0.70, 0.52);
const SUN_COLOR: Vec3 = Vec3::new(1.0, 0.85, 0.25);

/// Everything that shapes one planet.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetConfig {
    pub name: String,
    /// Position in the system.
    pub location: Vec3,
    /// Larger is slower: the orbit angle is `time / rotation_speed`.
    pub rotation_speed: f32,
    /// Uniform mesh scale when drawn.
    pub scale: f32,
    /// Subdivision passes, clamped to [`MAX_SUBDIVISIONS`].
    pub subdivisions: u32,
    pub noise: NoiseParams,
    pub biomes: BiomeParams,
    /// Probability of a moon.
    pub moon_chance: f64,
    /// Probability of a ring.
    pub ring_chance: f64,
    /// Upper bound (inclusive) on tree anchors.
    pub max_trees: usize,
    /// OBJ file with the ring annulus. No path means no ring.
    pub ring_asset: Option<PathBuf>,
}

impl Default for PlanetConfig {
    fn default() -> Self {
        Self {
            name: "Planet".to_string(),
            location: Vec3::ZERO,
            rotation_speed: 2.0,
            scale: 0.6,
            subdivisions: 1,
            noise: NoiseParams::default(),
            biomes: BiomeParams::default(),
            moon_chance: 0.5,
            ring_chance: 0.5,
            max_trees: 4,
            ring_asset: None,
        }
    }
}

impl PlanetConfig {
    /// The sun: a smooth once-subdivided sphere in a single warm colour, no decorations.
    pub fn sun() -> Self {
        Self {
            name: "The Sun".to_string(),
            scale: 0.4,
            subdivisions: 1,
            noise: NoiseParams {
                octaves: 0,
                ..Default::default()
            },
            biomes: BiomeParams {
                site_count: 1,
                water_depth: 0.0,
                palette: Palette {
                    sea: SUN_COLOR,
                    land: vec![SUN_COLOR],
                },
                color_jitter: 20,
            },
            moon_chance: 0.0,
            ring_chance: 0.0,
            max_trees: 0,
            ..Default::default()
        }
    }
}

/// Pipeline stages, in the only order they can occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum GenerationStage {
    Uninitialized,
    BaseBuilt,
    Subdivided,
    Terrained,
    Classified,
    Decorated,
    Ready,
}

impl GenerationStage {
    /// The stage after this one. `Ready` is terminal.
    pub fn next(self) -> Self {
        match self {
            Self::Uninitialized => Self::BaseBuilt,
            Self::BaseBuilt => Self::Subdivided,
            Self::Subdivided => Self::Terrained,
            Self::Terrained => Self::Classified,
            Self::Classified => Self::Decorated,
            Self::Decorated | Self::Ready => Self::Ready,
        }
    }
}

/// A moon: the bare icosahedron with its own colouring.
#[derive(Debug, Clone, PartialEq)]
pub struct Moon {
    pub mesh: MeshData,
    pub scale: f32,
}

/// A generated planet.
#[derive(Debug, Clone)]
pub struct Planet {
    pub config: PlanetConfig,
    /// Subdivided unit sphere before displacement.
    pub base: IcoSphere,
    /// `base.vertices` pushed out by terrain; shares `base.triangles`.
    pub displaced: Vec<Vec3>,
    pub biome_map: BiomeMap,
    pub moon: Option<Moon>,
    pub ring: Option<MeshData>,
    /// Vertices that get a tree. Grown and drawn by the renderer.
    pub tree_anchors: Vec<VertexIndex>,
    /// Wall-clock generation time, for display only.
    pub generation_time: Duration,
}

impl Planet {
    /// Run the full pipeline.
    pub fn generate<R: Rng + ?Sized>(config: PlanetConfig, rng: &mut R, assets: &dyn MeshSource) -> Self {
        let watch = Stopwatch::start();
        let mut assembly = Assembly::new(&config);
        while assembly.stage != GenerationStage::Ready {
            assembly.advance(rng, assets);
        }
        let planet = assembly.finish(config, watch.elapsed());
        log::info!(
            "Generated planet '{}': {} vertices, {} triangles, moon: {}, ring: {}, trees: {}, {:.4}s",
            planet.name(),
            planet.vertex_count(),
            planet.triangle_count(),
            planet.has_moon(),
            planet.has_ring(),
            planet.tree_anchors.len(),
            planet.generation_time.as_secs_f64()
        );
        planet
    }

    /// Build a replacement planet from new settings. Nothing is carried over from `self`.
    pub fn regenerate<R: Rng + ?Sized>(&self, config: PlanetConfig, rng: &mut R, assets: &dyn MeshSource) -> Self {
        Self::generate(config, rng, assets)
    }

    /// Regenerate with different noise, keeping every other setting.
    pub fn with_noise<R: Rng + ?Sized>(&self, noise: NoiseParams, rng: &mut R, assets: &dyn MeshSource) -> Self {
        let config = PlanetConfig {
            noise,
            ..self.config.clone()
        };
        self.regenerate(config, rng, assets)
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn vertex_count(&self) -> usize {
        self.displaced.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.base.triangle_count()
    }

    pub fn has_moon(&self) -> bool {
        self.moon.is_some()
    }

    pub fn has_ring(&self) -> bool {
        self.ring.is_some()
    }

    pub fn biomes(&self) -> &[Biome] {
        &self.biome_map.biomes
    }

    pub fn colors(&self) -> &[Vec3] {
        &self.biome_map.colors
    }

    /// Displaced, coloured surface for the renderer.
    pub fn mesh(&self) -> MeshData {
        MeshData::new(self.displaced.clone(), self.base.triangles.clone()).with_colors(self.biome_map.colors.clone())
    }

    /// Planet model matrix at `time` seconds. Pass 0 to hold the orbit still.
    pub fn model_matrix(&self, time: f32) -> Mat4 {
        Transform::from_position_scale(self.config.location, self.config.scale).orbit_matrix(self.orbit_angle(time))
    }

    /// Moon model matrix at `time`; it sweeps round with its planet.
    pub fn moon_model_matrix(&self, time: f32) -> Option<Mat4> {
        let moon = self.moon.as_ref()?;
        let placement = Transform::from_position_scale(self.config.location + MOON_OFFSET, moon.scale);
        Some(placement.orbit_matrix(self.orbit_angle(time)))
    }

    /// Local-space frame for a tree: origin on the surface, +Y along the outward direction.
    pub fn tree_transform(&self, anchor: VertexIndex) -> Transform {
        let i = anchor as usize;
        Transform::aligned_to(self.displaced[i], self.base.vertices[i])
    }

    fn orbit_angle(&self, time: f32) -> f32 {
        if self.config.rotation_speed == 0.0 {
            return 0.0;
        }
        time / self.config.rotation_speed
    }
}

/// Working state while a planet moves through the pipeline.
struct Assembly {
    stage: GenerationStage,
    subdivisions: u32,
    noise: NoiseParams,
    biome_params: BiomeParams,
    moon_chance: f64,
    ring_chance: f64,
    max_trees: usize,
    ring_asset: Option<PathBuf>,
    sphere: IcoSphere,
    displaced: Vec<Vec3>,
    biome_map: Option<BiomeMap>,
    moon: Option<Moon>,
    ring: Option<MeshData>,
    tree_anchors: Vec<VertexIndex>,
}

impl Assembly {
    fn new(config: &PlanetConfig) -> Self {
        let subdivisions = if config.subdivisions > MAX_SUBDIVISIONS {
            log::warn!(
                "'{}': {} subdivisions requested, clamping to {}",
                config.name,
                config.subdivisions,
                MAX_SUBDIVISIONS
            );
            MAX_SUBDIVISIONS
        } else {
            config.subdivisions
        };

        Self {
            stage: GenerationStage::Uninitialized,
            subdivisions,
            noise: config.noise.clone(),
            biome_params: config.biomes.clone(),
            moon_chance: config.moon_chance.clamp(0.0, 1.0),
            ring_chance: config.ring_chance.clamp(0.0, 1.0),
            max_trees: config.max_trees,
            ring_asset: config.ring_asset.clone(),
            sphere: IcoSphere {
                vertices: Vec::new(),
                triangles: Vec::new(),
            },
            displaced: Vec::new(),
            biome_map: None,
            moon: None,
            ring: None,
            tree_anchors: Vec::new(),
        }
    }

    /// Do the work that leads into the next stage.
    fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R, assets: &dyn MeshSource) {
        let next = self.stage.next();
        match next {
            GenerationStage::BaseBuilt => self.sphere = IcoSphere::icosahedron(),
            GenerationStage::Subdivided => self.sphere.subdivide(self.subdivisions),
            GenerationStage::Terrained => self.displaced = displace(&self.sphere.vertices, &self.noise, rng),
            GenerationStage::Classified => self.biome_map = Some(classify(&self.displaced, &self.biome_params, rng)),
            GenerationStage::Decorated => self.decorate(rng, assets),
            GenerationStage::Ready | GenerationStage::Uninitialized => {}
        }
        log::debug!("planet stage {:?} -> {:?}", self.stage, next);
        self.stage = next;
    }

    fn decorate<R: Rng + ?Sized>(&mut self, rng: &mut R, assets: &dyn MeshSource) {
        let wants_moon = rng.gen_bool(self.moon_chance);
        let wants_ring = rng.gen_bool(self.ring_chance);

        if wants_moon {
            self.moon = Some(build_moon(self.biome_params.color_jitter, rng));
        }
        if wants_ring {
            self.ring = self.load_ring(rng, assets);
        }

        let tree_count = rng.gen_range(0..=self.max_trees);
        self.tree_anchors = pick_anchors(self.displaced.len(), tree_count, rng);
    }

    fn load_ring<R: Rng + ?Sized>(&self, rng: &mut R, assets: &dyn MeshSource) -> Option<MeshData> {
        let Some(path) = self.ring_asset.as_deref() else {
            log::debug!("ring rolled but no ring asset configured");
            return None;
        };
        match assets.load(path) {
            Ok(mesh) => {
                let colors = (0..mesh.vertex_count())
                    .map(|_| jitter_color(RING_COLOR, 30, rng))
                    .collect();
                Some(mesh.with_colors(colors))
            }
            Err(e) => {
                log::warn!("Ring asset {:?} failed to load ({}), skipping ring", path, e);
                None
            }
        }
    }

    fn finish(self, config: PlanetConfig, generation_time: Duration) -> Planet {
        debug_assert_eq!(self.stage, GenerationStage::Ready);
        let biome_map = self.biome_map.unwrap_or(BiomeMap {
            sites: Vec::new(),
            biomes: Vec::new(),
            colors: Vec::new(),
        });
        Planet {
            config,
            base: self.sphere,
            displaced: self.displaced,
            biome_map,
            moon: self.moon,
            ring: self.ring,
            tree_anchors: self.tree_anchors,
            generation_time,
        }
    }
}

/// The bare icosahedron, grey with per-vertex variance.
fn build_moon<R: Rng + ?Sized>(jitter: i32, rng: &mut R) -> Moon {
    let sphere = IcoSphere::icosahedron();
    let colors = (0..sphere.vertex_count())
        .map(|_| jitter_color(MOON_COLOR, jitter, rng))
        .collect();
    Moon {
        mesh: sphere.to_mesh().with_colors(colors),
        scale: MOON_SCALE,
    }
}

/// `count` random vertex indices in `0..vertex_count`.
fn pick_anchors<R: Rng + ?Sized>(vertex_count: usize, count: usize, rng: &mut R) -> Vec<VertexIndex> {
    if count == 0 {
        return Vec::new();
    }
    assert!(vertex_count > 0, "cannot anchor trees on an empty mesh");
    (0..count)
        .map(|_| rng.gen_range(0..vertex_count) as VertexIndex)
        .collect()
}
