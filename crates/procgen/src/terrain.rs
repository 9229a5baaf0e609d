//! Terrain displacement: pushes icosphere vertices outward by fractal noise.
//!
//! For each unit-sphere vertex a height `h` is summed over octaves, clamped to
//! a band (default `[0, 0.3]`) and the vertex is scaled by `1 + h`.
//!
//! **Determinism:** coherent kinds draw a single noise seed from the caller's
//! RNG, so a seeded RNG reproduces the terrain exactly. `UniformRandom` draws
//! a fresh sample per vertex and octave with no spatial coherence; it is only
//! reproducible when the caller's RNG is.

use glam::Vec3;
use noise::{NoiseFn, Perlin, Simplex};
use rand::Rng;

/// Default clamp band for terrain height.
pub const DEFAULT_HEIGHT_BAND: (f32, f32) = (0.0, 0.3);

/// Derive a u32 noise seed from a world seed and an offset.
/// Same (seed, offset) always gives the same result.
#[inline]
fn deterministic_noise_seed(seed: u64, offset: u64) -> u32 {
    ((seed.wrapping_add(offset))
        .wrapping_mul(0x9e3779b97f4a7c15_u64)
        .wrapping_add(offset.wrapping_mul(0x6c078965_u64))
        >> 32) as u32
}

/// Which noise field drives the terrain. Exactly one is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseKind {
    /// Gradient (Perlin) noise.
    Coherent,
    /// Simplex noise.
    #[default]
    SimplexLike,
    /// Independent uniform samples in `[-1, 1]`; not spatially coherent.
    UniformRandom,
}

/// Fractal noise knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseParams {
    pub kind: NoiseKind,
    /// Number of octaves summed. Zero yields flat terrain.
    pub octaves: u32,
    /// Base frequency; doubles every octave.
    pub frequency: f64,
    /// Base amplitude divisor; doubles every octave, so later octaves contribute less.
    pub amplitude: f64,
    /// Lower clamp for the summed height.
    pub min_height: f32,
    /// Upper clamp for the summed height.
    pub max_height: f32,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            kind: NoiseKind::default(),
            octaves: 4,
            frequency: 1.0,
            amplitude: 1.0,
            min_height: DEFAULT_HEIGHT_BAND.0,
            max_height: DEFAULT_HEIGHT_BAND.1,
        }
    }
}

enum Field {
    Perlin(Perlin),
    Simplex(Simplex),
    Uniform,
}

/// A noise field bound to one seed, ready to sample heights.
pub struct TerrainNoise {
    field: Field,
    params: NoiseParams,
}

impl TerrainNoise {
    /// Build the field for `params`, drawing its seed from `rng` when the kind is coherent.
    pub fn new<R: Rng + ?Sized>(params: &NoiseParams, rng: &mut R) -> Self {
        let field = match params.kind {
            NoiseKind::Coherent => Field::Perlin(Perlin::new(deterministic_noise_seed(rng.gen(), 0))),
            NoiseKind::SimplexLike => Field::Simplex(Simplex::new(deterministic_noise_seed(rng.gen(), 1))),
            NoiseKind::UniformRandom => Field::Uniform,
        };
        Self {
            field,
            params: params.clone(),
        }
    }

    fn sample<R: Rng + ?Sized>(&self, p: [f64; 3], rng: &mut R) -> f64 {
        match &self.field {
            Field::Perlin(perlin) => perlin.get(p),
            Field::Simplex(simplex) => simplex.get(p),
            Field::Uniform => rng.gen_range(-1.0..=1.0),
        }
    }

    /// Clamped fractal height at a unit-sphere position.
    pub fn height<R: Rng + ?Sized>(&self, position: Vec3, rng: &mut R) -> f32 {
        let mut frequency = self.params.frequency;
        let mut amplitude = self.params.amplitude;
        let mut sum = 0.0;

        for _ in 0..self.params.octaves {
            let p = [
                position.x as f64 * frequency,
                position.y as f64 * frequency,
                position.z as f64 * frequency,
            ];
            sum += self.sample(p, rng) / amplitude;
            frequency *= 2.0;
            amplitude *= 2.0;
        }

        let (lo, hi) = (self.params.min_height, self.params.max_height);
        // zero amplitude gives 0/0 for a zero sample
        if sum.is_nan() {
            return lo;
        }
        (sum as f32).clamp(lo, hi)
    }
}

/// Displace every vertex radially by its fractal height.
///
/// Returns a new vertex array parallel to `vertices`; the input is untouched.
pub fn displace<R: Rng + ?Sized>(vertices: &[Vec3], params: &NoiseParams, rng: &mut R) -> Vec<Vec3> {
    let noise = TerrainNoise::new(params, rng);
    vertices
        .iter()
        .map(|&v| v * (1.0 + noise.height(v, rng)))
        .collect()
}
