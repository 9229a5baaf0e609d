//! Solar system layout: a sun plus planets dropped into fixed orbital slots.
//!
//! Slots sit on the x axis every 5 units out to 45, each with its own spin
//! rate and land palette. A generated system takes a random subset of slots;
//! each planet gets an RNG seeded from the system stream, so planets never
//! share random state and can be rebuilt one at a time.

use engine_core::Stopwatch;
use glam::Vec3;
use rand::prelude::*;

use crate::asset::MeshSource;
use crate::biome::Palette;
use crate::planet::{Planet, PlanetConfig};

/// Number of orbital slots (and the most planets a system can hold).
pub const PLANET_SLOT_COUNT: usize = 9;

const GREEN: [f32; 3] = [0.0, 1.0, 0.0];
const RED: [f32; 3] = [1.0, 0.0, 0.0];
const EMBER: [f32; 3] = [1.0, 0.2, 0.0];
const GREY: [f32; 3] = [0.5, 0.5, 0.5];
const ASH: [f32; 3] = [0.8, 0.8, 0.8];
const DEEP: [f32; 3] = [0.0, 0.2, 1.0];
const BLUE: [f32; 3] = [0.0, 0.0, 1.0];

/// Land colours per slot, innermost first. Slot 4 is the temperate one.
const SLOT_PALETTES: [[[f32; 3]; 6]; PLANET_SLOT_COUNT] = [
    [GREEN, RED, RED, RED, RED, GREY],
    [GREEN, EMBER, EMBER, EMBER, EMBER, EMBER],
    [GREEN, EMBER, EMBER, EMBER, EMBER, EMBER],
    [GREEN, GREEN, [237.0 / 255.0, 166.0 / 255.0, 66.0 / 255.0], [1.0, 1.0, 1.0], [0.0, 0.7, 0.0], GREY],
    [GREEN, ASH, ASH, ASH, ASH, ASH],
    [GREEN, EMBER, EMBER, EMBER, EMBER, EMBER],
    [GREEN, EMBER, EMBER, EMBER, EMBER, EMBER],
    [GREEN, DEEP, DEEP, DEEP, DEEP, DEEP],
    [GREEN, BLUE, BLUE, BLUE, BLUE, BLUE],
];

/// A place a planet can occupy.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanetSlot {
    /// Distance from the sun along x.
    pub distance: f32,
    pub rotation_speed: f32,
    pub palette: Palette,
}

/// The nine slots, innermost first.
pub fn planet_slots() -> Vec<PlanetSlot> {
    let sea = Palette::default().sea;
    SLOT_PALETTES
        .iter()
        .enumerate()
        .map(|(i, colors)| PlanetSlot {
            distance: 5.0 * (i as f32 + 1.0),
            rotation_speed: i as f32 + 1.0,
            palette: Palette {
                sea,
                land: colors.iter().map(|c| Vec3::from_array(*c)).collect(),
            },
        })
        .collect()
}

/// System-wide generation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemSettings {
    /// Planets to place, clamped to [`PLANET_SLOT_COUNT`].
    pub planet_count: usize,
    /// Shared planet settings. Name, location, spin and palette are filled in per slot.
    pub template: PlanetConfig,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            planet_count: 5,
            template: PlanetConfig::default(),
        }
    }
}

/// A sun and its planets.
#[derive(Debug, Clone)]
pub struct SolarSystem {
    pub name: String,
    pub sun: Planet,
    pub planets: Vec<Planet>,
}

impl SolarSystem {
    /// Generate a full system.
    pub fn generate<R: Rng + ?Sized>(settings: &SystemSettings, rng: &mut R, assets: &dyn MeshSource) -> Self {
        let watch = Stopwatch::start();

        let sun = Planet::generate(PlanetConfig::sun(), &mut StdRng::seed_from_u64(rng.gen()), assets);

        let count = settings.planet_count.min(PLANET_SLOT_COUNT);
        if count < settings.planet_count {
            log::warn!(
                "{} planets requested, only {} slots available",
                settings.planet_count,
                PLANET_SLOT_COUNT
            );
        }

        let slots = planet_slots();
        let chosen: Vec<&PlanetSlot> = slots.choose_multiple(rng, count).collect();

        let name = generate_system_name(rng);
        let mut planets = Vec::with_capacity(count);
        for slot in chosen {
            let config = slot_config(slot, &settings.template, &name, planets.len(), rng);
            let mut planet_rng = StdRng::seed_from_u64(rng.gen());
            planets.push(Planet::generate(config, &mut planet_rng, assets));
        }

        let system = Self { name, sun, planets };
        log::info!(
            "Generated system '{}' with {} planets, {} triangles total, {:.4}s",
            system.name,
            system.planets.len(),
            system.total_triangles(),
            watch.elapsed_seconds()
        );
        system
    }

    /// Triangles across the sun and every planet.
    pub fn total_triangles(&self) -> usize {
        self.sun.triangle_count() + self.planets.iter().map(Planet::triangle_count).sum::<usize>()
    }

    pub fn planet(&self, index: usize) -> Option<&Planet> {
        self.planets.get(index)
    }

    /// Swap in a freshly generated planet at `index`. Returns `false` if there is no such planet.
    pub fn regenerate_planet<R: Rng + ?Sized>(
        &mut self,
        index: usize,
        config: PlanetConfig,
        rng: &mut R,
        assets: &dyn MeshSource,
    ) -> bool {
        let Some(current) = self.planets.get(index) else {
            return false;
        };
        let replacement = current.regenerate(config, rng, assets);
        self.planets[index] = replacement;
        true
    }
}

/// Planet settings for `slot`, mirrored to the far side of the sun half the time.
fn slot_config<R: Rng + ?Sized>(
    slot: &PlanetSlot,
    template: &PlanetConfig,
    system_name: &str,
    ordinal: usize,
    rng: &mut R,
) -> PlanetConfig {
    let side = if rng.gen_bool(0.5) { -1.0 } else { 1.0 };
    let mut biomes = template.biomes.clone();
    biomes.palette = slot.palette.clone();
    PlanetConfig {
        name: format!("{} {}", system_name, ROMAN.get(ordinal).copied().unwrap_or("X")),
        location: Vec3::new(slot.distance * side, 0.0, 0.0),
        rotation_speed: slot.rotation_speed,
        biomes,
        ..template.clone()
    }
}

const ROMAN: [&str; PLANET_SLOT_COUNT] = ["I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX"];

/// Star-style system name from syllables.
fn generate_system_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let syllables = ["Sol", "Alp", "Bet", "Gam", "Sig", "Tau", "Rig", "Veg",
                     "Pro", "Arc", "Sir", "Pol", "Den", "Alt", "Cap", "Ald"];
    let suffixes = ["a", "us", "is", "ar", "el", "ix", "on", "ae"];
    format!(
        "{}{}",
        syllables[rng.gen_range(0..syllables.len())],
        suffixes[rng.gen_range(0..suffixes.len())]
    )
}
