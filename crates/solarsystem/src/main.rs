//! Headless solar system generator.
//!
//! Reads `config.ron`, builds a sun and its planets, grows a tree skeleton at
//! every anchor and hands each mesh to a sink. Run with `RUST_LOG=debug` to see
//! per-stage progress.

mod config;
mod sink;

use anyhow::Result;
use engine_core::{MeshSink, Stopwatch};
use procgen::{LSystem, ObjLoader, Planet, RuleSet, SolarSystem};
use rand::prelude::*;

use config::SystemConfig;
use sink::{LogSink, ObjExportSink};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("╔══════════════════════════════════════════════╗");
    println!("║               Solar System Gen               ║");
    println!("╠══════════════════════════════════════════════╣");
    println!("║  Settings are read from ./config.ron         ║");
    println!("║  RUST_LOG=debug shows each generation stage  ║");
    println!("╚══════════════════════════════════════════════╝");

    let config = SystemConfig::load();
    let seed = config.seed.unwrap_or_else(rand::random);
    log::info!("Seed {}", seed);
    let mut rng = StdRng::seed_from_u64(seed);

    let system = SolarSystem::generate(&config.system_settings(), &mut rng, &ObjLoader);

    let rules = match &config.rule_file {
        Some(path) => RuleSet::load_or_default(path),
        None => RuleSet::basic(),
    };
    let generations = config.tree_generations.unwrap_or(rules.generations);
    let (trees, elapsed) = Stopwatch::time(|| grow_trees(&system, &rules, generations, &mut rng));
    log::info!(
        "Grew {} '{}' trees over {} generations, {} symbols, {:.4}s",
        trees.count,
        rules.name,
        generations,
        trees.symbols,
        elapsed.as_secs_f64()
    );

    let mut log_sink = LogSink::default();
    submit_system(&system, &mut log_sink)?;
    if let Some(dir) = &config.export_dir {
        let mut export = ObjExportSink::create(dir)?;
        submit_system(&system, &mut export)?;
        log::info!("Wrote {} meshes to {:?}", export.written.len(), dir);
    }

    for planet in &system.planets {
        println!(
            "{:<14} {:>5} verts {:>5} tris  moon: {:<5} ring: {:<5} trees: {}  sea: {}  regions: {:?}",
            planet.name(),
            planet.vertex_count(),
            planet.triangle_count(),
            planet.has_moon(),
            planet.has_ring(),
            planet.tree_anchors.len(),
            planet.biome_map.sea_count(),
            planet.biome_map.region_sizes()
        );
    }
    println!(
        "System '{}': {} meshes, total number of tris: {}",
        system.name,
        log_sink.meshes,
        system.total_triangles()
    );

    Ok(())
}

#[derive(Debug, Default, PartialEq)]
struct TreeStats {
    count: usize,
    symbols: usize,
}

/// Grow one skeleton per anchor on every planet.
fn grow_trees<R: Rng + ?Sized>(system: &SolarSystem, rules: &RuleSet, generations: u32, rng: &mut R) -> TreeStats {
    let mut stats = TreeStats::default();
    for planet in &system.planets {
        for &anchor in &planet.tree_anchors {
            let mut tree = LSystem::new(rules.clone());
            tree.run(generations, rng);
            let skeleton = tree.skeleton();
            let frame = planet.tree_transform(anchor);
            log::debug!(
                "{} tree at vertex {} ({:.3}, {:.3}, {:.3}): {} symbols",
                planet.name(),
                anchor,
                frame.position.x,
                frame.position.y,
                frame.position.z,
                skeleton.symbols.len()
            );
            stats.count += 1;
            stats.symbols += skeleton.symbols.len();
        }
    }
    stats
}

/// Hand the sun and every planet (with its moon and ring) to `sink`.
fn submit_system(system: &SolarSystem, sink: &mut dyn MeshSink) -> Result<()> {
    sink.submit("sun", &system.sun.mesh())?;
    for planet in &system.planets {
        submit_planet(planet, sink)?;
    }
    Ok(())
}

fn submit_planet(planet: &Planet, sink: &mut dyn MeshSink) -> Result<()> {
    sink.submit(planet.name(), &planet.mesh())?;
    if let Some(moon) = &planet.moon {
        sink.submit(&format!("{} moon", planet.name()), &moon.mesh)?;
    }
    if let Some(ring) = &planet.ring {
        sink.submit(&format!("{} ring", planet.name()), ring)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use procgen::{PlanetConfig, SystemSettings};

    fn small_system(seed: u64) -> SolarSystem {
        let settings = SystemSettings {
            planet_count: 3,
            template: PlanetConfig {
                moon_chance: 1.0,
                max_trees: 2,
                ..Default::default()
            },
        };
        SolarSystem::generate(&settings, &mut StdRng::seed_from_u64(seed), &ObjLoader)
    }

    #[test]
    fn every_body_reaches_the_sink() {
        let system = small_system(4);
        let mut sink = LogSink::default();
        submit_system(&system, &mut sink).unwrap();
        // sun + three planets + three moons, no ring asset configured
        assert_eq!(sink.meshes, 7);
    }

    #[test]
    fn one_tree_per_anchor() {
        let system = small_system(9);
        let anchors: usize = system.planets.iter().map(|p| p.tree_anchors.len()).sum();
        let stats = grow_trees(&system, &RuleSet::basic(), 2, &mut StdRng::seed_from_u64(1));
        assert_eq!(stats.count, anchors);
        if anchors > 0 {
            assert!(stats.symbols > anchors);
        }
    }
}
