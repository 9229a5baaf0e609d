//! Biome classification: nearest-site (Voronoi-style) regions on a displaced sphere.
//!
//! A handful of displaced vertices are drawn as biome sites. Every vertex joins
//! the region of its nearest site, unless it sits at or below the water line,
//! in which case it is sea. Land vertices take their region's palette colour
//! with a small per-channel jitter so flat regions don't read as flat shading.

use glam::Vec3;
use rand::Rng;

/// Biome assigned to a single vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Biome {
    /// Vertex is within the water depth of the planet centre.
    Sea,
    /// Region of the site with this index.
    Land(usize),
}

impl Biome {
    pub fn is_sea(self) -> bool {
        matches!(self, Biome::Sea)
    }

    /// Site index for land, `None` for sea.
    pub fn site(self) -> Option<usize> {
        match self {
            Biome::Sea => None,
            Biome::Land(i) => Some(i),
        }
    }
}

/// Colours for sea and the land regions.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub sea: Vec3,
    /// Indexed by site; wraps when there are more sites than colours.
    pub land: Vec<Vec3>,
}

impl Palette {
    /// Grass, sand, snow, jungle, rock.
    pub fn temperate() -> Self {
        Self {
            sea: Vec3::new(0.10, 0.30, 0.75),
            land: vec![
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(237.0 / 255.0, 166.0 / 255.0, 66.0 / 255.0),
                Vec3::new(1.0, 1.0, 1.0),
                Vec3::new(0.0, 0.7, 0.0),
                Vec3::new(0.5, 0.5, 0.5),
            ],
        }
    }

    /// Colour for land region `site`.
    pub fn land_color(&self, site: usize) -> Vec3 {
        assert!(!self.land.is_empty(), "palette needs at least one land colour");
        self.land[site % self.land.len()]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::temperate()
    }
}

/// Classification knobs.
#[derive(Debug, Clone, PartialEq)]
pub struct BiomeParams {
    /// Number of sites drawn from the vertex set.
    pub site_count: usize,
    /// Vertices at or below this distance from the centre are sea.
    pub water_depth: f32,
    pub palette: Palette,
    /// Maximum per-channel colour offset, in 1/255 steps.
    pub color_jitter: i32,
}

impl Default for BiomeParams {
    fn default() -> Self {
        Self {
            site_count: 5,
            water_depth: 1.05,
            palette: Palette::default(),
            color_jitter: 15,
        }
    }
}

/// Per-vertex classification result; `biomes` and `colors` are parallel to the input vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct BiomeMap {
    pub sites: Vec<Vec3>,
    pub biomes: Vec<Biome>,
    pub colors: Vec<Vec3>,
}

impl BiomeMap {
    /// Number of vertices in each land region, indexed by site.
    pub fn region_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.sites.len()];
        for site in self.biomes.iter().filter_map(|b| b.site()) {
            sizes[site] += 1;
        }
        sizes
    }

    pub fn sea_count(&self) -> usize {
        self.biomes.iter().filter(|b| b.is_sea()).count()
    }
}

/// Draw `count` site positions uniformly from `vertices`. Duplicates are allowed.
pub fn select_sites<R: Rng + ?Sized>(vertices: &[Vec3], count: usize, rng: &mut R) -> Vec<Vec3> {
    assert!(!vertices.is_empty(), "cannot pick biome sites from an empty vertex set");
    (0..count)
        .map(|_| vertices[rng.gen_range(0..vertices.len())])
        .collect()
}

/// Index of the site nearest to `point`.
///
/// Exact ties are settled uniformly: the `k`-th equidistant site seen replaces
/// the current pick with probability `1/k`.
pub fn nearest_site<R: Rng + ?Sized>(point: Vec3, sites: &[Vec3], rng: &mut R) -> usize {
    assert!(!sites.is_empty(), "nearest_site needs at least one site");
    let mut best = 0;
    let mut best_dist = point.distance(sites[0]);
    let mut ties = 1u32;
    for (i, site) in sites.iter().enumerate().skip(1) {
        let dist = point.distance(*site);
        if dist < best_dist {
            best = i;
            best_dist = dist;
            ties = 1;
        } else if dist == best_dist {
            ties += 1;
            if rng.gen_range(0..ties) == 0 {
                best = i;
            }
        }
    }
    best
}

/// Offset each channel by a random integer in `[-jitter, jitter]` / 255, clamped to `[0, 1]`.
pub fn jitter_color<R: Rng + ?Sized>(base: Vec3, jitter: i32, rng: &mut R) -> Vec3 {
    if jitter <= 0 {
        return base;
    }
    let mut offset = || rng.gen_range(-jitter..=jitter) as f32 / 255.0;
    (base + Vec3::new(offset(), offset(), offset())).clamp(Vec3::ZERO, Vec3::ONE)
}

/// Pick sites from `vertices` and classify every vertex against them.
pub fn classify<R: Rng + ?Sized>(vertices: &[Vec3], params: &BiomeParams, rng: &mut R) -> BiomeMap {
    let sites = select_sites(vertices, params.site_count, rng);
    classify_with_sites(vertices, sites, params, rng)
}

/// Classify every vertex against a given site set.
pub fn classify_with_sites<R: Rng + ?Sized>(
    vertices: &[Vec3],
    sites: Vec<Vec3>,
    params: &BiomeParams,
    rng: &mut R,
) -> BiomeMap {
    let mut biomes = Vec::with_capacity(vertices.len());
    let mut colors = Vec::with_capacity(vertices.len());

    for &v in vertices {
        let site = nearest_site(v, &sites, rng);
        if v.length() <= params.water_depth {
            biomes.push(Biome::Sea);
            colors.push(params.palette.sea);
        } else {
            biomes.push(Biome::Land(site));
            colors.push(jitter_color(params.palette.land_color(site), params.color_jitter, rng));
        }
    }

    BiomeMap { sites, biomes, colors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icosphere::IcoSphere;
    use crate::terrain::{displace, NoiseParams};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn every_vertex_gets_one_biome_and_colour() {
        let mut rng = StdRng::seed_from_u64(11);
        let sphere = IcoSphere::new(2);
        let displaced = displace(&sphere.vertices, &NoiseParams::default(), &mut rng);
        let params = BiomeParams::default();
        let map = classify(&displaced, &params, &mut rng);

        assert_eq!(map.sites.len(), params.site_count);
        assert_eq!(map.biomes.len(), displaced.len());
        assert_eq!(map.colors.len(), displaced.len());
        for b in &map.biomes {
            match b {
                Biome::Sea => {}
                Biome::Land(i) => assert!(*i < params.site_count),
            }
        }
        assert_eq!(map.region_sizes().iter().sum::<usize>() + map.sea_count(), displaced.len());
    }

    #[test]
    fn water_depth_overrides_nearest_site() {
        let mut rng = StdRng::seed_from_u64(0);
        let sites = vec![Vec3::new(1.0, 0.0, 0.0), Vec3::new(-1.2, 0.0, 0.0)];
        // Sits right on site 0 but below the water line.
        let shallow = Vec3::new(1.0, 0.0, 0.0);
        let high = Vec3::new(-1.2, 0.0, 0.0);
        let params = BiomeParams {
            water_depth: 1.05,
            ..Default::default()
        };
        let map = classify_with_sites(&[shallow, high], sites, &params, &mut rng);
        assert_eq!(map.biomes[0], Biome::Sea);
        assert_eq!(map.colors[0], params.palette.sea);
        assert_eq!(map.biomes[1], Biome::Land(1));
    }

    #[test]
    fn vertex_exactly_at_water_depth_is_sea() {
        let mut rng = StdRng::seed_from_u64(0);
        let params = BiomeParams {
            water_depth: 1.1,
            ..Default::default()
        };
        let v = Vec3::new(0.0, 1.1, 0.0);
        let map = classify_with_sites(&[v], vec![v], &params, &mut rng);
        assert_eq!(map.biomes[0], Biome::Sea);
    }

    #[test]
    fn equidistant_sites_are_both_chosen_over_many_draws() {
        let mut rng = StdRng::seed_from_u64(123);
        let sites = [Vec3::X, -Vec3::X];
        let mut seen = [false; 2];
        for _ in 0..64 {
            seen[nearest_site(Vec3::Y, &sites, &mut rng)] = true;
        }
        assert_eq!(seen, [true, true]);
    }

    #[test]
    fn duplicate_sites_share_ties_evenly() {
        let mut rng = StdRng::seed_from_u64(5);
        let sites = [Vec3::X; 3];
        let mut counts = [0usize; 3];
        for _ in 0..3000 {
            counts[nearest_site(Vec3::Y, &sites, &mut rng)] += 1;
        }
        for c in counts {
            assert!((850..=1150).contains(&c), "uneven tie split: {:?}", counts);
        }
    }

    #[test]
    fn nearest_site_without_ties_is_exact() {
        let mut rng = StdRng::seed_from_u64(1);
        let sites = [Vec3::X, Vec3::Y, Vec3::Z];
        assert_eq!(nearest_site(Vec3::new(0.1, 0.0, 0.9), &sites, &mut rng), 2);
    }

    #[test]
    fn jitter_stays_within_range_and_clamped() {
        let mut rng = StdRng::seed_from_u64(5);
        let base = Vec3::new(0.0, 0.5, 1.0);
        for _ in 0..200 {
            let c = jitter_color(base, 15, &mut rng);
            assert!((c - base).abs().max_element() <= 15.0 / 255.0 + 1e-6);
            assert!(c.min_element() >= 0.0 && c.max_element() <= 1.0);
        }
    }

    #[test]
    fn land_colours_wrap_around_palette() {
        let p = Palette::temperate();
        assert_eq!(p.land_color(p.land.len()), p.land[0]);
    }

    #[test]
    #[should_panic]
    fn selecting_sites_from_nothing_panics() {
        let mut rng = StdRng::seed_from_u64(0);
        let _ = select_sites(&[], 5, &mut rng);
    }
}
