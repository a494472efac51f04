use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};
use rand::Rng;

use super::links::Link;
use super::particle::Particle;
use super::quadtree::QuadNode;
use crate::config::{AnchorConfig, CenterConfig, LinkConfig, ManyBodyConfig};

/// Every force the simulation knows how to apply.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ForceKind {
    ManyBody,
    Link,
    Center,
    Anchor,
}

impl ForceKind {
    /// Fixed application order within a tick.
    pub const ORDER: [ForceKind; 4] = [
        ForceKind::ManyBody,
        ForceKind::Link,
        ForceKind::Center,
        ForceKind::Anchor,
    ];

    fn bit(self) -> u8 {
        match self {
            Self::ManyBody => 1 << 0,
            Self::Link => 1 << 1,
            Self::Center => 1 << 2,
            Self::Anchor => 1 << 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::ManyBody => "many-body",
            Self::Link => "link",
            Self::Center => "center",
            Self::Anchor => "anchor",
        }
    }
}

/// Set of active forces, iterated in [`ForceKind::ORDER`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ActiveForces(u8);

impl ActiveForces {
    pub const NONE: Self = Self(0);

    pub fn only(kind: ForceKind) -> Self {
        Self(kind.bit())
    }

    pub fn with(self, kind: ForceKind) -> Self {
        Self(self.0 | kind.bit())
    }

    pub fn without(self, kind: ForceKind) -> Self {
        Self(self.0 & !kind.bit())
    }

    pub fn contains(self, kind: ForceKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = ForceKind> {
        ForceKind::ORDER
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

impl FromIterator<ForceKind> for ActiveForces {
    fn from_iter<I: IntoIterator<Item = ForceKind>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, Self::with)
    }
}

fn jitter_direction(rng: &mut impl Rng) -> Vec2 {
    let angle = rng.gen_range(0.0..TAU);
    vec2(angle.cos(), angle.sin())
}

struct ManyBodyParams {
    strength: f32,
    theta: f32,
    distance_min_sq: f32,
    distance_max_sq: f32,
    alpha: f32,
}

/// Velocity delta on a particle at `point` from a charge `mass` at `other`.
fn repulsion_between(
    point: Vec2,
    other: Vec2,
    mass: f32,
    params: &ManyBodyParams,
    rng: &mut impl Rng,
) -> Vec2 {
    let mut delta = other - point;
    let mut distance_sq = delta.length_sq();
    if distance_sq >= params.distance_max_sq {
        return Vec2::ZERO;
    }

    if distance_sq < params.distance_min_sq {
        let direction = if distance_sq > f32::EPSILON {
            delta / distance_sq.sqrt()
        } else {
            jitter_direction(rng)
        };
        distance_sq = params.distance_min_sq;
        delta = direction * params.distance_min_sq.sqrt();
    }

    delta * (params.strength * mass * params.alpha / distance_sq)
}

fn accumulate_repulsion_for_node(
    node: &QuadNode,
    index: usize,
    particles: &[Particle],
    params: &ManyBodyParams,
    rng: &mut impl Rng,
    velocity: &mut Vec2,
) {
    if node.count == 0 || node.mass <= 0.0 {
        return;
    }

    let point = particles[index].position;

    if node.is_leaf() {
        for &other_index in &node.indices {
            if other_index == index {
                continue;
            }
            let other = &particles[other_index];
            *velocity += repulsion_between(point, other.position, other.mass, params, rng);
        }
        return;
    }

    let delta = node.center_of_mass - point;
    let distance_sq = delta.length_sq().max(params.distance_min_sq);
    let side = node.bounds.side_length();
    let can_approximate = !node.bounds.contains(point)
        && node.count > 1
        && (side * side) < (params.theta * params.theta * distance_sq);

    if can_approximate {
        *velocity += repulsion_between(point, node.center_of_mass, node.mass, params, rng);
        return;
    }

    for child in node.children.iter().flatten() {
        accumulate_repulsion_for_node(child, index, particles, params, rng, velocity);
    }
}

/// Barnes-Hut repulsion. The tree is rebuilt from the current positions.
pub(crate) fn apply_many_body(
    particles: &mut [Particle],
    config: &ManyBodyConfig,
    alpha: f32,
    rng: &mut impl Rng,
    positions: &mut Vec<Vec2>,
    masses: &mut Vec<f32>,
    deltas: &mut Vec<Vec2>,
) {
    if particles.len() < 2 || config.strength == 0.0 {
        return;
    }

    positions.clear();
    masses.clear();
    for particle in particles.iter() {
        positions.push(particle.position);
        masses.push(particle.mass);
    }

    let Some(quadtree) = QuadNode::build(positions, masses) else {
        return;
    };

    let params = ManyBodyParams {
        strength: config.strength,
        theta: config.theta,
        distance_min_sq: config.distance_min * config.distance_min,
        distance_max_sq: config
            .distance_max
            .map(|distance| distance * distance)
            .unwrap_or(f32::INFINITY),
        alpha,
    };

    deltas.clear();
    deltas.resize(particles.len(), Vec2::ZERO);
    for (index, delta) in deltas.iter_mut().enumerate() {
        accumulate_repulsion_for_node(&quadtree, index, particles, &params, rng, delta);
    }

    for (particle, delta) in particles.iter_mut().zip(deltas.iter()) {
        particle.velocity += *delta;
    }
}

/// Spring toward the rest length, looking one step ahead along velocity.
pub(crate) fn apply_links(
    particles: &mut [Particle],
    links: &[Link],
    config: &LinkConfig,
    alpha: f32,
    rng: &mut impl Rng,
) {
    for _ in 0..config.iterations {
        for link in links {
            let (source, target) = (link.source, link.target);
            if source == target || source >= particles.len() || target >= particles.len() {
                continue;
            }

            let source_next = particles[source].position + particles[source].velocity;
            let target_next = particles[target].position + particles[target].velocity;
            let mut delta = target_next - source_next;
            if delta.length_sq() <= f32::EPSILON {
                delta = jitter_direction(rng) * 1.0e-3;
            }

            let distance = delta.length();
            let stretch = (distance - config.distance) / distance * alpha * link.strength;
            let correction = delta * stretch;

            particles[target].velocity -= correction * link.bias;
            particles[source].velocity += correction * (1.0 - link.bias);
        }
    }
}

/// Shifts every particle so the centroid moves toward `target`.
pub(crate) fn apply_center(particles: &mut [Particle], config: &CenterConfig, target: Vec2) {
    if particles.is_empty() || config.strength == 0.0 {
        return;
    }

    let mut centroid = Vec2::ZERO;
    for particle in particles.iter() {
        centroid += particle.position;
    }
    centroid /= particles.len() as f32;

    let shift = (centroid - target) * config.strength;
    for particle in particles.iter_mut() {
        particle.position -= shift;
    }
}

/// Weak spring toward each particle's geographic anchor.
pub(crate) fn apply_anchor(particles: &mut [Particle], config: &AnchorConfig, alpha: f32) {
    let pull = config.strength * alpha;
    if pull == 0.0 {
        return;
    }

    for particle in particles.iter_mut() {
        let anchor = particle.anchor();
        particle.velocity += (anchor - particle.position) * pull;
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::sim::particle::ParticleStore;

    fn store(points: &[Vec2]) -> ParticleStore {
        let ids = (0..points.len()).map(|index| format!("P{index}")).collect::<Vec<_>>();
        let mut store = ParticleStore::initialize(
            ids.iter().map(|id| (id.as_str(), Vec2::ZERO)),
            Vec2::ZERO,
        );
        for (particle, point) in store.particles_mut().iter_mut().zip(points) {
            particle.position = *point;
        }
        store
    }

    fn many_body(store: &mut ParticleStore, config: &ManyBodyConfig, rng: &mut StdRng) {
        let (mut positions, mut masses, mut deltas) = (Vec::new(), Vec::new(), Vec::new());
        apply_many_body(
            store.particles_mut(),
            config,
            1.0,
            rng,
            &mut positions,
            &mut masses,
            &mut deltas,
        );
    }

    #[test]
    fn active_forces_iterate_in_fixed_order() {
        let forces: ActiveForces = [ForceKind::Anchor, ForceKind::ManyBody, ForceKind::Link]
            .into_iter()
            .collect();
        assert_eq!(
            forces.iter().collect::<Vec<_>>(),
            vec![ForceKind::ManyBody, ForceKind::Link, ForceKind::Anchor]
        );
        assert!(!forces.without(ForceKind::Link).contains(ForceKind::Link));
        assert!(ActiveForces::NONE.is_empty());
    }

    #[test]
    fn many_body_pushes_pair_apart_symmetrically() {
        let mut store = store(&[vec2(0.0, 0.0), vec2(10.0, 0.0)]);
        let mut rng = StdRng::seed_from_u64(1);
        many_body(&mut store, &ManyBodyConfig::default(), &mut rng);

        let left = store.particles()[0].velocity;
        let right = store.particles()[1].velocity;
        assert!(left.x < 0.0 && right.x > 0.0);
        assert!((left + right).length() < 1e-5);
        assert!((right.x - 3.0).abs() < 1e-4);
    }

    #[test]
    fn coincident_particles_separate_with_bounded_push() {
        let mut store = store(&[vec2(5.0, 5.0), vec2(5.0, 5.0)]);
        let mut rng = StdRng::seed_from_u64(7);
        let config = ManyBodyConfig::default();
        many_body(&mut store, &config, &mut rng);

        for particle in store.particles() {
            assert!(particle.velocity.is_finite());
            let limit = config.strength.abs() / config.distance_min + 1e-4;
            assert!(particle.velocity.length() <= limit);
            assert!(particle.velocity.length() > 0.0);
        }
    }

    #[test]
    fn barnes_hut_matches_exact_summation_closely() {
        let points = (0..400)
            .map(|index| {
                let angle = index as f32 * 2.399_963;
                let radius = 6.0 * (index as f32 + 0.5).sqrt();
                vec2(angle.cos() * radius, angle.sin() * radius)
            })
            .collect::<Vec<_>>();

        let mut approximate = store(&points);
        let mut rng = StdRng::seed_from_u64(3);
        many_body(&mut approximate, &ManyBodyConfig::default(), &mut rng);

        let mut exact = store(&points);
        let exact_config = ManyBodyConfig {
            theta: 0.0,
            ..ManyBodyConfig::default()
        };
        many_body(&mut exact, &exact_config, &mut rng);

        let mut error = 0.0;
        let mut magnitude = 0.0;
        for (a, b) in approximate.particles().iter().zip(exact.particles()) {
            error += (a.velocity - b.velocity).length();
            magnitude += b.velocity.length();
        }
        assert!(error / magnitude < 0.05, "relative error {}", error / magnitude);
    }

    #[test]
    fn distance_max_ignores_far_particles() {
        let mut store = store(&[vec2(0.0, 0.0), vec2(100.0, 0.0)]);
        let config = ManyBodyConfig {
            distance_max: Some(50.0),
            ..ManyBodyConfig::default()
        };
        many_body(&mut store, &config, &mut StdRng::seed_from_u64(1));
        assert_eq!(store.particles()[0].velocity, Vec2::ZERO);
    }

    #[test]
    fn link_pulls_stretched_pair_together() {
        let mut store = store(&[vec2(0.0, 0.0), vec2(100.0, 0.0)]);
        let links = [Link {
            source: 0,
            target: 1,
            flights: 1.0,
            strength: 1.0,
            bias: 0.5,
        }];
        apply_links(
            store.particles_mut(),
            &links,
            &LinkConfig::default(),
            1.0,
            &mut StdRng::seed_from_u64(1),
        );

        assert!((store.particles()[0].velocity.x - 35.0).abs() < 1e-4);
        assert!((store.particles()[1].velocity.x + 35.0).abs() < 1e-4);
    }

    #[test]
    fn center_moves_centroid_by_strength_fraction() {
        let mut store = store(&[vec2(10.0, 0.0), vec2(30.0, 20.0)]);
        apply_center(
            store.particles_mut(),
            &CenterConfig { strength: 0.5 },
            vec2(0.0, 0.0),
        );
        assert_eq!(store.centroid(), Some(vec2(10.0, 5.0)));
    }

    #[test]
    fn anchor_pulls_toward_anchor() {
        let mut store = ParticleStore::initialize([("JFK", vec2(100.0, 0.0))], Vec2::ZERO);
        store.particles_mut()[0].position = Vec2::ZERO;
        apply_anchor(store.particles_mut(), &AnchorConfig { strength: 0.1 }, 0.5);
        assert!((store.particles()[0].velocity - vec2(5.0, 0.0)).length() < 1e-5);
    }
}
