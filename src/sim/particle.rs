use std::collections::HashMap;
use std::f32::consts::PI;

use eframe::egui::{Vec2, vec2};
use tracing::warn;

const INITIAL_RADIUS: f32 = 10.0;
const POSITION_LIMIT: f32 = 1.0e6;

/// Mutable physical state of one simulated airport.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Forced position; while set the particle does not integrate velocity.
    pub pin: Option<Vec2>,
    /// Charge multiplier for many-body repulsion.
    pub mass: f32,
    anchor: Vec2,
}

impl Particle {
    pub fn anchor(&self) -> Vec2 {
        self.anchor
    }

    pub fn is_pinned(&self) -> bool {
        self.pin.is_some()
    }
}

/// Phyllotaxis seat for the particle at `index`, spiralling out from `center`.
pub(crate) fn seat(index: usize, center: Vec2) -> Vec2 {
    let angle_step = PI * (3.0 - 5.0_f32.sqrt());
    let radius = INITIAL_RADIUS * (0.5 + index as f32).sqrt();
    let angle = index as f32 * angle_step;
    center + vec2(angle.cos(), angle.sin()) * radius
}

/// Arena of particles indexed by a stable small integer.
#[derive(Clone, Debug, Default)]
pub struct ParticleStore {
    particles: Vec<Particle>,
    index_by_id: HashMap<String, usize>,
}

impl ParticleStore {
    /// Seats every node on a phyllotaxis spiral around `center` with zero velocity.
    pub fn initialize<'a>(
        nodes: impl IntoIterator<Item = (&'a str, Vec2)>,
        center: Vec2,
    ) -> Self {
        let mut particles = Vec::new();
        let mut index_by_id = HashMap::new();
        for (index, (id, anchor)) in nodes.into_iter().enumerate() {
            index_by_id.insert(id.to_owned(), index);
            particles.push(Particle {
                position: seat(index, center),
                velocity: Vec2::ZERO,
                pin: None,
                mass: 1.0,
                anchor,
            });
        }

        Self {
            particles,
            index_by_id,
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Particle> {
        self.particles.get_mut(index)
    }

    pub fn set_anchors(&mut self, anchors: impl IntoIterator<Item = Vec2>) {
        for (particle, anchor) in self.particles.iter_mut().zip(anchors) {
            particle.anchor = anchor;
        }
    }

    /// Replaces non-finite state so one bad tick cannot poison the quadtree.
    ///
    /// Returns how many particles needed repair.
    pub fn sanitize(&mut self, center: Vec2) -> usize {
        let mut repaired = 0usize;
        for (index, particle) in self.particles.iter_mut().enumerate() {
            let mut broken = false;
            if !particle.velocity.is_finite() {
                particle.velocity = Vec2::ZERO;
                broken = true;
            }
            if !particle.position.is_finite() {
                particle.position = particle
                    .pin
                    .filter(|pin| pin.is_finite())
                    .unwrap_or_else(|| seat(index, center));
                particle.velocity = Vec2::ZERO;
                broken = true;
            } else {
                particle.position = vec2(
                    particle.position.x.clamp(-POSITION_LIMIT, POSITION_LIMIT),
                    particle.position.y.clamp(-POSITION_LIMIT, POSITION_LIMIT),
                );
            }
            if !particle.mass.is_finite() || particle.mass < 0.0 {
                particle.mass = 1.0;
                broken = true;
            }
            if broken {
                repaired += 1;
            }
        }

        if repaired > 0 {
            warn!(repaired, "recovered non-finite particle state");
        }
        repaired
    }

    pub fn centroid(&self) -> Option<Vec2> {
        if self.particles.is_empty() {
            return None;
        }
        let mut sum = Vec2::ZERO;
        for particle in &self.particles {
            sum += particle.position;
        }
        Some(sum / self.particles.len() as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(count: usize) -> ParticleStore {
        let ids = (0..count).map(|index| format!("A{index}")).collect::<Vec<_>>();
        ParticleStore::initialize(
            ids.iter().map(|id| (id.as_str(), Vec2::ZERO)),
            vec2(100.0, 50.0),
        )
    }

    #[test]
    fn initial_state_is_finite_distinct_and_still() {
        let store = store(64);
        assert_eq!(store.len(), 64);
        for (index, particle) in store.particles().iter().enumerate() {
            assert!(particle.position.is_finite());
            assert_eq!(particle.velocity, Vec2::ZERO);
            for other in &store.particles()[index + 1..] {
                assert!((particle.position - other.position).length() > 0.5);
            }
        }
    }

    #[test]
    fn seats_spiral_around_center() {
        let first = seat(0, vec2(100.0, 50.0));
        let expected = INITIAL_RADIUS * 0.5_f32.sqrt();
        assert!(((first - vec2(100.0, 50.0)).length() - expected).abs() < 1e-4);
    }

    #[test]
    fn lookup_by_id() {
        let store = store(3);
        assert_eq!(store.index_of("A2"), Some(2));
        assert_eq!(store.index_of("B"), None);
    }

    #[test]
    fn sanitize_repairs_non_finite_state() {
        let mut store = store(2);
        store.particles_mut()[0].position = vec2(f32::NAN, 1.0);
        store.particles_mut()[1].velocity = vec2(f32::INFINITY, 0.0);

        assert_eq!(store.sanitize(vec2(100.0, 50.0)), 2);
        assert_eq!(store.particles()[0].position, seat(0, vec2(100.0, 50.0)));
        assert_eq!(store.particles()[1].velocity, Vec2::ZERO);
        assert_eq!(store.sanitize(vec2(100.0, 50.0)), 0);
    }

    #[test]
    fn centroid_of_empty_store_is_none() {
        assert!(ParticleStore::default().centroid().is_none());
    }
}
