//! Force simulation for airport networks.
//!
//! One [`Simulation::tick`] runs a single integration step: alpha decays toward
//! its target, the active forces add velocity (or, for centering, shift
//! positions), and every unpinned particle integrates with friction. The host
//! drives ticks from its own frame clock; nothing here owns a timer.

mod forces;
mod interaction;
mod links;
mod mode;
mod particle;
mod quadtree;

use eframe::egui::{Vec2, vec2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::SimulationConfig;
use crate::error::SimulationResult;
use crate::flights::{Airport, FlightNetwork};
use crate::geo::Projection;

pub use forces::{ActiveForces, ForceKind};
pub use links::Link;
pub use mode::LayoutMode;
pub use particle::{Particle, ParticleStore};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: f32,
    pub height: f32,
}

impl Canvas {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(self) -> Vec2 {
        vec2(self.width * 0.5, self.height * 0.5)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationState {
    /// Alpha above its target; particles actively moving.
    Cooling,
    /// Alpha and target both below `alpha_min`; ticks skip force work.
    Resting,
    /// Alpha was forced up by an external event (drag, layout switch).
    Reheated,
}

fn classify(alpha: f32, alpha_target: f32, alpha_min: f32, reheated: bool) -> SimulationState {
    if reheated || alpha < alpha_target {
        SimulationState::Reheated
    } else if alpha < alpha_min && alpha_target < alpha_min {
        SimulationState::Resting
    } else {
        SimulationState::Cooling
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ParticlePosition<'a> {
    pub id: &'a str,
    pub x: f32,
    pub y: f32,
}

/// Read-only view of the particle set after a tick.
#[derive(Clone, Copy, Debug)]
pub struct Snapshot<'a> {
    pub tick: u64,
    pub alpha: f32,
    pub state: SimulationState,
    pub mode: LayoutMode,
    airports: &'a [Airport],
    particles: &'a [Particle],
}

impl<'a> Snapshot<'a> {
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &'a [Particle] {
        self.particles
    }

    pub fn positions(&self) -> impl Iterator<Item = ParticlePosition<'a>> + 'a {
        let airports = self.airports;
        let particles = self.particles;
        airports
            .iter()
            .zip(particles)
            .map(|(airport, particle)| ParticlePosition {
                id: airport.id.as_str(),
                x: particle.position.x,
                y: particle.position.y,
            })
    }

    pub fn record(&self) -> SnapshotRecord<'a> {
        SnapshotRecord {
            tick: self.tick,
            alpha: self.alpha,
            state: self.state,
            mode: self.mode,
            particles: self.positions().collect(),
        }
    }
}

/// Serializable form of a [`Snapshot`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SnapshotRecord<'a> {
    pub tick: u64,
    pub alpha: f32,
    pub state: SimulationState,
    pub mode: LayoutMode,
    pub particles: Vec<ParticlePosition<'a>>,
}

pub type TickCallback = Box<dyn FnMut(&Snapshot<'_>)>;

#[derive(Default)]
struct PhysicsScratch {
    positions: Vec<Vec2>,
    masses: Vec<f32>,
    deltas: Vec<Vec2>,
}

pub struct Simulation {
    config: SimulationConfig,
    airports: Vec<Airport>,
    store: ParticleStore,
    links: Vec<Link>,
    canvas: Canvas,
    mode: LayoutMode,
    active: ActiveForces,
    alpha: f32,
    alpha_target: f32,
    reheated: bool,
    active_drags: usize,
    tick_count: u64,
    rng: StdRng,
    on_tick: Option<TickCallback>,
    scratch: PhysicsScratch,
}

impl Simulation {
    /// Seats one particle per airport and binds every route to its endpoints.
    ///
    /// Starts in [`LayoutMode::Network`] with `alpha = config.alpha`.
    pub fn new(
        network: &FlightNetwork,
        canvas: Canvas,
        projection: &impl Projection,
        config: SimulationConfig,
    ) -> SimulationResult<Self> {
        config.validate()?;

        let airports = network.airports.clone();
        let store = ParticleStore::initialize(
            airports
                .iter()
                .map(|airport| (airport.id.as_str(), projection.project(airport.geo))),
            canvas.center(),
        );
        let links = links::bind_links(&network.routes, &store)?;

        info!(
            particles = store.len(),
            links = links.len(),
            width = canvas.width,
            height = canvas.height,
            "simulation constructed"
        );

        let mode = LayoutMode::Network;
        Ok(Self {
            alpha: config.alpha,
            alpha_target: config.alpha_target,
            rng: StdRng::seed_from_u64(config.seed),
            config,
            airports,
            store,
            links,
            canvas,
            mode,
            active: mode.forces(),
            reheated: false,
            active_drags: 0,
            tick_count: 0,
            on_tick: None,
            scratch: PhysicsScratch::default(),
        })
    }

    /// Runs one integration step and returns the resulting positions.
    pub fn tick(&mut self) -> Snapshot<'_> {
        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        self.reheated = false;

        if self.state() == SimulationState::Resting {
            self.hold_pins();
        } else {
            self.store.sanitize(self.canvas.center());
            for kind in self.active.iter() {
                self.apply_force(kind);
            }
            self.integrate();
        }
        self.tick_count += 1;

        if let Some(callback) = self.on_tick.as_mut() {
            let snapshot = Snapshot {
                tick: self.tick_count,
                alpha: self.alpha,
                state: classify(
                    self.alpha,
                    self.alpha_target,
                    self.config.alpha_min,
                    self.reheated,
                ),
                mode: self.mode,
                airports: &self.airports,
                particles: self.store.particles(),
            };
            callback(&snapshot);
        }

        self.snapshot()
    }

    fn apply_force(&mut self, kind: ForceKind) {
        match kind {
            ForceKind::ManyBody => forces::apply_many_body(
                self.store.particles_mut(),
                &self.config.many_body,
                self.alpha,
                &mut self.rng,
                &mut self.scratch.positions,
                &mut self.scratch.masses,
                &mut self.scratch.deltas,
            ),
            ForceKind::Link => forces::apply_links(
                self.store.particles_mut(),
                &self.links,
                &self.config.link,
                self.alpha,
                &mut self.rng,
            ),
            ForceKind::Center => forces::apply_center(
                self.store.particles_mut(),
                &self.config.center,
                self.canvas.center(),
            ),
            ForceKind::Anchor => {
                forces::apply_anchor(self.store.particles_mut(), &self.config.anchor, self.alpha)
            }
        }
    }

    fn integrate(&mut self) {
        let friction = 1.0 - self.config.velocity_decay;
        for particle in self.store.particles_mut() {
            match particle.pin {
                Some(pin) => {
                    particle.position = pin;
                    particle.velocity = Vec2::ZERO;
                }
                None => {
                    particle.velocity *= friction;
                    particle.position += particle.velocity;
                }
            }
        }
    }

    fn hold_pins(&mut self) {
        for particle in self.store.particles_mut() {
            if let Some(pin) = particle.pin {
                particle.position = pin;
                particle.velocity = Vec2::ZERO;
            }
        }
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            tick: self.tick_count,
            alpha: self.alpha,
            state: self.state(),
            mode: self.mode,
            airports: &self.airports,
            particles: self.store.particles(),
        }
    }

    /// Raises alpha to at least `alpha`. Alpha is not capped above.
    pub fn restart(&mut self, alpha: f32) {
        if alpha.is_finite() && alpha > self.alpha {
            self.alpha = alpha;
            self.reheated = true;
        }
    }

    pub fn state(&self) -> SimulationState {
        classify(
            self.alpha,
            self.alpha_target,
            self.config.alpha_min,
            self.reheated,
        )
    }

    pub fn set_on_tick(&mut self, callback: impl FnMut(&Snapshot<'_>) + 'static) {
        self.on_tick = Some(Box::new(callback));
    }

    pub fn clear_on_tick(&mut self) {
        self.on_tick = None;
    }

    /// Moves the center target and re-projects every geographic anchor.
    pub fn resize(&mut self, canvas: Canvas, projection: &impl Projection) {
        self.canvas = canvas;
        self.store.set_anchors(
            self.airports
                .iter()
                .map(|airport| projection.project(airport.geo)),
        );
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn set_alpha_target(&mut self, alpha_target: f32) {
        if alpha_target.is_finite() && alpha_target >= 0.0 {
            self.alpha_target = alpha_target;
        }
    }

    pub fn active_forces(&self) -> ActiveForces {
        self.active
    }

    pub fn set_active_forces(&mut self, forces: ActiveForces) {
        self.active = forces;
    }

    pub fn particles(&self) -> &[Particle] {
        self.store.particles()
    }

    pub fn airports(&self) -> &[Airport] {
        &self.airports
    }

    pub fn airport(&self, index: usize) -> Option<&Airport> {
        self.airports.get(index)
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.store.index_of(id)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn centroid(&self) -> Option<Vec2> {
        self.store.centroid()
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}
