//! The particle field: simulation state plus the per-frame tick.
//!
//! A [`ParticleField`] owns its particles, the active neighbor index and the
//! reusable buffers the tick needs. One call to [`Updatable::update`]:
//!
//! 1. rebuilds the neighbor index from current positions,
//! 2. finds connected pairs (candidate lookup, then exact distance test),
//! 3. applies pairwise repulsion when that interaction policy is active,
//! 4. draws the connections, then every particle's dot,
//! 5. advances every particle (pointer highlight, move, boundary policy).
//!
//! Clearing the canvas and decaying the pointer radius belong to the
//! [`Controller`](crate::controller::Controller), which owns the frame loop.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::FieldConfig;
use crate::error::ConfigError;
use crate::particle::{self, InteractionPolicy, Particle};
use crate::render::{connection_opacity, Canvas};
use crate::scene::{FrameContext, Scene, Updatable};
use crate::spatial::{NeighborIndex, NeighborStrategy};

/// A linked pair found during the last tick. `a < b` always holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
    pub distance_sq: f32,
    /// Line alpha, already multiplied by the global opacity.
    pub opacity: f32,
}

/// Particles, their neighbor index, and the connections between them.
pub struct ParticleField {
    config: FieldConfig,
    width: u32,
    height: u32,
    particles: Vec<Particle>,
    index: Box<dyn NeighborIndex>,
    connections: Vec<Connection>,
    positions: Vec<Vec2>,
    candidates: Vec<usize>,
    rng: StdRng,
}

impl ParticleField {
    /// Build a field for a `width` x `height` surface with entropy-seeded
    /// particles.
    pub fn new(config: FieldConfig, width: u32, height: u32) -> Result<Self, ConfigError> {
        Self::with_rng(config, width, height, StdRng::from_entropy())
    }

    /// Deterministic variant of [`ParticleField::new`].
    pub fn with_seed(config: FieldConfig, width: u32, height: u32, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, width, height, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: FieldConfig, width: u32, height: u32, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;
        let index = config.strategy.build(config.connection_distance)?;
        let mut field = Self {
            config,
            width: 0,
            height: 0,
            particles: Vec::new(),
            index,
            connections: Vec::new(),
            positions: Vec::new(),
            candidates: Vec::new(),
            rng,
        };
        field.reinit(width, height)?;
        Ok(field)
    }

    /// Build a field around explicit particles instead of random ones.
    pub fn from_particles(
        config: FieldConfig,
        width: u32,
        height: u32,
        particles: Vec<Particle>,
    ) -> Result<Self, ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::ZeroSurface { width, height });
        }
        config.validate()?;
        let index = config.strategy.build(config.connection_distance)?;
        Ok(Self {
            config,
            width,
            height,
            particles,
            index,
            connections: Vec::new(),
            positions: Vec::new(),
            candidates: Vec::new(),
            rng: StdRng::from_entropy(),
        })
    }

    /// Replace the neighbor index. Particle state is kept.
    pub fn set_strategy(&mut self, strategy: NeighborStrategy) -> Result<(), ConfigError> {
        self.index = strategy.build(self.config.connection_distance)?;
        self.config.strategy = strategy;
        log::info!("neighbor strategy switched to {}", strategy);
        Ok(())
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Pairs linked during the last [`ParticleField::find_connections`].
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Name of the active neighbor index.
    pub fn strategy_name(&self) -> &'static str {
        self.index.name()
    }

    /// Rebuild the index and recompute the connected pairs.
    pub fn find_connections(&mut self) -> &[Connection] {
        self.positions.clear();
        self.positions.extend(self.particles.iter().map(|p| p.position));
        let bounds = Vec2::new(self.width as f32, self.height as f32);
        self.index.rebuild(&self.positions, bounds);

        let threshold_sq = self.config.connection_distance * self.config.connection_distance;
        let opacity = self.config.color.opacity;
        self.connections.clear();

        for i in 0..self.positions.len() {
            self.candidates.clear();
            self.index.candidates(i, &self.positions, &mut self.candidates);
            let a = self.positions[i];
            for &j in &self.candidates {
                let distance_sq = a.distance_squared(self.positions[j]);
                if let Some(alpha) = connection_opacity(distance_sq, threshold_sq, opacity) {
                    self.connections.push(Connection {
                        a: i,
                        b: j,
                        distance_sq,
                        opacity: alpha,
                    });
                }
            }
        }
        &self.connections
    }

    /// Bounce approaching pairs among the current connections.
    fn repel(&mut self, distance: f32) {
        for c in &self.connections {
            let (head, tail) = self.particles.split_at_mut(c.b);
            particle::repel(&mut head[c.a], &mut tail[0], distance);
        }
    }

    /// Draw every connection found by the last search.
    pub fn draw_connections(&self, canvas: &mut dyn Canvas) {
        let color = self.config.color.connection;
        let width = self.config.line_width;
        for c in &self.connections {
            canvas.stroke_line(
                self.particles[c.a].position,
                self.particles[c.b].position,
                color.with_alpha(c.opacity),
                width,
            );
        }
    }

    fn spawn(&mut self) {
        let count = self.config.particle_count_for(self.width, self.height);
        let bounds = Vec2::new(self.width as f32, self.height as f32);
        let behavior = self.config.behavior();
        let fill = self.config.color.particle_fill();
        let (radius, speed) = (self.config.particle_radius, self.config.max_speed);
        self.particles = (0..count)
            .map(|_| {
                Particle::random(&mut self.rng, bounds, radius, speed)
                    .with_behavior(behavior)
                    .with_fill(fill)
            })
            .collect();
    }
}

impl Updatable for ParticleField {
    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        self.find_connections();
        if let InteractionPolicy::PairwiseRepel { distance } = self.config.interaction {
            self.repel(distance);
        }
        self.draw_connections(ctx.canvas);
        for particle in &mut self.particles {
            particle.update(ctx);
        }
    }
}

impl Scene for ParticleField {
    fn reinit(&mut self, width: u32, height: u32) -> Result<(), ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::ZeroSurface { width, height });
        }
        self.width = width;
        self.height = height;
        self.spawn();
        self.connections.clear();
        log::info!(
            "particle field initialized: {} particles on {}x{} using {}",
            self.particles.len(),
            width,
            height,
            self.index.name()
        );
        Ok(())
    }

    fn set_strategy(&mut self, strategy: NeighborStrategy) -> Result<(), ConfigError> {
        ParticleField::set_strategy(self, strategy)
    }
}

impl std::fmt::Debug for ParticleField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParticleField")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("particles", &self.particles.len())
            .field("strategy", &self.index.name())
            .field("connections", &self.connections.len())
            .finish()
    }
}
