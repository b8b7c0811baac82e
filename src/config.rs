//! Field configuration.
//!
//! [`FieldConfig`] gathers every recognized option. It serializes to JSON,
//! every field has a default, so a config file only needs to mention what it
//! changes:
//!
//! ```json
//! {
//!   "connection_distance": 90,
//!   "strategy": { "kind": "quad_tree", "capacity": 8 },
//!   "frame": { "clear": { "mode": "hard" }, "max_fps": 30 }
//! }
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::controller::ClearMode;
use crate::error::ConfigError;
use crate::particle::{Behavior, BoundaryPolicy, InteractionPolicy};
use crate::pointer::PointerConfig;
use crate::render::{Rgb, Rgba};
use crate::spatial::NeighborStrategy;

/// Upper bound on the particle count, explicit or derived.
pub const MAX_PARTICLES: usize = 1_000_000;

/// Colors and global opacity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Multiplies every particle and connection alpha.
    pub opacity: f32,
    pub particle: Rgb,
    pub connection: Rgb,
    pub background: Rgb,
    /// Dot opacity of a pointer-fade particle that is not highlighted.
    pub particle_rest_opacity: f32,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            particle: Rgb::WHITE,
            connection: Rgb::WHITE,
            background: Rgb::BLACK,
            particle_rest_opacity: 0.6,
        }
    }
}

impl ColorConfig {
    pub fn particle_fill(&self) -> Rgba {
        self.particle.with_alpha(self.opacity)
    }
}

/// Frame-rate counter options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FpsConfig {
    pub show: bool,
    /// Averaging window in milliseconds.
    pub interval_ms: u64,
}

impl Default for FpsConfig {
    fn default() -> Self {
        Self {
            show: false,
            interval_ms: 1000,
        }
    }
}

/// Loop options: how frames are cleared and paced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub clear: ClearMode,
    /// Frames arriving faster than this are skipped.
    pub max_fps: Option<f32>,
    /// Largest simulation step, in 60 Hz frames, a single tick may take.
    pub max_step: f32,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            clear: ClearMode::default(),
            max_fps: None,
            max_step: 3.0,
        }
    }
}

/// Complete particle field configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Maximum separation, in pixels, at which two particles are linked.
    pub connection_distance: f32,
    /// Explicit particle count. Overrides `particle_count_factor`.
    pub particle_count: Option<usize>,
    /// Count derived from the surface: `ceil((width + height) / 100 * factor)`.
    pub particle_count_factor: f32,
    pub color: ColorConfig,
    pub line_width: f32,
    pub particle_radius: f32,
    /// Largest initial speed per axis, in pixels per 60 Hz frame.
    pub max_speed: f32,
    pub strategy: NeighborStrategy,
    pub boundary: BoundaryPolicy,
    pub interaction: InteractionPolicy,
    pub pointer: PointerConfig,
    pub fps: FpsConfig,
    pub frame: FrameConfig,
    /// Quiet period before a resize re-initializes the field.
    pub resize_debounce_ms: u64,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            connection_distance: 120.0,
            particle_count: None,
            particle_count_factor: 12.0,
            color: ColorConfig::default(),
            line_width: 1.0,
            particle_radius: 2.0,
            max_speed: 1.0,
            strategy: NeighborStrategy::default(),
            boundary: BoundaryPolicy::default(),
            interaction: InteractionPolicy::default(),
            pointer: PointerConfig::default(),
            fps: FpsConfig::default(),
            frame: FrameConfig::default(),
            resize_debounce_ms: 250,
        }
    }
}

impl FieldConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let config: FieldConfig = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = self.connection_distance;
        if !(d.is_finite() && d > 0.0) {
            return Err(ConfigError::InvalidConnectionDistance(d));
        }
        self.strategy.validate(d)?;

        for (name, value) in [
            ("max_speed", self.max_speed),
            ("particle_radius", self.particle_radius),
            ("particle_count_factor", self.particle_count_factor),
            ("line_width", self.line_width),
            ("frame.max_step", self.frame.max_step),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidParameter { name, value });
            }
        }
        if let Some(count) = self.particle_count {
            if count > MAX_PARTICLES {
                return Err(ConfigError::TooManyParticles(count));
            }
        }

        let p = &self.pointer;
        if p.min_radius < 0.0 || p.min_radius > p.max_radius {
            return Err(ConfigError::InvalidPointerRadius {
                min: p.min_radius,
                max: p.max_radius,
            });
        }

        for opacity in [self.color.opacity, self.color.particle_rest_opacity] {
            if !(0.0..=1.0).contains(&opacity) {
                return Err(ConfigError::InvalidOpacity(opacity));
            }
        }
        if let ClearMode::TrailFade { alpha } = self.frame.clear {
            if !(0.0..=1.0).contains(&alpha) {
                return Err(ConfigError::InvalidOpacity(alpha));
            }
        }

        if let InteractionPolicy::PairwiseRepel { distance } = self.interaction {
            if !(distance > 0.0 && distance <= d) {
                return Err(ConfigError::InvalidRepelDistance {
                    distance,
                    connection_distance: d,
                });
            }
        }
        Ok(())
    }

    /// Number of particles for a surface of the given size, at most
    /// [`MAX_PARTICLES`].
    pub fn particle_count_for(&self, width: u32, height: u32) -> usize {
        let count = self.particle_count.unwrap_or_else(|| {
            let perimeter = (width as f32 + height as f32) / 100.0;
            (perimeter * self.particle_count_factor).ceil().max(0.0) as usize
        });
        count.min(MAX_PARTICLES)
    }

    /// Behavior bundle handed to every particle.
    pub fn behavior(&self) -> Behavior {
        Behavior {
            boundary: self.boundary,
            interaction: self.interaction,
            rest_opacity: self.color.particle_rest_opacity,
        }
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    pub fn fps_interval(&self) -> Duration {
        Duration::from_millis(self.fps.interval_ms)
    }

    pub fn with_connection_distance(mut self, distance: f32) -> Self {
        self.connection_distance = distance;
        self
    }

    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.particle_count = Some(count);
        self
    }

    pub fn with_strategy(mut self, strategy: NeighborStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_boundary(mut self, boundary: BoundaryPolicy) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_interaction(mut self, interaction: InteractionPolicy) -> Self {
        self.interaction = interaction;
        self
    }

    pub fn with_clear(mut self, clear: ClearMode) -> Self {
        self.frame.clear = clear;
        self
    }

    pub fn with_max_fps(mut self, max_fps: f32) -> Self {
        self.frame.max_fps = Some(max_fps);
        self
    }

    pub fn with_fps(mut self, show: bool) -> Self {
        self.fps.show = show;
        self
    }
}
