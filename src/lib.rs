//! # Plexus - connected particle fields
//!
//! Particles drift across a 2D surface and every pair closer than a
//! connection distance is joined by a line that fades out as the pair moves
//! apart. A pointer highlights the particles near it.
//!
//! The expensive part of each frame is finding the close pairs. Plexus ships
//! three interchangeable neighbor indexes behind one trait:
//!
//! | Strategy | Index | Per-frame cost |
//! |----------|-------|----------------|
//! | [`NeighborStrategy::BruteForce`] | none | every pair |
//! | [`NeighborStrategy::Grid`] | [`UniformGrid`](spatial::grid::UniformGrid) | 3x3 block of cells |
//! | [`NeighborStrategy::QuadTree`] | [`QuadTree`](spatial::quadtree::QuadTree) | range query per particle |
//!
//! All three report exactly the same connections.
//!
//! ## Quick Start
//!
//! ```
//! use plexus::prelude::*;
//!
//! let config = FieldConfig::default()
//!     .with_particle_count(100)
//!     .with_strategy(NeighborStrategy::quad_tree());
//! let mut field = ParticleField::with_seed(config, 800, 600, 7).unwrap();
//!
//! for c in field.find_connections() {
//!     assert!(c.a < c.b);
//!     assert!(c.opacity > 0.0 && c.opacity <= 1.0);
//! }
//! ```
//!
//! ## Frame loop
//!
//! A [`Controller`] owns the loop around a [`Scene`]: it clears the canvas
//! (hard clear or translucent trail fade), computes the frame step, updates
//! the scene, decays the pointer radius, and asks its [`FrameScheduler`] for
//! the next frame. Resizes are debounced and start, stop and pause are
//! explicit state transitions.
//!
//! Drawing goes through the [`Canvas`] trait. [`PixelCanvas`] is a CPU
//! raster that the [`window`] host uploads to the GPU each frame and that
//! [`headless::render_offscreen`] writes out as a PNG.
//!
//! ## Configuration
//!
//! [`FieldConfig`] is serde-serializable and can be loaded from JSON:
//!
//! ```json
//! {
//!   "connection_distance": 100,
//!   "strategy": { "kind": "quad_tree", "capacity": 8 },
//!   "boundary": "wrap",
//!   "interaction": { "kind": "pairwise_repel", "distance": 20 },
//!   "frame": { "clear": { "mode": "hard" }, "max_fps": 30 }
//! }
//! ```

pub mod canvas;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod field;
pub mod gpu;
pub mod headless;
pub mod particle;
pub mod pointer;
pub mod render;
pub mod scene;
pub mod spatial;
pub mod time;
pub mod window;

pub use canvas::PixelCanvas;
pub use config::{ColorConfig, FieldConfig, FpsConfig, FrameConfig};
pub use controller::{ClearMode, Controller, FrameOutcome, FrameScheduler, ManualScheduler, RunState};
pub use error::{ConfigError, GpuError, RunError};
pub use field::{Connection, ParticleField};
pub use glam::Vec2;
pub use particle::{Behavior, BoundaryPolicy, InteractionPolicy, Particle};
pub use pointer::{Pointer, PointerConfig};
pub use render::{Canvas, Rgb, Rgba};
pub use scene::{FrameContext, Scene, Updatable};
pub use spatial::{NeighborIndex, NeighborStrategy};

/// Prelude module for convenient imports.
///
/// ```
/// use plexus::prelude::*;
/// ```
pub mod prelude {
    pub use crate::canvas::PixelCanvas;
    pub use crate::config::FieldConfig;
    pub use crate::controller::{ClearMode, Controller, FpsSink, FrameOutcome, FrameScheduler, ManualScheduler, RunState};
    pub use crate::field::{Connection, ParticleField};
    pub use crate::particle::{BoundaryPolicy, InteractionPolicy, Particle};
    pub use crate::pointer::Pointer;
    pub use crate::render::{Canvas, Rgb, Rgba};
    pub use crate::scene::{FrameContext, Scene, Updatable};
    pub use crate::spatial::NeighborStrategy;
    pub use glam::Vec2;
}
