//! Per-frame capability traits.
//!
//! Anything that advances and draws itself once per frame implements
//! [`Updatable`]. A [`Scene`] is the top-level updatable owned by the
//! [`Controller`](crate::controller::Controller): it can additionally be
//! rebuilt for a new surface size.

use crate::error::ConfigError;
use crate::pointer::Pointer;
use crate::render::Canvas;
use crate::spatial::NeighborStrategy;

/// What an entity gets to see during one frame.
pub struct FrameContext<'a> {
    /// Surface to draw on; its size is the simulation bounds.
    pub canvas: &'a mut dyn Canvas,
    pub pointer: &'a Pointer,
    /// Elapsed time in 60 Hz frames, already clamped.
    pub step: f32,
}

/// Advance one frame and render the result.
pub trait Updatable {
    fn update(&mut self, ctx: &mut FrameContext<'_>);
}

/// A re-initializable top-level updatable.
pub trait Scene: Updatable {
    /// Rebuild for a new surface size.
    fn reinit(&mut self, width: u32, height: u32) -> Result<(), ConfigError>;

    /// Swap the neighbor search strategy. Scenes without one ignore this.
    fn set_strategy(&mut self, _strategy: NeighborStrategy) -> Result<(), ConfigError> {
        Ok(())
    }
}
