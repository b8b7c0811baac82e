//! Offscreen rendering without a window or GPU.
//!
//! Drives a [`Controller`] over a [`ParticleField`] with synthetic 60 Hz
//! timestamps and returns the final canvas. Used by the `--headless` CLI mode
//! and handy for snapshotting a configuration.

use std::time::{Duration, Instant};

use crate::canvas::PixelCanvas;
use crate::config::FieldConfig;
use crate::controller::{Controller, FrameOutcome, LogFpsSink, ManualScheduler};
use crate::error::ConfigError;
use crate::field::ParticleField;
use crate::render::Canvas;

/// Nominal frame interval of the synthetic clock.
pub const FRAME_INTERVAL: Duration = Duration::from_nanos(16_666_667);

/// Render `frames` frames of a freshly seeded field and return the canvas.
///
/// Frames skipped by a frame-rate cap do not count towards `frames`.
pub fn render_offscreen(
    config: &FieldConfig,
    width: u32,
    height: u32,
    frames: u32,
    seed: u64,
) -> Result<PixelCanvas, ConfigError> {
    let mut canvas = PixelCanvas::new(width, height)?;
    canvas.clear(config.color.background);

    let field = ParticleField::with_seed(config.clone(), width, height, seed)?;
    let mut controller = Controller::new(field, ManualScheduler::default(), config);
    controller.set_fps_sink(LogFpsSink);
    controller.start();

    let mut now = Instant::now();
    let mut ticked = 0;
    while ticked < frames {
        let Some(request) = controller.scheduler_mut().take_request() else {
            break;
        };
        if controller.on_requested_frame(request, now, &mut canvas) == FrameOutcome::Ticked {
            ticked += 1;
        }
        now += FRAME_INTERVAL;
    }
    controller.stop();

    log::info!(
        "rendered {} frames of {} particles ({} connections in the last frame)",
        ticked,
        controller.scene().particles().len(),
        controller.scene().connections().len()
    );
    Ok(canvas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ClearMode;
    use crate::spatial::NeighborStrategy;

    #[test]
    fn test_render_produces_drawn_canvas() {
        let config = FieldConfig::default().with_particle_count(40).with_clear(ClearMode::Hard);
        let canvas = render_offscreen(&config, 200, 150, 5, 42).unwrap();
        assert_eq!((canvas.width(), canvas.height()), (200, 150));
        assert!(canvas.pixels().chunks_exact(4).any(|px| px[0] > 0));
    }

    #[test]
    fn test_render_is_deterministic_per_seed() {
        let config = FieldConfig::default()
            .with_particle_count(60)
            .with_strategy(NeighborStrategy::quad_tree());
        let a = render_offscreen(&config, 160, 120, 10, 3).unwrap();
        let b = render_offscreen(&config, 160, 120, 10, 3).unwrap();
        assert_eq!(a.pixels(), b.pixels());
    }

    #[test]
    fn test_frame_cap_still_renders_requested_frames() {
        let config = FieldConfig::default().with_particle_count(5).with_max_fps(20.0);
        assert!(render_offscreen(&config, 64, 64, 3, 1).is_ok());
    }

    #[test]
    fn test_zero_surface_is_rejected() {
        assert!(matches!(
            render_offscreen(&FieldConfig::default(), 0, 100, 1, 0),
            Err(ConfigError::ZeroSurface { .. })
        ));
    }
}
