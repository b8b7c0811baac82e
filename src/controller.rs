//! Lifecycle controller: start/stop/pause, frame pacing, resize and pointer
//! wiring around a [`Scene`].
//!
//! The controller never owns a thread or a timer. A host hands it events
//! (frame callbacks, resizes, pointer moves) together with the current
//! [`Instant`], and the controller asks a [`FrameScheduler`] for the next
//! frame callback. Exactly one frame request is outstanding while running;
//! pausing or stopping cancels it, and a frame that arrives without a matching
//! request is ignored. That makes cancellation synchronous: once `pause`
//! returns, no further tick runs.
//!
//! ```
//! use std::time::{Duration, Instant};
//! use plexus::prelude::*;
//!
//! let config = FieldConfig::default().with_particle_count(30);
//! let field = ParticleField::with_seed(config.clone(), 320, 240, 7).unwrap();
//! let mut controller = Controller::new(field, ManualScheduler::default(), &config);
//! let mut canvas = PixelCanvas::new(320, 240).unwrap();
//!
//! let t0 = Instant::now();
//! controller.start();
//! assert_eq!(controller.on_frame(t0, &mut canvas), FrameOutcome::Ticked);
//!
//! controller.pause();
//! let later = t0 + Duration::from_millis(16);
//! assert_eq!(controller.on_frame(later, &mut canvas), FrameOutcome::Ignored);
//! ```

use std::time::Instant;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::FieldConfig;
use crate::debounce::Debouncer;
use crate::error::ConfigError;
use crate::pointer::Pointer;
use crate::render::{Canvas, Rgb};
use crate::scene::{FrameContext, Scene};
use crate::spatial::NeighborStrategy;
use crate::time::{FpsCounter, FrameClock};

/// How the previous frame is erased before drawing the next one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ClearMode {
    /// Overpaint with the background at `alpha`, leaving fading trails.
    TrailFade { alpha: f32 },
    /// Overwrite every pixel with the background.
    Hard,
}

impl Default for ClearMode {
    fn default() -> Self {
        ClearMode::TrailFade { alpha: 0.25 }
    }
}

/// Handle for an outstanding frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameRequest(pub u64);

/// Source of frame callbacks.
pub trait FrameScheduler {
    /// Ask for one more frame callback.
    fn request_frame(&mut self) -> FrameRequest;

    /// Withdraw a request. Cancelling a request that already fired is a no-op.
    fn cancel_frame(&mut self, request: FrameRequest);
}

/// Scheduler that only records the outstanding request.
///
/// Whoever drives the controller (a window event loop, the headless renderer,
/// a test) polls [`ManualScheduler::take_request`] and delivers the frame.
#[derive(Debug, Default, Clone)]
pub struct ManualScheduler {
    next_id: u64,
    requested: Option<FrameRequest>,
}

impl ManualScheduler {
    /// Take the outstanding request, if any.
    pub fn take_request(&mut self) -> Option<FrameRequest> {
        self.requested.take()
    }

    pub fn has_request(&self) -> bool {
        self.requested.is_some()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameRequest {
        self.next_id += 1;
        let request = FrameRequest(self.next_id);
        self.requested = Some(request);
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.requested == Some(request) {
            self.requested = None;
        }
    }
}

/// Receiver for the periodic frame-rate average.
pub trait FpsSink {
    fn report(&mut self, fps: f32);
}

impl<F: FnMut(f32)> FpsSink for F {
    fn report(&mut self, fps: f32) {
        self(fps)
    }
}

/// Writes the frame rate to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFpsSink;

impl FpsSink for LogFpsSink {
    fn report(&mut self, fps: f32) {
        log::info!("FPS: {:.1}", fps);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Stopped,
    Running,
    /// Like `Stopped`, but entered through `pause`.
    Paused,
}

/// What [`Controller::on_frame`] did with a frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Not running, or no frame was requested.
    Ignored,
    /// Too early under the frame-rate cap; another frame was requested.
    Skipped,
    /// The scene advanced and the canvas was redrawn.
    Ticked,
}

/// Drives a [`Scene`] from host events.
pub struct Controller<S, F> {
    scene: S,
    scheduler: F,
    pointer: Pointer,
    grow_step: f32,
    decay_step: f32,
    clock: FrameClock,
    fps: FpsCounter,
    fps_visible: bool,
    fps_sink: Option<Box<dyn FpsSink>>,
    resize: Debouncer<(u32, u32)>,
    state: RunState,
    pending: Option<FrameRequest>,
    clear: ClearMode,
    background: Rgb,
}

impl<S: Scene, F: FrameScheduler> Controller<S, F> {
    /// Wrap a scene. The controller starts stopped.
    pub fn new(scene: S, scheduler: F, config: &FieldConfig) -> Self {
        Self {
            scene,
            scheduler,
            pointer: Pointer::new(&config.pointer),
            grow_step: config.pointer.grow_step,
            decay_step: config.pointer.decay_step,
            clock: FrameClock::new(config.frame.max_step, config.frame.max_fps),
            fps: FpsCounter::new(config.fps_interval()),
            fps_visible: config.fps.show,
            fps_sink: None,
            resize: Debouncer::new(config.resize_debounce()),
            state: RunState::Stopped,
            pending: None,
            clear: config.frame.clear,
            background: config.color.background,
        }
    }

    /// Begin (or resume) ticking. No-op while already running.
    pub fn start(&mut self) {
        if self.state == RunState::Running {
            return;
        }
        log::debug!("controller {:?} -> Running", self.state);
        self.state = RunState::Running;
        self.clock.resume();
        self.fps.reset();
        self.pending = Some(self.scheduler.request_frame());
    }

    /// Stop ticking. Scene state is kept.
    pub fn stop(&mut self) {
        if self.state == RunState::Stopped {
            return;
        }
        log::debug!("controller {:?} -> Stopped", self.state);
        self.cancel_pending();
        self.state = RunState::Stopped;
        self.clock.pause();
    }

    /// Cancel the outstanding frame so ticking halts until [`Controller::start`].
    /// No-op unless running.
    pub fn pause(&mut self) {
        if self.state != RunState::Running {
            return;
        }
        log::debug!("controller Running -> Paused");
        self.cancel_pending();
        self.state = RunState::Paused;
        self.clock.pause();
    }

    /// Pause when running, start otherwise.
    pub fn toggle_pause(&mut self) {
        if self.state == RunState::Running {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Rebuild the scene for a surface size right away.
    pub fn init(&mut self, width: u32, height: u32) -> Result<(), ConfigError> {
        self.resize.cancel();
        self.scene.reinit(width, height)
    }

    /// Note a new surface size. The scene is rebuilt by
    /// [`Controller::poll_resize`] once resizes stop arriving.
    pub fn on_resize(&mut self, width: u32, height: u32, now: Instant) {
        self.resize.trigger((width, height), now);
    }

    /// Apply a settled resize. Returns the size the scene was rebuilt for.
    pub fn poll_resize(&mut self, now: Instant) -> Result<Option<(u32, u32)>, ConfigError> {
        let Some((width, height)) = self.resize.poll(now) else {
            return Ok(None);
        };
        log::debug!("debounced resize to {}x{}", width, height);
        self.scene.reinit(width, height)?;
        Ok(Some((width, height)))
    }

    pub fn on_pointer_move(&mut self, x: f32, y: f32) {
        self.pointer.set_coordinates(x, y);
        self.pointer.increase_radius(self.grow_step);
    }

    pub fn on_pointer_leave(&mut self) {
        self.pointer.clear_coordinates();
    }

    /// Handle the callback for `request`, taken from the scheduler by the host.
    ///
    /// A stale request, or one from before a pause or stop, is ignored. Hosts
    /// whose platform can redraw on its own (exposure, resize) route only
    /// scheduled callbacks through here so the extra redraws never advance
    /// the field.
    pub fn on_requested_frame(
        &mut self,
        request: FrameRequest,
        now: Instant,
        canvas: &mut dyn Canvas,
    ) -> FrameOutcome {
        if self.pending != Some(request) {
            return FrameOutcome::Ignored;
        }
        self.on_frame(now, canvas)
    }

    /// Handle a frame callback at `now`, drawing into `canvas`.
    ///
    /// Any callback counts against the outstanding request; use
    /// [`on_requested_frame`](Self::on_requested_frame) when the host can
    /// deliver callbacks the scheduler never asked for.
    pub fn on_frame(&mut self, now: Instant, canvas: &mut dyn Canvas) -> FrameOutcome {
        if self.state != RunState::Running || self.pending.take().is_none() {
            return FrameOutcome::Ignored;
        }

        if !self.clock.ready(now) {
            self.pending = Some(self.scheduler.request_frame());
            return FrameOutcome::Skipped;
        }

        match self.clear {
            ClearMode::Hard => canvas.clear(self.background),
            ClearMode::TrailFade { alpha } => {
                let extent = canvas.extent();
                canvas.fill_rect(Vec2::ZERO, extent, self.background.with_alpha(alpha));
            }
        }

        let step = self.clock.tick(now);
        let mut ctx = FrameContext {
            canvas,
            pointer: &self.pointer,
            step,
        };
        self.scene.update(&mut ctx);
        self.pointer.reduce_radius(self.decay_step);

        if self.fps_visible {
            if let Some(fps) = self.fps.record(now) {
                match self.fps_sink.as_mut() {
                    Some(sink) => sink.report(fps),
                    None => log::info!("FPS: {:.1}", fps),
                }
            }
        }

        self.pending = Some(self.scheduler.request_frame());
        FrameOutcome::Ticked
    }

    pub fn show_fps(&mut self) {
        if !self.fps_visible {
            self.fps_visible = true;
            self.fps.reset();
        }
    }

    pub fn hide_fps(&mut self) {
        self.fps_visible = false;
    }

    pub fn toggle_fps(&mut self) {
        if self.fps_visible {
            self.hide_fps();
        } else {
            self.show_fps();
        }
    }

    pub fn set_fps_sink(&mut self, sink: impl FpsSink + 'static) {
        self.fps_sink = Some(Box::new(sink));
    }

    /// Switch the scene's neighbor strategy between ticks.
    pub fn set_strategy(&mut self, strategy: NeighborStrategy) -> Result<(), ConfigError> {
        self.scene.set_strategy(strategy)
    }

    pub fn set_clear_mode(&mut self, clear: ClearMode) {
        self.clear = clear;
    }

    pub fn set_max_fps(&mut self, max_fps: Option<f32>) {
        self.clock.set_max_fps(max_fps);
    }

    /// Earliest instant a capped frame may run.
    pub fn next_frame_at(&self) -> Option<Instant> {
        self.clock.next_frame_at()
    }

    /// When a pending resize will settle.
    pub fn resize_deadline(&self) -> Option<Instant> {
        self.resize.deadline()
    }

    #[inline]
    pub fn state(&self) -> RunState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    #[inline]
    pub fn fps_visible(&self) -> bool {
        self.fps_visible
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn pointer(&self) -> &Pointer {
        &self.pointer
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }

    fn cancel_pending(&mut self) {
        if let Some(request) = self.pending.take() {
            self.scheduler.cancel_frame(request);
        }
    }
}
