//! Windowed host: a winit event loop driving the controller.
//!
//! The controller's frame requests are delivered as redraws. With a frame-rate
//! cap the loop sleeps until the next allowed frame instead of spinning, and a
//! pending resize wakes it when the debounce settles.
//!
//! Keys: `1` brute force, `2` grid, `3` quad-tree, `Space` pause, `F` frame
//! rate in the title bar, `Escape` quit.

use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::canvas::PixelCanvas;
use crate::config::FieldConfig;
use crate::controller::{Controller, FrameRequest, ManualScheduler};
use crate::error::RunError;
use crate::field::ParticleField;
use crate::gpu::GpuState;
use crate::render::Canvas;
use crate::spatial::NeighborStrategy;

const TITLE: &str = "plexus";

type FieldController = Controller<ParticleField, ManualScheduler>;

/// Open a window and animate a field built from `config` until it closes.
///
/// `seed` makes the initial layout reproducible.
pub fn run(config: FieldConfig, seed: Option<u64>) -> Result<(), RunError> {
    config.validate()?;
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config, seed);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct App {
    config: FieldConfig,
    seed: Option<u64>,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    canvas: Option<PixelCanvas>,
    controller: Option<FieldController>,
    /// Frame request taken in `about_to_wait`, delivered by the next redraw.
    due: Option<FrameRequest>,
    error: Option<RunError>,
}

impl App {
    fn new(config: FieldConfig, seed: Option<u64>) -> Self {
        Self {
            config,
            seed,
            window: None,
            gpu: None,
            canvas: None,
            controller: None,
            due: None,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: impl Into<RunError>) {
        let error = error.into();
        log::error!("{}", error);
        self.error = Some(error);
        event_loop.exit();
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<Arc<Window>, RunError> {
        if let Some(window) = &self.window {
            return Ok(window.clone());
        }
        let attrs = Window::default_attributes()
            .with_title(TITLE)
            .with_inner_size(LogicalSize::new(1280, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);
        self.window = Some(window.clone());
        Ok(window)
    }

    fn build_controller(&self, window: &Arc<Window>, size: PhysicalSize<u32>) -> Result<FieldController, RunError> {
        let config = self.config.clone();
        let (width, height) = (size.width.max(1), size.height.max(1));
        let field = match self.seed {
            Some(seed) => ParticleField::with_seed(config, width, height, seed)?,
            None => ParticleField::new(config, width, height)?,
        };

        let mut controller = Controller::new(field, ManualScheduler::default(), &self.config);
        let title_window = window.clone();
        controller.set_fps_sink(move |fps: f32| {
            title_window.set_title(&format!("{} ({:.0} fps)", TITLE, fps));
        });
        Ok(controller)
    }

    fn resume(&mut self, event_loop: &ActiveEventLoop) -> Result<(), RunError> {
        let window = self.create_window(event_loop)?;
        let size = window.inner_size();

        if self.gpu.is_none() {
            self.gpu = Some(pollster::block_on(GpuState::new(window.clone()))?);
        }
        if self.controller.is_none() {
            let controller = self.build_controller(&window, size)?;
            let (width, height) = controller.scene().size();
            self.canvas = Some(PixelCanvas::new(width, height)?);
            self.controller = Some(controller);
        }
        if let Some(controller) = &mut self.controller {
            controller.start();
        }
        window.request_redraw();
        Ok(())
    }

    fn apply_settled_resize(&mut self, now: Instant) -> Result<(), RunError> {
        let Some(controller) = &mut self.controller else {
            return Ok(());
        };
        if let Some((width, height)) = controller.poll_resize(now)? {
            if let Some(canvas) = &mut self.canvas {
                canvas.resize(width, height)?;
                canvas.clear(self.config.color.background);
            }
            if let Some(gpu) = &mut self.gpu {
                gpu.resize_canvas(width, height);
            }
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, code: KeyCode) {
        let Some(controller) = &mut self.controller else {
            return;
        };
        let strategy = match code {
            KeyCode::Digit1 => Some(NeighborStrategy::BruteForce),
            KeyCode::Digit2 => Some(NeighborStrategy::default()),
            KeyCode::Digit3 => Some(NeighborStrategy::quad_tree()),
            KeyCode::Space => {
                controller.toggle_pause();
                None
            }
            KeyCode::KeyF => {
                controller.toggle_fps();
                if !controller.fps_visible() {
                    if let Some(window) = &self.window {
                        window.set_title(TITLE);
                    }
                }
                None
            }
            KeyCode::Escape => {
                event_loop.exit();
                None
            }
            _ => None,
        };

        if let Some(strategy) = strategy {
            if let Err(e) = controller.set_strategy(strategy) {
                log::warn!("could not switch to {}: {}", strategy, e);
            }
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let (Some(controller), Some(canvas), Some(gpu)) = (&mut self.controller, &mut self.canvas, &mut self.gpu)
        else {
            return;
        };

        // Platform redraws (exposure, resize) only present the last frame
        if let Some(request) = self.due.take() {
            controller.on_requested_frame(request, Instant::now(), canvas);
        }

        match gpu.render(canvas) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gpu.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("surface out of memory");
                event_loop.exit();
            }
            Err(e) => log::warn!("render error: {:?}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(e) = self.resume(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size);
                }
                if size.width > 0 && size.height > 0 {
                    if let Some(controller) = &mut self.controller {
                        controller.on_resize(size.width, size.height, Instant::now());
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let Some(controller) = &mut self.controller {
                    controller.on_pointer_move(position.x as f32, position.y as f32);
                }
            }
            WindowEvent::CursorLeft { .. } => {
                if let Some(controller) = &mut self.controller {
                    controller.on_pointer_leave();
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(event_loop, code),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if let Err(e) = self.apply_settled_resize(now) {
            self.fail(event_loop, e);
            return;
        }

        let Some(controller) = &mut self.controller else {
            return;
        };

        let mut wake_at = controller.resize_deadline();
        if controller.scheduler().has_request() {
            match controller.next_frame_at() {
                Some(at) if at > now => wake_at = Some(wake_at.map_or(at, |w| w.min(at))),
                _ => {
                    self.due = controller.scheduler_mut().take_request();
                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                }
            }
        }

        event_loop.set_control_flow(match wake_at {
            Some(at) => ControlFlow::WaitUntil(at),
            None => ControlFlow::Wait,
        });
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(controller) = &mut self.controller {
            controller.stop();
        }
        self.gpu = None;
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(controller) = &mut self.controller {
            controller.stop();
        }
    }
}
