//! Backdrop builder and window host.
//!
//! [`Backdrop`] configures a particle field, a proximity linker, and the
//! visuals, then `run()` opens a window and drives the per-frame tick:
//! advance the clock, smooth the pointer, displace every particle, rebuild
//! the link segments, draw. The simulation itself never sees a window; it
//! can equally be ticked by any host loop (see `demos/headless_tick.rs`).

use std::sync::Arc;

use glam::Vec3;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::camera::{drift_rotation, Camera};
use crate::error::BackdropError;
use crate::field::{FieldConfig, ParticleField};
use crate::gpu::{FrameParams, GpuState};
use crate::input::Input;
use crate::linker::{LinkConfig, ProximityLinker};
use crate::time::Time;
use crate::visuals::{BlendMode, Palette, Theme, VisualConfig};

/// Default lerp factor for per-frame pointer smoothing.
const POINTER_SMOOTHING: f32 = 0.05;
/// Frames between window-title FPS refreshes.
const TITLE_REFRESH_FRAMES: u64 = 30;

/// A particle backdrop builder.
///
/// Use method chaining to configure, then call `.run()` to open the
/// window.
///
/// # Example
///
/// ```ignore
/// use constel::Backdrop;
///
/// Backdrop::new()
///     .with_particle_count(2000)
///     .with_extent(150.0)
///     .run()?;
/// ```
pub struct Backdrop {
    field: FieldConfig,
    links: LinkConfig,
    visuals: VisualConfig,
    pointer_smoothing: f32,
    title: String,
}

impl Backdrop {
    /// Create a backdrop with default settings.
    pub fn new() -> Self {
        Self {
            field: FieldConfig::default(),
            links: LinkConfig::default(),
            visuals: VisualConfig::default(),
            pointer_smoothing: POINTER_SMOOTHING,
            title: "constel".to_string(),
        }
    }

    /// Set the number of particles.
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.field.count = count;
        self
    }

    /// Set the bounding cube side length.
    pub fn with_extent(mut self, extent: f32) -> Self {
        self.field.extent = extent;
        self
    }

    /// Set the maximum particle size.
    pub fn with_size_max(mut self, size_max: f32) -> Self {
        self.field.size_max = size_max;
        self
    }

    /// Set the color palette particles are sampled from.
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.field.palette = palette;
        self
    }

    /// Seed the field RNG for reproducible geometry.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.field.seed = Some(seed);
        self
    }

    /// Set the proximity link parameters.
    pub fn with_links(mut self, links: LinkConfig) -> Self {
        self.links = links;
        self
    }

    /// Set the starting theme.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.visuals.theme = theme;
        self
    }

    /// Set how particles blend with the background.
    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.visuals.blend_mode = blend_mode;
        self
    }

    /// Set the pointer smoothing factor (1.0 snaps, 0.0 freezes).
    pub fn with_pointer_smoothing(mut self, factor: f32) -> Self {
        self.pointer_smoothing = factor;
        self
    }

    /// Set the window title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Open the window and run until closed.
    ///
    /// Configuration is validated before any window appears; invalid
    /// parameters return [`BackdropError::Config`] immediately.
    pub fn run(self) -> Result<(), BackdropError> {
        let field = ParticleField::new(&self.field)?;
        let linker = ProximityLinker::new(self.links)?;

        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = App::new(field, linker, self.visuals, self.pointer_smoothing, self.title);
        event_loop.run_app(&mut app)?;

        match app.fatal {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Default for Backdrop {
    fn default() -> Self {
        Self::new()
    }
}

struct App {
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    field: ParticleField,
    linker: ProximityLinker,
    /// Displaced positions, reused every frame.
    positions: Vec<Vec3>,
    time: Time,
    input: Input,
    camera: Camera,
    visuals: VisualConfig,
    pointer_smoothing: f32,
    title: String,
    /// First error that forced the loop to exit, surfaced by `run`.
    fatal: Option<BackdropError>,
}

impl App {
    fn new(
        field: ParticleField,
        linker: ProximityLinker,
        visuals: VisualConfig,
        pointer_smoothing: f32,
        title: String,
    ) -> Self {
        let positions = Vec::with_capacity(field.len());
        Self {
            window: None,
            gpu: None,
            field,
            linker,
            positions,
            time: Time::new(),
            input: Input::default(),
            camera: Camera::new(),
            visuals,
            pointer_smoothing,
            title,
            fatal: None,
        }
    }

    fn tick_and_render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let Some(gpu) = self.gpu.as_mut() else {
            return Ok(());
        };

        let (elapsed, _delta) = self.time.update();

        self.field
            .update_pointer(self.input.pointer_ndc(), self.pointer_smoothing);
        self.field.displace_into(elapsed, &mut self.positions);
        let segments = self.linker.compute(&self.positions);

        self.camera.scroll = self.input.scroll();
        let aspect = gpu.config.width as f32 / gpu.config.height as f32;

        gpu.render(&FrameParams {
            positions: &self.positions,
            segments,
            proj: self.camera.projection(aspect),
            view: self.camera.view() * drift_rotation(elapsed),
            time: elapsed,
            clear: self.visuals.theme.background(),
        })
    }

    fn refresh_title(&self) {
        if let Some(window) = &self.window {
            if self.time.frame() % TITLE_REFRESH_FRAMES == 0 {
                window.set_title(&format!("{} - {:.0} fps", self.title, self.time.fps()));
            }
        }
    }

    fn on_key(&mut self, event_loop: &ActiveEventLoop, code: KeyCode) {
        match code {
            KeyCode::Escape => event_loop.exit(),
            KeyCode::Space => self.time.toggle_pause(),
            KeyCode::KeyT => {
                self.visuals.theme = self.visuals.theme.toggled();
                if let Some(gpu) = self.gpu.as_mut() {
                    gpu.set_theme(self.visuals.theme);
                }
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title(&self.title)
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fatal = Some(e.into());
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.input.set_window_size(size.width, size.height);
        self.window = Some(window.clone());

        match pollster::block_on(GpuState::new(
            window,
            &self.field,
            self.linker.capacity(),
            &self.visuals,
        )) {
            Ok(gpu) => self.gpu = Some(gpu),
            Err(e) => {
                self.fatal = Some(e.into());
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                self.input
                    .set_window_size(physical_size.width, physical_size.height);
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(physical_size);
                }
            }
            WindowEvent::KeyboardInput { event: key, .. } => {
                if key.state == ElementState::Pressed && !key.repeat {
                    if let PhysicalKey::Code(code) = key.physical_key {
                        self.on_key(event_loop, code);
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                match self.tick_and_render() {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                        if let Some(gpu) = &mut self.gpu {
                            let size = winit::dpi::PhysicalSize {
                                width: gpu.config.width,
                                height: gpu.config.height,
                            };
                            gpu.resize(size);
                        }
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                    Err(e) => eprintln!("Render error: {:?}", e),
                }
                self.refresh_title();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            other => self.input.handle_event(&other),
        }
    }
}
