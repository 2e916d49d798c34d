use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use log::{info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{CursorIcon, Window, WindowAttributes, WindowId},
};

use crate::config::RoomConfig;
use crate::experience::RoomExperience;
use crate::gfx::scene::{NodeId, SceneGraph};
use crate::input::CursorHint;

const DEFAULT_WIDTH: u32 = 1200;
const DEFAULT_HEIGHT: u32 = 800;

/// Frames longer than this are treated as a stall (window drag, breakpoint)
const MAX_FRAME_DELTA: f32 = 0.1;

/// Called after every frame with the updated experience; this is where an
/// external renderer draws the room and composites the overlay panels.
pub type FrameCallback = Box<dyn FnMut(&RoomExperience)>;

/// Installs `env_logger`, defaulting to `info` when `RUST_LOG` is unset.
/// Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

pub struct RoomApp {
    event_loop: Option<EventLoop<()>>,
    app_state: AppState,
    frame_callback: Option<FrameCallback>,
}

struct AppState {
    window: Option<Arc<Window>>,
    experience: RoomExperience,
    frame_callback: Option<FrameCallback>,
    last_frame: Option<Instant>,
    cursor: CursorHint,
}

impl RoomApp {
    /// Create a new room application from `config`
    pub fn new(config: RoomConfig) -> anyhow::Result<Self> {
        init_logging();

        let event_loop = EventLoop::new().context("failed to create event loop")?;
        let experience = RoomExperience::new(config, DEFAULT_WIDTH, DEFAULT_HEIGHT)
            .context("invalid room configuration")?;

        Ok(Self {
            event_loop: Some(event_loop),
            app_state: AppState {
                window: None,
                experience,
                frame_callback: None,
                last_frame: None,
                cursor: CursorHint::Default,
            },
            frame_callback: None,
        })
    }

    /// Set the per-frame callback
    pub fn set_frame_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&RoomExperience) + 'static,
    {
        self.frame_callback = Some(Box::new(callback));
    }

    /// Delivers an already built room model
    pub fn set_model(&mut self, graph: SceneGraph, root: NodeId) -> anyhow::Result<()> {
        self.app_state
            .experience
            .on_model_ready(graph, root)
            .context("failed to bind room model")
    }

    /// Loads the room from an OBJ file
    pub fn load_model(&mut self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let path = path.as_ref();
        self.app_state
            .experience
            .load_model(path)
            .with_context(|| format!("failed to load room model {}", path.display()))
    }

    pub fn experience(&self) -> &RoomExperience {
        &self.app_state.experience
    }

    pub fn experience_mut(&mut self) -> &mut RoomExperience {
        &mut self.app_state.experience
    }

    /// Run the application (consumes self and starts the event loop)
    pub fn run(mut self) -> anyhow::Result<()> {
        self.app_state.frame_callback = self.frame_callback.take();

        let event_loop = self
            .event_loop
            .take()
            .context("event loop already consumed")?;
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.app_state)
            .context("event loop terminated with an error")
    }
}

impl AppState {
    fn frame_delta(&mut self) -> f32 {
        let now = Instant::now();
        let dt = self
            .last_frame
            .map_or(0.0, |last| now.duration_since(last).as_secs_f32());
        self.last_frame = Some(now);
        dt.min(MAX_FRAME_DELTA)
    }

    fn sync_cursor(&mut self, window: &Window) {
        let hint = self.experience.cursor();
        if hint == self.cursor {
            return;
        }
        self.cursor = hint;
        window.set_cursor(match hint {
            CursorHint::Pointer => CursorIcon::Pointer,
            CursorHint::Default => CursorIcon::Default,
        });
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = WindowAttributes::default()
            .with_title("roomscope")
            .with_inner_size(LogicalSize::new(DEFAULT_WIDTH, DEFAULT_HEIGHT));
        match event_loop.create_window(attributes) {
            Ok(window) => {
                let PhysicalSize { width, height } = window.inner_size();
                self.experience.resize(width, height);
                info!("[App] window created ({}x{})", width, height);
                self.window = Some(Arc::new(window));
            }
            Err(err) => {
                warn!("[App] failed to create window: {err}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };

        self.experience.handle_window_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                let dt = self.frame_delta();
                self.experience.frame(dt);
                self.sync_cursor(&window);

                if let Some(callback) = self.frame_callback.as_mut() {
                    callback(&self.experience);
                }
            }
            _ => (),
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        // Overlay panels own the pointer while hovered
        if self.experience.overlays().interactive_overlay().is_some() {
            return;
        }
        self.experience.handle_device_event(&event);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
