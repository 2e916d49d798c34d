//! # Room Experience
//!
//! Composition root for one room: camera rig, room model, navigation,
//! overlays, shop props and input, all owned here and passed explicitly to
//! each other.
//!
//! ## Frame Order
//!
//! [`RoomExperience::frame`] runs, in this order:
//!
//! 1. drain queued input (hover, clicks, escape)
//! 2. camera controls update
//! 3. navigation update (camera animation)
//! 4. overlay synchronization
//!
//! so a click and the animation step it triggers land in the same frame,
//! and overlays always see the state navigation just produced.

use std::path::Path;

use cgmath::Vector2;
use log::{debug, info, warn};
use winit::event::{DeviceEvent, WindowEvent};

use crate::config::RoomConfig;
use crate::debug::DebugCommand;
use crate::error::{Result, RoomError};
use crate::gfx::camera::CameraManager;
use crate::gfx::scene::{loader, NodeId, SceneGraph};
use crate::input::{CursorHint, InputAdapter, Intent, Viewport};
use crate::navigation::{Navigation, NavigationState, StageId, StageRegistry};
use crate::overlay::OverlaySynchronizer;
use crate::shop::ShopIndex;

/// The loaded room model: the graph and the node the room hangs from
#[derive(Debug, Clone)]
pub struct RoomModel {
    pub graph: SceneGraph,
    pub root: NodeId,
}

pub struct RoomExperience {
    config: RoomConfig,
    rig: CameraManager,
    model: Option<RoomModel>,
    navigation: Navigation,
    overlays: OverlaySynchronizer,
    shop: ShopIndex,
    input: InputAdapter,
    cursor: CursorHint,
}

impl RoomExperience {
    /// Builds an experience for a `width` x `height` pixel viewport. Fails on
    /// an invalid configuration; nothing is bound until a model arrives.
    pub fn new(config: RoomConfig, width: u32, height: u32) -> Result<Self> {
        config.validate()?;

        let aspect = if width > 0 && height > 0 {
            width as f32 / height as f32
        } else {
            1.0
        };
        let camera = config.camera.build(aspect);
        let controls = config.controls.build(camera.target);
        let rig = CameraManager::new(camera, controls);

        let navigation = Navigation::new(StageRegistry::new(config.stages.clone())?);
        let overlays = OverlaySynchronizer::new(config.overlays.clone())?;
        let input = InputAdapter::new(
            Viewport::new(width as f32, height as f32),
            config.drag_threshold,
        );

        Ok(Self {
            config,
            rig,
            model: None,
            navigation,
            overlays,
            shop: ShopIndex::default(),
            input,
            cursor: CursorHint::Default,
        })
    }

    /// The one-shot "model ready" event: binds stages, attaches overlays and
    /// indexes shop props.
    pub fn on_model_ready(&mut self, graph: SceneGraph, root: NodeId) -> Result<()> {
        if self.model.is_some() {
            return Err(RoomError::ModelAlreadyBound);
        }
        if !graph.contains(root) {
            return Err(RoomError::MissingRoot(root));
        }

        info!(
            "[Experience] model ready: '{}' ({} nodes)",
            graph.name(root).unwrap_or("?"),
            graph.len()
        );
        self.navigation.bind_model(&graph, root);
        self.overlays.attach(&graph, self.navigation.registry());
        self.shop = ShopIndex::build(&graph, root, &self.config.shop_items);
        self.model = Some(RoomModel { graph, root });
        Ok(())
    }

    /// Loads an OBJ room, rests it on the floor and binds it
    pub fn load_model(&mut self, path: impl AsRef<Path>) -> Result<()> {
        if self.model.is_some() {
            return Err(RoomError::ModelAlreadyBound);
        }
        let (mut graph, root) = loader::load_obj(path)?;
        loader::place_on_floor(&mut graph, root, self.config.floor_offset);
        self.on_model_ready(graph, root)
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    pub fn camera(&self) -> &CameraManager {
        &self.rig
    }

    pub fn model(&self) -> Option<&RoomModel> {
        self.model.as_ref()
    }

    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    pub fn overlays(&self) -> &OverlaySynchronizer {
        &self.overlays
    }

    pub fn shop(&self) -> &ShopIndex {
        &self.shop
    }

    pub fn input(&self) -> &InputAdapter {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputAdapter {
        &mut self.input
    }

    pub fn cursor(&self) -> CursorHint {
        self.cursor
    }

    pub fn back_visible(&self) -> bool {
        self.navigation.back_visible()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.input.resize(width, height);
        self.rig.resize(width, height);
    }

    /// Routes a window event to the input queue. Resizes also reach the
    /// camera, and modifier changes reach the orbit controls (shift-drag pans).
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::Resized(size) => self.rig.resize(size.width, size.height),
            // Tracked even over a panel so a release there is not lost
            WindowEvent::ModifiersChanged(modifiers) => self.rig.process_modifiers(modifiers),
            _ => (),
        }
        self.input.handle_window_event(event)
    }

    /// Raw device motion for the orbit controls (ignored while they are locked)
    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        self.rig.process_event(event);
    }

    /// Navbar entry point: request a stage by id
    pub fn focus_stage(&mut self, stage: &StageId) {
        let Some(model) = self.model.as_ref() else {
            debug!("[Experience] '{}' requested before the model is ready", stage);
            return;
        };
        self.navigation
            .focus_stage(stage, &model.graph, &mut self.rig);
    }

    /// Navbar "back" entry point
    pub fn exit_stage(&mut self) {
        self.navigation.exit_stage(&mut self.rig);
    }

    /// Runs one frame. `dt` is the time since the previous frame, in seconds.
    pub fn frame(&mut self, dt: f32) {
        for intent in self.input.drain() {
            self.handle_intent(intent);
        }

        self.rig.update();

        if let Some(model) = self.model.as_ref() {
            self.navigation.update(dt, &model.graph, &mut self.rig);
            self.overlays
                .update(&self.navigation, &self.rig.camera, &model.graph);
        }

        if self.navigation.state() != NavigationState::Idle {
            self.cursor = CursorHint::Default;
        }
    }

    fn handle_intent(&mut self, intent: Intent) {
        match intent {
            Intent::Move(ndc) => {
                self.overlays.set_pointer(ndc);
                self.update_cursor(ndc);
            }
            Intent::Click(ndc) => {
                self.overlays.set_pointer(ndc);
                if let Some(model) = self.model.as_ref() {
                    self.navigation
                        .click(ndc, &model.graph, model.root, &mut self.rig);
                }
            }
            Intent::Escape => self.navigation.escape(&mut self.rig),
        }
    }

    fn update_cursor(&mut self, ndc: Vector2<f32>) {
        let hint = match self.model.as_ref() {
            Some(model) if self.navigation.state() == NavigationState::Idle => {
                match self
                    .navigation
                    .pick(ndc, &self.rig.camera, &model.graph, model.root)
                {
                    Some(_) => CursorHint::Pointer,
                    None => CursorHint::Default,
                }
            }
            _ => CursorHint::Default,
        };
        if hint != self.cursor {
            debug!("[Experience] cursor {:?}", hint);
        }
        self.cursor = hint;
    }

    /// Handles a JSON message from the embedded computer panel.
    /// Returns whether it was a shop message.
    pub fn handle_panel_message(&mut self, raw: &str) -> bool {
        match self.model.as_mut() {
            Some(model) => self.shop.handle_message(&mut model.graph, raw),
            None => false,
        }
    }

    /// Parses and runs a developer command, returning its report lines
    pub fn run_debug_command(&mut self, line: &str) -> Result<Vec<String>> {
        let command: DebugCommand = line.parse()?;
        let Some(model) = self.model.as_mut() else {
            warn!("[Debug] no room model loaded");
            return Ok(Vec::new());
        };
        Ok(command.execute(&mut model.graph, model.root, &self.shop))
    }
}
