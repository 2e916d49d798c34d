//! # Navigation
//!
//! Click-to-focus camera navigation between a room's stages.
//!
//! [`Navigation`] is the single entry point: it owns the [`StageRegistry`]
//! and the [`TransitionEngine`] and routes requests by the current
//! [`NavigationState`]:
//!
//! | state      | request(stage)                  | escape / exit   |
//! |------------|---------------------------------|-----------------|
//! | `idle`     | enter `stage`                   | ignored         |
//! | `entering` | ignored                         | cancel in place |
//! | `focused`  | same: exit, other: exit + queue | exit            |
//! | `exiting`  | ignored                         | ignored         |
//!
//! Scene nodes and the camera are borrowed per call; navigation never owns them.

pub mod picking;
pub mod pose;
pub mod stage;
pub mod transition;

use cgmath::Vector2;
use log::debug;

use crate::gfx::camera::{CameraManager, OrbitCamera};
use crate::gfx::scene::{NodeId, SceneGraph};

pub use picking::{pick_stage, StagePick};
pub use pose::{compute_target_pose, TargetPose};
pub use stage::{Stage, StageConfig, StageId, StageRegistry};
pub use transition::{
    smootherstep, AnimationJob, HomePose, NavigationState, TickOutcome, TransitionEngine,
};

/// Exit duration used when the active stage can't be looked up
const FALLBACK_DURATION_OUT: f32 = 0.9;

#[derive(Debug)]
pub struct Navigation {
    registry: StageRegistry,
    engine: TransitionEngine,
    model_bound: bool,
}

impl Navigation {
    pub fn new(registry: StageRegistry) -> Self {
        Self {
            registry,
            engine: TransitionEngine::new(),
            model_bound: false,
        }
    }

    /// Resolves stage nodes inside `root` and enables navigation
    pub fn bind_model(&mut self, graph: &SceneGraph, root: NodeId) {
        self.registry.bind(graph, root);
        self.model_bound = true;
    }

    pub fn is_model_bound(&self) -> bool {
        self.model_bound
    }

    pub fn registry(&self) -> &StageRegistry {
        &self.registry
    }

    pub fn state(&self) -> NavigationState {
        self.engine.state()
    }

    pub fn active_stage(&self) -> Option<&StageId> {
        self.engine.active_stage()
    }

    pub fn pending_stage(&self) -> Option<&StageId> {
        self.engine.pending_stage()
    }

    pub fn home_pose(&self) -> &HomePose {
        self.engine.home()
    }

    /// The back affordance is shown whenever the camera is away from free roam
    pub fn back_visible(&self) -> bool {
        self.state() != NavigationState::Idle
    }

    /// Which stage, if any, lies under `ndc`. Never changes state.
    pub fn pick(
        &self,
        ndc: Vector2<f32>,
        camera: &OrbitCamera,
        graph: &SceneGraph,
        root: NodeId,
    ) -> Option<StagePick> {
        if !self.model_bound {
            return None;
        }
        pick_stage(ndc, camera, graph, root, &self.registry)
    }

    /// A primary click at `ndc`: enters the picked stage when idle
    pub fn click(
        &mut self,
        ndc: Vector2<f32>,
        graph: &SceneGraph,
        root: NodeId,
        rig: &mut CameraManager,
    ) {
        if self.state() != NavigationState::Idle {
            return;
        }
        if let Some(pick) = self.pick(ndc, &rig.camera, graph, root) {
            self.enter(pick.stage, Some(pick.focus), graph, rig);
        }
    }

    /// Requests `stage` programmatically
    pub fn focus_stage(&mut self, stage: &StageId, graph: &SceneGraph, rig: &mut CameraManager) {
        let Some(focus) = self.focusable(stage) else {
            debug!("[Navigation] '{}' is unknown or unbound", stage);
            return;
        };

        match self.state() {
            NavigationState::Idle => {
                self.enter(stage.clone(), Some(focus), graph, rig);
            }
            NavigationState::Focused if self.active_stage() == Some(stage) => {
                self.begin_exit(rig);
            }
            NavigationState::Focused => {
                self.engine.queue(stage.clone());
                self.begin_exit(rig);
            }
            NavigationState::Entering | NavigationState::Exiting => {
                debug!("[Navigation] '{}' ignored while {}", stage, self.state());
            }
        }
    }

    /// Back to free roam, dropping any queued stage
    pub fn exit_stage(&mut self, rig: &mut CameraManager) {
        if matches!(self.state(), NavigationState::Idle | NavigationState::Exiting) {
            return;
        }
        self.engine.clear_pending();
        self.begin_exit(rig);
    }

    /// Escape key or back affordance
    pub fn escape(&mut self, rig: &mut CameraManager) {
        self.exit_stage(rig);
    }

    /// Advances the running transition. A queued stage starts entering in the
    /// same call its predecessor's exit completes.
    pub fn update(&mut self, dt: f32, graph: &SceneGraph, rig: &mut CameraManager) {
        if !self.model_bound {
            return;
        }
        if let TickOutcome::Returned { next: Some(stage) } = self.engine.tick(dt, rig) {
            if let Some(focus) = self.focusable(&stage) {
                self.enter(stage, Some(focus), graph, rig);
            }
        }
    }

    fn focusable(&self, stage: &StageId) -> Option<NodeId> {
        if !self.model_bound {
            return None;
        }
        self.registry.get(stage).and_then(Stage::default_focus)
    }

    fn enter(
        &mut self,
        stage: StageId,
        focus: Option<NodeId>,
        graph: &SceneGraph,
        rig: &mut CameraManager,
    ) {
        let Some(config) = self.registry.get(&stage).map(|s| &s.config) else {
            return;
        };
        let target = compute_target_pose(config, focus, graph, rig.pose());
        self.engine.begin_enter(stage, target, rig);
    }

    fn begin_exit(&mut self, rig: &mut CameraManager) {
        let duration = self
            .active_stage()
            .and_then(|id| self.registry.get(id))
            .map_or(FALLBACK_DURATION_OUT, |s| s.config.duration_out);
        self.engine.begin_exit(duration, rig);
    }
}
