//! # Transition Engine
//!
//! The navigation state machine and the camera animation it drives.
//!
//! ```text
//! idle --enter--> entering --done--> focused --exit--> exiting --done--> idle
//!                     |                                    ^
//!                     +-------------- escape --------------+
//! ```
//!
//! The engine knows nothing about scene nodes: callers hand it finished
//! [`TargetPose`]s. When an exit completes with a stage queued, the engine
//! reports it so the caller can start the next entry in the same update.

use std::fmt;

use cgmath::{Vector3, VectorSpace};
use log::{debug, info};

use crate::gfx::camera::{CameraManager, CameraPose};

use super::pose::TargetPose;
use super::stage::StageId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NavigationState {
    #[default]
    Idle,
    Entering,
    Focused,
    Exiting,
}

impl NavigationState {
    pub fn is_animating(self) -> bool {
        matches!(self, Self::Entering | Self::Exiting)
    }
}

impl fmt::Display for NavigationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Entering => "entering",
            Self::Focused => "focused",
            Self::Exiting => "exiting",
        };
        f.write_str(name)
    }
}

/// The free-roam pose to return to. Written once, on the first entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HomePose {
    pub saved: bool,
    pub position: Vector3<f32>,
    pub target: Vector3<f32>,
}

impl Default for HomePose {
    fn default() -> Self {
        Self {
            saved: false,
            position: Vector3::new(0.0, 0.0, 0.0),
            target: Vector3::new(0.0, 0.0, 0.0),
        }
    }
}

impl HomePose {
    /// Stores `pose` unless a pose was already saved. Returns whether it stored.
    pub fn capture_once(&mut self, pose: CameraPose) -> bool {
        if self.saved {
            return false;
        }
        self.saved = true;
        self.position = pose.position;
        self.target = pose.target;
        true
    }

    pub fn pose(&self) -> Option<CameraPose> {
        self.saved
            .then(|| CameraPose::new(self.position, self.target))
    }
}

/// Quintic ease with zero first and second derivatives at both ends
pub fn smootherstep(u: f32) -> f32 {
    let u = u.clamp(0.0, 1.0);
    u * u * u * (u * (u * 6.0 - 15.0) + 10.0)
}

/// One running camera animation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationJob {
    pub elapsed: f32,
    pub duration: f32,
    pub from: CameraPose,
    pub to: CameraPose,
}

impl AnimationJob {
    pub fn new(from: CameraPose, to: CameraPose, duration: f32) -> Self {
        Self {
            elapsed: 0.0,
            duration,
            from,
            to,
        }
    }

    /// Linear progress in [0, 1]. Non-positive durations are already done.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    /// Adds `dt` seconds and returns the new progress
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed += dt;
        self.progress()
    }

    pub fn is_complete(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Pose at the current progress. Exactly `to` once complete.
    pub fn sample(&self) -> CameraPose {
        if self.is_complete() {
            return self.to;
        }
        let eased = smootherstep(self.progress());
        CameraPose::new(
            self.from.position.lerp(self.to.position, eased),
            self.from.target.lerp(self.to.target, eased),
        )
    }
}

/// What a tick finished, if anything
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Running,
    Arrived,
    Returned { next: Option<StageId> },
}

#[derive(Debug, Default)]
pub struct TransitionEngine {
    state: NavigationState,
    active_stage: Option<StageId>,
    pending_stage: Option<StageId>,
    home: HomePose,
    job: Option<AnimationJob>,
}

impl TransitionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> NavigationState {
        self.state
    }

    pub fn active_stage(&self) -> Option<&StageId> {
        self.active_stage.as_ref()
    }

    pub fn pending_stage(&self) -> Option<&StageId> {
        self.pending_stage.as_ref()
    }

    pub fn home(&self) -> &HomePose {
        &self.home
    }

    pub fn job(&self) -> Option<&AnimationJob> {
        self.job.as_ref()
    }

    /// Queues `stage` to be entered once the running exit completes.
    /// A later request replaces an earlier one.
    pub fn queue(&mut self, stage: StageId) {
        debug!("[Navigation] queued '{}'", stage);
        self.pending_stage = Some(stage);
    }

    pub fn clear_pending(&mut self) {
        self.pending_stage = None;
    }

    /// Starts animating towards `target`. Only valid from idle.
    pub fn begin_enter(&mut self, stage: StageId, target: TargetPose, rig: &mut CameraManager) -> bool {
        if self.state != NavigationState::Idle {
            debug!("[Navigation] enter '{}' ignored while {}", stage, self.state);
            return false;
        }

        let current = rig.pose();
        if self.home.capture_once(current) {
            debug!("[Navigation] home pose saved at {:?}", current.position);
        }
        rig.set_controls_locked(true);

        info!("[Navigation] entering '{}'", stage);
        self.job = Some(AnimationJob::new(current, target.pose, target.duration));
        self.state = NavigationState::Entering;
        self.active_stage = Some(stage);
        true
    }

    /// Starts animating back to the home pose from wherever the camera is now.
    /// Valid while focused, and while entering (cancel in place).
    pub fn begin_exit(&mut self, duration: f32, rig: &mut CameraManager) -> bool {
        if !matches!(self.state, NavigationState::Focused | NavigationState::Entering) {
            debug!("[Navigation] exit ignored while {}", self.state);
            return false;
        }
        let Some(home) = self.home.pose() else {
            return false;
        };

        info!(
            "[Navigation] exiting '{}'",
            self.active_stage.as_ref().map_or("?", |s| s.as_str())
        );
        self.job = Some(AnimationJob::new(rig.pose(), home, duration));
        self.state = NavigationState::Exiting;
        true
    }

    /// Advances the running animation by `dt` seconds and writes the pose to the camera.
    pub fn tick(&mut self, dt: f32, rig: &mut CameraManager) -> TickOutcome {
        if !self.state.is_animating() {
            return TickOutcome::Running;
        }
        let Some(job) = self.job.as_mut() else {
            return TickOutcome::Running;
        };

        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        job.advance(dt);
        rig.apply_pose(job.sample());
        if !job.is_complete() {
            return TickOutcome::Running;
        }

        self.job = None;
        match self.state {
            NavigationState::Entering => {
                self.state = NavigationState::Focused;
                info!(
                    "[Navigation] focused '{}'",
                    self.active_stage.as_ref().map_or("?", |s| s.as_str())
                );
                TickOutcome::Arrived
            }
            _ => {
                self.state = NavigationState::Idle;
                self.active_stage = None;
                rig.set_controls_locked(false);
                info!("[Navigation] back to free roam");
                TickOutcome::Returned {
                    next: self.pending_stage.take(),
                }
            }
        }
    }
}
