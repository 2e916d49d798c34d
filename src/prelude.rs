//! # Roomscope Prelude
//!
//! Commonly used types in one import.
//!
//! ```no_run
//! use roomscope::prelude::*;
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut app = roomscope::default()?;
//!     app.load_model("room.obj")?;
//!     app.set_frame_callback(|room: &RoomExperience| {
//!         let _view_proj = room.camera().get_view_proj_matrix();
//!         for overlay in room.overlays().iter().filter(|o| o.is_visible()) {
//!             let _panel = overlay.placement().map(|p| p.to_matrix());
//!         }
//!     });
//!     app.run()
//! }
//! ```

// Re-export core application types
pub use crate::app::RoomApp;
pub use crate::config::RoomConfig;
pub use crate::default;
pub use crate::error::RoomError;
pub use crate::experience::{RoomExperience, RoomModel};

// Re-export camera and scene types
pub use crate::gfx::camera::{CameraManager, CameraPose, OrbitCamera, OrbitControls};
pub use crate::gfx::scene::{Geometry, Node, NodeId, SceneGraph};

// Re-export navigation and overlays
pub use crate::navigation::{Navigation, NavigationState, StageConfig, StageId};
pub use crate::overlay::{OverlayConfig, OverlayPlacement};

// Re-export input
pub use crate::input::{CursorHint, Intent};

// Re-export common external dependencies
pub use cgmath::{InnerSpace, Vector2, Vector3, Zero};
