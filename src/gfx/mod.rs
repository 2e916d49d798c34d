//! # Graphics Module
//!
//! Camera, scene graph and ray casting: the 3D side that navigation and the
//! overlay layer read from and write to.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - Perspective camera, orbit controls and the
//!   [`CameraManager`](camera::CameraManager) that owns the live pose
//! - **Picking** ([`picking`]) - Rays, bounding boxes and triangle tests
//! - **Scene Management** ([`scene`]) - Named node hierarchy loaded from the room model
//!
//! Rendering itself lives outside this crate; it reads the camera matrices and
//! the overlay placements once per frame.

pub mod camera;
pub mod picking;
pub mod scene;

// Re-export commonly used types
pub use camera::{CameraManager, CameraPose, OrbitCamera, OrbitControls};
pub use picking::{Ray, AABB};
pub use scene::{NodeId, SceneGraph};
