// src/lib.rs
//! Roomscope
//!
//! Click-to-focus camera navigation for interactive 3D rooms, with 2D panels
//! kept registered on in-scene screens. Built on cgmath and winit; drawing is
//! left to an external renderer that reads the camera and overlay placements
//! every frame.

pub mod app;
pub mod config;
pub mod debug;
pub mod error;
pub mod experience;
pub mod gfx;
pub mod input;
pub mod navigation;
pub mod overlay;
pub mod prelude;
pub mod shop;

// Re-export main types for convenience
pub use app::RoomApp;
pub use config::RoomConfig;
pub use error::{Result, RoomError};
pub use experience::RoomExperience;

/// Creates a room application with the stock room configuration
pub fn default() -> anyhow::Result<RoomApp> {
    RoomApp::new(RoomConfig::default())
}
