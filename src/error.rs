//! # Error Types
//!
//! Startup and integration failures. Runtime degradations (missing stage
//! objects, degenerate geometry, requests in the wrong state) are logged and
//! never surface here.

use thiserror::Error;

use crate::gfx::scene::NodeId;

#[derive(Debug, Error)]
pub enum RoomError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("scene root {0:?} is not part of the scene graph")]
    MissingRoot(NodeId),

    #[error("room model was already bound")]
    ModelAlreadyBound,

    #[error("unknown debug command: {0}")]
    UnknownCommand(String),

    #[error("failed to load model: {0}")]
    ModelLoad(#[from] tobj::LoadError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RoomError>;
