//! # Scene Management Module
//!
//! The room model as a scene graph: named nodes with local transforms,
//! optional triangle geometry and a parent index.
//!
//! ## Key Components
//!
//! - [`SceneGraph`] - Arena of nodes with name lookup, world transforms, bounds and ray casting
//! - [`Node`] - A named node with a TRS transform and optional [`Geometry`]
//! - [`NodeId`] - Stable handle used everywhere a node is referenced
//! - [`loader`] - OBJ loading and room placement
//!
//! ## Usage
//!
//! ```no_run
//! use roomscope::gfx::scene::{loader, SceneGraph};
//!
//! let (graph, root) = loader::load_obj("room.obj")?;
//! let screen = graph.find_in_subtree(root, "TV_Screen");
//! # Ok::<(), roomscope::RoomError>(())
//! ```

pub mod loader;
pub mod object;
pub mod scene;

// Re-export main types
pub use object::{Geometry, Node, NodeId};
pub use scene::SceneGraph;
