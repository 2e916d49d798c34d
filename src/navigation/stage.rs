//! # Stage Registry
//!
//! Named focus targets and their approach tuning. Stages start unbound and
//! pick up their scene nodes once, by name, when the room model arrives.

use std::collections::HashSet;
use std::fmt;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RoomError};
use crate::gfx::scene::{NodeId, SceneGraph};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageId(String);

impl StageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StageId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

fn default_duration_in() -> f32 {
    1.0
}

fn default_duration_out() -> f32 {
    0.9
}

/// Static description of a stage.
///
/// Offsets are measured along the focus object's own world axes: forward
/// (+Z, flipped towards the camera), right (+X) and up (+Y).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    pub id: StageId,
    pub root_name: String,
    pub screen_name: String,
    pub approach_distance: f32,
    #[serde(default)]
    pub lateral_offset: f32,
    #[serde(default)]
    pub vertical_offset: f32,
    #[serde(default)]
    pub target_vertical_offset: f32,
    #[serde(default = "default_duration_in")]
    pub duration_in: f32,
    #[serde(default = "default_duration_out")]
    pub duration_out: f32,
}

impl StageConfig {
    /// The television on the TV stand
    pub fn tv() -> Self {
        Self {
            id: StageId::new("tv"),
            root_name: "TV_Third".into(),
            screen_name: "TV_Screen".into(),
            approach_distance: 0.8,
            lateral_offset: 2.0,
            vertical_offset: 0.35,
            target_vertical_offset: 0.05,
            duration_in: 1.1,
            duration_out: 0.9,
        }
    }

    /// The desk computer
    pub fn computer() -> Self {
        Self {
            id: StageId::new("computer"),
            root_name: "Computer_Second".into(),
            screen_name: "Comp_Screen".into(),
            approach_distance: 1.1,
            lateral_offset: 0.05,
            vertical_offset: 0.0,
            target_vertical_offset: 0.04,
            duration_in: 1.0,
            duration_out: 0.9,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.as_str().is_empty() {
            return Err(RoomError::InvalidConfig("stage id must not be empty".into()));
        }
        let numbers = [
            ("approach_distance", self.approach_distance),
            ("lateral_offset", self.lateral_offset),
            ("vertical_offset", self.vertical_offset),
            ("target_vertical_offset", self.target_vertical_offset),
            ("duration_in", self.duration_in),
            ("duration_out", self.duration_out),
        ];
        for (field, value) in numbers {
            if !value.is_finite() {
                return Err(RoomError::InvalidConfig(format!(
                    "stage '{}': {} must be finite",
                    self.id, field
                )));
            }
        }
        Ok(())
    }
}

/// A stage plus the scene nodes it resolved to.
///
/// The node handles point into the scene graph, which keeps ownership.
#[derive(Debug, Clone)]
pub struct Stage {
    pub config: StageConfig,
    pub root: Option<NodeId>,
    pub screen: Option<NodeId>,
}

impl Stage {
    pub fn new(config: StageConfig) -> Self {
        Self {
            config,
            root: None,
            screen: None,
        }
    }

    pub fn id(&self) -> &StageId {
        &self.config.id
    }

    /// A stage with neither node bound is inert: it can't be picked or focused
    pub fn is_inert(&self) -> bool {
        self.root.is_none() && self.screen.is_none()
    }

    /// The node the camera frames when the stage is requested without a pick
    pub fn default_focus(&self) -> Option<NodeId> {
        self.screen.or(self.root)
    }
}

#[derive(Debug, Clone, Default)]
pub struct StageRegistry {
    stages: Vec<Stage>,
}

impl StageRegistry {
    /// Validates every config and rejects duplicate ids
    pub fn new(configs: Vec<StageConfig>) -> Result<Self> {
        let mut seen = HashSet::new();
        for config in &configs {
            config.validate()?;
            if !seen.insert(config.id.clone()) {
                return Err(RoomError::InvalidConfig(format!(
                    "duplicate stage id '{}'",
                    config.id
                )));
            }
        }
        Ok(Self {
            stages: configs.into_iter().map(Stage::new).collect(),
        })
    }

    pub fn get(&self, id: &StageId) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Stage> {
        self.stages.iter()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Resolves every stage's root and screen by name inside `root`'s subtree.
    ///
    /// This is the only place names are matched against the model; missing
    /// nodes are reported and leave the stage partially or fully inert.
    pub fn bind(&mut self, graph: &SceneGraph, root: NodeId) {
        for stage in &mut self.stages {
            stage.root = graph.find_in_subtree(root, &stage.config.root_name);
            stage.screen = graph.find_in_subtree(root, &stage.config.screen_name);

            info!(
                "[Navigation] {} root: {:?}, screen: {:?}",
                stage.config.id,
                stage.root.and_then(|id| graph.name(id)),
                stage.screen.and_then(|id| graph.name(id)),
            );
            if stage.is_inert() {
                warn!(
                    "[Navigation] stage '{}' not found. Check names: {}, {}",
                    stage.config.id, stage.config.root_name, stage.config.screen_name
                );
            } else if stage.screen.is_none() {
                warn!(
                    "[Navigation] stage '{}' has no screen '{}', framing its root instead",
                    stage.config.id, stage.config.screen_name
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::Node;

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = StageRegistry::new(vec![StageConfig::tv(), StageConfig::tv()]);
        assert!(matches!(result, Err(RoomError::InvalidConfig(_))));
    }

    #[test]
    fn test_non_finite_tuning_rejected() {
        let mut config = StageConfig::computer();
        config.duration_in = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bind_by_name() {
        let mut graph = SceneGraph::new();
        let room = graph.add_node(Node::new("Room"), None);
        let tv = graph.add_node(Node::new("TV_Third"), Some(room));
        let screen = graph.add_node(Node::new("TV_Screen"), Some(tv));
        let desk = graph.add_node(Node::new("Computer_Second"), Some(room));

        let mut registry =
            StageRegistry::new(vec![StageConfig::tv(), StageConfig::computer()]).unwrap();
        registry.bind(&graph, room);

        let tv_stage = registry.get(&"tv".into()).unwrap();
        assert_eq!(tv_stage.root, Some(tv));
        assert_eq!(tv_stage.screen, Some(screen));
        assert_eq!(tv_stage.default_focus(), Some(screen));

        let computer = registry.get(&"computer".into()).unwrap();
        assert_eq!(computer.screen, None);
        assert_eq!(computer.default_focus(), Some(desk));
        assert!(!computer.is_inert());
    }

    #[test]
    fn test_missing_nodes_make_stage_inert() {
        let mut graph = SceneGraph::new();
        let room = graph.add_node(Node::new("Room"), None);
        let mut registry = StageRegistry::new(vec![StageConfig::tv()]).unwrap();
        registry.bind(&graph, room);
        assert!(registry.get(&"tv".into()).unwrap().is_inert());
    }

    #[test]
    fn test_config_defaults_from_json() {
        let config: StageConfig = serde_json::from_str(
            r#"{"id": "lamp", "root_name": "Lamp", "screen_name": "Lamp_Shade", "approach_distance": 0.5}"#,
        )
        .unwrap();
        assert_eq!(config.id, StageId::new("lamp"));
        assert_eq!(config.lateral_offset, 0.0);
        assert_eq!(config.duration_in, 1.0);
        assert_eq!(config.duration_out, 0.9);
    }
}
