//! # Debug Commands
//!
//! Developer commands for poking at the loaded room: list node names and
//! force every shop prop on or off. Commands are parsed from text and run
//! explicitly against the scene; the report lines are returned and logged.

use std::str::FromStr;

use log::info;

use crate::error::RoomError;
use crate::gfx::scene::{NodeId, SceneGraph};
use crate::shop::ShopIndex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebugCommand {
    /// Node names containing `filter` (case-insensitive); empty lists everything
    List { filter: String },
    ShopList,
    ShopShow,
    ShopHide,
    ShopToggle,
}

impl FromStr for DebugCommand {
    type Err = RoomError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = match (words.next(), words.next()) {
            (Some("list"), filter) => DebugCommand::List {
                filter: filter.unwrap_or_default().to_string(),
            },
            (Some("shop"), Some("list")) => DebugCommand::ShopList,
            (Some("shop"), Some("show")) => DebugCommand::ShopShow,
            (Some("shop"), Some("hide")) => DebugCommand::ShopHide,
            (Some("shop"), Some("toggle")) => DebugCommand::ShopToggle,
            _ => return Err(RoomError::UnknownCommand(line.trim().to_string())),
        };
        if words.next().is_some() {
            return Err(RoomError::UnknownCommand(line.trim().to_string()));
        }
        Ok(command)
    }
}

impl DebugCommand {
    pub fn execute(&self, graph: &mut SceneGraph, root: NodeId, shop: &ShopIndex) -> Vec<String> {
        let lines = match self {
            DebugCommand::List { filter } => list_nodes(graph, root, filter),
            DebugCommand::ShopList => {
                let mut lines: Vec<String> = shop
                    .all_nodes()
                    .iter()
                    .filter_map(|id| graph.name(*id))
                    .map(|name| format!(" - {name}"))
                    .collect();
                lines.insert(0, "SHOP nodes:".to_string());
                lines.push(format!("count: {}", shop.all_nodes().len()));
                lines
            }
            DebugCommand::ShopShow => {
                set_all(graph, shop.all_nodes(), true);
                vec![format!("SHOP shown: {}", shop.all_nodes().len())]
            }
            DebugCommand::ShopHide => {
                set_all(graph, shop.all_nodes(), false);
                vec![format!("SHOP hidden: {}", shop.all_nodes().len())]
            }
            DebugCommand::ShopToggle => {
                let next = !shop
                    .all_nodes()
                    .first()
                    .and_then(|id| graph.node(*id))
                    .is_some_and(|n| n.visible);
                set_all(graph, shop.all_nodes(), next);
                vec![format!(
                    "SHOP toggle -> {}",
                    if next { "shown" } else { "hidden" }
                )]
            }
        };

        for line in &lines {
            info!("[Debug] {}", line);
        }
        lines
    }
}

fn list_nodes(graph: &SceneGraph, root: NodeId, filter: &str) -> Vec<String> {
    let filter = filter.to_lowercase();
    graph
        .descendants(root)
        .into_iter()
        .filter_map(|id| graph.node(id))
        .filter(|node| node.name.to_lowercase().contains(&filter))
        .map(|node| {
            let kind = if node.geometry.is_some() { "Mesh" } else { "Group" };
            format!("{kind} {}", node.name)
        })
        .collect()
}

fn set_all(graph: &mut SceneGraph, nodes: &[NodeId], visible: bool) {
    for &id in nodes {
        graph.set_visible(id, visible);
    }
}
