//! # Shop Items
//!
//! Optional props in the room (`SHOP_Rocket`, `SHOP_Bike`, ...) that the
//! embedded computer panel can show and hide through JSON messages.

use std::collections::BTreeMap;

use log::{debug, info, warn};
use serde::Deserialize;

use crate::gfx::scene::{NodeId, SceneGraph};

pub const SHOP_PREFIX: &str = "SHOP";
pub const MESSAGE_TYPE: &str = "ROOM95_SHOP";

pub fn default_items() -> Vec<String> {
    ["Rocket", "Ball", "Stool", "Bike", "Barbell"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShopAction {
    Show,
    Hide,
    Toggle,
}

/// A message posted by the computer panel
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ShopMessage {
    #[serde(rename = "__room95", default)]
    pub room95: bool,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub action: ShopAction,
    #[serde(default)]
    pub item: String,
}

impl ShopMessage {
    /// Parses a panel message. Anything that isn't a well-formed shop
    /// message for this room yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let message: Self = serde_json::from_str(raw).ok()?;
        (message.room95 && message.kind == MESSAGE_TYPE).then_some(message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ShopIndex {
    items: Vec<String>,
    nodes: BTreeMap<String, Vec<NodeId>>,
    all: Vec<NodeId>,
}

impl ShopIndex {
    /// Indexes the geometry nodes under `root` that belong to each of `items`.
    ///
    /// A node matches `SHOP_<item>` exactly or by prefix; failing that, any
    /// `SHOP*` name containing the item (case-insensitive) matches. A node
    /// belongs to the first item it matches.
    pub fn build(graph: &SceneGraph, root: NodeId, items: &[String]) -> Self {
        let mut nodes: BTreeMap<String, Vec<NodeId>> =
            items.iter().map(|item| (item.clone(), Vec::new())).collect();
        let mut all = Vec::new();

        for id in graph.descendants(root) {
            let Some(node) = graph.node(id) else { continue };
            if node.geometry.is_none() || !node.name.starts_with(SHOP_PREFIX) {
                continue;
            }
            all.push(id);
            if let Some(item) = items.iter().find(|item| matches_item(&node.name, item)) {
                nodes.entry(item.clone()).or_default().push(id);
            }
        }

        info!(
            "[Shop] index: {:?}",
            nodes
                .iter()
                .map(|(item, ids)| (item.as_str(), ids.len()))
                .collect::<Vec<_>>()
        );

        Self {
            items: items.to_vec(),
            nodes,
            all,
        }
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn nodes(&self, item: &str) -> &[NodeId] {
        self.nodes.get(item).map_or(&[], Vec::as_slice)
    }

    /// Every `SHOP*` geometry node, indexed or not
    pub fn all_nodes(&self) -> &[NodeId] {
        &self.all
    }

    /// Shows or hides every node of `item`. Returns how many nodes changed.
    pub fn set_visible(&self, graph: &mut SceneGraph, item: &str, visible: bool) -> usize {
        let nodes = self.nodes(item);
        if nodes.is_empty() {
            warn!(
                "[Shop] no nodes found for '{}'. Check model names ({}_{})",
                item, SHOP_PREFIX, item
            );
            return 0;
        }
        for &id in nodes {
            graph.set_visible(id, visible);
        }
        nodes.len()
    }

    /// Flips `item` based on its first node's current visibility
    pub fn toggle(&self, graph: &mut SceneGraph, item: &str) -> Option<bool> {
        let first = *self.nodes(item).first()?;
        let next = !graph.node(first).is_some_and(|n| n.visible);
        self.set_visible(graph, item, next);
        Some(next)
    }

    /// Applies a panel message. Unknown items are reported and ignored.
    pub fn apply(&self, graph: &mut SceneGraph, message: &ShopMessage) {
        if message.item.is_empty() || !self.items.contains(&message.item) {
            warn!("[Shop] unsupported item '{}'", message.item);
            return;
        }
        debug!("[Shop] {:?} {}", message.action, message.item);
        match message.action {
            ShopAction::Show => {
                self.set_visible(graph, &message.item, true);
            }
            ShopAction::Hide => {
                self.set_visible(graph, &message.item, false);
            }
            ShopAction::Toggle => {
                self.toggle(graph, &message.item);
            }
        }
    }

    /// Parses and applies a raw JSON message; returns whether it was a shop message
    pub fn handle_message(&self, graph: &mut SceneGraph, raw: &str) -> bool {
        match ShopMessage::parse(raw) {
            Some(message) => {
                self.apply(graph, &message);
                true
            }
            None => false,
        }
    }
}

fn matches_item(name: &str, item: &str) -> bool {
    let key = format!("{SHOP_PREFIX}_{item}");
    if name.starts_with(&key) {
        return true;
    }
    name.starts_with(SHOP_PREFIX) && name.to_lowercase().contains(&item.to_lowercase())
}
