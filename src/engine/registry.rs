// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::engine::{Node, ProducerHandle};

/// A type-safe registry mapping node ids to their wired nodes.
///
/// The router looks destinations up here. Nodes are held in `Arc` so every
/// worker shares the same instances. Iteration follows registration order.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use the_junction::backends::local::processors::{ChangeTextCaseStep, ReverseTextStep};
/// use the_junction::engine::{Node, NodeMap};
///
/// let mut nodes = NodeMap::new();
/// nodes.insert(Node::step("reverse", Arc::new(ReverseTextStep::new())));
/// nodes.insert(Node::step("lower", Arc::new(ChangeTextCaseStep::lower())));
///
/// assert!(nodes.contains_key("reverse"));
/// assert_eq!(nodes.get("reverse").map(|n| n.id()), Some("reverse"));
/// assert_eq!(nodes.ids().collect::<Vec<_>>(), vec!["reverse", "lower"]);
/// ```
#[derive(Clone, Default)]
pub struct NodeMap {
    nodes: HashMap<String, Arc<Node>>,
    order: Vec<String>,
}

impl NodeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `node` under its own id, returning any node it replaced.
    ///
    /// A replacement keeps the position of the node it replaced.
    pub fn insert(&mut self, node: Node) -> Option<Arc<Node>> {
        let id = node.id().to_string();
        let replaced = self.nodes.insert(id.clone(), Arc::new(node));
        if replaced.is_none() {
            self.order.push(id);
        }
        replaced
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Node>> {
        self.nodes.get(id)
    }

    pub fn contains_key(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn ids(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &Arc<Node>> {
        self.order.iter().filter_map(move |id| self.nodes.get(id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl From<Vec<Node>> for NodeMap {
    fn from(nodes: Vec<Node>) -> Self {
        let mut map = Self::new();
        for node in nodes {
            map.insert(node);
        }
        map
    }
}

impl fmt::Debug for NodeMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeMap").field(&self.order).finish()
    }
}

/// Everything the adaptor runs: the nodes and the producers feeding them.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    pub nodes: Arc<NodeMap>,
    pub producers: Vec<Arc<ProducerHandle>>,
}

impl ComponentRegistry {
    pub fn new(nodes: NodeMap, producers: Vec<ProducerHandle>) -> Self {
        Self {
            nodes: Arc::new(nodes),
            producers: producers.into_iter().map(Arc::new).collect(),
        }
    }
}
