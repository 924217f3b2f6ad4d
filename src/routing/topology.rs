// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{HashMap, HashSet};

use super::{ErrorKind, KindHierarchy};
use crate::errors::ValidationError;

/// One error rule: errors of `kind` (or any specialization of it) go to `destinations`.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorRule {
    pub kind: ErrorKind,
    pub destinations: Vec<String>,
}

/// The routes leaving one node or producer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeRoutes {
    pub output: Vec<String>,
    pub discard: Vec<String>,
    pub errors: Vec<ErrorRule>,
}

/// Immutable routing map shared by every worker.
///
/// A channel with no routes is a leaf: whatever reaches it stops there.
///
/// # Example
/// ```
/// use the_junction::routing::{ErrorKind, KindHierarchy, Topology};
///
/// let topology = Topology::builder(KindHierarchy::new())
///     .producer("reader")
///     .node("upper")
///     .node("sink")
///     .node("errors")
///     .output("reader", ["upper"])
///     .output("upper", ["sink"])
///     .error("upper", ErrorKind::processing(), ["errors"])
///     .build()
///     .unwrap();
///
/// assert_eq!(topology.destinations_for_output("upper"), ["sink".to_string()]);
/// assert_eq!(
///     topology.destinations_for_error("upper", &ErrorKind::data_format()),
///     vec!["errors".to_string()]
/// );
/// assert!(topology.destinations_for_discard("upper").is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct Topology {
    routes: HashMap<String, NodeRoutes>,
    default_error: Vec<String>,
    producers: HashSet<String>,
    nodes: HashSet<String>,
    kinds: KindHierarchy,
}

impl Topology {
    pub fn builder(kinds: KindHierarchy) -> TopologyBuilder {
        TopologyBuilder::new(kinds)
    }

    pub fn destinations_for_output(&self, node_id: &str) -> &[String] {
        self.routes
            .get(node_id)
            .map(|r| r.output.as_slice())
            .unwrap_or_default()
    }

    pub fn destinations_for_discard(&self, node_id: &str) -> &[String] {
        self.routes
            .get(node_id)
            .map(|r| r.discard.as_slice())
            .unwrap_or_default()
    }

    /// Union of the destinations of every error rule matching `kind`.
    ///
    /// Rules are checked in declared order; a rule matches when its kind is
    /// `kind` itself or one of its ancestors. Destinations keep first-seen
    /// order with duplicates removed. An empty result means the error is
    /// unrouted.
    pub fn destinations_for_error(&self, node_id: &str, kind: &ErrorKind) -> Vec<String> {
        let Some(routes) = self.routes.get(node_id) else {
            return Vec::new();
        };

        let ancestry = self.kinds.ancestors(kind);
        let mut destinations: Vec<String> = Vec::new();
        for rule in routes
            .errors
            .iter()
            .filter(|rule| ancestry.contains(&rule.kind))
        {
            for destination in &rule.destinations {
                if !destinations.contains(destination) {
                    destinations.push(destination.clone());
                }
            }
        }
        destinations
    }

    /// Adaptor-wide fallback for errors a node's own rules don't match.
    pub fn default_error_destinations(&self) -> &[String] {
        &self.default_error
    }

    pub fn routes(&self, node_id: &str) -> Option<&NodeRoutes> {
        self.routes.get(node_id)
    }

    pub fn kinds(&self) -> &KindHierarchy {
        &self.kinds
    }

    pub fn is_producer(&self, id: &str) -> bool {
        self.producers.contains(id)
    }

    pub fn is_node(&self, id: &str) -> bool {
        self.nodes.contains(id)
    }
}

/// Collects ids and routes, then validates everything at once in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct TopologyBuilder {
    kinds: KindHierarchy,
    producers: Vec<String>,
    nodes: Vec<String>,
    routes: Vec<(String, NodeRoutes)>,
    default_error: Vec<String>,
}

impl TopologyBuilder {
    pub fn new(kinds: KindHierarchy) -> Self {
        Self {
            kinds,
            producers: Vec::new(),
            nodes: Vec::new(),
            routes: Vec::new(),
            default_error: Vec::new(),
        }
    }

    pub fn producer(mut self, id: impl Into<String>) -> Self {
        self.producers.push(id.into());
        self
    }

    pub fn node(mut self, id: impl Into<String>) -> Self {
        self.nodes.push(id.into());
        self
    }

    pub fn output<I, S>(mut self, from: &str, to: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.routes_for(from).output.extend(to.into_iter().map(Into::into));
        self
    }

    /// Chain `ids` in order: each one's output goes to the next.
    ///
    /// Ids are not declared here; the chain only adds output routes.
    pub fn pipeline<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        for pair in ids.windows(2) {
            self.routes_for(&pair[0]).output.push(pair[1].clone());
        }
        self
    }

    pub fn discard<I, S>(mut self, from: &str, to: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.routes_for(from).discard.extend(to.into_iter().map(Into::into));
        self
    }

    pub fn error<I, S>(mut self, from: &str, kind: impl Into<ErrorKind>, to: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rule = ErrorRule {
            kind: kind.into(),
            destinations: to.into_iter().map(Into::into).collect(),
        };
        self.routes_for(from).errors.push(rule);
        self
    }

    pub fn default_error<I, S>(mut self, to: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_error.extend(to.into_iter().map(Into::into));
        self
    }

    /// Validate and freeze the topology, reporting every problem found.
    pub fn build(self) -> Result<Topology, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let mut seen: HashSet<&str> = HashSet::new();
        for id in self.producers.iter().chain(self.nodes.iter()) {
            if !seen.insert(id.as_str()) {
                errors.push(ValidationError::DuplicateComponentId { id: id.clone() });
            }
        }

        let producers: HashSet<String> = self.producers.iter().cloned().collect();
        let nodes: HashSet<String> = self.nodes.iter().cloned().collect();

        let check_destination = |from: &str, channel: &str, destination: &String, errors: &mut Vec<ValidationError>| {
            if producers.contains(destination) {
                errors.push(ValidationError::ProducerAsDestination {
                    node_id: from.to_string(),
                    destination: destination.clone(),
                });
            } else if !nodes.contains(destination) {
                errors.push(ValidationError::UnresolvedDestination {
                    node_id: from.to_string(),
                    channel: channel.to_string(),
                    destination: destination.clone(),
                });
            }
        };

        for (from, routes) in &self.routes {
            if !producers.contains(from) && !nodes.contains(from) {
                errors.push(ValidationError::UnknownRouteOrigin {
                    node_id: from.clone(),
                });
            }
            for destination in &routes.output {
                check_destination(from, "output", destination, &mut errors);
            }
            for destination in &routes.discard {
                check_destination(from, "discard", destination, &mut errors);
            }
            for rule in &routes.errors {
                if !self.kinds.contains(&rule.kind) {
                    errors.push(ValidationError::UnknownErrorKind {
                        node_id: from.clone(),
                        kind: rule.kind.to_string(),
                    });
                }
                for destination in &rule.destinations {
                    check_destination(from, "errors", destination, &mut errors);
                }
            }
        }

        for destination in &self.default_error {
            check_destination("<adaptor>", "default errors", destination, &mut errors);
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Topology {
            routes: self.routes.into_iter().collect(),
            default_error: self.default_error,
            producers,
            nodes,
            kinds: self.kinds,
        })
    }

    fn routes_for(&mut self, from: &str) -> &mut NodeRoutes {
        let index = match self.routes.iter().position(|(id, _)| id == from) {
            Some(index) => index,
            None => {
                self.routes.push((from.to_string(), NodeRoutes::default()));
                self.routes.len() - 1
            }
        };
        &mut self.routes[index].1
    }
}
