// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for processing node events.

use std::error::Error;
use std::fmt::{Display, Formatter};

use tracing::Span;

use crate::observability::messages::StructuredLog;

/// A node was applied to a message.
///
/// # Log Level
/// `debug!` - Emitted for every node visited
///
/// # Example
/// ```
/// use the_junction::observability::messages::node::NodeApplied;
///
/// let msg = NodeApplied {
///     node_id: "upper",
///     input_count: 3,
///     output_count: 2,
///     discard_count: 1,
///     error_count: 0,
/// };
///
/// tracing::debug!("{}", msg);
/// ```
pub struct NodeApplied<'a> {
    pub node_id: &'a str,
    pub input_count: usize,
    pub output_count: usize,
    pub discard_count: usize,
    pub error_count: usize,
}

impl Display for NodeApplied<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' applied to {} item(s): output={}, discarded={}, failed={}",
            self.node_id, self.input_count, self.output_count, self.discard_count, self.error_count
        )
    }
}

impl StructuredLog for NodeApplied<'_> {
    fn log(&self) {
        tracing::debug!(
            node_id = self.node_id,
            input_count = self.input_count,
            output_count = self.output_count,
            discard_count = self.discard_count,
            error_count = self.error_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "node",
            span_name = name,
            node_id = self.node_id,
            input_count = self.input_count,
        )
    }
}

/// An item failed inside a node; its siblings carry on.
///
/// # Log Level
/// `warn!` - Item-level failure
pub struct ItemFailed<'a> {
    pub node_id: &'a str,
    pub kind: &'a str,
    pub error: &'a dyn Error,
}

impl Display for ItemFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' failed an item with {} error: {}",
            self.node_id, self.kind, self.error
        )
    }
}

impl StructuredLog for ItemFailed<'_> {
    fn log(&self) {
        tracing::warn!(
            node_id = self.node_id,
            kind = self.kind,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("item_failed", span_name = name, node_id = self.node_id, kind = self.kind)
    }
}

pub struct ItemDiscarded<'a> {
    pub node_id: &'a str,
    pub reason: &'a str,
}

impl Display for ItemDiscarded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Node '{}' discarded an item: {}", self.node_id, self.reason)
    }
}

impl StructuredLog for ItemDiscarded<'_> {
    fn log(&self) {
        tracing::debug!(node_id = self.node_id, reason = self.reason, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("item_discarded", span_name = name, node_id = self.node_id)
    }
}

/// # Log Level
/// `info!` - Lifecycle event
pub struct NodeStarted<'a> {
    pub node_id: &'a str,
    pub role: &'a str,
    pub implementation: &'a str,
}

impl Display for NodeStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Started {} node '{}' ({})",
            self.role, self.node_id, self.implementation
        )
    }
}

impl StructuredLog for NodeStarted<'_> {
    fn log(&self) {
        tracing::info!(
            node_id = self.node_id,
            role = self.role,
            implementation = self.implementation,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("node_started", span_name = name, node_id = self.node_id, role = self.role)
    }
}

pub struct NodeStopped<'a> {
    pub node_id: &'a str,
}

impl Display for NodeStopped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Stopped node '{}'", self.node_id)
    }
}

impl StructuredLog for NodeStopped<'_> {
    fn log(&self) {
        tracing::info!(node_id = self.node_id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("node_stopped", span_name = name, node_id = self.node_id)
    }
}

/// # Log Level
/// `warn!` - The node is stopped regardless
pub struct NodeDisconnectFailed<'a> {
    pub node_id: &'a str,
    pub error: &'a dyn Error,
}

impl Display for NodeDisconnectFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Node '{}' failed to disconnect: {}", self.node_id, self.error)
    }
}

impl StructuredLog for NodeDisconnectFailed<'_> {
    fn log(&self) {
        tracing::warn!(node_id = self.node_id, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("node_disconnect_failed", span_name = name, node_id = self.node_id)
    }
}

/// An enrichment node is about to read without parameters.
///
/// # Log Level
/// `warn!` - The reader is still called
pub struct EnrichmentWithoutParameters<'a> {
    pub node_id: &'a str,
}

impl Display for EnrichmentWithoutParameters<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Node '{}' has no reader parameters for an item", self.node_id)
    }
}

impl StructuredLog for EnrichmentWithoutParameters<'_> {
    fn log(&self) {
        tracing::warn!(node_id = self.node_id, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("enrichment_without_parameters", span_name = name, node_id = self.node_id)
    }
}

/// # Log Level
/// `debug!` - Emitted for every enriched item
pub struct EnrichmentRead<'a> {
    pub node_id: &'a str,
    pub reader: &'a str,
    pub record_count: usize,
}

impl Display for EnrichmentRead<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Node '{}' read {} record(s) from {}",
            self.node_id, self.record_count, self.reader
        )
    }
}

impl StructuredLog for EnrichmentRead<'_> {
    fn log(&self) {
        tracing::debug!(
            node_id = self.node_id,
            reader = self.reader,
            record_count = self.record_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("enrichment_read", span_name = name, node_id = self.node_id, reader = self.reader)
    }
}
