// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Walks one top-level message through the topology.
//!
//! Traversal is depth first: for every destination of a channel the node is
//! applied and its response is followed (output, then discards, then errors)
//! before the next destination is visited. Everything touched during the walk
//! commits or rolls back together.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use tracing::Instrument;

use crate::engine::{Node, NodeMap, Transaction, TransactionCoordinator};
use crate::errors::RoutingFailure;
use crate::message::{ErrorBatch, Item, Message, MessageError, Response};
use crate::observability::messages::engine::{
    LeafReached, TraversalCompleted, TraversalFailed, TraversalStarted, UnhandledError,
    UnroutedError,
};
use crate::observability::messages::StructuredLog;
use crate::routing::{ErrorKind, Topology};

type DispatchFuture<'a> = Pin<Box<dyn Future<Output = Result<(), RoutingFailure>> + Send + 'a>>;

/// Items that stopped at a leaf, and the node they stopped at.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalBatch {
    pub node_id: String,
    pub items: Vec<Item>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionOutcome {
    Committed,
    RolledBack,
}

/// Everything a successful traversal left behind.
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalResults {
    pub transaction_id: u64,
    pub outputs: Vec<TerminalBatch>,
    pub discards: Vec<TerminalBatch>,
    /// Unrouted errors from best-effort nodes.
    pub unhandled_errors: Vec<MessageError>,
    pub outcome: TransactionOutcome,
}

impl TerminalResults {
    fn new(transaction_id: u64) -> Self {
        Self {
            transaction_id,
            outputs: Vec::new(),
            discards: Vec::new(),
            unhandled_errors: Vec::new(),
            outcome: TransactionOutcome::Committed,
        }
    }

    /// Leaf output items in the order they arrived.
    pub fn output_items(&self) -> Vec<&Item> {
        self.outputs.iter().flat_map(|b| b.items.iter()).collect()
    }

    /// Leaf output items that stopped at `node_id`.
    pub fn outputs_of(&self, node_id: &str) -> Vec<&Item> {
        self.outputs
            .iter()
            .filter(|b| b.node_id == node_id)
            .flat_map(|b| b.items.iter())
            .collect()
    }

    pub fn discarded_items(&self) -> Vec<&Item> {
        self.discards.iter().flat_map(|b| b.items.iter()).collect()
    }

    pub fn is_committed(&self) -> bool {
        self.outcome == TransactionOutcome::Committed
    }
}

/// Dispatches messages along a shared, immutable topology.
#[derive(Debug)]
pub struct Router {
    topology: Arc<Topology>,
    nodes: Arc<NodeMap>,
    coordinator: Arc<TransactionCoordinator>,
}

impl Router {
    pub fn new(
        topology: Arc<Topology>,
        nodes: Arc<NodeMap>,
        coordinator: Arc<TransactionCoordinator>,
    ) -> Self {
        Self {
            topology,
            nodes,
            coordinator,
        }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn nodes(&self) -> &NodeMap {
        &self.nodes
    }

    /// Route a top-level message inside its own transaction.
    ///
    /// On success the transaction is committed; a commit failure is logged and
    /// reported through [`TerminalResults::outcome`]. On failure the
    /// transaction is rolled back with the failure as its cause.
    pub async fn route(&self, msg: Message) -> Result<TerminalResults, RoutingFailure> {
        let transaction = self.coordinator.begin();
        let msg = msg.with_transaction(Arc::clone(&transaction));

        let started = TraversalStarted {
            transaction_id: transaction.id(),
            producer_id: msg.sender(),
            item_count: msg.len(),
        };
        let span = started.span("route");
        started.log();

        self.route_in_transaction(&msg, &transaction)
            .instrument(span)
            .await
    }

    async fn route_in_transaction(
        &self,
        msg: &Message,
        transaction: &Transaction,
    ) -> Result<TerminalResults, RoutingFailure> {
        let start_time = Instant::now();
        let mut results = TerminalResults::new(transaction.id());

        if let Err(failure) = self.traverse(msg, transaction, &mut results).await {
            self.coordinator.rollback(transaction, &failure).await;
            TraversalFailed {
                transaction_id: transaction.id(),
                producer_id: msg.sender(),
                error: &failure,
            }
            .log();
            return Err(failure);
        }

        if self.coordinator.commit(transaction).await.is_err() {
            // already logged and rolled back by the coordinator
            results.outcome = TransactionOutcome::RolledBack;
        }

        TraversalCompleted {
            transaction_id: transaction.id(),
            producer_id: msg.sender(),
            output_batches: results.outputs.len(),
            discard_batches: results.discards.len(),
            unhandled_errors: results.unhandled_errors.len(),
            committed: results.is_committed(),
            duration: start_time.elapsed(),
        }
        .log();

        Ok(results)
    }

    async fn traverse(
        &self,
        msg: &Message,
        transaction: &Transaction,
        results: &mut TerminalResults,
    ) -> Result<(), RoutingFailure> {
        if let Some(resource) = msg.origin_resource() {
            self.coordinator
                .enlist(transaction, Arc::clone(resource))
                .await?;
        }

        let destinations = self.topology.destinations_for_output(msg.sender());
        if destinations.is_empty() {
            self.leaf(msg.sender(), "output", msg.data().to_vec(), &mut results.outputs);
        } else {
            self.dispatch(msg, destinations, results).await?;
        }

        if let Some(resource) = msg.origin_resource() {
            self.coordinator.delist_for_commit(transaction, resource)?;
        }
        Ok(())
    }

    /// Apply `msg` to each destination in order and follow what each one returns.
    fn dispatch<'a>(
        &'a self,
        msg: &'a Message,
        destinations: &'a [String],
        results: &'a mut TerminalResults,
    ) -> DispatchFuture<'a> {
        Box::pin(async move {
            for destination in destinations {
                let node = self.nodes.get(destination).ok_or_else(|| {
                    RoutingFailure::UnknownDestination {
                        node_id: destination.clone(),
                        from: msg.sender().to_string(),
                    }
                })?;
                let response = self.apply(node, msg).await?;
                self.follow(node, msg, response, results).await?;
            }
            Ok(())
        })
    }

    async fn apply(&self, node: &Node, msg: &Message) -> Result<Response, RoutingFailure> {
        if node.accepts_batches() || msg.len() <= 1 {
            return node.apply(msg, &self.coordinator).await;
        }

        let mut merged = Response::new();
        for item in msg.data() {
            let response = node.apply(&msg.single(item.clone()), &self.coordinator).await?;
            merged.merge(response);
        }
        Ok(merged)
    }

    async fn follow(
        &self,
        node: &Node,
        msg: &Message,
        response: Response,
        results: &mut TerminalResults,
    ) -> Result<(), RoutingFailure> {
        let node_id = node.id();
        let (output, discards, errors) = response.into_parts();

        if !output.is_empty() {
            let destinations = self.topology.destinations_for_output(node_id);
            if destinations.is_empty() {
                self.leaf(node_id, "output", output, &mut results.outputs);
            } else {
                let next = msg.derive(node_id, output);
                self.dispatch(&next, destinations, results).await?;
            }
        }

        for batch in discards {
            let destinations = self.topology.destinations_for_discard(node_id);
            if destinations.is_empty() {
                self.leaf(node_id, "discard", batch.items, &mut results.discards);
            } else {
                let next = msg.derive(node_id, batch.items);
                self.dispatch(&next, destinations, results).await?;
            }
        }

        for batch in errors {
            let destinations = self.error_destinations(node_id, batch.kind());
            if destinations.is_empty() {
                self.unrouted(node, batch, results)?;
                continue;
            }
            let items = batch
                .errors()
                .iter()
                .map(MessageError::to_item)
                .collect();
            let next = msg.derive(node_id, items);
            self.dispatch(&next, &destinations, results).await?;
        }

        Ok(())
    }

    /// The node's own matching rules, else the default route unless the node is on it.
    fn error_destinations(&self, node_id: &str, kind: &ErrorKind) -> Vec<String> {
        let routed = self.topology.destinations_for_error(node_id, kind);
        if !routed.is_empty() {
            return routed;
        }
        let fallback = self.topology.default_error_destinations();
        if fallback.iter().any(|d| d == node_id) {
            return Vec::new();
        }
        fallback.to_vec()
    }

    fn unrouted(
        &self,
        node: &Node,
        batch: ErrorBatch,
        results: &mut TerminalResults,
    ) -> Result<(), RoutingFailure> {
        if node.is_best_effort() {
            UnhandledError {
                node_id: node.id(),
                kind: batch.kind().as_str(),
                item_count: batch.len(),
            }
            .log();
            results.unhandled_errors.extend(batch.into_errors());
            return Ok(());
        }

        UnroutedError {
            node_id: node.id(),
            kind: batch.kind().as_str(),
            item_count: batch.len(),
        }
        .log();
        Err(RoutingFailure::Unrouted {
            node_id: node.id().to_string(),
            kind: batch.kind().clone(),
            message: batch.first_message().to_string(),
        })
    }

    fn leaf(&self, node_id: &str, channel: &str, items: Vec<Item>, sink: &mut Vec<TerminalBatch>) {
        LeafReached {
            node_id,
            channel,
            item_count: items.len(),
        }
        .log();
        sink.push(TerminalBatch {
            node_id: node_id.to_string(),
            items,
        });
    }
}
