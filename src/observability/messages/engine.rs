// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for routing and transaction events.
//!
//! This module contains message types for logging events related to:
//! * Traversal of one top-level message (start, completion, failure)
//! * Errors that found no route
//! * Items that stopped at a leaf
//! * Enlistment, commit and rollback of transactional resources

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

use tracing::Span;

use crate::observability::messages::StructuredLog;

/// Traversal of a top-level message started.
///
/// # Log Level
/// `debug!` - Emitted once per polled batch
///
/// # Example
/// ```
/// use the_junction::observability::messages::engine::TraversalStarted;
///
/// let msg = TraversalStarted {
///     transaction_id: 1,
///     producer_id: "reader",
///     item_count: 2,
/// };
///
/// assert_eq!(msg.to_string(), "Transaction 1: routing 2 item(s) from 'reader'");
/// ```
pub struct TraversalStarted<'a> {
    pub transaction_id: u64,
    pub producer_id: &'a str,
    pub item_count: usize,
}

impl Display for TraversalStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Transaction {}: routing {} item(s) from '{}'",
            self.transaction_id, self.item_count, self.producer_id
        )
    }
}

impl StructuredLog for TraversalStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            transaction_id = self.transaction_id,
            producer_id = self.producer_id,
            item_count = self.item_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "traversal",
            span_name = name,
            transaction_id = self.transaction_id,
            producer_id = self.producer_id,
        )
    }
}

/// Traversal finished and the transaction was resolved.
///
/// # Log Level
/// `debug!` - Emitted once per polled batch
pub struct TraversalCompleted<'a> {
    pub transaction_id: u64,
    pub producer_id: &'a str,
    pub output_batches: usize,
    pub discard_batches: usize,
    pub unhandled_errors: usize,
    pub committed: bool,
    pub duration: Duration,
}

impl Display for TraversalCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Transaction {}: routing from '{}' finished ({}) in {:?}: {} output batch(es), {} discard batch(es), {} unhandled error(s)",
            self.transaction_id,
            self.producer_id,
            if self.committed { "committed" } else { "rolled back" },
            self.duration,
            self.output_batches,
            self.discard_batches,
            self.unhandled_errors
        )
    }
}

impl StructuredLog for TraversalCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            transaction_id = self.transaction_id,
            producer_id = self.producer_id,
            output_batches = self.output_batches,
            discard_batches = self.discard_batches,
            unhandled_errors = self.unhandled_errors,
            committed = self.committed,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "traversal_completed",
            span_name = name,
            transaction_id = self.transaction_id,
            duration = ?self.duration,
        )
    }
}

/// Traversal aborted; the transaction has been rolled back.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct TraversalFailed<'a> {
    pub transaction_id: u64,
    pub producer_id: &'a str,
    pub error: &'a dyn Error,
}

impl Display for TraversalFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Transaction {}: routing from '{}' failed and was rolled back: {}",
            self.transaction_id, self.producer_id, self.error
        )
    }
}

impl StructuredLog for TraversalFailed<'_> {
    fn log(&self) {
        tracing::error!(
            transaction_id = self.transaction_id,
            producer_id = self.producer_id,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "traversal_failed",
            span_name = name,
            transaction_id = self.transaction_id,
            producer_id = self.producer_id,
        )
    }
}

/// An error batch matched no error route and no default route.
///
/// # Log Level
/// `error!` - The traversal is aborted
pub struct UnroutedError<'a> {
    pub node_id: &'a str,
    pub kind: &'a str,
    pub item_count: usize,
}

impl Display for UnroutedError<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "No route for {} error from node '{}' ({} item(s))",
            self.kind, self.node_id, self.item_count
        )
    }
}

impl StructuredLog for UnroutedError<'_> {
    fn log(&self) {
        tracing::error!(
            node_id = self.node_id,
            kind = self.kind,
            item_count = self.item_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("unrouted_error", span_name = name, node_id = self.node_id, kind = self.kind)
    }
}

/// An unrouted error from a best-effort node was recorded and skipped.
///
/// # Log Level
/// `warn!` - Items were dropped
pub struct UnhandledError<'a> {
    pub node_id: &'a str,
    pub kind: &'a str,
    pub item_count: usize,
}

impl Display for UnhandledError<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Best-effort node '{}' dropped {} item(s) with unrouted {} error",
            self.node_id, self.item_count, self.kind
        )
    }
}

impl StructuredLog for UnhandledError<'_> {
    fn log(&self) {
        tracing::warn!(
            node_id = self.node_id,
            kind = self.kind,
            item_count = self.item_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("unhandled_error", span_name = name, node_id = self.node_id, kind = self.kind)
    }
}

/// Items stopped at a channel with no routes.
pub struct LeafReached<'a> {
    pub node_id: &'a str,
    pub channel: &'a str,
    pub item_count: usize,
}

impl Display for LeafReached<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{} item(s) stopped at {} leaf of '{}'",
            self.item_count, self.channel, self.node_id
        )
    }
}

impl StructuredLog for LeafReached<'_> {
    fn log(&self) {
        tracing::debug!(
            node_id = self.node_id,
            channel = self.channel,
            item_count = self.item_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("leaf", span_name = name, node_id = self.node_id, channel = self.channel)
    }
}

/// A resource joined a transaction.
pub struct ResourceEnlisted<'a> {
    pub transaction_id: u64,
    pub resource: &'a str,
}

impl Display for ResourceEnlisted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Transaction {}: enlisted resource '{}'",
            self.transaction_id, self.resource
        )
    }
}

impl StructuredLog for ResourceEnlisted<'_> {
    fn log(&self) {
        tracing::debug!(
            transaction_id = self.transaction_id,
            resource = self.resource,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("enlist", span_name = name, transaction_id = self.transaction_id, resource = self.resource)
    }
}

/// Every enlisted resource committed.
///
/// # Log Level
/// `debug!` - Emitted once per polled batch
pub struct TransactionCommitted {
    pub transaction_id: u64,
    pub resource_count: usize,
}

impl Display for TransactionCommitted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Transaction {} committed {} resource(s)",
            self.transaction_id, self.resource_count
        )
    }
}

impl StructuredLog for TransactionCommitted {
    fn log(&self) {
        tracing::debug!(
            transaction_id = self.transaction_id,
            resource_count = self.resource_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("commit", span_name = name, transaction_id = self.transaction_id)
    }
}

/// Every enlisted resource was asked to roll back.
///
/// # Log Level
/// `warn!` - Work was undone
///
/// # Example
/// ```
/// use the_junction::observability::messages::engine::TransactionRolledBack;
///
/// let cause = std::io::Error::new(std::io::ErrorKind::Other, "sink offline");
/// let msg = TransactionRolledBack {
///     transaction_id: 3,
///     resource_count: 2,
///     cause: &cause,
/// };
///
/// tracing::warn!("{}", msg);
/// ```
pub struct TransactionRolledBack<'a> {
    pub transaction_id: u64,
    pub resource_count: usize,
    pub cause: &'a dyn Error,
}

impl Display for TransactionRolledBack<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Transaction {} rolled back {} resource(s): {}",
            self.transaction_id, self.resource_count, self.cause
        )
    }
}

impl StructuredLog for TransactionRolledBack<'_> {
    fn log(&self) {
        tracing::warn!(
            transaction_id = self.transaction_id,
            resource_count = self.resource_count,
            cause = %self.cause,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("rollback", span_name = name, transaction_id = self.transaction_id)
    }
}

/// A resource failed to commit; the transaction will roll back.
pub struct ResourceCommitFailed<'a> {
    pub transaction_id: u64,
    pub resource: &'a str,
    pub error: &'a dyn Error,
}

impl Display for ResourceCommitFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Transaction {}: resource '{}' failed to commit: {}",
            self.transaction_id, self.resource, self.error
        )
    }
}

impl StructuredLog for ResourceCommitFailed<'_> {
    fn log(&self) {
        tracing::error!(
            transaction_id = self.transaction_id,
            resource = self.resource,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("commit_failed", span_name = name, transaction_id = self.transaction_id, resource = self.resource)
    }
}

/// A resource failed to roll back. Nothing more can be done for it.
pub struct ResourceRollbackFailed<'a> {
    pub transaction_id: u64,
    pub resource: &'a str,
    pub error: &'a dyn Error,
}

impl Display for ResourceRollbackFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Transaction {}: resource '{}' failed to roll back: {}",
            self.transaction_id, self.resource, self.error
        )
    }
}

impl StructuredLog for ResourceRollbackFailed<'_> {
    fn log(&self) {
        tracing::error!(
            transaction_id = self.transaction_id,
            resource = self.resource,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("rollback_failed", span_name = name, transaction_id = self.transaction_id, resource = self.resource)
    }
}
