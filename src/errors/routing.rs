// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use super::{ProcessingError, TransactionError};
use crate::routing::ErrorKind;

/// Failures that abort the traversal of a top-level message.
///
/// Any of these rolls back the message's transaction and stops the worker that
/// produced the message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RoutingFailure {
    /// An error batch had no matching error route and no default route applied.
    #[error("unrouted {kind} error raised by node '{node_id}': {message}")]
    Unrouted {
        node_id: String,
        kind: ErrorKind,
        message: String,
    },

    /// A collaborator raised a fatal error condition.
    #[error("fatal error in node '{node_id}': {source}")]
    Fatal {
        node_id: String,
        #[source]
        source: ProcessingError,
    },

    /// A route names a destination with no registered node.
    #[error("destination '{node_id}' routed from '{from}' is not a registered node")]
    UnknownDestination { node_id: String, from: String },

    #[error(transparent)]
    Transaction(#[from] TransactionError),
}
