// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use super::{ProcessingError, RoutingFailure, ValidationError};

/// Reasons the adaptor refuses to run.
#[derive(Debug, Error)]
pub enum AdaptorError {
    #[error("adaptor is not runnable: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Validation(Vec<ValidationError>),

    #[error("adaptor is already running")]
    AlreadyRunning,

    #[error("failed to start node '{node_id}': {source}")]
    NodeStartFailed {
        node_id: String,
        #[source]
        source: ProcessingError,
    },
}

/// Cause recorded against a worker that stopped with a non-zero exit code.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorkerError {
    #[error("failed to connect producer '{producer_id}': {source}")]
    Connect {
        producer_id: String,
        #[source]
        source: ProcessingError,
    },

    #[error("producer '{producer_id}' failed to poll: {source}")]
    Poll {
        producer_id: String,
        #[source]
        source: ProcessingError,
    },

    #[error(transparent)]
    Routing(#[from] RoutingFailure),

    #[error("producer '{producer_id}' rejected terminal results: {source}")]
    Terminal {
        producer_id: String,
        #[source]
        source: ProcessingError,
    },

    #[error("worker for producer '{producer_id}' panicked")]
    Panicked { producer_id: String },

    #[error("worker for producer '{producer_id}' was cancelled while restarting")]
    Cancelled { producer_id: String },
}
