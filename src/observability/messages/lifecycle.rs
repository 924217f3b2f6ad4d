// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for adaptor and worker lifecycle events.
//!
//! This module contains message types for logging events related to:
//! * Adaptor start and stop
//! * Worker start, restart, failure and exit
//! * Producer polling problems
//! * Fail-fast shutdown

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

use tracing::Span;

use crate::observability::messages::StructuredLog;

/// Adaptor is starting its nodes and workers.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_junction::observability::messages::lifecycle::AdaptorStarting;
///
/// let msg = AdaptorStarting {
///     producer_count: 2,
///     node_count: 5,
///     fail_fast: true,
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct AdaptorStarting {
    pub producer_count: usize,
    pub node_count: usize,
    pub fail_fast: bool,
}

impl Display for AdaptorStarting {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting adaptor: {} producer(s), {} node(s), fail_fast={}",
            self.producer_count, self.node_count, self.fail_fast
        )
    }
}

impl StructuredLog for AdaptorStarting {
    fn log(&self) {
        tracing::info!(
            producer_count = self.producer_count,
            node_count = self.node_count,
            fail_fast = self.fail_fast,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "adaptor",
            span_name = name,
            producer_count = self.producer_count,
            node_count = self.node_count,
        )
    }
}

/// Adaptor finished: every worker has exited and every node is stopped.
///
/// # Log Level
/// `info!` on success, `error!` when any worker failed
pub struct AdaptorStopped {
    pub exit_code: i32,
    pub failure_count: usize,
    pub duration: Duration,
}

impl Display for AdaptorStopped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Adaptor stopped after {:?}: exit_code={}, failed workers={}",
            self.duration, self.exit_code, self.failure_count
        )
    }
}

impl StructuredLog for AdaptorStopped {
    fn log(&self) {
        if self.exit_code == 0 {
            tracing::info!(
                exit_code = self.exit_code,
                failure_count = self.failure_count,
                duration_ms = self.duration.as_millis() as u64,
                "{}", self
            );
        } else {
            tracing::error!(
                exit_code = self.exit_code,
                failure_count = self.failure_count,
                duration_ms = self.duration.as_millis() as u64,
                "{}", self
            );
        }
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("adaptor_stopped", span_name = name, exit_code = self.exit_code)
    }
}

/// # Log Level
/// `info!` - Lifecycle event
pub struct WorkerStarted<'a> {
    pub producer_id: &'a str,
    pub worker: &'a str,
}

impl Display for WorkerStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Worker '{}' started for producer '{}'", self.worker, self.producer_id)
    }
}

impl StructuredLog for WorkerStarted<'_> {
    fn log(&self) {
        tracing::info!(producer_id = self.producer_id, worker = self.worker, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "worker",
            span_name = name,
            producer_id = self.producer_id,
            worker = self.worker,
        )
    }
}

pub struct WorkerStopped<'a> {
    pub producer_id: &'a str,
    pub exit_code: i32,
}

impl Display for WorkerStopped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker for producer '{}' stopped with exit code {}",
            self.producer_id, self.exit_code
        )
    }
}

impl StructuredLog for WorkerStopped<'_> {
    fn log(&self) {
        tracing::info!(producer_id = self.producer_id, exit_code = self.exit_code, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("worker_stopped", span_name = name, producer_id = self.producer_id)
    }
}

/// A worker stopped because of an error.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct WorkerFailed<'a> {
    pub producer_id: &'a str,
    pub error: &'a dyn Error,
}

impl Display for WorkerFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Worker for producer '{}' failed: {}", self.producer_id, self.error)
    }
}

impl StructuredLog for WorkerFailed<'_> {
    fn log(&self) {
        tracing::error!(producer_id = self.producer_id, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("worker_failed", span_name = name, producer_id = self.producer_id)
    }
}

/// A failed worker will reconnect its producer and carry on.
///
/// # Log Level
/// `warn!` - Recoverable failure
pub struct WorkerRestarting<'a> {
    pub producer_id: &'a str,
    pub attempt: u32,
    pub limit: u32,
    pub delay: Duration,
    pub error: &'a dyn Error,
}

impl Display for WorkerRestarting<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Restarting worker for producer '{}' in {:?} (attempt {}/{}) after: {}",
            self.producer_id, self.delay, self.attempt, self.limit, self.error
        )
    }
}

impl StructuredLog for WorkerRestarting<'_> {
    fn log(&self) {
        tracing::warn!(
            producer_id = self.producer_id,
            attempt = self.attempt,
            limit = self.limit,
            delay_ms = self.delay.as_millis() as u64,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "worker_restart",
            span_name = name,
            producer_id = self.producer_id,
            attempt = self.attempt,
        )
    }
}

/// A non-fatal poll error; the worker keeps polling.
pub struct PollFailed<'a> {
    pub producer_id: &'a str,
    pub error: &'a dyn Error,
}

impl Display for PollFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Producer '{}' poll failed: {}", self.producer_id, self.error)
    }
}

impl StructuredLog for PollFailed<'_> {
    fn log(&self) {
        tracing::warn!(producer_id = self.producer_id, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("poll_failed", span_name = name, producer_id = self.producer_id)
    }
}

pub struct ProducerDisconnectFailed<'a> {
    pub producer_id: &'a str,
    pub error: &'a dyn Error,
}

impl Display for ProducerDisconnectFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Producer '{}' failed to disconnect: {}", self.producer_id, self.error)
    }
}

impl StructuredLog for ProducerDisconnectFailed<'_> {
    fn log(&self) {
        tracing::warn!(producer_id = self.producer_id, error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("producer_disconnect_failed", span_name = name, producer_id = self.producer_id)
    }
}

/// One worker failed, so every other worker is being cancelled.
///
/// # Log Level
/// `warn!` - Shutdown in progress
pub struct FailFastShutdown<'a> {
    pub producer_id: &'a str,
    pub exit_code: i32,
    pub remaining_workers: usize,
}

impl Display for FailFastShutdown<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker for producer '{}' exited with code {}; cancelling {} remaining worker(s)",
            self.producer_id, self.exit_code, self.remaining_workers
        )
    }
}

impl StructuredLog for FailFastShutdown<'_> {
    fn log(&self) {
        tracing::warn!(
            producer_id = self.producer_id,
            exit_code = self.exit_code,
            remaining_workers = self.remaining_workers,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!("fail_fast", span_name = name, producer_id = self.producer_id)
    }
}
