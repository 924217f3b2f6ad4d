// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Lifecycle supervisor: validates, starts nodes, runs one worker per producer.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::engine::{
    ComponentRegistry, LifecycleState, RestartPolicy, Router, TransactionCoordinator, Worker,
    WorkerExit,
};
use crate::errors::{AdaptorError, ValidationError, WorkerError};
use crate::observability::messages::lifecycle::{AdaptorStarting, AdaptorStopped, FailFastShutdown};
use crate::observability::messages::validation::ValidationIssue;
use crate::observability::messages::StructuredLog;
use crate::routing::Topology;

/// How the adaptor runs its workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Cancel every other worker as soon as one exits with a non-zero code.
    pub fail_fast: bool,
    pub restart: RestartPolicy,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            fail_fast: true,
            restart: RestartPolicy::never(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkerFailure {
    pub producer_id: String,
    pub exit_code: i32,
    pub error: WorkerError,
}

/// Outcome of a complete run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdaptorReport {
    /// Sum of every worker's exit code.
    pub exit_code: i32,
    pub failures: Vec<WorkerFailure>,
}

impl AdaptorReport {
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    fn record(&mut self, exit: WorkerExit) {
        self.exit_code += exit.exit_code;
        if exit.exit_code != 0 {
            let error = exit.error.unwrap_or_else(|| WorkerError::Panicked {
                producer_id: exit.producer_id.clone(),
            });
            self.failures.push(WorkerFailure {
                producer_id: exit.producer_id,
                exit_code: exit.exit_code,
                error,
            });
        }
    }
}

// Sends the worker's exit code when dropped, so a panicking worker still reports.
struct ExitNotice {
    producer_id: String,
    exit_code: i32,
    tx: mpsc::UnboundedSender<(String, i32)>,
}

impl Drop for ExitNotice {
    fn drop(&mut self) {
        let _ = self
            .tx
            .send((std::mem::take(&mut self.producer_id), self.exit_code));
    }
}

/// Runs a topology: every node started, one worker per producer.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use serde_json::json;
/// use the_junction::backends::local::producers::StaticItemsProducer;
/// use the_junction::backends::local::sinks::MemorySink;
/// use the_junction::engine::{Adaptor, ComponentRegistry, Node, NodeMap, ProducerHandle, RunOptions};
/// use the_junction::routing::{KindHierarchy, Topology};
///
/// # #[tokio::main]
/// # async fn main() {
/// let sink = Arc::new(MemorySink::new());
/// let topology = Topology::builder(KindHierarchy::new())
///     .producer("reader")
///     .node("sink")
///     .output("reader", ["sink"])
///     .build()
///     .unwrap();
/// let registry = ComponentRegistry::new(
///     NodeMap::from(vec![Node::sink("sink", sink.clone())]),
///     vec![ProducerHandle::new(
///         "reader",
///         Arc::new(StaticItemsProducer::new(vec![json!("a")], 1)),
///         std::time::Duration::from_millis(10),
///     )],
/// );
///
/// let adaptor = Adaptor::new(registry, Arc::new(topology), RunOptions::default());
/// let report = adaptor.run().await.unwrap();
///
/// assert!(report.is_success());
/// assert_eq!(sink.delivered(), vec![json!("a")]);
/// # }
/// ```
#[derive(Debug)]
pub struct Adaptor {
    registry: ComponentRegistry,
    router: Arc<Router>,
    options: RunOptions,
    state: LifecycleState,
    shutdown: CancellationToken,
}

impl Adaptor {
    pub fn new(registry: ComponentRegistry, topology: Arc<Topology>, options: RunOptions) -> Self {
        let router = Arc::new(Router::new(
            topology,
            Arc::clone(&registry.nodes),
            Arc::new(TransactionCoordinator::new()),
        ));
        Self {
            registry,
            router,
            options,
            state: LifecycleState::new(),
            shutdown: CancellationToken::new(),
        }
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Token that stops the adaptor when cancelled.
    pub fn shutdown_handle(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Ask every worker to stop. In-flight traversals finish first.
    pub fn stop(&self) {
        self.shutdown.cancel();
    }

    /// Everything that would keep the adaptor from running.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.registry.producers.is_empty() {
            errors.push(ValidationError::NoProducers);
        }
        for producer in &self.registry.producers {
            errors.extend(producer.check_config().into_iter().map(|message| {
                ValidationError::CollaboratorConfig {
                    component_id: producer.id().to_string(),
                    message,
                }
            }));
        }
        let mut nodes: Vec<_> = self.registry.nodes.values().collect();
        nodes.sort_by(|a, b| a.id().cmp(b.id()));
        for node in nodes {
            errors.extend(node.check_config().into_iter().map(|message| {
                ValidationError::CollaboratorConfig {
                    component_id: node.id().to_string(),
                    message,
                }
            }));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Run until every worker has stopped.
    pub async fn run(&self) -> Result<AdaptorReport, AdaptorError> {
        if !self.state.try_start() {
            return Err(AdaptorError::AlreadyRunning);
        }
        let result = self.run_started().await;
        self.state.begin_stop();
        self.state.finish_stop();
        result
    }

    async fn run_started(&self) -> Result<AdaptorReport, AdaptorError> {
        if let Err(errors) = self.validate() {
            for error in &errors {
                ValidationIssue { error }.log();
            }
            return Err(AdaptorError::Validation(errors));
        }

        let start_time = Instant::now();
        AdaptorStarting {
            producer_count: self.registry.producers.len(),
            node_count: self.registry.nodes.len(),
            fail_fast: self.options.fail_fast,
        }
        .log();

        self.start_nodes().await?;
        let report = self.run_workers().await;
        for producer in &self.registry.producers {
            producer.shutdown().await;
        }
        self.stop_nodes().await;

        AdaptorStopped {
            exit_code: report.exit_code,
            failure_count: report.failures.len(),
            duration: start_time.elapsed(),
        }
        .log();
        Ok(report)
    }

    /// Starts nodes in registration order.
    async fn start_nodes(&self) -> Result<(), AdaptorError> {
        for node in self.registry.nodes.values() {
            if let Err(source) = node.start().await {
                self.stop_nodes().await;
                return Err(AdaptorError::NodeStartFailed {
                    node_id: node.id().to_string(),
                    source,
                });
            }
        }
        Ok(())
    }

    /// Stops nodes in reverse registration order.
    async fn stop_nodes(&self) {
        for node in self.registry.nodes.values().rev() {
            node.stop().await;
        }
    }

    async fn run_workers(&self) -> AdaptorReport {
        let cancel = self.shutdown.child_token();
        let (exit_tx, mut exit_rx) = mpsc::unbounded_channel();

        let mut handles = Vec::with_capacity(self.registry.producers.len());
        for producer in &self.registry.producers {
            let worker = Worker::new(
                Arc::clone(producer),
                Arc::clone(&self.router),
                cancel.clone(),
                self.options.restart,
            );
            let notice = ExitNotice {
                producer_id: producer.id().to_string(),
                exit_code: 1,
                tx: exit_tx.clone(),
            };
            let handle = tokio::spawn(async move {
                // owned by the task so it drops when the task ends, even by panic
                let mut notice = notice;
                let exit = worker.run().await;
                notice.exit_code = exit.exit_code;
                exit
            });
            handles.push((producer.id().to_string(), handle));
        }
        drop(exit_tx);

        let mut remaining = handles.len();
        while let Some((producer_id, exit_code)) = exit_rx.recv().await {
            remaining = remaining.saturating_sub(1);
            if exit_code != 0 && self.options.fail_fast && !cancel.is_cancelled() {
                FailFastShutdown {
                    producer_id: &producer_id,
                    exit_code,
                    remaining_workers: remaining,
                }
                .log();
                cancel.cancel();
            }
        }

        let mut report = AdaptorReport::default();
        for (producer_id, handle) in handles {
            match handle.await {
                Ok(exit) => report.record(exit),
                Err(_) => report.record(WorkerExit {
                    producer_id: producer_id.clone(),
                    exit_code: 1,
                    error: Some(WorkerError::Panicked { producer_id }),
                }),
            }
        }
        report
    }
}
