// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::engine::{LifecycleState, Router};
use crate::errors::{ProcessingError, WorkerError};
use crate::message::Message;
use crate::observability::messages::lifecycle::{
    PollFailed, ProducerDisconnectFailed, WorkerFailed, WorkerRestarting, WorkerStarted,
    WorkerStopped,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{Producer, Transactional, TransactionalResource};

/// A producer wired for the adaptor, with its optional transactional capability.
pub struct ProducerHandle {
    id: String,
    producer: Arc<dyn Producer>,
    transactional: Option<Arc<dyn Transactional>>,
    poll_timeout: Duration,
    state: LifecycleState,
}

impl ProducerHandle {
    pub fn new(id: impl Into<String>, producer: Arc<dyn Producer>, poll_timeout: Duration) -> Self {
        Self {
            id: id.into(),
            producer,
            transactional: None,
            poll_timeout,
            state: LifecycleState::new(),
        }
    }

    pub fn with_transactional(mut self, transactional: Arc<dyn Transactional>) -> Self {
        self.transactional = Some(transactional);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn producer(&self) -> &Arc<dyn Producer> {
        &self.producer
    }

    pub fn poll_timeout(&self) -> Duration {
        self.poll_timeout
    }

    pub fn resource(&self) -> Option<Arc<dyn TransactionalResource>> {
        self.transactional.as_ref().and_then(|t| t.resource())
    }

    pub fn check_config(&self) -> Vec<String> {
        self.producer.check_config()
    }

    /// Tell the producer no worker will poll it again in this run.
    pub async fn shutdown(&self) {
        self.producer.shutdown().await;
    }

    /// Connect the producer. A no-op when already connected.
    pub async fn start(&self) -> Result<(), ProcessingError> {
        if !self.state.try_start() {
            return Ok(());
        }
        if let Err(e) = self.producer.connect().await {
            self.state.abort_start();
            return Err(e);
        }
        Ok(())
    }

    /// Disconnect the producer, logging any error.
    pub async fn stop(&self) {
        if !self.state.begin_stop() {
            return;
        }
        if let Err(e) = self.producer.disconnect().await {
            ProducerDisconnectFailed {
                producer_id: &self.id,
                error: &e,
            }
            .log();
        }
        self.state.finish_stop();
    }
}

impl fmt::Debug for ProducerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProducerHandle")
            .field("id", &self.id)
            .field("producer", &self.producer.name())
            .field("transactional", &self.transactional.is_some())
            .field("poll_timeout", &self.poll_timeout)
            .field("state", &self.state.current())
            .finish()
    }
}

/// How often and how soon a failed worker reconnects its producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RestartPolicy {
    pub limit: u32,
    pub delay: Duration,
}

impl RestartPolicy {
    pub fn never() -> Self {
        Self::default()
    }
}

/// How a worker ended.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerExit {
    pub producer_id: String,
    pub exit_code: i32,
    pub error: Option<WorkerError>,
}

impl WorkerExit {
    fn clean(producer_id: &str) -> Self {
        Self {
            producer_id: producer_id.to_string(),
            exit_code: 0,
            error: None,
        }
    }

    fn failed(producer_id: &str, error: WorkerError) -> Self {
        Self {
            producer_id: producer_id.to_string(),
            exit_code: 1,
            error: Some(error),
        }
    }
}

/// Polls one producer and routes each batch it yields.
pub struct Worker {
    producer: Arc<ProducerHandle>,
    router: Arc<Router>,
    cancel: CancellationToken,
    restart: RestartPolicy,
}

impl Worker {
    pub fn new(
        producer: Arc<ProducerHandle>,
        router: Arc<Router>,
        cancel: CancellationToken,
        restart: RestartPolicy,
    ) -> Self {
        Self {
            producer,
            router,
            cancel,
            restart,
        }
    }

    pub fn name(&self) -> String {
        format!("worker-{}", self.producer.id())
    }

    /// Run until the producer is exhausted, the worker is cancelled or it fails
    /// more often than its restart policy allows.
    pub async fn run(self) -> WorkerExit {
        let name = self.name();
        let started = WorkerStarted {
            producer_id: self.producer.id(),
            worker: &name,
        };
        let span = started.span("run");
        started.log();

        let exit = self.run_with_restarts(&name).instrument(span).await;

        if let Some(error) = &exit.error {
            WorkerFailed {
                producer_id: &exit.producer_id,
                error,
            }
            .log();
        }
        WorkerStopped {
            producer_id: &exit.producer_id,
            exit_code: exit.exit_code,
        }
        .log();
        exit
    }

    async fn run_with_restarts(&self, name: &str) -> WorkerExit {
        let producer_id = self.producer.id();

        if let Err(source) = self.producer.start().await {
            return WorkerExit::failed(
                producer_id,
                WorkerError::Connect {
                    producer_id: producer_id.to_string(),
                    source,
                },
            );
        }

        let mut attempts = 0;
        loop {
            let error = match self.poll_loop(name).await {
                Ok(()) => {
                    self.producer.stop().await;
                    return WorkerExit::clean(producer_id);
                }
                Err(error) => error,
            };

            if attempts >= self.restart.limit || self.cancel.is_cancelled() {
                self.producer.stop().await;
                return WorkerExit::failed(producer_id, error);
            }
            attempts += 1;

            WorkerRestarting {
                producer_id,
                attempt: attempts,
                limit: self.restart.limit,
                delay: self.restart.delay,
                error: &error,
            }
            .log();

            let context = self.producer.producer().context();
            self.producer.stop().await;

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    return WorkerExit::failed(
                        producer_id,
                        WorkerError::Cancelled { producer_id: producer_id.to_string() },
                    );
                }
                _ = tokio::time::sleep(self.restart.delay) => {}
            }

            if let Some(context) = context {
                self.producer.producer().set_context(context);
            }
            if let Err(source) = self.producer.start().await {
                return WorkerExit::failed(
                    producer_id,
                    WorkerError::Connect {
                        producer_id: producer_id.to_string(),
                        source,
                    },
                );
            }
        }
    }

    async fn poll_loop(&self, name: &str) -> Result<(), WorkerError> {
        let handle = &self.producer;
        let producer = handle.producer();

        while !self.cancel.is_cancelled() && !producer.is_exhausted() {
            let polled = tokio::select! {
                _ = self.cancel.cancelled() => break,
                polled = producer.poll(handle.poll_timeout()) => polled,
            };

            let items = match polled {
                Ok(Some(items)) if !items.is_empty() => items,
                Ok(_) => continue,
                Err(source) if source.is_fatal() => {
                    return Err(WorkerError::Poll {
                        producer_id: handle.id().to_string(),
                        source,
                    });
                }
                Err(source) => {
                    PollFailed {
                        producer_id: handle.id(),
                        error: &source,
                    }
                    .log();
                    continue;
                }
            };

            let mut msg = Message::new(handle.id(), items)
                .with_context(producer.context())
                .with_worker(name);
            if let Some(resource) = handle.resource() {
                msg = msg.with_origin_resource(resource);
            }

            // an in-flight traversal is never interrupted by cancellation
            let results = self.router.route(msg).await?;

            producer
                .on_terminal(&results)
                .await
                .map_err(|source| WorkerError::Terminal {
                    producer_id: handle.id().to_string(),
                    source,
                })?;
        }
        Ok(())
    }
}
