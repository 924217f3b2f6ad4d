// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::{ComponentState, LifecycleState, TransactionCoordinator};
use crate::errors::{ProcessingError, RoutingFailure, StepFailure};
use crate::message::{ErrorBatch, Item, Message, Response};
use crate::observability::messages::node::{
    EnrichmentRead, EnrichmentWithoutParameters, ItemDiscarded, ItemFailed, NodeApplied,
    NodeDisconnectFailed, NodeStarted, NodeStopped,
};
use crate::observability::messages::StructuredLog;
use crate::traits::{
    Enricher, EnrichmentReader, MetadataAware, Sink, Step, StepResult, Transactional,
    TransactionalResource,
};

/// An enricher and the reader it consults for every item.
#[derive(Clone)]
pub struct Enrichment {
    pub enricher: Arc<dyn Enricher>,
    pub reader: Arc<dyn EnrichmentReader>,
    pub read_timeout: Duration,
}

/// What a node does with the messages it receives.
#[derive(Clone)]
pub enum NodeRole {
    /// Transforms each item into zero or more items.
    Step(Arc<dyn Step>),
    /// Delivers the whole message, optionally replying.
    Sink(Arc<dyn Sink>),
    /// Reads data for each item and merges it in.
    Enrich(Enrichment),
}

impl NodeRole {
    pub fn kind(&self) -> &'static str {
        match self {
            NodeRole::Step(_) => "step",
            NodeRole::Sink(_) => "sink",
            NodeRole::Enrich(_) => "enrich",
        }
    }

    pub fn implementation(&self) -> &'static str {
        match self {
            NodeRole::Step(step) => step.name(),
            NodeRole::Sink(sink) => sink.name(),
            NodeRole::Enrich(enrichment) => enrichment.enricher.name(),
        }
    }
}

/// A named collaborator wired into the topology, plus its optional capabilities.
pub struct Node {
    id: String,
    role: NodeRole,
    transactional: Option<Arc<dyn Transactional>>,
    metadata_aware: Option<Arc<dyn MetadataAware>>,
    accepts_batches: bool,
    best_effort: bool,
    state: LifecycleState,
}

impl Node {
    pub fn new(id: impl Into<String>, role: NodeRole) -> Self {
        Self {
            id: id.into(),
            role,
            transactional: None,
            metadata_aware: None,
            accepts_batches: true,
            best_effort: false,
            state: LifecycleState::new(),
        }
    }

    pub fn step(id: impl Into<String>, step: Arc<dyn Step>) -> Self {
        Self::new(id, NodeRole::Step(step))
    }

    pub fn sink(id: impl Into<String>, sink: Arc<dyn Sink>) -> Self {
        Self::new(id, NodeRole::Sink(sink))
    }

    /// A node whose `reader` is connected and disconnected with it.
    pub fn enrich(
        id: impl Into<String>,
        enricher: Arc<dyn Enricher>,
        reader: Arc<dyn EnrichmentReader>,
        read_timeout: Duration,
    ) -> Self {
        Self::new(
            id,
            NodeRole::Enrich(Enrichment {
                enricher,
                reader,
                read_timeout,
            }),
        )
    }

    pub fn with_transactional(mut self, transactional: Arc<dyn Transactional>) -> Self {
        self.transactional = Some(transactional);
        self
    }

    pub fn with_metadata_aware(mut self, metadata_aware: Arc<dyn MetadataAware>) -> Self {
        self.metadata_aware = Some(metadata_aware);
        self
    }

    /// When false the router feeds this node one item at a time.
    pub fn accepting_batches(mut self, accepts_batches: bool) -> Self {
        self.accepts_batches = accepts_batches;
        self
    }

    /// When true, unrouted errors from this node are recorded instead of fatal.
    pub fn best_effort(mut self, best_effort: bool) -> Self {
        self.best_effort = best_effort;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> &NodeRole {
        &self.role
    }

    pub fn accepts_batches(&self) -> bool {
        self.accepts_batches
    }

    pub fn is_best_effort(&self) -> bool {
        self.best_effort
    }

    pub fn state(&self) -> ComponentState {
        self.state.current()
    }

    pub fn check_config(&self) -> Vec<String> {
        match &self.role {
            NodeRole::Step(step) => step.check_config(),
            NodeRole::Sink(sink) => sink.check_config(),
            NodeRole::Enrich(enrichment) => {
                let mut problems = enrichment.enricher.check_config();
                problems.extend(enrichment.reader.check_config());
                problems
            }
        }
    }

    /// Connect the collaborator. A no-op when already started.
    pub async fn start(&self) -> Result<(), ProcessingError> {
        if !self.state.try_start() {
            return Ok(());
        }
        let connected = match &self.role {
            NodeRole::Step(_) => Ok(()),
            NodeRole::Sink(sink) => sink.connect().await,
            NodeRole::Enrich(enrichment) => enrichment.reader.connect().await,
        };
        if let Err(e) = connected {
            self.state.abort_start();
            return Err(e);
        }
        NodeStarted {
            node_id: &self.id,
            role: self.role.kind(),
            implementation: self.role.implementation(),
        }
        .log();
        Ok(())
    }

    /// Disconnect the collaborator. Disconnect errors are logged, not returned.
    pub async fn stop(&self) {
        if !self.state.begin_stop() {
            return;
        }
        let disconnected = match &self.role {
            NodeRole::Step(_) => Ok(()),
            NodeRole::Sink(sink) => sink.disconnect().await,
            NodeRole::Enrich(enrichment) => enrichment.reader.disconnect().await,
        };
        if let Err(e) = disconnected {
            NodeDisconnectFailed {
                node_id: &self.id,
                error: &e,
            }
            .log();
        }
        self.state.finish_stop();
        NodeStopped { node_id: &self.id }.log();
    }

    /// Apply this node to `msg` and classify the result.
    ///
    /// Item-level failures land in the response; only fatal conditions and
    /// transaction errors are returned as `Err`.
    pub async fn apply(
        &self,
        msg: &Message,
        coordinator: &TransactionCoordinator,
    ) -> Result<Response, RoutingFailure> {
        if let Some(metadata_aware) = &self.metadata_aware {
            metadata_aware.set_metadata(Arc::clone(msg.metadata()));
        }

        let enlisted = self.enlist(msg, coordinator).await?;

        let response = match &self.role {
            NodeRole::Step(step) => self.apply_step(step.as_ref(), msg).await?,
            NodeRole::Sink(sink) => self.apply_sink(sink.as_ref(), msg).await?,
            NodeRole::Enrich(enrichment) => self.apply_enrich(enrichment, msg).await?,
        };

        if let (Some(resource), Some(transaction)) = (enlisted, msg.transaction()) {
            coordinator.delist_for_commit(transaction, &resource)?;
        }

        NodeApplied {
            node_id: &self.id,
            input_count: msg.len(),
            output_count: response.output().len(),
            discard_count: response.discards().iter().map(|d| d.items.len()).sum(),
            error_count: response.errors().iter().map(ErrorBatch::len).sum(),
        }
        .log();

        Ok(response)
    }

    async fn enlist(
        &self,
        msg: &Message,
        coordinator: &TransactionCoordinator,
    ) -> Result<Option<Arc<dyn TransactionalResource>>, RoutingFailure> {
        let Some(resource) = self.transactional.as_ref().and_then(|t| t.resource()) else {
            return Ok(None);
        };
        let Some(transaction) = msg.transaction() else {
            return Ok(None);
        };
        coordinator
            .enlist(transaction, Arc::clone(&resource))
            .await?;
        Ok(Some(resource))
    }

    async fn apply_step(&self, step: &dyn Step, msg: &Message) -> Result<Response, RoutingFailure> {
        step.reset(msg.sender_context());

        let mut response = Response::new();
        for item in msg.data() {
            let result = step.apply(item.clone()).await;
            self.classify(&mut response, msg, item, result)?;
        }
        Ok(response)
    }

    async fn apply_enrich(&self, enrichment: &Enrichment, msg: &Message) -> Result<Response, RoutingFailure> {
        let mut response = Response::new();
        for item in msg.data() {
            let result = self.enrich_item(enrichment, item.clone()).await;
            self.classify(&mut response, msg, item, result)?;
        }
        Ok(response)
    }

    async fn enrich_item(&self, enrichment: &Enrichment, item: Item) -> StepResult {
        let parameters = enrichment.enricher.prepare_parameters(&item);
        if parameters.is_none() {
            EnrichmentWithoutParameters { node_id: &self.id }.log();
        }

        let reader = enrichment.reader.as_ref();
        let read = tokio::time::timeout(
            enrichment.read_timeout,
            reader.read(parameters.as_ref(), enrichment.read_timeout),
        )
        .await;
        let data = match read {
            Ok(data) => data?,
            Err(_) => {
                return Err(ProcessingError::processing(format!(
                    "{} read timed out after {:?}",
                    reader.name(),
                    enrichment.read_timeout
                ))
                .into());
            }
        };
        EnrichmentRead {
            node_id: &self.id,
            reader: reader.name(),
            record_count: data.len(),
        }
        .log();

        enrichment.enricher.enrich(item, data).await
    }

    /// File one item's result under output, discard or error.
    fn classify(
        &self,
        response: &mut Response,
        msg: &Message,
        item: &Item,
        result: StepResult,
    ) -> Result<(), RoutingFailure> {
        match result {
            Ok(outputs) => response.add_output(outputs),
            Err(StepFailure::Discard { reason }) => {
                ItemDiscarded {
                    node_id: &self.id,
                    reason: &reason,
                }
                .log();
                response.add_discard(vec![item.clone()], reason);
            }
            Err(StepFailure::Error(cause)) if cause.is_fatal() => {
                return Err(RoutingFailure::Fatal {
                    node_id: self.id.clone(),
                    source: cause,
                });
            }
            Err(StepFailure::Error(cause)) => {
                ItemFailed {
                    node_id: &self.id,
                    kind: cause.kind.as_str(),
                    error: &cause,
                }
                .log();
                response.add_error(ErrorBatch::new(
                    vec![item.clone()],
                    cause,
                    self.id.as_str(),
                    msg.worker(),
                ));
            }
        }
        Ok(())
    }

    async fn apply_sink(&self, sink: &dyn Sink, msg: &Message) -> Result<Response, RoutingFailure> {
        let mut response = Response::new();
        match sink.deliver(msg.data().to_vec()).await {
            Ok(Some(reply)) => response.add_output([reply]),
            Ok(None) => {}
            Err(cause) if cause.is_fatal() => {
                return Err(RoutingFailure::Fatal {
                    node_id: self.id.clone(),
                    source: cause,
                });
            }
            Err(cause) => {
                ItemFailed {
                    node_id: &self.id,
                    kind: cause.kind.as_str(),
                    error: &cause,
                }
                .log();
                response.add_error(ErrorBatch::new(
                    msg.data().to_vec(),
                    cause,
                    self.id.as_str(),
                    msg.worker(),
                ));
            }
        }
        Ok(response)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("role", &self.role.kind())
            .field("implementation", &self.role.implementation())
            .field("transactional", &self.transactional.is_some())
            .field("metadata_aware", &self.metadata_aware.is_some())
            .field("accepts_batches", &self.accepts_batches)
            .field("best_effort", &self.best_effort)
            .field("state", &self.state.current())
            .finish()
    }
}
