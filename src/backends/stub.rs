// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::errors::{ProcessingError, StepFailure};
use crate::message::Item;
use crate::traits::{
    EnrichmentReader, Producer, Sink, Step, StepResult, Transactional, TransactionalResource,
};

/// Shared, ordered record of resource calls across several resources.
pub type Journal = Arc<Mutex<Vec<String>>>;

/// A resource that journals `begin:<name>`, `commit:<name>` and
/// `rollback:<name>`, optionally failing one of them.
pub struct RecordingResource {
    name: String,
    journal: Journal,
    fail_begin: bool,
    fail_commit: bool,
    fail_rollback: bool,
    last_cause: Mutex<Option<String>>,
}

impl RecordingResource {
    pub fn journal() -> Journal {
        Arc::new(Mutex::new(Vec::new()))
    }

    pub fn entries(journal: &Journal) -> Vec<String> {
        journal.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn new(name: &str, journal: Journal) -> Self {
        Self {
            name: name.to_string(),
            journal,
            fail_begin: false,
            fail_commit: false,
            fail_rollback: false,
            last_cause: Mutex::new(None),
        }
    }

    pub fn failing_begin(mut self) -> Self {
        self.fail_begin = true;
        self
    }

    pub fn failing_commit(mut self) -> Self {
        self.fail_commit = true;
        self
    }

    pub fn failing_rollback(mut self) -> Self {
        self.fail_rollback = true;
        self
    }

    /// The cause passed to the most recent rollback.
    pub fn last_cause(&self) -> Option<String> {
        self.last_cause.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn record(&self, call: &str, fail: bool) -> Result<(), ProcessingError> {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(format!("{call}:{}", self.name));
        if fail {
            Err(ProcessingError::processing(format!("{call} refused by {}", self.name)))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl TransactionalResource for RecordingResource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn begin(&self) -> Result<(), ProcessingError> {
        self.record("begin", self.fail_begin)
    }

    async fn commit(&self) -> Result<(), ProcessingError> {
        self.record("commit", self.fail_commit)
    }

    async fn rollback(&self, cause: &(dyn Error + Send + Sync)) -> Result<(), ProcessingError> {
        *self.last_cause.lock().unwrap_or_else(PoisonError::into_inner) = Some(cause.to_string());
        self.record("rollback", self.fail_rollback)
    }
}

/// Always exposes the same resource.
pub struct StaticTransactional {
    resource: Arc<dyn TransactionalResource>,
}

impl StaticTransactional {
    pub fn new(resource: Arc<dyn TransactionalResource>) -> Self {
        Self { resource }
    }
}

impl Transactional for StaticTransactional {
    fn resource(&self) -> Option<Arc<dyn TransactionalResource>> {
        Some(Arc::clone(&self.resource))
    }
}

/// Passes items through, except chosen items which are discarded or failed.
pub struct FailingStep {
    items: Vec<Value>,
    failure: StepFailure,
}

impl FailingStep {
    pub fn on_items(items: Vec<Value>, error: ProcessingError) -> Self {
        Self {
            items,
            failure: StepFailure::Error(error),
        }
    }

    pub fn discarding(items: Vec<Value>, reason: &str) -> Self {
        Self {
            items,
            failure: StepFailure::discard(reason),
        }
    }
}

#[async_trait]
impl Step for FailingStep {
    async fn apply(&self, item: Item) -> StepResult {
        if self.items.contains(&item) {
            Err(self.failure.clone())
        } else {
            Ok(vec![item])
        }
    }

    fn name(&self) -> &'static str {
        "failing_step"
    }
}

/// Reports a fixed configuration problem.
pub struct MisconfiguredStep {
    problem: String,
}

impl MisconfiguredStep {
    pub fn new(problem: &str) -> Self {
        Self {
            problem: problem.to_string(),
        }
    }
}

#[async_trait]
impl Step for MisconfiguredStep {
    async fn apply(&self, item: Item) -> StepResult {
        Ok(vec![item])
    }

    fn check_config(&self) -> Vec<String> {
        vec![self.problem.clone()]
    }

    fn name(&self) -> &'static str {
        "misconfigured"
    }
}

/// Rejects every delivery, and optionally every connect.
pub struct FailingSink {
    error: ProcessingError,
    fail_connect: bool,
}

impl FailingSink {
    pub fn new(error: ProcessingError) -> Self {
        Self {
            error,
            fail_connect: false,
        }
    }

    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }
}

#[async_trait]
impl Sink for FailingSink {
    async fn connect(&self) -> Result<(), ProcessingError> {
        if self.fail_connect {
            Err(self.error.clone())
        } else {
            Ok(())
        }
    }

    async fn deliver(&self, _items: Vec<Item>) -> Result<Option<Item>, ProcessingError> {
        Err(self.error.clone())
    }

    fn name(&self) -> &'static str {
        "failing_sink"
    }
}

/// Plays back a script of poll results, one per poll.
///
/// The context is the script position; restoring it is journaled.
pub struct ScriptedProducer {
    script: Vec<Result<Vec<Value>, ProcessingError>>,
    cursor: AtomicUsize,
    connects: AtomicUsize,
    restored: Mutex<Vec<Value>>,
}

impl ScriptedProducer {
    pub fn new(script: Vec<Result<Vec<Value>, ProcessingError>>) -> Self {
        Self {
            script,
            cursor: AtomicUsize::new(0),
            connects: AtomicUsize::new(0),
            restored: Mutex::new(Vec::new()),
        }
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn restored_contexts(&self) -> Vec<Value> {
        self.restored.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl Producer for ScriptedProducer {
    async fn connect(&self) -> Result<(), ProcessingError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn is_exhausted(&self) -> bool {
        self.cursor.load(Ordering::SeqCst) >= self.script.len()
    }

    async fn poll(&self, _timeout: Duration) -> Result<Option<Vec<Item>>, ProcessingError> {
        let position = self.cursor.fetch_add(1, Ordering::SeqCst);
        match self.script.get(position) {
            Some(Ok(items)) => Ok(Some(items.clone())),
            Some(Err(error)) => Err(error.clone()),
            None => Ok(None),
        }
    }

    fn context(&self) -> Option<Value> {
        Some(json!(self.cursor.load(Ordering::SeqCst)))
    }

    fn set_context(&self, context: Value) {
        if let Some(position) = context.as_u64() {
            self.cursor.store(position as usize, Ordering::SeqCst);
        }
        self.restored
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(context);
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

/// Never produces anything and never runs dry.
#[derive(Default)]
pub struct IdleProducer;

impl IdleProducer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Producer for IdleProducer {
    fn is_exhausted(&self) -> bool {
        false
    }

    async fn poll(&self, timeout: Duration) -> Result<Option<Vec<Item>>, ProcessingError> {
        tokio::time::sleep(timeout).await;
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "idle"
    }
}

/// Panics on its first poll.
#[derive(Default)]
pub struct PanickingProducer;

impl PanickingProducer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Producer for PanickingProducer {
    fn is_exhausted(&self) -> bool {
        false
    }

    async fn poll(&self, _timeout: Duration) -> Result<Option<Vec<Item>>, ProcessingError> {
        panic!("producer blew up mid-poll");
    }

    fn name(&self) -> &'static str {
        "panicking"
    }
}

/// Accepts every delivery and journals `connect:<name>` and `disconnect:<name>`.
pub struct JournalingSink {
    name: String,
    journal: Journal,
}

impl JournalingSink {
    pub fn new(name: &str, journal: Journal) -> Self {
        Self {
            name: name.to_string(),
            journal,
        }
    }

    fn record(&self, call: &str) {
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(format!("{call}:{}", self.name));
    }
}

#[async_trait]
impl Sink for JournalingSink {
    async fn connect(&self) -> Result<(), ProcessingError> {
        self.record("connect");
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), ProcessingError> {
        self.record("disconnect");
        Ok(())
    }

    async fn deliver(&self, _items: Vec<Item>) -> Result<Option<Item>, ProcessingError> {
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "journaling_sink"
    }
}

/// A reader that takes `delay` to answer, then fails or reads nothing.
pub struct StubReader {
    delay: Duration,
    error: Option<ProcessingError>,
}

impl StubReader {
    pub fn slow(delay: Duration) -> Self {
        Self { delay, error: None }
    }

    pub fn failing(error: ProcessingError) -> Self {
        Self {
            delay: Duration::ZERO,
            error: Some(error),
        }
    }
}

#[async_trait]
impl EnrichmentReader for StubReader {
    async fn read(&self, _parameters: Option<&Value>, _timeout: Duration) -> Result<Vec<Item>, ProcessingError> {
        tokio::time::sleep(self.delay).await;
        match &self.error {
            Some(error) => Err(error.clone()),
            None => Ok(Vec::new()),
        }
    }

    fn name(&self) -> &'static str {
        "stub_reader"
    }
}
