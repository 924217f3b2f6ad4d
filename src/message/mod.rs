// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The unit of work moved through a topology.

mod message_error;
mod response;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use crate::engine::Transaction;
use crate::traits::TransactionalResource;

pub use message_error::MessageError;
pub use response::{DiscardBatch, ErrorBatch, Response};

/// A single payload item.
pub type Item = Value;

/// Side-channel values that travel with a message.
pub type Metadata = HashMap<String, Value>;

/// One metadata map per top-level message, shared by everything derived from it.
pub type SharedMetadata = Arc<RwLock<Metadata>>;

/// An ordered batch of items plus the context needed to route it.
///
/// Messages are immutable once built. Routing creates derived messages with
/// [`derive`](Message::derive); those keep the transaction, metadata, sender
/// context and worker name of their parent and replace only sender and data.
///
/// # Example
/// ```
/// use serde_json::json;
/// use the_junction::message::Message;
///
/// let msg = Message::new("reader", vec![json!("a"), json!("b")]).with_worker("worker-reader");
/// let next = msg.derive("upper", vec![json!("A")]);
///
/// assert_eq!(next.sender(), "upper");
/// assert_eq!(next.worker(), "worker-reader");
/// assert_eq!(next.len(), 1);
/// ```
#[derive(Clone)]
pub struct Message {
    sender: String,
    data: Vec<Item>,
    sender_context: Option<Value>,
    worker: String,
    transaction: Option<Arc<Transaction>>,
    origin_resource: Option<Arc<dyn TransactionalResource>>,
    metadata: SharedMetadata,
}

impl Message {
    pub fn new(sender: impl Into<String>, data: Vec<Item>) -> Self {
        Self {
            sender: sender.into(),
            data,
            sender_context: None,
            worker: String::new(),
            transaction: None,
            origin_resource: None,
            metadata: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn with_context(mut self, context: Option<Value>) -> Self {
        self.sender_context = context;
        self
    }

    pub fn with_worker(mut self, worker: impl Into<String>) -> Self {
        self.worker = worker.into();
        self
    }

    /// Resource of the producer that yielded this batch, enlisted by the router.
    pub fn with_origin_resource(mut self, resource: Arc<dyn TransactionalResource>) -> Self {
        self.origin_resource = Some(resource);
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Arc::new(RwLock::new(metadata));
        self
    }

    pub(crate) fn with_transaction(mut self, transaction: Arc<Transaction>) -> Self {
        self.transaction = Some(transaction);
        self
    }

    /// A message from `sender` carrying `data` in the same unit of work.
    pub fn derive(&self, sender: impl Into<String>, data: Vec<Item>) -> Self {
        Self {
            sender: sender.into(),
            data,
            sender_context: self.sender_context.clone(),
            worker: self.worker.clone(),
            transaction: self.transaction.clone(),
            origin_resource: None,
            metadata: Arc::clone(&self.metadata),
        }
    }

    /// Same sender, one item. Used to feed nodes that don't accept batches.
    pub fn single(&self, item: Item) -> Self {
        self.derive(self.sender.clone(), vec![item])
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn data(&self) -> &[Item] {
        &self.data
    }

    pub fn sender_context(&self) -> Option<&Value> {
        self.sender_context.as_ref()
    }

    pub fn worker(&self) -> &str {
        &self.worker
    }

    pub fn transaction(&self) -> Option<&Arc<Transaction>> {
        self.transaction.as_ref()
    }

    pub fn origin_resource(&self) -> Option<&Arc<dyn TransactionalResource>> {
        self.origin_resource.as_ref()
    }

    pub fn metadata(&self) -> &SharedMetadata {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("sender", &self.sender)
            .field("data", &self.data)
            .field("sender_context", &self.sender_context)
            .field("worker", &self.worker)
            .field("transaction", &self.transaction.as_ref().map(|t| t.id()))
            .field(
                "origin_resource",
                &self.origin_resource.as_ref().map(|r| r.name().to_string()),
            )
            .finish()
    }
}
