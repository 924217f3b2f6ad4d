// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::engine::{HandoffQueue, QueueResource};
use crate::errors::ProcessingError;
use crate::message::Item;
use crate::traits::{Producer, Transactional, TransactionalResource};

/// Produces the items pushed into its [`HandoffQueue`].
///
/// Transacted, each pusher is released when the traversal carrying its item
/// commits or rolls back. Otherwise pushers are released as soon as their
/// items are taken off the queue. The producer is exhausted once the queue
/// has been closed through a handle and drained.
///
/// Once the adaptor shuts the producer down, queued and later pushes fail with
/// [`HandoffError::Closed`](crate::engine::HandoffError::Closed) until it connects again.
/// Restarts keep the queue as it is.
pub struct QueueProducer {
    queue: HandoffQueue,
    resource: Arc<QueueResource>,
    batch_size: usize,
    transacted: bool,
}

impl QueueProducer {
    pub fn new(name: impl Into<String>, capacity: usize, batch_size: usize, transacted: bool) -> Self {
        Self {
            queue: HandoffQueue::new(capacity),
            resource: Arc::new(QueueResource::new(name)),
            batch_size: batch_size.max(1),
            transacted,
        }
    }

    /// A handle for pushing items; clones share the same queue.
    pub fn handle(&self) -> HandoffQueue {
        self.queue.clone()
    }

    pub fn is_transacted(&self) -> bool {
        self.transacted
    }
}

#[async_trait]
impl Producer for QueueProducer {
    async fn connect(&self) -> Result<(), ProcessingError> {
        self.queue.resume();
        Ok(())
    }

    async fn shutdown(&self) {
        self.queue.suspend();
    }

    fn is_exhausted(&self) -> bool {
        self.queue.is_closed() && self.queue.is_empty()
    }

    async fn poll(&self, timeout: Duration) -> Result<Option<Vec<Item>>, ProcessingError> {
        let batch = self.queue.dequeue(self.batch_size, timeout).await;
        if batch.is_empty() {
            return Ok(None);
        }

        let (items, acks): (Vec<_>, Vec<_>) = batch.into_iter().unzip();
        if self.transacted {
            self.resource.hold(acks);
        } else {
            for ack in acks {
                let _ = ack.send(Ok(()));
            }
        }
        Ok(Some(items))
    }

    fn name(&self) -> &'static str {
        "queue"
    }
}

impl Transactional for QueueProducer {
    fn resource(&self) -> Option<Arc<dyn TransactionalResource>> {
        if self.transacted {
            Some(Arc::clone(&self.resource) as Arc<dyn TransactionalResource>)
        } else {
            None
        }
    }
}
