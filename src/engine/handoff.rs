// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Bounded hand-off between code that pushes items and the worker that polls them.
//!
//! `enqueue` does not return when the item is queued: it returns once the
//! traversal that consumed the item has finished. In transacted mode that is
//! when the traversal's transaction commits (`Ok`) or rolls back (`Err`).

use std::collections::VecDeque;
use std::error::Error;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{oneshot, Notify};

use crate::errors::ProcessingError;
use crate::message::Item;
use crate::traits::TransactionalResource;

/// Why an enqueued item was not accepted downstream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandoffError {
    #[error("traversal rolled back: {cause}")]
    RolledBack { cause: String },

    #[error("hand-off queue is closed")]
    Closed,

    #[error("item was dropped before its traversal finished")]
    Abandoned,
}

pub(crate) type Ack = oneshot::Sender<Result<(), HandoffError>>;

struct Pending {
    item: Item,
    ack: Ack,
}

#[derive(Default)]
struct Slots {
    items: VecDeque<Pending>,
    // set by pushers: queued items still drain
    closed: bool,
    // set while no worker will poll: nothing is accepted or kept
    suspended: bool,
}

enum Push {
    Queued,
    Full(Pending),
    Refused,
}

struct Shared {
    capacity: usize,
    slots: Mutex<Slots>,
    not_empty: Notify,
    not_full: Notify,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn try_push(&self, pending: Pending) -> Push {
        let mut slots = self.lock();
        if slots.closed || slots.suspended {
            return Push::Refused;
        }
        if slots.items.len() >= self.capacity {
            return Push::Full(pending);
        }
        slots.items.push_back(pending);
        Push::Queued
    }

    fn wake_all(&self) {
        self.not_full.notify_waiters();
        self.not_empty.notify_waiters();
    }
}

/// Bounded, cloneable queue; every clone refers to the same items.
#[derive(Clone)]
pub struct HandoffQueue {
    shared: Arc<Shared>,
}

impl HandoffQueue {
    /// A queue holding at most `capacity` items (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                capacity: capacity.max(1),
                slots: Mutex::new(Slots::default()),
                not_empty: Notify::new(),
                not_full: Notify::new(),
            }),
        }
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    pub fn len(&self) -> usize {
        self.shared.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.lock().items.is_empty()
    }

    /// Refuse further items. Queued items are still delivered.
    pub fn close(&self) {
        self.shared.lock().closed = true;
        self.shared.wake_all();
    }

    pub fn is_closed(&self) -> bool {
        self.shared.lock().closed
    }

    /// Refuse every item until [`resume`](Self::resume), failing those still queued.
    pub(crate) fn suspend(&self) {
        let abandoned: Vec<Pending> = {
            let mut slots = self.shared.lock();
            slots.suspended = true;
            slots.items.drain(..).collect()
        };
        for pending in abandoned {
            // enqueuer may have given up waiting
            let _ = pending.ack.send(Err(HandoffError::Closed));
        }
        self.shared.wake_all();
    }

    pub(crate) fn resume(&self) {
        self.shared.lock().suspended = false;
    }

    /// Queue `item`, waiting while the queue is full, then wait for its traversal.
    pub async fn enqueue(&self, item: Item) -> Result<(), HandoffError> {
        let (ack, done) = oneshot::channel();
        let mut entry = Some(Pending { item, ack });

        while let Some(pending) = entry.take() {
            let not_full = self.shared.not_full.notified();
            tokio::pin!(not_full);
            not_full.as_mut().enable();

            match self.shared.try_push(pending) {
                Push::Queued => self.shared.not_empty.notify_one(),
                Push::Refused => return Err(HandoffError::Closed),
                Push::Full(pending) => {
                    entry = Some(pending);
                    not_full.await;
                }
            }
        }

        done.await.unwrap_or(Err(HandoffError::Abandoned))
    }

    /// Take up to `max` items, waiting up to `timeout` for the first one.
    pub(crate) async fn dequeue(&self, max: usize, timeout: Duration) -> Vec<(Item, Ack)> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let not_empty = self.shared.not_empty.notified();
            tokio::pin!(not_empty);
            not_empty.as_mut().enable();

            let (batch, closed) = {
                let mut slots = self.shared.lock();
                let take = max.max(1).min(slots.items.len());
                let batch: Vec<(Item, Ack)> = slots.items.drain(..take).map(|p| (p.item, p.ack)).collect();
                (batch, slots.closed || slots.suspended)
            };
            if !batch.is_empty() {
                self.shared.not_full.notify_waiters();
                return batch;
            }
            if closed {
                return batch;
            }
            if tokio::time::timeout_at(deadline, not_empty).await.is_err() {
                return Vec::new();
            }
        }
    }
}

/// Holds the acknowledgements of the items in the current traversal.
///
/// Commit acknowledges every held item; rollback fails them with the cause.
pub struct QueueResource {
    name: String,
    held: Mutex<Vec<Ack>>,
}

impl QueueResource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            held: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn hold(&self, acks: impl IntoIterator<Item = Ack>) {
        self.lock().extend(acks);
    }

    pub fn held_count(&self) -> usize {
        self.lock().len()
    }

    fn take_held(&self) -> Vec<Ack> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Ack>> {
        self.held.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TransactionalResource for QueueResource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn commit(&self) -> Result<(), ProcessingError> {
        for ack in self.take_held() {
            // enqueuer may have given up waiting
            let _ = ack.send(Ok(()));
        }
        Ok(())
    }

    async fn rollback(&self, cause: &(dyn Error + Send + Sync)) -> Result<(), ProcessingError> {
        let cause = cause.to_string();
        for ack in self.take_held() {
            let _ = ack.send(Err(HandoffError::RolledBack {
                cause: cause.clone(),
            }));
        }
        Ok(())
    }
}
