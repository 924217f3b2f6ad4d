// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::json;

use crate::errors::ProcessingError;
use crate::message::{Item, Metadata, SharedMetadata};
use crate::traits::{MetadataAware, Sink};

#[derive(Default)]
struct Recorded {
    deliveries: Vec<Vec<Item>>,
    metadata_snapshots: Vec<Metadata>,
}

/// Keeps everything delivered to it, in delivery order.
///
/// Useful for embedding the engine and inspecting what reached the end of
/// a route.
#[derive(Default)]
pub struct MemorySink {
    reply: bool,
    recorded: Mutex<Recorded>,
    metadata: Mutex<Option<SharedMetadata>>,
    connects: AtomicUsize,
    disconnects: AtomicUsize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replies to each delivery with `{"delivered": <item count>}`.
    pub fn with_reply() -> Self {
        Self {
            reply: true,
            ..Self::default()
        }
    }

    /// Every delivered item, flattened.
    pub fn delivered(&self) -> Vec<Item> {
        self.lock().deliveries.iter().flatten().cloned().collect()
    }

    pub fn delivery_sizes(&self) -> Vec<usize> {
        self.lock().deliveries.iter().map(Vec::len).collect()
    }

    /// The message metadata seen at each delivery, when metadata aware.
    pub fn metadata_snapshots(&self) -> Vec<Metadata> {
        self.lock().metadata_snapshots.clone()
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn disconnect_count(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current_metadata(&self) -> Option<SharedMetadata> {
        self.metadata
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Sink for MemorySink {
    async fn connect(&self) -> Result<(), ProcessingError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), ProcessingError> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn deliver(&self, items: Vec<Item>) -> Result<Option<Item>, ProcessingError> {
        let snapshot = match self.current_metadata() {
            Some(shared) => Some(shared.read().await.clone()),
            None => None,
        };

        let count = items.len();
        {
            let mut recorded = self.lock();
            recorded.deliveries.push(items);
            recorded.metadata_snapshots.extend(snapshot);
        }

        Ok(self.reply.then(|| json!({ "delivered": count })))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

impl MetadataAware for MemorySink {
    fn set_metadata(&self, metadata: SharedMetadata) {
        *self.metadata.lock().unwrap_or_else(PoisonError::into_inner) = Some(metadata);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    #[tokio::test]
    async fn test_records_deliveries_in_order() {
        let sink = MemorySink::new();

        assert_eq!(sink.deliver(vec![json!(1), json!(2)]).await.unwrap(), None);
        sink.deliver(vec![json!(3)]).await.unwrap();

        assert_eq!(sink.delivered(), vec![json!(1), json!(2), json!(3)]);
        assert_eq!(sink.delivery_sizes(), vec![2, 1]);
    }

    #[tokio::test]
    async fn test_metadata_written_after_set_is_seen() {
        let sink = MemorySink::new();
        let shared: SharedMetadata = Arc::new(RwLock::new(Metadata::new()));
        sink.set_metadata(shared.clone());
        shared.write().await.insert("attempt".into(), json!(2));

        sink.deliver(vec![json!("x")]).await.unwrap();

        assert_eq!(sink.metadata_snapshots()[0].get("attempt"), Some(&json!(2)));
    }
}
