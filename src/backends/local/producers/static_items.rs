// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::errors::ProcessingError;
use crate::message::Item;
use crate::traits::Producer;

/// Yields a fixed list of items in batches, then reports exhaustion.
///
/// The context is the index of the next item, so a restarted worker resumes
/// where the previous connection stopped.
pub struct StaticItemsProducer {
    items: Vec<Item>,
    batch_size: usize,
    cursor: AtomicUsize,
}

impl StaticItemsProducer {
    pub fn new(items: Vec<Item>, batch_size: usize) -> Self {
        Self {
            items,
            batch_size,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn remaining(&self) -> usize {
        self.items.len().saturating_sub(self.cursor.load(Ordering::SeqCst))
    }
}

#[async_trait]
impl Producer for StaticItemsProducer {
    fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    async fn poll(&self, _timeout: Duration) -> Result<Option<Vec<Item>>, ProcessingError> {
        let size = self.batch_size.max(1);
        let start = self.cursor.fetch_add(size, Ordering::SeqCst).min(self.items.len());
        let end = (start + size).min(self.items.len());
        if start == end {
            return Ok(None);
        }
        Ok(Some(self.items[start..end].to_vec()))
    }

    fn context(&self) -> Option<Value> {
        Some(json!(self.cursor.load(Ordering::SeqCst).min(self.items.len())))
    }

    fn set_context(&self, context: Value) {
        if let Some(cursor) = context.as_u64() {
            self.cursor.store(cursor as usize, Ordering::SeqCst);
        }
    }

    fn check_config(&self) -> Vec<String> {
        if self.batch_size == 0 {
            vec!["batch_size must be at least 1".to_string()]
        } else {
            Vec::new()
        }
    }

    fn name(&self) -> &'static str {
        "static_items"
    }
}
