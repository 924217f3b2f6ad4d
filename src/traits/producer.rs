// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::engine::TerminalResults;
use crate::errors::ProcessingError;
use crate::message::Item;

/// A source of batches, polled by its own worker.
#[async_trait]
pub trait Producer: Send + Sync {
    async fn connect(&self) -> Result<(), ProcessingError> {
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), ProcessingError> {
        Ok(())
    }

    /// The adaptor is done with this producer: every worker has ended and no
    /// reconnect follows until it runs again. Unlike `disconnect`, this is not
    /// called between restarts.
    async fn shutdown(&self) {}

    /// No more data will ever be available.
    fn is_exhausted(&self) -> bool;

    /// Wait up to `timeout` for the next batch. `Ok(None)` means nothing arrived.
    async fn poll(&self, timeout: Duration) -> Result<Option<Vec<Item>>, ProcessingError>;

    /// Opaque position handed to steps on `reset` and kept across restarts.
    fn context(&self) -> Option<Value> {
        None
    }

    fn set_context(&self, _context: Value) {}

    fn check_config(&self) -> Vec<String> {
        Vec::new()
    }

    /// Sees the results of every batch it produced once routing has finished.
    async fn on_terminal(&self, _results: &TerminalResults) -> Result<(), ProcessingError> {
        Ok(())
    }

    fn name(&self) -> &'static str;
}
