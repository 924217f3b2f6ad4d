// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;

use crate::errors::ProcessingError;
use crate::message::Item;

/// Delivers a whole message's items to somewhere outside the topology.
#[async_trait]
pub trait Sink: Send + Sync {
    async fn connect(&self) -> Result<(), ProcessingError> {
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), ProcessingError> {
        Ok(())
    }

    /// Deliver `items`; a `Some` reply is routed on as output.
    async fn deliver(&self, items: Vec<Item>) -> Result<Option<Item>, ProcessingError>;

    fn check_config(&self) -> Vec<String> {
        Vec::new()
    }

    fn name(&self) -> &'static str;
}
