// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::ProcessingError;
use crate::message::Item;
use crate::traits::StepResult;

/// Looks up data for one item at a time.
///
/// Connected when its node starts and disconnected when it stops.
#[async_trait]
pub trait EnrichmentReader: Send + Sync {
    async fn connect(&self) -> Result<(), ProcessingError> {
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), ProcessingError> {
        Ok(())
    }

    /// Everything matching `parameters`; `None` reads without parameters.
    ///
    /// The node abandons the read once `timeout` has passed.
    async fn read(&self, parameters: Option<&Value>, timeout: Duration) -> Result<Vec<Item>, ProcessingError>;

    fn check_config(&self) -> Vec<String> {
        Vec::new()
    }

    fn name(&self) -> &'static str;
}

/// Turns an item into reader parameters, then merges what was read back in.
#[async_trait]
pub trait Enricher: Send + Sync {
    /// Query parameters for `item`, or `None` when it has none to offer.
    fn prepare_parameters(&self, item: &Item) -> Option<Value>;

    async fn enrich(&self, item: Item, data: Vec<Item>) -> StepResult;

    fn check_config(&self) -> Vec<String> {
        Vec::new()
    }

    fn name(&self) -> &'static str;
}
