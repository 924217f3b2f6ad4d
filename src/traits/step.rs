// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::StepFailure;
use crate::message::Item;

/// Outputs for one input item, or why there are none.
pub type StepResult = Result<Vec<Item>, StepFailure>;

/// Transforms one item into zero or more items.
#[async_trait]
pub trait Step: Send + Sync {
    async fn apply(&self, item: Item) -> StepResult;

    /// Called once per message before its items are applied.
    fn reset(&self, _context: Option<&Value>) {}

    /// Configuration problems; empty when the step is usable.
    fn check_config(&self) -> Vec<String> {
        Vec::new()
    }

    fn name(&self) -> &'static str;
}
