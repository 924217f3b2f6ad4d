// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::{ProcessingError, StepFailure};
use crate::message::Item;
use crate::traits::{Step, StepResult};

/// Reverse Text step - reverses string items
#[derive(Debug, Default)]
pub struct ReverseTextStep;

impl ReverseTextStep {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Step for ReverseTextStep {
    async fn apply(&self, item: Item) -> StepResult {
        let Value::String(text) = item else {
            return Err(StepFailure::Error(ProcessingError::data_format(
                "reverse_text only accepts string items",
            )));
        };
        Ok(vec![Value::String(text.chars().rev().collect())])
    }

    fn name(&self) -> &'static str {
        "reverse_text"
    }
}
