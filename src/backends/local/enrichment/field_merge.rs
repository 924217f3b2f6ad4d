// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::ProcessingError;
use crate::message::Item;
use crate::traits::{Enricher, StepResult};

/// Looks up an object item's `key_field` and stores the result in `target_field`.
///
/// One record is stored as is, several as a list and none as `null`.
#[derive(Debug, Clone)]
pub struct FieldMergeEnricher {
    key_field: String,
    target_field: String,
}

impl FieldMergeEnricher {
    pub fn new(key_field: impl Into<String>, target_field: impl Into<String>) -> Self {
        Self {
            key_field: key_field.into(),
            target_field: target_field.into(),
        }
    }
}

#[async_trait]
impl Enricher for FieldMergeEnricher {
    fn prepare_parameters(&self, item: &Item) -> Option<Value> {
        item.as_object()?.get(&self.key_field).cloned()
    }

    async fn enrich(&self, item: Item, mut data: Vec<Item>) -> StepResult {
        let Value::Object(mut fields) = item else {
            return Err(ProcessingError::data_format("field_merge only accepts object items").into());
        };
        let merged = match data.len() {
            0 => Value::Null,
            1 => data.remove(0),
            _ => Value::Array(data),
        };
        fields.insert(self.target_field.clone(), merged);
        Ok(vec![Value::Object(fields)])
    }

    fn check_config(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.key_field.is_empty() {
            problems.push("key_field is empty".to_string());
        }
        if self.target_field.is_empty() {
            problems.push("target_field is empty".to_string());
        }
        problems
    }

    fn name(&self) -> &'static str {
        "field_merge"
    }
}
