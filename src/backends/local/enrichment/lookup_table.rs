// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::ProcessingError;
use crate::message::Item;
use crate::traits::EnrichmentReader;

/// In-memory reader: the parameter is a key, the records are the values under it.
///
/// Non-string keys are looked up by their JSON text, so `7` finds `"7"`.
/// A missing key, or no parameter at all, reads nothing.
#[derive(Debug, Default)]
pub struct LookupTableReader {
    table: HashMap<String, Vec<Item>>,
    connects: AtomicUsize,
    disconnects: AtomicUsize,
}

impl LookupTableReader {
    pub fn new(table: HashMap<String, Vec<Item>>) -> Self {
        Self {
            table,
            ..Self::default()
        }
    }

    /// Build from a JSON object; a list value holds several records.
    pub fn from_object(object: &serde_json::Map<String, Value>) -> Self {
        let table = object
            .iter()
            .map(|(key, value)| {
                let records = match value {
                    Value::Array(records) => records.clone(),
                    record => vec![record.clone()],
                };
                (key.clone(), records)
            })
            .collect();
        Self::new(table)
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn disconnect_count(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

fn key_of(parameter: &Value) -> String {
    match parameter {
        Value::String(key) => key.clone(),
        other => other.to_string(),
    }
}

#[async_trait]
impl EnrichmentReader for LookupTableReader {
    async fn connect(&self) -> Result<(), ProcessingError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn disconnect(&self) -> Result<(), ProcessingError> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn read(&self, parameters: Option<&Value>, _timeout: Duration) -> Result<Vec<Item>, ProcessingError> {
        Ok(parameters
            .and_then(|parameter| self.table.get(&key_of(parameter)))
            .cloned()
            .unwrap_or_default())
    }

    fn check_config(&self) -> Vec<String> {
        if self.table.is_empty() {
            vec!["lookup table is empty".to_string()]
        } else {
            Vec::new()
        }
    }

    fn name(&self) -> &'static str {
        "lookup_table"
    }
}
