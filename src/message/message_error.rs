// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use super::Item;
use crate::errors::ProcessingError;

/// A failed item together with why, where and on which worker it failed.
///
/// Error routes deliver these, serialized, as the input items of the
/// destination node:
///
/// ```json
/// {
///   "data": "bad item",
///   "error": { "kind": "data_format", "message": "not text", "fatal": false },
///   "origin": "upper",
///   "worker": "worker-reader"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[error("{cause} (node '{origin}', worker '{worker}')")]
pub struct MessageError {
    pub data: Item,
    #[serde(rename = "error")]
    pub cause: ProcessingError,
    pub origin: String,
    pub worker: String,
}

impl MessageError {
    pub fn to_item(&self) -> Item {
        json!({
            "data": self.data,
            "error": {
                "kind": self.cause.kind.as_str(),
                "message": self.cause.message,
                "fatal": self.cause.fatal,
            },
            "origin": self.origin,
            "worker": self.worker,
        })
    }

    /// Recover an error value delivered along an error route.
    pub fn from_item(item: &Item) -> Option<Self> {
        serde_json::from_value(item.clone()).ok()
    }
}
