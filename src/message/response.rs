// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::{Item, MessageError};
use crate::errors::ProcessingError;
use crate::routing::ErrorKind;

/// Items a node chose not to process further.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscardBatch {
    pub items: Vec<Item>,
    pub reason: String,
}

/// Items that failed in a node with conditions of one kind.
///
/// Each item keeps its own condition, origin and worker.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorBatch {
    kind: ErrorKind,
    errors: Vec<MessageError>,
}

impl ErrorBatch {
    /// `items` that all failed with `cause` in node `origin` on `worker`.
    pub fn new(
        items: Vec<Item>,
        cause: ProcessingError,
        origin: impl Into<String>,
        worker: impl Into<String>,
    ) -> Self {
        let origin = origin.into();
        let worker = worker.into();
        Self {
            kind: cause.kind.clone(),
            errors: items
                .into_iter()
                .map(|data| MessageError {
                    data,
                    cause: cause.clone(),
                    origin: origin.clone(),
                    worker: worker.clone(),
                })
                .collect(),
        }
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The failed items, in item order.
    pub fn items(&self) -> Vec<Item> {
        self.errors.iter().map(|e| e.data.clone()).collect()
    }

    /// One error value per failed item, in item order.
    pub fn errors(&self) -> &[MessageError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<MessageError> {
        self.errors
    }

    /// Message of the first condition in the batch.
    pub fn first_message(&self) -> &str {
        self.errors
            .first()
            .map(|e| e.cause.message.as_str())
            .unwrap_or_default()
    }
}

/// Classified result of applying one node to one message.
///
/// Consecutive discards with the same reason share a batch, as do consecutive
/// errors of the same kind, so a destination receives them in one delivery.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    output: Vec<Item>,
    discards: Vec<DiscardBatch>,
    errors: Vec<ErrorBatch>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_output(&mut self, items: impl IntoIterator<Item = Item>) {
        self.output.extend(items);
    }

    pub fn add_discard(&mut self, items: Vec<Item>, reason: impl Into<String>) {
        let reason = reason.into();
        match self.discards.last_mut() {
            Some(last) if last.reason == reason => last.items.extend(items),
            _ => self.discards.push(DiscardBatch { items, reason }),
        }
    }

    pub fn add_error(&mut self, batch: ErrorBatch) {
        match self.errors.last_mut() {
            Some(last) if last.kind == batch.kind => last.errors.extend(batch.errors),
            _ => self.errors.push(batch),
        }
    }

    /// Append `other` after this response, keeping call order.
    pub fn merge(&mut self, other: Response) {
        self.output.extend(other.output);
        for discard in other.discards {
            self.add_discard(discard.items, discard.reason);
        }
        for batch in other.errors {
            self.add_error(batch);
        }
    }

    pub fn output(&self) -> &[Item] {
        &self.output
    }

    pub fn discards(&self) -> &[DiscardBatch] {
        &self.discards
    }

    pub fn errors(&self) -> &[ErrorBatch] {
        &self.errors
    }

    pub fn is_empty(&self) -> bool {
        self.output.is_empty() && self.discards.is_empty() && self.errors.is_empty()
    }

    pub fn into_parts(self) -> (Vec<Item>, Vec<DiscardBatch>, Vec<ErrorBatch>) {
        (self.output, self.discards, self.errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_preserves_call_order() {
        let mut first = Response::new();
        first.add_output([json!("A")]);
        first.add_discard(vec![json!("skip")], "blank");

        let mut second = Response::new();
        second.add_output([json!("B"), json!("B2")]);
        second.add_error(ErrorBatch::new(
            vec![json!("bad")],
            ProcessingError::data_format("not text"),
            "upper",
            "worker-reader",
        ));

        first.merge(second);

        assert_eq!(first.output(), &[json!("A"), json!("B"), json!("B2")]);
        assert_eq!(first.discards().len(), 1);
        assert_eq!(first.errors().len(), 1);
        assert_eq!(first.errors()[0].kind(), &ErrorKind::data_format());
    }

    #[test]
    fn test_error_batch_yields_one_error_value_per_item() {
        let batch = ErrorBatch::new(
            vec![json!(1), json!(2)],
            ProcessingError::processing("boom"),
            "sink",
            "worker-reader",
        );

        let errors = batch.errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[1].data, json!(2));
        assert_eq!(errors[1].origin, "sink");
        assert!(Response::new().is_empty());
    }

    #[test]
    fn test_consecutive_discards_and_errors_share_a_batch() {
        struct TestCase {
            name: &'static str,
            reasons: Vec<&'static str>,
            expected_sizes: Vec<usize>,
        }

        let test_cases = vec![
            TestCase {
                name: "same reason",
                reasons: vec!["blank", "blank", "blank"],
                expected_sizes: vec![3],
            },
            TestCase {
                name: "reason changes",
                reasons: vec!["blank", "blank", "too long", "blank"],
                expected_sizes: vec![2, 1, 1],
            },
        ];

        for test_case in test_cases {
            let mut response = Response::new();
            for (i, reason) in test_case.reasons.iter().enumerate() {
                response.add_discard(vec![json!(i)], *reason);
            }
            let sizes: Vec<usize> = response.discards().iter().map(|d| d.items.len()).collect();
            assert_eq!(sizes, test_case.expected_sizes, "case: {}", test_case.name);
        }

        let mut response = Response::new();
        for (item, cause) in [
            (json!("a"), ProcessingError::data_format("not text")),
            (json!("b"), ProcessingError::data_format("too long")),
            (json!("c"), ProcessingError::processing("boom")),
        ] {
            let mut single = Response::new();
            single.add_error(ErrorBatch::new(vec![item], cause, "check", "w"));
            response.merge(single);
        }

        assert_eq!(response.errors().len(), 2);
        let first = &response.errors()[0];
        assert_eq!(first.items(), vec![json!("a"), json!("b")]);
        assert_eq!(first.errors()[1].cause.message, "too long", "each item keeps its own condition");
        assert_eq!(first.first_message(), "not text");
        assert_eq!(response.errors()[1].kind(), &ErrorKind::processing());
    }
}
