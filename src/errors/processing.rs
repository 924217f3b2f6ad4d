// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised by collaborators while handling items.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::routing::ErrorKind;

/// An error condition raised by a producer, step, sink or resource.
///
/// Every condition carries an [`ErrorKind`] used for error-route matching and a
/// `fatal` flag. Fatal conditions abort the traversal of the current batch and
/// roll back its transaction; non-fatal ones only affect the item that raised
/// them.
///
/// # Example
/// ```
/// use the_junction::errors::ProcessingError;
///
/// let err = ProcessingError::data_format("expected a string");
/// assert_eq!(err.kind.as_str(), "data_format");
/// assert!(!err.is_fatal());
///
/// let err = ProcessingError::connection("broker unreachable");
/// assert!(err.is_fatal());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{kind} error: {message}")]
pub struct ProcessingError {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(default)]
    pub fatal: bool,
}

impl ProcessingError {
    pub fn of_kind(kind: impl Into<ErrorKind>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            fatal: false,
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self::of_kind(ErrorKind::processing(), message)
    }

    pub fn data_format(message: impl Into<String>) -> Self {
        Self::of_kind(ErrorKind::data_format(), message)
    }

    /// Connection failures are always fatal.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::of_kind(ErrorKind::connection(), message).into_fatal()
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::processing(message).into_fatal()
    }

    pub fn into_fatal(mut self) -> Self {
        self.fatal = true;
        self
    }

    pub fn is_fatal(&self) -> bool {
        self.fatal
    }
}

/// Outcome of a step that did not produce output for an item.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StepFailure {
    /// The item is deliberately not processed further.
    #[error("item discarded: {reason}")]
    Discard { reason: String },

    #[error(transparent)]
    Error(#[from] ProcessingError),
}

impl StepFailure {
    pub fn discard(reason: impl Into<String>) -> Self {
        StepFailure::Discard {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_assign_kinds_and_fatality() {
        struct TestCase {
            error: ProcessingError,
            kind: &'static str,
            fatal: bool,
        }

        let cases = vec![
            TestCase { error: ProcessingError::processing("x"), kind: "processing", fatal: false },
            TestCase { error: ProcessingError::data_format("x"), kind: "data_format", fatal: false },
            TestCase { error: ProcessingError::connection("x"), kind: "connection", fatal: true },
            TestCase { error: ProcessingError::fatal("x"), kind: "processing", fatal: true },
            TestCase { error: ProcessingError::of_kind("schema", "x"), kind: "schema", fatal: false },
        ];

        for case in cases {
            assert_eq!(case.error.kind.as_str(), case.kind);
            assert_eq!(case.error.is_fatal(), case.fatal, "kind {}", case.kind);
        }
    }

    #[test]
    fn test_display_includes_kind_and_message() {
        let err = ProcessingError::data_format("not a string");
        assert_eq!(err.to_string(), "data_format error: not a string");
    }

    #[test]
    fn test_step_failure_from_processing_error() {
        let failure: StepFailure = ProcessingError::processing("boom").into();
        assert!(matches!(failure, StepFailure::Error(ref e) if e.message == "boom"));
        assert_eq!(StepFailure::discard("dup").to_string(), "item discarded: dup");
    }
}
