// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::{ProcessingError, StepFailure};
use crate::message::Item;
use crate::traits::{Step, StepResult};

/// What happens to an item containing the pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchAction {
    /// Filter the item out as a discard.
    Discard,
    /// Fail the item with a data-format error.
    Reject,
}

/// Passes items through unless their text contains a pattern.
///
/// String items are matched as-is; any other item is matched against its
/// JSON text.
pub struct PatternMatchStep {
    pattern: String,
    action: MatchAction,
}

impl PatternMatchStep {
    pub fn new(pattern: impl Into<String>, action: MatchAction) -> Self {
        Self {
            pattern: pattern.into(),
            action,
        }
    }

    pub fn discarding(pattern: impl Into<String>) -> Self {
        Self::new(pattern, MatchAction::Discard)
    }

    pub fn rejecting(pattern: impl Into<String>) -> Self {
        Self::new(pattern, MatchAction::Reject)
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn matches(&self, item: &Item) -> bool {
        match item {
            Value::String(text) => text.contains(&self.pattern),
            other => other.to_string().contains(&self.pattern),
        }
    }
}

#[async_trait]
impl Step for PatternMatchStep {
    async fn apply(&self, item: Item) -> StepResult {
        if !self.matches(&item) {
            return Ok(vec![item]);
        }
        match self.action {
            MatchAction::Discard => Err(StepFailure::discard(format!("matched '{}'", self.pattern))),
            MatchAction::Reject => Err(StepFailure::Error(ProcessingError::data_format(format!(
                "item contains '{}'",
                self.pattern
            )))),
        }
    }

    fn check_config(&self) -> Vec<String> {
        if self.pattern.is_empty() {
            vec!["pattern is empty".to_string()]
        } else {
            Vec::new()
        }
    }

    fn name(&self) -> &'static str {
        match self.action {
            MatchAction::Discard => "discard_matching",
            MatchAction::Reject => "reject_matching",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::ErrorKind;
    use serde_json::json;

    #[tokio::test]
    async fn test_matching_items_are_classified() {
        struct TestCase {
            name: &'static str,
            step: PatternMatchStep,
            item: Value,
            passes: bool,
        }

        let cases = vec![
            TestCase {
                name: "discard passes non-matching string",
                step: PatternMatchStep::discarding("skip"),
                item: json!("keep"),
                passes: true,
            },
            TestCase {
                name: "discard filters matching string",
                step: PatternMatchStep::discarding("skip"),
                item: json!("please skip me"),
                passes: false,
            },
            TestCase {
                name: "reject matches json text of objects",
                step: PatternMatchStep::rejecting("bad"),
                item: json!({"status": "bad"}),
                passes: false,
            },
            TestCase {
                name: "reject passes numbers",
                step: PatternMatchStep::rejecting("bad"),
                item: json!(7),
                passes: true,
            },
        ];

        for case in cases {
            let result = case.step.apply(case.item.clone()).await;
            assert_eq!(result.is_ok(), case.passes, "case: {}", case.name);
            if case.passes {
                assert_eq!(result.unwrap(), vec![case.item], "case: {}", case.name);
            }
        }
    }

    #[tokio::test]
    async fn test_reject_raises_data_format_error() {
        let err = PatternMatchStep::rejecting("bad").apply(json!("bad")).await.unwrap_err();

        assert!(matches!(err, StepFailure::Error(ref cause) if cause.kind == ErrorKind::data_format()));
    }

    #[tokio::test]
    async fn test_discard_reason_names_pattern() {
        let err = PatternMatchStep::discarding("x").apply(json!("x")).await.unwrap_err();

        assert_eq!(
            err,
            StepFailure::Discard {
                reason: "matched 'x'".to_string()
            }
        );
    }

    #[test]
    fn test_empty_pattern_is_misconfigured() {
        assert_eq!(PatternMatchStep::discarding("").check_config(), vec!["pattern is empty"]);
        assert!(PatternMatchStep::rejecting("a").check_config().is_empty());
    }
}
