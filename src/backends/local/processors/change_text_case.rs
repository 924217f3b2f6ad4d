// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{ProcessingError, StepFailure};
use crate::message::Item;
use crate::traits::{Step, StepResult};

/// Which case conversion to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextCase {
    Upper,
    Lower,
    /// First letter of each word capitalized.
    Proper,
    /// Like proper, but short articles and prepositions stay lowercase.
    Title,
}

/// Configuration for the Change Text Case step
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChangeTextCaseConfig {
    pub case: TextCase,
}

/// Change Text Case step - converts string items to a different case
pub struct ChangeTextCaseStep {
    config: ChangeTextCaseConfig,
}

impl ChangeTextCaseStep {
    pub fn new(config: ChangeTextCaseConfig) -> Self {
        Self { config }
    }

    pub fn upper() -> Self {
        Self::new(ChangeTextCaseConfig { case: TextCase::Upper })
    }

    pub fn lower() -> Self {
        Self::new(ChangeTextCaseConfig { case: TextCase::Lower })
    }

    pub fn proper() -> Self {
        Self::new(ChangeTextCaseConfig { case: TextCase::Proper })
    }

    pub fn title() -> Self {
        Self::new(ChangeTextCaseConfig { case: TextCase::Title })
    }

    fn convert(&self, input: &str) -> String {
        match self.config.case {
            TextCase::Upper => input.to_uppercase(),
            TextCase::Lower => input.to_lowercase(),
            TextCase::Proper => input
                .split_whitespace()
                .map(capitalize)
                .collect::<Vec<_>>()
                .join(" "),
            TextCase::Title => input
                .split_whitespace()
                .enumerate()
                .map(|(i, word)| {
                    let lower_word = word.to_lowercase();
                    if i == 0 || !is_minor_word(&lower_word) {
                        capitalize(word)
                    } else {
                        lower_word
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
    }
}

fn is_minor_word(word: &str) -> bool {
    matches!(
        word,
        "a" | "an" | "the" | "and" | "or" | "but" | "in" | "on" | "at" | "to" | "for" | "of" | "with" | "by"
    )
}

#[async_trait]
impl Step for ChangeTextCaseStep {
    async fn apply(&self, item: Item) -> StepResult {
        match item {
            Value::String(text) => Ok(vec![Value::String(self.convert(&text))]),
            other => Err(StepFailure::Error(ProcessingError::data_format(format!(
                "expected a string item, got {other}"
            )))),
        }
    }

    fn name(&self) -> &'static str {
        "change_text_case"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::ErrorKind;
    use serde_json::json;

    #[tokio::test]
    async fn test_case_conversions() {
        struct TestCase {
            name: &'static str,
            step: ChangeTextCaseStep,
            input: &'static str,
            expected: &'static str,
        }

        let cases = vec![
            TestCase {
                name: "upper",
                step: ChangeTextCaseStep::upper(),
                input: "hello world",
                expected: "HELLO WORLD",
            },
            TestCase {
                name: "lower",
                step: ChangeTextCaseStep::lower(),
                input: "HeLLo",
                expected: "hello",
            },
            TestCase {
                name: "proper",
                step: ChangeTextCaseStep::proper(),
                input: "hello wORLD",
                expected: "Hello World",
            },
            TestCase {
                name: "title keeps minor words lowercase",
                step: ChangeTextCaseStep::title(),
                input: "the lord of the rings",
                expected: "The Lord of the Rings",
            },
        ];

        for case in cases {
            let outputs = case.step.apply(json!(case.input)).await.unwrap();
            assert_eq!(outputs, vec![json!(case.expected)], "case: {}", case.name);
        }
    }

    #[tokio::test]
    async fn test_non_string_item_is_a_data_format_error() {
        let err = ChangeTextCaseStep::upper().apply(json!(42)).await.unwrap_err();

        match err {
            StepFailure::Error(cause) => {
                assert_eq!(cause.kind, ErrorKind::data_format());
                assert!(!cause.is_fatal());
            }
            other => panic!("unexpected failure: {other:?}"),
        }
    }
}
