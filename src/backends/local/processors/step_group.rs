// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::message::Item;
use crate::traits::{Step, StepResult};

/// Runs several steps as one, feeding each step's outputs to the next.
///
/// A discard or error from any member ends processing of that item and is
/// returned as the group's own result.
pub struct StepGroup {
    steps: Vec<Arc<dyn Step>>,
}

impl StepGroup {
    pub fn new(steps: Vec<Arc<dyn Step>>) -> Self {
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[async_trait]
impl Step for StepGroup {
    async fn apply(&self, item: Item) -> StepResult {
        let mut items = vec![item];
        for step in &self.steps {
            let mut next = Vec::with_capacity(items.len());
            for item in items {
                next.extend(step.apply(item).await?);
            }
            items = next;
        }
        Ok(items)
    }

    fn reset(&self, context: Option<&Value>) {
        for step in &self.steps {
            step.reset(context);
        }
    }

    fn check_config(&self) -> Vec<String> {
        if self.steps.is_empty() {
            return vec!["step group has no steps".to_string()];
        }
        self.steps
            .iter()
            .flat_map(|step| {
                step.check_config()
                    .into_iter()
                    .map(move |problem| format!("{}: {problem}", step.name()))
            })
            .collect()
    }

    fn name(&self) -> &'static str {
        "step_group"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::local::processors::{ChangeTextCaseStep, PatternMatchStep, ReverseTextStep};
    use crate::errors::StepFailure;
    use serde_json::json;

    #[tokio::test]
    async fn test_steps_are_chained_in_order() {
        let group = StepGroup::new(vec![
            Arc::new(ChangeTextCaseStep::upper()),
            Arc::new(ReverseTextStep::new()),
        ]);

        assert_eq!(group.apply(json!("abc")).await.unwrap(), vec![json!("CBA")]);
    }

    #[tokio::test]
    async fn test_member_discard_ends_item() {
        let group = StepGroup::new(vec![
            Arc::new(PatternMatchStep::discarding("drop")),
            Arc::new(ChangeTextCaseStep::upper()),
        ]);

        let err = group.apply(json!("drop me")).await.unwrap_err();

        assert!(matches!(err, StepFailure::Discard { .. }));
    }

    #[test]
    fn test_check_config_covers_every_member() {
        let group = StepGroup::new(vec![
            Arc::new(PatternMatchStep::discarding("")),
            Arc::new(ReverseTextStep::new()),
            Arc::new(PatternMatchStep::rejecting("")),
        ]);

        assert_eq!(
            group.check_config(),
            vec![
                "discard_matching: pattern is empty",
                "reject_matching: pattern is empty"
            ]
        );
        assert_eq!(StepGroup::new(vec![]).check_config(), vec!["step group has no steps"]);
    }
}
