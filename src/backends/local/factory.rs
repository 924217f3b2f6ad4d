// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use super::enrichment::*;
use super::processors::*;
use super::producers::*;
use super::sinks::*;
use crate::config::consts::{DEFAULT_BATCH_SIZE, DEFAULT_READ_TIMEOUT_MS};
use crate::config::{NodeConfig, NodeRoleConfig, ProducerConfig};
use crate::engine::{Node, ProducerHandle};
use crate::errors::ComponentMapError;
use crate::traits::Step;

type Options = HashMap<String, Value>;

const STEP_IMPLEMENTATIONS: &[&str] = &[
    "change_text_case_upper",
    "change_text_case_lower",
    "change_text_case_proper",
    "change_text_case_title",
    "reverse_text",
    "discard_matching",
    "reject_matching",
    "step_group",
];

const SINK_IMPLEMENTATIONS: &[&str] = &["stdout", "memory"];

const ENRICH_IMPLEMENTATIONS: &[&str] = &["field_merge"];

const PRODUCER_IMPLEMENTATIONS: &[&str] = &["static_items"];

/// Factory for creating local (in-process) collaborators from configuration
pub struct LocalComponentFactory;

impl LocalComponentFactory {
    /// Create a node from configuration
    ///
    /// The `impl_` field selects the collaborator, and must suit the node's role:
    /// - step: "change_text_case_{upper,lower,proper,title}", "reverse_text",
    ///   "discard_matching" / "reject_matching" (`options.pattern`),
    ///   "step_group" (`options.steps`, a list of step names)
    /// - sink: "stdout", "memory"
    /// - enrich: "field_merge" (`options.key_field`, `options.target_field`,
    ///   `options.table` as the lookup object, optional `options.read_timeout_ms`)
    pub fn create_node(config: &NodeConfig) -> Result<Node, ComponentMapError> {
        let impl_name = required_impl(&config.id, config.impl_.as_deref())?;

        let node = match config.role {
            NodeRoleConfig::Step => {
                let step = Self::create_step(&config.id, impl_name, &config.options)?;
                Node::step(config.id.as_str(), step)
            }
            NodeRoleConfig::Sink => match impl_name {
                "stdout" => {
                    let pretty = optional_bool(&config.id, impl_name, &config.options, "pretty")?;
                    let sink = if pretty { StdoutSink::pretty() } else { StdoutSink::new() };
                    Node::sink(config.id.as_str(), Arc::new(sink))
                }
                "memory" => {
                    let sink = Arc::new(MemorySink::new());
                    Node::sink(config.id.as_str(), sink.clone()).with_metadata_aware(sink)
                }
                _ => return Err(unknown(&config.id, impl_name)),
            },
            NodeRoleConfig::Enrich => match impl_name {
                "field_merge" => {
                    let options = &config.options;
                    let key_field = required_str(&config.id, impl_name, options, "key_field")?;
                    let target_field = required_str(&config.id, impl_name, options, "target_field")?;
                    let Some(Value::Object(table)) = options.get("table") else {
                        return Err(invalid(&config.id, impl_name, "'table' must be an object"));
                    };
                    let read_timeout_ms = match options.get("read_timeout_ms") {
                        None => DEFAULT_READ_TIMEOUT_MS,
                        Some(value) => value.as_u64().ok_or_else(|| {
                            invalid(&config.id, impl_name, "'read_timeout_ms' must be a positive integer")
                        })?,
                    };
                    Node::enrich(
                        config.id.as_str(),
                        Arc::new(FieldMergeEnricher::new(key_field, target_field)),
                        Arc::new(LookupTableReader::from_object(table)),
                        Duration::from_millis(read_timeout_ms),
                    )
                }
                _ => return Err(unknown(&config.id, impl_name)),
            },
        };

        Ok(node
            .accepting_batches(config.accepts_batches)
            .best_effort(config.best_effort))
    }

    /// Create a producer from configuration
    ///
    /// - "static_items": yields `options.items` in batches of `options.batch_size`
    pub fn create_producer(
        config: &ProducerConfig,
        default_poll_timeout: Duration,
    ) -> Result<ProducerHandle, ComponentMapError> {
        let impl_name = required_impl(&config.id, config.impl_.as_deref())?;
        let poll_timeout = config
            .poll_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(default_poll_timeout);

        match impl_name {
            "static_items" => {
                let items = match config.options.get("items") {
                    None => Vec::new(),
                    Some(Value::Array(items)) => items.clone(),
                    Some(_) => {
                        return Err(invalid(&config.id, impl_name, "'items' must be a list"));
                    }
                };
                let batch_size = match config.options.get("batch_size") {
                    None => DEFAULT_BATCH_SIZE,
                    Some(value) => value
                        .as_u64()
                        .map(|size| size as usize)
                        .ok_or_else(|| invalid(&config.id, impl_name, "'batch_size' must be a positive integer"))?,
                };
                Ok(ProducerHandle::new(
                    config.id.as_str(),
                    Arc::new(StaticItemsProducer::new(items, batch_size)),
                    poll_timeout,
                ))
            }
            _ => Err(unknown(&config.id, impl_name)),
        }
    }

    fn create_step(
        component_id: &str,
        impl_name: &str,
        options: &Options,
    ) -> Result<Arc<dyn Step>, ComponentMapError> {
        match impl_name {
            "change_text_case_upper" => Ok(Arc::new(ChangeTextCaseStep::upper())),
            "change_text_case_lower" => Ok(Arc::new(ChangeTextCaseStep::lower())),
            "change_text_case_proper" => Ok(Arc::new(ChangeTextCaseStep::proper())),
            "change_text_case_title" => Ok(Arc::new(ChangeTextCaseStep::title())),

            "reverse_text" => Ok(Arc::new(ReverseTextStep::new())),

            "discard_matching" => {
                let pattern = required_str(component_id, impl_name, options, "pattern")?;
                Ok(Arc::new(PatternMatchStep::discarding(pattern)))
            }
            "reject_matching" => {
                let pattern = required_str(component_id, impl_name, options, "pattern")?;
                Ok(Arc::new(PatternMatchStep::rejecting(pattern)))
            }

            "step_group" => {
                let Some(Value::Array(names)) = options.get("steps") else {
                    return Err(invalid(component_id, impl_name, "'steps' must be a list of step names"));
                };
                let steps = names
                    .iter()
                    .map(|name| match name.as_str() {
                        Some(name) => Self::create_step(component_id, name, &Options::new()),
                        None => Err(invalid(component_id, impl_name, "'steps' must be a list of step names")),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Arc::new(StepGroup::new(steps)))
            }

            _ => Err(unknown(component_id, impl_name)),
        }
    }

    /// List all available local implementations
    pub fn list_available_implementations() -> Vec<&'static str> {
        STEP_IMPLEMENTATIONS
            .iter()
            .chain(SINK_IMPLEMENTATIONS)
            .chain(ENRICH_IMPLEMENTATIONS)
            .chain(PRODUCER_IMPLEMENTATIONS)
            .copied()
            .collect()
    }

    /// Check if an implementation is available
    pub fn is_implementation_available(impl_name: &str) -> bool {
        Self::list_available_implementations().contains(&impl_name)
    }
}

fn required_impl<'a>(component_id: &str, impl_: Option<&'a str>) -> Result<&'a str, ComponentMapError> {
    impl_.ok_or_else(|| ComponentMapError::MissingImplementation {
        component_id: component_id.to_string(),
    })
}

fn required_str<'a>(
    component_id: &str,
    impl_name: &str,
    options: &'a Options,
    key: &str,
) -> Result<&'a str, ComponentMapError> {
    options
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| invalid(component_id, impl_name, &format!("'{key}' must be a string")))
}

fn optional_bool(
    component_id: &str,
    impl_name: &str,
    options: &Options,
    key: &str,
) -> Result<bool, ComponentMapError> {
    match options.get(key) {
        None => Ok(false),
        Some(value) => value
            .as_bool()
            .ok_or_else(|| invalid(component_id, impl_name, &format!("'{key}' must be a boolean"))),
    }
}

fn unknown(component_id: &str, impl_name: &str) -> ComponentMapError {
    ComponentMapError::UnknownImplementation {
        component_id: component_id.to_string(),
        impl_name: impl_name.to_string(),
    }
}

fn invalid(component_id: &str, impl_name: &str, reason: &str) -> ComponentMapError {
    ComponentMapError::InvalidOptions {
        component_id: component_id.to_string(),
        impl_name: impl_name.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{NodeRole, TransactionCoordinator};
    use crate::message::Message;
    use serde_json::json;

    fn node_config(id: &str, role: NodeRoleConfig, impl_name: &str, options: Options) -> NodeConfig {
        NodeConfig {
            id: id.to_string(),
            role,
            impl_: Some(impl_name.to_string()),
            accepts_batches: true,
            best_effort: false,
            options,
        }
    }

    fn producer_config(impl_name: Option<&str>, options: Options) -> ProducerConfig {
        ProducerConfig {
            id: "reader".to_string(),
            impl_: impl_name.map(str::to_string),
            poll_timeout_ms: None,
            options,
        }
    }

    #[tokio::test]
    async fn test_create_text_steps() {
        let test_cases = vec![
            ("change_text_case_upper", "hello", "HELLO"),
            ("change_text_case_lower", "HELLO", "hello"),
            ("change_text_case_proper", "hello world", "Hello World"),
            ("change_text_case_title", "the quick brown fox", "The Quick Brown Fox"),
            ("reverse_text", "abc", "cba"),
        ];
        let coordinator = TransactionCoordinator::new();

        for (impl_name, input, expected) in test_cases {
            let config = node_config("test", NodeRoleConfig::Step, impl_name, Options::new());
            let node = LocalComponentFactory::create_node(&config)
                .unwrap_or_else(|e| panic!("Failed to create {impl_name}: {e}"));

            let response = node
                .apply(&Message::new("reader", vec![json!(input)]), &coordinator)
                .await
                .unwrap();

            assert_eq!(response.output(), &[json!(expected)], "impl: {impl_name}");
        }
    }

    #[test]
    fn test_step_group_from_options() {
        let options: Options = [("steps".to_string(), json!(["change_text_case_upper", "reverse_text"]))]
            .into_iter()
            .collect();
        let node = LocalComponentFactory::create_node(&node_config(
            "chain",
            NodeRoleConfig::Step,
            "step_group",
            options,
        ))
        .unwrap();

        assert_eq!(node.role().implementation(), "step_group");
    }

    #[test]
    fn test_pattern_steps_require_pattern() {
        let err = LocalComponentFactory::create_node(&node_config(
            "filter",
            NodeRoleConfig::Step,
            "discard_matching",
            Options::new(),
        ))
        .unwrap_err();

        assert!(matches!(err, ComponentMapError::InvalidOptions { ref reason, .. } if reason.contains("pattern")));
    }

    #[test]
    fn test_role_selects_implementation_family() {
        let err = LocalComponentFactory::create_node(&node_config(
            "out",
            NodeRoleConfig::Step,
            "stdout",
            Options::new(),
        ))
        .unwrap_err();

        assert_eq!(
            err,
            ComponentMapError::UnknownImplementation {
                component_id: "out".into(),
                impl_name: "stdout".into()
            }
        );

        let node = LocalComponentFactory::create_node(&node_config(
            "out",
            NodeRoleConfig::Sink,
            "memory",
            Options::new(),
        ))
        .unwrap();
        assert!(matches!(node.role(), NodeRole::Sink(_)));
    }

    #[tokio::test]
    async fn test_create_field_merge_enrich_node() {
        let options: Options = [
            ("key_field".to_string(), json!("code")),
            ("target_field".to_string(), json!("country")),
            ("table".to_string(), json!({"nl": "Netherlands"})),
            ("read_timeout_ms".to_string(), json!(200)),
        ]
        .into_iter()
        .collect();
        let node = LocalComponentFactory::create_node(&node_config(
            "lookup",
            NodeRoleConfig::Enrich,
            "field_merge",
            options,
        ))
        .unwrap();

        let NodeRole::Enrich(enrichment) = node.role() else {
            panic!("expected an enrich node");
        };
        assert_eq!(enrichment.read_timeout, Duration::from_millis(200));

        let response = node
            .apply(&Message::new("reader", vec![json!({"code": "nl"})]), &TransactionCoordinator::new())
            .await
            .unwrap();
        assert_eq!(response.output(), &[json!({"code": "nl", "country": "Netherlands"})]);

        let err = LocalComponentFactory::create_node(&node_config(
            "lookup",
            NodeRoleConfig::Enrich,
            "field_merge",
            [("key_field".to_string(), json!("code")), ("target_field".to_string(), json!("c"))]
                .into_iter()
                .collect(),
        ))
        .unwrap_err();
        assert!(matches!(err, ComponentMapError::InvalidOptions { ref reason, .. } if reason.contains("table")));
    }

    #[test]
    fn test_node_flags_are_applied() {
        let mut config = node_config("out", NodeRoleConfig::Sink, "stdout", Options::new());
        config.accepts_batches = false;
        config.best_effort = true;

        let node = LocalComponentFactory::create_node(&config).unwrap();

        assert!(!node.accepts_batches());
        assert!(node.is_best_effort());
    }

    #[tokio::test]
    async fn test_create_static_items_producer() {
        let options: Options = [
            ("items".to_string(), json!(["a", "b", "c"])),
            ("batch_size".to_string(), json!(2)),
        ]
        .into_iter()
        .collect();

        let handle = LocalComponentFactory::create_producer(
            &producer_config(Some("static_items"), options),
            Duration::from_millis(250),
        )
        .unwrap();

        assert_eq!(handle.poll_timeout(), Duration::from_millis(250));
        let batch = handle.producer().poll(Duration::from_millis(1)).await.unwrap();
        assert_eq!(batch, Some(vec![json!("a"), json!("b")]));
    }

    #[test]
    fn test_producer_errors() {
        let missing = LocalComponentFactory::create_producer(
            &producer_config(None, Options::new()),
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert_eq!(
            missing,
            ComponentMapError::MissingImplementation {
                component_id: "reader".into()
            }
        );

        let unknown = LocalComponentFactory::create_producer(
            &producer_config(Some("kafka"), Options::new()),
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(matches!(unknown, ComponentMapError::UnknownImplementation { .. }));
    }

    #[test]
    fn test_list_available_implementations() {
        let available = LocalComponentFactory::list_available_implementations();

        assert!(available.contains(&"step_group"));
        assert!(available.contains(&"memory"));
        assert!(available.contains(&"field_merge"));
        assert!(LocalComponentFactory::is_implementation_available("static_items"));
        assert!(!LocalComponentFactory::is_implementation_available("queue"));
    }
}
