// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use super::ComponentMapError;

/// Errors that can occur while validating a topology or its configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A route points at an id that is neither a node nor a producer
    UnresolvedDestination {
        /// The route origin
        node_id: String,
        /// Which channel the route belongs to (output, discard, error, default_error)
        channel: String,
        /// The destination that couldn't be resolved
        destination: String,
    },
    /// Routes are declared for an id that is neither a node nor a producer
    UnknownRouteOrigin { node_id: String },
    /// A producer was used as a route destination
    ProducerAsDestination {
        node_id: String,
        destination: String,
    },
    /// An error rule names a kind that was never registered
    UnknownErrorKind { node_id: String, kind: String },
    /// A node or producer id is used more than once
    DuplicateComponentId { id: String },
    /// An error kind is declared more than once
    DuplicateErrorKind { kind: String },
    /// An error kind declares a parent that doesn't exist
    UnknownParentKind { kind: String, parent: String },
    /// Parent links between declared error kinds form a cycle
    CyclicKindHierarchy {
        /// The cycle path, first kind repeated at the end
        cycle: Vec<String>,
    },
    /// Nothing would ever produce work
    NoProducers,
    /// A collaborator reported a problem with its own configuration
    CollaboratorConfig {
        component_id: String,
        message: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::UnresolvedDestination {
                node_id,
                channel,
                destination,
            } => {
                write!(
                    f,
                    "'{}' routes {} to '{}' which does not exist",
                    node_id, channel, destination
                )
            }
            ValidationError::UnknownRouteOrigin { node_id } => {
                write!(f, "Routes declared for unknown component '{}'", node_id)
            }
            ValidationError::ProducerAsDestination {
                node_id,
                destination,
            } => {
                write!(
                    f,
                    "'{}' routes to producer '{}'; producers can only be route origins",
                    node_id, destination
                )
            }
            ValidationError::UnknownErrorKind { node_id, kind } => {
                write!(
                    f,
                    "Error route on '{}' uses unregistered error kind '{}'",
                    node_id, kind
                )
            }
            ValidationError::DuplicateComponentId { id } => {
                write!(f, "Duplicate component ID: '{}'", id)
            }
            ValidationError::DuplicateErrorKind { kind } => {
                write!(f, "Duplicate error kind: '{}'", kind)
            }
            ValidationError::UnknownParentKind { kind, parent } => {
                write!(
                    f,
                    "Error kind '{}' declares parent '{}' which does not exist",
                    kind, parent
                )
            }
            ValidationError::CyclicKindHierarchy { cycle } => {
                write!(f, "Cyclic error kind hierarchy: {}", cycle.join(" -> "))
            }
            ValidationError::NoProducers => write!(f, "No producers configured"),
            ValidationError::CollaboratorConfig {
                component_id,
                message,
            } => {
                write!(f, "Component '{}' is misconfigured: {}", component_id, message)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors raised while loading a configuration file and wiring it into a runtime.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error(transparent)]
    Component(#[from] ComponentMapError),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::CyclicKindHierarchy {
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "Cyclic error kind hierarchy: a -> b -> a");

        let err = ValidationError::ProducerAsDestination {
            node_id: "upper".into(),
            destination: "reader".into(),
        };
        assert!(err.to_string().contains("producers can only be route origins"));
    }

    #[test]
    fn test_config_error_lists_every_validation_error() {
        let err = ConfigError::Validation(vec![
            ValidationError::NoProducers,
            ValidationError::DuplicateComponentId { id: "sink".into() },
        ]);
        let text = err.to_string();
        assert!(text.contains("No producers configured"));
        assert!(text.contains("Duplicate component ID: 'sink'"));
    }
}
