// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Configuration validation for routing topologies.
//!
//! Validation runs in two stages:
//!
//! 1. **Error kinds**: application kinds are merged into the built-in
//!    hierarchy. Duplicates, unknown parents and parent cycles are reported.
//! 2. **Topology**: the `pipeline` shorthand is expanded into output routes
//!    ahead of the explicit ones. Ids must be unique, every route origin must exist, every
//!    destination must be a node (never a producer) and every error rule must
//!    name a known kind.
//!
//! The topology stage needs a valid kind hierarchy, so it only runs when the
//! first stage passes. Within a stage every problem is collected.
//!
//! # Examples
//!
//! ```rust
//! use the_junction::config::{build_topology, parse_yaml};
//! use the_junction::errors::ValidationError;
//!
//! let config = parse_yaml(r#"
//! producers:
//!   - { id: reader, impl_: static_items }
//! nodes:
//!   - { id: out, role: sink, impl_: stdout }
//! routes:
//!   reader: { output: [out, ghost] }
//! "#)?;
//!
//! let errors = build_topology(&config).unwrap_err();
//! assert_eq!(
//!     errors,
//!     vec![ValidationError::UnresolvedDestination {
//!         node_id: "reader".into(),
//!         channel: "output".into(),
//!         destination: "ghost".into(),
//!     }]
//! );
//! # Ok::<(), the_junction::errors::ConfigError>(())
//! ```

use crate::config::Config;
use crate::errors::ValidationError;
use crate::observability::messages::validation::{
    ValidationCompleted, ValidationFailed, ValidationIssue, ValidationStarted,
};
use crate::observability::messages::StructuredLog;
use crate::routing::{ErrorKind, KindHierarchy, Topology};

/// Build the kind hierarchy declared by `cfg`.
pub fn build_kind_hierarchy(cfg: &Config) -> Result<KindHierarchy, Vec<ValidationError>> {
    KindHierarchy::from_declarations(cfg.error_kinds.iter().map(|declared| {
        let parent = declared
            .parent
            .as_deref()
            .map(ErrorKind::new)
            .unwrap_or_else(ErrorKind::root);
        (declared.kind.as_str(), parent)
    }))
}

/// Build the immutable routing topology declared by `cfg`.
pub fn build_topology(cfg: &Config) -> Result<Topology, Vec<ValidationError>> {
    let kinds = build_kind_hierarchy(cfg)?;

    let mut builder = Topology::builder(kinds);
    for producer in &cfg.producers {
        builder = builder.producer(producer.id.as_str());
    }
    for node in &cfg.nodes {
        builder = builder.node(node.id.as_str());
    }
    builder = builder.pipeline(cfg.pipeline.iter().cloned());
    for (origin, routes) in &cfg.routes {
        builder = builder
            .output(origin, routes.output.iter().cloned())
            .discard(origin, routes.discard.iter().cloned());
        for rule in &routes.errors {
            builder = builder.error(origin, rule.kind.as_str(), rule.to.iter().cloned());
        }
    }
    builder
        .default_error(cfg.default_error_routes.iter().cloned())
        .build()
}

/// Validate `cfg`, logging each problem found.
///
/// Beyond the topology checks, a configuration must declare at least one
/// producer.
pub fn validate_config(cfg: &Config) -> Result<(), Vec<ValidationError>> {
    ValidationStarted {
        producer_count: cfg.producers.len(),
        node_count: cfg.nodes.len(),
    }
    .log();

    let mut errors = Vec::new();
    if cfg.producers.is_empty() {
        errors.push(ValidationError::NoProducers);
    }
    if let Err(topology_errors) = build_topology(cfg) {
        errors.extend(topology_errors);
    }

    if errors.is_empty() {
        ValidationCompleted {
            producer_count: cfg.producers.len(),
            node_count: cfg.nodes.len(),
        }
        .log();
        return Ok(());
    }

    for error in &errors {
        ValidationIssue { error }.log();
    }
    ValidationFailed {
        error_count: errors.len(),
    }
    .log();
    Err(errors)
}
