// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::config::{build_registry, build_topology, Config};
use crate::engine::Adaptor;
use crate::errors::ConfigError;

/// Adaptor runtime builder - wires components and routes from configuration.
///
/// The `RuntimeBuilder` coordinates the creation of the component registry
/// and the routing topology, and hands both to a ready-to-run [`Adaptor`].
///
/// # Examples
///
/// ## Building runtime from configuration
/// ```
/// use the_junction::config::{parse_yaml, RuntimeBuilder};
///
/// let config = parse_yaml(r#"
/// producers:
///   - { id: reader, impl_: static_items, options: { items: ["a"] } }
/// nodes:
///   - { id: out, role: sink, impl_: memory }
/// routes:
///   reader: { output: [out] }
/// "#)?;
///
/// let adaptor = RuntimeBuilder::from_config(&config)?;
///
/// // Adaptor is ready to run
/// assert_eq!(adaptor.registry().producers.len(), 1);
/// # Ok::<(), the_junction::errors::ConfigError>(())
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build a complete adaptor from configuration.
    ///
    /// Topology validation errors are all reported together; component
    /// creation stops at the first failure.
    pub fn from_config(cfg: &Config) -> Result<Adaptor, ConfigError> {
        let topology = build_topology(cfg).map_err(ConfigError::Validation)?;
        let registry = build_registry(cfg)?;
        Ok(Adaptor::new(registry, Arc::new(topology), cfg.run.run_options()))
    }
}
