// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::backends::local::LocalComponentFactory;
use crate::config::Config;
use crate::engine::{ComponentRegistry, NodeMap};
use crate::errors::ComponentMapError;

/// Resolves producers and nodes from config into runtime instances.
///
/// Fails on the first entry whose implementation cannot be created.
pub fn build_registry(cfg: &Config) -> Result<ComponentRegistry, ComponentMapError> {
    let mut nodes = NodeMap::new();
    for node in &cfg.nodes {
        nodes.insert(LocalComponentFactory::create_node(node)?);
    }

    let producers = cfg
        .producers
        .iter()
        .map(|p| LocalComponentFactory::create_producer(p, cfg.run.poll_timeout()))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ComponentRegistry::new(nodes, producers))
}
