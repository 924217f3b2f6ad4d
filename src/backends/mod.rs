// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Collaborator implementations for The Junction.
//!
//! Collaborators are the producers, steps and sinks that nodes wrap. The
//! engine only ever sees them through the capability traits in
//! [`crate::traits`], so anything implementing those traits can be wired in.
//!
//! # Available Backends
//!
//! ## Local Backend
//! In-process collaborators, created from configuration by name:
//! - **Steps**: case conversion, reversal, pattern-based discard and reject, step groups
//! - **Sinks**: stdout, in-memory
//! - **Producers**: static item lists, bounded hand-off queue
//! - **Use Case**: demos, tests, embedding the engine in another process
//!
//! ## Stub Backend (Test-Only)
//! Scripted and failing collaborators for engine tests (only available in test builds):
//! - **FailingStep / FailingSink**: raise chosen conditions for chosen items
//! - **RecordingResource**: journals begin, commit and rollback calls
//! - **ScriptedProducer / IdleProducer**: drive workers deterministically
//! - **Note**: NOT available in production builds
//!
//! # Architecture
//!
//! ```text
//! Configuration → LocalComponentFactory → Node / ProducerHandle → Adaptor
//! ```
//!
//! # Examples
//!
//! ```rust
//! use the_junction::backends::local::LocalComponentFactory;
//! use the_junction::config::{NodeConfig, NodeRoleConfig};
//! use std::collections::HashMap;
//!
//! let config = NodeConfig {
//!     id: "uppercase".to_string(),
//!     role: NodeRoleConfig::Step,
//!     impl_: Some("change_text_case_upper".to_string()),
//!     accepts_batches: true,
//!     best_effort: false,
//!     options: HashMap::new(),
//! };
//!
//! let node = LocalComponentFactory::create_node(&config)?;
//! assert_eq!(node.id(), "uppercase");
//! # Ok::<(), the_junction::errors::ComponentMapError>(())
//! ```

pub mod local;
#[cfg(test)]
pub mod stub;
