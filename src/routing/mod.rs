// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Where work goes next.
//!
//! [`KindHierarchy`] holds the specialization tree of error kinds and
//! [`Topology`] maps every node's output, discard and error channels to the
//! nodes that consume them. Both are built once, validated, and then shared
//! read-only by every worker.

pub mod kind_hierarchy;
pub mod topology;

pub use kind_hierarchy::{
    ErrorKind, KindHierarchy, CONNECTION_KIND, DATA_FORMAT_KIND, PROCESSING_KIND, ROOT_KIND,
};
pub use topology::{ErrorRule, NodeRoutes, Topology, TopologyBuilder};
