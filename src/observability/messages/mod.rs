// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! * `engine` - traversal, routing and transaction events
//! * `lifecycle` - adaptor and worker lifecycle events
//! * `node` - per-node processing events
//! * `validation` - configuration validation events
//!
//! # Usage Pattern
//!
//! ```rust
//! use the_junction::observability::messages::{engine::TraversalStarted, StructuredLog};
//!
//! let msg = TraversalStarted {
//!     transaction_id: 7,
//!     producer_id: "reader",
//!     item_count: 2,
//! };
//!
//! let span = msg.span("route");
//! let _guard = span.enter();
//! msg.log();
//! ```

use std::fmt::Display;

use tracing::Span;

pub mod engine;
pub mod lifecycle;
pub mod node;
pub mod validation;

/// A log event that knows its own level and structured fields.
pub trait StructuredLog: Display {
    /// Emit the event at its level with its fields attached.
    fn log(&self);

    /// A span carrying the event's fields, for work done on its behalf.
    fn span(&self, name: &str) -> Span;
}
