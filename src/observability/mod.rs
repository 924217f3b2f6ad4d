// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Every operational event in The Junction is a message struct with a `Display`
//! implementation and a [`StructuredLog`](messages::StructuredLog) implementation.
//! Call sites never format log strings themselves; they build a message and call
//! `log()`, or open a span with `span(name)`.
//!
//! # Architecture
//!
//! Messages are organized by subsystem:
//! * `messages::engine` - traversal, routing and transaction events
//! * `messages::lifecycle` - adaptor and worker lifecycle events
//! * `messages::node` - per-node processing events
//! * `messages::validation` - configuration validation events
//!
//! # Usage
//!
//! ```rust
//! use the_junction::observability::messages::{lifecycle::PollFailed, StructuredLog};
//!
//! let error = std::io::Error::new(std::io::ErrorKind::Other, "socket closed");
//! PollFailed {
//!     producer_id: "reader",
//!     error: &error,
//! }
//! .log();
//! ```

pub mod messages;
