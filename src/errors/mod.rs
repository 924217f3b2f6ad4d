// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod adaptor;
mod component_map;
mod config;
mod processing;
mod routing;
mod transaction;

pub use adaptor::{AdaptorError, WorkerError};
pub use component_map::ComponentMapError;
pub use config::{ConfigError, ValidationError};
pub use processing::{ProcessingError, StepFailure};
pub use routing::RoutingFailure;
pub use transaction::TransactionError;
