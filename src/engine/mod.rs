// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod adaptor;
pub mod handoff;
pub mod lifecycle;
pub mod node;
pub mod registry;
pub mod router;
pub mod transaction;
pub mod worker;
#[cfg(test)]
pub mod integration_tests;

pub use adaptor::{Adaptor, AdaptorReport, RunOptions, WorkerFailure};
pub use handoff::{HandoffError, HandoffQueue, QueueResource};
pub use lifecycle::{ComponentState, LifecycleState};
pub use node::{Enrichment, Node, NodeRole};
pub use registry::{ComponentRegistry, NodeMap};
pub use router::{Router, TerminalBatch, TerminalResults, TransactionOutcome};
pub use transaction::{Transaction, TransactionCoordinator, TransactionState};
pub use worker::{ProducerHandle, RestartPolicy, Worker, WorkerExit};
