// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

use super::ProcessingError;
use crate::engine::TransactionState;

/// Errors raised by the transaction coordinator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransactionError {
    #[error("cannot enlist resource '{resource}' in transaction {transaction_id}: transaction is {state}")]
    EnlistAfterCompletion {
        transaction_id: u64,
        resource: String,
        state: TransactionState,
    },

    #[error("resource '{resource}' is not enlisted in transaction {transaction_id}")]
    NotEnlisted {
        transaction_id: u64,
        resource: String,
    },

    #[error("resource '{resource}' was never delisted for commit in transaction {transaction_id}")]
    NotDelisted {
        transaction_id: u64,
        resource: String,
    },

    #[error("transaction {transaction_id} cannot {operation} while {state}")]
    InvalidState {
        transaction_id: u64,
        operation: &'static str,
        state: TransactionState,
    },

    #[error("resource '{resource}' failed to begin in transaction {transaction_id}: {source}")]
    BeginFailed {
        transaction_id: u64,
        resource: String,
        #[source]
        source: ProcessingError,
    },

    #[error("resource '{resource}' failed to commit in transaction {transaction_id}: {source}")]
    CommitFailed {
        transaction_id: u64,
        resource: String,
        #[source]
        source: ProcessingError,
    },
}
