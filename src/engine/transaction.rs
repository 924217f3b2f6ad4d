// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Transaction boundary around the traversal of one top-level message.
//!
//! The coordinator owns no resources itself: nodes and producers enlist theirs
//! while the router walks the topology, and the router commits or rolls back
//! once the walk is over.

use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::errors::TransactionError;
use crate::observability::messages::engine::{
    ResourceCommitFailed, ResourceEnlisted, ResourceRollbackFailed, TransactionCommitted,
    TransactionRolledBack,
};
use crate::observability::messages::StructuredLog;
use crate::traits::TransactionalResource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    NotStarted,
    Active,
    Committing,
    Committed,
    RolledBack,
}

impl TransactionState {
    pub fn is_finished(&self) -> bool {
        matches!(self, TransactionState::Committed | TransactionState::RolledBack)
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionState::NotStarted => "NOT_STARTED",
            TransactionState::Active => "ACTIVE",
            TransactionState::Committing => "COMMITTING",
            TransactionState::Committed => "COMMITTED",
            TransactionState::RolledBack => "ROLLED_BACK",
        };
        f.write_str(name)
    }
}

#[derive(Clone)]
struct Enlisted {
    resource: Arc<dyn TransactionalResource>,
    delisted: bool,
}

struct TransactionInner {
    state: TransactionState,
    resources: Vec<Enlisted>,
}

/// One unit of work's set of enlisted resources.
pub struct Transaction {
    id: u64,
    inner: Mutex<TransactionInner>,
}

impl Transaction {
    fn new(id: u64) -> Self {
        Self {
            id,
            inner: Mutex::new(TransactionInner {
                state: TransactionState::NotStarted,
                resources: Vec::new(),
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> TransactionState {
        self.lock().state
    }

    pub fn enlisted_count(&self) -> usize {
        self.lock().resources.len()
    }

    // never held across an await
    fn lock(&self) -> MutexGuard<'_, TransactionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_state(&self, state: TransactionState) {
        self.lock().state = state;
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("Transaction")
            .field("id", &self.id)
            .field("state", &inner.state)
            .field(
                "resources",
                &inner
                    .resources
                    .iter()
                    .map(|e| e.resource.name().to_string())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

fn same_resource(a: &Arc<dyn TransactionalResource>, b: &Arc<dyn TransactionalResource>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Hands out transactions and drives their resources through commit or rollback.
#[derive(Debug)]
pub struct TransactionCoordinator {
    next_id: AtomicU64,
}

impl TransactionCoordinator {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
        }
    }

    /// A new ACTIVE transaction.
    pub fn begin(&self) -> Arc<Transaction> {
        let transaction = Transaction::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        transaction.set_state(TransactionState::Active);
        Arc::new(transaction)
    }

    /// Enlist `resource`, calling its `begin` the first time it is seen.
    ///
    /// Enlisting the same resource again is a no-op.
    pub async fn enlist(
        &self,
        transaction: &Transaction,
        resource: Arc<dyn TransactionalResource>,
    ) -> Result<(), TransactionError> {
        {
            let mut inner = transaction.lock();
            if inner.state != TransactionState::Active {
                return Err(TransactionError::EnlistAfterCompletion {
                    transaction_id: transaction.id,
                    resource: resource.name().to_string(),
                    state: inner.state,
                });
            }
            if inner
                .resources
                .iter()
                .any(|e| same_resource(&e.resource, &resource))
            {
                return Ok(());
            }
            inner.resources.push(Enlisted {
                resource: Arc::clone(&resource),
                delisted: false,
            });
        }

        if let Err(source) = resource.begin().await {
            transaction
                .lock()
                .resources
                .retain(|e| !same_resource(&e.resource, &resource));
            return Err(TransactionError::BeginFailed {
                transaction_id: transaction.id,
                resource: resource.name().to_string(),
                source,
            });
        }

        ResourceEnlisted {
            transaction_id: transaction.id,
            resource: resource.name(),
        }
        .log();
        Ok(())
    }

    /// Mark `resource` as done with its work in this transaction.
    pub fn delist_for_commit(
        &self,
        transaction: &Transaction,
        resource: &Arc<dyn TransactionalResource>,
    ) -> Result<(), TransactionError> {
        let mut inner = transaction.lock();
        match inner
            .resources
            .iter_mut()
            .find(|e| same_resource(&e.resource, resource))
        {
            Some(enlisted) => {
                enlisted.delisted = true;
                Ok(())
            }
            None => Err(TransactionError::NotEnlisted {
                transaction_id: transaction.id,
                resource: resource.name().to_string(),
            }),
        }
    }

    /// Commit every resource in enlistment order.
    ///
    /// The first failure stops the commit and rolls back every enlisted
    /// resource. A resource that was never delisted fails the commit before any
    /// resource is committed.
    pub async fn commit(&self, transaction: &Transaction) -> Result<(), TransactionError> {
        let resources = {
            let mut inner = transaction.lock();
            if inner.state != TransactionState::Active {
                return Err(TransactionError::InvalidState {
                    transaction_id: transaction.id,
                    operation: "commit",
                    state: inner.state,
                });
            }
            inner.state = TransactionState::Committing;
            inner.resources.clone()
        };

        if let Some(pending) = resources.iter().find(|e| !e.delisted) {
            let error = TransactionError::NotDelisted {
                transaction_id: transaction.id,
                resource: pending.resource.name().to_string(),
            };
            self.rollback_all(transaction, &resources, &error).await;
            return Err(error);
        }

        for enlisted in &resources {
            if let Err(source) = enlisted.resource.commit().await {
                ResourceCommitFailed {
                    transaction_id: transaction.id,
                    resource: enlisted.resource.name(),
                    error: &source,
                }
                .log();
                let error = TransactionError::CommitFailed {
                    transaction_id: transaction.id,
                    resource: enlisted.resource.name().to_string(),
                    source,
                };
                self.rollback_all(transaction, &resources, &error).await;
                return Err(error);
            }
        }

        transaction.set_state(TransactionState::Committed);
        TransactionCommitted {
            transaction_id: transaction.id,
            resource_count: resources.len(),
        }
        .log();
        Ok(())
    }

    /// Roll back every enlisted resource, passing `cause`. Never fails.
    pub async fn rollback(&self, transaction: &Transaction, cause: &(dyn Error + Send + Sync)) {
        let resources = {
            let mut inner = transaction.lock();
            if inner.state.is_finished() {
                return;
            }
            inner.state = TransactionState::Committing;
            inner.resources.clone()
        };
        self.rollback_all(transaction, &resources, cause).await;
    }

    async fn rollback_all(
        &self,
        transaction: &Transaction,
        resources: &[Enlisted],
        cause: &(dyn Error + Send + Sync),
    ) {
        for enlisted in resources {
            if let Err(error) = enlisted.resource.rollback(cause).await {
                ResourceRollbackFailed {
                    transaction_id: transaction.id,
                    resource: enlisted.resource.name(),
                    error: &error,
                }
                .log();
            }
        }
        transaction.set_state(TransactionState::RolledBack);
        TransactionRolledBack {
            transaction_id: transaction.id,
            resource_count: resources.len(),
            cause,
        }
        .log();
    }
}

impl Default for TransactionCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::RecordingResource;
    use crate::errors::ProcessingError;

    fn as_resource(resource: &Arc<RecordingResource>) -> Arc<dyn TransactionalResource> {
        Arc::clone(resource) as Arc<dyn TransactionalResource>
    }

    #[tokio::test]
    async fn test_commit_in_enlistment_order() {
        let coordinator = TransactionCoordinator::new();
        let journal = RecordingResource::journal();
        let a = Arc::new(RecordingResource::new("a", journal.clone()));
        let b = Arc::new(RecordingResource::new("b", journal.clone()));

        let tx = coordinator.begin();
        assert_eq!(tx.state(), TransactionState::Active);

        coordinator.enlist(&tx, as_resource(&a)).await.unwrap();
        coordinator.enlist(&tx, as_resource(&b)).await.unwrap();
        coordinator.delist_for_commit(&tx, &as_resource(&b)).unwrap();
        coordinator.delist_for_commit(&tx, &as_resource(&a)).unwrap();
        coordinator.commit(&tx).await.unwrap();

        assert_eq!(tx.state(), TransactionState::Committed);
        assert_eq!(
            RecordingResource::entries(&journal),
            vec!["begin:a", "begin:b", "commit:a", "commit:b"]
        );
    }

    #[tokio::test]
    async fn test_enlist_is_idempotent() {
        let coordinator = TransactionCoordinator::new();
        let journal = RecordingResource::journal();
        let a = Arc::new(RecordingResource::new("a", journal.clone()));

        let tx = coordinator.begin();
        coordinator.enlist(&tx, as_resource(&a)).await.unwrap();
        coordinator.enlist(&tx, as_resource(&a)).await.unwrap();

        assert_eq!(tx.enlisted_count(), 1);
        assert_eq!(RecordingResource::entries(&journal), vec!["begin:a"]);
    }

    #[tokio::test]
    async fn test_commit_failure_rolls_back_everything() {
        let coordinator = TransactionCoordinator::new();
        let journal = RecordingResource::journal();
        let a = Arc::new(RecordingResource::new("a", journal.clone()));
        let b = Arc::new(RecordingResource::new("b", journal.clone()).failing_commit());
        let c = Arc::new(RecordingResource::new("c", journal.clone()));

        let tx = coordinator.begin();
        for resource in [&a, &b, &c] {
            coordinator.enlist(&tx, as_resource(resource)).await.unwrap();
            coordinator.delist_for_commit(&tx, &as_resource(resource)).unwrap();
        }

        let err = coordinator.commit(&tx).await.unwrap_err();

        assert!(matches!(err, TransactionError::CommitFailed { ref resource, .. } if resource == "b"));
        assert_eq!(tx.state(), TransactionState::RolledBack);
        let entries = RecordingResource::entries(&journal);
        assert!(!entries.contains(&"commit:c".to_string()), "no commit after the first failure");
        assert!(entries.ends_with(&[
            "rollback:a".to_string(),
            "rollback:b".to_string(),
            "rollback:c".to_string()
        ]));
    }

    #[tokio::test]
    async fn test_commit_with_undelisted_resource_rolls_back() {
        let coordinator = TransactionCoordinator::new();
        let journal = RecordingResource::journal();
        let a = Arc::new(RecordingResource::new("a", journal.clone()));

        let tx = coordinator.begin();
        coordinator.enlist(&tx, as_resource(&a)).await.unwrap();

        let err = coordinator.commit(&tx).await.unwrap_err();

        assert!(matches!(err, TransactionError::NotDelisted { .. }));
        assert_eq!(RecordingResource::entries(&journal), vec!["begin:a", "rollback:a"]);
    }

    #[tokio::test]
    async fn test_enlist_after_completion_is_rejected() {
        let coordinator = TransactionCoordinator::new();
        let journal = RecordingResource::journal();
        let late = Arc::new(RecordingResource::new("late", journal.clone()));

        let tx = coordinator.begin();
        coordinator.commit(&tx).await.unwrap();

        let err = coordinator.enlist(&tx, as_resource(&late)).await.unwrap_err();
        assert_eq!(
            err,
            TransactionError::EnlistAfterCompletion {
                transaction_id: tx.id(),
                resource: "late".into(),
                state: TransactionState::Committed,
            }
        );
        assert!(RecordingResource::entries(&journal).is_empty());
    }

    #[tokio::test]
    async fn test_rollback_passes_cause_and_never_raises() {
        let coordinator = TransactionCoordinator::new();
        let journal = RecordingResource::journal();
        let a = Arc::new(RecordingResource::new("a", journal.clone()).failing_rollback());
        let b = Arc::new(RecordingResource::new("b", journal.clone()));

        let tx = coordinator.begin();
        coordinator.enlist(&tx, as_resource(&a)).await.unwrap();
        coordinator.enlist(&tx, as_resource(&b)).await.unwrap();

        let cause = ProcessingError::connection("sink offline");
        coordinator.rollback(&tx, &cause).await;
        coordinator.rollback(&tx, &cause).await;

        assert_eq!(tx.state(), TransactionState::RolledBack);
        assert_eq!(
            RecordingResource::entries(&journal),
            vec!["begin:a", "begin:b", "rollback:a", "rollback:b"]
        );
        assert_eq!(b.last_cause().as_deref(), Some("connection error: sink offline"));
    }

    #[tokio::test]
    async fn test_failed_begin_leaves_resource_unenlisted() {
        let coordinator = TransactionCoordinator::new();
        let journal = RecordingResource::journal();
        let a = Arc::new(RecordingResource::new("a", journal.clone()).failing_begin());

        let tx = coordinator.begin();
        let err = coordinator.enlist(&tx, as_resource(&a)).await.unwrap_err();

        assert!(matches!(err, TransactionError::BeginFailed { .. }));
        assert_eq!(tx.enlisted_count(), 0);
        assert!(matches!(
            coordinator.delist_for_commit(&tx, &as_resource(&a)),
            Err(TransactionError::NotEnlisted { .. })
        ));
    }
}
