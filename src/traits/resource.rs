// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::error::Error;
use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::ProcessingError;

/// Something whose work is committed or rolled back with the traversal that used it.
#[async_trait]
pub trait TransactionalResource: Send + Sync {
    /// Name used in logs and transaction errors.
    fn name(&self) -> &str;

    async fn begin(&self) -> Result<(), ProcessingError> {
        Ok(())
    }

    async fn commit(&self) -> Result<(), ProcessingError>;

    async fn rollback(&self, cause: &(dyn Error + Send + Sync)) -> Result<(), ProcessingError>;
}

/// Capability of a node or producer that takes part in transactions.
pub trait Transactional: Send + Sync {
    /// The resource to enlist for the current message, if any.
    fn resource(&self) -> Option<Arc<dyn TransactionalResource>>;
}
