// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::message::SharedMetadata;

/// Capability of a node that reads or writes message metadata.
pub trait MetadataAware: Send + Sync {
    /// Called with the message's metadata before the node processes it.
    fn set_metadata(&self, metadata: SharedMetadata);
}
