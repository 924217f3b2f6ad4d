// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// How long a worker waits for a producer to yield a batch (milliseconds)
pub const DEFAULT_POLL_TIMEOUT_MS: u64 = 1_000;
/// Pause before a failed worker reconnects its producer (milliseconds)
pub const DEFAULT_RESTART_DELAY_MS: u64 = 1_000;
/// Batch size for producers that do not configure one
pub const DEFAULT_BATCH_SIZE: usize = 10;
/// How long an enrichment node waits for its reader (milliseconds)
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 1_000;
