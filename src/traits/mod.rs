// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod enricher;
pub mod metadata_aware;
pub mod producer;
pub mod resource;
pub mod sink;
pub mod step;

pub use enricher::{Enricher, EnrichmentReader};
pub use metadata_aware::MetadataAware;
pub use producer::Producer;
pub use resource::{Transactional, TransactionalResource};
pub use sink::Sink;
pub use step::{Step, StepResult};
