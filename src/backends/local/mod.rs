// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod enrichment;
pub mod factory;
pub mod processors;
pub mod producers;
pub mod sinks;

pub use enrichment::*;
pub use factory::LocalComponentFactory;
pub use processors::*;
pub use producers::*;
pub use sinks::*;
