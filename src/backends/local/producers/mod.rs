// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod queue;
pub mod static_items;

pub use queue::*;
pub use static_items::*;
