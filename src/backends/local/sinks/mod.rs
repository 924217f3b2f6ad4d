// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod memory;
pub mod stdout;

pub use memory::*;
pub use stdout::*;
