// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod field_merge;
pub mod lookup_table;

pub use field_merge::*;
pub use lookup_table::*;
