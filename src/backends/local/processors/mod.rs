// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod change_text_case;
pub mod pattern_match;
pub mod reverse_text;
pub mod step_group;

pub use change_text_case::*;
pub use pattern_match::*;
pub use reverse_text::*;
pub use step_group::*;
