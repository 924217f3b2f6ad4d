// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentState {
    Stopped,
    Started,
    Stopping,
}

impl fmt::Display for ComponentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentState::Stopped => "STOPPED",
            ComponentState::Started => "STARTED",
            ComponentState::Stopping => "STOPPING",
        };
        f.write_str(name)
    }
}

/// Guarded lifecycle of a node, producer or adaptor.
///
/// Transitions only go STOPPED -> STARTED -> STOPPING -> STOPPED. Each guard
/// reports whether it moved the state, so starting something already started
/// (or stopping something already stopped) is a no-op for the caller.
#[derive(Debug)]
pub struct LifecycleState {
    state: Mutex<ComponentState>,
}

impl LifecycleState {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ComponentState::Stopped),
        }
    }

    pub fn current(&self) -> ComponentState {
        *self.lock()
    }

    pub fn is(&self, state: ComponentState) -> bool {
        self.current() == state
    }

    /// STOPPED -> STARTED.
    pub fn try_start(&self) -> bool {
        self.transition(ComponentState::Stopped, ComponentState::Started)
    }

    /// Undo `try_start` when starting failed part way.
    pub fn abort_start(&self) -> bool {
        self.transition(ComponentState::Started, ComponentState::Stopped)
    }

    /// STARTED -> STOPPING.
    pub fn begin_stop(&self) -> bool {
        self.transition(ComponentState::Started, ComponentState::Stopping)
    }

    /// STOPPING -> STOPPED.
    pub fn finish_stop(&self) -> bool {
        self.transition(ComponentState::Stopping, ComponentState::Stopped)
    }

    fn transition(&self, from: ComponentState, to: ComponentState) -> bool {
        let mut state = self.lock();
        if *state != from {
            return false;
        }
        *state = to;
        true
    }

    fn lock(&self) -> MutexGuard<'_, ComponentState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LifecycleState {
    fn default() -> Self {
        Self::new()
    }
}
