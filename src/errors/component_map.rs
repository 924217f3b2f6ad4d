// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for component registry creation and collaborator instantiation.

use std::error::Error;
use std::fmt;

/// Errors that can occur while turning configuration entries into collaborators
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentMapError {
    /// The entry has no `impl_` field
    MissingImplementation { component_id: String },

    /// No local collaborator is registered under this name
    UnknownImplementation {
        component_id: String,
        impl_name: String,
    },

    /// The implementation exists but its options are unusable
    InvalidOptions {
        component_id: String,
        impl_name: String,
        reason: String,
    },
}

impl fmt::Display for ComponentMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentMapError::MissingImplementation { component_id } => {
                write!(f, "Component '{}' is missing the 'impl_' field", component_id)
            }
            ComponentMapError::UnknownImplementation {
                component_id,
                impl_name,
            } => {
                write!(
                    f,
                    "Unknown implementation '{}' for component '{}'",
                    impl_name, component_id
                )
            }
            ComponentMapError::InvalidOptions {
                component_id,
                impl_name,
                reason,
            } => {
                write!(
                    f,
                    "Failed to create '{}' for component '{}': {}",
                    impl_name, component_id, reason
                )
            }
        }
    }
}

impl Error for ComponentMapError {}
