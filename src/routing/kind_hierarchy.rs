// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

pub const ROOT_KIND: &str = "error";
pub const PROCESSING_KIND: &str = "processing";
pub const DATA_FORMAT_KIND: &str = "data_format";
pub const CONNECTION_KIND: &str = "connection";

/// A named error tag used to match error routes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorKind(String);

impl ErrorKind {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn root() -> Self {
        Self::new(ROOT_KIND)
    }

    pub fn processing() -> Self {
        Self::new(PROCESSING_KIND)
    }

    pub fn data_format() -> Self {
        Self::new(DATA_FORMAT_KIND)
    }

    pub fn connection() -> Self {
        Self::new(CONNECTION_KIND)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == ROOT_KIND
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ErrorKind {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for ErrorKind {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Specialization table of error kinds (kind -> parent).
///
/// The built-in kinds are always present:
///
/// ```text
/// error
/// └── processing
///     ├── data_format
///     └── connection
/// ```
///
/// A kind that was never registered is treated as a direct child of `error`,
/// so a catch-all `error` route still receives it.
///
/// # Example
/// ```
/// use the_junction::routing::{ErrorKind, KindHierarchy};
///
/// let kinds = KindHierarchy::from_declarations([("schema_violation", "data_format")]).unwrap();
///
/// assert!(kinds.is_a(&"schema_violation".into(), &ErrorKind::processing()));
/// assert!(!kinds.is_a(&ErrorKind::connection(), &ErrorKind::data_format()));
/// ```
#[derive(Debug, Clone)]
pub struct KindHierarchy {
    parents: HashMap<ErrorKind, Option<ErrorKind>>,
}

impl KindHierarchy {
    /// Hierarchy holding only the built-in kinds.
    pub fn new() -> Self {
        let mut parents = HashMap::new();
        parents.insert(ErrorKind::root(), None);
        parents.insert(ErrorKind::processing(), Some(ErrorKind::root()));
        parents.insert(ErrorKind::data_format(), Some(ErrorKind::processing()));
        parents.insert(ErrorKind::connection(), Some(ErrorKind::processing()));
        Self { parents }
    }

    /// Extend the built-in kinds with `(kind, parent)` declarations.
    ///
    /// Declarations may appear in any order. Every problem is reported: duplicate
    /// names (including re-declared built-ins), unknown parents and parent cycles.
    pub fn from_declarations<I, K, P>(declarations: I) -> Result<Self, Vec<ValidationError>>
    where
        I: IntoIterator<Item = (K, P)>,
        K: Into<ErrorKind>,
        P: Into<ErrorKind>,
    {
        let mut hierarchy = Self::new();
        let mut errors = Vec::new();
        let mut declared = Vec::new();

        for (kind, parent) in declarations {
            let kind = kind.into();
            if hierarchy.parents.contains_key(&kind) {
                errors.push(ValidationError::DuplicateErrorKind {
                    kind: kind.to_string(),
                });
                continue;
            }
            hierarchy.parents.insert(kind.clone(), Some(parent.into()));
            declared.push(kind);
        }

        for kind in &declared {
            if let Some(Some(parent)) = hierarchy.parents.get(kind) {
                if !hierarchy.parents.contains_key(parent) {
                    errors.push(ValidationError::UnknownParentKind {
                        kind: kind.to_string(),
                        parent: parent.to_string(),
                    });
                }
            }
        }

        let mut reported: HashSet<ErrorKind> = HashSet::new();
        for kind in &declared {
            if let Some(cycle) = hierarchy.find_cycle(kind) {
                if cycle.iter().any(|k| reported.contains(k)) {
                    continue;
                }
                reported.extend(cycle.iter().cloned());
                errors.push(ValidationError::CyclicKindHierarchy {
                    cycle: cycle.iter().map(ToString::to_string).collect(),
                });
            }
        }

        if errors.is_empty() {
            Ok(hierarchy)
        } else {
            Err(errors)
        }
    }

    pub fn contains(&self, kind: &ErrorKind) -> bool {
        self.parents.contains_key(kind)
    }

    /// Parent of `kind`; unknown kinds report the root.
    pub fn parent(&self, kind: &ErrorKind) -> Option<ErrorKind> {
        match self.parents.get(kind) {
            Some(parent) => parent.clone(),
            None if kind.is_root() => None,
            None => Some(ErrorKind::root()),
        }
    }

    /// `kind` followed by each of its ancestors up to the root.
    pub fn ancestors(&self, kind: &ErrorKind) -> Vec<ErrorKind> {
        let mut chain = vec![kind.clone()];
        let mut current = kind.clone();
        // bounded so a malformed table can't loop forever
        for _ in 0..=self.parents.len() {
            match self.parent(&current) {
                Some(parent) if !chain.contains(&parent) => {
                    chain.push(parent.clone());
                    current = parent;
                }
                _ => break,
            }
        }
        chain
    }

    /// True when `kind` equals `ancestor` or specializes it.
    pub fn is_a(&self, kind: &ErrorKind, ancestor: &ErrorKind) -> bool {
        self.ancestors(kind).iter().any(|k| k == ancestor)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &ErrorKind> {
        self.parents.keys()
    }

    fn find_cycle(&self, start: &ErrorKind) -> Option<Vec<ErrorKind>> {
        let mut path = vec![start.clone()];
        let mut current = start.clone();
        while let Some(Some(parent)) = self.parents.get(&current) {
            if let Some(pos) = path.iter().position(|k| k == parent) {
                let mut cycle = path[pos..].to_vec();
                cycle.push(parent.clone());
                return Some(cycle);
            }
            path.push(parent.clone());
            current = parent.clone();
        }
        None
    }
}

impl Default for KindHierarchy {
    fn default() -> Self {
        Self::new()
    }
}
