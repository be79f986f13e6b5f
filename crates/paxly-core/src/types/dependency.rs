//! Dependency declaration type.
//!
//! A declaration is a `(name, constraint)` pair, either written in the manifest
//! or reported by a language plugin as a direct dependency edge.

use super::{Constraint, VersionError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dependency declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    /// Caret constraint string, stored as written
    #[serde(rename = "version")]
    pub constraint: String,
}

impl Dependency {
    /// Create a new declaration
    pub fn new(name: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: constraint.into(),
        }
    }

    /// Parse the declared constraint
    pub fn parse_constraint(&self) -> Result<Constraint, VersionError> {
        Constraint::parse(&self.constraint)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.constraint)
    }
}
