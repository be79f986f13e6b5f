//! Resolution failures
//!
//! Each variant carries enough context to locate the exact edge that failed:
//! the package, its language, the constraints involved and who required them.

use paxly_core::error::PaxlyError;
use paxly_core::types::VersionError;
use paxly_plugin::PluginError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Fieldless classification of a [`ResolveError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    InvalidConstraint,
    InvalidVersion,
    UnknownLanguage,
    EnvironmentNotFound,
    CyclicDependency,
    VersionConflict,
    NoCompatibleVersion,
    LookupError,
    LookupTimeout,
}

/// Who declared a requirement
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Requirer {
    /// Declared directly in the manifest environment
    Manifest,
    /// Reported as a direct dependency of a resolved package
    Package { name: String, version: String },
}

impl Requirer {
    pub fn package(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::Package {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Name of the requiring package, `None` for the manifest
    pub fn package_name(&self) -> Option<&str> {
        match self {
            Requirer::Manifest => None,
            Requirer::Package { name, .. } => Some(name),
        }
    }

    pub fn is_manifest(&self) -> bool {
        matches!(self, Requirer::Manifest)
    }
}

impl fmt::Display for Requirer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirer::Manifest => write!(f, "the manifest"),
            Requirer::Package { name, version } => write!(f, "{}@{}", name, version),
        }
    }
}

impl Serialize for Requirer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The plugin call that failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Versions,
    Dependencies { version: String },
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::Versions => write!(f, "listing versions"),
            Lookup::Dependencies { version } => write!(f, "listing dependencies of {}", version),
        }
    }
}

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Invalid constraint '{constraint}' on {language} package '{package}' required by {required_by}")]
    InvalidConstraint {
        language: String,
        package: String,
        constraint: String,
        required_by: Requirer,
        #[source]
        source: VersionError,
    },

    #[error("None of the versions published for {language} package '{package}' could be parsed: [{}]", .available.join(", "))]
    InvalidVersion {
        language: String,
        package: String,
        available: Vec<String>,
    },

    #[error("No plugin registered for language '{language}' (needed by '{package}')")]
    UnknownLanguage { language: String, package: String },

    #[error("Environment '{environment}' not found in manifest (available: {})", .available.join(", "))]
    EnvironmentNotFound {
        environment: String,
        available: Vec<String>,
    },

    #[error("Dependency cycle detected: {} (closed by {language} package '{package}')", .path.join(" -> "))]
    CyclicDependency {
        language: String,
        package: String,
        /// Names on the DFS path, starting and ending with `package`
        path: Vec<String>,
    },

    #[error(
        "Version conflict on {language} package '{package}': {resolved} was selected for '{resolved_constraint}' \
         required by {resolved_by}, but {required_by} requires '{constraint}'"
    )]
    VersionConflict {
        language: String,
        package: String,
        resolved: String,
        resolved_constraint: String,
        resolved_by: Requirer,
        constraint: String,
        required_by: Requirer,
    },

    #[error(
        "No version of {language} package '{package}' satisfies '{constraint}' required by {required_by} \
         (available: [{}])",
        .available.join(", ")
    )]
    NoCompatibleVersion {
        language: String,
        package: String,
        constraint: String,
        required_by: Requirer,
        available: Vec<String>,
    },

    #[error("Plugin '{language}' failed {operation} for '{package}'")]
    LookupError {
        language: String,
        package: String,
        operation: Lookup,
        #[source]
        source: PluginError,
    },

    #[error("Plugin '{language}' timed out after {}s {operation} for '{package}'", .timeout.as_secs_f64())]
    LookupTimeout {
        language: String,
        package: String,
        operation: Lookup,
        timeout: Duration,
    },
}

impl ResolveError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResolveError::InvalidConstraint { .. } => ErrorKind::InvalidConstraint,
            ResolveError::InvalidVersion { .. } => ErrorKind::InvalidVersion,
            ResolveError::UnknownLanguage { .. } => ErrorKind::UnknownLanguage,
            ResolveError::EnvironmentNotFound { .. } => ErrorKind::EnvironmentNotFound,
            ResolveError::CyclicDependency { .. } => ErrorKind::CyclicDependency,
            ResolveError::VersionConflict { .. } => ErrorKind::VersionConflict,
            ResolveError::NoCompatibleVersion { .. } => ErrorKind::NoCompatibleVersion,
            ResolveError::LookupError { .. } => ErrorKind::LookupError,
            ResolveError::LookupTimeout { .. } => ErrorKind::LookupTimeout,
        }
    }

    /// The offending package, when there is one
    pub fn package(&self) -> Option<&str> {
        match self {
            ResolveError::EnvironmentNotFound { .. } => None,
            ResolveError::InvalidConstraint { package, .. }
            | ResolveError::InvalidVersion { package, .. }
            | ResolveError::UnknownLanguage { package, .. }
            | ResolveError::CyclicDependency { package, .. }
            | ResolveError::VersionConflict { package, .. }
            | ResolveError::NoCompatibleVersion { package, .. }
            | ResolveError::LookupError { package, .. }
            | ResolveError::LookupTimeout { package, .. } => Some(package),
        }
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        Some(match self.kind() {
            ErrorKind::InvalidConstraint => "Constraints use the caret form ^MAJOR.MINOR[.PATCH], e.g. ^2.28",
            ErrorKind::InvalidVersion => "Check the package name; the registry reported no semantic versions",
            ErrorKind::UnknownLanguage => "Supported languages are python, javascript, rust and go",
            ErrorKind::EnvironmentNotFound => "Check the --env flag against the environments in paxly.yaml",
            ErrorKind::CyclicDependency => "Remove one of the dependencies on the reported path",
            ErrorKind::VersionConflict => "Relax one of the constraints so both accept a common version",
            ErrorKind::NoCompatibleVersion => "Choose a constraint matching one of the available versions",
            ErrorKind::LookupError => "Ensure the ecosystem's package manager is installed and its registry reachable",
            ErrorKind::LookupTimeout => "Raise the limit with --timeout or PAXLY_LOOKUP_TIMEOUT (0 disables it)",
        })
    }
}

impl From<ResolveError> for PaxlyError {
    fn from(err: ResolveError) -> Self {
        PaxlyError::Resolution {
            suggestion: err.suggestion(),
            source: Box::new(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_conflict_message_names_both_sides() {
        let err = ResolveError::VersionConflict {
            language: "python".to_string(),
            package: "c".to_string(),
            resolved: "2.5.0".to_string(),
            resolved_constraint: "^2.0".to_string(),
            resolved_by: Requirer::package("a", "1.0.0"),
            constraint: "^3.0".to_string(),
            required_by: Requirer::package("b", "1.0.0"),
        };

        let message = err.to_string();
        assert!(message.contains("'c'"));
        assert!(message.contains("2.5.0"));
        assert!(message.contains("^2.0") && message.contains("^3.0"));
        assert!(message.contains("a@1.0.0") && message.contains("b@1.0.0"));
        assert_eq!(err.kind(), ErrorKind::VersionConflict);
        assert_eq!(err.package(), Some("c"));
    }

    #[test]
    fn test_cycle_message() {
        let err = ResolveError::CyclicDependency {
            language: "javascript".to_string(),
            package: "a".to_string(),
            path: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Dependency cycle detected: a -> b -> a (closed by javascript package 'a')"
        );
    }

    #[test]
    fn test_into_paxly_error_keeps_suggestion_and_source() {
        let err: PaxlyError = ResolveError::EnvironmentNotFound {
            environment: "staging".to_string(),
            available: vec!["development".to_string()],
        }
        .into();

        assert!(err.suggestion().unwrap().contains("--env"));
        assert!(err.source().unwrap().to_string().contains("staging"));
    }

    #[test]
    fn test_requirer_display() {
        assert_eq!(Requirer::Manifest.to_string(), "the manifest");
        assert_eq!(Requirer::package("flask", "2.0.0").to_string(), "flask@2.0.0");
        assert_eq!(serde_json::to_string(&Requirer::Manifest).unwrap(), "\"the manifest\"");
    }
}
