//! Error types and result aliases for Paxly operations.
//!
//! Provides the unified error type surfaced by the CLI, with actionable
//! suggestions. Resolver and plugin crates keep their own structured errors and
//! convert into `PaxlyError` at the boundary.

use crate::types::VersionError;
use thiserror::Error;

/// Unified error type for all Paxly operations
#[derive(Error, Debug)]
pub enum PaxlyError {
    // Manifest and settings errors
    #[error("Failed to parse {path}: {message}")]
    ManifestParse { path: String, message: String },

    #[error("Configuration field '{field}' is invalid: {reason}")]
    ConfigValidation { field: String, reason: String },

    #[error("Manifest not found: {path}")]
    ManifestNotFound { path: String },

    #[error("{path} already exists")]
    ManifestExists { path: String },

    #[error("Environment '{name}' not found in manifest")]
    EnvironmentNotFound { name: String },

    #[error("Dependency '{name}' not found for language '{language}' in environment '{environment}'")]
    DependencyNotFound {
        environment: String,
        language: String,
        name: String,
    },

    #[error("Dependency '{name}' is already declared for language '{language}' in environment '{environment}'")]
    DuplicateDependency {
        environment: String,
        language: String,
        name: String,
    },

    #[error(transparent)]
    Version(#[from] VersionError),

    // Plugin errors
    #[error("Cannot register plugin for '{language}': {reason}")]
    PluginRegistration { language: String, reason: String },

    #[error("No plugin registered for language '{language}'")]
    UnknownLanguage { language: String },

    #[error("Plugin '{language}' failed: {message}")]
    Plugin {
        language: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Resolution errors
    #[error("Dependency resolution failed")]
    Resolution {
        suggestion: Option<&'static str>,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for Paxly operations
pub type PaxlyResult<T> = Result<T, PaxlyError>;

impl PaxlyError {
    /// Create a plugin error from any error type
    pub fn plugin<E>(language: impl Into<String>, message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Plugin {
            language: language.into(),
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an IO error from std::io::Error
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a configuration validation error
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            PaxlyError::ManifestNotFound { .. } => Some("Run 'paxly init --name <project>' to create a manifest"),
            PaxlyError::ManifestExists { .. } => Some("Edit the existing manifest or remove it first"),
            PaxlyError::EnvironmentNotFound { .. } => Some("Check the --env flag against the environments in paxly.yaml"),
            PaxlyError::DependencyNotFound { .. } => Some("Run 'paxly list' to see declared dependencies"),
            PaxlyError::DuplicateDependency { .. } => Some("Use 'paxly update' to change an existing constraint"),
            PaxlyError::Version(VersionError::InvalidConstraint { .. }) => {
                Some("Constraints use the caret form ^MAJOR.MINOR[.PATCH], e.g. ^2.28")
            }
            PaxlyError::UnknownLanguage { .. } => Some("Supported languages are python, javascript, rust and go"),
            PaxlyError::Plugin { .. } => {
                Some("Ensure the ecosystem's package manager is installed and on PATH")
            }
            PaxlyError::Resolution { suggestion, .. } => *suggestion,
            _ => None,
        }
    }
}
