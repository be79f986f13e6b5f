//! Plugin error type and its conversion into `PaxlyError`

use paxly_core::error::PaxlyError;
use thiserror::Error;

/// Failures raised by plugins, the registry and the tools they drive
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Failed to start '{program}'")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with {}: {stderr}", exit_status(.code))]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Could not parse output of '{command}': {message}")]
    Parse { command: String, message: String },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Plugin '{language}' does not support {operation}")]
    Unsupported {
        language: String,
        operation: &'static str,
    },

    #[error("Cannot register plugin for '{language}': {reason}")]
    Registration { language: String, reason: String },

    #[error("Lookup for '{name}' failed: {message}")]
    Lookup { name: String, message: String },
}

fn exit_status(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

impl PluginError {
    pub fn parse(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            command: command.into(),
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Whether retrying the same call could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, PluginError::Network { .. })
    }
}

impl From<PluginError> for PaxlyError {
    fn from(err: PluginError) -> Self {
        match err {
            PluginError::Registration { language, reason } => PaxlyError::PluginRegistration { language, reason },
            PluginError::Unsupported { ref language, .. } => PaxlyError::Plugin {
                language: language.clone(),
                message: err.to_string(),
                source: None,
            },
            other => PaxlyError::Plugin {
                language: "plugin".to_string(),
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failed_display() {
        let err = PluginError::CommandFailed {
            command: "npm view left-pad versions --json".to_string(),
            code: Some(1),
            stderr: "E404".to_string(),
        };
        assert_eq!(err.to_string(), "'npm view left-pad versions --json' exited with status 1: E404");
    }

    #[test]
    fn test_registration_converts_to_registration_error() {
        let err: PaxlyError = PluginError::Registration {
            language: "python".to_string(),
            reason: "already registered".to_string(),
        }
        .into();
        assert!(matches!(err, PaxlyError::PluginRegistration { .. }));
    }

    #[test]
    fn test_unsupported_keeps_language() {
        let err: PaxlyError = PluginError::Unsupported {
            language: "go".to_string(),
            operation: "install",
        }
        .into();
        match err {
            PaxlyError::Plugin { language, .. } => assert_eq!(language, "go"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
