//! Error message formatting with actionable suggestions.
//!
//! The top-level message comes first, then every error in the source chain,
//! then the suggestion attached to the error if there is one.

use super::colors::ColorSupport;
use paxly_core::error::PaxlyError;
use std::error::Error;

/// Error formatter with suggestions
pub struct ErrorFormatter {
    colors: ColorSupport,
}

impl ErrorFormatter {
    /// Create a new error formatter
    pub fn new() -> Self {
        Self::with_colors(ColorSupport::detect())
    }

    pub fn with_colors(colors: ColorSupport) -> Self {
        Self { colors }
    }

    /// Format an error with its cause chain and suggestion
    pub fn format_error(&self, error: &PaxlyError) -> String {
        let mut output = String::new();

        output.push_str(&self.colors.red("error"));
        output.push_str(": ");
        output.push_str(&error.to_string());
        output.push('\n');

        let mut source = error.source();
        while let Some(err) = source {
            output.push_str(&self.colors.dim("  caused by"));
            output.push_str(": ");
            output.push_str(&err.to_string());
            output.push('\n');
            source = err.source();
        }

        if let Some(suggestion) = error.suggestion() {
            output.push('\n');
            output.push_str(&self.colors.cyan("help"));
            output.push_str(": ");
            output.push_str(suggestion);
            output.push('\n');
        }

        output
    }

}

impl Default for ErrorFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paxly_resolver::{Requirer, ResolveError};

    #[test]
    fn test_resolution_error_shows_cause_and_help() {
        let err: PaxlyError = ResolveError::NoCompatibleVersion {
            language: "python".to_string(),
            package: "x".to_string(),
            constraint: "^5.0".to_string(),
            required_by: Requirer::Manifest,
            available: vec!["1.0.0".to_string(), "2.0.0".to_string()],
        }
        .into();

        let formatted = ErrorFormatter::with_colors(ColorSupport::disabled()).format_error(&err);
        let lines: Vec<_> = formatted.lines().collect();

        assert_eq!(lines[0], "error: Dependency resolution failed");
        assert!(lines[1].starts_with("  caused by: No version of python package 'x' satisfies '^5.0'"));
        assert!(formatted.contains("help: Choose a constraint"));
    }

    #[test]
    fn test_error_without_suggestion() {
        let err = PaxlyError::validation("project.name", "Project name is required");
        let formatted = ErrorFormatter::with_colors(ColorSupport::disabled()).format_error(&err);
        assert_eq!(
            formatted,
            "error: Configuration field 'project.name' is invalid: Project name is required\n"
        );
    }
}
