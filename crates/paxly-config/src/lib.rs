//! Configuration handling for Paxly
//!
//! This crate owns the project manifest (`paxly.yaml`): loading, validating,
//! editing and saving it. It also layers the tool settings from defaults, the
//! global `~/.paxly/config.toml`, `PAXLY_*` environment variables and CLI flags.

pub mod loader;
pub mod manifest;
pub mod settings;

// Re-export main types
pub use loader::{ConfigLoader, MANIFEST_FILE};
pub use manifest::{Author, EnvironmentSection, Manifest, ProjectSection};
pub use settings::{Settings, SettingsLayering};

use paxly_core::error::PaxlyError;

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, PaxlyError>;
