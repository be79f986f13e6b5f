//! Locating the project manifest from the working directory

use camino::Utf8PathBuf;
use tracing::debug;

use crate::manifest::{self, Manifest};
use crate::ConfigResult;
use paxly_core::error::PaxlyError;

/// Default manifest file name
pub const MANIFEST_FILE: &str = "paxly.yaml";

/// Finds and loads the project manifest
pub struct ConfigLoader {
    /// Current working directory
    cwd: Utf8PathBuf,
    /// Manifest file name to look for
    manifest_file: String,
}

impl ConfigLoader {
    /// Create a new loader rooted at `cwd`
    pub fn new(cwd: Utf8PathBuf) -> Self {
        Self {
            cwd,
            manifest_file: MANIFEST_FILE.to_string(),
        }
    }

    /// Look for a different manifest file name
    pub fn with_manifest_file(mut self, name: impl Into<String>) -> Self {
        self.manifest_file = name.into();
        self
    }

    /// Find a file in the working directory or one of its parents.
    ///
    /// Returns the path in the working directory when no ancestor has it.
    pub fn resolve_config_path(&self, filename: &str) -> Utf8PathBuf {
        let mut current = Some(self.cwd.as_path());

        while let Some(dir) = current {
            let candidate = dir.join(filename);
            if candidate.exists() {
                return candidate;
            }
            current = dir.parent();
        }

        self.cwd.join(filename)
    }

    /// Path where the manifest is, or would be created
    pub fn manifest_path(&self) -> Utf8PathBuf {
        self.resolve_config_path(&self.manifest_file)
    }

    /// Load the nearest manifest and return it with its path
    pub async fn load_manifest(&self) -> ConfigResult<(Manifest, Utf8PathBuf)> {
        let path = self.manifest_path();
        if !path.exists() {
            return Err(PaxlyError::ManifestNotFound { path: path.to_string() });
        }

        debug!("Using manifest {}", path);
        let manifest = manifest::load_from_file(&path).await?;
        Ok((manifest, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(dir.path().to_path_buf()).unwrap()
    }

    #[tokio::test]
    async fn test_load_from_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = utf8(&temp_dir);
        let nested = root.join("src").join("app");
        std::fs::create_dir_all(&nested).unwrap();

        let manifest = Manifest::init("demo", "1.0.0", None, &[]).unwrap();
        manifest::save_to_file(&manifest, &root.join(MANIFEST_FILE)).await.unwrap();

        let (loaded, path) = ConfigLoader::new(nested).load_manifest().await.unwrap();
        assert_eq!(loaded.project.name, "demo");
        assert_eq!(path, root.join(MANIFEST_FILE));
    }

    #[tokio::test]
    async fn test_missing_manifest() {
        let temp_dir = TempDir::new().unwrap();
        let loader = ConfigLoader::new(utf8(&temp_dir)).with_manifest_file("nothing-here.yaml");
        assert!(matches!(loader.load_manifest().await, Err(PaxlyError::ManifestNotFound { .. })));
    }

    #[test]
    fn test_manifest_path_defaults_to_cwd() {
        let temp_dir = TempDir::new().unwrap();
        let root = utf8(&temp_dir);
        let loader = ConfigLoader::new(root.clone()).with_manifest_file("unlikely-name.yaml");
        assert_eq!(loader.manifest_path(), root.join("unlikely-name.yaml"));
    }
}
