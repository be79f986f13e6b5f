//! paxly.yaml manifest parsing, validation and serialization

mod edit;

use camino::Utf8Path;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::ConfigResult;
use paxly_core::error::PaxlyError;
use paxly_core::types::{Dependency, Version};

/// Complete paxly.yaml manifest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Project metadata
    pub project: ProjectSection,

    /// Named environments, in file order
    #[serde(default)]
    pub environments: IndexMap<String, EnvironmentSection>,

    /// Trusted source registries per language
    #[serde(default)]
    pub trusted_sources: IndexMap<String, Vec<String>>,
}

/// Project metadata section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSection {
    /// Project name (required)
    pub name: String,

    /// Project version (required)
    pub version: Version,

    /// Project description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Authors
    #[serde(default)]
    pub authors: Vec<Author>,
}

/// Project author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    pub email: String,
}

/// Dependency lists of one environment, keyed by language
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentSection {
    #[serde(default)]
    pub dependencies: IndexMap<String, Vec<Dependency>>,
}

/// Environments every new manifest starts with
pub const DEFAULT_ENVIRONMENTS: [&str; 2] = ["development", "production"];

/// Registries trusted by default, per language
pub const DEFAULT_TRUSTED_SOURCES: [(&str, &str); 4] = [
    ("python", "https://pypi.org/simple"),
    ("javascript", "https://registry.npmjs.org/"),
    ("go", "https://proxy.golang.org/"),
    ("rust", "https://crates.io/"),
];

impl Manifest {
    /// Build a fresh manifest for `paxly init`
    pub fn init(
        name: &str,
        version: &str,
        description: Option<String>,
        authors: &[String],
    ) -> ConfigResult<Self> {
        if name.trim().is_empty() {
            return Err(PaxlyError::validation("project.name", "Project name is required"));
        }

        let version = Version::parse(version)
            .map_err(|e| PaxlyError::validation("project.version", e.to_string()))?;

        let authors = authors
            .iter()
            .map(|raw| parse_author(raw))
            .collect::<ConfigResult<Vec<_>>>()?;

        let environments = DEFAULT_ENVIRONMENTS
            .iter()
            .map(|env| (env.to_string(), EnvironmentSection::default()))
            .collect();

        let trusted_sources = DEFAULT_TRUSTED_SOURCES
            .iter()
            .map(|(language, url)| (language.to_string(), vec![url.to_string()]))
            .collect();

        let manifest = Self {
            project: ProjectSection {
                name: name.trim().to_string(),
                version,
                description: description.filter(|d| !d.trim().is_empty()),
                authors,
            },
            environments,
            trusted_sources,
        };

        validate_manifest(&manifest)?;
        Ok(manifest)
    }

    /// Parse and validate YAML content
    pub fn parse(content: &str) -> ConfigResult<Self> {
        parse_manifest(content)
    }

    pub fn to_yaml(&self) -> ConfigResult<String> {
        serialize_manifest(self)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        validate_manifest(self)
    }

    /// Load a manifest from disk
    pub async fn load(path: &Utf8Path) -> ConfigResult<Self> {
        load_from_file(path).await
    }

    /// Write the manifest back to disk
    pub async fn save(&self, path: &Utf8Path) -> ConfigResult<()> {
        save_to_file(self, path).await
    }

    /// Look up an environment by name
    pub fn environment(&self, name: &str) -> Option<&EnvironmentSection> {
        self.environments.get(name)
    }

    /// Environment names in manifest order
    pub fn environment_names(&self) -> impl Iterator<Item = &str> {
        self.environments.keys().map(String::as_str)
    }
}

impl EnvironmentSection {
    /// Every `(language, declaration)` pair, in manifest order
    pub fn declarations(&self) -> impl Iterator<Item = (&str, &Dependency)> {
        self.dependencies
            .iter()
            .flat_map(|(language, deps)| deps.iter().map(move |dep| (language.as_str(), dep)))
    }

    /// Languages referenced by this environment, in manifest order
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.dependencies.keys().map(String::as_str)
    }

    /// Total number of declarations
    pub fn len(&self) -> usize {
        self.dependencies.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Parse an author written as `Name <email>`
pub fn parse_author(raw: &str) -> ConfigResult<Author> {
    let invalid = || PaxlyError::validation("project.authors", format!("Invalid author '{}', expected 'Name <email>'", raw));

    let trimmed = raw.trim();
    let without_close = trimmed.strip_suffix('>').ok_or_else(invalid)?;
    let (name, email) = without_close.rsplit_once('<').ok_or_else(invalid)?;

    let author = Author {
        name: name.trim().to_string(),
        email: email.trim().to_string(),
    };
    validate_author(&author)?;
    Ok(author)
}

/// Parse YAML manifest content
pub fn parse_manifest(content: &str) -> ConfigResult<Manifest> {
    let manifest: Manifest = serde_yaml::from_str(content).map_err(|e| PaxlyError::ManifestParse {
        path: crate::loader::MANIFEST_FILE.to_string(),
        message: e.to_string(),
    })?;

    validate_manifest(&manifest)?;

    Ok(manifest)
}

/// Serialize a manifest to YAML
pub fn serialize_manifest(manifest: &Manifest) -> ConfigResult<String> {
    serde_yaml::to_string(manifest).map_err(|e| PaxlyError::ManifestParse {
        path: crate::loader::MANIFEST_FILE.to_string(),
        message: format!("YAML serialization error: {}", e),
    })
}

/// Validate what the resolver relies on: names, uniqueness, constraints, sources
pub fn validate_manifest(manifest: &Manifest) -> ConfigResult<()> {
    if manifest.project.name.trim().is_empty() {
        return Err(PaxlyError::validation("project.name", "Project name is required"));
    }

    for author in &manifest.project.authors {
        validate_author(author)?;
    }

    for (env_name, env) in &manifest.environments {
        for (language, deps) in &env.dependencies {
            if language.trim().is_empty() {
                return Err(PaxlyError::validation(
                    format!("environments.{}.dependencies", env_name),
                    "Language key must not be empty",
                ));
            }

            let mut seen = HashSet::new();
            for dep in deps {
                let field = format!("environments.{}.dependencies.{}", env_name, language);

                if dep.name.trim().is_empty() {
                    return Err(PaxlyError::validation(field, "Dependency name must not be empty"));
                }

                if !seen.insert(dep.name.as_str()) {
                    return Err(PaxlyError::DuplicateDependency {
                        environment: env_name.clone(),
                        language: language.clone(),
                        name: dep.name.clone(),
                    });
                }

                dep.parse_constraint()
                    .map_err(|e| PaxlyError::validation(format!("{}.{}", field, dep.name), e.to_string()))?;
            }
        }
    }

    for (language, sources) in &manifest.trusted_sources {
        for source in sources {
            let parsed = url::Url::parse(source).map_err(|e| {
                PaxlyError::validation(format!("trusted_sources.{}", language), format!("'{}' is not a valid URL: {}", source, e))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") || parsed.host().is_none() {
                return Err(PaxlyError::validation(
                    format!("trusted_sources.{}", language),
                    format!("'{}' must be an http(s) URL", source),
                ));
            }
        }
    }

    Ok(())
}

fn validate_author(author: &Author) -> ConfigResult<()> {
    if author.name.is_empty() {
        return Err(PaxlyError::validation("project.authors", "Author name is required"));
    }

    let valid_email = author
        .email
        .split_once('@')
        .map(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.starts_with('.'))
        .unwrap_or(false);
    if !valid_email {
        return Err(PaxlyError::validation(
            "project.authors",
            format!("Invalid email '{}' for author '{}'", author.email, author.name),
        ));
    }

    Ok(())
}

/// Load and parse a manifest file
pub async fn load_from_file(path: &Utf8Path) -> ConfigResult<Manifest> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PaxlyError::ManifestNotFound { path: path.to_string() }
        } else {
            PaxlyError::io(format!("Failed to read {}", path), e)
        }
    })?;

    debug!("Loaded manifest from {}", path);

    parse_manifest(&content).map_err(|e| match e {
        PaxlyError::ManifestParse { message, .. } => PaxlyError::ManifestParse {
            path: path.to_string(),
            message,
        },
        other => other,
    })
}

/// Serialize and write a manifest, replacing the existing file
pub async fn save_to_file(manifest: &Manifest, path: &Utf8Path) -> ConfigResult<()> {
    let content = serialize_manifest(manifest)?;
    tokio::fs::write(path, content)
        .await
        .map_err(|e| PaxlyError::io(format!("Failed to write {}", path), e))?;
    debug!("Saved manifest to {}", path);
    Ok(())
}

/// Write a new manifest, refusing to overwrite an existing one
pub async fn create_file(manifest: &Manifest, path: &Utf8Path) -> ConfigResult<()> {
    let content = serialize_manifest(manifest)?;

    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                PaxlyError::ManifestExists { path: path.to_string() }
            } else {
                PaxlyError::io(format!("Failed to create {}", path), e)
            }
        })?;

    file.write_all(content.as_bytes())
        .await
        .map_err(|e| PaxlyError::io(format!("Failed to write {}", path), e))?;
    file.flush()
        .await
        .map_err(|e| PaxlyError::io(format!("Failed to write {}", path), e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    pub(crate) const SAMPLE: &str = r#"
project:
  name: TestProject
  version: 1.0.0
  description: A test project
  authors:
    - name: John Doe
      email: john.doe@example.com
environments:
  development:
    dependencies:
      python:
        - name: requests
          version: ^2.28
      javascript:
        - name: express
          version: ^4.17.1
  production:
    dependencies:
      go:
        - name: github.com/gin-gonic/gin
          version: ^1.7.4
      rust:
        - name: serde
          version: ^1.0
trusted_sources:
  python:
    - https://pypi.org/simple
  javascript:
    - https://registry.npmjs.org/
"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = parse_manifest(SAMPLE).unwrap();
        assert_eq!(manifest.project.name, "TestProject");
        assert_eq!(manifest.project.version, Version::new(1, 0, 0));
        assert_eq!(manifest.project.authors[0].email, "john.doe@example.com");

        let dev = manifest.environment("development").unwrap();
        assert_eq!(dev.len(), 2);
        assert_eq!(dev.languages().collect::<Vec<_>>(), vec!["python", "javascript"]);
    }

    #[test]
    fn test_declarations_follow_file_order() {
        let manifest = parse_manifest(SAMPLE).unwrap();
        let prod = manifest.environment("production").unwrap();
        let order: Vec<_> = prod.declarations().map(|(lang, dep)| (lang, dep.name.as_str())).collect();
        assert_eq!(order, vec![("go", "github.com/gin-gonic/gin"), ("rust", "serde")]);
        assert_eq!(manifest.environment_names().collect::<Vec<_>>(), vec!["development", "production"]);
    }

    #[test]
    fn test_missing_project_name() {
        let yaml = "project:\n  name: ''\n  version: 1.0.0\n";
        assert!(matches!(parse_manifest(yaml), Err(PaxlyError::ConfigValidation { .. })));
    }

    #[test]
    fn test_invalid_project_version() {
        let yaml = "project:\n  name: demo\n  version: invalid_version\n";
        assert!(matches!(parse_manifest(yaml), Err(PaxlyError::ManifestParse { .. })));
    }

    #[test]
    fn test_invalid_author_email() {
        let yaml = "project:\n  name: demo\n  version: 1.0.0\n  authors:\n    - name: John\n      email: invalid-email\n";
        assert!(matches!(parse_manifest(yaml), Err(PaxlyError::ConfigValidation { .. })));
    }

    #[test]
    fn test_invalid_trusted_source() {
        let yaml = "project:\n  name: demo\n  version: 1.0.0\ntrusted_sources:\n  python:\n    - invalid-url\n";
        assert!(matches!(parse_manifest(yaml), Err(PaxlyError::ConfigValidation { .. })));
    }

    #[test]
    fn test_invalid_constraint_rejected() {
        let yaml = r#"
project: {name: demo, version: 1.0.0}
environments:
  development:
    dependencies:
      python:
        - {name: requests, version: invalid_version}
"#;
        match parse_manifest(yaml) {
            Err(PaxlyError::ConfigValidation { field, .. }) => {
                assert_eq!(field, "environments.development.dependencies.python.requests");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_dependency_rejected() {
        let yaml = r#"
project: {name: demo, version: 1.0.0}
environments:
  development:
    dependencies:
      python:
        - {name: requests, version: ^2.28}
        - {name: requests, version: ^2.30}
"#;
        assert!(matches!(parse_manifest(yaml), Err(PaxlyError::DuplicateDependency { .. })));
    }

    #[test]
    fn test_same_name_in_other_language_allowed() {
        let yaml = r#"
project: {name: demo, version: 1.0.0}
environments:
  development:
    dependencies:
      python: [{name: shared, version: ^1.0}]
      javascript: [{name: shared, version: ^2.0}]
"#;
        assert!(parse_manifest(yaml).is_ok());
    }

    #[test]
    fn test_round_trip_serialization() {
        let manifest = parse_manifest(SAMPLE).unwrap();
        let serialized = serialize_manifest(&manifest).unwrap();
        let reparsed = parse_manifest(&serialized).unwrap();
        assert_eq!(manifest, reparsed);
    }

    #[test]
    fn test_init_defaults() {
        let manifest = Manifest::init(
            "demo",
            "1.0.0",
            Some("A demo".to_string()),
            &["Jane Roe <jane@example.com>".to_string()],
        )
        .unwrap();

        assert_eq!(manifest.environment_names().collect::<Vec<_>>(), DEFAULT_ENVIRONMENTS.to_vec());
        assert_eq!(manifest.trusted_sources.len(), 4);
        assert_eq!(manifest.project.authors[0].name, "Jane Roe");
        assert!(manifest.environment("development").unwrap().is_empty());
    }

    #[test]
    fn test_init_rejects_bad_input() {
        assert!(Manifest::init("", "1.0.0", None, &[]).is_err());
        assert!(Manifest::init("demo", "1.0", None, &[]).is_err());
        assert!(Manifest::init("demo", "1.0.0", None, &["no email".to_string()]).is_err());
    }

    #[test]
    fn test_parse_author() {
        let author = parse_author("John Doe <john@example.com>").unwrap();
        assert_eq!(author, Author { name: "John Doe".to_string(), email: "john@example.com".to_string() });
        assert!(parse_author("<john@example.com>").is_err());
        assert!(parse_author("John <not-an-email>").is_err());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().join("paxly.yaml")).unwrap();

        let manifest = parse_manifest(SAMPLE).unwrap();
        save_to_file(&manifest, &path).await.unwrap();
        let loaded = load_from_file(&path).await.unwrap();

        assert_eq!(manifest, loaded);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().join("paxly.yaml")).unwrap();
        assert!(matches!(load_from_file(&path).await, Err(PaxlyError::ManifestNotFound { .. })));
    }

    #[tokio::test]
    async fn test_create_refuses_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(temp_dir.path().join("paxly.yaml")).unwrap();

        let manifest = Manifest::init("demo", "1.0.0", None, &[]).unwrap();
        create_file(&manifest, &path).await.unwrap();
        assert!(matches!(create_file(&manifest, &path).await, Err(PaxlyError::ManifestExists { .. })));
    }
}
