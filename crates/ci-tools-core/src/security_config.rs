use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

// ---------------------------------------------------------------------------
// SecurityConfig
// ---------------------------------------------------------------------------

/// Security-scanner configuration kept at the root of each repository
/// (`sec-scanners-config.yaml`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(
        rename = "module-name",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub module_name: String,
    /// Container images submitted to the image scanner.
    #[serde(rename = "protecode", default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub whitesource: Whitesource,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Whitesource {
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub subprojects: bool,
    #[serde(default)]
    pub exclude: Vec<String>,
}

impl SecurityConfig {
    pub fn parse<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_yaml::from_reader(reader)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::parse(file)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(path, data.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FULL: &str = "module-name: test-infra
protecode:
  - europe-docker.pkg.dev/kyma-project/prod/image-builder:v20240101
  - europe-docker.pkg.dev/kyma-project/prod/test-infra/ko/clonerefs:v20240101
whitesource:
  language: golang-mod
  subprojects: false
  exclude:
    - \"**/*_test.go\"
    - \"**/test/**\"
";

    #[test]
    fn parses_all_fields() {
        let config = SecurityConfig::parse(FULL.as_bytes()).unwrap();
        assert_eq!(config.module_name, "test-infra");
        assert_eq!(config.images.len(), 2);
        assert_eq!(config.whitesource.language, "golang-mod");
        assert!(!config.whitesource.subprojects);
        assert_eq!(config.whitesource.exclude, vec!["**/*_test.go", "**/test/**"]);
    }

    #[test]
    fn save_and_load_preserves_every_field() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sec-scanners-config.yaml");
        let config = SecurityConfig {
            module_name: "jobguard".to_string(),
            images: vec!["gcr.io/test/jobguard:v1".to_string()],
            whitesource: Whitesource {
                language: "golang-mod".to_string(),
                subprojects: true,
                exclude: vec!["**/vendor/**".to_string()],
            },
        };
        config.save_to_file(&path).unwrap();

        let loaded = SecurityConfig::load(&path).unwrap();
        assert_eq!(loaded, config);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("module-name: jobguard"));
        assert!(raw.contains("protecode:"));
        assert!(raw.contains("subprojects: true"));
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let config = SecurityConfig::parse("module-name: lonely\n".as_bytes()).unwrap();
        assert!(config.images.is_empty());
        assert_eq!(config.whitesource, Whitesource::default());
    }

    #[test]
    fn empty_module_name_is_omitted() {
        let yaml = serde_yaml::to_string(&SecurityConfig::default()).unwrap();
        assert!(!yaml.contains("module-name"));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = SecurityConfig::load(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, crate::error::CiToolsError::Io(_)));
    }
}
