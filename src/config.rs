//! Project configuration
//!
//! A JSON file describing every version a source tree is built for:
//!
//! ```json
//! {
//!   "vcs": "1.20.1",
//!   "constants": { "fabric": true },
//!   "dependencies": { "minecraft": "1.20.1" },
//!   "versions": [
//!     { "version": "1.20.1" },
//!     { "version": "1.19.4", "constants": { "modern": false } }
//!   ]
//! }
//! ```
//!
//! Top-level maps are shared; each version entry overrides them.

use crate::eval::Parameters;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or querying a [`ProjectConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown version: {0}")]
    UnknownVersion(String),

    #[error("Duplicate version: {0}")]
    DuplicateVersion(String),
}

/// Per-version overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionEntry {
    pub version: String,
    #[serde(default)]
    pub constants: FxHashMap<String, bool>,
    #[serde(default)]
    pub swaps: FxHashMap<String, String>,
    #[serde(default)]
    pub dependencies: FxHashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Version the checked-in sources are currently processed for.
    pub vcs: Option<String>,
    pub constants: FxHashMap<String, bool>,
    pub swaps: FxHashMap<String, String>,
    pub dependencies: FxHashMap<String, String>,
    pub versions: Vec<VersionEntry>,
}

impl ProjectConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (idx, entry) in self.versions.iter().enumerate() {
            if self.versions[..idx].iter().any(|e| e.version == entry.version) {
                return Err(ConfigError::DuplicateVersion(entry.version.clone()));
            }
        }
        if let Some(vcs) = &self.vcs {
            self.entry(vcs)?;
        }
        Ok(())
    }

    /// Declared versions, in file order.
    pub fn version_names(&self) -> Vec<&str> {
        self.versions.iter().map(|e| e.version.as_str()).collect()
    }

    /// `vcs` if set, otherwise the first declared version.
    pub fn default_version(&self) -> Option<&str> {
        self.vcs
            .as_deref()
            .or_else(|| self.versions.first().map(|e| e.version.as_str()))
    }

    /// Parameters for `version`, or for the default version when `None`.
    ///
    /// A version that isn't declared is an error unless no versions are declared at all.
    pub fn parameters(&self, version: Option<&str>) -> Result<Parameters, ConfigError> {
        let mut params = Parameters {
            version: None,
            constants: self.constants.clone(),
            swaps: self.swaps.clone(),
            dependencies: self.dependencies.clone(),
        };

        let Some(version) = version.or_else(|| self.default_version()) else {
            return Ok(params);
        };
        params.version = Some(version.to_string());
        if self.versions.is_empty() {
            return Ok(params);
        }

        let entry = self.entry(version)?;
        params.merge(&Parameters {
            version: None,
            constants: entry.constants.clone(),
            swaps: entry.swaps.clone(),
            dependencies: entry.dependencies.clone(),
        });
        Ok(params)
    }

    fn entry(&self, version: &str) -> Result<&VersionEntry, ConfigError> {
        self.versions
            .iter()
            .find(|e| e.version == version)
            .ok_or_else(|| ConfigError::UnknownVersion(version.to_string()))
    }
}

impl std::str::FromStr for ProjectConfig {
    type Err = ConfigError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let config: Self = serde_json::from_str(text).map_err(|source| ConfigError::Json {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"{
        "vcs": "1.20.1",
        "constants": { "fabric": true, "modern": true },
        "dependencies": { "minecraft": "1.20.1" },
        "versions": [
            { "version": "1.20.1" },
            {
                "version": "1.19.4",
                "constants": { "modern": false },
                "swaps": { "call": "legacy();" },
                "dependencies": { "minecraft": "1.19.4" }
            }
        ]
    }"#;

    #[test]
    fn test_default_version_parameters() {
        let config: ProjectConfig = CONFIG.parse().unwrap();
        let params = config.parameters(None).unwrap();
        assert_eq!(params.version.as_deref(), Some("1.20.1"));
        assert_eq!(params.constants.get("modern"), Some(&true));
        assert!(params.swaps.is_empty());
    }

    #[test]
    fn test_version_overrides() {
        let config: ProjectConfig = CONFIG.parse().unwrap();
        let params = config.parameters(Some("1.19.4")).unwrap();
        assert_eq!(params.version.as_deref(), Some("1.19.4"));
        assert_eq!(params.constants.get("fabric"), Some(&true));
        assert_eq!(params.constants.get("modern"), Some(&false));
        assert_eq!(params.swaps.get("call").map(String::as_str), Some("legacy();"));
        assert_eq!(
            params.dependencies.get("minecraft").map(String::as_str),
            Some("1.19.4")
        );
    }

    #[test]
    fn test_unknown_version() {
        let config: ProjectConfig = CONFIG.parse().unwrap();
        let err = config.parameters(Some("1.8.9")).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownVersion(v) if v == "1.8.9"));
    }

    #[test]
    fn test_first_version_is_default_without_vcs() {
        let config: ProjectConfig =
            r#"{"versions": [{"version": "1.18"}, {"version": "1.17"}]}"#.parse().unwrap();
        assert_eq!(config.default_version(), Some("1.18"));
        assert_eq!(config.version_names(), vec!["1.18", "1.17"]);
    }

    #[test]
    fn test_versionless_config() {
        let config: ProjectConfig = r#"{"constants": {"debug": true}}"#.parse().unwrap();
        let params = config.parameters(Some("2.0")).unwrap();
        assert_eq!(params.version.as_deref(), Some("2.0"));
        assert_eq!(params.constants.get("debug"), Some(&true));
    }

    #[test]
    fn test_invalid_configs() {
        let dup = r#"{"versions": [{"version": "1"}, {"version": "1"}]}"#.parse::<ProjectConfig>();
        assert!(matches!(dup, Err(ConfigError::DuplicateVersion(_))));

        let bad_vcs = r#"{"vcs": "2", "versions": [{"version": "1"}]}"#.parse::<ProjectConfig>();
        assert!(matches!(bad_vcs, Err(ConfigError::UnknownVersion(_))));

        let broken = "{".parse::<ProjectConfig>();
        assert!(matches!(broken, Err(ConfigError::Json { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ProjectConfig::load(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
