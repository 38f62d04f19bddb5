// Parameter context for one processing pass

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Values a file is processed against.
///
/// Read-only during a pass. Built by the caller, usually from
/// [`ProjectConfig::parameters`](crate::config::ProjectConfig::parameters).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    /// Target version; bare version leaves and operator-first predicates compare against it.
    pub version: Option<String>,
    /// Named booleans.
    pub constants: FxHashMap<String, bool>,
    /// Swap name to replacement text. Surrounding whitespace is trimmed on
    /// insertion into the body, which keeps its own leading and trailing whitespace.
    pub swaps: FxHashMap<String, String>,
    /// Dependency name to its version.
    pub dependencies: FxHashMap<String, String>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn define(mut self, name: impl Into<String>, value: bool) -> Self {
        self.constants.insert(name.into(), value);
        self
    }

    pub fn swap(mut self, name: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.swaps.insert(name.into(), replacement.into());
        self
    }

    pub fn dependency(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.dependencies.insert(name.into(), version.into());
        self
    }

    /// Overlay `other` on top of `self`; entries of `other` win.
    pub fn merge(&mut self, other: &Parameters) {
        if other.version.is_some() {
            self.version.clone_from(&other.version);
        }
        self.constants
            .extend(other.constants.iter().map(|(k, v)| (k.clone(), *v)));
        self.swaps
            .extend(other.swaps.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.dependencies
            .extend(other.dependencies.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overrides() {
        let mut base = Parameters::new()
            .with_version("1.20")
            .define("fabric", true)
            .define("modern", true);
        let overlay = Parameters::new().define("modern", false).swap("call", "x()");
        base.merge(&overlay);

        assert_eq!(base.version.as_deref(), Some("1.20"));
        assert_eq!(base.constants.get("fabric"), Some(&true));
        assert_eq!(base.constants.get("modern"), Some(&false));
        assert_eq!(base.swaps.get("call").map(String::as_str), Some("x()"));
    }

    #[test]
    fn test_deserialize_partial() {
        let params: Parameters = serde_json::from_str(r#"{"constants": {"a": true}}"#).unwrap();
        assert_eq!(params.version, None);
        assert_eq!(params.constants.get("a"), Some(&true));
        assert!(params.swaps.is_empty());
    }
}
