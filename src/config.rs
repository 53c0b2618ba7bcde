// Rule configuration for qsfuzz
//
// Rules are loaded from a YAML or JSON file:
//
//   rules:
//     ssti:
//       description: "Template injection"
//       injections:
//         - "{{7*7}}"
//
// Keys other than `rules` (and anything inside a rule besides `description`
// and `injections`) are ignored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("unsupported config format {0:?} (expected .yaml, .yml or .json)")]
    UnsupportedFormat(PathBuf),
    #[error("no rules defined in config")]
    NoRules,
    #[error("rule {0:?} has no injections")]
    EmptyRule(String),
}

/// A named set of payload templates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub injections: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuzzConfig {
    #[serde(default)]
    pub rules: BTreeMap<String, Rule>,
}

impl FuzzConfig {
    /// Load and validate a config file, picking the format by extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        let config = match ext.as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml(&data).map_err(|source| {
                ConfigError::Yaml {
                    path: path.to_path_buf(),
                    source,
                }
            })?,
            Some("json") => Self::from_json(&data).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(data: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(data)
    }

    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rules.is_empty() {
            return Err(ConfigError::NoRules);
        }
        if let Some((name, _)) = self.rules.iter().find(|(_, r)| r.injections.is_empty()) {
            return Err(ConfigError::EmptyRule(name.clone()));
        }
        Ok(())
    }

    /// Total number of injection templates across all rules.
    pub fn injection_count(&self) -> usize {
        self.rules.values().map(|r| r.injections.len()).sum()
    }
}
