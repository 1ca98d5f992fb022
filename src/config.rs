//! Indexer configuration.
//!
//! Loaded once (from a YAML, TOML or JSON file, or from an option map) and
//! then passed explicitly to everything that needs root paths.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::document::Uri;
use crate::error::{IndexerError, Result};

fn default_apps_dirs() -> Vec<String> {
    vec![".".to_string()]
}

fn default_include_dirs() -> Vec<String> {
    vec!["include".to_string(), "src".to_string()]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base project location, as a `file://` URI or absolute path.
    pub root_uri: Option<String>,
    /// Application directories relative to the root.
    pub apps_dirs: Vec<String>,
    /// Extra include directories relative to the root.
    pub include_dirs: Vec<String>,
    /// Dependency directories relative to the root. May end in `*`.
    pub deps_dirs: Vec<String>,
    /// Absolute runtime-library (OTP) installation root.
    pub otp_path: Option<PathBuf>,
    /// OTP applications left out of the runtime root-path set.
    pub otp_apps_exclude: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root_uri: None,
            apps_dirs: default_apps_dirs(),
            include_dirs: default_include_dirs(),
            deps_dirs: Vec::new(),
            otp_path: None,
            otp_apps_exclude: Vec::new(),
        }
    }
}

impl Config {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root_uri: Some(Uri::from_path(root.as_ref()).to_string()),
            ..Default::default()
        }
    }

    pub fn with_apps_dirs<S: Into<String>>(mut self, dirs: impl IntoIterator<Item = S>) -> Self {
        self.apps_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_include_dirs<S: Into<String>>(mut self, dirs: impl IntoIterator<Item = S>) -> Self {
        self.include_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_deps_dirs<S: Into<String>>(mut self, dirs: impl IntoIterator<Item = S>) -> Self {
        self.deps_dirs = dirs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_otp_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.otp_path = Some(path.into());
        self
    }

    pub fn with_otp_apps_exclude<S: Into<String>>(
        mut self,
        apps: impl IntoIterator<Item = S>,
    ) -> Self {
        self.otp_apps_exclude = apps.into_iter().map(Into::into).collect();
        self
    }

    /// Loads a config file. The format follows the extension: `.toml`,
    /// `.json`, anything else is read as YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => toml::from_str(&content)
                .map_err(|e| IndexerError::Config(format!("{}: {}", path.display(), e)))?,
            Some("json") => serde_json::from_str(&content)?,
            _ => Self::from_yaml(&content)?,
        };
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        // An empty file deserializes to unit, not to an empty mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| IndexerError::Config(e.to_string()))
    }

    /// Builds a config from an option-name → value map.
    pub fn from_options(options: serde_json::Map<String, serde_json::Value>) -> Result<Self> {
        Ok(serde_json::from_value(serde_json::Value::Object(options))?)
    }

    pub fn root_path(&self) -> Result<PathBuf> {
        let raw = self
            .root_uri
            .as_deref()
            .ok_or_else(|| IndexerError::Config("root_uri is not set".to_string()))?;
        Uri::parse(raw)
            .map(|uri| uri.to_path())
            .ok_or_else(|| IndexerError::Config(format!("root_uri must be absolute: {}", raw)))
    }
}
