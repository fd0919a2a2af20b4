//! Document defaults, loadable from TOML.
//!
//! ```toml
//! lang = "es"
//! version = "v3"
//! stamp_hostname = false
//!
//! [container]
//! removal_policy = "detach"
//! ```

use std::fs;
use std::path::Path;

use layered_kaf::ContainerConfig;
use serde::{Deserialize, Serialize};

use crate::error::{DocumentError, DocumentResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentConfig {
    /// Language of new documents
    pub lang: String,
    /// KAF/NAF version of new documents
    pub version: String,
    /// Record the host name when a processor run begins
    pub stamp_hostname: bool,
    pub container: ContainerConfig,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        DocumentConfig {
            lang: "en".to_string(),
            version: "v3".to_string(),
            stamp_hostname: true,
            container: ContainerConfig::default(),
        }
    }
}

impl DocumentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_stamp_hostname(mut self, stamp_hostname: bool) -> Self {
        self.stamp_hostname = stamp_hostname;
        self
    }

    pub fn with_container(mut self, container: ContainerConfig) -> Self {
        self.container = container;
        self
    }

    pub fn from_toml_str(content: &str) -> DocumentResult<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Loads a TOML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> DocumentResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        log::debug!("loading document config from {}", path.display());
        Self::from_toml_str(&content)
    }
}
