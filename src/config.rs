//! Optional YAML configuration file.
//!
//! ```yaml
//! settings:
//!   timeout_secs: 15
//!   source_pause_ms: 500
//!   page_pause_ms: 1000
//! sources:
//!   - name: Tin Nhanh Chứng Khoán
//!     url: https://www.tinnhanhchungkhoan.vn/chung-khoan/
//!     selectors:
//!       container: { tag: div, class: story }
//!       title: { tag: h2, class: story__heading }
//!       time: { tag: time }
//!       summary: { tag: div, class: story__summary }
//! ```
//!
//! Every key is optional. Listed sources are appended after the built-ins.

use serde::Deserialize;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

use crate::errors::ConfigError;
use crate::models::{Paging, SelectorRecipe};
use crate::scrapers::fetch::DEFAULT_USER_AGENT;
use crate::sources::NewSource;

/// Network and pacing knobs for a run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Pause after each source.
    pub source_pause_ms: u64,
    /// Pause between pages of a paginated source.
    pub page_pause_ms: u64,
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            source_pause_ms: 500,
            page_pause_ms: 1000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// A source entry as written in the config file.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceEntry {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub selectors: Option<SelectorRecipe>,
    #[serde(default)]
    pub paging: Option<Paging>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl From<SourceEntry> for NewSource {
    fn from(entry: SourceEntry) -> Self {
        NewSource {
            name: entry.name,
            url: entry.url,
            id: entry.id,
            origin: entry.origin,
            selectors: entry.selectors,
            paging: entry.paging,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub settings: Settings,
    pub sources: Vec<SourceEntry>,
}

impl ConfigFile {
    pub fn from_yaml(path: &str, yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|source| ConfigError::Yaml {
            path: path.to_string(),
            source,
        })
    }

    /// Read and parse a YAML config file.
    ///
    /// # Arguments
    /// * `path` - Location of the file
    ///
    /// # Returns
    /// The parsed configuration, or [`ConfigError::Io`] / [`ConfigError::Yaml`].
    #[instrument(level = "info")]
    pub async fn load(path: &str) -> Result<Self, ConfigError> {
        let yaml = fs::read_to_string(Path::new(path))
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_string(),
                source,
            })?;
        let config = Self::from_yaml(path, &yaml)?;
        info!(
            extra_sources = config.sources.len(),
            timeout_secs = config.settings.timeout_secs,
            "Loaded configuration"
        );
        Ok(config)
    }
}
