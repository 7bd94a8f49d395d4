//! Error types shared by the fetcher, the source registry and the config loader.
//!
//! Per-item extraction problems are not errors: they surface as
//! [`crate::models::SkipReason`] values and never leave the extractor.

use reqwest::StatusCode;
use thiserror::Error;

/// Failure to retrieve one listing page.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("invalid listing URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: StatusCode },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    pub(crate) fn from_reqwest(url: &str, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Network {
                url: url.to_string(),
                source: e,
            }
        }
    }
}

/// Rejected source or settings input. Raised before any state is touched.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("source name must not be empty")]
    EmptyName,

    #[error("source URL must not be empty")]
    EmptyUrl,

    #[error("source URL {0:?} is not an absolute http(s) URL")]
    InvalidUrl(String),

    #[error("a source with id {0:?} already exists")]
    DuplicateId(String),

    #[error("invalid {field} selector {selector:?} for source {source_id:?}")]
    InvalidSelector {
        source_id: String,
        field: &'static str,
        selector: String,
    },

    #[error("expected NAME=URL, got {0:?}")]
    MalformedSpec(String),

    #[error("unknown source id {0:?}")]
    UnknownSource(String),

    #[error("could not read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config file {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}
