//! Listing page retrieval.
//!
//! Every request carries a desktop browser header set, since several of the
//! sites refuse clients that do not look like one, and a fixed timeout.
//! A non-2xx answer is returned as [`FetchError::Status`] so the caller can
//! treat it as "no articles" without aborting the run.

use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument, trace};

use crate::config::Settings;
use crate::errors::FetchError;
use crate::utils::truncate_for_log;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
const ACCEPT_VI: &str = "vi-VN,vi;q=0.9,en-US;q=0.8,en;q=0.7";

/// HTTP client shared by all sources of a run.
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
}

impl PageFetcher {
    pub fn new(settings: &Settings) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_VI));

        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self { client })
    }

    /// GET `url` and return the body as text.
    ///
    /// # Arguments
    /// * `url` - Absolute listing page URL
    ///
    /// # Returns
    /// The page body, or a [`FetchError`] for a bad URL, a non-2xx status,
    /// a timeout or a transport failure.
    #[instrument(level = "debug", skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        debug!(bytes = body.len(), %status, "Fetched listing page");
        trace!(preview = %truncate_for_log(&body, 300), "Listing body");
        Ok(body)
    }
}
