//! Fetchers: the boundary to external data sources.
//!
//! `WebsiteFetcher` scrapes a company site and returns its visible text.
//! `ProfileFetcher` pulls a professional profile as JSON from the profile-data API.
//! Every failure is a typed `FetchError`; callers decide whether it is fatal.

pub mod extract;
pub mod profile;
pub mod website;

use thiserror::Error;
use url::Url;

pub use profile::ProfileFetcher;
pub use website::WebsiteFetcher;

/// Desktop browser User-Agent sent with every scrape.
pub const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
    AppleWebKit/537.36 (KHTML, like Gecko) \
    Chrome/113.0.0.0 Safari/537.36 Edg/113.0.1774.57";

pub const FETCH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unparseable content from {url}: {reason}")]
    Parse { url: String, reason: String },

    #[error("No content extracted from {url}")]
    EmptyContent { url: String },
}

impl FetchError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Accepts only absolute http(s) URLs.
pub fn parse_http_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw.trim()).map_err(|e| FetchError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(FetchError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }
    Ok(url)
}
