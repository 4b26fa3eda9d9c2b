use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, warn};

use super::extract::{html_title, html_to_text};
use super::{parse_http_url, FetchError, FETCH_TIMEOUT_SECS, USER_AGENT};

/// Scrapes a website and returns its visible text.
#[derive(Clone)]
pub struct WebsiteFetcher {
    client: Client,
}

impl Default for WebsiteFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl WebsiteFetcher {
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .expect("Failed to create HTTP client");
        Self { client }
    }

    /// GETs `url` and returns the raw HTML body. Non-2xx responses are errors.
    pub async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        let parsed = parse_http_url(url)?;
        debug!("Fetching website: {}", parsed);

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|source| FetchError::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("HTTP request failed with status code {} for {}", status, url);
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.text().await.map_err(|e| FetchError::Parse {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    /// GETs `url` and extracts its visible text.
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let html = self.fetch_html(url).await?;
        if let Some(title) = html_title(&html) {
            debug!("Page title: {}", title);
        }
        let text = html_to_text(&html);
        if text.is_empty() {
            return Err(FetchError::EmptyContent {
                url: url.to_string(),
            });
        }
        info!("Fetched {} chars of text from {}", text.chars().count(), url);
        Ok(text)
    }
}
