use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{parse_http_url, FetchError, FETCH_TIMEOUT_SECS};

/// Pulls profile data for a profile URL from the profile-data API.
///
/// Request: `GET {endpoint}?linkedin_profile_url=<url>&use_cache=if-present`
/// with `Authorization: Bearer <api key>`. The response body must be JSON.
#[derive(Clone)]
pub struct ProfileFetcher {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl ProfileFetcher {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    pub async fn fetch(&self, profile_url: &str) -> Result<Value, FetchError> {
        let profile_url = parse_http_url(profile_url)?;
        debug!("Fetching profile data for {}", profile_url);

        let response = self
            .client
            .get(&self.endpoint)
            .bearer_auth(&self.api_key)
            .query(&[
                ("linkedin_profile_url", profile_url.as_str()),
                ("use_cache", "if-present"),
            ])
            .send()
            .await
            .map_err(|source| FetchError::Network {
                url: profile_url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(
                "Profile API returned status {} for {}",
                status, profile_url
            );
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: profile_url.to_string(),
            });
        }

        let body = response.text().await.map_err(|e| FetchError::Parse {
            url: profile_url.to_string(),
            reason: e.to_string(),
        })?;
        let profile: Value = serde_json::from_str(&body).map_err(|e| FetchError::Parse {
            url: profile_url.to_string(),
            reason: format!("response is not JSON: {e}"),
        })?;

        info!("Fetched profile data for {}", profile_url);
        Ok(profile)
    }
}

/// Renders profile JSON as text for summarization, dropping nulls and empty values.
pub fn render_profile(profile: &Value) -> String {
    let pruned = prune_empty(profile).unwrap_or(Value::Null);
    serde_json::to_string_pretty(&pruned).unwrap_or_default()
}

fn prune_empty(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::Array(items) => {
            let kept: Vec<Value> = items.iter().filter_map(prune_empty).collect();
            (!kept.is_empty()).then_some(Value::Array(kept))
        }
        Value::Object(map) => {
            let kept: serde_json::Map<String, Value> = map
                .iter()
                .filter_map(|(k, v)| prune_empty(v).map(|v| (k.clone(), v)))
                .collect();
            (!kept.is_empty()).then_some(Value::Object(kept))
        }
        other => Some(other.clone()),
    }
}
