use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::AppError;

/// The prospect being researched. Supplied once per run and never mutated.
///
/// Accepts both snake_case keys and the display keys used by hand-written lead
/// sheets ("First Name", "LinkedIn URL", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lead {
    #[serde(alias = "First Name")]
    pub first_name: String,
    #[serde(alias = "Company Name")]
    pub company_name: String,
    #[serde(alias = "Website URL")]
    pub website_url: String,
    #[serde(alias = "LinkedIn URL", alias = "Profile URL", alias = "linkedin_url")]
    pub profile_url: String,
}

impl Lead {
    /// Reads a lead from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Usage(format!("Cannot read lead file '{}': {e}", path.display()))
        })?;
        let lead: Lead = serde_json::from_str(&raw).map_err(|e| {
            AppError::Usage(format!("Lead file '{}' is not valid: {e}", path.display()))
        })?;
        lead.validate()?;
        Ok(lead)
    }

    /// Checks that names are present and both URLs are absolute http(s) URLs.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.first_name.trim().is_empty() {
            return Err(AppError::Usage("Lead first name is empty".to_string()));
        }
        if self.company_name.trim().is_empty() {
            return Err(AppError::Usage("Lead company name is empty".to_string()));
        }
        validate_http_url("website URL", &self.website_url)?;
        validate_http_url("profile URL", &self.profile_url)?;
        Ok(())
    }
}

fn validate_http_url(field: &str, raw: &str) -> Result<(), AppError> {
    let parsed = Url::parse(raw.trim())
        .map_err(|e| AppError::Usage(format!("Lead {field} '{raw}' is not a valid URL: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::Usage(format!(
            "Lead {field} '{raw}' must use http or https"
        )));
    }
    Ok(())
}
