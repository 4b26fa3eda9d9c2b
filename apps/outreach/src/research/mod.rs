//! Research agent.
//!
//! Gives the model two tools, `scrape_website` and `scrape_profile`, and lets it
//! run until it hands back a research report. Each tool goes through two cache
//! layers: the raw payload keyed by URL, then the summary keyed by template and
//! content hash.

pub mod prompts;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use crate::cache::{raw_key, summary_key, ContentCache};
use crate::conversation::{
    string_arg, string_params, Conversation, Termination, Tool, ToolError, ToolRegistry,
};
use crate::errors::AppError;
use crate::fetcher::profile::render_profile;
use crate::fetcher::{ProfileFetcher, WebsiteFetcher};
use crate::lead::Lead;
use crate::llm_client::prompts::{fill, render_lead};
use crate::llm_client::{LanguageModel, ToolSpec};
use crate::summarizer::{ReportKind, Summarizer};

use prompts::*;

pub const SCRAPE_WEBSITE_TOOL: &str = "scrape_website";
pub const SCRAPE_PROFILE_TOOL: &str = "scrape_profile";

const WEBSITE_SOURCE: &str = "website";
const PROFILE_SOURCE: &str = "profile";

/// Cached access to the two data sources, condensed for the model.
pub struct Sources {
    cache: ContentCache,
    website: WebsiteFetcher,
    profile: ProfileFetcher,
    summarizer: Summarizer,
}

impl Sources {
    pub fn new(
        cache: ContentCache,
        website: WebsiteFetcher,
        profile: ProfileFetcher,
        summarizer: Summarizer,
    ) -> Self {
        Self {
            cache,
            website,
            profile,
            summarizer,
        }
    }

    pub fn cache(&self) -> &ContentCache {
        &self.cache
    }

    /// Visible text of `url`, summarized with the website template when long.
    pub async fn website_report(&self, url: &str) -> Result<String, AppError> {
        let text: String = self
            .cache
            .get_or_fetch(&raw_key(WEBSITE_SOURCE, url), || async {
                self.website.fetch_text(url).await.map_err(AppError::from)
            })
            .await?;
        self.condense(&text, ReportKind::Website).await
    }

    /// Profile data for `url`, rendered as text and summarized with the profile
    /// template when long.
    pub async fn profile_report(&self, url: &str) -> Result<String, AppError> {
        let profile: Value = self
            .cache
            .get_or_fetch(&raw_key(PROFILE_SOURCE, url), || async {
                self.profile.fetch(url).await.map_err(AppError::from)
            })
            .await?;
        self.condense(&render_profile(&profile), ReportKind::Profile)
            .await
    }

    async fn condense(&self, text: &str, kind: ReportKind) -> Result<String, AppError> {
        if !self.summarizer.needs_summary(text) {
            debug!(template = kind.tag(), "Text is short, using it as is");
            return Ok(text.to_string());
        }
        let key = summary_key(kind.tag(), kind.template(), text);
        self.cache
            .get_or_fetch(&key, || self.summarizer.summarize(text, kind))
            .await
    }
}

pub struct ScrapeWebsiteTool {
    sources: Arc<Sources>,
}

impl ScrapeWebsiteTool {
    pub fn new(sources: Arc<Sources>) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl Tool for ScrapeWebsiteTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: SCRAPE_WEBSITE_TOOL.to_string(),
            description: SCRAPE_WEBSITE_DESCRIPTION.to_string(),
            parameters: string_params(&[("website_url", "The website URL to scrape")]),
        }
    }

    async fn call(&self, args: Value) -> Result<String, ToolError> {
        let url = string_arg(&args, &["website_url", "url"])?;
        Ok(self.sources.website_report(&url).await?)
    }
}

pub struct ScrapeProfileTool {
    sources: Arc<Sources>,
}

impl ScrapeProfileTool {
    pub fn new(sources: Arc<Sources>) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl Tool for ScrapeProfileTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: SCRAPE_PROFILE_TOOL.to_string(),
            description: SCRAPE_PROFILE_DESCRIPTION.to_string(),
            parameters: string_params(&[("profile_url", "The profile URL to fetch")]),
        }
    }

    async fn call(&self, args: Value) -> Result<String, ToolError> {
        let url = string_arg(&args, &["profile_url", "linkedin_url", "url"])?;
        Ok(self.sources.profile_report(&url).await?)
    }
}

#[derive(Debug, Clone)]
pub struct ResearchReport {
    pub report: String,
    pub termination: Termination,
    pub rounds: usize,
}

/// Runs the research agent for `lead` and returns its report.
pub async fn research_lead(
    model: &dyn LanguageModel,
    sources: Arc<Sources>,
    lead: &Lead,
    max_rounds: usize,
) -> Result<ResearchReport, AppError> {
    let tools = ToolRegistry::new()
        .with(Arc::new(ScrapeWebsiteTool::new(sources.clone())))
        .with(Arc::new(ScrapeProfileTool::new(sources)));

    let opening = fill(RESEARCH_REQUEST_TEMPLATE, &[("lead", &render_lead(lead))]);
    let outcome = Conversation::new(model, RESEARCHER_SYSTEM)
        .tools(tools)
        .max_rounds(max_rounds)
        .run(&opening)
        .await?;

    info!(
        rounds = outcome.rounds,
        messages = outcome.transcript.len(),
        termination = ?outcome.termination,
        "Research report ready ({} chars)",
        outcome.result.len()
    );
    Ok(ResearchReport {
        report: outcome.result,
        termination: outcome.termination,
        rounds: outcome.rounds,
    })
}
