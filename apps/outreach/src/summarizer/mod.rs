//! Summarizer: map-reduce condensation of long scraped text.
//!
//! Flow: length check → split → map (one LLM call per chunk, in order) →
//!       reduce (one LLM call over the joined chunk summaries) → report.
//!
//! Text under the threshold is returned untouched. Nothing is persisted between
//! the map and reduce phases: a failed reduce discards the map work.

pub mod prompts;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::chunker::{split, DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use crate::errors::AppError;
use crate::llm_client::prompts::fill;
use crate::llm_client::LanguageModel;
use crate::summarizer::prompts::{PROFILE_REPORT_TEMPLATE, WEBSITE_REPORT_TEMPLATE};

/// Texts shorter than this many characters are not summarized.
pub const SUMMARY_THRESHOLD_CHARS: usize = 8000;

/// Joins map-phase outputs before the combine call.
pub const COMBINE_SEPARATOR: &str = "\n\n";

/// Content type of the text being summarized. Selects the prompt template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Website,
    Profile,
}

impl ReportKind {
    pub fn tag(self) -> &'static str {
        match self {
            ReportKind::Website => "website",
            ReportKind::Profile => "profile",
        }
    }

    pub fn template(self) -> &'static str {
        match self {
            ReportKind::Website => WEBSITE_REPORT_TEMPLATE,
            ReportKind::Profile => PROFILE_REPORT_TEMPLATE,
        }
    }

    /// Fills the template with `text`.
    pub fn prompt(self, text: &str) -> String {
        fill(self.template(), &[("text", text)])
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ReportKind {
    type Err = AppError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "website" => Ok(ReportKind::Website),
            "profile" | "linkedin" => Ok(ReportKind::Profile),
            other => Err(AppError::Usage(format!(
                "Unknown report template '{other}' (expected 'website' or 'profile')"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummarizerConfig {
    pub threshold_chars: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            threshold_chars: SUMMARY_THRESHOLD_CHARS,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

#[derive(Clone)]
pub struct Summarizer {
    llm: Arc<dyn LanguageModel>,
    config: SummarizerConfig,
}

impl Summarizer {
    pub fn new(llm: Arc<dyn LanguageModel>, config: SummarizerConfig) -> Self {
        Self { llm, config }
    }

    /// Returns `true` when `text` is long enough to go through the LLM.
    pub fn needs_summary(&self, text: &str) -> bool {
        text.chars().count() >= self.config.threshold_chars
    }

    /// Condenses `text` with the template selected by `kind`.
    pub async fn summarize(&self, text: &str, kind: ReportKind) -> Result<String, AppError> {
        if !self.needs_summary(text) {
            debug!(
                "Text below {} chars, returning unmodified",
                self.config.threshold_chars
            );
            return Ok(text.to_string());
        }

        let chunks = split(text, self.config.chunk_size, self.config.chunk_overlap)?;
        info!(
            template = kind.tag(),
            chunks = chunks.len(),
            "Summarizing {} chars",
            text.chars().count()
        );

        let mut partials = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let summary = self.llm.complete(&kind.prompt(&chunk.text)).await?;
            debug!(
                "Chunk {}/{} ({} chars) summarized into {} chars",
                chunk.index + 1,
                chunks.len(),
                chunk.char_len(),
                summary.len()
            );
            partials.push(summary);
        }

        let combined = partials.join(COMBINE_SEPARATOR);
        let report = self.llm.complete(&kind.prompt(&combined)).await?;
        info!(template = kind.tag(), "Report combined ({} chars)", report.len());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::mock::ScriptedModel;
    use crate::llm_client::LlmError;

    fn small_config() -> SummarizerConfig {
        SummarizerConfig {
            threshold_chars: 20,
            chunk_size: 10,
            chunk_overlap: 2,
        }
    }

    #[tokio::test]
    async fn test_short_text_is_returned_unmodified_without_llm_call() {
        let model = Arc::new(ScriptedModel::new());
        let summarizer = Summarizer::new(model.clone(), small_config());

        let text = "short text";
        let out = summarizer.summarize(text, ReportKind::Website).await.unwrap();

        assert_eq!(out, text);
        assert!(model.calls().is_empty());
    }

    #[tokio::test]
    async fn test_map_runs_per_chunk_then_reduce_over_joined_outputs() {
        let text = "abcdefghijklmnopqrstuvwxyz"; // 26 chars, chunks of ≤10 with overlap 2
        let chunk_count = split(text, 10, 2).unwrap().len();
        assert_eq!(chunk_count, 3);

        let model = Arc::new(ScriptedModel::with_texts(["s1", "s2", "s3", "FINAL"]));
        let summarizer = Summarizer::new(model.clone(), small_config());

        let out = summarizer.summarize(text, ReportKind::Website).await.unwrap();
        assert_eq!(out, "FINAL");

        let prompts = model.prompts();
        assert_eq!(prompts.len(), chunk_count + 1);
        assert_eq!(prompts[0], ReportKind::Website.prompt("abcdefghij"));
        assert_eq!(prompts[1], ReportKind::Website.prompt("ijklmnopqr"));
        assert_eq!(prompts[2], ReportKind::Website.prompt("qrstuvwxyz"));
        assert_eq!(prompts[3], ReportKind::Website.prompt("s1\n\ns2\n\ns3"));
    }

    #[tokio::test]
    async fn test_text_exactly_at_threshold_is_summarized() {
        let text = "x".repeat(20);
        let model = Arc::new(ScriptedModel::with_texts(["a", "b", "c", "done"]));
        let summarizer = Summarizer::new(model.clone(), small_config());

        let out = summarizer.summarize(&text, ReportKind::Profile).await.unwrap();
        assert_eq!(out, "done");
        assert!(model.prompts()[0].contains("professional profile data"));
    }

    #[tokio::test]
    async fn test_reduce_failure_surfaces_to_caller() {
        let text = "y".repeat(20);
        let model = Arc::new(ScriptedModel::with_texts(["a", "b", "c"]));
        model.push_error(LlmError::RateLimited { retries: 3 });
        let summarizer = Summarizer::new(model.clone(), small_config());

        let err = summarizer
            .summarize(&text, ReportKind::Website)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(LlmError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn test_map_failure_stops_before_reduce() {
        let text = "z".repeat(20);
        let model = Arc::new(ScriptedModel::with_texts(["a"]));
        model.push_error(LlmError::EmptyContent);
        let summarizer = Summarizer::new(model.clone(), small_config());

        assert!(summarizer.summarize(&text, ReportKind::Website).await.is_err());
        assert_eq!(model.calls().len(), 2);
    }

    #[test]
    fn test_unknown_tag_is_usage_error() {
        let err = "podcast".parse::<ReportKind>().unwrap_err();
        assert!(matches!(err, AppError::Usage(_)));
    }

    #[test]
    fn test_template_selection_by_tag() {
        assert_eq!("website".parse::<ReportKind>().unwrap(), ReportKind::Website);
        assert_eq!("Profile".parse::<ReportKind>().unwrap(), ReportKind::Profile);
        assert_eq!("linkedin".parse::<ReportKind>().unwrap(), ReportKind::Profile);
        assert!(ReportKind::Website.prompt("ACME").contains("\"ACME\""));
    }

    #[test]
    fn test_default_config_matches_production_policy() {
        let config = SummarizerConfig::default();
        assert_eq!(config.threshold_chars, 8000);
        assert_eq!(config.chunk_size, 10_000);
        assert_eq!(config.chunk_overlap, 500);
    }
}
