use std::sync::Arc;

use crate::cache::ContentCache;
use crate::config::Config;
use crate::fetcher::{ProfileFetcher, WebsiteFetcher};
use crate::llm_client::{LanguageModel, LlmClient};
use crate::research::Sources;
use crate::summarizer::{Summarizer, SummarizerConfig};

/// Shared application state handed to the pipeline.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable model. Default: `LlmClient`; tests inject a scripted model.
    pub llm: Arc<dyn LanguageModel>,
    /// Cached website and profile access used by the research agent.
    pub sources: Arc<Sources>,
}

impl AppState {
    pub fn new(llm: Arc<dyn LanguageModel>, sources: Sources) -> Self {
        Self {
            llm,
            sources: Arc::new(sources),
        }
    }

    /// Wires the production clients from configuration.
    pub fn from_config(config: &Config) -> Self {
        let llm: Arc<dyn LanguageModel> = Arc::new(LlmClient::new(config.llm.clone()));
        let summarizer = Summarizer::new(llm.clone(), SummarizerConfig::default());
        let sources = Sources::new(
            ContentCache::new(config.cache_path.clone()),
            WebsiteFetcher::new(),
            ProfileFetcher::new(
                config.profile_endpoint.clone(),
                config.profile_api_key.clone(),
            ),
            summarizer,
        );
        Self::new(llm, sources)
    }
}
