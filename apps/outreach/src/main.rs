mod cache;
mod chunker;
mod cli;
mod config;
mod conversation;
mod errors;
mod fetcher;
mod lead;
mod llm_client;
mod outreach;
mod pipeline;
mod research;
mod state;
mod summarizer;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Cli;
use crate::config::Config;
use crate::pipeline::run_lead;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first (fails on missing required env vars)
    let mut config = Config::from_env()?;
    if let Some(path) = &cli.cache {
        config.cache_path = path.clone();
    }

    // Initialize structured logging; stdout is reserved for the email
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting outreach v{}", env!("CARGO_PKG_VERSION"));

    let lead = cli.lead()?;

    let state = AppState::from_config(&config);
    info!(
        "LLM client initialized (model: {}), cache at {}",
        config.llm.model,
        state.sources.cache().path().display()
    );

    let result = match run_lead(&state, &lead, cli.run_options()).await {
        Ok(result) => result,
        Err(err) => {
            error!(code = err.code(), "Run failed: {err}");
            return Err(err.into());
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }
    if cli.show_research {
        println!("{}\n\n---\n", result.research_report);
    }
    println!("{}", result.email);

    Ok(())
}
