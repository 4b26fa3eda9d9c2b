//! One lead, end to end: research, then the writers' room.

use serde::Serialize;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::conversation::{Termination, DEFAULT_MAX_ROUNDS};
use crate::errors::AppError;
use crate::lead::Lead;
use crate::outreach::{WritersRoom, DEFAULT_REVIEW_ITERATIONS};
use crate::research::research_lead;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub research_rounds: usize,
    pub review_iterations: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            research_rounds: DEFAULT_MAX_ROUNDS,
            review_iterations: DEFAULT_REVIEW_ITERATIONS,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OutreachResult {
    pub run_id: Uuid,
    pub lead: Lead,
    pub research_report: String,
    pub research_rounds: usize,
    /// `false` when research hit the round limit before calling `finish`.
    pub research_complete: bool,
    /// Strategist's outline the email was written from.
    pub outline: String,
    pub email: String,
    pub approved: bool,
    pub review_iterations: usize,
}

/// Researches `lead` and writes the cold email. Runs inside a `lead` span carrying
/// a fresh run id.
pub async fn run_lead(
    state: &AppState,
    lead: &Lead,
    options: RunOptions,
) -> Result<OutreachResult, AppError> {
    lead.validate()?;
    let run_id = Uuid::new_v4();
    let span = info_span!("lead", %run_id, company = %lead.company_name);

    async {
        info!("Researching lead");
        let research = research_lead(
            state.llm.as_ref(),
            state.sources.clone(),
            lead,
            options.research_rounds,
        )
        .await?;

        info!("Writing outreach email");
        let draft = WritersRoom::new(state.llm.as_ref())
            .max_iterations(options.review_iterations)
            .write(lead, &research.report)
            .await?;

        info!(
            approved = draft.approved,
            iterations = draft.iterations,
            feedback_notes = draft.feedback.len(),
            "Outreach email ready"
        );
        Ok::<_, AppError>(OutreachResult {
            run_id,
            lead: lead.clone(),
            research_report: research.report,
            research_rounds: research.rounds,
            research_complete: research.termination == Termination::Finished,
            outline: draft.structure,
            email: draft.email,
            approved: draft.approved,
            review_iterations: draft.iterations,
        })
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ContentCache;
    use crate::conversation::FINISH_TOOL;
    use crate::fetcher::{ProfileFetcher, WebsiteFetcher};
    use crate::llm_client::mock::ScriptedModel;
    use crate::llm_client::{ChatMessage, LlmError, ToolCall};
    use crate::outreach::APPROVE_TOOL;
    use crate::research::{Sources, SCRAPE_PROFILE_TOOL, SCRAPE_WEBSITE_TOOL};
    use crate::summarizer::{Summarizer, SummarizerConfig};
    use crate::test_support::spawn_stub;
    use axum::{response::Html, routing::get, Json, Router};
    use serde_json::json;
    use std::sync::Arc;

    async fn upstream() -> String {
        let router = Router::new()
            .route(
                "/",
                get(|| async { Html("<h1>Growthcurve</h1><p>Growth marketing for startups.</p>") }),
            )
            .route(
                "/profile",
                get(|| async { Json(json!({"full_name": "Mulenga Agley", "city": "London"})) }),
            );
        spawn_stub(router).await
    }

    fn state(model: Arc<ScriptedModel>, base: &str, dir: &tempfile::TempDir) -> AppState {
        let sources = Sources::new(
            ContentCache::new(dir.path().join("json_cache.json")),
            WebsiteFetcher::new(),
            ProfileFetcher::new(format!("{base}/profile"), "px-test"),
            Summarizer::new(model.clone(), SummarizerConfig::default()),
        );
        AppState::new(model, sources)
    }

    fn lead(base: &str) -> Lead {
        Lead {
            first_name: "Mulenga".to_string(),
            company_name: "Growthcurve".to_string(),
            website_url: base.to_string(),
            profile_url: "https://www.linkedin.com/in/mulengaagley".to_string(),
        }
    }

    fn tool_turn(id: &str, name: &str, args: serde_json::Value) -> ChatMessage {
        ChatMessage::assistant_tool_calls(vec![ToolCall::new(id, name, args)])
    }

    #[tokio::test]
    async fn test_research_report_feeds_the_writers_room() {
        let base = upstream().await;
        let dir = tempfile::tempdir().unwrap();
        let lead = lead(&base);

        let model = Arc::new(ScriptedModel::new());
        model.push(tool_turn("c1", SCRAPE_WEBSITE_TOOL, json!({"website_url": base})));
        model.push(tool_turn(
            "c2",
            SCRAPE_PROFILE_TOOL,
            json!({"profile_url": lead.profile_url}),
        ));
        model.push(tool_turn(
            "c3",
            FINISH_TOOL,
            json!({"result": "REPORT: growth agency, founder in London"}),
        ));
        model.push(ChatMessage::assistant("OUTLINE"));
        model.push(ChatMessage::assistant("Hi Mulenga, ..."));
        model.push(tool_turn("a1", APPROVE_TOOL, json!({})));

        let state = state(model.clone(), &base, &dir);
        let result = run_lead(&state, &lead, RunOptions::default()).await.unwrap();

        assert_eq!(result.outline, "OUTLINE");
        assert_eq!(result.email, "Hi Mulenga, ...");
        assert_eq!(result.research_report, "REPORT: growth agency, founder in London");
        assert!(result.research_complete);
        assert_eq!(result.research_rounds, 3);
        assert!(result.approved);
        assert_eq!(result.review_iterations, 1);
        assert_eq!(result.lead, lead);

        // The strategist sees the research report.
        let prompts = model.prompts();
        assert!(prompts[3].contains("REPORT: growth agency, founder in London"));

        // Both raw payloads were cached.
        assert_eq!(state.sources.cache().load().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_lead_is_rejected_before_any_call() {
        let base = upstream().await;
        let dir = tempfile::tempdir().unwrap();
        let model = Arc::new(ScriptedModel::new());
        let state = state(model.clone(), &base, &dir);

        let mut bad = lead(&base);
        bad.website_url = "growthcurve dot co".to_string();
        let err = run_lead(&state, &bad, RunOptions::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Usage(_)));
        assert!(model.calls().is_empty());
    }

    #[tokio::test]
    async fn test_llm_failure_ends_the_run() {
        let base = upstream().await;
        let dir = tempfile::tempdir().unwrap();
        let model = Arc::new(ScriptedModel::new());
        model.push_error(LlmError::RateLimited { retries: 3 });
        let state = state(model.clone(), &base, &dir);

        let err = run_lead(&state, &lead(&base), RunOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(LlmError::RateLimited { .. })));
        assert_eq!(model.calls().len(), 1);
    }

    #[test]
    fn test_result_serializes_with_lead() {
        let result = OutreachResult {
            run_id: Uuid::nil(),
            lead: lead("http://growthcurve.co"),
            research_report: "R".to_string(),
            research_rounds: 2,
            research_complete: true,
            outline: "O".to_string(),
            email: "E".to_string(),
            approved: false,
            review_iterations: 2,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["email"], "E");
        assert_eq!(value["lead"]["company_name"], "Growthcurve");
        assert_eq!(value["run_id"], "00000000-0000-0000-0000-000000000000");
    }
}
