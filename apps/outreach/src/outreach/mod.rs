//! Outreach writers' room.
//!
//! Three personas share one model: the strategist outlines the email from the
//! research, then the copywriter drafts and the reviewer critiques for a bounded
//! number of iterations. The reviewer ends the loop early by calling `approve`.
//! The last draft is the email.

pub mod prompts;

use serde_json::json;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::lead::Lead;
use crate::llm_client::prompts::{fill, render_lead};
use crate::llm_client::{ChatMessage, LanguageModel, LlmError, ToolSpec};

use prompts::*;

pub const APPROVE_TOOL: &str = "approve";
pub const DEFAULT_REVIEW_ITERATIONS: usize = 2;

/// Reviewer verdict on one draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Review {
    Approved,
    Feedback(String),
}

#[derive(Debug, Clone)]
pub struct OutreachDraft {
    pub structure: String,
    pub email: String,
    /// Number of copywriter drafts produced.
    pub iterations: usize,
    pub approved: bool,
    /// Reviewer feedback, one entry per rejected draft.
    pub feedback: Vec<String>,
}

pub struct WritersRoom<'a> {
    model: &'a dyn LanguageModel,
    max_iterations: usize,
}

impl<'a> WritersRoom<'a> {
    pub fn new(model: &'a dyn LanguageModel) -> Self {
        Self {
            model,
            max_iterations: DEFAULT_REVIEW_ITERATIONS,
        }
    }

    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Writes a cold email to `lead` from the research report.
    pub async fn write(&self, lead: &Lead, research: &str) -> Result<OutreachDraft, AppError> {
        if self.max_iterations == 0 {
            return Err(AppError::Usage(
                "review iterations must be at least 1".to_string(),
            ));
        }

        let lead_block = render_lead(lead);
        let structure = self
            .ask(
                STRATEGIST_SYSTEM,
                &fill(
                    STRATEGY_PROMPT_TEMPLATE,
                    &[("lead", &lead_block), ("research", research)],
                ),
            )
            .await?;
        info!("Strategist produced the email structure");

        let mut email = String::new();
        let mut feedback: Vec<String> = Vec::new();
        let mut approved = false;
        let mut iterations = 0;

        while iterations < self.max_iterations {
            iterations += 1;
            let prompt = match feedback.last() {
                None => fill(
                    DRAFT_PROMPT_TEMPLATE,
                    &[
                        ("first_name", &lead.first_name),
                        ("company_name", &lead.company_name),
                        ("lead", &lead_block),
                        ("research", research),
                        ("structure", &structure),
                    ],
                ),
                Some(notes) => fill(
                    REVISION_PROMPT_TEMPLATE,
                    &[
                        ("first_name", &lead.first_name),
                        ("company_name", &lead.company_name),
                        ("structure", &structure),
                        ("draft", &email),
                        ("feedback", notes),
                    ],
                ),
            };
            email = self.ask(COPYWRITER_SYSTEM, &prompt).await?;
            debug!(iteration = iterations, "Copywriter produced a draft");

            match self.review(&lead_block, &email).await? {
                Review::Approved => {
                    info!(iteration = iterations, "Reviewer approved the draft");
                    approved = true;
                    break;
                }
                Review::Feedback(notes) => {
                    debug!(iteration = iterations, "Reviewer sent feedback");
                    feedback.push(notes);
                }
            }
        }

        Ok(OutreachDraft {
            structure,
            email,
            iterations,
            approved,
            feedback,
        })
    }

    async fn ask(&self, system: &str, prompt: &str) -> Result<String, AppError> {
        let messages = [ChatMessage::system(system), ChatMessage::user(prompt)];
        let reply = self.model.chat(&messages, &[]).await?;
        reply
            .text_content()
            .map(str::to_string)
            .ok_or_else(|| LlmError::EmptyContent.into())
    }

    async fn review(&self, lead_block: &str, draft: &str) -> Result<Review, AppError> {
        let messages = [
            ChatMessage::system(REVIEWER_SYSTEM),
            ChatMessage::user(fill(
                REVIEW_PROMPT_TEMPLATE,
                &[("lead", lead_block), ("draft", draft)],
            )),
        ];
        let reply = self.model.chat(&messages, &[approve_spec()]).await?;
        if reply
            .tool_calls
            .iter()
            .any(|call| call.function.name == APPROVE_TOOL)
        {
            return Ok(Review::Approved);
        }
        reply
            .text_content()
            .map(|notes| Review::Feedback(notes.to_string()))
            .ok_or_else(|| LlmError::EmptyContent.into())
    }
}

fn approve_spec() -> ToolSpec {
    ToolSpec {
        name: APPROVE_TOOL.to_string(),
        description: APPROVE_DESCRIPTION.to_string(),
        parameters: json!({"type": "object", "properties": {}}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::mock::ScriptedModel;
    use crate::llm_client::ToolCall;

    fn lead() -> Lead {
        Lead {
            first_name: "Mulenga".to_string(),
            company_name: "Growthcurve".to_string(),
            website_url: "http://growthcurve.co".to_string(),
            profile_url: "https://www.linkedin.com/in/mulengaagley".to_string(),
        }
    }

    fn approval() -> ChatMessage {
        ChatMessage::assistant_tool_calls(vec![ToolCall::new("a1", APPROVE_TOOL, json!({}))])
    }

    #[tokio::test]
    async fn test_approval_ends_the_loop_early() {
        let model = ScriptedModel::with_texts(["OUTLINE", "Hi Mulenga, draft one"]);
        model.push(approval());

        let draft = WritersRoom::new(&model)
            .write(&lead(), "Growthcurve is a growth agency.")
            .await
            .unwrap();

        assert_eq!(draft.structure, "OUTLINE");
        assert_eq!(draft.email, "Hi Mulenga, draft one");
        assert!(draft.approved);
        assert_eq!(draft.iterations, 1);
        assert!(draft.feedback.is_empty());
        assert_eq!(model.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_feedback_drives_revision_and_last_draft_wins() {
        let model = ScriptedModel::with_texts([
            "OUTLINE",
            "draft one",
            "Too long, cut the second paragraph.",
            "draft two",
            "Better, but the CTA is weak.",
        ]);

        let draft = WritersRoom::new(&model)
            .write(&lead(), "RESEARCH")
            .await
            .unwrap();

        assert_eq!(draft.email, "draft two");
        assert!(!draft.approved);
        assert_eq!(draft.iterations, 2);
        assert_eq!(draft.feedback.len(), 2);

        let prompts = model.prompts();
        assert_eq!(prompts.len(), 5);
        assert!(prompts[0].contains("RESEARCH"));
        assert!(prompts[1].contains("OUTLINE"));
        assert!(prompts[1].contains("Mulenga at Growthcurve"));
        assert!(prompts[2].contains("draft one"));
        // The revision sees the previous draft and the reviewer's notes.
        assert!(prompts[3].contains("draft one"));
        assert!(prompts[3].contains("Too long, cut the second paragraph."));
        assert!(prompts[4].contains("draft two"));
    }

    #[tokio::test]
    async fn test_only_reviewer_is_offered_approve() {
        let model = ScriptedModel::with_texts(["OUTLINE", "draft"]);
        model.push(approval());

        WritersRoom::new(&model).write(&lead(), "R").await.unwrap();

        let calls = model.calls();
        assert!(calls[0].tool_names.is_empty());
        assert!(calls[1].tool_names.is_empty());
        assert_eq!(calls[2].tool_names, vec![APPROVE_TOOL]);
        assert_eq!(
            calls[2].messages[0].content.as_deref(),
            Some(REVIEWER_SYSTEM)
        );
    }

    #[tokio::test]
    async fn test_single_iteration_skips_revision() {
        let model = ScriptedModel::with_texts(["OUTLINE", "draft", "needs work"]);

        let draft = WritersRoom::new(&model)
            .max_iterations(1)
            .write(&lead(), "R")
            .await
            .unwrap();

        assert_eq!(draft.email, "draft");
        assert_eq!(draft.feedback, vec!["needs work".to_string()]);
        assert_eq!(model.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_placeholders_inside_research_are_left_alone() {
        let model = ScriptedModel::with_texts(["OUTLINE", "draft"]);
        model.push(approval());

        WritersRoom::new(&model)
            .write(&lead(), "Docs show the syntax {structure} for templates.")
            .await
            .unwrap();

        let draft_prompt = &model.prompts()[1];
        assert!(draft_prompt.contains("Research material:\nDocs show the syntax {structure} for templates."));
        assert!(draft_prompt.contains("Email structure from the strategist:\nOUTLINE"));
    }

    #[tokio::test]
    async fn test_zero_iterations_is_usage_error() {
        let model = ScriptedModel::new();
        let err = WritersRoom::new(&model)
            .max_iterations(0)
            .write(&lead(), "R")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Usage(_)));
        assert!(model.calls().is_empty());
    }

    #[tokio::test]
    async fn test_llm_failure_surfaces() {
        let model = ScriptedModel::with_texts(["OUTLINE"]);
        model.push_error(LlmError::Api {
            status: 400,
            message: "context length exceeded".to_string(),
        });

        let err = WritersRoom::new(&model)
            .write(&lead(), "R")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(LlmError::Api { status: 400, .. })));
    }
}
