//! Bounded tool-calling conversation.
//!
//! One agent (a system prompt plus a set of tools) talks to the model until it calls
//! the reserved `finish` function or the round limit is reached. Each round is one
//! model turn followed by execution of every tool call in that turn, in order.

pub mod tools;

use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::llm_client::prompts::{DEFAULT_AUTO_REPLY, FINISH_INSTRUCTION};
use crate::llm_client::{ChatMessage, LanguageModel, ToolCall, ToolSpec};

pub use tools::{string_arg, string_params, Tool, ToolError, ToolRegistry};

/// Name of the reserved function that ends a conversation.
pub const FINISH_TOOL: &str = "finish";

pub const DEFAULT_MAX_ROUNDS: usize = 12;

#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("no result after {rounds} rounds")]
    NoResult { rounds: usize },

    #[error("max_rounds must be at least 1")]
    ZeroRounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The model called `finish`.
    Finished,
    /// The round limit was hit; the result is the last assistant text.
    RoundLimit,
}

#[derive(Debug, Clone)]
pub struct ConversationOutcome {
    pub result: String,
    pub termination: Termination,
    pub rounds: usize,
    pub transcript: Vec<ChatMessage>,
}

/// A single agent's conversation with the model.
pub struct Conversation<'a> {
    model: &'a dyn LanguageModel,
    system_prompt: String,
    tools: ToolRegistry,
    max_rounds: usize,
}

impl<'a> Conversation<'a> {
    /// `system_prompt` is extended with the instruction to call `finish`.
    pub fn new(model: &'a dyn LanguageModel, system_prompt: &str) -> Self {
        Self {
            model,
            system_prompt: format!("{}\n\n{}", system_prompt.trim_end(), FINISH_INSTRUCTION),
            tools: ToolRegistry::new(),
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    pub fn max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    /// Tools offered to the model: registered tools followed by `finish`.
    fn offered_tools(&self) -> Vec<ToolSpec> {
        let mut specs: Vec<ToolSpec> = self
            .tools
            .specs()
            .into_iter()
            .filter(|s| s.name != FINISH_TOOL)
            .collect();
        specs.push(finish_spec());
        specs
    }

    /// Runs the conversation from `opening` (the first user message).
    ///
    /// LLM failures and fatal tool errors abort the run. Fetch failures, bad
    /// arguments and unknown function names are reported back to the model as the
    /// tool result and the conversation continues.
    pub async fn run(&self, opening: &str) -> Result<ConversationOutcome, AppError> {
        if self.max_rounds == 0 {
            return Err(ConversationError::ZeroRounds.into());
        }

        let specs = self.offered_tools();
        let mut transcript = vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(opening),
        ];
        let mut last_text: Option<String> = None;

        for round in 1..=self.max_rounds {
            let reply = self.model.chat(&transcript, &specs).await?;
            if let Some(text) = reply.text_content() {
                last_text = Some(text.to_string());
            }
            let calls = reply.tool_calls.clone();
            transcript.push(reply);

            if calls.is_empty() {
                debug!(round, "Assistant replied without a function call");
                transcript.push(ChatMessage::user(DEFAULT_AUTO_REPLY));
                continue;
            }

            let mut finished: Option<String> = None;
            for call in &calls {
                let content = if call.function.name == FINISH_TOOL {
                    match finish_result(call) {
                        Ok(result) => {
                            finished.get_or_insert(result);
                            "ok".to_string()
                        }
                        Err(err) => format!("error: {err}"),
                    }
                } else {
                    self.dispatch(round, call).await?
                };
                transcript.push(ChatMessage::tool_result(call.id.clone(), content));
            }

            if let Some(result) = finished {
                info!(round, "Conversation finished");
                return Ok(ConversationOutcome {
                    result,
                    termination: Termination::Finished,
                    rounds: round,
                    transcript,
                });
            }
        }

        warn!(
            max_rounds = self.max_rounds,
            "Conversation hit the round limit without calling finish"
        );
        match last_text {
            Some(result) => Ok(ConversationOutcome {
                result,
                termination: Termination::RoundLimit,
                rounds: self.max_rounds,
                transcript,
            }),
            None => Err(ConversationError::NoResult {
                rounds: self.max_rounds,
            }
            .into()),
        }
    }

    /// Executes one tool call and returns the text sent back as its result.
    async fn dispatch(&self, round: usize, call: &ToolCall) -> Result<String, AppError> {
        let name = call.function.name.as_str();
        let Some(tool) = self.tools.get(name) else {
            warn!(round, tool = name, "Model called an unknown function");
            return Ok(format!("error: unknown function '{name}'"));
        };

        let args = match parse_arguments(&call.function.arguments) {
            Ok(args) => args,
            Err(err) => return Ok(format!("error: {err}")),
        };

        info!(round, tool = name, "Executing function call");
        match tool.call(args).await {
            Ok(output) => Ok(output),
            Err(ToolError::Fatal(err)) => Err(err),
            Err(err) => {
                warn!(round, tool = name, error = %err, "Function call failed");
                Ok(format!("error: {err}"))
            }
        }
    }
}

fn finish_spec() -> ToolSpec {
    ToolSpec {
        name: FINISH_TOOL.to_string(),
        description: "End the task and hand over the final deliverable.".to_string(),
        parameters: string_params(&[("result", "The complete final deliverable")]),
    }
}

fn parse_arguments(raw: &str) -> Result<Value, ToolError> {
    if raw.trim().is_empty() {
        return Ok(json!({}));
    }
    serde_json::from_str(raw)
        .map_err(|e| ToolError::InvalidArguments(format!("arguments are not valid JSON: {e}")))
}

fn finish_result(call: &ToolCall) -> Result<String, ToolError> {
    let args = parse_arguments(&call.function.arguments)?;
    string_arg(&args, &["result"])
}
