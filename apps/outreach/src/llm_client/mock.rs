//! Scripted `LanguageModel` used by unit tests across the crate.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ChatMessage, LanguageModel, LlmError, ToolSpec};

/// One recorded `chat` invocation.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub messages: Vec<ChatMessage>,
    pub tool_names: Vec<String>,
}

impl RecordedCall {
    /// Content of the last message sent, i.e. the prompt for single-shot completions.
    pub fn last_content(&self) -> String {
        self.messages
            .last()
            .and_then(|m| m.content.clone())
            .unwrap_or_default()
    }
}

type Reply = Result<ChatMessage, LlmError>;

/// Replays queued replies in order and records every request.
/// Once the script runs out, further calls fail with `EmptyContent`.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let model = Self::new();
        for text in texts {
            model.push(ChatMessage::assistant(text));
        }
        model
    }

    pub fn push(&self, message: ChatMessage) {
        self.replies.lock().unwrap().push_back(Ok(message));
    }

    pub fn push_error(&self, error: LlmError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.calls().iter().map(RecordedCall::last_content).collect()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
    ) -> Result<ChatMessage, LlmError> {
        self.calls.lock().unwrap().push(RecordedCall {
            messages: messages.to_vec(),
            tool_names: tools.iter().map(|t| t.name.clone()).collect(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyContent))
    }
}
