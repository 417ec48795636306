//! Remote model access: one request per turn, with the conversation kept remotely in sync.

pub(crate) mod context;
mod error;

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use serde_json::{Value, json};

use crate::core::config::{Config, GenerationConfig};
use crate::core::content::{self, ContentPart};
use crate::core::message::ChatMessage;

pub use error::ChatError;
use error::{error_from_body, map_api_error};

/// Context window of the default model family (tokens).
pub const DEFAULT_CONTEXT_LENGTH: u64 = 1_048_576;

/// Anything that turns a content-part request into response text.
#[allow(async_fn_in_trait)]
pub trait RemoteModel {
    /// Send one request. On failure the model's conversation state is unchanged.
    async fn generate(&mut self, parts: &[ContentPart]) -> Result<String, ChatError>;

    /// Forget the conversation (logout / new session).
    fn reset(&mut self) {}
}

/// Chat session against an OpenAI-compatible endpoint.
pub struct ChatSession {
    client: Client<OpenAIConfig>,
    model: String,
    generation: GenerationConfig,
    system_instruction: String,
    context_length: u64,
    /// Previous user/assistant messages in API format.
    history: Vec<Value>,
}

impl ChatSession {
    pub fn new(config: &Config, model: &str) -> Self {
        Self {
            client: Client::with_config(config.openai_config.clone()),
            model: model.to_string(),
            generation: config.generation.clone(),
            system_instruction: config.system_instruction.clone(),
            context_length: DEFAULT_CONTEXT_LENGTH,
            history: Vec::new(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Number of stored user/assistant messages.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Load a saved transcript as remote history so a resumed chat keeps its context.
    pub fn seed_history(&mut self, transcript: &[ChatMessage]) {
        self.history = transcript
            .iter()
            .map(|m| json!({"role": m.role.as_str(), "content": m.content}))
            .collect();
    }

    fn build_messages(&self, user_msg: &Value, with_history: bool) -> Vec<Value> {
        let mut messages = Vec::with_capacity(self.history.len() + 2);
        messages.push(json!({"role": "system", "content": self.system_instruction}));
        if with_history {
            messages.extend(self.history.iter().cloned());
        }
        messages.push(user_msg.clone());
        context::truncate_if_needed(&mut messages, self.context_length);
        messages
    }

    async fn request(&self, messages: Vec<Value>) -> Result<String, ChatError> {
        log::info!("Calling {} with {} messages", self.model, messages.len());
        let response: Value = self
            .client
            .chat()
            .create_byot::<_, Value>(json!({
                "model": self.model,
                "messages": messages,
                "temperature": self.generation.temperature,
                "top_p": self.generation.top_p,
                "max_tokens": self.generation.max_output_tokens,
            }))
            .await
            .map_err(map_api_error)?;

        if let Some(err) = response.get("error") {
            return Err(error_from_body(err));
        }
        let text = response_text(&response).ok_or(ChatError::EmptyResponse)?;
        if text.trim().is_empty() {
            return Err(ChatError::EmptyResponse);
        }
        Ok(text)
    }

    /// One request outside the conversation (history is neither sent nor updated).
    pub async fn complete_once(&self, parts: &[ContentPart]) -> Result<String, ChatError> {
        let user_msg = json!({"role": "user", "content": content::to_api_content(parts)});
        self.request(self.build_messages(&user_msg, false)).await
    }
}

impl RemoteModel for ChatSession {
    async fn generate(&mut self, parts: &[ContentPart]) -> Result<String, ChatError> {
        log::debug!("Request parts: {}", content::describe(parts));
        let mut user_msg = json!({"role": "user", "content": content::to_api_content(parts)});
        let text = self.request(self.build_messages(&user_msg, true)).await?;

        context::summarize_binary_parts(&mut user_msg);
        self.history.push(user_msg);
        self.history
            .push(json!({"role": "assistant", "content": text.clone()}));
        Ok(text)
    }

    fn reset(&mut self) {
        self.history.clear();
    }
}

/// Pull the assistant text out of a chat completion response.
/// Handles both string content and array-of-blocks format.
pub fn response_text(response: &Value) -> Option<String> {
    let content = response
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?;
    if let Some(s) = content.as_str() {
        return Some(s.to_string());
    }
    let blocks = content.as_array()?;
    let text: Vec<&str> = blocks
        .iter()
        .filter_map(|b| b.get("text").and_then(|t| t.as_str()))
        .collect();
    if text.is_empty() {
        None
    } else {
        Some(text.concat())
    }
}
