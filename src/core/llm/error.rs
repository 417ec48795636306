//! Chat and API error types.

use thiserror::Error;

/// Shown after any failed request that is not rate limiting.
pub const GENERIC_HINT: &str = "Please try again in a moment.";

/// Shown when the failure looks like rate limiting.
pub const RATE_LIMIT_HINT: &str =
    "The API rate limit has been reached. Please wait a moment before trying again.";

/// Errors from a request to the remote model.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("{0}")]
    ApiAuth(String),
    #[error("Rate limited: {0}")]
    RateLimited(String),
    #[error("API error: {0}")]
    ApiMessage(String),
    #[error("The model returned an empty response")]
    EmptyResponse,
    #[error("{0}")]
    Other(Box<dyn std::error::Error + Send + Sync + 'static>),
}

impl ChatError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ChatError::RateLimited(_))
    }

    /// Follow-up advice shown under the error message.
    pub fn user_hint(&self) -> &'static str {
        if self.is_rate_limited() {
            RATE_LIMIT_HINT
        } else {
            GENERIC_HINT
        }
    }
}

/// True when an error description signals rate limiting (`rate_limit`, any case).
pub fn is_rate_limit_message(s: &str) -> bool {
    s.to_lowercase().contains("rate_limit")
}

/// Map async-openai or API errors into ChatError.
pub fn map_api_error<E>(e: E) -> ChatError
where
    E: std::fmt::Display + Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
{
    let s = e.to_string();
    if is_rate_limit_message(&s) {
        return ChatError::RateLimited(s);
    }
    if s.contains("401") || s.contains("API key not valid") || s.contains("API_KEY_INVALID") {
        return ChatError::ApiAuth(format!(
            "API error (401): the API key was rejected. Check GEMINI_API_KEY in .env. ({})",
            s
        ));
    }
    if s.contains("\"error\"")
        && let Some((_, rest)) = s.split_once("\"message\":\"")
        && let Some((msg, _)) = rest.split_once('"')
    {
        return ChatError::ApiMessage(msg.to_string());
    }
    ChatError::Other(e.into())
}

/// Classify an `error` object found in a response body.
pub fn error_from_body(err: &serde_json::Value) -> ChatError {
    let msg = err
        .get("message")
        .and_then(|v| v.as_str())
        .unwrap_or("Unknown error")
        .to_string();
    if is_rate_limit_message(&err.to_string()) {
        ChatError::RateLimited(msg)
    } else {
        ChatError::ApiMessage(msg)
    }
}
