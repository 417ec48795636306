use std::env;
use std::time::Duration;

use async_openai::config::OpenAIConfig;

use crate::core::app;

/// Gemini's OpenAI-compatible endpoint.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_TYPING_DELAY_MS: u64 = 50;
const DEFAULT_MAX_CONVERSATIONS: u32 = 100;

/// Sampling settings sent with every request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            top_p: 0.95,
            max_output_tokens: 8192,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub openai_config: OpenAIConfig,
    pub model_id: String,
    pub generation: GenerationConfig,
    pub system_instruction: String,
    pub typing_delay: Duration,
    pub max_conversations: u32,
}

#[cfg(test)]
impl Config {
    /// Config pointing at an unreachable endpoint, for tests that never send requests.
    pub fn for_tests() -> Self {
        Self {
            openai_config: OpenAIConfig::new()
                .with_api_base("http://127.0.0.1:9")
                .with_api_key("test-key"),
            model_id: DEFAULT_MODEL.to_string(),
            generation: GenerationConfig::default(),
            system_instruction: system_instruction(),
            typing_delay: Duration::ZERO,
            max_conversations: DEFAULT_MAX_CONVERSATIONS,
        }
    }
}

/// Settings that do not need the API key (history pruning, typing pace).
/// Used by subcommands that never reach the remote model.
#[derive(Debug, Clone)]
pub struct LocalSettings {
    pub typing_delay: Duration,
    pub max_conversations: u32,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingApiKey,
    InvalidNumber { var: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingApiKey => write!(f, "GEMINI_API_KEY is not set"),
            ConfigError::InvalidNumber { var, value } => {
                write!(f, "{} must be a non-negative integer, got '{}'", var, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

fn env_u64(var: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
        Err(_) => Ok(default),
    }
}

/// Load the settings that do not require an API key.
pub fn load_local() -> Result<LocalSettings, ConfigError> {
    let typing_delay_ms = env_u64("INTERLINK_TYPING_DELAY_MS", DEFAULT_TYPING_DELAY_MS)?;
    let max_conversations = env_u64(
        "INTERLINK_MAX_CONVERSATIONS",
        DEFAULT_MAX_CONVERSATIONS as u64,
    )?;
    Ok(LocalSettings {
        typing_delay: Duration::from_millis(typing_delay_ms),
        max_conversations: u32::try_from(max_conversations).unwrap_or(u32::MAX),
    })
}

/// Load configuration from environment. Returns an error if API key is missing.
pub fn load() -> Result<Config, ConfigError> {
    let base_url = env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

    let api_key = env::var("GEMINI_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty())
        .ok_or(ConfigError::MissingApiKey)?;

    let model_id = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

    let local = load_local()?;

    let openai_config = OpenAIConfig::new()
        .with_api_base(base_url)
        .with_api_key(api_key);

    Ok(Config {
        openai_config,
        model_id,
        generation: GenerationConfig::default(),
        system_instruction: system_instruction(),
        typing_delay: local.typing_delay,
        max_conversations: local.max_conversations,
    })
}

/// Persona and formatting rules sent as the system message.
pub fn system_instruction() -> String {
    format!(
        "Your name is {name}, an AI chatbot on Interlink. You were created by the Interlink team. \
Interlink is a website that gives Carnegie Vanguard High School (CVHS) freshmen resources to stay \
on top of their assignments and tests, plus notes, simulations, and the question of the day (QOTD). \
Your job is to answer prompts thoroughly and correctly.\n\
When outputting bold or italic text, use correct markdown.\n\
When outputting lists, put every item on its own line. Never squeeze a list into one line.\n\
When outputting code, use a fenced code block and do not repeat the language name inside the block.",
        name = app::ASSISTANT_NAME
    )
}

/// First message of every new session.
pub fn greeting() -> String {
    format!(
        "Hello! I'm {}, your personal academic assistant for Carnegie Vanguard High School. \
I'm here to help you stay on top of your assignments, tests, and provide you with valuable \
resources. How can I assist you today?",
        app::ASSISTANT_NAME
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_defaults_match_deterministic_settings() {
        let g = GenerationConfig::default();
        assert_eq!(g.temperature, 0.0);
        assert_eq!(g.top_p, 0.95);
        assert_eq!(g.max_output_tokens, 8192);
    }

    #[test]
    fn missing_api_key_message_names_variable() {
        assert_eq!(ConfigError::MissingApiKey.to_string(), "GEMINI_API_KEY is not set");
    }

    #[test]
    fn invalid_number_message_names_variable_and_value() {
        let e = ConfigError::InvalidNumber {
            var: "INTERLINK_TYPING_DELAY_MS",
            value: "fast".to_string(),
        };
        let msg = e.to_string();
        assert!(msg.contains("INTERLINK_TYPING_DELAY_MS"));
        assert!(msg.contains("fast"));
    }

    #[test]
    fn system_instruction_mentions_assistant_name() {
        assert!(system_instruction().contains(app::ASSISTANT_NAME));
        assert!(greeting().starts_with("Hello! I'm Interlink AI"));
    }
}
