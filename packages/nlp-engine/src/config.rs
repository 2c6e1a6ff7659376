/// Configuration for the text generation client
use serde::{Deserialize, Serialize};

/// Upper bound accepted for `max_tokens`
const MAX_SUPPORTED_TOKENS: u32 = 32_768;

/// Default OpenAI-compatible endpoint (Groq)
pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "compound-beta";

/// Configuration for chat-completion requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Bearer token for the provider. Never serialized.
    #[serde(skip)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible API (without `/chat/completions`)
    pub api_base: String,

    /// Model name or identifier
    pub model: String,

    /// Sampling temperature
    pub temperature: f32,

    /// Optional completion length cap
    pub max_tokens: Option<u32>,

    /// Request incremental (server-sent event) delivery
    pub stream: bool,

    /// Deadline for one complete generation, including draining a stream
    pub request_timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: None,
            stream: true,
            request_timeout_secs: 60,
        }
    }
}

impl GenerationConfig {
    /// Build a config from process environment variables
    ///
    /// - `GROQ_API_KEY`: provider key
    /// - `LEARNTREE_API_BASE`: endpoint base URL
    /// - `LEARNTREE_MODEL`: model identifier
    /// - `LEARNTREE_TEMPERATURE`: sampling temperature
    /// - `LEARNTREE_MAX_TOKENS`: completion length cap
    /// - `LEARNTREE_STREAM`: `true`/`false`
    /// - `LEARNTREE_TIMEOUT_SECS`: generation deadline
    ///
    /// Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (used by `from_env` and tests)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            api_key: lookup("GROQ_API_KEY").filter(|k| !k.trim().is_empty()),
            api_base: lookup("LEARNTREE_API_BASE").unwrap_or(defaults.api_base),
            model: lookup("LEARNTREE_MODEL").unwrap_or(defaults.model),
            temperature: lookup("LEARNTREE_TEMPERATURE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.temperature),
            max_tokens: lookup("LEARNTREE_MAX_TOKENS")
                .and_then(|v| v.parse().ok())
                .or(defaults.max_tokens),
            stream: lookup("LEARNTREE_STREAM")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.stream),
            request_timeout_secs: lookup("LEARNTREE_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_secs),
        }
    }

    /// Full URL of the chat completions endpoint
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model cannot be empty".to_string());
        }

        if !(self.api_base.starts_with("http://") || self.api_base.starts_with("https://")) {
            return Err(format!("api_base must be an http(s) URL, got '{}'", self.api_base));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err("temperature must be between 0.0 and 2.0".to_string());
        }

        if let Some(max_tokens) = self.max_tokens {
            if max_tokens == 0 || max_tokens > MAX_SUPPORTED_TOKENS {
                return Err(format!(
                    "max_tokens must be between 1 and {}",
                    MAX_SUPPORTED_TOKENS
                ));
            }
        }

        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }

        Ok(())
    }
}
