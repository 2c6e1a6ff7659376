/// Chat-completions client for Groq and other OpenAI-compatible providers
///
/// Streaming responses arrive as server-sent events:
///
/// ```text
/// data: {"choices":[{"delta":{"content":"Hel"}}]}
/// data: {"choices":[{"delta":{"content":"lo"}}]}
/// data: [DONE]
/// ```
///
/// Each `delta.content` becomes one fragment of a [`TextGeneration::Streaming`] result.
use crate::client::{GenerationRequest, TextGeneration, TextGenerationClient};
use crate::config::GenerationConfig;
use crate::error::{GenerationError, Result};
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde_json::{json, Value};
use std::time::Duration;

/// One decoded server-sent event line
#[derive(Debug, Clone, PartialEq)]
pub enum SseEvent {
    /// A text fragment
    Delta(String),
    /// End-of-stream marker
    Done,
    /// Comment, keep-alive, role-only delta, or a non-data field
    Skip,
}

/// Decode a single SSE line from a chat-completions stream
pub fn parse_sse_line(line: &str) -> Result<SseEvent> {
    let line = line.trim_end_matches(['\r', '\n']);

    let Some(payload) = line.strip_prefix("data:") else {
        return Ok(SseEvent::Skip);
    };
    let payload = payload.trim_start();

    if payload.is_empty() {
        return Ok(SseEvent::Skip);
    }
    if payload == "[DONE]" {
        return Ok(SseEvent::Done);
    }

    let value: Value = serde_json::from_str(payload).map_err(|e| {
        GenerationError::invalid_response(format!("Undecodable stream chunk: {}", e))
    })?;

    if let Some(error) = value.get("error") {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(GenerationError::stream(message));
    }

    match value
        .pointer("/choices/0/delta/content")
        .and_then(Value::as_str)
    {
        Some(text) if !text.is_empty() => Ok(SseEvent::Delta(text.to_string())),
        _ => Ok(SseEvent::Skip),
    }
}

/// Extract the answer text from a non-streaming completion body
pub fn extract_message_content(body: &Value) -> Result<String> {
    body.pointer("/choices/0/message/content")
        .or_else(|| body.pointer("/choices/0/text"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| GenerationError::invalid_response("No choices[0] content in response"))
}

/// Groq (OpenAI-compatible) chat completions client
#[derive(Debug, Clone)]
pub struct GroqClient {
    http: reqwest::Client,
    config: GenerationConfig,
    api_key: String,
}

impl GroqClient {
    /// Create a client from a validated configuration
    ///
    /// # Errors
    ///
    /// - `MissingApiKey` if `config.api_key` is unset
    /// - `ConfigError` if validation fails
    pub fn new(config: GenerationConfig) -> Result<Self> {
        config.validate().map_err(GenerationError::ConfigError)?;
        let api_key = config.api_key.clone().ok_or(GenerationError::MissingApiKey)?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            config,
            api_key,
        })
    }

    /// Create a client from environment variables (see [`GenerationConfig::from_env`])
    pub fn from_env() -> Result<Self> {
        Self::new(GenerationConfig::from_env())
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    fn request_body(&self, request: &GenerationRequest) -> Value {
        let mut body = json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": request.system_prompt },
                { "role": "user", "content": request.user_prompt },
            ],
            "temperature": self.config.temperature,
            "stream": self.config.stream,
        });
        if let Some(max_tokens) = self.config.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        body
    }
}

#[async_trait]
impl TextGenerationClient for GroqClient {
    async fn send(&self, request: GenerationRequest) -> Result<TextGeneration> {
        let url = self.config.completions_url();
        tracing::debug!(model = %self.config.model, stream = self.config.stream, "POST {}", url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(&request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Chat completion rejected with {}: {}", status, body);
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body,
            });
        }

        if self.config.stream {
            Ok(TextGeneration::Streaming(
                sse_fragments(response.bytes_stream()).boxed(),
            ))
        } else {
            let body: Value = response.json().await?;
            extract_message_content(&body).map(TextGeneration::Complete)
        }
    }
}

/// Turn an SSE response body into a stream of text fragments
///
/// Lines may be split across network chunks, so bytes are buffered until a newline.
fn sse_fragments<S, B, E>(chunks: S) -> impl Stream<Item = Result<String>> + Send
where
    S: Stream<Item = std::result::Result<B, E>> + Send,
    B: AsRef<[u8]> + Send,
    E: Into<GenerationError> + Send,
{
    async_stream::try_stream! {
        futures::pin_mut!(chunks);
        let mut buffer: Vec<u8> = Vec::new();
        let mut finished = false;

        'chunks: while let Some(chunk) = chunks.next().await {
            let chunk = chunk.map_err(Into::<GenerationError>::into)?;
            buffer.extend_from_slice(chunk.as_ref());

            while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = buffer.drain(..=pos).collect();
                match parse_sse_line(&String::from_utf8_lossy(&line))? {
                    SseEvent::Delta(text) => yield text,
                    SseEvent::Done => {
                        finished = true;
                        break 'chunks;
                    }
                    SseEvent::Skip => {}
                }
            }
        }

        if !finished && !buffer.is_empty() {
            if let SseEvent::Delta(text) = parse_sse_line(&String::from_utf8_lossy(&buffer))? {
                yield text;
            }
        }
    }
}
