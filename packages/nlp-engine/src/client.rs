/// Text generation client abstraction
///
/// Callers send a system/user prompt pair and receive either the complete text or an
/// incrementally delivered sequence of fragments. Either way the result must be drained
/// with [`TextGeneration::collect`] before the text is used: a fragment error aborts the
/// whole generation and no partial text is returned.
use crate::error::{GenerationError, Result};
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};

/// One generation request (a system instruction plus a single user turn)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub user_prompt: String,
}

impl GenerationRequest {
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
        }
    }
}

/// Result of a generation call
pub enum TextGeneration {
    /// The provider answered with the full text at once
    Complete(String),

    /// The provider is delivering text fragments in order
    Streaming(BoxStream<'static, Result<String>>),
}

impl std::fmt::Debug for TextGeneration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Complete(text) => f.debug_tuple("Complete").field(text).finish(),
            Self::Streaming(_) => f.write_str("Streaming(..)"),
        }
    }
}

impl TextGeneration {
    /// Wrap an iterator of fragments as a streaming result
    pub fn from_fragments<I>(fragments: I) -> Self
    where
        I: IntoIterator<Item = Result<String>>,
        I::IntoIter: Send + 'static,
    {
        Self::Streaming(futures::stream::iter(fragments).boxed())
    }

    /// Drain the result into a single string
    ///
    /// Fragments are appended verbatim in delivery order. The first fragment error is
    /// returned immediately and the text accumulated so far is discarded.
    pub async fn collect(self) -> Result<String> {
        match self {
            Self::Complete(text) => Ok(text),
            Self::Streaming(mut fragments) => {
                let mut text = String::new();
                let mut count = 0usize;
                while let Some(fragment) = fragments.next().await {
                    text.push_str(&fragment?);
                    count += 1;
                }
                tracing::debug!("Drained {} fragments ({} bytes)", count, text.len());
                Ok(text)
            }
        }
    }
}

/// Abstraction over a text-generation backend
///
/// Implementations must be `Send + Sync` so they can be shared behind an `Arc` across
/// request handlers.
#[async_trait]
pub trait TextGenerationClient: Send + Sync {
    /// Send one request to the backend
    async fn send(&self, request: GenerationRequest) -> Result<TextGeneration>;
}

/// Fails every request; useful as a placeholder when no provider is configured
#[derive(Debug, Default, Clone)]
pub struct UnconfiguredClient;

#[async_trait]
impl TextGenerationClient for UnconfiguredClient {
    async fn send(&self, _request: GenerationRequest) -> Result<TextGeneration> {
        Err(GenerationError::MissingApiKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_collect_complete() {
        let text = TextGeneration::Complete("hello".to_string())
            .collect()
            .await
            .unwrap();
        assert_eq!(text, "hello");
    }

    #[tokio::test]
    async fn test_collect_streaming_preserves_order_and_whitespace() {
        let generation = TextGeneration::from_fragments(vec![
            Ok("{\"name\":".to_string()),
            Ok(" \"Rust\"".to_string()),
            Ok("".to_string()),
            Ok(" }\n".to_string()),
        ]);
        let text = generation.collect().await.unwrap();
        assert_eq!(text, "{\"name\": \"Rust\" }\n");
    }

    #[tokio::test]
    async fn test_collect_streaming_fails_fast() {
        let generation = TextGeneration::from_fragments(vec![
            Ok("partial".to_string()),
            Err(GenerationError::stream("connection reset")),
            Ok("never read".to_string()),
        ]);
        let err = generation.collect().await.unwrap_err();
        assert!(matches!(err, GenerationError::Stream(_)));
    }

    #[tokio::test]
    async fn test_unconfigured_client() {
        let err = UnconfiguredClient
            .send(GenerationRequest::new("sys", "user"))
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::MissingApiKey));
    }
}
