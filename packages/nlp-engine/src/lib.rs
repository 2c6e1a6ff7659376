/// LearnTree NLP Engine - Text Generation Client
///
/// This crate provides the text-generation seam used by LearnTree to expand prompts into
/// node content and flashcards.
///
/// # Features
///
/// - **Backend Abstraction**: [`TextGenerationClient`] trait, so the core never depends on a
///   specific provider
/// - **Streaming Aware**: results are either complete text or an ordered fragment stream,
///   drained with [`TextGeneration::collect`]
/// - **Groq / OpenAI-compatible**: [`GroqClient`] speaks the `/chat/completions` protocol,
///   including server-sent event streaming
///
/// # Example
///
/// ```ignore
/// use learntree_nlp_engine::{GenerationRequest, GroqClient, TextGenerationClient};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = GroqClient::from_env()?;
///
///     let text = client
///         .send(GenerationRequest::new("You are a patient instructor.", "What is a monad?"))
///         .await?
///         .collect()
///         .await?;
///
///     println!("{}", text);
///     Ok(())
/// }
/// ```
pub mod client;
pub mod config;
pub mod error;
pub mod groq;

// Re-export main types
pub use client::{GenerationRequest, TextGeneration, TextGenerationClient, UnconfiguredClient};
pub use config::GenerationConfig;
pub use error::{GenerationError, Result};
pub use groq::GroqClient;
