//! Flashcard generation
//!
//! Extracts keyword/definition pairs from a node's title and content. Callers treat
//! every failure here as non-fatal.

use crate::generation::error::{FlashcardError, ParseError};
use crate::generation::parser::{extract_delimited, json_type, preview};
use crate::generation::prompts;
use crate::generation::DEFAULT_GENERATION_TIMEOUT;
use crate::models::FlashcardDraft;
use learntree_nlp_engine::{GenerationRequest, TextGenerationClient};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct FlashcardGenerator {
    client: Arc<dyn TextGenerationClient>,
    timeout: Duration,
}

impl FlashcardGenerator {
    pub fn new(client: Arc<dyn TextGenerationClient>) -> Self {
        Self {
            client,
            timeout: DEFAULT_GENERATION_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Generate flashcards for a node
    pub async fn generate(
        &self,
        title: &str,
        content: &str,
    ) -> Result<Vec<FlashcardDraft>, FlashcardError> {
        let request = GenerationRequest::new(
            prompts::FLASHCARD_SYSTEM_PROMPT,
            prompts::flashcard_user_prompt(title, content),
        );

        let client = Arc::clone(&self.client);
        let raw = tokio::time::timeout(self.timeout, async move {
            client.send(request).await?.collect().await
        })
        .await
        .map_err(|_| FlashcardError::Timeout(self.timeout))??;

        let cards = parse_flashcards(&raw)?;
        tracing::debug!("Parsed {} flashcards for '{}'", cards.len(), title);
        Ok(cards)
    }
}

/// Parse a JSON array of `{keyword, definition}` objects
///
/// Tries the whole trimmed text first, then the slice from the first `[` to the last `]`.
pub fn parse_flashcards(raw: &str) -> Result<Vec<FlashcardDraft>, ParseError> {
    let trimmed = raw.trim();
    let value = match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => value,
        Err(first) => extract_delimited(trimmed, '[', ']')
            .and_then(|slice| serde_json::from_str::<Value>(slice).ok())
            .ok_or_else(|| {
                ParseError::malformed(format!("{} (input: {})", first, preview(trimmed)))
            })?,
    };

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(ParseError::mismatch(vec![format!(
                "expected a JSON array, found {}",
                json_type(&other)
            )]))
        }
    };
    if items.is_empty() {
        return Err(ParseError::mismatch(vec![
            "expected at least one flashcard".to_string()
        ]));
    }

    let mut problems = Vec::new();
    let mut cards = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let keyword = non_empty_str(item, "keyword");
        let definition = non_empty_str(item, "definition");
        match (keyword, definition) {
            (Some(keyword), Some(definition)) => cards.push(FlashcardDraft {
                keyword: keyword.to_string(),
                definition: definition.to_string(),
            }),
            _ => problems.push(format!(
                "[{}]: expected an object with non-empty keyword and definition",
                index
            )),
        }
    }

    if problems.is_empty() {
        Ok(cards)
    } else {
        Err(ParseError::mismatch(problems))
    }
}

fn non_empty_str<'a>(item: &'a Value, field: &str) -> Option<&'a str> {
    item.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::test_support::ScriptedClient;
    use serde_json::json;

    fn cards_json() -> String {
        json!([
            { "keyword": "Ownership", "definition": "Each value has one owner." },
            { "keyword": "Borrow", "definition": "A reference that does not take ownership." }
        ])
        .to_string()
    }

    #[test]
    fn test_parse_bare_array() {
        let cards = parse_flashcards(&cards_json()).unwrap();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].keyword, "Ownership");
    }

    #[test]
    fn test_parse_array_inside_commentary() {
        let raw = format!("Here are your cards:\n{}\nGood luck!", cards_json());
        assert_eq!(parse_flashcards(&raw).unwrap().len(), 2);
    }

    #[test]
    fn test_parse_failures() {
        assert!(matches!(
            parse_flashcards("no cards here"),
            Err(ParseError::MalformedOutput { .. })
        ));
        assert!(matches!(
            parse_flashcards("[]"),
            Err(ParseError::SchemaMismatch { .. })
        ));
        assert!(matches!(
            parse_flashcards(r#"{"keyword":"k","definition":"d"}"#),
            Err(ParseError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_bad_elements_are_indexed() {
        let raw = json!([
            { "keyword": "ok", "definition": "fine" },
            { "keyword": "" , "definition": "empty keyword" },
            "not an object"
        ])
        .to_string();

        let ParseError::SchemaMismatch { problems } = parse_flashcards(&raw).unwrap_err() else {
            panic!("expected SchemaMismatch");
        };
        assert_eq!(problems.len(), 2);
        assert!(problems[0].starts_with("[1]"));
        assert!(problems[1].starts_with("[2]"));
    }

    #[tokio::test]
    async fn test_generate_sends_title_and_content() {
        let client = Arc::new(ScriptedClient::complete(cards_json()));
        let cards = FlashcardGenerator::new(client.clone())
            .generate("Ownership", "Each value has one owner.")
            .await
            .unwrap();

        assert_eq!(cards.len(), 2);
        let requests = client.requests();
        assert!(requests[0].user_prompt.contains("Lesson title: Ownership"));
        assert_eq!(requests[0].system_prompt, prompts::FLASHCARD_SYSTEM_PROMPT);
    }
}
