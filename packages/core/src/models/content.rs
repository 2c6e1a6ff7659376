//! Node body shapes
//!
//! Node content is stored as opaque text. Most nodes hold markdown, but a model may answer
//! with a JSON object instead (usually `{overview, subtopics}`), which is stored verbatim.
//! Readers should use [`NodeContent::from_stored`] which detects an object body and
//! otherwise degrades to plain text, rather than assuming either form.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NodeContent {
    /// Markdown (or any free text)
    Markdown { text: String },

    /// JSON object body, every key kept as generated
    Structured { fields: Map<String, Value> },
}

impl NodeContent {
    /// Interpret a stored content string
    pub fn from_stored(stored: &str) -> Self {
        if stored.trim_start().starts_with('{') {
            if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(stored) {
                return Self::Structured { fields };
            }
        }
        Self::Markdown {
            text: stored.to_string(),
        }
    }

    pub fn from_object(fields: Map<String, Value>) -> Self {
        Self::Structured { fields }
    }

    /// `overview` of a structured body, when it is a string
    pub fn overview(&self) -> Option<&str> {
        match self {
            Self::Markdown { .. } => None,
            Self::Structured { fields } => fields.get("overview").and_then(Value::as_str),
        }
    }

    /// The string form written to storage
    pub fn into_stored(self) -> String {
        match self {
            Self::Markdown { text } => text,
            Self::Structured { fields } => Value::Object(fields).to_string(),
        }
    }

    /// JSON value in the shape the model produced
    pub fn to_value(&self) -> Value {
        match self {
            Self::Markdown { text } => Value::String(text.clone()),
            Self::Structured { fields } => Value::Object(fields.clone()),
        }
    }

    /// Best plain-text rendering (used as flashcard source material)
    ///
    /// Structured bodies render `overview` first, `subtopics` as a list, then any other
    /// keys as `key: value` lines.
    pub fn as_plain_text(&self) -> String {
        let fields = match self {
            Self::Markdown { text } => return text.clone(),
            Self::Structured { fields } => fields,
        };

        let mut lines = Vec::new();
        if let Some(overview) = self.overview() {
            lines.push(overview.to_string());
        }
        if let Some(Value::Array(items)) = fields.get("subtopics") {
            lines.extend(items.iter().map(|item| format!("- {}", value_text(item))));
        }
        for (key, value) in fields {
            let rendered = match key.as_str() {
                "overview" => value.is_string(),
                "subtopics" => value.is_array(),
                _ => false,
            };
            if !rendered {
                lines.push(format!("{}: {}", key, value_text(value)));
            }
        }
        lines.join("\n")
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
