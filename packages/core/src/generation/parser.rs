//! Structured node parsing
//!
//! Models are asked for a bare JSON object but routinely wrap it in commentary or code
//! fences. [`parse_structured_node`] cuts the candidate object out of the surrounding text,
//! decodes it strictly, and validates every field, reporting all problems at once.

use crate::generation::error::ParseError;
use crate::models::{NodeContent, MAX_FOLLOWUPS};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Model's own verdict on whether it could answer the prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Success,
    Clarify,
}

impl NodeStatus {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "success" => Some(Self::Success),
            "clarify" => Some(Self::Clarify),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Clarify => "clarify",
        }
    }
}

/// Validated node fields as produced by the model
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredNode {
    pub name: String,
    pub content: NodeContent,
    pub followups: Vec<String>,
    pub status: Option<NodeStatus>,
}

impl StructuredNode {
    /// JSON object in the same shape the parser accepts
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("name".to_string(), Value::String(self.name.clone()));
        object.insert("content".to_string(), self.content.to_value());
        object.insert(
            "followups".to_string(),
            Value::Array(self.followups.iter().cloned().map(Value::String).collect()),
        );
        if let Some(status) = self.status {
            object.insert("status".to_string(), Value::String(status.as_str().to_string()));
        }
        Value::Object(object)
    }
}

/// Slice from the first `open` to the last `close`, inclusive
///
/// Returns `None` when either delimiter is missing or they are out of order.
pub(crate) fn extract_delimited(text: &str, open: char, close: char) -> Option<&str> {
    let start = text.find(open)?;
    let end = text.rfind(close)?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Parse free-form model output into a [`StructuredNode`]
pub fn parse_structured_node(raw: &str) -> Result<StructuredNode, ParseError> {
    let trimmed = raw.trim();
    let candidate = extract_delimited(trimmed, '{', '}').unwrap_or(trimmed);

    let value: Value = serde_json::from_str(candidate)
        .map_err(|e| ParseError::malformed(format!("{} (input: {})", e, preview(candidate))))?;

    let object = match value {
        Value::Object(object) => object,
        other => {
            return Err(ParseError::mismatch(vec![format!(
                "expected a JSON object, found {}",
                json_type(&other)
            )]))
        }
    };

    validate_object(&object)
}

fn validate_object(object: &Map<String, Value>) -> Result<StructuredNode, ParseError> {
    let mut problems = Vec::new();

    let name = match object.get("name") {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::String(_)) => {
            problems.push("name: must not be empty".to_string());
            None
        }
        Some(other) => {
            problems.push(format!("name: expected string, found {}", json_type(other)));
            None
        }
        None => {
            problems.push("name: missing".to_string());
            None
        }
    };

    let content = match object.get("content") {
        Some(Value::String(s)) => Some(NodeContent::Markdown { text: s.clone() }),
        Some(Value::Object(map)) => Some(NodeContent::from_object(map.clone())),
        Some(other) => {
            problems.push(format!(
                "content: expected string or object, found {}",
                json_type(other)
            ));
            None
        }
        None => {
            problems.push("content: missing".to_string());
            None
        }
    };

    let followups = match object.get("followups") {
        Some(Value::Array(items)) => {
            let mut followups = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                match item {
                    Value::String(s) => followups.push(s.clone()),
                    other => problems.push(format!(
                        "followups[{}]: expected string, found {}",
                        index,
                        json_type(other)
                    )),
                }
            }
            if items.len() > MAX_FOLLOWUPS {
                problems.push(format!(
                    "followups: {} entries exceeds the maximum of {}",
                    items.len(),
                    MAX_FOLLOWUPS
                ));
            }
            Some(followups)
        }
        Some(other) => {
            problems.push(format!(
                "followups: expected array, found {}",
                json_type(other)
            ));
            None
        }
        None => {
            problems.push("followups: missing".to_string());
            None
        }
    };

    let status = match object.get("status") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => {
            let status = NodeStatus::parse(s);
            if status.is_none() {
                problems.push(format!(
                    "status: expected \"success\" or \"clarify\", found \"{}\"",
                    s
                ));
            }
            status
        }
        Some(other) => {
            problems.push(format!("status: expected string, found {}", json_type(other)));
            None
        }
    };

    match (name, content, followups) {
        (Some(name), Some(content), Some(followups)) if problems.is_empty() => {
            Ok(StructuredNode {
                name,
                content,
                followups,
                status,
            })
        }
        _ => Err(ParseError::mismatch(problems)),
    }
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Short prefix of model output for error messages
pub(crate) fn preview(text: &str) -> String {
    const MAX_PREVIEW: usize = 80;
    match text.char_indices().nth(MAX_PREVIEW) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
