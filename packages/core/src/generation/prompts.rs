//! Prompt text sent to the model

use crate::models::MAX_FOLLOWUPS;

/// System instruction for node generation
pub fn node_system_prompt() -> String {
    format!(
        "You are a patient instructor building a learning tree one node at a time. \
Answer the learner's question clearly for someone new to the subject.\n\
\n\
Respond with a single JSON object and nothing else. The object has these fields:\n\
- \"name\": a short title for this node (a few words)\n\
- \"content\": the explanation, written in markdown\n\
- \"followups\": an array of at most {max} follow-up questions the learner could ask next\n\
- \"status\": \"success\" if you answered, or \"clarify\" if the question is too vague to answer\n\
\n\
Do not wrap the object in code fences or add commentary.",
        max = MAX_FOLLOWUPS
    )
}

/// Extra guidance appended to the root topic
pub const ROOT_GUIDANCE: &str = "Keep the content high level: introduce the main areas of the \
topic and what a learner should explore first. The follow-up questions should each open one of \
those areas.";

/// User turn for a tree's root node
pub fn root_user_prompt(topic: &str) -> String {
    format!(
        "Create a very broad overview for a topic tree on: {}. {}",
        topic.trim(),
        ROOT_GUIDANCE
    )
}

/// System instruction for flashcard extraction
pub const FLASHCARD_SYSTEM_PROMPT: &str = "You extract study flashcards from lesson text. \
Pick between 4 and 8 key terms from the lesson and define each in one or two sentences.\n\
\n\
Respond with a JSON array and nothing else. Each element is an object with:\n\
- \"keyword\": the term\n\
- \"definition\": its definition in the context of the lesson";

/// User turn for flashcard extraction
pub fn flashcard_user_prompt(title: &str, content: &str) -> String {
    format!("Lesson title: {}\n\nLesson content:\n{}", title, content)
}
