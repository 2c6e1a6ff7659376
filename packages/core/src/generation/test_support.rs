//! Scripted text-generation client for unit tests

use async_trait::async_trait;
use learntree_nlp_engine::{
    GenerationError, GenerationRequest, Result, TextGeneration, TextGenerationClient,
};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

pub(crate) enum Reply {
    Complete(String),
    Fragments(Vec<Result<String>>),
    Fail(GenerationError),
}

/// Answers each `send` with the next scripted reply and records the request
pub(crate) struct ScriptedClient {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<GenerationRequest>>,
    delay: Option<Duration>,
}

impl ScriptedClient {
    pub fn script(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    pub fn complete(text: impl Into<String>) -> Self {
        Self::script(vec![Reply::Complete(text.into())])
    }

    pub fn fragments(fragments: Vec<Result<String>>) -> Self {
        Self::script(vec![Reply::Fragments(fragments)])
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerationClient for ScriptedClient {
    async fn send(&self, request: GenerationRequest) -> Result<TextGeneration> {
        self.requests.lock().unwrap().push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Complete(text)) => Ok(TextGeneration::Complete(text)),
            Some(Reply::Fragments(fragments)) => Ok(TextGeneration::from_fragments(fragments)),
            Some(Reply::Fail(err)) => Err(err),
            None => Err(GenerationError::invalid_response("no scripted reply left")),
        }
    }
}
