//! Canned [`ModelClient`] for tests. Counts calls and records prompts.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::schema::OutputSchema;
use super::{LlmError, ModelClient};

pub enum StubReply {
    Text(String),
    ApiError { status: u16, message: String },
    Timeout { seconds: u64 },
}

pub struct StubModel {
    reply: StubReply,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
    systems: Mutex<Vec<String>>,
}

impl StubModel {
    pub fn replying(text: impl Into<String>) -> Self {
        Self::with_reply(StubReply::Text(text.into()))
    }

    pub fn failing(status: u16, message: impl Into<String>) -> Self {
        Self::with_reply(StubReply::ApiError {
            status,
            message: message.into(),
        })
    }

    pub fn timing_out(seconds: u64) -> Self {
        Self::with_reply(StubReply::Timeout { seconds })
    }

    fn with_reply(reply: StubReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
            systems: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }

    pub fn last_system(&self) -> Option<String> {
        self.systems.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ModelClient for StubModel {
    async fn generate_json(
        &self,
        system: &str,
        prompt: &str,
        _schema: &OutputSchema,
    ) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.systems.lock().unwrap().push(system.to_string());
        match &self.reply {
            StubReply::Text(text) => Ok(text.clone()),
            StubReply::ApiError { status, message } => Err(LlmError::Api {
                status: *status,
                message: message.clone(),
            }),
            StubReply::Timeout { seconds } => Err(LlmError::Timeout { seconds: *seconds }),
        }
    }

    fn model_name(&self) -> &str {
        "stub-model"
    }
}
