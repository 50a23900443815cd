//! In-process [`Generator`] for tests.
//!
//! [`ScriptedGenerator`] answers from a queue of canned replies or from a
//! closure that sees the prompt, and records every prompt it receives so
//! tests can assert on call counts and prompt contents.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use saga_core::GenerationError;

use crate::provider::{GenerateResponse, Generator};

type Reply = Result<GenerateResponse, GenerationError>;
type Responder = dyn Fn(&str, usize) -> Reply + Send + Sync;

enum Script {
    Queue(Mutex<VecDeque<Reply>>),
    Responder(Box<Responder>),
}

/// A generator that replays scripted responses.
///
/// Cloning shares the script and the prompt log.
#[derive(Clone)]
pub struct ScriptedGenerator {
    script: Arc<Script>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedGenerator {
    /// Answer each call with the next queued reply.
    ///
    /// Once the queue is empty every call fails with a transport error.
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self::with_script(Script::Queue(Mutex::new(replies.into_iter().collect())))
    }

    /// Answer each call with one text response per item.
    pub fn texts<S: Into<String>>(texts: impl IntoIterator<Item = S>) -> Self {
        Self::new(texts.into_iter().map(|t| Ok(GenerateResponse::text(t))))
    }

    /// Answer every call with `responder(prompt, call_index)`.
    pub fn from_fn<F>(responder: F) -> Self
    where
        F: Fn(&str, usize) -> Reply + Send + Sync + 'static,
    {
        Self::with_script(Script::Responder(Box::new(responder)))
    }

    /// Fail every call with the same error.
    pub fn always_failing(err: GenerationError) -> Self {
        Self::from_fn(move |_, _| Err(err.clone()))
    }

    fn with_script(script: Script) -> Self {
        Self {
            script: Arc::new(script),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of calls received so far.
    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }

    /// Every prompt received, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    fn model(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, prompt: &str) -> Result<GenerateResponse, GenerationError> {
        let index = {
            let mut prompts = self.prompts.lock();
            prompts.push(prompt.to_string());
            prompts.len() - 1
        };
        match self.script.as_ref() {
            Script::Queue(queue) => queue
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(GenerationError::transport("script exhausted"))),
            Script::Responder(responder) => responder(prompt, index),
        }
    }
}
