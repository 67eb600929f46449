//! Fake answer services for controller tests.

use super::{AnswerError, AnswerService};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::Notify;

/// Answers from a queue and records every question it was asked.
pub struct ScriptedAnswerService {
    outcomes: Mutex<VecDeque<Result<String, AnswerError>>>,
    pub questions: Mutex<Vec<String>>,
}

impl ScriptedAnswerService {
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            questions: Mutex::new(Vec::new()),
        }
    }

    pub fn answering(answer: &str) -> Self {
        let service = Self::new();
        service.queue_answer(answer);
        service
    }

    pub fn failing() -> Self {
        let service = Self::new();
        service.queue_error(AnswerError::Status { status: 503, body: "unavailable".to_string() });
        service
    }

    pub fn queue_answer(&self, answer: &str) {
        self.outcomes.lock().unwrap().push_back(Ok(answer.to_string()));
    }

    pub fn queue_error(&self, error: AnswerError) {
        self.outcomes.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnswerService for ScriptedAnswerService {
    async fn ask(&self, question: &str) -> Result<String, AnswerError> {
        self.questions.lock().unwrap().push(question.to_string());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(AnswerError::MissingAnswer))
    }
}

/// Holds every answer until `release` is called.
pub struct GatedAnswerService {
    inner: ScriptedAnswerService,
    gate: Notify,
}

impl GatedAnswerService {
    pub fn new(inner: ScriptedAnswerService) -> Self {
        Self { inner, gate: Notify::new() }
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn recorded_questions(&self) -> Vec<String> {
        self.inner.recorded_questions()
    }
}

#[async_trait]
impl AnswerService for GatedAnswerService {
    async fn ask(&self, question: &str) -> Result<String, AnswerError> {
        self.inner.questions.lock().unwrap().push(question.to_string());
        self.gate.notified().await;
        self.inner
            .outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(AnswerError::MissingAnswer))
    }
}
