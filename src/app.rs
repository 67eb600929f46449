// src/app.rs
use std::sync::Arc;

use crossterm::event::KeyCode;
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::task::JoinHandle;

use crate::answer::{AnswerError, AnswerService};
use crate::config::Config;
use crate::session::{Message, Transcript};

pub const APOLOGY: &str = "Sorry, I encountered an error. Please try again later.";

type TurnOutcome = Result<String, AnswerError>;

/// What the input control should do with a key after the controller saw it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// The controller acted on the key; skip the default (newline) behaviour.
    Consumed,
    PassThrough,
}

#[derive(Debug)]
struct InFlight {
    outcome: oneshot::Receiver<TurnOutcome>,
    task: JoinHandle<()>,
}

/// Session controller: owns the transcript, the draft and the single-flight gate.
///
/// All mutation goes through `&mut self`; the answer service runs on a spawned
/// task and its outcome is applied by [`App::poll_settled`] or [`App::settle`].
pub struct App {
    transcript: Transcript,
    draft: String,
    in_flight: Option<InFlight>,
    revision: u64,
    answers: Arc<dyn AnswerService>,
}

impl App {
    pub fn new(config: &Config, answers: Arc<dyn AnswerService>) -> Self {
        let transcript = Transcript::new(config.greeting());
        log::debug!("Session {} started", transcript.id);
        App {
            transcript,
            draft: String::new(),
            in_flight: None,
            revision: 0,
            answers,
        }
    }

    pub fn messages(&self) -> &[Message] {
        self.transcript.messages()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Bumped on every change to the log or the pending flag.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn update_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Starts a turn. Returns false (and changes nothing) when the question is
    /// blank or another turn is still pending.
    pub fn submit_turn(&mut self, question_text: &str) -> bool {
        let question = question_text.trim();
        if question.is_empty() {
            log::debug!("Ignoring blank submission");
            return false;
        }
        if self.is_pending() {
            log::debug!("Ignoring submission while a turn is pending");
            return false;
        }

        let message = Message::user(question_text);
        log::debug!("Appending user message {}", message.id);
        self.transcript.push(message);
        self.draft.clear();

        let (tx, rx) = oneshot::channel();
        let answers = Arc::clone(&self.answers);
        let question = question.to_string();
        log::info!("Submitting question ({} chars)", question.chars().count());
        let task = tokio::spawn(async move {
            let outcome = answers.ask(&question).await;
            // receiver is gone only when the session was dropped
            let _ = tx.send(outcome);
        });
        self.in_flight = Some(InFlight { outcome: rx, task });
        self.revision += 1;
        true
    }

    pub fn on_key_commit(&mut self, key: KeyCode, shift_held: bool) -> KeyDisposition {
        if key != KeyCode::Enter || shift_held {
            return KeyDisposition::PassThrough;
        }
        let draft = self.draft.clone();
        self.submit_turn(&draft);
        KeyDisposition::Consumed
    }

    /// Applies the pending turn's outcome if it has arrived. Never blocks.
    pub fn poll_settled(&mut self) -> bool {
        let Some(in_flight) = self.in_flight.as_mut() else {
            return false;
        };
        let outcome = match in_flight.outcome.try_recv() {
            Ok(outcome) => outcome,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Closed) => Err(AnswerError::Interrupted),
        };
        self.apply_outcome(outcome);
        true
    }

    /// Waits for the pending turn, if any, and applies its outcome.
    pub async fn settle(&mut self) {
        let Some(in_flight) = self.in_flight.as_mut() else {
            return;
        };
        let outcome = (&mut in_flight.outcome)
            .await
            .unwrap_or(Err(AnswerError::Interrupted));
        self.apply_outcome(outcome);
    }

    fn apply_outcome(&mut self, outcome: TurnOutcome) {
        let reply = match outcome {
            Ok(answer) => answer,
            Err(e) => {
                log::warn!("Turn failed, showing apology: {}", e);
                APOLOGY.to_string()
            }
        };
        self.transcript.push(Message::assistant(reply));
        self.in_flight = None;
        self.revision += 1;
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.task.abort();
        }
        log::debug!(
            "Session {} closed: {} messages, opened {}, last activity {}",
            self.transcript.id,
            self.transcript.messages().len(),
            self.transcript.created_at.to_rfc3339(),
            self.transcript.last_activity_at.to_rfc3339(),
        );
    }
}
