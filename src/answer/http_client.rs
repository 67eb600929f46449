use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{AnswerError, AnswerService};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Deserialize, Debug)]
struct AnswerPayload {
    answer: Option<String>,
}

/// Client for the `POST /chat?question=...` endpoint.
#[derive(Debug, Clone)]
pub struct HttpAnswerClient {
    client: Client,
    base_url: String,
}

impl HttpAnswerClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn chat_url(&self) -> String {
        format!("{}/chat", self.base_url)
    }
}

/// Pulls the `answer` string out of a response body.
pub fn parse_answer(body: &str) -> Result<String, AnswerError> {
    let payload: AnswerPayload = serde_json::from_str(body)?;
    payload.answer.ok_or(AnswerError::MissingAnswer)
}

#[async_trait]
impl AnswerService for HttpAnswerClient {
    async fn ask(&self, question: &str) -> Result<String, AnswerError> {
        log::debug!("Asking {} : {:?}", self.chat_url(), question);

        let response = self.client
            .post(self.chat_url())
            .query(&[("question", question)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            log::error!("Answer service error: {} - {}", status, body);
            return Err(AnswerError::Status { status: status.as_u16(), body });
        }

        let answer = parse_answer(&body)?;
        log::debug!("Received answer ({} bytes)", answer.len());
        Ok(answer)
    }
}
