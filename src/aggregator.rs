use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on one completion round trip.
pub const CHAT_TIMEOUT: Duration = Duration::from_secs(180);

#[derive(Debug, Error)]
pub enum AggregatorError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),
    #[error("the AI service took too long to answer")]
    Timeout,
    #[error("API error: {0}")]
    Api(String),
    #[error("empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for AggregatorError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(e)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

// --- Request types ---

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
}

// --- Response types ---

#[derive(Deserialize)]
struct ChatResponse {
    choices: Option<Vec<Choice>>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// `{"error": {"message": ...}}`, sometimes a bare string.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum ApiError {
    Object { message: String },
    Text(String),
}

impl ApiError {
    pub(crate) fn into_message(self) -> String {
        match self {
            Self::Object { message } | Self::Text(message) => message,
        }
    }
}

fn extract_text(response: ChatResponse) -> Result<String, AggregatorError> {
    if let Some(err) = response.error {
        return Err(AggregatorError::Api(err.into_message()));
    }

    response
        .choices
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or(AggregatorError::EmptyResponse)
}

/// OpenAI-compatible surface of the completion aggregator.
#[derive(Clone)]
pub struct AggregatorClient {
    http: reqwest::Client,
    base_url: String,
    chat_model: String,
    timeout: Duration,
}

impl AggregatorClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        chat_model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            chat_model: chat_model.into(),
            timeout: CHAT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn chat(&self, history: &[ChatTurn]) -> Result<String, AggregatorError> {
        let request = ChatRequest {
            model: &self.chat_model,
            messages: history,
        };

        let resp = self
            .http
            .post(format!("{}/v1/chat/completions", self.base_url))
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        match serde_json::from_str::<ChatResponse>(&body) {
            Ok(parsed) => extract_text(parsed),
            Err(_) if !status.is_success() => {
                Err(AggregatorError::Api(format!("status {status}: {}", snippet(&body))))
            }
            Err(e) => Err(AggregatorError::Api(format!("malformed response: {e}"))),
        }
    }
}

pub(crate) fn snippet(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
