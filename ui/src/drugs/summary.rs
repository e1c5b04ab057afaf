//! AI-written interpretation of a chart's data via the OpenAI chat API.

use std::time::Duration;

use dioxus::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::charts::ChartDatum;
use crate::core::config::AppConfig;
use crate::core::timing::with_timeout;
use crate::t;

pub const SYSTEM_PROMPT: &str = "You are a helpful specialist for FDA data.";

#[derive(Debug, thiserror::Error)]
pub enum SummaryError {
    #[error("no OpenAI API key configured")]
    MissingCredential,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("OpenAI returned HTTP {status}")]
    Status { status: u16, body: String },
    #[error("could not decode OpenAI response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("no response within {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// `term (count)` pairs joined with `, `.
pub fn format_dataset(data: &[ChartDatum]) -> String {
    data.iter()
        .map(|datum| format!("{} ({})", datum.term, datum.count))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn user_prompt(title: &str, data: &[ChartDatum]) -> String {
    format!(
        "Please shortly summarize and analyze the data for {title}. Here is the data: {}",
        format_dataset(data)
    )
}

/// First choice's message text, or `None` when the response has no such field.
pub fn extract_summary(body: &str) -> Result<Option<String>, serde_json::Error> {
    let response: ChatResponse = serde_json::from_str(body)?;
    Ok(response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .filter(|content| !content.trim().is_empty()))
}

/// Split on any newline convention (`\r\n`, `\r`, `\n`).
pub fn split_lines(text: &str) -> Vec<String> {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .split('\n')
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone)]
pub struct SummaryClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl SummaryClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: format!(
                "{}/chat/completions",
                config.openai_base_url.trim_end_matches('/')
            ),
            model: config.openai_model.clone(),
            api_key: config.openai_api_key.clone(),
            timeout: config.request_timeout,
        }
    }

    /// One chat completion for `data`. `Ok(None)` means the call succeeded
    /// but the response carried no summary text.
    pub async fn summarize(
        &self,
        title: &str,
        data: &[ChartDatum],
    ) -> Result<Option<String>, SummaryError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(SummaryError::MissingCredential)?;

        let prompt = user_prompt(title, data);
        let payload = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
        };
        debug!(title, points = data.len(), "requesting summary");

        let exchange = async {
            let response = self
                .http
                .post(&self.endpoint)
                .bearer_auth(api_key)
                .json(&payload)
                .send()
                .await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };
        let (status, body) = with_timeout(self.timeout, exchange)
            .await
            .map_err(|elapsed| SummaryError::Timeout(elapsed.0))??;

        if !(200..300).contains(&status) {
            return Err(SummaryError::Status { status, body });
        }
        Ok(extract_summary(&body)?)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum SummaryState {
    Ready(Vec<String>),
    Empty,
    Failed,
}

/// Panel that asks for a summary of `data` once, when it mounts.
#[component]
pub fn AiSummary(data: Vec<ChartDatum>, title: String) -> Element {
    let config = use_context::<Signal<AppConfig>>();

    let summary = use_resource(move || {
        let data = data.clone();
        let title = title.clone();
        // peek: a credential change must not re-issue requests for mounted panels.
        let client = SummaryClient::new(&config.peek());
        async move {
            match client.summarize(&title, &data).await {
                Ok(Some(text)) => SummaryState::Ready(split_lines(&text)),
                Ok(None) => {
                    warn!(title = %title, "summary response had no message content");
                    SummaryState::Empty
                }
                Err(SummaryError::Status { status, body }) => {
                    error!(title = %title, status, body = %body, "summary request rejected");
                    SummaryState::Failed
                }
                Err(err) => {
                    error!(title = %title, "summary request failed: {err}");
                    SummaryState::Failed
                }
            }
        }
    });

    let state = summary.cloned();

    rsx! {
        div { class: "ai-response",
            h3 { class: "ai-response__title", {t!("summary-heading")} }
            match state {
                None => rsx! {
                    p { class: "ai-response__pending", {t!("summary-pending")} }
                },
                Some(SummaryState::Ready(lines)) => rsx! {
                    p { class: "ai-response__text",
                        for (idx, line) in lines.into_iter().enumerate() {
                            if idx > 0 {
                                br {}
                            }
                            "{line}"
                        }
                    }
                },
                Some(SummaryState::Empty) => rsx! {},
                Some(SummaryState::Failed) => rsx! {
                    p { class: "ai-response__error", {t!("summary-missing-key")} }
                },
            }
        }
    }
}
