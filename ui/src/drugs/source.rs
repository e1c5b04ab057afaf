//! openFDA access: the three lookups a drug card needs.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::model::{DrugName, LabelDocument, TermCount, TimeCount};
use crate::core::config::AppConfig;
use crate::core::timing::with_timeout;

const LABEL_ENDPOINT: &str = "drug/label.json";
const EVENT_ENDPOINT: &str = "drug/event.json";
const ENFORCEMENT_ENDPOINT: &str = "drug/enforcement.json";

/// Which of the three lookups a result or failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Label,
    AdverseEvents,
    RecallFrequency,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [
        SourceKind::Label,
        SourceKind::AdverseEvents,
        SourceKind::RecallFrequency,
    ];
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SourceKind::Label => "label",
            SourceKind::AdverseEvents => "adverse events",
            SourceKind::RecallFrequency => "recall frequency",
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("openFDA returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("could not decode openFDA response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("no response within {0:?}")]
    Timeout(Duration),
}

/// The three independent lookups behind a drug card.
pub trait FdaSource {
    /// Label by exact brand name, at most one document.
    fn label(
        &self,
        name: &DrugName,
    ) -> impl Future<Output = Result<Option<LabelDocument>, FetchError>>;

    /// Adverse-event reaction counts, most frequent first.
    fn adverse_events(
        &self,
        name: &DrugName,
    ) -> impl Future<Output = Result<Vec<TermCount>, FetchError>>;

    /// Enforcement report counts per report date.
    fn recall_frequency(
        &self,
        name: &DrugName,
    ) -> impl Future<Output = Result<Vec<TimeCount>, FetchError>>;
}

#[derive(Debug, Deserialize)]
struct ResultsEnvelope<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

pub(crate) fn label_query(name: &DrugName) -> Vec<(&'static str, String)> {
    vec![
        ("search", format!("openfda.brand_name:\"{name}\"")),
        ("limit", "1".to_string()),
    ]
}

pub(crate) fn adverse_event_query(name: &DrugName) -> Vec<(&'static str, String)> {
    vec![
        ("search", format!("patient.drug.medicinalproduct:{name}")),
        ("count", "patient.reaction.reactionmeddrapt.exact".to_string()),
    ]
}

pub(crate) fn recall_query(name: &DrugName) -> Vec<(&'static str, String)> {
    vec![
        ("search", format!("product_description:{name}")),
        ("count", "report_date".to_string()),
    ]
}

/// Decode a `{"results": [...]}` body. openFDA reports "no matches" as a
/// 404 with code `NOT_FOUND`; that is an empty result, not a failure.
pub(crate) fn decode_results<T: DeserializeOwned>(
    status: u16,
    body: &str,
) -> Result<Vec<T>, FetchError> {
    if !(200..300).contains(&status) {
        let api_error = serde_json::from_str::<ErrorEnvelope>(body).ok();
        if status == 404 && api_error.as_ref().is_some_and(|e| e.error.code == "NOT_FOUND") {
            return Ok(Vec::new());
        }
        let message = api_error
            .map(|e| e.error.message)
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| body.chars().take(200).collect());
        return Err(FetchError::Status { status, message });
    }

    let envelope: ResultsEnvelope<T> = serde_json::from_str(body)?;
    Ok(envelope.results)
}

/// HTTP client for the public openFDA API.
#[derive(Debug, Clone)]
pub struct FdaClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl FdaClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.openfda_base_url.trim_end_matches('/').to_string(),
            timeout: config.request_timeout,
        }
    }

    async fn fetch_results<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&'static str, String)],
    ) -> Result<Vec<T>, FetchError> {
        let request = self
            .http
            .get(format!("{}/{endpoint}", self.base_url))
            .query(query)
            .build()?;
        debug!(url = %request.url(), "openFDA request");

        let exchange = async {
            let response = self.http.execute(request).await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        };
        let (status, body) = with_timeout(self.timeout, exchange)
            .await
            .map_err(|elapsed| FetchError::Timeout(elapsed.0))??;

        decode_results(status, &body)
    }
}

impl FdaSource for FdaClient {
    async fn label(&self, name: &DrugName) -> Result<Option<LabelDocument>, FetchError> {
        let docs: Vec<LabelDocument> = self
            .fetch_results(LABEL_ENDPOINT, &label_query(name))
            .await?;
        Ok(docs.into_iter().next())
    }

    async fn adverse_events(&self, name: &DrugName) -> Result<Vec<TermCount>, FetchError> {
        self.fetch_results(EVENT_ENDPOINT, &adverse_event_query(name))
            .await
    }

    async fn recall_frequency(&self, name: &DrugName) -> Result<Vec<TimeCount>, FetchError> {
        self.fetch_results(ENFORCEMENT_ENDPOINT, &recall_query(name))
            .await
    }
}
