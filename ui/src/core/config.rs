//! Runtime configuration: service endpoints, model and the OpenAI credential.
//!
//! Nothing secret is compiled in. Native builds read a `.env` file (if any)
//! and the process environment; the browser build pulls the credential from
//! local storage, where the credential panel puts it.

use std::time::Duration;

use super::storage;

pub const DEFAULT_OPENFDA_BASE_URL: &str = "https://api.fda.gov";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, PartialEq)]
pub struct AppConfig {
    pub openfda_base_url: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub openai_api_key: Option<String>,
    pub request_timeout: Duration,
}

// Hand-written so the credential never ends up in a log line.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("openfda_base_url", &self.openfda_base_url)
            .field("openai_base_url", &self.openai_base_url)
            .field("openai_model", &self.openai_model)
            .field(
                "openai_api_key",
                &self.openai_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openfda_base_url: DEFAULT_OPENFDA_BASE_URL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            openai_api_key: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    /// Resolve configuration for the current platform.
    pub fn load() -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Err(err) = dotenvy::dotenv() {
                tracing::debug!("no .env file loaded: {err}");
            }
            Self::from_lookup(|key| std::env::var(key).ok())
        }

        #[cfg(target_arch = "wasm32")]
        {
            Self {
                openai_api_key: storage::load_api_key(),
                ..Self::default()
            }
        }
    }

    /// Build a config from an arbitrary key/value source (environment, tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let request_timeout = match read("DRUGLENS_REQUEST_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    tracing::warn!(
                        "ignoring DRUGLENS_REQUEST_TIMEOUT_SECS={raw:?}; using {}s",
                        DEFAULT_REQUEST_TIMEOUT_SECS
                    );
                    defaults.request_timeout
                }
            },
            None => defaults.request_timeout,
        };

        Self {
            openfda_base_url: read("OPENFDA_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.openfda_base_url),
            openai_base_url: read("OPENAI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.openai_base_url),
            openai_model: read("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            openai_api_key: read("OPENAI_API_KEY").or_else(storage::load_api_key),
            request_timeout,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.openai_api_key.is_some()
    }

    /// Replace the credential for this session (and persist it where supported).
    pub fn set_api_key(&mut self, value: &str) -> Result<(), storage::StorageError> {
        let trimmed = value.trim();
        self.openai_api_key = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        storage::store_api_key(trimmed)
    }
}
