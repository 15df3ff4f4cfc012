//! Datasette HTTP query backend

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::data::entity::CompiledQuery;
use crate::data::error::DataError;
use crate::data::traits::{QueryBackend, QueryResult};
use crate::utils::retry::{DEFAULT_BASE_DELAY_MS, retry_with_backoff_async};

const BACKEND: &str = "datasette";

/// How compiled values reach Datasette
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamMode {
    /// `:pN` placeholders stay in the SQL, values go as `pN` query parameters
    #[default]
    Bound,
    /// Values are rendered into the SQL as sanitized literals
    Inline,
}

impl std::fmt::Display for ParamMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bound => write!(f, "bound"),
            Self::Inline => write!(f, "inline"),
        }
    }
}

/// Connection settings for a Datasette instance
#[derive(Debug, Clone)]
pub struct DatasetteSettings {
    /// Base URL, e.g. `http://127.0.0.1:8001`
    pub url: String,
    /// Database name, queried at `{url}/{database}.json`
    pub database: String,
    pub timeout_secs: u64,
    pub param_mode: ParamMode,
    pub max_attempts: u32,
}

/// Error body returned by Datasette on failed queries
#[derive(Debug, Deserialize)]
struct DatasetteErrorBody {
    #[serde(default)]
    ok: Option<bool>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DatasetteClient {
    client: reqwest::Client,
    endpoint: String,
    timeout_secs: u64,
    param_mode: ParamMode,
    max_attempts: u32,
}

impl DatasetteClient {
    pub fn new(settings: DatasetteSettings) -> Result<Self, DataError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| DataError::Config(format!("failed to build HTTP client: {}", e)))?;

        let endpoint = format!(
            "{}/{}.json",
            settings.url.trim_end_matches('/'),
            settings.database
        );
        // Fail at startup rather than on the first request
        reqwest::Url::parse(&endpoint)
            .map_err(|e| DataError::Config(format!("invalid datasette url {}: {}", endpoint, e)))?;

        tracing::debug!(
            endpoint = %endpoint,
            timeout_secs = settings.timeout_secs,
            param_mode = %settings.param_mode,
            "Datasette client initialized"
        );

        Ok(Self {
            client,
            endpoint,
            timeout_secs: settings.timeout_secs,
            param_mode: settings.param_mode,
            max_attempts: settings.max_attempts,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Full request URL for a compiled query
    pub fn query_url(&self, query: &CompiledQuery) -> Result<reqwest::Url, DataError> {
        let mut pairs: Vec<(String, String)> = Vec::with_capacity(query.params.len() + 2);
        match self.param_mode {
            ParamMode::Bound => {
                pairs.push(("sql".to_string(), query.sql.clone()));
                pairs.extend(query.named_params().map(|(k, v)| (k, v.to_string())));
            }
            ParamMode::Inline => pairs.push(("sql".to_string(), query.to_inline_sql())),
        }
        pairs.push(("_shape".to_string(), "arrays".to_string()));

        reqwest::Url::parse_with_params(&self.endpoint, &pairs)
            .map_err(|e| DataError::Config(format!("invalid datasette url: {}", e)))
    }

    async fn fetch(&self, url: reqwest::Url) -> Result<QueryResult, DataError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DataError::from_reqwest(BACKEND, e, self.timeout_secs))?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| DataError::from_reqwest(BACKEND, e, self.timeout_secs))?;

        if !status.is_success() {
            return Err(DataError::remote(
                BACKEND,
                status.as_u16(),
                error_message(&body).unwrap_or_else(|| status.to_string()),
            ));
        }

        // Datasette can report SQL errors with a 200 and `ok: false`
        if let Ok(err) = serde_json::from_slice::<DatasetteErrorBody>(&body)
            && err.ok == Some(false)
        {
            return Err(DataError::remote(
                BACKEND,
                status.as_u16(),
                err.error.unwrap_or_else(|| "query failed".to_string()),
            ));
        }

        serde_json::from_slice(&body).map_err(|e| DataError::malformed(BACKEND, e.to_string()))
    }
}

fn error_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<DatasetteErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .or_else(|| {
            let text = String::from_utf8_lossy(body).trim().to_string();
            (!text.is_empty()).then_some(text)
        })
}

#[async_trait]
impl QueryBackend for DatasetteClient {
    async fn execute(&self, query: &CompiledQuery) -> Result<QueryResult, DataError> {
        let url = self.query_url(query)?;

        let result = retry_with_backoff_async(
            self.max_attempts,
            DEFAULT_BASE_DELAY_MS,
            DataError::is_transient,
            || self.fetch(url.clone()),
        )
        .await;

        match result {
            Ok((rows, attempts)) => {
                tracing::debug!(
                    rows = rows.rows.len(),
                    attempts,
                    "Datasette query complete"
                );
                Ok(rows)
            }
            Err((e, attempts)) => {
                tracing::warn!(error = %e, attempts, "Datasette query failed");
                Err(e)
            }
        }
    }

    fn name(&self) -> &'static str {
        BACKEND
    }
}
