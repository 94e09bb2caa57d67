use log::{debug, info, warn};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::pin::Pin;

use crate::config::ApiConfig;
use super::models::{
    EmailStats, RecentEmailEntry, ResponseStats, SourceError, SourceId, SourcePayload, SourceResult,
};

/// Boxed future returned by [`DataSourceClient::fetch`]
pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = SourceResult> + Send + 'a>>;

/// One call to one remote source.
///
/// Implementations must never fail: every outcome (transport error, non-2xx,
/// malformed payload) is folded into the returned [`SourceResult`].
pub trait DataSourceClient: Send + Sync {
    fn fetch<'a>(&'a self, source: SourceId) -> FetchFuture<'a>;
}

/// Dashboard backend client over HTTP
pub struct HttpDataSourceClient {
    http: reqwest::Client,
    base_url: String,
    recent_limit: usize,
}

impl HttpDataSourceClient {
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        info!("Initializing dashboard API client for {}", config.base_url);

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(HttpDataSourceClient {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            recent_limit: config.recent_limit,
        })
    }

    pub fn url_for(&self, source: SourceId) -> String {
        format!("{}{}", self.base_url, source.endpoint())
    }

    async fn fetch_source(&self, source: SourceId) -> Result<SourcePayload, SourceError> {
        let url = self.url_for(source);
        debug!("Fetching {} from {}", source, url);

        let mut request = self.http.get(&url);
        if source == SourceId::RecentEmails {
            request = request.query(&[("limit", self.recent_limit)]);
        }

        let response = request.send().await.map_err(|e| SourceError::Network {
            message: describe_transport_error(&e),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Server {
                status: status.as_u16(),
                message: server_message(status, &body),
            });
        }

        let body = response.bytes().await.map_err(|e| SourceError::Network {
            message: describe_transport_error(&e),
        })?;

        decode_payload(source, &body).map_err(|message| SourceError::Malformed {
            message,
            status: Some(status.as_u16()),
        })
    }
}

impl DataSourceClient for HttpDataSourceClient {
    fn fetch<'a>(&'a self, source: SourceId) -> FetchFuture<'a> {
        Box::pin(async move {
            match self.fetch_source(source).await {
                Ok(payload) => {
                    debug!("✅ {} fetched successfully", source);
                    SourceResult::success(payload)
                }
                Err(e) => {
                    warn!("⚠️  {} unavailable: {}", source, e);
                    SourceResult::failure(source, e)
                }
            }
        })
    }
}

/// Validate a raw response body against the shape expected for `source`
pub fn decode_payload(source: SourceId, body: &[u8]) -> Result<SourcePayload, String> {
    match source {
        SourceId::EmailStats => decode::<EmailStats>(body).map(SourcePayload::EmailStats),
        SourceId::RecentEmails => {
            decode::<Vec<RecentEmailEntry>>(body).map(SourcePayload::RecentEmails)
        }
        SourceId::ResponseStats => {
            let stats = decode::<ResponseStats>(body)?;
            stats.validate()?;
            Ok(SourcePayload::ResponseStats(stats))
        }
    }
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, String> {
    serde_json::from_slice(body).map_err(|e| e.to_string())
}

fn describe_transport_error(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "request timed out".to_string()
    } else if e.is_connect() {
        format!("unable to connect: {}", e)
    } else {
        e.to_string()
    }
}

/// Short human-readable message for a non-2xx response.
///
/// The backend reports errors as `{"detail": "..."}`; anything else falls
/// back to the canonical reason phrase.
fn server_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown status").to_string())
}
