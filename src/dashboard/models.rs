use chrono::{DateTime, Utc};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

use super::common::deserialize_timestamp;

/// Remote sources feeding the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceId {
    EmailStats,
    RecentEmails,
    ResponseStats,
}

impl SourceId {
    /// Every known source, in display order
    pub const ALL: [SourceId; 3] = [
        SourceId::EmailStats,
        SourceId::RecentEmails,
        SourceId::ResponseStats,
    ];

    /// Backend path for this source (relative to the API base URL)
    pub fn endpoint(&self) -> &'static str {
        match self {
            SourceId::EmailStats => "/api/dashboard/stats",
            SourceId::RecentEmails => "/api/dashboard/recent-emails",
            SourceId::ResponseStats => "/api/dashboard/response-stats",
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceId::EmailStats => "email-stats",
            SourceId::RecentEmails => "recent-emails",
            SourceId::ResponseStats => "response-stats",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Urgent,
    NotUrgent,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentBreakdown {
    #[serde(default)]
    pub positive: u64,
    #[serde(default)]
    pub negative: u64,
    #[serde(default)]
    pub neutral: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriorityBreakdown {
    #[serde(default)]
    pub urgent: u64,
    #[serde(default)]
    pub not_urgent: u64,
}

/// One hourly bucket as sent by the backend.
///
/// `hour` is kept raw: an unparsable value is still a valid bucket and is
/// rendered as "N/A" by the hourly view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyCount {
    pub hour: String,
    pub count: u64,
}

/// Payload of the `/api/dashboard/stats` endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EmailStats {
    pub total_emails_24h: u64,
    pub processed_emails: u64,
    pub pending_emails: u64,
    pub urgent_emails: u64,
    pub sentiment_breakdown: SentimentBreakdown,
    pub priority_breakdown: PriorityBreakdown,
    pub hourly_stats: Vec<HourlyCount>,
}

/// Payload of the `/api/dashboard/response-stats` endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseStats {
    pub response_rate: f64,
    pub avg_response_time_hours: f64,
    pub responses_sent: u64,
    pub emails_with_responses: u64,
    #[serde(default)]
    pub total_emails: u64,
}

impl ResponseStats {
    /// Range checks serde cannot express
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=100.0).contains(&self.response_rate) {
            return Err(format!("response_rate {} is outside [0, 100]", self.response_rate));
        }
        if self.avg_response_time_hours.is_nan() || self.avg_response_time_hours < 0.0 {
            return Err(format!(
                "avg_response_time_hours {} must be a non-negative number",
                self.avg_response_time_hours
            ));
        }
        Ok(())
    }
}

/// One item of the `/api/dashboard/recent-emails` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentEmailEntry {
    pub id: u64,
    pub subject: String,
    pub sender_email: String,
    // null while the email has not been analyzed yet
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub sentiment: Option<Sentiment>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub received_at: DateTime<Utc>,
    #[serde(default)]
    pub processed: bool,
    #[serde(default)]
    pub category: Option<String>,
}

/// Validated, typed payload of a successful fetch
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum SourcePayload {
    EmailStats(EmailStats),
    RecentEmails(Vec<RecentEmailEntry>),
    ResponseStats(ResponseStats),
}

impl SourcePayload {
    pub fn source_id(&self) -> SourceId {
        match self {
            SourcePayload::EmailStats(_) => SourceId::EmailStats,
            SourcePayload::RecentEmails(_) => SourceId::RecentEmails,
            SourcePayload::ResponseStats(_) => SourceId::ResponseStats,
        }
    }
}

/// Why a source call did not succeed
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceError {
    /// Endpoint unreachable or timed out
    #[error("network error: {message}")]
    Network { message: String },

    /// Non-2xx response
    #[error("server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// Payload failed structural validation
    #[error("malformed response: {message}")]
    Malformed { message: String, status: Option<u16> },
}

impl SourceError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            SourceError::Network { .. } => None,
            SourceError::Server { status, .. } => Some(*status),
            SourceError::Malformed { status, .. } => *status,
        }
    }
}

/// Normalized outcome of one remote call. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceResult {
    source: SourceId,
    outcome: Result<SourcePayload, SourceError>,
}

impl SourceResult {
    pub fn success(payload: SourcePayload) -> Self {
        SourceResult {
            source: payload.source_id(),
            outcome: Ok(payload),
        }
    }

    pub fn failure(source: SourceId, error: SourceError) -> Self {
        SourceResult {
            source,
            outcome: Err(error),
        }
    }

    pub fn source(&self) -> SourceId {
        self.source
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Present iff the call succeeded
    pub fn payload(&self) -> Option<&SourcePayload> {
        self.outcome.as_ref().ok()
    }

    pub fn error(&self) -> Option<&SourceError> {
        self.outcome.as_ref().err()
    }

    /// Present iff the call failed
    pub fn error_message(&self) -> Option<String> {
        self.error().map(|e| e.to_string())
    }

    pub fn status_code(&self) -> Option<u16> {
        self.error().and_then(SourceError::status_code)
    }
}

impl Serialize for SourceResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SourceResult", 5)?;
        state.serialize_field("source", &self.source)?;
        state.serialize_field("success", &self.is_success())?;
        state.serialize_field("payload", &self.payload())?;
        state.serialize_field("error_message", &self.error_message())?;
        state.serialize_field("status_code", &self.status_code())?;
        state.end()
    }
}
