//! Request and response bodies. All JSON is camelCase.

use admission_sin::{BackfillReport, Registration};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub service: &'static str,
    pub store: &'static str,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedResponse {
    pub success: bool,
    pub message: &'static str,
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sin_number: Option<String>,
    pub data: Registration,
}

/// Body of `POST /api/registrations/{id}/payment`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub payment_status: Option<String>,
    /// RFC 3339, a naive `YYYY-MM-DD[ T]HH:MM:SS` read as UTC, or a bare date.
    #[serde(default)]
    pub payment_time: Option<String>,
}

/// Parses a client-supplied payment time. Blank input means "now".
pub fn parse_payment_time(raw: &str) -> Option<Option<DateTime<Utc>>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(None);
    }
    if let Ok(time) = DateTime::parse_from_rfc3339(raw) {
        return Some(Some(time.with_timezone(&Utc)));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| Some(naive.and_utc()))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub success: bool,
    pub message: &'static str,
    pub id: String,
    pub transaction_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sin_number: Option<String>,
}

/// Listing query. Values that do not parse as non-negative integers are
/// ignored rather than rejected.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl ListParams {
    pub fn limit(&self) -> Option<usize> {
        parse_count(self.limit.as_deref())
    }

    pub fn offset(&self) -> Option<usize> {
        parse_count(self.offset.as_deref())
    }
}

fn parse_count(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|v| v.trim().parse().ok())
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub registrations: Vec<Registration>,
    pub metadata: ListMetadata,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMetadata {
    pub count: usize,
    pub has_more: bool,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedResponse {
    pub success: bool,
    pub message: &'static str,
    pub id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResponse {
    pub success: bool,
    pub id: String,
    /// `assigned`, `existing` or `ineligible`.
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sin_number: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BackfillResponse {
    pub success: bool,
    #[serde(flatten)]
    pub report: BackfillReport,
}
