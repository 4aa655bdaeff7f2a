//! Wire models for the Uptime Monitor API.
//!
//! These mirror the JSON the service sends and accepts. Variant-specific
//! payloads (monitor `settings`, contact `details`) are kept as opaque JSON
//! here; typed handling lives with the caller.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Contact detail keys whose values are credentials.
pub const SENSITIVE_DETAIL_KEYS: &[&str] = &["integration_key", "bearer_token", "api_key", "api_token"];

const REDACTED: &str = "[redacted]";

/// Copy of `details` with credential values replaced.
#[must_use]
pub fn redact_details(details: &Value) -> Value {
    match details {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    if SENSITIVE_DETAIL_KEYS.contains(&k.as_str()) {
                        (k.clone(), Value::String(REDACTED.to_string()))
                    } else {
                        (k.clone(), v.clone())
                    }
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

// =============================================================================
// Envelope
// =============================================================================

/// Response envelope wrapping every API payload.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub status: String,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> Envelope<T> {
    /// Error text carried by a non-ok envelope.
    pub fn failure_message(&self) -> String {
        self.error
            .clone()
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| "unknown error".to_string())
    }
}

/// Error-only view of an envelope, used for non-2xx bodies.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MonitorData {
    pub monitor: Option<Monitor>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MonitorList {
    #[serde(default)]
    pub monitors: Vec<Monitor>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContactData {
    pub contact: Option<Contact>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContactList {
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusPageData {
    pub status_page: Option<StatusPage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusPageList {
    #[serde(default)]
    pub status_pages: Vec<StatusPage>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

/// Pagination block attached to list responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Current page (1-based).
    pub page: u32,
    /// Page size.
    pub per_page: u32,
    /// Total number of items.
    pub total: u32,
    /// Total number of pages.
    pub total_pages: u32,
    /// Whether another page follows.
    pub has_next: bool,
    /// Whether a page precedes this one.
    pub has_prev: bool,
}

// =============================================================================
// Monitors
// =============================================================================

/// A monitor as returned by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monitor {
    /// Server-assigned identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Whether checks run.
    #[serde(default)]
    pub active: bool,
    /// Seconds between checks.
    #[serde(default)]
    pub check_interval: i64,
    /// Seconds before a check times out.
    #[serde(default)]
    pub timeout: i64,
    /// Consecutive failures before the monitor is marked down.
    #[serde(default)]
    pub fail_threshold: i64,
    /// Regions checks run from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regions: Option<Vec<String>>,
    /// Type-keyed settings object, e.g. `{"https": {...}}`.
    #[serde(default)]
    pub settings: Map<String, Value>,
    /// Contact ids notified on status changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Vec<String>>,
    /// Result of the latest check.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_status: Option<String>,
    /// Unix timestamp of creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    /// Unix timestamp of the last update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    /// Host for certificate monitoring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Port for certificate monitoring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
}

/// Body of `POST /api/monitors`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateMonitorRequest {
    /// Display name.
    pub name: String,
    /// Whether checks run.
    pub active: bool,
    /// Seconds between checks.
    pub check_interval: i64,
    /// Seconds before a check times out.
    pub timeout: i64,
    /// Consecutive failures before the monitor is marked down.
    pub fail_threshold: i64,
    /// Regions checks run from.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<String>,
    /// Type-keyed settings object.
    pub settings: Map<String, Value>,
    /// Contact ids to notify.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contacts: Vec<String>,
    /// Host for certificate monitoring.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Port for certificate monitoring.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
}

/// Body of `PUT /api/monitors/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateMonitorRequest {
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New active flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    /// New check interval.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_interval: Option<i64>,
    /// New timeout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
    /// New fail threshold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_threshold: Option<i64>,
    /// Replacement region list; an empty list clears it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regions: Option<Vec<String>>,
    /// Replacement settings object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Map<String, Value>>,
    /// Replacement contact list; an empty list clears it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Vec<String>>,
    /// New host; `""` clears it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// New port; `0` clears it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
}

// =============================================================================
// Contacts
// =============================================================================

/// A notification contact as returned by the service.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    /// Server-assigned identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Channel tag (`email`, `slack`, ...).
    pub channel: String,
    /// Channel-specific details.
    #[serde(default)]
    pub details: Value,
    /// Whether deliveries currently succeed.
    #[serde(default)]
    pub active: bool,
    /// Only notify on down transitions.
    #[serde(default)]
    pub down_alerts_only: bool,
    /// Last delivery error, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Unix timestamp of creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

impl fmt::Debug for Contact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contact")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("channel", &self.channel)
            .field("details", &redact_details(&self.details))
            .field("active", &self.active)
            .field("down_alerts_only", &self.down_alerts_only)
            .field("error", &self.error)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Body of `POST /api/contacts`.
#[derive(Clone, PartialEq, Serialize)]
pub struct CreateContactRequest {
    /// Display name.
    pub name: String,
    /// Channel tag.
    pub channel: String,
    /// Channel-specific details.
    pub details: Value,
    /// Always `true` for new contacts.
    pub active: bool,
    /// Only notify on down transitions.
    pub down_alerts_only: bool,
}

impl fmt::Debug for CreateContactRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateContactRequest")
            .field("name", &self.name)
            .field("channel", &self.channel)
            .field("details", &redact_details(&self.details))
            .field("active", &self.active)
            .field("down_alerts_only", &self.down_alerts_only)
            .finish()
    }
}

/// Body of `PUT /api/contacts/{id}`. The active flag is server-managed
/// and the channel is fixed at creation, so neither is accepted here.
#[derive(Clone, Default, PartialEq, Serialize)]
pub struct UpdateContactRequest {
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Replacement details object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// New down-alerts-only flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub down_alerts_only: Option<bool>,
}

impl fmt::Debug for UpdateContactRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateContactRequest")
            .field("name", &self.name)
            .field("details", &self.details.as_ref().map(redact_details))
            .field("down_alerts_only", &self.down_alerts_only)
            .finish()
    }
}

// =============================================================================
// Status pages
// =============================================================================

/// A status page as returned by the service.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusPage {
    /// Server-assigned identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Monitor ids shown on the page.
    #[serde(default)]
    pub monitors: Option<Vec<String>>,
    /// Uptime statistics window in days.
    #[serde(default)]
    pub period: i64,
    /// Custom domain serving the page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_domain: Option<String>,
    /// Whether incident reasons are public.
    #[serde(default)]
    pub show_incident_reasons: bool,
    /// `user:password` protecting the page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_auth: Option<String>,
    /// Unix timestamp of creation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    /// Public URL of the page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl fmt::Debug for StatusPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusPage")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("monitors", &self.monitors)
            .field("period", &self.period)
            .field("custom_domain", &self.custom_domain)
            .field("show_incident_reasons", &self.show_incident_reasons)
            .field("basic_auth", &self.basic_auth.as_ref().map(|_| REDACTED))
            .field("created_at", &self.created_at)
            .field("url", &self.url)
            .finish()
    }
}

/// Body of `POST /api/status_pages`.
#[derive(Clone, PartialEq, Serialize)]
pub struct CreateStatusPageRequest {
    /// Display name.
    pub name: String,
    /// Monitor ids shown on the page.
    pub monitors: Vec<String>,
    /// Uptime statistics window in days.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<i64>,
    /// Custom domain serving the page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_domain: Option<String>,
    /// Whether incident reasons are public.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_incident_reasons: Option<bool>,
    /// `user:password` protecting the page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic_auth: Option<String>,
}

impl fmt::Debug for CreateStatusPageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CreateStatusPageRequest")
            .field("name", &self.name)
            .field("monitors", &self.monitors)
            .field("period", &self.period)
            .field("custom_domain", &self.custom_domain)
            .field("show_incident_reasons", &self.show_incident_reasons)
            .field("basic_auth", &self.basic_auth.as_ref().map(|_| REDACTED))
            .finish()
    }
}

/// Body of `PATCH /api/status_pages/{id}`. Absent fields are left
/// unchanged; `""` clears `custom_domain` or `basic_auth`.
#[derive(Clone, Default, PartialEq, Serialize)]
pub struct UpdateStatusPageRequest {
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Replacement monitor list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitors: Option<Vec<String>>,
    /// New statistics window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<i64>,
    /// New custom domain, or `""` to remove it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_domain: Option<String>,
    /// New incident-reason visibility.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub show_incident_reasons: Option<bool>,
    /// New credentials, or `""` to remove them.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic_auth: Option<String>,
}

impl fmt::Debug for UpdateStatusPageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateStatusPageRequest")
            .field("name", &self.name)
            .field("monitors", &self.monitors)
            .field("period", &self.period)
            .field("custom_domain", &self.custom_domain)
            .field("show_incident_reasons", &self.show_incident_reasons)
            .field(
                "basic_auth",
                &self
                    .basic_auth
                    .as_ref()
                    .map(|v| if v.is_empty() { "" } else { REDACTED }),
            )
            .finish()
    }
}

// =============================================================================
// Account
// =============================================================================

/// Account information from `GET /api/account`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Account identifier.
    pub id: String,
    /// Account email.
    pub email: String,
    /// Name of the current plan.
    pub current_plan: String,
    /// Maximum number of monitors on the plan.
    #[serde(default)]
    pub monitors_limit: i64,
    /// Monitors in use.
    #[serde(default)]
    pub monitors_count: i64,
    /// Monitors currently up.
    #[serde(default)]
    pub up_monitors: i64,
    /// Monitors currently down.
    #[serde(default)]
    pub down_monitors: i64,
    /// Monitors currently paused.
    #[serde(default)]
    pub paused_monitors: i64,
}
