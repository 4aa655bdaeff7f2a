//! Canonical state: the normalized, decoded representation used for
//! comparison and persistence.
//!
//! Server-computed fields (`id`, timestamps, `last_status`, contact `active`
//! and `error`, status page `url`) are carried verbatim from the remote
//! representation.

use crate::settings::{ContactChannel, MonitorType, REDACTED};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical monitor state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorState {
    pub id: String,
    pub name: String,
    pub active: bool,
    pub check_interval: i64,
    pub timeout: i64,
    /// As reported by the service, which may clamp it to the region count.
    pub fail_threshold: i64,
    /// Threshold last sent when the service reported a lower one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_fail_threshold: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
    #[serde(flatten)]
    pub monitor_type: MonitorType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

/// Canonical contact state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactState {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub channel: ContactChannel,
    /// Derived by the service from delivery health.
    pub active: bool,
    pub down_alerts_only: bool,
    /// Last delivery error reported by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
}

/// Canonical status page state.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPageState {
    pub id: String,
    pub name: String,
    pub monitors: Vec<String>,
    pub period: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_domain: Option<String>,
    pub show_incident_reasons: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_auth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    /// Public URL assigned by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl fmt::Debug for StatusPageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusPageState")
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
