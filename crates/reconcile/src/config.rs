//! Desired configuration for each resource kind.
//!
//! The declarative format cannot express "exactly one of", so each union is a
//! set of optional blocks (`https`, `tcp`, `ping` / `email`, `sms`, ...).
//! [`crate::validate`] enforces exclusivity; after that the typed variant is
//! obtained with [`MonitorConfig::monitor_type`] / [`ContactConfig::channel`].

use crate::settings::{
    ContactChannel, DiscordSettings, EmailSettings, HttpsSettings, IncidentIoSettings,
    MonitorType, OpsgenieSettings, PagerDutySettings, PingSettings, SlackSettings, SmsSettings,
    TcpSettings, WebhookSettings, ZendeskSettings,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default for `active` on monitors.
pub const DEFAULT_ACTIVE: bool = true;
/// Default check interval in seconds.
pub const DEFAULT_CHECK_INTERVAL: i64 = 60;
/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT: i64 = 30;
/// Default consecutive failures before alerting.
pub const DEFAULT_FAIL_THRESHOLD: i64 = 1;
/// Default status page uptime window in days.
pub const DEFAULT_PERIOD: i64 = 7;

/// Desired monitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitorConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_interval: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_threshold: Option<i64>,
    /// Probe regions. Absent and empty are equivalent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regions: Option<Vec<String>>,
    /// Contact ids to alert. Absent and empty are equivalent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contacts: Option<Vec<String>>,
    /// Certificate monitoring host.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub https: Option<HttpsSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tcp: Option<TcpSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ping: Option<PingSettings>,
}

impl MonitorConfig {
    /// Tags of the populated type blocks.
    pub fn populated_variants(&self) -> Vec<&'static str> {
        [
            ("https", self.https.is_some()),
            ("tcp", self.tcp.is_some()),
            ("ping", self.ping.is_some()),
        ]
        .into_iter()
        .filter_map(|(tag, set)| set.then_some(tag))
        .collect()
    }

    /// The selected type, if exactly one block is populated.
    pub fn monitor_type(&self) -> Option<MonitorType> {
        match (&self.https, &self.tcp, &self.ping) {
            (Some(s), None, None) => Some(MonitorType::Https(s.clone())),
            (None, Some(s), None) => Some(MonitorType::Tcp(s.clone())),
            (None, None, Some(s)) => Some(MonitorType::Ping(s.clone())),
            _ => None,
        }
    }

    pub fn effective_active(&self) -> bool {
        self.active.unwrap_or(DEFAULT_ACTIVE)
    }

    pub fn effective_check_interval(&self) -> i64 {
        self.check_interval.unwrap_or(DEFAULT_CHECK_INTERVAL)
    }

    pub fn effective_timeout(&self) -> i64 {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn effective_fail_threshold(&self) -> i64 {
        self.fail_threshold.unwrap_or(DEFAULT_FAIL_THRESHOLD)
    }

    /// Replace the type blocks with `monitor_type`.
    pub fn set_monitor_type(&mut self, monitor_type: MonitorType) {
        self.https = None;
        self.tcp = None;
        self.ping = None;
        match monitor_type {
            MonitorType::Https(s) => self.https = Some(s),
            MonitorType::Tcp(s) => self.tcp = Some(s),
            MonitorType::Ping(s) => self.ping = Some(s),
        }
    }
}

/// Desired contact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContactConfig {
    pub name: String,
    /// Only alert on down events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub down_alerts_only: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<EmailSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sms: Option<SmsSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook: Option<WebhookSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slack: Option<SlackSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord: Option<DiscordSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagerduty: Option<PagerDutySettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incidentio: Option<IncidentIoSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opsgenie: Option<OpsgenieSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zendesk: Option<ZendeskSettings>,
}

impl ContactConfig {
    /// Tags of the populated channel blocks.
    pub fn populated_variants(&self) -> Vec<&'static str> {
        [
            ("email", self.email.is_some()),
            ("sms", self.sms.is_some()),
            ("webhook", self.webhook.is_some()),
            ("slack", self.slack.is_some()),
            ("discord", self.discord.is_some()),
            ("pagerduty", self.pagerduty.is_some()),
            ("incidentio", self.incidentio.is_some()),
            ("opsgenie", self.opsgenie.is_some()),
            ("zendesk", self.zendesk.is_some()),
        ]
        .into_iter()
        .filter_map(|(tag, set)| set.then_some(tag))
        .collect()
    }

    /// The selected channel, if exactly one block is populated.
    pub fn channel(&self) -> Option<ContactChannel> {
        if self.populated_variants().len() != 1 {
            return None;
        }
        let channel = if let Some(s) = &self.email {
            ContactChannel::Email(s.clone())
        } else if let Some(s) = &self.sms {
            ContactChannel::Sms(s.clone())
        } else if let Some(s) = &self.webhook {
            ContactChannel::Webhook(s.clone())
        } else if let Some(s) = &self.slack {
            ContactChannel::Slack(s.clone())
        } else if let Some(s) = &self.discord {
            ContactChannel::Discord(s.clone())
        } else if let Some(s) = &self.pagerduty {
            ContactChannel::PagerDuty(s.clone())
        } else if let Some(s) = &self.incidentio {
            ContactChannel::IncidentIo(s.clone())
        } else if let Some(s) = &self.opsgenie {
            ContactChannel::Opsgenie(s.clone())
        } else {
            ContactChannel::Zendesk(self.zendesk.clone()?)
        };
        Some(channel)
    }

    pub fn effective_down_alerts_only(&self) -> bool {
        self.down_alerts_only.unwrap_or(false)
    }

    /// Replace the channel blocks with `channel`.
    pub fn set_channel(&mut self, channel: ContactChannel) {
        self.email = None;
        self.sms = None;
        self.webhook = None;
        self.slack = None;
        self.discord = None;
        self.pagerduty = None;
        self.incidentio = None;
        self.opsgenie = None;
        self.zendesk = None;
        match channel {
            ContactChannel::Email(s) => self.email = Some(s),
            ContactChannel::Sms(s) => self.sms = Some(s),
            ContactChannel::Webhook(s) => self.webhook = Some(s),
            ContactChannel::Slack(s) => self.slack = Some(s),
            ContactChannel::Discord(s) => self.discord = Some(s),
            ContactChannel::PagerDuty(s) => self.pagerduty = Some(s),
            ContactChannel::IncidentIo(s) => self.incidentio = Some(s),
            ContactChannel::Opsgenie(s) => self.opsgenie = Some(s),
            ContactChannel::Zendesk(s) => self.zendesk = Some(s),
        }
    }
}

/// Desired status page.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusPageConfig {
    pub name: String,
    /// Monitor ids shown on the page (1 to 20).
    #[serde(default)]
    pub monitors: Vec<String>,
    /// Uptime window in days: 7, 30 or 90.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_incident_reasons: Option<bool>,
    /// `user:password`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_auth: Option<String>,
}

impl StatusPageConfig {
    pub fn effective_period(&self) -> i64 {
        self.period.unwrap_or(DEFAULT_PERIOD)
    }

    pub fn effective_show_incident_reasons(&self) -> bool {
        self.show_incident_reasons.unwrap_or(false)
    }
}

impl fmt::Debug for StatusPageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusPageConfig")
            .field("name", &self.name)
            .field("monitors", &self.monitors)
            .field("period", &self.period)
            .field("custom_domain", &self.custom_domain)
            .field("show_incident_reasons", &self.show_incident_reasons)
            .field("basic_auth", &self.basic_auth.as_ref().map(|_| crate::settings::REDACTED))
            .finish()
    }
}
