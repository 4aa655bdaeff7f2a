//! Contact channels.

use super::{PayloadReader, PayloadWriter, REDACTED, non_empty};
use crate::error::{Error, Result};
use crate::normalize::normalize_http;
use crate::types::ResourceKind;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// `email` channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmailSettings {
    pub email: String,
}

/// `sms` channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SmsSettings {
    /// E.164 phone number.
    pub phone: String,
}

/// `webhook` channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookSettings {
    pub url: String,
}

/// `slack` channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlackSettings {
    pub webhook_url: String,
}

/// `discord` channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiscordSettings {
    pub webhook_url: String,
}

/// PagerDuty severity per alert priority.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeverityMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critical: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<String>,
}

impl SeverityMapping {
    /// `(priority, severity)` for every populated entry.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("critical", self.critical.as_deref()),
            ("high", self.high.as_deref()),
            ("medium", self.medium.as_deref()),
            ("low", self.low.as_deref()),
        ]
        .into_iter()
        .filter_map(|(priority, severity)| severity.map(|s| (priority, s)))
    }

    fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }
}

/// `pagerduty` channel.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PagerDutySettings {
    pub integration_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_resolve_incidents: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity_mapping: Option<SeverityMapping>,
}

impl fmt::Debug for PagerDutySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PagerDutySettings")
            .field("integration_key", &REDACTED)
            .field("auto_resolve_incidents", &self.auto_resolve_incidents)
            .field("severity_mapping", &self.severity_mapping)
            .finish()
    }
}

/// `incidentio` channel.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IncidentIoSettings {
    pub webhook_url: String,
    pub bearer_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_resolve_incidents: Option<bool>,
}

impl fmt::Debug for IncidentIoSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncidentIoSettings")
            .field("webhook_url", &self.webhook_url)
            .field("bearer_token", &REDACTED)
            .field("auto_resolve_incidents", &self.auto_resolve_incidents)
            .finish()
    }
}

/// Opsgenie alert responder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpsgenieResponder {
    /// `team`, `user`, `escalation` or `schedule`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// `opsgenie` channel.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpsgenieSettings {
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responders: Option<Vec<OpsgenieResponder>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_close_alerts: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eu_instance: Option<bool>,
}

impl fmt::Debug for OpsgenieSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpsgenieSettings")
            .field("api_key", &REDACTED)
            .field("priority", &self.priority)
            .field("responders", &self.responders)
            .field("tags", &self.tags)
            .field("auto_close_alerts", &self.auto_close_alerts)
            .field("eu_instance", &self.eu_instance)
            .finish()
    }
}

/// Zendesk ticket custom field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZendeskCustomField {
    pub id: i64,
    pub value: String,
}

/// `zendesk` channel.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ZendeskSettings {
    pub subdomain: String,
    pub email: String,
    pub api_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<Vec<ZendeskCustomField>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_solve_tickets: Option<bool>,
}

impl fmt::Debug for ZendeskSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZendeskSettings")
            .field("subdomain", &self.subdomain)
            .field("email", &self.email)
            .field("api_token", &REDACTED)
            .field("priority", &self.priority)
            .field("custom_fields", &self.custom_fields)
            .field("tags", &self.tags)
            .field("auto_solve_tickets", &self.auto_solve_tickets)
            .finish()
    }
}

/// A contact's notification channel with its settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "channel", content = "settings", rename_all = "snake_case")]
pub enum ContactChannel {
    Email(EmailSettings),
    Sms(SmsSettings),
    Webhook(WebhookSettings),
    Slack(SlackSettings),
    Discord(DiscordSettings),
    #[serde(rename = "pagerduty")]
    PagerDuty(PagerDutySettings),
    #[serde(rename = "incidentio")]
    IncidentIo(IncidentIoSettings),
    Opsgenie(OpsgenieSettings),
    Zendesk(ZendeskSettings),
}

impl ContactChannel {
    /// Every channel tag the codec understands.
    pub const TAGS: [&'static str; 9] = [
        "email",
        "sms",
        "webhook",
        "slack",
        "discord",
        "pagerduty",
        "incidentio",
        "opsgenie",
        "zendesk",
    ];

    /// Wire tag (`channel` field).
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Email(_) => "email",
            Self::Sms(_) => "sms",
            Self::Webhook(_) => "webhook",
            Self::Slack(_) => "slack",
            Self::Discord(_) => "discord",
            Self::PagerDuty(_) => "pagerduty",
            Self::IncidentIo(_) => "incidentio",
            Self::Opsgenie(_) => "opsgenie",
            Self::Zendesk(_) => "zendesk",
        }
    }

    /// Wire `details` object for this channel. Absent optionals are omitted.
    pub fn encode(&self) -> Map<String, Value> {
        let w = PayloadWriter::new();
        match self {
            Self::Email(s) => w.str("email", &s.email),
            Self::Sms(s) => w.str("phone", &s.phone),
            Self::Webhook(s) => w.str("url", &s.url),
            Self::Slack(s) => w.str("webhook_url", &s.webhook_url),
            Self::Discord(s) => w.str("webhook_url", &s.webhook_url),
            Self::PagerDuty(s) => w
                .str("integration_key", &s.integration_key)
                .opt_bool("auto_resolve_incidents", s.auto_resolve_incidents)
                .opt_value(
                    "severity_mapping",
                    s.severity_mapping.as_ref().map(encode_severity_mapping),
                ),
            Self::IncidentIo(s) => w
                .str("webhook_url", &s.webhook_url)
                .str("bearer_token", &s.bearer_token)
                .opt_bool("auto_resolve_incidents", s.auto_resolve_incidents),
            Self::Opsgenie(s) => w
                .str("api_key", &s.api_key)
                .opt_str("priority", s.priority.as_deref())
                .opt_value(
                    "responders",
                    s.responders
                        .as_ref()
                        .map(|rs| Value::Array(rs.iter().map(encode_responder).collect())),
                )
                .opt_str_list("tags", s.tags.as_deref())
                .opt_bool("auto_close_alerts", s.auto_close_alerts)
                .opt_bool("eu_instance", s.eu_instance),
            Self::Zendesk(s) => w
                .str("subdomain", &s.subdomain)
                .str("email", &s.email)
                .str("api_token", &s.api_token)
                .opt_str("priority", s.priority.as_deref())
                .opt_value(
                    "custom_fields",
                    s.custom_fields
                        .as_ref()
                        .map(|fs| Value::Array(fs.iter().map(encode_custom_field).collect())),
                )
                .opt_str_list("tags", s.tags.as_deref())
                .opt_bool("auto_solve_tickets", s.auto_solve_tickets),
        }
        .finish()
    }

    /// Parse a wire `details` object for `tag`. Optionals come back `None`.
    pub fn decode(tag: &str, details: &Value) -> Result<Self> {
        if !Self::TAGS.contains(&tag) {
            return Err(Error::UnsupportedVariant {
                kind: ResourceKind::Contact,
                tag: tag.to_string(),
            });
        }
        let r = PayloadReader::new(tag, details)?;

        let channel = match tag {
            "email" => Self::Email(EmailSettings {
                email: r.required_str("email")?,
            }),
            "sms" => Self::Sms(SmsSettings {
                phone: r.required_str("phone")?,
            }),
            "webhook" => Self::Webhook(WebhookSettings {
                url: r.required_str("url")?,
            }),
            "slack" => Self::Slack(SlackSettings {
                webhook_url: r.required_str("webhook_url")?,
            }),
            "discord" => Self::Discord(DiscordSettings {
                webhook_url: r.required_str("webhook_url")?,
            }),
            "pagerduty" => Self::PagerDuty(PagerDutySettings {
                integration_key: r.required_str("integration_key")?,
                auto_resolve_incidents: r.opt_bool("auto_resolve_incidents")?,
                severity_mapping: r
                    .opt_nested("severity_mapping")?
                    .map(|m| {
                        Ok::<_, Error>(SeverityMapping {
                            critical: m.opt_str("critical")?,
                            high: m.opt_str("high")?,
                            medium: m.opt_str("medium")?,
                            low: m.opt_str("low")?,
                        })
                    })
                    .transpose()?,
            }),
            "incidentio" => Self::IncidentIo(IncidentIoSettings {
                webhook_url: r.required_str("webhook_url")?,
                bearer_token: r.required_str("bearer_token")?,
                auto_resolve_incidents: r.opt_bool("auto_resolve_incidents")?,
            }),
            "opsgenie" => Self::Opsgenie(OpsgenieSettings {
                api_key: r.required_str("api_key")?,
                priority: r.opt_str("priority")?,
                responders: r
                    .opt_array("responders")?
                    .map(|items| {
                        items
                            .iter()
                            .map(|item| decode_responder(tag, item))
                            .collect::<Result<Vec<_>>>()
                    })
                    .transpose()?,
                tags: r.opt_str_list("tags")?,
                auto_close_alerts: r.opt_bool("auto_close_alerts")?,
                eu_instance: r.opt_bool("eu_instance")?,
            }),
            _ => Self::Zendesk(ZendeskSettings {
                subdomain: r.required_str("subdomain")?,
                email: r.required_str("email")?,
                api_token: r.required_str("api_token")?,
                priority: r.opt_str("priority")?,
                custom_fields: r
                    .opt_array("custom_fields")?
                    .map(|items| {
                        items
                            .iter()
                            .map(|item| decode_custom_field(tag, item))
                            .collect::<Result<Vec<_>>>()
                    })
                    .transpose()?,
                tags: r.opt_str_list("tags")?,
                auto_solve_tickets: r.opt_bool("auto_solve_tickets")?,
            }),
        };
        Ok(channel)
    }

    /// Canonical form used for comparison and persistence.
    ///
    /// Fills boolean defaults, collapses empty lists and mappings to absent,
    /// and normalizes webhook URLs.
    #[must_use]
    pub fn canonical(self) -> Self {
        match self {
            Self::Email(_) | Self::Sms(_) => self,
            Self::Webhook(s) => Self::Webhook(WebhookSettings {
                url: normalize_http(&s.url),
            }),
            Self::Slack(s) => Self::Slack(SlackSettings {
                webhook_url: normalize_http(&s.webhook_url),
            }),
            Self::Discord(s) => Self::Discord(DiscordSettings {
                webhook_url: normalize_http(&s.webhook_url),
            }),
            Self::PagerDuty(s) => Self::PagerDuty(PagerDutySettings {
                auto_resolve_incidents: Some(s.auto_resolve_incidents.unwrap_or(true)),
                severity_mapping: s.severity_mapping.filter(|m| !m.is_empty()),
                ..s
            }),
            Self::IncidentIo(s) => Self::IncidentIo(IncidentIoSettings {
                webhook_url: normalize_http(&s.webhook_url),
                auto_resolve_incidents: Some(s.auto_resolve_incidents.unwrap_or(true)),
                ..s
            }),
            Self::Opsgenie(s) => Self::Opsgenie(OpsgenieSettings {
                responders: non_empty(s.responders),
                tags: non_empty(s.tags),
                auto_close_alerts: Some(s.auto_close_alerts.unwrap_or(true)),
                eu_instance: Some(s.eu_instance.unwrap_or(false)),
                ..s
            }),
            Self::Zendesk(s) => Self::Zendesk(ZendeskSettings {
                custom_fields: non_empty(s.custom_fields),
                tags: non_empty(s.tags),
                auto_solve_tickets: Some(s.auto_solve_tickets.unwrap_or(true)),
                ..s
            }),
        }
    }
}

fn encode_severity_mapping(mapping: &SeverityMapping) -> Value {
    let mut w = PayloadWriter::new();
    for (priority, severity) in mapping.entries() {
        w = w.str(priority, severity);
    }
    Value::Object(w.finish())
}

fn encode_responder(responder: &OpsgenieResponder) -> Value {
    Value::Object(
        PayloadWriter::new()
            .str("type", &responder.kind)
            .opt_str("id", responder.id.as_deref())
            .opt_str("name", responder.name.as_deref())
            .opt_str("username", responder.username.as_deref())
            .finish(),
    )
}

fn decode_responder(tag: &str, item: &Value) -> Result<OpsgenieResponder> {
    let r = PayloadReader::nested(tag, "responders[]", item)?;
    Ok(OpsgenieResponder {
        kind: r.required_str("type")?,
        id: r.opt_str("id")?,
        name: r.opt_str("name")?,
        username: r.opt_str("username")?,
    })
}

fn encode_custom_field(field: &ZendeskCustomField) -> Value {
    serde_json::json!({ "id": field.id, "value": field.value })
}

fn decode_custom_field(tag: &str, item: &Value) -> Result<ZendeskCustomField> {
    let r = PayloadReader::nested(tag, "custom_fields[]", item)?;
    Ok(ZendeskCustomField {
        id: r.required_i64("id")?,
        value: r.required_str("value")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalogue() -> Vec<ContactChannel> {
        vec![
            ContactChannel::Email(EmailSettings {
                email: "ops@example.com".into(),
            }),
            ContactChannel::Sms(SmsSettings {
                phone: "+1234567890".into(),
            }),
            ContactChannel::Webhook(WebhookSettings {
                url: "https://example.com/hook".into(),
            }),
            ContactChannel::Slack(SlackSettings {
                webhook_url: "https://hooks.slack.com/services/T0/B0/X".into(),
            }),
            ContactChannel::Discord(DiscordSettings {
                webhook_url: "https://discord.com/api/webhooks/1/abc".into(),
            }),
            ContactChannel::PagerDuty(PagerDutySettings {
                integration_key: "a".repeat(32),
                auto_resolve_incidents: None,
                severity_mapping: Some(SeverityMapping {
                    critical: Some("critical".into()),
                    low: Some("info".into()),
                    ..SeverityMapping::default()
                }),
            }),
            ContactChannel::PagerDuty(PagerDutySettings {
                integration_key: "b".repeat(32),
                auto_resolve_incidents: Some(false),
                severity_mapping: Some(SeverityMapping::default()),
            }),
            ContactChannel::IncidentIo(IncidentIoSettings {
                webhook_url: "https://api.incident.io/v2/alert_events/http/x".into(),
                bearer_token: "tok".into(),
                auto_resolve_incidents: Some(true),
            }),
            ContactChannel::Opsgenie(OpsgenieSettings {
                api_key: "key".into(),
                priority: Some("P2".into()),
                responders: Some(vec![OpsgenieResponder {
                    kind: "team".into(),
                    id: None,
                    name: Some("sre".into()),
                    username: None,
                }]),
                tags: Some(vec![]),
                auto_close_alerts: None,
                eu_instance: Some(true),
            }),
            ContactChannel::Zendesk(ZendeskSettings {
                subdomain: "acme".into(),
                email: "agent@acme.com".into(),
                api_token: "zd".into(),
                priority: None,
                custom_fields: Some(vec![ZendeskCustomField {
                    id: 360,
                    value: "uptime".into(),
                }]),
                tags: Some(vec!["prod".into()]),
                auto_solve_tickets: None,
            }),
        ]
    }

    #[test]
    fn test_decode_encode_round_trip() {
        for channel in catalogue() {
            let wire = Value::Object(channel.encode());
            let decoded = ContactChannel::decode(channel.tag(), &wire).unwrap();
            assert_eq!(decoded, channel, "round trip failed for {}", channel.tag());
        }
    }

    #[test]
    fn test_encode_omits_absent_optionals() {
        let channel = ContactChannel::Opsgenie(OpsgenieSettings {
            api_key: "key".into(),
            priority: None,
            responders: None,
            tags: None,
            auto_close_alerts: None,
            eu_instance: None,
        });
        assert_eq!(Value::Object(channel.encode()), json!({"api_key": "key"}));
    }

    #[test]
    fn test_encode_pagerduty_severity_mapping() {
        let channel = &catalogue()[5];
        let wire = Value::Object(channel.encode());
        assert_eq!(
            wire["severity_mapping"],
            json!({"critical": "critical", "low": "info"})
        );
    }

    #[test]
    fn test_decode_unknown_tag() {
        let err = ContactChannel::decode("carrier_pigeon", &json!({})).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedVariant { kind: ResourceKind::Contact, ref tag } if tag == "carrier_pigeon"
        ));
    }

    #[test]
    fn test_decode_missing_required_field() {
        let err = ContactChannel::decode("incidentio", &json!({"webhook_url": "https://x"}))
            .unwrap_err();
        assert!(matches!(err, Error::MalformedPayload { ref field, .. } if field == "bearer_token"));
    }

    #[test]
    fn test_decode_wrong_primitive_type() {
        let err = ContactChannel::decode(
            "zendesk",
            &json!({
                "subdomain": "acme",
                "email": "a@acme.com",
                "api_token": "t",
                "custom_fields": [{"id": "360", "value": "x"}]
            }),
        )
        .unwrap_err();
        assert!(matches!(err, Error::MalformedPayload { ref field, .. } if field == "custom_fields[].id"));
    }

    #[test]
    fn test_decode_ignores_server_extras() {
        let decoded =
            ContactChannel::decode("email", &json!({"email": "a@b.co", "verified": true})).unwrap();
        assert_eq!(
            decoded,
            ContactChannel::Email(EmailSettings {
                email: "a@b.co".into()
            })
        );
    }

    #[test]
    fn test_canonical_applies_defaults() {
        let canonical = catalogue()[8].clone().canonical();
        match canonical {
            ContactChannel::Opsgenie(s) => {
                assert_eq!(s.auto_close_alerts, Some(true));
                assert_eq!(s.eu_instance, Some(true));
                assert_eq!(s.tags, None);
                assert!(s.responders.is_some());
            }
            other => panic!("Expected opsgenie, got {other:?}"),
        }

        match catalogue()[6].clone().canonical() {
            ContactChannel::PagerDuty(s) => {
                assert_eq!(s.auto_resolve_incidents, Some(false));
                assert_eq!(s.severity_mapping, None);
            }
            other => panic!("Expected pagerduty, got {other:?}"),
        }
    }

    #[test]
    fn test_canonical_is_idempotent() {
        for channel in catalogue() {
            let once = channel.canonical();
            assert_eq!(once.clone().canonical(), once);
        }
    }

    #[test]
    fn test_canonical_normalizes_webhook_url() {
        let channel = ContactChannel::Webhook(WebhookSettings {
            url: "https://example.com/".into(),
        });
        assert_eq!(
            channel.canonical(),
            ContactChannel::Webhook(WebhookSettings {
                url: "https://example.com".into()
            })
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        for channel in catalogue() {
            let debug = format!("{channel:?}");
            assert!(!debug.contains(&"a".repeat(32)));
            assert!(!debug.contains("\"tok\""));
            assert!(!debug.contains("\"key\""));
            assert!(!debug.contains("\"zd\""));
        }
    }

    #[test]
    fn test_serde_state_shape() {
        let channel = ContactChannel::Sms(SmsSettings {
            phone: "+1234567890".into(),
        });
        let value = serde_json::to_value(&channel).unwrap();
        assert_eq!(value, json!({"channel": "sms", "settings": {"phone": "+1234567890"}}));
        let back: ContactChannel = serde_json::from_value(value).unwrap();
        assert_eq!(back, channel);
    }
}
