//! State Materializer: remote representation to canonical state.

use crate::error::Result;
use crate::settings::{ContactChannel, MonitorType, non_empty};
use crate::state::{ContactState, MonitorState, StatusPageState};
use uptimekit::{Contact, Monitor, StatusPage};

fn non_empty_string(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

/// Canonical state for a remote monitor.
///
/// Fails only when the settings object names an unknown type or its payload
/// cannot be parsed.
pub fn materialize_monitor(remote: &Monitor) -> Result<MonitorState> {
    let monitor_type = MonitorType::from_wire_settings(&remote.settings)?.canonical();
    Ok(MonitorState {
        id: remote.id.clone(),
        name: remote.name.clone(),
        active: remote.active,
        check_interval: remote.check_interval,
        timeout: remote.timeout,
        fail_threshold: remote.fail_threshold,
        requested_fail_threshold: None,
        regions: non_empty(remote.regions.clone()),
        contacts: non_empty(remote.contacts.clone()),
        host: non_empty_string(remote.host.as_ref()),
        port: remote.port.filter(|p| *p != 0),
        monitor_type,
        last_status: remote.last_status.clone(),
        created_at: remote.created_at,
        updated_at: remote.updated_at,
    })
}

/// Canonical state for a remote contact.
pub fn materialize_contact(remote: &Contact) -> Result<ContactState> {
    let channel = ContactChannel::decode(&remote.channel, &remote.details)?.canonical();
    Ok(ContactState {
        id: remote.id.clone(),
        name: remote.name.clone(),
        channel,
        active: remote.active,
        down_alerts_only: remote.down_alerts_only,
        error: non_empty_string(remote.error.as_ref()),
        created_at: remote.created_at,
    })
}

/// Canonical state for a remote status page. A `""` domain or credential
/// reads as absent.
pub fn materialize_status_page(remote: &StatusPage) -> StatusPageState {
    StatusPageState {
        id: remote.id.clone(),
        name: remote.name.clone(),
        monitors: remote.monitors.clone().unwrap_or_default(),
        period: remote.period,
        custom_domain: non_empty_string(remote.custom_domain.as_ref()),
        show_incident_reasons: remote.show_incident_reasons,
        basic_auth: non_empty_string(remote.basic_auth.as_ref()),
        created_at: remote.created_at,
        url: remote.url.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::settings::{HttpsSettings, PingSettings};
    use serde_json::{Map, Value, json};

    fn remote_monitor(settings: Value) -> Monitor {
        let settings: Map<String, Value> = match settings {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Monitor {
            id: "mon_1".into(),
            name: "API".into(),
            active: true,
            check_interval: 60,
            timeout: 30,
            fail_threshold: 1,
            regions: Some(vec![]),
            settings,
            contacts: Some(vec!["ct_1".into()]),
            last_status: Some("up".into()),
            created_at: Some(1),
            updated_at: Some(2),
            host: Some(String::new()),
            port: Some(0),
        }
    }

    #[test]
    fn test_https_url_trailing_slash_materializes_canonical() {
        let remote = remote_monitor(json!({"https": {
            "url": "https://example.com/",
            "check_certificate_expiration": true,
            "follow_redirect": true
        }}));
        let state = materialize_monitor(&remote).unwrap();
        assert_eq!(state.monitor_type.url(), "https://example.com");

        let again = remote_monitor(Value::Object(state.monitor_type.to_wire_settings()));
        let state_again = materialize_monitor(&again).unwrap();
        assert_eq!(state_again.monitor_type, state.monitor_type);
    }

    #[test]
    fn test_https_defaults_filled() {
        let remote = remote_monitor(json!({"https": {"url": "https://example.com"}}));
        let state = materialize_monitor(&remote).unwrap();
        let mut expected = HttpsSettings::new("https://example.com");
        expected.check_certificate_expiration = Some(true);
        expected.follow_redirect = Some(true);
        assert_eq!(state.monitor_type, MonitorType::Https(expected));
    }

    #[test]
    fn test_ping_prefix_stripped() {
        let remote = remote_monitor(json!({"ping": {"url": "ping://server.example.com"}}));
        let state = materialize_monitor(&remote).unwrap();
        assert_eq!(
            state.monitor_type,
            MonitorType::Ping(PingSettings {
                url: "server.example.com".into()
            })
        );
    }

    #[test]
    fn test_empty_lists_and_sentinels_read_as_absent() {
        let remote = remote_monitor(json!({"tcp": {"url": "db:5432"}}));
        let state = materialize_monitor(&remote).unwrap();
        assert_eq!(state.regions, None);
        assert_eq!(state.contacts, Some(vec!["ct_1".to_string()]));
        assert_eq!(state.host, None);
        assert_eq!(state.port, None);
    }

    #[test]
    fn test_server_fields_verbatim() {
        let mut remote = remote_monitor(json!({"tcp": {"url": "db:5432"}}));
        remote.fail_threshold = 2;
        remote.active = false;
        let state = materialize_monitor(&remote).unwrap();
        assert_eq!(state.fail_threshold, 2);
        assert!(!state.active);
        assert_eq!(state.last_status.as_deref(), Some("up"));
        assert_eq!(state.updated_at, Some(2));
    }

    #[test]
    fn test_unknown_monitor_type() {
        let remote = remote_monitor(json!({"dns": {"url": "example.com"}}));
        assert!(matches!(
            materialize_monitor(&remote),
            Err(Error::UnsupportedVariant { .. })
        ));
    }

    #[test]
    fn test_contact_materializes_with_defaults() {
        let remote = Contact {
            id: "ct_1".into(),
            name: "Pager".into(),
            channel: "pagerduty".into(),
            details: json!({"integration_key": "k".repeat(32)}),
            active: false,
            down_alerts_only: true,
            error: Some("delivery failed".into()),
            created_at: Some(5),
        };
        let state = materialize_contact(&remote).unwrap();
        match &state.channel {
            ContactChannel::PagerDuty(s) => assert_eq!(s.auto_resolve_incidents, Some(true)),
            other => panic!("Expected pagerduty, got {other:?}"),
        }
        assert!(!state.active);
        assert_eq!(state.error.as_deref(), Some("delivery failed"));
    }

    #[test]
    fn test_contact_unknown_channel() {
        let remote = Contact {
            id: "ct_1".into(),
            name: "Fax".into(),
            channel: "fax".into(),
            details: json!({}),
            active: true,
            down_alerts_only: false,
            error: None,
            created_at: None,
        };
        assert!(matches!(
            materialize_contact(&remote),
            Err(Error::UnsupportedVariant { .. })
        ));
    }

    #[test]
    fn test_status_page_empty_sentinels() {
        let remote = StatusPage {
            id: "sp_1".into(),
            name: "Public".into(),
            monitors: None,
            period: 30,
            custom_domain: Some(String::new()),
            show_incident_reasons: true,
            basic_auth: Some(String::new()),
            created_at: Some(3),
            url: Some("https://status.uptime-monitor.io/sp_1".into()),
        };
        let state = materialize_status_page(&remote);
        assert!(state.monitors.is_empty());
        assert_eq!(state.custom_domain, None);
        assert_eq!(state.basic_auth, None);
        assert_eq!(state.period, 30);
    }
}
