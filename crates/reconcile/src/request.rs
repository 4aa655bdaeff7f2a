//! Request Builder: full create requests and minimal update deltas.
//!
//! A delta carries only fields whose desired value differs from prior state.
//! Omitted fields are left alone by the service; clearing an optional field
//! is an explicit [`FieldChange::Clear`], sent as the service's empty
//! sentinel (`""`, `[]` or `0`). Variant settings diff as one atomic field.

use crate::config::{ContactConfig, MonitorConfig, StatusPageConfig};
use crate::error::{Error, Result};
use crate::settings::{ContactChannel, MonitorType, REDACTED, non_empty};
use crate::state::{ContactState, MonitorState, StatusPageState};
use crate::types::ResourceKind;
use crate::validate::{validate_contact, validate_monitor};
use std::fmt;
use uptimekit::{
    CreateContactRequest, CreateMonitorRequest, CreateStatusPageRequest, UpdateContactRequest,
    UpdateMonitorRequest, UpdateStatusPageRequest,
};

/// Change to an optional field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange<T> {
    Set(T),
    Clear,
}

impl<T> FieldChange<T> {
    fn into_value(self, empty: T) -> T {
        match self {
            Self::Set(value) => value,
            Self::Clear => empty,
        }
    }
}

/// Diff two optional values. `None` means unchanged.
fn diff_optional<T: PartialEq>(desired: Option<T>, prior: Option<&T>) -> Option<FieldChange<T>> {
    match (desired, prior) {
        (Some(d), Some(p)) if &d == p => None,
        (Some(d), _) => Some(FieldChange::Set(d)),
        (None, Some(_)) => Some(FieldChange::Clear),
        (None, None) => None,
    }
}

fn diff<T: PartialEq>(desired: T, prior: &T) -> Option<T> {
    (&desired != prior).then_some(desired)
}

fn non_empty_str(value: Option<&String>) -> Option<String> {
    value.filter(|v| !v.is_empty()).cloned()
}

/// The single selected monitor type, or the union issue as a validation error.
fn selected_monitor_type(config: &MonitorConfig) -> Result<MonitorType> {
    config
        .monitor_type()
        .map(MonitorType::canonical)
        .ok_or_else(|| Error::Validation(validate_monitor(config)))
}

fn selected_channel(config: &ContactConfig) -> Result<ContactChannel> {
    config
        .channel()
        .map(ContactChannel::canonical)
        .ok_or_else(|| Error::Validation(validate_contact(config)))
}

// Monitor

/// Changed monitor fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonitorDelta {
    pub name: Option<String>,
    pub active: Option<bool>,
    pub check_interval: Option<i64>,
    pub timeout: Option<i64>,
    pub fail_threshold: Option<i64>,
    pub regions: Option<FieldChange<Vec<String>>>,
    pub contacts: Option<FieldChange<Vec<String>>>,
    pub host: Option<FieldChange<String>>,
    pub port: Option<FieldChange<i64>>,
    /// Whole type payload, re-sent on any change inside it.
    pub monitor_type: Option<MonitorType>,
}

impl MonitorDelta {
    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }

    pub fn changed_fields(&self) -> Vec<&'static str> {
        [
            ("name", self.name.is_some()),
            ("active", self.active.is_some()),
            ("check_interval", self.check_interval.is_some()),
            ("timeout", self.timeout.is_some()),
            ("fail_threshold", self.fail_threshold.is_some()),
            ("regions", self.regions.is_some()),
            ("contacts", self.contacts.is_some()),
            ("host", self.host.is_some()),
            ("port", self.port.is_some()),
            ("settings", self.monitor_type.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, changed)| changed.then_some(field))
        .collect()
    }

    /// Wire request. Cleared fields become the empty sentinel.
    pub fn into_request(self) -> UpdateMonitorRequest {
        UpdateMonitorRequest {
            name: self.name,
            active: self.active,
            check_interval: self.check_interval,
            timeout: self.timeout,
            fail_threshold: self.fail_threshold,
            regions: self.regions.map(|c| c.into_value(Vec::new())),
            settings: self.monitor_type.as_ref().map(MonitorType::to_wire_settings),
            contacts: self.contacts.map(|c| c.into_value(Vec::new())),
            host: self.host.map(|c| c.into_value(String::new())),
            port: self.port.map(|c| c.into_value(0)),
        }
    }
}

/// Full create request for a monitor, with defaults applied.
pub fn build_monitor_create(config: &MonitorConfig) -> Result<CreateMonitorRequest> {
    let monitor_type = selected_monitor_type(config)?;
    Ok(CreateMonitorRequest {
        name: config.name.clone(),
        active: config.effective_active(),
        check_interval: config.effective_check_interval(),
        timeout: config.effective_timeout(),
        fail_threshold: config.effective_fail_threshold(),
        regions: config.regions.clone().unwrap_or_default(),
        settings: monitor_type.to_wire_settings(),
        contacts: config.contacts.clone().unwrap_or_default(),
        host: non_empty_str(config.host.as_ref()),
        port: config.port.filter(|p| *p != 0),
    })
}

/// Minimal delta from `prior` to `config`.
///
/// Fails with [`Error::ReplaceRequired`] when the monitor type changes.
pub fn build_monitor_update(config: &MonitorConfig, prior: &MonitorState) -> Result<MonitorDelta> {
    let desired_type = selected_monitor_type(config)?;
    if desired_type.tag() != prior.monitor_type.tag() {
        return Err(Error::ReplaceRequired {
            kind: ResourceKind::Monitor,
            field: "type",
            from: prior.monitor_type.tag().to_string(),
            to: desired_type.tag().to_string(),
        });
    }
    let desired_type = desired_type.adopt_server_defaults(&prior.monitor_type);

    // A clamped threshold is compared by what was asked for, not what the service kept.
    let requested = prior.requested_fail_threshold.unwrap_or(prior.fail_threshold);
    Ok(MonitorDelta {
        name: diff(config.name.clone(), &prior.name),
        active: diff(config.effective_active(), &prior.active),
        check_interval: diff(config.effective_check_interval(), &prior.check_interval),
        timeout: diff(config.effective_timeout(), &prior.timeout),
        fail_threshold: diff(config.effective_fail_threshold(), &requested),
        regions: diff_optional(non_empty(config.regions.clone()), prior.regions.as_ref()),
        contacts: diff_optional(non_empty(config.contacts.clone()), prior.contacts.as_ref()),
        host: diff_optional(non_empty_str(config.host.as_ref()), prior.host.as_ref()),
        port: diff_optional(config.port.filter(|p| *p != 0), prior.port.as_ref()),
        monitor_type: diff(desired_type, &prior.monitor_type),
    })
}

// Contact

/// Changed contact fields. `active` is server-managed and never diffed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDelta {
    pub name: Option<String>,
    /// Whole channel payload, re-sent on any change inside it.
    pub channel: Option<ContactChannel>,
    pub down_alerts_only: Option<bool>,
}

impl ContactDelta {
    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }

    pub fn changed_fields(&self) -> Vec<&'static str> {
        [
            ("name", self.name.is_some()),
            ("details", self.channel.is_some()),
            ("down_alerts_only", self.down_alerts_only.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, changed)| changed.then_some(field))
        .collect()
    }

    pub fn into_request(self) -> UpdateContactRequest {
        UpdateContactRequest {
            name: self.name,
            details: self
                .channel
                .map(|channel| serde_json::Value::Object(channel.encode())),
            down_alerts_only: self.down_alerts_only,
        }
    }
}

/// Full create request for a contact. New contacts are always active.
pub fn build_contact_create(config: &ContactConfig) -> Result<CreateContactRequest> {
    let channel = selected_channel(config)?;
    Ok(CreateContactRequest {
        name: config.name.clone(),
        channel: channel.tag().to_string(),
        details: serde_json::Value::Object(channel.encode()),
        active: true,
        down_alerts_only: config.effective_down_alerts_only(),
    })
}

/// Minimal delta from `prior` to `config`.
///
/// Fails with [`Error::ReplaceRequired`] when the channel changes.
pub fn build_contact_update(config: &ContactConfig, prior: &ContactState) -> Result<ContactDelta> {
    let channel = selected_channel(config)?;
    if channel.tag() != prior.channel.tag() {
        return Err(Error::ReplaceRequired {
            kind: ResourceKind::Contact,
            field: "channel",
            from: prior.channel.tag().to_string(),
            to: channel.tag().to_string(),
        });
    }
    Ok(ContactDelta {
        name: diff(config.name.clone(), &prior.name),
        channel: diff(channel, &prior.channel),
        down_alerts_only: diff(config.effective_down_alerts_only(), &prior.down_alerts_only),
    })
}

// Status page

/// Changed status page fields.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct StatusPageDelta {
    pub name: Option<String>,
    pub monitors: Option<Vec<String>>,
    pub period: Option<i64>,
    pub custom_domain: Option<FieldChange<String>>,
    pub show_incident_reasons: Option<bool>,
    pub basic_auth: Option<FieldChange<String>>,
}

impl StatusPageDelta {
    pub fn is_empty(&self) -> bool {
        self.changed_fields().is_empty()
    }

    pub fn changed_fields(&self) -> Vec<&'static str> {
        [
            ("name", self.name.is_some()),
            ("monitors", self.monitors.is_some()),
            ("period", self.period.is_some()),
            ("custom_domain", self.custom_domain.is_some()),
            ("show_incident_reasons", self.show_incident_reasons.is_some()),
            ("basic_auth", self.basic_auth.is_some()),
        ]
        .into_iter()
        .filter_map(|(field, changed)| changed.then_some(field))
        .collect()
    }

    pub fn into_request(self) -> UpdateStatusPageRequest {
        UpdateStatusPageRequest {
            name: self.name,
            monitors: self.monitors,
            period: self.period,
            custom_domain: self.custom_domain.map(|c| c.into_value(String::new())),
            show_incident_reasons: self.show_incident_reasons,
            basic_auth: self.basic_auth.map(|c| c.into_value(String::new())),
        }
    }
}

impl fmt::Debug for StatusPageDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let basic_auth = self.basic_auth.as_ref().map(|change| match change {
            FieldChange::Set(_) => FieldChange::Set(REDACTED),
            FieldChange::Clear => FieldChange::Clear,
        });
        f.debug_struct("StatusPageDelta")
            .field("name", &self.name)
            .field("monitors", &self.monitors)
            .field("period", &self.period)
            .field("custom_domain", &self.custom_domain)
            .field("show_incident_reasons", &self.show_incident_reasons)
            .field("basic_auth", &basic_auth)
            .finish()
    }
}

/// Full create request for a status page, with defaults applied.
pub fn build_status_page_create(config: &StatusPageConfig) -> CreateStatusPageRequest {
    CreateStatusPageRequest {
        name: config.name.clone(),
        monitors: config.monitors.clone(),
        period: Some(config.effective_period()),
        custom_domain: non_empty_str(config.custom_domain.as_ref()),
        show_incident_reasons: Some(config.effective_show_incident_reasons()),
        basic_auth: non_empty_str(config.basic_auth.as_ref()),
    }
}

/// Minimal delta from `prior` to `config`.
pub fn build_status_page_update(config: &StatusPageConfig, prior: &StatusPageState) -> StatusPageDelta {
    StatusPageDelta {
        name: diff(config.name.clone(), &prior.name),
        monitors: diff(config.monitors.clone(), &prior.monitors),
        period: diff(config.effective_period(), &prior.period),
        custom_domain: diff_optional(
            non_empty_str(config.custom_domain.as_ref()),
            prior.custom_domain.as_ref(),
        ),
        show_incident_reasons: diff(
            config.effective_show_incident_reasons(),
            &prior.show_incident_reasons,
        ),
        basic_auth: diff_optional(
            non_empty_str(config.basic_auth.as_ref()),
            prior.basic_auth.as_ref(),
        ),
    }
}
