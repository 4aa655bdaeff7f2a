//! Per-kind CRUD against the remote service.
//!
//! Every write follows the same pipeline: validate, build the request,
//! call the backend, materialize the response. Nothing is sent when
//! validation fails. A failure to materialize after a successful write is
//! reported as [`Error::Conversion`] so the caller knows the remote side
//! changed.

use crate::error::{Error, Result};
use crate::plan::{Action, plan};
use crate::resource::{ResourceType, UpdateDelta};
use crate::types::{ApplyResult, Operation, ReadOutcome};
use std::marker::PhantomData;
use uptimekit::Backend;

/// Outcome of converging one instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied<S> {
    pub result: ApplyResult,
    /// State to persist; `None` once the instance is deleted.
    pub state: Option<S>,
}

/// Reconciler for one resource kind.
pub struct Reconciler<'a, R> {
    backend: &'a dyn Backend,
    kind: PhantomData<fn() -> R>,
}

impl<'a, R: ResourceType> Reconciler<'a, R> {
    pub fn new(backend: &'a dyn Backend) -> Self {
        Self {
            backend,
            kind: PhantomData,
        }
    }

    fn preflight(desired: &R::Desired) -> Result<()> {
        let issues = R::validate(desired);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(issues))
        }
    }

    fn settle(operation: Operation, desired: &R::Desired, remote: &R::Remote) -> Result<R::State> {
        let mut state = R::materialize(remote).map_err(|e| Error::Conversion {
            operation,
            kind: R::KIND,
            source: Box::new(e),
        })?;
        R::observe_adjustments(desired, &mut state);
        Ok(state)
    }

    /// Create the resource and return its canonical state.
    pub fn create(&self, desired: &R::Desired) -> Result<R::State> {
        Self::preflight(desired)?;
        let request = R::build_create(desired)?;

        log::debug!("Creating {}", R::KIND);
        let remote = R::remote_create(self.backend, &request)
            .map_err(|e| Error::remote(Operation::Create, R::KIND, e))?;
        let state = Self::settle(Operation::Create, desired, &remote)?;

        log::info!("Created {} '{}' ({})", R::KIND, R::name(&state), R::id(&state));
        Ok(state)
    }

    /// Refresh one tracked instance. A resource deleted out of band is
    /// reported as [`ReadOutcome::Gone`] rather than an error.
    pub fn read(&self, id: &str) -> Result<ReadOutcome<R::State>> {
        match R::remote_get(self.backend, id) {
            Ok(Some(remote)) => Ok(ReadOutcome::Present(R::materialize(&remote)?)),
            Ok(None) => {
                log::info!("{} {} no longer exists", R::KIND, id);
                Ok(ReadOutcome::Gone)
            }
            Err(e) if e.is_not_found() => {
                log::info!("{} {} no longer exists", R::KIND, id);
                Ok(ReadOutcome::Gone)
            }
            Err(e) => Err(Error::remote(Operation::Read, R::KIND, e)),
        }
    }

    /// Re-read a tracked instance, keeping what `prior` recorded about
    /// earlier writes.
    pub fn refresh(&self, prior: &R::State) -> Result<ReadOutcome<R::State>> {
        Ok(match self.read(R::id(prior))? {
            ReadOutcome::Present(mut fresh) => {
                R::carry_over(prior, &mut fresh);
                ReadOutcome::Present(fresh)
            }
            ReadOutcome::Gone => ReadOutcome::Gone,
        })
    }

    /// Bring `prior` in line with `desired` in place.
    ///
    /// Sends only changed fields; with nothing changed no call is made and
    /// `prior` comes back as is.
    pub fn update(&self, desired: &R::Desired, prior: &R::State) -> Result<R::State> {
        Self::preflight(desired)?;
        let delta = R::build_update(desired, prior)?;
        self.send_update(desired, prior, delta)
    }

    fn send_update(&self, desired: &R::Desired, prior: &R::State, delta: R::Delta) -> Result<R::State> {
        let id = R::id(prior);
        if delta.is_empty() {
            log::debug!("{} {} is up to date", R::KIND, id);
            return Ok(prior.clone());
        }

        log::debug!("Updating {} {}: {}", R::KIND, id, delta.changed_fields().join(", "));
        let remote = R::remote_update(self.backend, id, delta)
            .map_err(|e| Error::remote(Operation::Update, R::KIND, e))?;
        let state = Self::settle(Operation::Update, desired, &remote)?;

        log::info!("Updated {} '{}' ({})", R::KIND, R::name(&state), id);
        Ok(state)
    }

    /// Delete by id. Already gone counts as success.
    pub fn delete(&self, id: &str) -> Result<()> {
        match R::remote_delete(self.backend, id) {
            Ok(()) => {
                log::info!("Deleted {} {}", R::KIND, id);
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                log::debug!("{} {} was already deleted", R::KIND, id);
                Ok(())
            }
            Err(e) => Err(Error::remote(Operation::Delete, R::KIND, e)),
        }
    }

    /// Delete `prior` and create `desired` in its place.
    pub fn replace(&self, desired: &R::Desired, prior: &R::State) -> Result<R::State> {
        Self::preflight(desired)?;
        self.delete(R::id(prior))?;
        self.create(desired)
    }

    /// Fetch by id, failing when the resource does not exist.
    pub fn lookup(&self, id: &str) -> Result<R::State> {
        let remote = R::remote_get(self.backend, id)
            .map_err(|e| Error::remote(Operation::Lookup, R::KIND, e))?
            .ok_or_else(|| Error::NotFound {
                kind: R::KIND,
                id: id.to_string(),
            })?;
        R::materialize(&remote)
    }

    /// Every remote resource of this kind.
    pub fn list(&self) -> Result<Vec<R::State>> {
        R::remote_list(self.backend)
            .map_err(|e| Error::remote(Operation::List, R::KIND, e))?
            .iter()
            .map(R::materialize)
            .collect()
    }

    /// Plan and execute for one instance.
    pub fn apply(&self, desired: Option<&R::Desired>, prior: Option<&R::State>) -> Result<Applied<R::State>> {
        let action = plan::<R>(desired, prior)?;
        let (result, state) = match (action, desired, prior) {
            (Action::Create, Some(d), _) => (ApplyResult::Created, Some(self.create(d)?)),
            (Action::Update(delta), Some(d), Some(p)) => {
                (ApplyResult::Updated, Some(self.send_update(d, p, delta)?))
            }
            (Action::Replace { .. }, Some(d), Some(p)) => (ApplyResult::Replaced, Some(self.replace(d, p)?)),
            (Action::Delete, _, Some(p)) => {
                self.delete(R::id(p))?;
                (ApplyResult::Deleted, None)
            }
            _ => (ApplyResult::NoChange, prior.cloned()),
        };
        Ok(Applied { result, state })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ContactConfig, MonitorConfig, StatusPageConfig};
    use crate::resource::{ContactResource, MonitorResource, StatusPageResource};
    use crate::settings::{ContactChannel, HttpsSettings, MonitorType, SlackSettings, WebhookSettings};
    use crate::types::ResourceKind;
    use serde_json::json;
    use crate::validate::validate_monitor;
    use uptimekit::{Contact, ErrorCategory, MockBackend};

    fn https_monitor(url: &str) -> MonitorConfig {
        MonitorConfig {
            name: "API".into(),
            https: Some(HttpsSettings::new(url)),
            ..MonitorConfig::default()
        }
    }

    fn slack_contact() -> ContactConfig {
        ContactConfig {
            name: "Ops".into(),
            slack: Some(SlackSettings {
                webhook_url: "https://hooks.slack.com/services/T0/B0/XYZ".into(),
            }),
            ..ContactConfig::default()
        }
    }

    fn operations(mock: &MockBackend) -> Vec<&'static str> {
        mock.calls().iter().map(|c| c.operation).collect()
    }

    #[test]
    fn test_create_then_read_is_stable() {
        let mock = MockBackend::new();
        let monitors = Reconciler::<MonitorResource>::new(&mock);
        let config = https_monitor("https://example.com");

        let created = monitors.create(&config).unwrap();
        assert_eq!(created.monitor_type.url(), "https://example.com");

        let read = monitors.read(&created.id).unwrap().present().unwrap();
        assert_eq!(read, created);
    }

    #[test]
    fn test_create_validation_failure_sends_nothing() {
        let mock = MockBackend::new();
        let monitors = Reconciler::<MonitorResource>::new(&mock);
        let mut config = https_monitor("https://example.com");
        config.tcp = Some(crate::settings::TcpSettings {
            url: "db:5432".into(),
        });

        let err = monitors.create(&config).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_create_remote_failure_is_classified() {
        let mock = MockBackend::new();
        let monitors = Reconciler::<MonitorResource>::new(&mock);
        mock.fail_next(500, "internal error");

        let err = monitors.create(&https_monitor("https://example.com")).unwrap_err();
        match err {
            Error::Remote {
                operation,
                kind,
                source,
            } => {
                assert_eq!(operation, Operation::Create);
                assert_eq!(kind, ResourceKind::Monitor);
                assert_eq!(source.category(), ErrorCategory::Server);
                assert!(!source.is_retryable());
                assert_eq!(source.to_string(), "API error (status 500): internal error");
            }
            other => panic!("Expected remote error, got {other:?}"),
        }
    }

    #[test]
    fn test_create_clamped_threshold_then_update_is_noop() {
        let mock = MockBackend::new();
        mock.set_default_region_count(2);
        let monitors = Reconciler::<MonitorResource>::new(&mock);
        let mut config = https_monitor("https://example.com");
        config.regions = None;
        config.fail_threshold = Some(3);
        assert!(validate_monitor(&config).is_empty());

        let created = monitors.create(&config).unwrap();
        assert_eq!(created.fail_threshold, 2);
        assert_eq!(created.requested_fail_threshold, Some(3));

        mock.clear_calls();
        let updated = monitors.update(&config, &created).unwrap();
        assert_eq!(updated, created);
        assert!(mock.calls().is_empty());

        let refreshed = monitors.refresh(&created).unwrap().present().unwrap();
        assert_eq!(refreshed.requested_fail_threshold, Some(3));
        assert!(monitors.update(&config, &refreshed).is_ok());
        assert_eq!(operations(&mock), vec!["get_monitor"]);
    }

    #[test]
    fn test_lowered_threshold_after_clamp_is_sent() {
        let mock = MockBackend::new();
        mock.set_default_region_count(2);
        let monitors = Reconciler::<MonitorResource>::new(&mock);
        let mut config = https_monitor("https://example.com");
        config.fail_threshold = Some(3);
        let created = monitors.create(&config).unwrap();

        config.fail_threshold = Some(1);
        mock.clear_calls();
        let updated = monitors.update(&config, &created).unwrap();
        assert_eq!(updated.fail_threshold, 1);
        assert_eq!(updated.requested_fail_threshold, None);
        assert_eq!(mock.calls()[0].body, Some(json!({"fail_threshold": 1})));
    }

    #[test]
    fn test_update_sends_minimal_delta() {
        let mock = MockBackend::new();
        let monitors = Reconciler::<MonitorResource>::new(&mock);
        let config = https_monitor("https://example.com");
        let created = monitors.create(&config).unwrap();

        let mut changed = config.clone();
        changed.check_interval = Some(120);
        mock.clear_calls();
        let updated = monitors.update(&changed, &created).unwrap();
        assert_eq!(updated.check_interval, 120);

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].operation, "update_monitor");
        assert_eq!(calls[0].body, Some(json!({"check_interval": 120})));
    }

    #[test]
    fn test_update_type_change_requires_replace() {
        let mock = MockBackend::new();
        let monitors = Reconciler::<MonitorResource>::new(&mock);
        let config = https_monitor("https://example.com");
        let created = monitors.create(&config).unwrap();

        let mut changed = config.clone();
        changed.set_monitor_type(MonitorType::Ping(crate::settings::PingSettings {
            url: "example.com".into(),
        }));
        mock.clear_calls();
        let err = monitors.update(&changed, &created).unwrap_err();
        assert!(matches!(err, Error::ReplaceRequired { field: "type", .. }));
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn test_read_gone_after_out_of_band_delete() {
        let mock = MockBackend::new();
        let contacts = Reconciler::<ContactResource>::new(&mock);
        let created = contacts.create(&slack_contact()).unwrap();

        mock.remove(&created.id);
        assert!(contacts.read(&created.id).unwrap().is_gone());
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mock = MockBackend::new();
        let contacts = Reconciler::<ContactResource>::new(&mock);
        let created = contacts.create(&slack_contact()).unwrap();

        contacts.delete(&created.id).unwrap();
        contacts.delete(&created.id).unwrap();
        assert_eq!(
            operations(&mock),
            vec!["create_contact", "delete_contact", "delete_contact"]
        );
    }

    #[test]
    fn test_delete_remote_failure() {
        let mock = MockBackend::new();
        let contacts = Reconciler::<ContactResource>::new(&mock);
        mock.fail_next(502, "bad gateway");
        let err = contacts.delete("ct_9").unwrap_err();
        assert!(matches!(
            err,
            Error::Remote {
                operation: Operation::Delete,
                ..
            }
        ));
    }

    #[test]
    fn test_lookup_missing_is_not_found() {
        let mock = MockBackend::new();
        let pages = Reconciler::<StatusPageResource>::new(&mock);
        let err = pages.lookup("sp_404").unwrap_err();
        assert!(matches!(err, Error::NotFound { kind: ResourceKind::StatusPage, .. }));
    }

    #[test]
    fn test_lookup_unknown_channel_is_codec_error() {
        let mock = MockBackend::new();
        mock.insert_contact(Contact {
            id: "ct_fax".into(),
            name: "Fax".into(),
            channel: "fax".into(),
            details: json!({}),
            active: true,
            down_alerts_only: false,
            error: None,
            created_at: None,
        });
        let contacts = Reconciler::<ContactResource>::new(&mock);
        let err = contacts.lookup("ct_fax").unwrap_err();
        assert!(matches!(err, Error::UnsupportedVariant { .. }));
        assert!(err.is_conversion());
    }

    #[test]
    fn test_list_materializes_every_kind() {
        let mock = MockBackend::new();
        let contacts = Reconciler::<ContactResource>::new(&mock);
        contacts.create(&slack_contact()).unwrap();
        let mut webhook = slack_contact();
        webhook.set_channel(ContactChannel::Webhook(WebhookSettings {
            url: "https://hooks.example.com/alert".into(),
        }));
        contacts.create(&webhook).unwrap();

        let listed = contacts.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|c| c.active));
    }

    #[test]
    fn test_apply_lifecycle() {
        let mock = MockBackend::new();
        let monitors = Reconciler::<MonitorResource>::new(&mock);
        let config = https_monitor("https://example.com");

        let created = monitors.apply(Some(&config), None).unwrap();
        assert_eq!(created.result, ApplyResult::Created);
        let state = created.state.unwrap();

        let again = monitors.apply(Some(&config), Some(&state)).unwrap();
        assert_eq!(again.result, ApplyResult::NoChange);

        let mut changed = config.clone();
        changed.name = "Public API".into();
        let updated = monitors.apply(Some(&changed), Some(&state)).unwrap();
        assert_eq!(updated.result, ApplyResult::Updated);
        let state = updated.state.unwrap();
        assert_eq!(state.name, "Public API");

        let deleted = monitors.apply(None, Some(&state)).unwrap();
        assert_eq!(deleted.result, ApplyResult::Deleted);
        assert!(deleted.state.is_none());
    }

    #[test]
    fn test_apply_replace_on_channel_change() {
        let mock = MockBackend::new();
        let contacts = Reconciler::<ContactResource>::new(&mock);
        let config = slack_contact();
        let prior = contacts.create(&config).unwrap();

        let mut changed = config.clone();
        changed.set_channel(ContactChannel::Webhook(WebhookSettings {
            url: "https://hooks.example.com/alert".into(),
        }));
        let applied = contacts.apply(Some(&changed), Some(&prior)).unwrap();
        assert_eq!(applied.result, ApplyResult::Replaced);
        let state = applied.state.unwrap();
        assert_ne!(state.id, prior.id);
        assert_eq!(state.channel.tag(), "webhook");
        assert!(contacts.read(&prior.id).unwrap().is_gone());
    }

    #[test]
    fn test_status_page_update_clears_custom_domain() {
        let mock = MockBackend::new();
        let pages = Reconciler::<StatusPageResource>::new(&mock);
        let config = StatusPageConfig {
            name: "Public".into(),
            monitors: vec!["mon_1".into()],
            custom_domain: Some("status.example.com".into()),
            ..StatusPageConfig::default()
        };
        let created = pages.create(&config).unwrap();
        assert_eq!(created.custom_domain.as_deref(), Some("status.example.com"));

        let mut cleared = config.clone();
        cleared.custom_domain = None;
        let updated = pages.update(&cleared, &created).unwrap();
        assert_eq!(updated.custom_domain, None);
    }
}
