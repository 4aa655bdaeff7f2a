//! Per-kind glue between the manifest, the state store and the reconciler.

use crate::manifest::{Manifest, resolve_references};
use crate::state::{StateStore, Tracked};
use reconcile::{
    ContactConfig, ContactResource, ContactState, MonitorConfig, MonitorResource, MonitorState,
    ResourceKind, ResourceType, StatusPageConfig, StatusPageResource, StatusPageState,
};
use std::collections::BTreeMap;

/// A resource kind uptimectl manages.
pub trait Managed: ResourceType {
    fn declared(manifest: &Manifest) -> &BTreeMap<String, Self::Desired>;
    fn tracked(store: &StateStore) -> &BTreeMap<String, Tracked<Self::State>>;
    fn tracked_mut(store: &mut StateStore) -> &mut BTreeMap<String, Tracked<Self::State>>;

    /// Desired config with references replaced by ids, plus any references
    /// that are not tracked yet.
    fn resolve(desired: &Self::Desired, _store: &StateStore) -> (Self::Desired, Vec<String>) {
        (desired.clone(), Vec::new())
    }

    /// One-line description for listings.
    fn summary(state: &Self::State) -> String;

    fn created_at(state: &Self::State) -> Option<i64>;
}

/// Id of the tracked instance with manifest name `name`.
pub fn tracked_id<'s, R: Managed>(store: &'s StateStore, name: &str) -> Option<&'s str> {
    R::tracked(store)
        .iter()
        .find(|(_, entry)| entry.name == name)
        .map(|(id, _)| id.as_str())
}

fn lookup_id(store: &StateStore, kind: ResourceKind, name: &str) -> Option<String> {
    match kind {
        ResourceKind::Contact => tracked_id::<ContactResource>(store, name),
        ResourceKind::Monitor => tracked_id::<MonitorResource>(store, name),
        ResourceKind::StatusPage => tracked_id::<StatusPageResource>(store, name),
    }
    .map(str::to_string)
}

/// Record the outcome of applying one instance.
///
/// Drops the entry under `prior_id` and tracks `state` under its own id.
pub fn record<R: Managed>(store: &mut StateStore, name: &str, prior_id: Option<&str>, state: Option<R::State>) {
    let entries = R::tracked_mut(store);
    if let Some(id) = prior_id {
        entries.remove(id);
    }
    if let Some(state) = state {
        entries.insert(
            R::id(&state).to_string(),
            Tracked {
                name: name.to_string(),
                state,
            },
        );
    }
}

impl Managed for ContactResource {
    fn declared(manifest: &Manifest) -> &BTreeMap<String, ContactConfig> {
        &manifest.contacts
    }

    fn tracked(store: &StateStore) -> &BTreeMap<String, Tracked<ContactState>> {
        &store.contacts
    }

    fn tracked_mut(store: &mut StateStore) -> &mut BTreeMap<String, Tracked<ContactState>> {
        &mut store.contacts
    }

    fn created_at(state: &ContactState) -> Option<i64> {
        state.created_at
    }

    fn summary(state: &ContactState) -> String {
        let mut line = state.channel.tag().to_string();
        if !state.active {
            line.push_str(" (inactive)");
        }
        if let Some(error) = &state.error {
            line.push_str(&format!(" error: {error}"));
        }
        line
    }
}

impl Managed for MonitorResource {
    fn declared(manifest: &Manifest) -> &BTreeMap<String, MonitorConfig> {
        &manifest.monitors
    }

    fn tracked(store: &StateStore) -> &BTreeMap<String, Tracked<MonitorState>> {
        &store.monitors
    }

    fn tracked_mut(store: &mut StateStore) -> &mut BTreeMap<String, Tracked<MonitorState>> {
        &mut store.monitors
    }

    fn resolve(desired: &MonitorConfig, store: &StateStore) -> (MonitorConfig, Vec<String>) {
        let mut resolved = desired.clone();
        let mut unresolved = Vec::new();
        if let Some(contacts) = &desired.contacts {
            resolved.contacts = Some(resolve_references(
                contacts,
                |kind, name| lookup_id(store, kind, name),
                &mut unresolved,
            ));
        }
        (resolved, unresolved)
    }

    fn created_at(state: &MonitorState) -> Option<i64> {
        state.created_at
    }

    fn summary(state: &MonitorState) -> String {
        let status = state.last_status.as_deref().unwrap_or("pending");
        format!("{} {} [{}]", state.monitor_type.tag(), state.monitor_type.url(), status)
    }
}

impl Managed for StatusPageResource {
    fn declared(manifest: &Manifest) -> &BTreeMap<String, StatusPageConfig> {
        &manifest.status_pages
    }

    fn tracked(store: &StateStore) -> &BTreeMap<String, Tracked<StatusPageState>> {
        &store.status_pages
    }

    fn tracked_mut(store: &mut StateStore) -> &mut BTreeMap<String, Tracked<StatusPageState>> {
        &mut store.status_pages
    }

    fn resolve(desired: &StatusPageConfig, store: &StateStore) -> (StatusPageConfig, Vec<String>) {
        let mut unresolved = Vec::new();
        let resolved = StatusPageConfig {
            monitors: resolve_references(
                &desired.monitors,
                |kind, name| lookup_id(store, kind, name),
                &mut unresolved,
            ),
            ..desired.clone()
        };
        (resolved, unresolved)
    }

    fn created_at(state: &StatusPageState) -> Option<i64> {
        state.created_at
    }

    fn summary(state: &StatusPageState) -> String {
        format!(
            "{} monitors, {} days{}",
            state.monitors.len(),
            state.period,
            state
                .url
                .as_deref()
                .map(|url| format!(", {url}"))
                .unwrap_or_default()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reconcile::settings::{EmailSettings, TcpSettings};
    use reconcile::{ContactChannel, MonitorType};

    fn contact_state(id: &str) -> ContactState {
        ContactState {
            id: id.to_string(),
            name: "Ops".to_string(),
            channel: ContactChannel::Email(EmailSettings {
                email: "ops@example.com".to_string(),
            }),
            active: true,
            down_alerts_only: false,
            error: None,
            created_at: None,
        }
    }

    #[test]
    fn test_record_and_find() {
        let mut store = StateStore::default();
        record::<ContactResource>(&mut store, "ops", None, Some(contact_state("ct_1")));
        assert_eq!(tracked_id::<ContactResource>(&store, "ops"), Some("ct_1"));

        record::<ContactResource>(&mut store, "ops", Some("ct_1"), Some(contact_state("ct_2")));
        assert_eq!(tracked_id::<ContactResource>(&store, "ops"), Some("ct_2"));
        assert_eq!(store.contacts.len(), 1);

        record::<ContactResource>(&mut store, "ops", Some("ct_2"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_monitor_contact_references_resolve() {
        let mut store = StateStore::default();
        record::<ContactResource>(&mut store, "ops", None, Some(contact_state("ct_1")));

        let desired = MonitorConfig {
            name: "DB".into(),
            contacts: Some(vec!["contact.ops".into(), "contact.oncall".into()]),
            tcp: Some(TcpSettings {
                url: "db.example.com:5432".into(),
            }),
            ..MonitorConfig::default()
        };
        let (resolved, unresolved) = MonitorResource::resolve(&desired, &store);
        assert_eq!(
            resolved.contacts,
            Some(vec!["ct_1".to_string(), "contact.oncall".to_string()])
        );
        assert_eq!(unresolved, vec!["contact.oncall"]);
    }

    #[test]
    fn test_summaries() {
        let monitor = MonitorState {
            id: "mon_1".into(),
            name: "DB".into(),
            active: true,
            check_interval: 60,
            timeout: 30,
            fail_threshold: 1,
            requested_fail_threshold: None,
            regions: None,
            contacts: None,
            host: None,
            port: None,
            monitor_type: MonitorType::Tcp(TcpSettings {
                url: "db.example.com:5432".into(),
            }),
            last_status: Some("up".into()),
            created_at: None,
            updated_at: None,
        };
        assert_eq!(MonitorResource::summary(&monitor), "tcp db.example.com:5432 [up]");

        let mut contact = contact_state("ct_1");
        contact.active = false;
        assert_eq!(ContactResource::summary(&contact), "email (inactive)");
    }
}
