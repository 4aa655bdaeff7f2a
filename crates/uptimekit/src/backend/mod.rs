//! Backend trait and implementations for the remote API.
//!
//! [`http::HttpBackend`] talks to the real service. [`MockBackend`] keeps
//! everything in memory and mimics the server-side behavior callers have
//! to cope with (id assignment, URL reformatting, threshold clamping).
//!
//! # Testing
//!
//! ```
//! use uptimekit::backend::{Backend, MockBackend};
//! use uptimekit::CreateContactRequest;
//!
//! let mock = MockBackend::new();
//! let contact = mock
//!     .create_contact(&CreateContactRequest {
//!         name: "Ops".to_string(),
//!         channel: "email".to_string(),
//!         details: serde_json::json!({"email": "ops@example.com"}),
//!         active: true,
//!         down_alerts_only: false,
//!     })
//!     .unwrap();
//!
//! assert!(mock.get_contact(&contact.id).unwrap().is_some());
//! ```

pub mod http;

use crate::error::{Error, Result};
use crate::models::{
    Account, Contact, CreateContactRequest, CreateMonitorRequest, CreateStatusPageRequest,
    Monitor, StatusPage, UpdateContactRequest, UpdateMonitorRequest, UpdateStatusPageRequest,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Remote API operations for every resource kind.
///
/// Implementations must be safe to share across threads: one instance is
/// constructed up front and borrowed by every in-flight operation.
///
/// `get_*` reports a missing resource as `Ok(None)`. `update_*` and
/// `delete_*` report it as [`Error::NotFound`]; whether that is fatal is
/// the caller's decision.
pub trait Backend: Send + Sync {
    /// Create a monitor.
    fn create_monitor(&self, req: &CreateMonitorRequest) -> Result<Monitor>;
    /// Fetch a monitor by id.
    fn get_monitor(&self, id: &str) -> Result<Option<Monitor>>;
    /// Apply a partial update to a monitor.
    fn update_monitor(&self, id: &str, req: &UpdateMonitorRequest) -> Result<Monitor>;
    /// Delete a monitor.
    fn delete_monitor(&self, id: &str) -> Result<()>;
    /// List every monitor on the account.
    fn list_monitors(&self) -> Result<Vec<Monitor>>;

    /// Create a contact.
    fn create_contact(&self, req: &CreateContactRequest) -> Result<Contact>;
    /// Fetch a contact by id.
    fn get_contact(&self, id: &str) -> Result<Option<Contact>>;
    /// Apply a partial update to a contact.
    fn update_contact(&self, id: &str, req: &UpdateContactRequest) -> Result<Contact>;
    /// Delete a contact.
    fn delete_contact(&self, id: &str) -> Result<()>;
    /// List every contact on the account.
    fn list_contacts(&self) -> Result<Vec<Contact>>;

    /// Create a status page.
    fn create_status_page(&self, req: &CreateStatusPageRequest) -> Result<StatusPage>;
    /// Fetch a status page by id.
    fn get_status_page(&self, id: &str) -> Result<Option<StatusPage>>;
    /// Apply a partial update to a status page.
    fn update_status_page(&self, id: &str, req: &UpdateStatusPageRequest) -> Result<StatusPage>;
    /// Delete a status page.
    fn delete_status_page(&self, id: &str) -> Result<()>;
    /// List every status page on the account.
    fn list_status_pages(&self) -> Result<Vec<StatusPage>>;

    /// Fetch account information.
    fn get_account(&self) -> Result<Account>;
}

/// A call observed by [`MockBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Backend method name, e.g. `update_monitor`.
    pub operation: &'static str,
    /// Target id for per-resource calls.
    pub id: Option<String>,
    /// Serialized request body, if any.
    pub body: Option<Value>,
}

#[derive(Debug, Default)]
struct MockState {
    next_id: u64,
    clock: i64,
    monitors: BTreeMap<String, Monitor>,
    contacts: BTreeMap<String, Contact>,
    status_pages: BTreeMap<String, StatusPage>,
    account: Account,
    default_regions: Option<usize>,
    calls: Vec<RecordedCall>,
    pending_failure: Option<(u16, String)>,
}

impl MockState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}_{}", self.next_id)
    }

    fn tick(&mut self) -> i64 {
        self.clock += 1;
        1_700_000_000 + self.clock
    }

    fn record(&mut self, operation: &'static str, id: Option<&str>, body: Option<Value>) -> Result<()> {
        self.calls.push(RecordedCall {
            operation,
            id: id.map(str::to_string),
            body,
        });
        match self.pending_failure.take() {
            Some((status, message)) => Err(Error::api(status, message)),
            None => Ok(()),
        }
    }
}

/// In-memory backend for tests.
///
/// Behaves like the service where it matters for reconciliation:
/// - assigns ids and timestamps
/// - appends a `/` to bare-host HTTPS monitor URLs
/// - clamps `fail_threshold` to the region count, or to the default region
///   count when a monitor names no regions
/// - applies only the fields present in an update, treating `""` as a clear
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    /// Create a new empty mock backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Set the account returned by `get_account`.
    pub fn set_account(&self, account: Account) {
        self.state().account = account;
    }

    /// Number of regions a monitor without explicit regions is checked from.
    pub fn set_default_region_count(&self, count: usize) {
        self.state().default_regions = Some(count);
    }

    /// Store a monitor as-is, bypassing server-side reformatting.
    pub fn insert_monitor(&self, monitor: Monitor) {
        self.state().monitors.insert(monitor.id.clone(), monitor);
    }

    /// Store a contact as-is.
    pub fn insert_contact(&self, contact: Contact) {
        self.state().contacts.insert(contact.id.clone(), contact);
    }

    /// Store a status page as-is.
    pub fn insert_status_page(&self, page: StatusPage) {
        self.state().status_pages.insert(page.id.clone(), page);
    }

    /// Drop a resource of any kind behind the caller's back.
    pub fn remove(&self, id: &str) {
        let mut state = self.state();
        state.monitors.remove(id);
        state.contacts.remove(id);
        state.status_pages.remove(id);
    }

    /// Make the next call fail with an API error.
    pub fn fail_next(&self, status: u16, message: impl Into<String>) {
        self.state().pending_failure = Some((status, message.into()));
    }

    /// Every call made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state().calls.clone()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }
}

fn body_of<T: serde::Serialize>(req: &T) -> Option<Value> {
    serde_json::to_value(req).ok()
}

/// `https://x.com` becomes `https://x.com/`, the way the service echoes it.
fn server_format_url(url: &str) -> String {
    let after_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    if after_scheme.contains('/') || after_scheme.contains('?') {
        url.to_string()
    } else {
        format!("{url}/")
    }
}

fn server_format_settings(settings: &mut serde_json::Map<String, Value>) {
    if let Some(Value::Object(https)) = settings.get_mut("https")
        && let Some(Value::String(url)) = https.get("url")
    {
        let formatted = server_format_url(url);
        https.insert("url".to_string(), Value::String(formatted));
    }
}

fn clamp_threshold(threshold: i64, regions: Option<&Vec<String>>, default_regions: Option<usize>) -> i64 {
    let count = match regions {
        Some(r) if !r.is_empty() => Some(r.len()),
        _ => default_regions,
    };
    count.map_or(threshold, |n| threshold.min(n as i64))
}

fn non_empty_string(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

impl Backend for MockBackend {
    fn create_monitor(&self, req: &CreateMonitorRequest) -> Result<Monitor> {
        let mut state = self.state();
        state.record("create_monitor", None, body_of(req))?;

        let id = state.next_id("mon");
        let now = state.tick();
        let regions = (!req.regions.is_empty()).then(|| req.regions.clone());
        let mut settings = req.settings.clone();
        server_format_settings(&mut settings);

        let monitor = Monitor {
            id: id.clone(),
            name: req.name.clone(),
            active: req.active,
            check_interval: req.check_interval,
            timeout: req.timeout,
            fail_threshold: clamp_threshold(req.fail_threshold, regions.as_ref(), state.default_regions),
            regions,
            settings,
            contacts: (!req.contacts.is_empty()).then(|| req.contacts.clone()),
            last_status: None,
            created_at: Some(now),
            updated_at: Some(now),
            host: req.host.clone(),
            port: req.port,
        };
        state.monitors.insert(id, monitor.clone());
        Ok(monitor)
    }

    fn get_monitor(&self, id: &str) -> Result<Option<Monitor>> {
        let mut state = self.state();
        state.record("get_monitor", Some(id), None)?;
        Ok(state.monitors.get(id).cloned())
    }

    fn update_monitor(&self, id: &str, req: &UpdateMonitorRequest) -> Result<Monitor> {
        let mut state = self.state();
        state.record("update_monitor", Some(id), body_of(req))?;
        let now = state.tick();
        let default_regions = state.default_regions;

        let monitor = state
            .monitors
            .get_mut(id)
            .ok_or_else(|| Error::not_found("monitor", id))?;

        if let Some(name) = &req.name {
            monitor.name = name.clone();
        }
        if let Some(active) = req.active {
            monitor.active = active;
        }
        if let Some(interval) = req.check_interval {
            monitor.check_interval = interval;
        }
        if let Some(timeout) = req.timeout {
            monitor.timeout = timeout;
        }
        if let Some(threshold) = req.fail_threshold {
            monitor.fail_threshold = threshold;
        }
        if let Some(regions) = &req.regions {
            monitor.regions = (!regions.is_empty()).then(|| regions.clone());
        }
        if let Some(settings) = &req.settings {
            let mut settings = settings.clone();
            server_format_settings(&mut settings);
            monitor.settings = settings;
        }
        if let Some(contacts) = &req.contacts {
            monitor.contacts = (!contacts.is_empty()).then(|| contacts.clone());
        }
        if let Some(host) = &req.host {
            monitor.host = non_empty_string(host.clone());
        }
        if let Some(port) = req.port {
            monitor.port = (port != 0).then_some(port);
        }
        monitor.fail_threshold =
            clamp_threshold(monitor.fail_threshold, monitor.regions.as_ref(), default_regions);
        monitor.updated_at = Some(now);

        Ok(monitor.clone())
    }

    fn delete_monitor(&self, id: &str) -> Result<()> {
        let mut state = self.state();
        state.record("delete_monitor", Some(id), None)?;
        state
            .monitors
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found("monitor", id))
    }

    fn list_monitors(&self) -> Result<Vec<Monitor>> {
        let mut state = self.state();
        state.record("list_monitors", None, None)?;
        Ok(state.monitors.values().cloned().collect())
    }

    fn create_contact(&self, req: &CreateContactRequest) -> Result<Contact> {
        let mut state = self.state();
        state.record("create_contact", None, body_of(req))?;

        let id = state.next_id("ct");
        let now = state.tick();
        let contact = Contact {
            id: id.clone(),
            name: req.name.clone(),
            channel: req.channel.clone(),
            details: req.details.clone(),
            active: req.active,
            down_alerts_only: req.down_alerts_only,
            error: None,
            created_at: Some(now),
        };
        state.contacts.insert(id, contact.clone());
        Ok(contact)
    }

    fn get_contact(&self, id: &str) -> Result<Option<Contact>> {
        let mut state = self.state();
        state.record("get_contact", Some(id), None)?;
        Ok(state.contacts.get(id).cloned())
    }

    fn update_contact(&self, id: &str, req: &UpdateContactRequest) -> Result<Contact> {
        let mut state = self.state();
        state.record("update_contact", Some(id), body_of(req))?;

        let contact = state
            .contacts
            .get_mut(id)
            .ok_or_else(|| Error::not_found("contact", id))?;

        if let Some(name) = &req.name {
            contact.name = name.clone();
        }
        if let Some(details) = &req.details {
            contact.details = details.clone();
        }
        if let Some(down_only) = req.down_alerts_only {
            contact.down_alerts_only = down_only;
        }
        Ok(contact.clone())
    }

    fn delete_contact(&self, id: &str) -> Result<()> {
        let mut state = self.state();
        state.record("delete_contact", Some(id), None)?;
        state
            .contacts
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found("contact", id))
    }

    fn list_contacts(&self) -> Result<Vec<Contact>> {
        let mut state = self.state();
        state.record("list_contacts", None, None)?;
        Ok(state.contacts.values().cloned().collect())
    }

    fn create_status_page(&self, req: &CreateStatusPageRequest) -> Result<StatusPage> {
        let mut state = self.state();
        state.record("create_status_page", None, body_of(req))?;

        let id = state.next_id("sp");
        let now = state.tick();
        let url = req.custom_domain.as_ref().map_or_else(
            || format!("https://status.uptime-monitor.io/{id}"),
            |domain| format!("https://{domain}"),
        );
        let page = StatusPage {
            id: id.clone(),
            name: req.name.clone(),
            monitors: Some(req.monitors.clone()),
            period: req.period.unwrap_or(7),
            custom_domain: req.custom_domain.clone(),
            show_incident_reasons: req.show_incident_reasons.unwrap_or(false),
            basic_auth: req.basic_auth.clone(),
            created_at: Some(now),
            url: Some(url),
        };
        state.status_pages.insert(id, page.clone());
        Ok(page)
    }

    fn get_status_page(&self, id: &str) -> Result<Option<StatusPage>> {
        let mut state = self.state();
        state.record("get_status_page", Some(id), None)?;
        Ok(state.status_pages.get(id).cloned())
    }

    fn update_status_page(&self, id: &str, req: &UpdateStatusPageRequest) -> Result<StatusPage> {
        let mut state = self.state();
        state.record("update_status_page", Some(id), body_of(req))?;

        let page = state
            .status_pages
            .get_mut(id)
            .ok_or_else(|| Error::not_found("status page", id))?;

        if let Some(name) = &req.name {
            page.name = name.clone();
        }
        if let Some(monitors) = &req.monitors {
            page.monitors = Some(monitors.clone());
        }
        if let Some(period) = req.period {
            page.period = period;
        }
        if let Some(domain) = &req.custom_domain {
            page.custom_domain = non_empty_string(domain.clone());
        }
        if let Some(show) = req.show_incident_reasons {
            page.show_incident_reasons = show;
        }
        if let Some(auth) = &req.basic_auth {
            page.basic_auth = non_empty_string(auth.clone());
        }
        Ok(page.clone())
    }

    fn delete_status_page(&self, id: &str) -> Result<()> {
        let mut state = self.state();
        state.record("delete_status_page", Some(id), None)?;
        state
            .status_pages
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| Error::not_found("status page", id))
    }

    fn list_status_pages(&self) -> Result<Vec<StatusPage>> {
        let mut state = self.state();
        state.record("list_status_pages", None, None)?;
        Ok(state.status_pages.values().cloned().collect())
    }

    fn get_account(&self) -> Result<Account> {
        let mut state = self.state();
        state.record("get_account", None, None)?;
        let mut account = state.account.clone();
        account.monitors_count = state.monitors.len() as i64;
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};

    fn https_request(url: &str, regions: &[&str], threshold: i64) -> CreateMonitorRequest {
        let mut settings = Map::new();
        settings.insert("https".to_string(), json!({"url": url}));
        CreateMonitorRequest {
            name: "API".to_string(),
            active: true,
            check_interval: 60,
            timeout: 30,
            fail_threshold: threshold,
            regions: regions.iter().map(ToString::to_string).collect(),
            settings,
            contacts: vec![],
            host: None,
            port: None,
        }
    }

    #[test]
    fn test_mock_backend_new_is_empty() {
        let mock = MockBackend::new();
        assert!(mock.list_monitors().unwrap().is_empty());
        assert!(mock.list_contacts().unwrap().is_empty());
        assert!(mock.list_status_pages().unwrap().is_empty());
    }

    #[test]
    fn test_mock_backend_reformats_https_url() {
        let mock = MockBackend::new();
        let monitor = mock
            .create_monitor(&https_request("https://example.com", &[], 1))
            .unwrap();
        assert_eq!(monitor.settings["https"]["url"], json!("https://example.com/"));

        let monitor = mock
            .create_monitor(&https_request("https://example.com/health", &[], 1))
            .unwrap();
        assert_eq!(monitor.settings["https"]["url"], json!("https://example.com/health"));
    }

    #[test]
    fn test_mock_backend_clamps_threshold() {
        let mock = MockBackend::new();
        let monitor = mock
            .create_monitor(&https_request("https://example.com", &["us-east"], 3))
            .unwrap();
        assert_eq!(monitor.fail_threshold, 1);
    }

    #[test]
    fn test_mock_backend_clamps_to_default_regions() {
        let mock = MockBackend::new();
        let unclamped = mock
            .create_monitor(&https_request("https://example.com", &[], 3))
            .unwrap();
        assert_eq!(unclamped.fail_threshold, 3);

        mock.set_default_region_count(2);
        let clamped = mock
            .create_monitor(&https_request("https://example.com", &[], 3))
            .unwrap();
        assert_eq!(clamped.fail_threshold, 2);
        assert!(clamped.regions.is_none());
    }

    #[test]
    fn test_mock_backend_partial_update() {
        let mock = MockBackend::new();
        let monitor = mock
            .create_monitor(&https_request("https://example.com", &["us-east", "eu-west"], 2))
            .unwrap();

        let updated = mock
            .update_monitor(
                &monitor.id,
                &UpdateMonitorRequest {
                    name: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.fail_threshold, 2);
        assert_eq!(updated.regions.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn test_mock_backend_delete_missing_is_not_found() {
        let mock = MockBackend::new();
        let err = mock.delete_monitor("mon_404").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_mock_backend_status_page_clear_with_empty_string() {
        let mock = MockBackend::new();
        let page = mock
            .create_status_page(&CreateStatusPageRequest {
                name: "Public".to_string(),
                monitors: vec!["mon_1".to_string()],
                period: None,
                custom_domain: Some("status.example.com".to_string()),
                show_incident_reasons: None,
                basic_auth: Some("user:pass".to_string()),
            })
            .unwrap();
        assert_eq!(page.period, 7);

        let updated = mock
            .update_status_page(
                &page.id,
                &UpdateStatusPageRequest {
                    custom_domain: Some(String::new()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.custom_domain, None);
        assert_eq!(updated.basic_auth.as_deref(), Some("user:pass"));
    }

    #[test]
    fn test_mock_backend_fail_next() {
        let mock = MockBackend::new();
        mock.fail_next(500, "boom");
        let err = mock.list_contacts().unwrap_err();
        assert!(matches!(err, Error::Api { status: 500, .. }));
        assert!(mock.list_contacts().is_ok());
    }

    #[test]
    fn test_mock_backend_records_calls() {
        let mock = MockBackend::new();
        let _ = mock.get_monitor("mon_1");
        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].operation, "get_monitor");
        assert_eq!(calls[0].id.as_deref(), Some("mon_1"));

        mock.clear_calls();
        assert!(mock.calls().is_empty());
    }
}
