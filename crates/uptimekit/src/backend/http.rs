//! HTTP backend for the Uptime Monitor API.
//!
//! Every response is wrapped in a `{status, data, error, message}` envelope.
//! Non-2xx statuses are classified before the envelope is looked at, so a
//! 401 with an HTML body still surfaces as [`Error::Unauthorized`].

use crate::backend::Backend;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::models::{
    Account, Contact, ContactData, ContactList, CreateContactRequest, CreateMonitorRequest,
    CreateStatusPageRequest, Envelope, ErrorBody, Monitor, MonitorData, MonitorList, Pagination,
    StatusPage, StatusPageData, StatusPageList, UpdateContactRequest, UpdateMonitorRequest,
    UpdateStatusPageRequest,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

/// Upper bound on pages fetched by a single `list_*` call.
const MAX_PAGES: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// Blocking HTTP backend.
///
/// Holds one `ureq` agent (and its connection pool) for the lifetime of
/// the backend; share it by reference across threads.
pub struct HttpBackend {
    agent: ureq::Agent,
    config: ClientConfig,
    max_pages: u32,
}

impl HttpBackend {
    /// Create a backend from a resolved configuration.
    #[must_use]
    pub fn new(config: &ClientConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(config.timeout))
            .build()
            .into();

        Self {
            agent,
            config: config.clone(),
            max_pages: MAX_PAGES,
        }
    }

    /// Limit the pages a single `list_*` call may follow.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    /// Path of one resource, with `id` encoded as a single segment.
    fn item_path(collection: &str, id: &str) -> String {
        format!("{collection}/{}", urlencoding::encode(id))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url(), path)
    }

    fn authorize<B>(&self, request: ureq::RequestBuilder<B>) -> ureq::RequestBuilder<B> {
        request
            .header("Authorization", self.config.bearer())
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .header("User-Agent", self.config.user_agent.as_str())
    }

    /// Send a request and return the status code and raw body.
    fn send<T: Serialize>(&self, method: Method, path: &str, body: Option<&T>) -> Result<(u16, String)> {
        let url = self.url(path);
        log::debug!("{method} {url}");

        let result = match (method, body) {
            (Method::Get, _) => self.authorize(self.agent.get(&url)).call(),
            (Method::Delete, _) => self.authorize(self.agent.delete(&url)).call(),
            (Method::Post, Some(b)) => self.authorize(self.agent.post(&url)).send_json(b),
            (Method::Put, Some(b)) => self.authorize(self.agent.put(&url)).send_json(b),
            (Method::Patch, Some(b)) => self.authorize(self.agent.patch(&url)).send_json(b),
            (Method::Post, None) => self.authorize(self.agent.post(&url)).send_empty(),
            (Method::Put, None) => self.authorize(self.agent.put(&url)).send_empty(),
            (Method::Patch, None) => self.authorize(self.agent.patch(&url)).send_empty(),
        };

        let mut response = result?;
        let status = response.status().as_u16();
        let text = response.body_mut().read_to_string()?;
        log::debug!("{method} {url} -> {status}");

        Ok((status, text))
    }

    fn get<D: DeserializeOwned>(&self, path: &str) -> Result<Option<D>> {
        let (status, text) = self.send::<()>(Method::Get, path, None)?;
        if status == 404 {
            return Ok(None);
        }
        decode(status, &text).map(Some)
    }

    fn write<T: Serialize, D: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &T,
        kind: &'static str,
        id: Option<&str>,
    ) -> Result<D> {
        let (status, text) = self.send(method, path, Some(body))?;
        if status == 404
            && let Some(id) = id
        {
            return Err(Error::not_found(kind, id));
        }
        decode(status, &text)
    }

    fn delete(&self, path: &str, kind: &'static str, id: &str) -> Result<()> {
        let (status, text) = self.send::<()>(Method::Delete, path, None)?;
        if status == 404 {
            return Err(Error::not_found(kind, id));
        }
        check_status(status, &text)
    }

    fn list<L, T>(&self, path: &str, split: impl Fn(L) -> (Vec<T>, Option<Pagination>)) -> Result<Vec<T>>
    where
        L: DeserializeOwned,
    {
        let mut items = Vec::new();
        for page in 1..=self.max_pages {
            let (status, text) = self.send::<()>(Method::Get, &format!("{path}?page={page}"), None)?;
            let (batch, pagination) = split(decode(status, &text)?);
            items.extend(batch);

            match pagination {
                Some(p) if p.has_next => {}
                _ => return Ok(items),
            }
        }
        Err(Error::Decode(format!(
            "{path} still reports more results after {} pages",
            self.max_pages
        )))
    }
}

impl fmt::Debug for HttpBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpBackend")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Map a non-2xx status onto a classified error.
fn check_status(status: u16, text: &str) -> Result<()> {
    if status < 400 {
        return Ok(());
    }

    let message = serde_json::from_str::<ErrorBody>(text)
        .ok()
        .and_then(|b| b.error.or(b.message))
        .unwrap_or_else(|| {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                format!("HTTP {status}")
            } else {
                trimmed.to_string()
            }
        });

    match status {
        401 | 403 => Err(Error::Unauthorized(message)),
        _ => Err(Error::api(status, message)),
    }
}

/// Unwrap the envelope and return its data object.
fn decode<D: DeserializeOwned>(status: u16, text: &str) -> Result<D> {
    check_status(status, text)?;

    let envelope: Envelope<D> = serde_json::from_str(text)?;
    if envelope.status != "ok" {
        return Err(Error::api(status, envelope.failure_message()));
    }

    envelope
        .data
        .ok_or_else(|| Error::Decode("response envelope has no data".to_string()))
}

fn missing(kind: &str) -> Error {
    Error::Decode(format!("response is missing {kind} data"))
}

impl Backend for HttpBackend {
    fn create_monitor(&self, req: &CreateMonitorRequest) -> Result<Monitor> {
        let data: MonitorData = self.write(Method::Post, "/api/monitors", req, "monitor", None)?;
        data.monitor.ok_or_else(|| missing("monitor"))
    }

    fn get_monitor(&self, id: &str) -> Result<Option<Monitor>> {
        match self.get::<MonitorData>(&Self::item_path("/api/monitors", id))? {
            Some(data) => data.monitor.map(Some).ok_or_else(|| missing("monitor")),
            None => Ok(None),
        }
    }

    fn update_monitor(&self, id: &str, req: &UpdateMonitorRequest) -> Result<Monitor> {
        let data: MonitorData =
            self.write(Method::Put, &Self::item_path("/api/monitors", id), req, "monitor", Some(id))?;
        data.monitor.ok_or_else(|| missing("monitor"))
    }

    fn delete_monitor(&self, id: &str) -> Result<()> {
        self.delete(&Self::item_path("/api/monitors", id), "monitor", id)
    }

    fn list_monitors(&self) -> Result<Vec<Monitor>> {
        self.list("/api/monitors", |l: MonitorList| (l.monitors, l.pagination))
    }

    fn create_contact(&self, req: &CreateContactRequest) -> Result<Contact> {
        let data: ContactData = self.write(Method::Post, "/api/contacts", req, "contact", None)?;
        data.contact.ok_or_else(|| missing("contact"))
    }

    fn get_contact(&self, id: &str) -> Result<Option<Contact>> {
        match self.get::<ContactData>(&Self::item_path("/api/contacts", id))? {
            Some(data) => data.contact.map(Some).ok_or_else(|| missing("contact")),
            None => Ok(None),
        }
    }

    fn update_contact(&self, id: &str, req: &UpdateContactRequest) -> Result<Contact> {
        let data: ContactData =
            self.write(Method::Put, &Self::item_path("/api/contacts", id), req, "contact", Some(id))?;
        data.contact.ok_or_else(|| missing("contact"))
    }

    fn delete_contact(&self, id: &str) -> Result<()> {
        self.delete(&Self::item_path("/api/contacts", id), "contact", id)
    }

    fn list_contacts(&self) -> Result<Vec<Contact>> {
        self.list("/api/contacts", |l: ContactList| (l.contacts, l.pagination))
    }

    fn create_status_page(&self, req: &CreateStatusPageRequest) -> Result<StatusPage> {
        let data: StatusPageData =
            self.write(Method::Post, "/api/status_pages", req, "status page", None)?;
        data.status_page.ok_or_else(|| missing("status page"))
    }

    fn get_status_page(&self, id: &str) -> Result<Option<StatusPage>> {
        match self.get::<StatusPageData>(&Self::item_path("/api/status_pages", id))? {
            Some(data) => data.status_page.map(Some).ok_or_else(|| missing("status page")),
            None => Ok(None),
        }
    }

    fn update_status_page(&self, id: &str, req: &UpdateStatusPageRequest) -> Result<StatusPage> {
        let data: StatusPageData = self.write(
            Method::Patch,
            &Self::item_path("/api/status_pages", id),
            req,
            "status page",
            Some(id),
        )?;
        data.status_page.ok_or_else(|| missing("status page"))
    }

    fn delete_status_page(&self, id: &str) -> Result<()> {
        self.delete(&Self::item_path("/api/status_pages", id), "status page", id)
    }

    fn list_status_pages(&self) -> Result<Vec<StatusPage>> {
        self.list("/api/status_pages", |l: StatusPageList| (l.status_pages, l.pagination))
    }

    fn get_account(&self) -> Result<Account> {
        self.get::<Account>("/api/account")?
            .ok_or_else(|| Error::api(404, "account not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use httpmock::Method::PATCH;
    use httpmock::prelude::*;
    use serde_json::{Map, json};

    fn backend(server: &MockServer) -> HttpBackend {
        HttpBackend::new(&ClientConfig::new("test-key", server.base_url()).unwrap())
    }

    fn monitor_json(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": "API",
            "active": true,
            "check_interval": 60,
            "timeout": 30,
            "fail_threshold": 1,
            "regions": ["us-east"],
            "settings": {"https": {"url": "https://example.com/", "check_certificate_expiration": true, "follow_redirect": true}},
            "created_at": 1_700_000_000
        })
    }

    #[test]
    fn test_get_monitor_sends_bearer_and_unwraps_envelope() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/monitors/mon_1")
                .header("Authorization", "Bearer test-key");
            then.status(200)
                .json_body(json!({"status": "ok", "data": {"monitor": monitor_json("mon_1")}}));
        });

        let monitor = backend(&server).get_monitor("mon_1").unwrap().unwrap();
        mock.assert();
        assert_eq!(monitor.id, "mon_1");
        assert_eq!(monitor.regions, Some(vec!["us-east".to_string()]));
    }

    #[test]
    fn test_get_monitor_404_is_none() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/monitors/gone");
            then.status(404)
                .json_body(json!({"status": "error", "error": "not found"}));
        });

        assert!(backend(&server).get_monitor("gone").unwrap().is_none());
    }

    #[test]
    fn test_create_monitor_posts_json() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/monitors")
                .json_body_partial(r#"{"name": "API", "fail_threshold": 1}"#);
            then.status(201)
                .json_body(json!({"status": "ok", "data": {"monitor": monitor_json("mon_9")}}));
        });

        let mut settings = Map::new();
        settings.insert("https".to_string(), json!({"url": "https://example.com"}));
        let req = CreateMonitorRequest {
            name: "API".to_string(),
            active: true,
            check_interval: 60,
            timeout: 30,
            fail_threshold: 1,
            regions: vec![],
            settings,
            contacts: vec![],
            host: None,
            port: None,
        };

        let monitor = backend(&server).create_monitor(&req).unwrap();
        mock.assert();
        assert_eq!(monitor.id, "mon_9");
    }

    #[test]
    fn test_error_envelope_surfaces_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/api/contacts");
            then.status(200)
                .json_body(json!({"status": "error", "data": null, "error": "invalid channel"}));
        });

        let req = CreateContactRequest {
            name: "Ops".to_string(),
            channel: "carrier-pigeon".to_string(),
            details: json!({}),
            active: true,
            down_alerts_only: false,
        };
        let err = backend(&server).create_contact(&req).unwrap_err();
        match err {
            Error::Api { message, .. } => assert_eq!(message, "invalid channel"),
            other => panic!("Expected Error::Api, got {other:?}"),
        }
    }

    #[test]
    fn test_unauthorized_is_classified() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/account");
            then.status(401).body("Unauthorized");
        });

        let err = backend(&server).get_account().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Unauthorized);
    }

    #[test]
    fn test_server_error_uses_raw_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/contacts/c_1");
            then.status(503).body("upstream unavailable");
        });

        let err = backend(&server).get_contact("c_1").unwrap_err();
        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "upstream unavailable");
            }
            other => panic!("Expected Error::Api, got {other:?}"),
        }
    }

    #[test]
    fn test_delete_404_is_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(DELETE).path("/api/monitors/mon_1");
            then.status(404);
        });

        let err = backend(&server).delete_monitor("mon_1").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_status_page_accepts_204() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(DELETE).path("/api/status_pages/sp_1");
            then.status(204);
        });

        backend(&server).delete_status_page("sp_1").unwrap();
        mock.assert();
    }

    #[test]
    fn test_update_status_page_uses_patch() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(PATCH)
                .path("/api/status_pages/sp_1")
                .json_body(json!({"custom_domain": ""}));
            then.status(200).json_body(json!({
                "status": "ok",
                "data": {"status_page": {
                    "id": "sp_1",
                    "name": "Public",
                    "monitors": ["mon_1"],
                    "period": 7,
                    "show_incident_reasons": false
                }}
            }));
        });

        let req = UpdateStatusPageRequest {
            custom_domain: Some(String::new()),
            ..Default::default()
        };
        let page = backend(&server).update_status_page("sp_1", &req).unwrap();
        mock.assert();
        assert_eq!(page.custom_domain, None);
    }

    #[test]
    fn test_list_monitors_follows_pagination() {
        let server = MockServer::start();
        let first = server.mock(|when, then| {
            when.method(GET).path("/api/monitors").query_param("page", "1");
            then.status(200).json_body(json!({
                "status": "ok",
                "data": {
                    "monitors": [monitor_json("mon_1")],
                    "pagination": {"page": 1, "per_page": 1, "total": 2, "total_pages": 2, "has_next": true, "has_prev": false}
                }
            }));
        });
        let second = server.mock(|when, then| {
            when.method(GET).path("/api/monitors").query_param("page", "2");
            then.status(200).json_body(json!({
                "status": "ok",
                "data": {
                    "monitors": [monitor_json("mon_2")],
                    "pagination": {"page": 2, "per_page": 1, "total": 2, "total_pages": 2, "has_next": false, "has_prev": true}
                }
            }));
        });

        let monitors = backend(&server).list_monitors().unwrap();
        first.assert();
        second.assert();
        let ids: Vec<_> = monitors.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, ["mon_1", "mon_2"]);
    }

    #[test]
    fn test_list_stops_with_error_at_page_limit() {
        let server = MockServer::start();
        let pages = server.mock(|when, then| {
            when.method(GET).path("/api/contacts");
            then.status(200).json_body(json!({
                "status": "ok",
                "data": {
                    "contacts": [],
                    "pagination": {"page": 1, "per_page": 1, "total": 9, "total_pages": 9, "has_next": true, "has_prev": false}
                }
            }));
        });

        let err = backend(&server).with_max_pages(2).list_contacts().unwrap_err();
        pages.assert_hits(2);
        assert_eq!(err.category(), ErrorCategory::Decode);
        assert!(err.to_string().contains("after 2 pages"));
    }

    #[test]
    fn test_item_path_encodes_id() {
        assert_eq!(HttpBackend::item_path("/api/monitors", "mon_1"), "/api/monitors/mon_1");
        assert_eq!(
            HttpBackend::item_path("/api/monitors", "../account?x=1#y"),
            "/api/monitors/..%2Faccount%3Fx%3D1%23y"
        );
    }

    #[test]
    fn test_get_account_reads_bare_data() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/account");
            then.status(200).json_body(json!({
                "status": "ok",
                "data": {
                    "id": "acc_1",
                    "email": "owner@example.com",
                    "current_plan": "pro",
                    "monitors_limit": 50,
                    "monitors_count": 3,
                    "up_monitors": 2,
                    "down_monitors": 1,
                    "paused_monitors": 0
                }
            }));
        });

        let account = backend(&server).get_account().unwrap();
        assert_eq!(account.current_plan, "pro");
        assert_eq!(account.down_monitors, 1);
    }

    #[test]
    fn test_missing_data_is_decode_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/monitors/mon_1");
            then.status(200).json_body(json!({"status": "ok", "data": {}}));
        });

        let err = backend(&server).get_monitor("mon_1").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Decode);
    }
}
